//! Stats command: per-user task counts straight from the database.

use crate::config::Config;
use crate::db::Database;
use crate::format::{OutputFormat, format_stats_json, format_stats_table};
use anyhow::{Context, Result};
use clap::Args;

/// Arguments for the stats command.
#[derive(Args, Debug)]
pub struct StatsArgs {
    /// Print JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

impl StatsArgs {
    pub fn format(&self) -> OutputFormat {
        if self.json {
            OutputFormat::Json
        } else {
            OutputFormat::Table
        }
    }
}

/// Render the report for the configured database.
pub fn render_stats(config: &Config, args: &StatsArgs) -> Result<String> {
    let db = Database::open(&config.storage.db_path).with_context(|| {
        format!(
            "failed to open database {}",
            config.storage.db_path.display()
        )
    })?;
    let stats = db.owner_stats()?;

    Ok(match args.format() {
        OutputFormat::Json => {
            let report = format_stats_json(&stats);
            format!("{}\n", serde_json::to_string_pretty(&report)?)
        }
        OutputFormat::Table => format_stats_table(&stats),
    })
}

/// Run the stats command.
pub fn run_stats(config: &Config, args: &StatsArgs) -> Result<()> {
    print!("{}", render_stats(config, args)?);
    Ok(())
}
