//! Init-db command: create the schema without starting the bot.

use crate::config::Config;
use crate::db::Database;
use anyhow::{Context, Result};

/// Open the configured database, applying migrations, and report its size.
pub fn run_init_db(config: &Config) -> Result<()> {
    let path = &config.storage.db_path;
    let db = Database::open(path)
        .with_context(|| format!("failed to initialize database {}", path.display()))?;
    let total = db.total_tasks()?;

    println!("Database ready: {} ({} tasks)", path.display(), total);
    Ok(())
}
