//! Task Chat Bot
//!
//! Telegram bot for keeping a personal task list: add, list, edit and
//! delete tasks with commands, buttons, and plain replies.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use task_chat_bot::bot;
use task_chat_bot::cli::init_db::run_init_db;
use task_chat_bot::cli::stats::run_stats;
use task_chat_bot::cli::{Cli, Command};
use task_chat_bot::config::{ConfigLoader, ConfigPaths, bot_token_from_env, load_dotenv};
use task_chat_bot::logging::{self, LogTarget};
use tracing::debug;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    logging::init(&LogTarget::parse(&cli.log), cli.verbose)?;
    load_dotenv();

    let mut paths = ConfigPaths::discover();
    if let Some(config_path) = &cli.config {
        paths.explicit_file = Some(PathBuf::from(config_path));
    }
    let mut loader = ConfigLoader::load_with_paths(paths)?;
    for (tier, path) in loader.sources() {
        debug!(tier = %tier, path = %path.display(), "Using config file");
    }

    // CLI overrides
    if let Some(db_path) = &cli.database {
        loader.config_mut().storage.db_path = PathBuf::from(db_path);
    }
    let config = loader.into_config();

    match cli.command {
        Some(Command::InitDb) => run_init_db(&config),
        Some(Command::Stats(args)) => run_stats(&config, &args),
        Some(Command::Serve) | None => {
            // Checked before anything is served.
            let token = bot_token_from_env()?;
            bot::run(config, token).await
        }
    }
}
