//! CLI command definitions for task-chat-bot
//!
//! This module defines the CLI structure using clap's derive macros.
//! Running without a subcommand starts the bot.

pub mod init_db;
pub mod stats;

use clap::{Parser, Subcommand};
use stats::StatsArgs;

/// Telegram task-list bot and maintenance tools
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Path to database file (overrides config)
    #[arg(short, long, global = true)]
    pub database: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Logging output: 0/off, 1/stdout, 2/stderr (default), or filename
    #[arg(short, long, default_value = "2", global = true)]
    pub log: String,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the bot (default if no subcommand given). Requires BOT_TOKEN.
    Serve,

    /// Create the database schema if it does not exist yet
    InitDb,

    /// Show how many tasks each user has
    Stats(StatsArgs),
}
