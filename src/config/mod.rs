//! Configuration system.
//!
//! Settings come from tiers merged field by field with YAML:
//! 1. **Defaults** - compiled in
//! 2. **Project** - `$CWD/task-chat-bot/config.yaml`
//! 3. **User** - `~/.task-chat-bot/config.yaml`
//! 4. **Environment** - overrides below
//!
//! An explicit file (`--config` or `TASK_BOT_CONFIG_PATH`) replaces tiers 2 and 3.
//!
//! ## Environment Variables
//! - `BOT_TOKEN` - Telegram bot token (required to serve, never stored in config)
//! - `TASK_BOT_CONFIG_PATH` - Explicit config file
//! - `TASK_BOT_DB_PATH` - Database path
//! - `TASK_BOT_API_BASE_URL` - Bot API endpoint
//! - `TASK_BOT_USER_DIR` - User config dir (default: `~/.task-chat-bot`)
//! - `TASK_BOT_PROJECT_DIR` - Project config dir (default: `./task-chat-bot`)

mod loader;
mod types;

pub use loader::{CONFIG_FILE_NAME, ConfigLoader, ConfigPaths, ConfigTier, merge_into};
pub use types::*;

use anyhow::{Result, anyhow};

/// Environment variable holding the bot token.
pub const BOT_TOKEN_ENV: &str = "BOT_TOKEN";

/// Load variables from a `.env` file in the working directory, if any.
/// Variables already set in the environment win.
pub fn load_dotenv() {
    if let Ok(path) = dotenvy::dotenv() {
        tracing::debug!(path = %path.display(), "Loaded .env file");
    }
}

/// Read the bot token from the environment.
pub fn bot_token_from_env() -> Result<String> {
    std::env::var(BOT_TOKEN_ENV)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| {
            anyhow!(
                "{} is not set. Put {}=... in the environment or a .env file.",
                BOT_TOKEN_ENV,
                BOT_TOKEN_ENV
            )
        })
}
