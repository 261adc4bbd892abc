//! Configuration types and structures.

use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default Telegram Bot API endpoint.
pub const DEFAULT_API_BASE_URL: &str = "https://api.telegram.org";

/// Bot configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub telegram: TelegramConfig,

    #[serde(default)]
    pub messages: Messages,
}

impl Config {
    /// Load a single configuration file, without tier merging.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow!("failed to read config {}: {}", path.display(), e))?;
        let config: Config = serde_yaml::from_str(&content)
            .map_err(|e| anyhow!("failed to parse config {}: {}", path.display(), e))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the bot cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.telegram.request_timeout_secs <= self.telegram.poll_timeout_secs {
            return Err(anyhow!(
                "telegram.request_timeout_secs ({}) must exceed telegram.poll_timeout_secs ({})",
                self.telegram.request_timeout_secs,
                self.telegram.poll_timeout_secs
            ));
        }

        let add = self.messages.add_button.trim();
        let list = self.messages.list_button.trim();
        if add.is_empty() || list.is_empty() {
            return Err(anyhow!("messages.add_button and messages.list_button must not be empty"));
        }
        if add == list {
            return Err(anyhow!("messages.add_button and messages.list_button must differ"));
        }
        if add.starts_with('/') || list.starts_with('/') {
            return Err(anyhow!("quick-action button labels must not start with '/'"));
        }

        Ok(())
    }
}

/// Task database settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("tasks.db")
}

/// Telegram Bot API client settings. The bot token is read from the
/// environment, never from these files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Long-poll wait passed to `getUpdates`.
    #[serde(default = "default_poll_timeout_secs")]
    pub poll_timeout_secs: u64,

    /// HTTP timeout for every request. Must exceed the long-poll wait.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            poll_timeout_secs: default_poll_timeout_secs(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_poll_timeout_secs() -> u64 {
    20
}

fn default_request_timeout_secs() -> u64 {
    30
}

/// Everything the bot says. `{id}` is replaced by a task id where it appears.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Messages {
    pub welcome: String,
    pub add_button: String,
    pub list_button: String,
    pub edit_button: String,
    pub delete_button: String,

    pub prompt_new_task: String,
    pub prompt_edit_text: String,

    pub task_added: String,
    pub task_updated: String,
    pub task_deleted: String,
    pub task_deleted_inline: String,
    pub task_deleted_toast: String,
    pub not_found: String,
    pub edit_failed: String,
    pub edit_target_not_found: String,

    pub no_tasks: String,
    pub choose_next: String,

    pub cancelled: String,
    pub nothing_to_cancel: String,
    pub no_pending_hint: String,

    pub delete_usage: String,
    pub edit_usage: String,

    pub unknown_button: String,
    pub invalid_id: String,
    pub unknown_action: String,

    pub storage_failure: String,
}

impl Default for Messages {
    fn default() -> Self {
        Self {
            welcome: "Hello! 👋\n\
                      Pick a button below or type a command:\n\n\
                      /add <text> — add a task\n\
                      /mytasks — show your tasks\n\
                      /delete <id> — delete a task\n\
                      /edit <id> <new text> — edit a task\n\
                      /cancel — cancel the current action"
                .to_string(),
            add_button: "Add task".to_string(),
            list_button: "My tasks".to_string(),
            edit_button: "✏️ Edit".to_string(),
            delete_button: "🗑️ Delete".to_string(),

            prompt_new_task: "✍️ Send the text of the new task (/cancel to abort).".to_string(),
            prompt_edit_text: "✏️ Send the new text for the task (/cancel to abort)."
                .to_string(),

            task_added: "✅ Task added (ID: {id}).".to_string(),
            task_updated: "✏️ Task (ID: {id}) updated.".to_string(),
            task_deleted: "🗑️ Task deleted.".to_string(),
            task_deleted_inline: "✅ Task (ID: {id}) deleted.".to_string(),
            task_deleted_toast: "Task deleted.".to_string(),
            not_found: "Not found or not yours.".to_string(),
            edit_failed: "Update failed: task not found or not yours.".to_string(),
            edit_target_not_found: "No such task.".to_string(),

            no_tasks: "You have no tasks.".to_string(),
            choose_next: "Choose another action:".to_string(),

            cancelled: "✅ Action cancelled.".to_string(),
            nothing_to_cancel: "Nothing to cancel.".to_string(),
            no_pending_hint: "To add a task, tap 'Add task' or send /add <text>.".to_string(),

            delete_usage: "Usage: /delete <id>. Example: /delete 3".to_string(),
            edit_usage: "Usage: /edit <id> <new text>".to_string(),

            unknown_button: "Unknown button.".to_string(),
            invalid_id: "Invalid ID.".to_string(),
            unknown_action: "Unknown action.".to_string(),

            storage_failure: "Something went wrong. Please try again later.".to_string(),
        }
    }
}

/// Substitute a task id into a message template.
pub fn with_id(template: &str, id: i64) -> String {
    template.replace("{id}", &id.to_string())
}
