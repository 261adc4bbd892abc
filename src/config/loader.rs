//! Configuration loader with tier-based merging.
//!
//! Tiers, lowest priority first: embedded defaults, the project directory,
//! the user directory, then environment variables. YAML files are merged
//! field by field, so a tier only needs to name the settings it changes.

use super::types::Config;
use anyhow::Result;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Name of the configuration file looked up in each tier directory.
pub const CONFIG_FILE_NAME: &str = "config.yaml";

/// Configuration tier priority (lowest to highest).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ConfigTier {
    Defaults = 0,
    Project = 1,
    User = 2,
    Explicit = 3,
    Environment = 4,
}

impl std::fmt::Display for ConfigTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigTier::Defaults => write!(f, "defaults"),
            ConfigTier::Project => write!(f, "project"),
            ConfigTier::User => write!(f, "user"),
            ConfigTier::Explicit => write!(f, "explicit"),
            ConfigTier::Environment => write!(f, "environment"),
        }
    }
}

/// Where each tier is read from.
#[derive(Debug, Clone, Default)]
pub struct ConfigPaths {
    /// Explicit config file. When set, the project and user tiers are skipped.
    pub explicit_file: Option<PathBuf>,
    pub project_dir: Option<PathBuf>,
    pub user_dir: Option<PathBuf>,
}

impl ConfigPaths {
    /// Discover configuration paths from environment and defaults.
    pub fn discover() -> Self {
        let explicit_file = std::env::var("TASK_BOT_CONFIG_PATH").ok().map(PathBuf::from);

        // Project dir: TASK_BOT_PROJECT_DIR or $CWD/task-chat-bot
        let project_dir = std::env::var("TASK_BOT_PROJECT_DIR")
            .ok()
            .map(PathBuf::from)
            .or_else(|| Some(PathBuf::from("task-chat-bot")));

        // User dir: TASK_BOT_USER_DIR or ~/.task-chat-bot
        let user_dir = std::env::var("TASK_BOT_USER_DIR")
            .ok()
            .map(PathBuf::from)
            .or_else(|| dirs::home_dir().map(|h| h.join(".task-chat-bot")));

        Self {
            explicit_file,
            project_dir,
            user_dir,
        }
    }

    /// Create paths with explicit directories.
    pub fn with_dirs(project_dir: Option<PathBuf>, user_dir: Option<PathBuf>) -> Self {
        Self {
            explicit_file: None,
            project_dir,
            user_dir,
        }
    }
}

/// Configuration loader that handles tier-based merging.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    pub paths: ConfigPaths,
    config: Config,
    /// Config files that contributed, lowest tier first.
    sources: Vec<(ConfigTier, PathBuf)>,
}

impl ConfigLoader {
    /// Load configuration with explicit paths.
    pub fn load_with_paths(paths: ConfigPaths) -> Result<Self> {
        if let Some(ref explicit) = paths.explicit_file {
            let mut config = Config::load(explicit)?;
            Self::apply_env_overrides(&mut config);
            config.validate()?;
            let sources = vec![(ConfigTier::Explicit, explicit.clone())];
            return Ok(Self {
                paths,
                config,
                sources,
            });
        }

        let mut merged = serde_json::to_value(Config::default())?;
        let mut sources = Vec::new();

        let tiers = [
            (ConfigTier::Project, paths.project_dir.as_deref()),
            (ConfigTier::User, paths.user_dir.as_deref()),
        ];
        for (tier, dir) in tiers {
            let Some(dir) = dir else { continue };
            let file = dir.join(CONFIG_FILE_NAME);
            if let Some(overlay) = read_yaml(&file, tier) {
                merge_into(&mut merged, overlay);
                sources.push((tier, file));
            }
        }

        let mut config: Config = serde_json::from_value(merged)?;
        Self::apply_env_overrides(&mut config);
        config.validate()?;

        Ok(Self {
            paths,
            config,
            sources,
        })
    }

    fn apply_env_overrides(config: &mut Config) {
        if let Ok(db_path) = std::env::var("TASK_BOT_DB_PATH") {
            config.storage.db_path = PathBuf::from(db_path);
        }

        if let Ok(base_url) = std::env::var("TASK_BOT_API_BASE_URL") {
            let base_url = base_url.trim();
            if !base_url.is_empty() {
                config.telegram.api_base_url = base_url.to_string();
            }
        }
    }

    /// Config files that were merged, lowest tier first.
    pub fn sources(&self) -> &[(ConfigTier, PathBuf)] {
        &self.sources
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    pub fn into_config(self) -> Config {
        self.config
    }
}

// Unreadable or malformed tier files are skipped with a warning rather than
// aborting startup.
fn read_yaml(file: &Path, tier: ConfigTier) -> Option<Value> {
    if !file.exists() {
        return None;
    }
    let content = match std::fs::read_to_string(file) {
        Ok(content) => content,
        Err(e) => {
            warn!(
                tier = %tier,
                path = %file.display(),
                error = %e,
                "Skipping unreadable config file"
            );
            return None;
        }
    };
    match serde_yaml::from_str::<Value>(&content) {
        Ok(value) => {
            debug!(tier = %tier, path = %file.display(), "Loaded config file");
            Some(value)
        }
        Err(e) => {
            warn!(
                tier = %tier,
                path = %file.display(),
                error = %e,
                "Skipping malformed config file"
            );
            None
        }
    }
}

/// Merge `overlay` into `base`. Objects merge key by key, a null overlay
/// keeps the base, anything else replaces it.
pub fn merge_into(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            for (key, value) in overlay_map {
                match base_map.get_mut(&key) {
                    Some(existing) => merge_into(existing, value),
                    None => {
                        base_map.insert(key, value);
                    }
                }
            }
        }
        (_, Value::Null) => {}
        (base, overlay) => *base = overlay,
    }
}
