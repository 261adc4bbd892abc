//! Tests for tiered configuration loading.
//!
//! Each test points the loader at temporary project and user directories so
//! nothing on the host is read.

use std::fs;
use std::path::{Path, PathBuf};
use task_chat_bot::config::{
    CONFIG_FILE_NAME, ConfigLoader, ConfigPaths, ConfigTier, DEFAULT_API_BASE_URL, Messages,
};
use tempfile::TempDir;

fn write_config(dir: &Path, yaml: &str) -> PathBuf {
    fs::create_dir_all(dir).unwrap();
    let file = dir.join(CONFIG_FILE_NAME);
    fs::write(&file, yaml).unwrap();
    file
}

struct Tiers {
    _root: TempDir,
    project: PathBuf,
    user: PathBuf,
}

fn tiers() -> Tiers {
    let root = TempDir::new().unwrap();
    let project = root.path().join("project");
    let user = root.path().join("user");
    Tiers {
        _root: root,
        project,
        user,
    }
}

impl Tiers {
    fn paths(&self) -> ConfigPaths {
        ConfigPaths::with_dirs(Some(self.project.clone()), Some(self.user.clone()))
    }
}

#[test]
fn no_files_gives_defaults() {
    let t = tiers();

    let loader = ConfigLoader::load_with_paths(t.paths()).unwrap();

    assert!(loader.sources().is_empty());
    let config = loader.config();
    assert_eq!(config.telegram.api_base_url, DEFAULT_API_BASE_URL);
    assert_eq!(config.telegram.poll_timeout_secs, 20);
    assert_eq!(config.messages, Messages::default());
}

#[test]
fn user_tier_overrides_project_tier() {
    let t = tiers();
    write_config(
        &t.project,
        "telegram:\n  poll_timeout_secs: 10\n  request_timeout_secs: 40\n\
         messages:\n  welcome: project hello\n",
    );
    write_config(&t.user, "telegram:\n  poll_timeout_secs: 25\n");

    let loader = ConfigLoader::load_with_paths(t.paths()).unwrap();

    let tiers: Vec<ConfigTier> = loader.sources().iter().map(|(tier, _)| *tier).collect();
    assert_eq!(tiers, vec![ConfigTier::Project, ConfigTier::User]);

    let config = loader.config();
    assert_eq!(config.telegram.poll_timeout_secs, 25);
    // Sibling from the lower tier survives the merge.
    assert_eq!(config.telegram.request_timeout_secs, 40);
    assert_eq!(config.messages.welcome, "project hello");
    assert_eq!(config.messages.add_button, Messages::default().add_button);
}

#[test]
fn malformed_tier_file_is_skipped() {
    let t = tiers();
    write_config(&t.project, "messages:\n  welcome: from project\n");
    write_config(&t.user, "telegram: [unclosed\n");

    let loader = ConfigLoader::load_with_paths(t.paths()).unwrap();

    assert_eq!(loader.sources().len(), 1);
    assert_eq!(loader.config().messages.welcome, "from project");
}

#[test]
fn merged_result_is_validated() {
    let t = tiers();
    write_config(&t.user, "telegram:\n  poll_timeout_secs: 60\n");

    let err = ConfigLoader::load_with_paths(t.paths()).unwrap_err();

    assert!(err.to_string().contains("request_timeout_secs"));
}

#[test]
fn conflicting_button_labels_are_rejected() {
    let t = tiers();
    write_config(&t.project, "messages:\n  add_button: Tasks\n  list_button: Tasks\n");

    assert!(ConfigLoader::load_with_paths(t.paths()).is_err());
}

#[test]
fn explicit_file_skips_tier_directories() {
    let t = tiers();
    write_config(&t.project, "messages:\n  welcome: from project\n");
    let explicit = write_config(
        &t._root.path().join("explicit"),
        "storage:\n  db_path: /tmp/explicit.db\n",
    );

    let mut paths = t.paths();
    paths.explicit_file = Some(explicit.clone());
    let loader = ConfigLoader::load_with_paths(paths).unwrap();

    assert_eq!(loader.sources(), &[(ConfigTier::Explicit, explicit)]);
    assert_eq!(loader.config().messages.welcome, Messages::default().welcome);
}

#[test]
fn missing_explicit_file_is_an_error() {
    let t = tiers();
    let mut paths = t.paths();
    paths.explicit_file = Some(t.project.join("nope.yaml"));

    assert!(ConfigLoader::load_with_paths(paths).is_err());
}
