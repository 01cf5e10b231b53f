//! Storage paths and policy configuration.
//!
//! `StorageConfig` is the single source of truth for where tracker data
//! lives; tests inject a temp root via [`StorageConfig::with_root`].
//! `PolicyConfig` is the externally-owned tuning surface for the observation
//! policy: the engine consumes the intervals, it never hardcodes them.

use std::path::{Path, PathBuf};

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::policy::ObservePolicy;

/// Central configuration for all tracker storage paths.
///
/// Production code uses `StorageConfig::default()` which points to
/// `~/.presence-tracker/`.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    root: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        Self {
            root: home.join(".presence-tracker"),
        }
    }
}

impl StorageConfig {
    /// Creates a StorageConfig with a custom root directory.
    /// Used for testing with temp directories.
    pub fn with_root(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path to history.json (the subject→history snapshot).
    pub fn history_file(&self) -> PathBuf {
        self.root.join("history.json")
    }

    /// Path to config.json (policy tuning).
    pub fn config_file(&self) -> PathBuf {
        self.root.join("config.json")
    }
}

/// On-disk policy tuning, in whole seconds.
///
/// Earlier tracker revisions shipped three hardcoded variants (no gate,
/// 1 minute, 5 minutes); this file is where a deployment picks one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyConfig {
    #[serde(default = "default_min_change_interval_secs")]
    pub min_change_interval_secs: i64,
    #[serde(default = "default_gap_threshold_secs")]
    pub gap_threshold_secs: i64,
}

fn default_min_change_interval_secs() -> i64 {
    60
}

fn default_gap_threshold_secs() -> i64 {
    30 * 60
}

impl Default for PolicyConfig {
    fn default() -> Self {
        PolicyConfig {
            min_change_interval_secs: default_min_change_interval_secs(),
            gap_threshold_secs: default_gap_threshold_secs(),
        }
    }
}

impl PolicyConfig {
    pub fn to_policy(&self) -> ObservePolicy {
        ObservePolicy::new(
            Duration::seconds(self.min_change_interval_secs),
            Duration::seconds(self.gap_threshold_secs),
        )
    }
}

/// Loads the policy configuration, returning defaults if the file is missing
/// or unreadable.
pub fn load_policy_config(storage: &StorageConfig) -> PolicyConfig {
    fs_err::read_to_string(storage.config_file())
        .ok()
        .and_then(|c| serde_json::from_str(&c).ok())
        .unwrap_or_default()
}

/// Saves the policy configuration to disk.
pub fn save_policy_config(storage: &StorageConfig, config: &PolicyConfig) -> Result<(), String> {
    let content = serde_json::to_string_pretty(config)
        .map_err(|e| format!("Failed to serialize config: {}", e))?;
    fs_err::create_dir_all(storage.root())
        .map_err(|e| format!("Failed to create config directory: {}", e))?;
    fs_err::write(storage.config_file(), content)
        .map_err(|e| format!("Failed to write config: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn paths_hang_off_the_root() {
        let storage = StorageConfig::with_root(PathBuf::from("/data/tracker"));
        assert_eq!(
            storage.history_file(),
            PathBuf::from("/data/tracker/history.json")
        );
        assert_eq!(
            storage.config_file(),
            PathBuf::from("/data/tracker/config.json")
        );
    }

    #[test]
    fn missing_config_file_yields_defaults() {
        let temp = tempdir().unwrap();
        let storage = StorageConfig::with_root(temp.path().to_path_buf());
        assert_eq!(load_policy_config(&storage), PolicyConfig::default());
    }

    #[test]
    fn config_round_trips() {
        let temp = tempdir().unwrap();
        let storage = StorageConfig::with_root(temp.path().to_path_buf());

        let config = PolicyConfig {
            min_change_interval_secs: 300,
            gap_threshold_secs: 3600,
        };
        save_policy_config(&storage, &config).unwrap();
        assert_eq!(load_policy_config(&storage), config);
    }

    #[test]
    fn partial_config_fills_in_defaults() {
        let temp = tempdir().unwrap();
        let storage = StorageConfig::with_root(temp.path().to_path_buf());
        std::fs::write(storage.config_file(), r#"{"min_change_interval_secs":0}"#).unwrap();

        let config = load_policy_config(&storage);
        assert_eq!(config.min_change_interval_secs, 0);
        assert_eq!(config.gap_threshold_secs, 30 * 60);
    }

    #[test]
    fn to_policy_converts_seconds() {
        let config = PolicyConfig {
            min_change_interval_secs: 60,
            gap_threshold_secs: 1800,
        };
        let policy = config.to_policy();
        assert_eq!(policy.min_change_interval, Duration::seconds(60));
        assert_eq!(policy.gap_threshold, Duration::minutes(30));
    }
}
