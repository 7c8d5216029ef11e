//! Runtime configuration.
//!
//! # Responsibility
//! - Resolve database path, storage key and logging settings.
//! - Layer defaults, environment variables and explicit overrides.
//!
//! # Invariants
//! - Blank environment values are ignored rather than treated as paths.
//! - The storage key always names a version-qualified layout.

use crate::logging::default_log_level;
use crate::repo::snapshot_repo::STORAGE_KEY;
use std::path::PathBuf;

pub const ENV_DB_PATH: &str = "TASKBIN_DB_PATH";
pub const ENV_STORAGE_KEY: &str = "TASKBIN_STORAGE_KEY";
pub const ENV_LOG_LEVEL: &str = "TASKBIN_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "TASKBIN_LOG_DIR";

const APP_DIR_NAME: &str = "taskbin";
const DB_FILE_NAME: &str = "taskbin.sqlite3";

/// Resolved runtime settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub db_path: PathBuf,
    pub storage_key: String,
    pub log_level: String,
    pub log_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        let app_dir = dirs::data_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join(APP_DIR_NAME);
        Self {
            db_path: app_dir.join(DB_FILE_NAME),
            storage_key: STORAGE_KEY.to_string(),
            log_level: default_log_level().to_string(),
            log_dir: app_dir.join("logs"),
        }
    }
}

impl AppConfig {
    /// Defaults overridden by process environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by values from `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_blank = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let mut config = Self::default();
        if let Some(path) = non_blank(ENV_DB_PATH) {
            config.db_path = PathBuf::from(path);
        }
        if let Some(key) = non_blank(ENV_STORAGE_KEY) {
            config.storage_key = key;
        }
        if let Some(level) = non_blank(ENV_LOG_LEVEL) {
            config.log_level = level;
        }
        if let Some(dir) = non_blank(ENV_LOG_DIR) {
            config.log_dir = PathBuf::from(dir);
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::{AppConfig, ENV_DB_PATH, ENV_LOG_LEVEL, ENV_STORAGE_KEY};
    use crate::repo::snapshot_repo::STORAGE_KEY;
    use std::path::PathBuf;

    #[test]
    fn defaults_use_current_storage_key() {
        let config = AppConfig::from_lookup(|_| None);
        assert_eq!(config.storage_key, STORAGE_KEY);
        assert!(config.db_path.ends_with("taskbin/taskbin.sqlite3"));
    }

    #[test]
    fn environment_overrides_ignore_blank_values() {
        let config = AppConfig::from_lookup(|key| match key {
            ENV_DB_PATH => Some(" /tmp/tb.sqlite3 ".to_string()),
            ENV_STORAGE_KEY => Some("   ".to_string()),
            ENV_LOG_LEVEL => Some("warn".to_string()),
            _ => None,
        });

        assert_eq!(config.db_path, PathBuf::from("/tmp/tb.sqlite3"));
        assert_eq!(config.storage_key, STORAGE_KEY);
        assert_eq!(config.log_level, "warn");
    }
}
