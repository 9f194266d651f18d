//! Persistence of the last used destination.
//!
//! A tiny JSON record, `{"last_dest": "..."}`. Losing it is harmless, so
//! hosts normally go through [`ConfigStore::load_or_default`] and
//! [`ConfigStore::save_best_effort`], which never fail.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::EngineError;

const APP_DIR: &str = "mediasort";
const CONFIG_FILE: &str = "config.json";
const FALLBACK_CONFIG_FILE: &str = "media_sorter_config.json";

/// Settings remembered between launches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(rename = "last_dest", default)]
    pub last_destination: String,
}

/// Location of the config file.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        ConfigStore { path: path.into() }
    }

    /// Store at the platform config directory, or the working directory if
    /// there is none.
    pub fn at_default_location() -> Self {
        Self::new(Self::default_path())
    }

    pub fn default_path() -> PathBuf {
        match dirs::config_dir() {
            Some(dir) => dir.join(APP_DIR).join(CONFIG_FILE),
            None => PathBuf::from(FALLBACK_CONFIG_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<AppConfig, EngineError> {
        let raw = fs::read_to_string(&self.path).map_err(|e| EngineError::ConfigIo {
            path: self.path.clone(),
            source: e,
        })?;
        serde_json::from_str(&raw).map_err(|e| EngineError::ConfigParse {
            path: self.path.clone(),
            source: e,
        })
    }

    pub fn save(&self, config: &AppConfig) -> Result<(), EngineError> {
        let io_err = |e| EngineError::ConfigIo {
            path: self.path.clone(),
            source: e,
        };
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(io_err)?;
            }
        }
        let raw = serde_json::to_string(config).map_err(|e| EngineError::ConfigParse {
            path: self.path.clone(),
            source: e,
        })?;
        fs::write(&self.path, raw).map_err(io_err)
    }

    /// Load, or fall back to an empty config on any failure.
    pub fn load_or_default(&self) -> AppConfig {
        self.load().unwrap_or_else(|e| {
            debug!(error = %e, "using default config");
            AppConfig::default()
        })
    }

    /// Save, ignoring failures.
    pub fn save_best_effort(&self, config: &AppConfig) {
        if let Err(e) = self.save(config) {
            debug!(error = %e, "config not saved");
        }
    }

    /// Remember `destination` as the last used one.
    pub fn remember_destination(&self, destination: &str) {
        self.save_best_effort(&AppConfig {
            last_destination: destination.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_then_load() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let store = ConfigStore::new(temp_dir.path().join("nested").join("config.json"));

        store.remember_destination("/media/photos");

        let config = store.load().expect("Failed to load config");
        assert_eq!(config.last_destination, "/media/photos");
    }

    #[test]
    fn test_file_uses_last_dest_key() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = temp_dir.path().join("config.json");
        fs::write(&path, r#"{"last_dest": "D:\\Sorted"}"#).expect("Failed to write config");

        let config = ConfigStore::new(&path).load().expect("Failed to load config");
        assert_eq!(config.last_destination, "D:\\Sorted");
    }

    #[test]
    fn test_missing_or_corrupt_config_falls_back_to_empty() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let missing = ConfigStore::new(temp_dir.path().join("absent.json"));
        assert_eq!(missing.load_or_default(), AppConfig::default());
        assert!(matches!(missing.load(), Err(EngineError::ConfigIo { .. })));

        let corrupt_path = temp_dir.path().join("corrupt.json");
        fs::write(&corrupt_path, "not json").expect("Failed to write config");
        let corrupt = ConfigStore::new(&corrupt_path);
        assert_eq!(corrupt.load_or_default().last_destination, "");
        assert!(matches!(corrupt.load(), Err(EngineError::ConfigParse { .. })));
    }

    #[test]
    fn test_unwritable_location_is_ignored() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let blocker = temp_dir.path().join("blocker");
        fs::write(&blocker, "file").expect("Failed to write blocker");
        let store = ConfigStore::new(blocker.join("config.json"));

        // Must not panic or propagate.
        store.remember_destination("/media");
        assert!(store.save(&AppConfig::default()).is_err());
    }
}
