//! Centralized configuration for umu-shortcuts.
//!
//! Constants for the Steam file layout, backup rotation and hashing, plus the
//! user-editable [`Settings`] file.

use crate::persist::{atomic_read_json, atomic_write_json};
use crate::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Application-level configuration.
pub struct AppConfig;

impl AppConfig {
    pub const APP_NAME: &'static str = "umu-shortcuts";
    pub const SETTINGS_FILENAME: &'static str = "settings.json";
}

/// Steam client file layout.
pub struct SteamConfig;

impl SteamConfig {
    pub const SHORTCUTS_FILE: &'static str = "shortcuts.vdf";
    pub const ROOT_KEY: &'static str = "shortcuts";
    pub const USERDATA_DIR: &'static str = "userdata";
    pub const CONFIG_DIR: &'static str = "config";
    pub const GRID_DIR: &'static str = "grid";
}

/// Backup rotation.
pub struct BackupConfig;

impl BackupConfig {
    pub const MAX_BACKUPS: usize = 5;
    pub const DIR_NAME: &'static str = "backups";
    pub const FILE_PREFIX: &'static str = "shortcuts_";
    pub const FILE_EXTENSION: &'static str = "vdf";
}

/// Executable hashing.
pub struct HashConfig;

impl HashConfig {
    /// Read chunk size when streaming an executable through SHA-256.
    pub const CHUNK_SIZE: usize = 1024 * 1024;
}

/// User settings persisted as JSON.
///
/// Every field is optional on disk; missing fields take their defaults so an
/// older or hand-written file still loads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Steam installation root. Discovered when unset.
    pub steam_root: Option<PathBuf>,
    /// Numeric Steam user id whose `shortcuts.vdf` is edited by default.
    pub steam_user: Option<String>,
    /// Where backups are kept. Defaults to the platform data dir.
    pub backup_dir: Option<PathBuf>,
    /// Number of backups kept before the oldest is pruned.
    pub max_backups: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            steam_root: None,
            steam_user: None,
            backup_dir: None,
            max_backups: BackupConfig::MAX_BACKUPS,
        }
    }
}

impl Settings {
    /// Load settings from `path`, falling back to defaults when the file is absent.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        match atomic_read_json::<Settings>(path)? {
            Some(settings) => {
                debug!("Loaded settings from {}", path.display());
                Ok(settings)
            }
            None => {
                debug!("No settings at {}, using defaults", path.display());
                Ok(Self::default())
            }
        }
    }

    /// Write settings to `path` atomically.
    pub fn save(&self, path: &Path) -> Result<()> {
        atomic_write_json(path, self)
    }

    /// Backup cap, never below one.
    pub fn effective_max_backups(&self) -> usize {
        self.max_backups.max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.max_backups, 5);
        assert!(settings.steam_root.is_none());
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let settings = Settings::load_or_default(&temp_dir.path().join("nope.json")).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_save_and_reload() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join(AppConfig::SETTINGS_FILENAME);

        let settings = Settings {
            steam_root: Some(PathBuf::from("/home/user/.steam/steam")),
            steam_user: Some("12345".to_string()),
            backup_dir: None,
            max_backups: 3,
        };
        settings.save(&path).unwrap();

        let loaded = Settings::load_or_default(&path).unwrap();
        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("settings.json");
        std::fs::write(&path, r#"{"steam_user": "42"}"#).unwrap();

        let loaded = Settings::load_or_default(&path).unwrap();
        assert_eq!(loaded.steam_user.as_deref(), Some("42"));
        assert_eq!(loaded.max_backups, BackupConfig::MAX_BACKUPS);
    }

    #[test]
    fn test_effective_max_backups_floor() {
        let settings = Settings {
            max_backups: 0,
            ..Settings::default()
        };
        assert_eq!(settings.effective_max_backups(), 1);
    }
}
