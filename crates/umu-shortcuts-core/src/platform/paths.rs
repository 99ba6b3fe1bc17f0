//! Steam install and per-user paths.
//!
//! This module provides functions to locate:
//! - Steam installation roots
//! - Per-user `shortcuts.vdf` files under `userdata`
//! - The artwork `grid` directory
//! - This tool's own settings and backup locations

use crate::config::{AppConfig, BackupConfig, SteamConfig};
use crate::{Result, ShortcutError};
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Where Steam is usually installed, in lookup order.
///
/// # Platform Behavior
/// - **Linux**: `~/.steam/steam`, `~/.local/share/Steam`,
///   `~/.var/app/com.valvesoftware.Steam/data/Steam` (Flatpak)
/// - **Windows**: `C:\Program Files (x86)\Steam`
/// - **macOS**: `~/Library/Application Support/Steam`
pub fn steam_root_candidates() -> Vec<PathBuf> {
    #[allow(unused_mut)]
    let mut candidates = Vec::new();

    #[cfg(target_os = "linux")]
    {
        if let Some(home) = dirs::home_dir() {
            candidates.push(home.join(".steam").join("steam"));
            candidates.push(home.join(".local").join("share").join("Steam"));
            candidates.push(
                home.join(".var")
                    .join("app")
                    .join("com.valvesoftware.Steam")
                    .join("data")
                    .join("Steam"),
            );
        }
    }

    #[cfg(target_os = "windows")]
    {
        candidates.push(PathBuf::from(r"C:\Program Files (x86)\Steam"));
    }

    #[cfg(target_os = "macos")]
    {
        if let Some(home) = dirs::home_dir() {
            candidates.push(
                home.join("Library")
                    .join("Application Support")
                    .join("Steam"),
            );
        }
    }

    candidates
}

/// Resolve the Steam root.
///
/// An explicit root is used as-is if it exists. Otherwise the first
/// candidate that has a `userdata` directory wins.
pub fn find_steam_root(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(root) = explicit {
        if root.is_dir() {
            return Ok(root.to_path_buf());
        }
        return Err(ShortcutError::Config {
            message: format!("Steam root {} does not exist", root.display()),
        });
    }

    steam_root_candidates()
        .into_iter()
        .find(|candidate| {
            let found = candidate.join(SteamConfig::USERDATA_DIR).is_dir();
            debug!("Steam root candidate {}: {}", candidate.display(), found);
            found
        })
        .ok_or_else(|| ShortcutError::Config {
            message: "Could not find a Steam installation".to_string(),
        })
}

/// A Steam user's shortcut file location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserShortcuts {
    /// Steam3 account id (the `userdata` directory name).
    pub user_id: u32,
    pub path: PathBuf,
    pub exists: bool,
}

/// `<root>/userdata/<user>/config/shortcuts.vdf`. `user` must be numeric.
pub fn shortcuts_file(steam_root: &Path, user: &str) -> Result<PathBuf> {
    let user_id = parse_user_id(user)?;
    Ok(user_dir(steam_root, user_id)
        .join(SteamConfig::CONFIG_DIR)
        .join(SteamConfig::SHORTCUTS_FILE))
}

/// `<root>/userdata/<user>/config/grid`, where Steam looks for artwork.
pub fn grid_dir(steam_root: &Path, user: &str) -> Result<PathBuf> {
    let user_id = parse_user_id(user)?;
    Ok(user_dir(steam_root, user_id)
        .join(SteamConfig::CONFIG_DIR)
        .join(SteamConfig::GRID_DIR))
}

/// Every numeric `userdata` entry, sorted by user id. Non-numeric
/// directories (`anonymous`, `ac`, ...) are skipped.
pub fn discover_shortcut_files(steam_root: &Path) -> Result<Vec<UserShortcuts>> {
    let userdata = steam_root.join(SteamConfig::USERDATA_DIR);
    if !userdata.is_dir() {
        return Ok(Vec::new());
    }

    let mut users = Vec::new();
    for entry in WalkDir::new(&userdata).min_depth(1).max_depth(1) {
        let entry = entry.map_err(|e| ShortcutError::Config {
            message: format!("Failed to read {}: {}", userdata.display(), e),
        })?;
        if !entry.file_type().is_dir() {
            continue;
        }
        let Some(user_id) = entry
            .file_name()
            .to_str()
            .and_then(|name| name.parse::<u32>().ok())
        else {
            continue;
        };
        let path = entry
            .path()
            .join(SteamConfig::CONFIG_DIR)
            .join(SteamConfig::SHORTCUTS_FILE);
        users.push(UserShortcuts {
            user_id,
            exists: path.is_file(),
            path,
        });
    }

    users.sort_by_key(|u| u.user_id);
    Ok(users)
}

/// Default backup directory.
///
/// # Platform Behavior
/// - **Linux**: `~/.local/share/umu-shortcuts/backups`
/// - **Windows**: `%LOCALAPPDATA%\umu-shortcuts\backups`
/// - **macOS**: `~/Library/Application Support/umu-shortcuts/backups`
pub fn default_backup_dir() -> Result<PathBuf> {
    let base = dirs::data_local_dir().ok_or_else(|| ShortcutError::Config {
        message: "Could not determine local data directory".to_string(),
    })?;
    Ok(base.join(AppConfig::APP_NAME).join(BackupConfig::DIR_NAME))
}

/// Settings file location under the user config directory.
pub fn settings_path() -> Result<PathBuf> {
    let base = dirs::config_dir().ok_or_else(|| ShortcutError::Config {
        message: "Could not determine config directory".to_string(),
    })?;
    Ok(base.join(AppConfig::APP_NAME).join(AppConfig::SETTINGS_FILENAME))
}

fn user_dir(steam_root: &Path, user_id: u32) -> PathBuf {
    steam_root
        .join(SteamConfig::USERDATA_DIR)
        .join(user_id.to_string())
}

fn parse_user_id(user: &str) -> Result<u32> {
    user.trim()
        .parse::<u32>()
        .map_err(|_| ShortcutError::validation("user", format!("{:?} is not a numeric Steam user id", user)))
}
