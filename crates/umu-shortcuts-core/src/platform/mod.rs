//! Platform-specific locations.
//!
//! All `#[cfg]` blocks for OS-specific behavior live here. The rest of the
//! crate works on explicit paths handed in by the caller.

pub mod paths;

pub use paths::{
    default_backup_dir, discover_shortcut_files, find_steam_root, grid_dir, settings_path,
    shortcuts_file, steam_root_candidates, UserShortcuts,
};

/// Returns the current platform name.
pub fn current_platform() -> &'static str {
    #[cfg(target_os = "linux")]
    {
        "linux"
    }
    #[cfg(target_os = "windows")]
    {
        "windows"
    }
    #[cfg(target_os = "macos")]
    {
        "macos"
    }
    #[cfg(not(any(target_os = "linux", target_os = "windows", target_os = "macos")))]
    {
        "unknown"
    }
}
