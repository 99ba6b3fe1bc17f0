//! umu-shortcuts - non-Steam game shortcuts for Steam.
//!
//! Reads and writes Steam's binary `shortcuts.vdf`, derives stable app ids
//! for executables, and keeps a bounded set of per-session backups so every
//! change can be undone.
//!
//! # Example
//!
//! ```rust,no_run
//! use umu_shortcuts::{BackupSet, NewShortcut, SessionId, ShortcutRegistry};
//!
//! fn main() -> umu_shortcuts::Result<()> {
//!     let registry = ShortcutRegistry::new(
//!         "/home/deck/.steam/steam/userdata/22/config/shortcuts.vdf",
//!         BackupSet::with_default_cap("/home/deck/.local/share/umu-shortcuts/backups"),
//!     );
//!     let session = SessionId::generate();
//!
//!     let added = registry.add_shortcut(
//!         &NewShortcut::new("Celeste", "/home/deck/Games/celeste/Celeste.exe"),
//!         &session,
//!     )?;
//!     println!("{} -> {}", added.record.name, added.record.app_id);
//!     Ok(())
//! }
//! ```

pub mod backup;
pub mod config;
pub mod error;
pub mod game_id;
pub mod persist;
pub mod platform;
pub mod shortcut;
pub mod vdf;

// Re-export commonly used types
pub use backup::{BackupEntry, BackupOutcome, BackupSet, SessionId};
pub use config::Settings;
pub use error::{Result, ShortcutError};
pub use game_id::{umu_id, GameIdField, SteamSearchApp};
pub use shortcut::{
    app_id_for_executable, next_index, AddOutcome, AddedShortcut, ArtworkKind, NewShortcut,
    ShortcutAppId, ShortcutFile, ShortcutRecord, ShortcutRegistry,
};
pub use vdf::{Node, VdfMap};
