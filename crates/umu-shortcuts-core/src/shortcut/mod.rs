//! Steam non-Steam-game shortcuts.
//!
//! - `app_id`: executable hash to signed 32-bit app id, artwork names
//! - `record`: typed view of one entry
//! - `file`: the `shortcuts` map with sequence-key assignment
//! - `registry`: load, add, remove and persist with backups

mod app_id;
mod file;
mod record;
mod registry;

pub use app_id::{
    app_id_for_bytes, app_id_for_executable, candidate_from_digest, finalize_candidate,
    hash_executable, random_negative_id, ArtworkKind, ShortcutAppId,
};
pub use file::{next_index, ShortcutFile};
pub use record::{quote, unquote, ShortcutRecord, FIELD_ORDER};
pub use registry::{AddOutcome, AddedShortcut, NewShortcut, ShortcutRegistry};
