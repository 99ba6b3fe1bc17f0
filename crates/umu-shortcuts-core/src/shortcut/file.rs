//! The decoded contents of one `shortcuts.vdf`.

use super::app_id::ShortcutAppId;
use super::record::ShortcutRecord;
use crate::config::SteamConfig;
use crate::persist::read_optional;
use crate::vdf::{self, Node, VdfMap};
use crate::{Result, ShortcutError};
use std::path::Path;
use tracing::{debug, warn};

/// Ordered `id → entry` mapping wrapped under the `shortcuts` root key.
///
/// The raw entry tree is kept as decoded, so entries this crate did not create
/// are written back untouched. [`ShortcutRecord`] is only a typed view over it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortcutFile {
    root_key: String,
    entries: VdfMap,
    /// Root keys other than `shortcuts`, written after it.
    siblings: VdfMap,
}

impl Default for ShortcutFile {
    fn default() -> Self {
        Self::new()
    }
}

impl ShortcutFile {
    /// An empty file: `shortcuts` with no entries.
    pub fn new() -> Self {
        Self {
            root_key: SteamConfig::ROOT_KEY.to_string(),
            entries: VdfMap::new(),
            siblings: VdfMap::new(),
        }
    }

    /// Wrap a decoded tree. The root must hold a `shortcuts` map (any casing);
    /// an entirely empty root is treated as an empty file.
    pub fn from_tree(mut root: VdfMap) -> Result<Self> {
        if root.is_empty() {
            return Ok(Self::new());
        }

        let root_key = root
            .get_ignore_case(SteamConfig::ROOT_KEY)
            .map(|(key, _)| key.to_string())
            .ok_or_else(|| {
                ShortcutError::malformed(
                    0,
                    format!("no {:?} map at document root", SteamConfig::ROOT_KEY),
                )
            })?;

        match root.remove(&root_key) {
            Some(Node::Map(entries)) => Ok(Self {
                root_key,
                entries,
                siblings: root,
            }),
            _ => Err(ShortcutError::malformed(
                0,
                format!("root key {:?} is not a map", root_key),
            )),
        }
    }

    /// Rebuild the full document tree.
    pub fn to_tree(&self) -> VdfMap {
        let mut root = VdfMap::new();
        root.insert(self.root_key.as_str(), self.entries.clone());
        for (key, node) in self.siblings.iter() {
            root.insert(key, node.clone());
        }
        root
    }

    /// Decode file bytes. A zero-length buffer is an empty file.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        if bytes.is_empty() {
            return Ok(Self::new());
        }
        Self::from_tree(vdf::decode(bytes)?)
    }

    pub fn encode(&self) -> Result<Vec<u8>> {
        vdf::encode(&self.to_tree())
    }

    /// Read and decode `path`; a missing or empty file yields an empty set.
    pub fn load(path: &Path) -> Result<Self> {
        match read_optional(path)? {
            Some(bytes) => {
                let file = Self::decode(&bytes)?;
                debug!(
                    "Loaded {} shortcuts from {}",
                    file.len(),
                    path.display()
                );
                Ok(file)
            }
            None => {
                debug!("{} does not exist yet, starting empty", path.display());
                Ok(Self::new())
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys()
    }

    /// Key the next inserted entry will get.
    pub fn next_index(&self) -> Result<String> {
        next_index(self.keys())
    }

    /// Append `record` under the next free key, which is also written to
    /// `record.id`. Returns the key.
    pub fn insert(&mut self, mut record: ShortcutRecord) -> Result<String> {
        let key = self.next_index()?;
        record.id = key.clone();
        self.entries.insert(key.clone(), record.to_node());
        Ok(key)
    }

    /// Remove the entry under `key`.
    pub fn remove(&mut self, key: &str) -> Option<Node> {
        self.entries.remove(key)
    }

    /// Typed view of every entry. Entries that are not maps or cannot be
    /// read as a shortcut are skipped with a warning.
    pub fn records(&self) -> Vec<ShortcutRecord> {
        self.entries
            .iter()
            .filter_map(|(key, node)| {
                let Some(map) = node.as_map() else {
                    warn!("Skipping non-map shortcut entry {:?}", key);
                    return None;
                };
                match ShortcutRecord::from_node(key, map) {
                    Ok(record) => Some(record),
                    Err(e) => {
                        warn!("Skipping unreadable shortcut entry {:?}: {}", key, e);
                        None
                    }
                }
            })
            .collect()
    }

    pub fn find_by_app_id(&self, app_id: ShortcutAppId) -> Option<ShortcutRecord> {
        self.records().into_iter().find(|r| r.app_id == app_id)
    }
}

/// Next sequence key: highest integer key + 1, or `"0"` when none parse.
///
/// Keys that are not integers are ignored, so hand-edited or foreign entries
/// do not block assignment. A highest key of `i64::MAX` has no successor and
/// is reported as a validation error.
pub fn next_index<'a>(keys: impl IntoIterator<Item = &'a str>) -> Result<String> {
    let max = keys
        .into_iter()
        .filter_map(|key| match key.parse::<i64>() {
            Ok(n) => Some(n),
            Err(_) => {
                debug!("Ignoring non-numeric shortcut key {:?}", key);
                None
            }
        })
        .max()
        .unwrap_or(-1);
    max.checked_add(1)
        .map(|next| next.to_string())
        .ok_or_else(|| {
            ShortcutError::validation(
                "key",
                format!("shortcut key {} has no successor", max),
            )
        })
}
