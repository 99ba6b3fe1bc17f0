//! In-memory tree for binary VDF documents.

/// Marker byte opening a nested map.
pub const MARKER_MAP: u8 = 0x00;
/// Marker byte for a NUL-terminated string value.
pub const MARKER_STRING: u8 = 0x01;
/// Marker byte for a little-endian 32-bit integer value.
pub const MARKER_INT32: u8 = 0x02;
/// Byte closing a map (and the document root).
pub const MARKER_MAP_END: u8 = 0x08;

/// One value in a VDF tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Map(VdfMap),
    Str(String),
    Int32(i32),
}

impl Node {
    /// The nested map, if this is a map node.
    pub fn as_map(&self) -> Option<&VdfMap> {
        match self {
            Node::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Mutable access to the nested map, if this is a map node.
    pub fn as_map_mut(&mut self) -> Option<&mut VdfMap> {
        match self {
            Node::Map(map) => Some(map),
            _ => None,
        }
    }

    /// The string value, if this is a string node.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Node::Str(s) => Some(s),
            _ => None,
        }
    }

    /// The integer value, if this is an int32 node.
    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Node::Int32(v) => Some(*v),
            _ => None,
        }
    }
}

impl From<VdfMap> for Node {
    fn from(map: VdfMap) -> Self {
        Node::Map(map)
    }
}

impl From<String> for Node {
    fn from(s: String) -> Self {
        Node::Str(s)
    }
}

impl From<&str> for Node {
    fn from(s: &str) -> Self {
        Node::Str(s.to_string())
    }
}

impl From<i32> for Node {
    fn from(v: i32) -> Self {
        Node::Int32(v)
    }
}

/// Insertion-ordered key → node mapping.
///
/// Keys are unique. Re-inserting an existing key replaces its value in place,
/// so the encoded order only changes when keys are added or removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VdfMap {
    entries: Vec<(String, Node)>,
}

impl VdfMap {
    /// An empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the map has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Exact-case lookup.
    pub fn get(&self, key: &str) -> Option<&Node> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Exact-case mutable lookup.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut Node> {
        self.entries
            .iter_mut()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Case-insensitive lookup returning the stored key as well.
    ///
    /// Steam is not consistent about key casing across client versions
    /// (`appid` vs `AppID`, `AppName` vs `appname`).
    pub fn get_ignore_case(&self, key: &str) -> Option<(&str, &Node)> {
        self.entries
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(k, v)| (k.as_str(), v))
    }

    /// Whether `key` is present (exact case).
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Insert or replace. Returns the previous value for `key`, if any.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Node>) -> Option<Node> {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    /// Remove `key`, preserving the order of the remaining entries.
    pub fn remove(&mut self, key: &str) -> Option<Node> {
        let index = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(index).1)
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Node)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }
}

impl<K: Into<String>, V: Into<Node>> FromIterator<(K, V)> for VdfMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = VdfMap::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

impl IntoIterator for VdfMap {
    type Item = (String, Node);
    type IntoIter = std::vec::IntoIter<(String, Node)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
