//! Typed view of one `shortcuts.vdf` entry.
//!
//! The wire form is stringly typed (`"0"`/`"1"` booleans, decimal integers,
//! quoted executable path). Conversion happens only here, at the codec edge.

use super::app_id::ShortcutAppId;
use crate::vdf::{Node, VdfMap};
use crate::{Result, ShortcutError};

/// Wire keys of the fixed fields, in the order they are written.
pub const FIELD_ORDER: [&str; 13] = [
    KEY_APP_ID,
    KEY_APP_NAME,
    KEY_EXE,
    KEY_START_DIR,
    KEY_ICON,
    KEY_SHORTCUT_PATH,
    KEY_LAUNCH_OPTIONS,
    KEY_IS_HIDDEN,
    KEY_ALLOW_DESKTOP_CONFIG,
    KEY_ALLOW_OVERLAY,
    KEY_IN_GAME,
    KEY_LAST_PLAY_TIME,
    KEY_FLATPAK_APP_ID,
];

const KEY_APP_ID: &str = "appid";
const KEY_APP_NAME: &str = "AppName";
const KEY_EXE: &str = "Exe";
const KEY_START_DIR: &str = "StartDir";
const KEY_ICON: &str = "icon";
const KEY_SHORTCUT_PATH: &str = "ShortcutPath";
const KEY_LAUNCH_OPTIONS: &str = "LaunchOptions";
const KEY_IS_HIDDEN: &str = "IsHidden";
const KEY_ALLOW_DESKTOP_CONFIG: &str = "AllowDesktopConfig";
const KEY_ALLOW_OVERLAY: &str = "AllowOverlay";
const KEY_IN_GAME: &str = "InGame";
const KEY_LAST_PLAY_TIME: &str = "LastPlayTime";
const KEY_FLATPAK_APP_ID: &str = "FlatpakAppID";

/// One non-Steam game entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortcutRecord {
    /// Sequence key under `shortcuts`. Assigned by the registry on insert.
    pub id: String,
    pub app_id: ShortcutAppId,
    /// Display title.
    pub name: String,
    /// Absolute executable path, unquoted. Quoted on the wire.
    pub executable_path: String,
    pub start_dir: String,
    /// Empty string means "no icon".
    pub icon_path: String,
    pub shortcut_path: String,
    pub launch_options: String,
    pub is_hidden: bool,
    pub allow_desktop_config: bool,
    pub allow_overlay: bool,
    pub in_game: bool,
    /// Unix timestamp of the last launch, 0 if never launched.
    pub last_play_time: i64,
    /// Empty for non-Flatpak entries.
    pub flatpak_app_id: String,
    /// Fields this crate does not model (`OpenVR`, `tags`, ...), in file order.
    pub extra: VdfMap,
}

impl ShortcutRecord {
    /// New record with Steam's defaults for a freshly added shortcut.
    pub fn new(
        name: impl Into<String>,
        executable_path: impl Into<String>,
        app_id: ShortcutAppId,
    ) -> Self {
        Self {
            id: String::new(),
            app_id,
            name: name.into(),
            executable_path: executable_path.into(),
            start_dir: String::new(),
            icon_path: String::new(),
            shortcut_path: String::new(),
            launch_options: String::new(),
            is_hidden: false,
            allow_desktop_config: true,
            allow_overlay: true,
            in_game: false,
            last_play_time: 0,
            flatpak_app_id: String::new(),
            extra: VdfMap::new(),
        }
    }

    pub fn with_start_dir(mut self, start_dir: impl Into<String>) -> Self {
        self.start_dir = start_dir.into();
        self
    }

    pub fn with_icon(mut self, icon_path: impl Into<String>) -> Self {
        self.icon_path = icon_path.into();
        self
    }

    pub fn with_launch_options(mut self, launch_options: impl Into<String>) -> Self {
        self.launch_options = launch_options.into();
        self
    }

    /// Wire form: fixed fields in [`FIELD_ORDER`], then `extra`.
    pub fn to_node(&self) -> VdfMap {
        let mut map = VdfMap::new();
        map.insert(KEY_APP_ID, self.app_id.value().to_string());
        map.insert(KEY_APP_NAME, self.name.as_str());
        map.insert(KEY_EXE, quote(&self.executable_path));
        map.insert(KEY_START_DIR, self.start_dir.as_str());
        map.insert(KEY_ICON, self.icon_path.as_str());
        map.insert(KEY_SHORTCUT_PATH, self.shortcut_path.as_str());
        map.insert(KEY_LAUNCH_OPTIONS, self.launch_options.as_str());
        map.insert(KEY_IS_HIDDEN, flag(self.is_hidden));
        map.insert(KEY_ALLOW_DESKTOP_CONFIG, flag(self.allow_desktop_config));
        map.insert(KEY_ALLOW_OVERLAY, flag(self.allow_overlay));
        map.insert(KEY_IN_GAME, flag(self.in_game));
        map.insert(KEY_LAST_PLAY_TIME, self.last_play_time.to_string());
        map.insert(KEY_FLATPAK_APP_ID, self.flatpak_app_id.as_str());
        for (key, node) in self.extra.iter() {
            map.insert(key, node.clone());
        }
        map
    }

    /// Parse an entry map. Accepts both the string form this crate writes and
    /// the integer form Steam writes; key lookup ignores case.
    pub fn from_node(id: &str, map: &VdfMap) -> Result<Self> {
        let app_id = match map.get_ignore_case(KEY_APP_ID) {
            Some((_, node)) => ShortcutAppId::from_raw(int_field(KEY_APP_ID, node)?),
            None => return Err(ShortcutError::validation(KEY_APP_ID, "missing")),
        };

        let mut record = Self {
            id: id.to_string(),
            app_id,
            name: str_field(map, KEY_APP_NAME)?,
            executable_path: unquote(&str_field(map, KEY_EXE)?).to_string(),
            start_dir: str_field(map, KEY_START_DIR)?,
            icon_path: str_field(map, KEY_ICON)?,
            shortcut_path: str_field(map, KEY_SHORTCUT_PATH)?,
            launch_options: str_field(map, KEY_LAUNCH_OPTIONS)?,
            is_hidden: bool_field(map, KEY_IS_HIDDEN, false)?,
            allow_desktop_config: bool_field(map, KEY_ALLOW_DESKTOP_CONFIG, true)?,
            allow_overlay: bool_field(map, KEY_ALLOW_OVERLAY, true)?,
            in_game: bool_field(map, KEY_IN_GAME, false)?,
            last_play_time: time_field(map, KEY_LAST_PLAY_TIME)?,
            flatpak_app_id: str_field(map, KEY_FLATPAK_APP_ID)?,
            extra: VdfMap::new(),
        };

        for (key, node) in map.iter() {
            if !FIELD_ORDER.iter().any(|known| known.eq_ignore_ascii_case(key)) {
                record.extra.insert(key, node.clone());
            }
        }

        Ok(record)
    }
}

/// Wrap a path in double quotes unless it already is.
pub fn quote(path: &str) -> String {
    if path.len() >= 2 && path.starts_with('"') && path.ends_with('"') {
        path.to_string()
    } else {
        format!("\"{}\"", path)
    }
}

/// Strip one pair of surrounding double quotes, if present.
pub fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}

fn flag(value: bool) -> &'static str {
    if value {
        "1"
    } else {
        "0"
    }
}

fn str_field(map: &VdfMap, key: &str) -> Result<String> {
    match map.get_ignore_case(key) {
        None => Ok(String::new()),
        Some((_, Node::Str(s))) => Ok(s.clone()),
        Some((_, Node::Int32(v))) => Ok(v.to_string()),
        Some((_, Node::Map(_))) => Err(ShortcutError::validation(key, "expected a string, found a map")),
    }
}

fn int_field(key: &str, node: &Node) -> Result<i32> {
    match node {
        Node::Int32(v) => Ok(*v),
        Node::Str(s) => s
            .trim()
            .parse::<i32>()
            .map_err(|_| ShortcutError::validation(key, format!("not an integer: {:?}", s))),
        Node::Map(_) => Err(ShortcutError::validation(key, "expected an integer, found a map")),
    }
}

fn bool_field(map: &VdfMap, key: &str, default: bool) -> Result<bool> {
    match map.get_ignore_case(key) {
        None => Ok(default),
        Some((_, node)) => Ok(int_field(key, node)? != 0),
    }
}

fn time_field(map: &VdfMap, key: &str) -> Result<i64> {
    match map.get_ignore_case(key) {
        None => Ok(0),
        // Steam stores the timestamp as an unsigned value in an int32 slot
        Some((_, Node::Int32(v))) => Ok(i64::from(*v as u32)),
        Some((_, Node::Str(s))) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| ShortcutError::validation(key, format!("not an integer: {:?}", s))),
        Some((_, Node::Map(_))) => Err(ShortcutError::validation(key, "expected an integer, found a map")),
    }
}
