//! Game ids from external search results.
//!
//! Some catalog APIs return an app's id either as a bare integer or as a list
//! of integers. The field is decoded into [`GameIdField`] and resolved to a
//! single id once, at the boundary.

use serde::{Deserialize, Serialize};

/// Either shape of the `id` field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GameIdField {
    Single(i64),
    List(Vec<i64>),
}

impl GameIdField {
    /// The id to use: the value itself, or the first element of a list.
    /// Empty lists and values outside `u32` resolve to `None`.
    pub fn resolve(&self) -> Option<u32> {
        let value = match self {
            GameIdField::Single(id) => *id,
            GameIdField::List(ids) => *ids.first()?,
        };
        u32::try_from(value).ok()
    }
}

/// One search hit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SteamSearchApp {
    pub id: GameIdField,
    pub name: String,
}

impl SteamSearchApp {
    pub fn game_id(&self) -> Option<u32> {
        self.id.resolve()
    }
}

/// Launcher game id for a resolved app id, e.g. `umu-1245620`.
pub fn umu_id(game_id: u32) -> String {
    format!("umu-{}", game_id)
}
