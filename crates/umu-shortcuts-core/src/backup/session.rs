//! Per-run session token.

use crate::{Result, ShortcutError};
use chrono::Utc;
use std::fmt;
use uuid::Uuid;

/// Opaque value distinguishing one process run from another.
///
/// Owned by the top-level run and passed explicitly into every persistence
/// call; it keys backup deduplication (one backup per session).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    /// Fresh token: UTC timestamp plus a random suffix, e.g.
    /// `20261016T204400-3f2a9c1b`.
    pub fn generate() -> Self {
        let suffix = Uuid::new_v4().simple().to_string();
        Self(format!(
            "{}-{}",
            Utc::now().format("%Y%m%dT%H%M%S"),
            &suffix[..8]
        ))
    }

    /// Wrap an existing token. Only ASCII letters, digits, `-` and `_` are
    /// accepted since the token becomes part of a file name.
    pub fn new(token: impl Into<String>) -> Result<Self> {
        let token = token.into();
        if token.is_empty() {
            return Err(ShortcutError::validation("session", "token is empty"));
        }
        if !token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(ShortcutError::validation(
                "session",
                format!("token {:?} contains characters not allowed in a file name", token),
            ));
        }
        Ok(Self(token))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
