//! Error types for umu-shortcuts.
//!
//! Every failure the core can report is a distinct, recoverable variant. The
//! caller decides whether to retry, prompt, or abandon the operation.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the shortcut library.
#[derive(Debug, Error)]
pub enum ShortcutError {
    // Codec errors
    #[error("Malformed VDF input at byte {offset}: {message}")]
    MalformedInput { offset: usize, message: String },

    // Identifier derivation errors
    #[error("Source file unavailable: {path}")]
    SourceFileUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Backup and write errors
    #[error("Persistence failure at {path:?}: {message}")]
    PersistenceFailure {
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<std::io::Error>,
    },

    // Registry errors
    #[error("Shortcut not found: {app_id}")]
    ShortcutNotFound { app_id: i32 },

    #[error("Backup not found for session {session}")]
    BackupNotFound { session: String },

    // Serialization errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },

    // Configuration errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    // Validation errors
    #[error("Validation error for {field}: {message}")]
    Validation { field: String, message: String },
}

/// Result type alias for shortcut operations.
pub type Result<T> = std::result::Result<T, ShortcutError>;

impl From<std::io::Error> for ShortcutError {
    fn from(err: std::io::Error) -> Self {
        ShortcutError::PersistenceFailure {
            message: err.to_string(),
            path: None,
            source: Some(err),
        }
    }
}

impl From<serde_json::Error> for ShortcutError {
    fn from(err: serde_json::Error) -> Self {
        ShortcutError::Json {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

impl ShortcutError {
    /// Create a decode error at a byte offset.
    pub fn malformed(offset: usize, message: impl Into<String>) -> Self {
        ShortcutError::MalformedInput {
            offset,
            message: message.into(),
        }
    }

    /// Create a persistence error with path context.
    pub fn persistence(
        message: impl Into<String>,
        path: impl Into<PathBuf>,
        source: std::io::Error,
    ) -> Self {
        ShortcutError::PersistenceFailure {
            message: message.into(),
            path: Some(path.into()),
            source: Some(source),
        }
    }

    /// Create a validation error for a named field.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        ShortcutError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Process exit code for the command-line front end.
    ///
    /// - 2: malformed shortcuts file
    /// - 3: executable missing or unreadable
    /// - 4: backup or write failure
    /// - 5: lookup failure (shortcut or backup)
    /// - 6: configuration or validation problem
    pub fn exit_code(&self) -> i32 {
        match self {
            ShortcutError::MalformedInput { .. } => 2,
            ShortcutError::SourceFileUnavailable { .. } => 3,
            ShortcutError::PersistenceFailure { .. } => 4,
            ShortcutError::ShortcutNotFound { .. } | ShortcutError::BackupNotFound { .. } => 5,
            ShortcutError::Json { .. }
            | ShortcutError::Config { .. }
            | ShortcutError::Validation { .. } => 6,
        }
    }
}
