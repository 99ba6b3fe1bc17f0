//! Session-keyed backups of `shortcuts.vdf`.
//!
//! Before the live file is overwritten, a plain copy of its current content is
//! stored as `<dir>/shortcuts_<session>.vdf`. Only the first write of a session
//! is backed up; later writes in the same session reuse that snapshot. At most
//! `max_backups` snapshots are kept, oldest (by modification time) pruned first.

mod session;

pub use session::SessionId;

use crate::config::BackupConfig;
use crate::persist::{atomic_write_bytes, read_optional};
use crate::shortcut::ShortcutFile;
use crate::{Result, ShortcutError};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{debug, info};
use walkdir::WalkDir;

/// One backup file on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupEntry {
    pub path: PathBuf,
    /// Session token parsed from the file name.
    pub session: String,
    pub modified: SystemTime,
}

/// What the backup step did before a write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackupOutcome {
    /// A new snapshot was copied to this path.
    Created(PathBuf),
    /// This session already has a snapshot; nothing was copied.
    AlreadyTaken(PathBuf),
    /// The live file does not exist yet; nothing to copy.
    NoLiveFile,
}

/// Bounded set of snapshots in one directory.
#[derive(Debug, Clone)]
pub struct BackupSet {
    dir: PathBuf,
    max_backups: usize,
}

impl BackupSet {
    /// `max_backups` is clamped to at least one.
    pub fn new(dir: impl Into<PathBuf>, max_backups: usize) -> Self {
        Self {
            dir: dir.into(),
            max_backups: max_backups.max(1),
        }
    }

    pub fn with_default_cap(dir: impl Into<PathBuf>) -> Self {
        Self::new(dir, BackupConfig::MAX_BACKUPS)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn max_backups(&self) -> usize {
        self.max_backups
    }

    /// Backup path for `session`.
    pub fn path_for(&self, session: &SessionId) -> PathBuf {
        self.dir.join(format!(
            "{}{}.{}",
            BackupConfig::FILE_PREFIX,
            session.as_str(),
            BackupConfig::FILE_EXTENSION
        ))
    }

    /// Existing backups, newest first. A missing directory lists as empty.
    pub fn list(&self) -> Result<Vec<BackupEntry>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }

        let mut entries = Vec::new();
        for entry in WalkDir::new(&self.dir).min_depth(1).max_depth(1) {
            let entry = entry.map_err(|e| walk_error(e, &self.dir))?;
            if !entry.file_type().is_file() {
                continue;
            }
            let Some(session) = entry
                .file_name()
                .to_str()
                .and_then(session_from_file_name)
                .map(str::to_string)
            else {
                continue;
            };
            let modified = entry
                .metadata()
                .map_err(|e| walk_error(e, entry.path()))?
                .modified()
                .map_err(|e| {
                    ShortcutError::persistence("read backup mtime", entry.path(), e)
                })?;
            entries.push(BackupEntry {
                path: entry.into_path(),
                session,
                modified,
            });
        }

        // newest first; name breaks ties so ordering is stable
        entries.sort_by(|a, b| {
            b.modified
                .cmp(&a.modified)
                .then_with(|| b.path.cmp(&a.path))
        });
        Ok(entries)
    }

    /// Delete oldest backups while the count is at or above the cap, leaving
    /// room for one more. Returns how many were removed.
    pub fn prune(&self) -> Result<usize> {
        let mut entries = self.list()?;
        let mut removed = 0;
        while entries.len() >= self.max_backups {
            let Some(oldest) = entries.pop() else { break };
            fs::remove_file(&oldest.path).map_err(|e| {
                ShortcutError::persistence("remove old backup", &oldest.path, e)
            })?;
            debug!("Pruned backup {}", oldest.path.display());
            removed += 1;
        }
        Ok(removed)
    }

    /// Snapshot `live` for `session` unless this session already has one.
    pub fn snapshot(&self, live: &Path, session: &SessionId) -> Result<BackupOutcome> {
        fs::create_dir_all(&self.dir).map_err(|e| {
            ShortcutError::persistence("create backup directory", &self.dir, e)
        })?;

        let backup_path = self.path_for(session);
        if backup_path.exists() {
            debug!(
                "Session {} already backed up to {}",
                session,
                backup_path.display()
            );
            return Ok(BackupOutcome::AlreadyTaken(backup_path));
        }

        self.prune()?;

        if !live.exists() {
            debug!("No live file at {}, skipping backup", live.display());
            return Ok(BackupOutcome::NoLiveFile);
        }

        fs::copy(live, &backup_path).map_err(|e| {
            ShortcutError::persistence(
                format!("copy {} to backup", live.display()),
                &backup_path,
                e,
            )
        })?;
        info!("Backed up {} to {}", live.display(), backup_path.display());
        Ok(BackupOutcome::Created(backup_path))
    }

    /// Back up `live`, then replace it with `bytes`.
    ///
    /// The backup is taken strictly before the overwrite; if the write fails
    /// the backup stays and `live` is left as it was.
    pub fn backup_and_save(
        &self,
        live: &Path,
        bytes: &[u8],
        session: &SessionId,
    ) -> Result<BackupOutcome> {
        let outcome = self.snapshot(live, session)?;
        atomic_write_bytes(live, bytes)?;
        Ok(outcome)
    }

    /// Backup recorded for `session`.
    pub fn find(&self, session: &str) -> Result<BackupEntry> {
        self.list()?
            .into_iter()
            .find(|entry| entry.session == session)
            .ok_or_else(|| ShortcutError::BackupNotFound {
                session: session.to_string(),
            })
    }

    /// Read the bytes of a backup.
    pub fn read(&self, entry: &BackupEntry) -> Result<Vec<u8>> {
        read_optional(&entry.path)?.ok_or_else(|| ShortcutError::BackupNotFound {
            session: entry.session.clone(),
        })
    }

    /// Put a backup back at `target`.
    ///
    /// The backup must decode as a shortcuts file. The current `target` goes
    /// through the usual backup step under `session` before it is replaced.
    pub fn restore(
        &self,
        entry: &BackupEntry,
        target: &Path,
        session: &SessionId,
    ) -> Result<BackupOutcome> {
        let bytes = self.read(entry)?;
        let file = ShortcutFile::decode(&bytes)?;
        let outcome = self.backup_and_save(target, &bytes, session)?;
        info!(
            "Restored {} shortcuts from session {} to {}",
            file.len(),
            entry.session,
            target.display()
        );
        Ok(outcome)
    }
}

/// `shortcuts_<session>.vdf` → `<session>`.
fn session_from_file_name(name: &str) -> Option<&str> {
    let session = name
        .strip_prefix(BackupConfig::FILE_PREFIX)?
        .strip_suffix(BackupConfig::FILE_EXTENSION)?
        .strip_suffix('.')?;
    (!session.is_empty()).then_some(session)
}

fn walk_error(err: walkdir::Error, path: &Path) -> ShortcutError {
    let message = err.to_string();
    match err.into_io_error() {
        Some(io) => ShortcutError::persistence(message, path, io),
        None => ShortcutError::PersistenceFailure {
            message,
            path: Some(path.to_path_buf()),
            source: None,
        },
    }
}
