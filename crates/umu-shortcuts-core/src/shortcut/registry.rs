//! Add, list and remove shortcuts in one `shortcuts.vdf`.

use super::app_id::{app_id_for_executable, random_negative_id, ShortcutAppId};
use super::file::ShortcutFile;
use super::record::ShortcutRecord;
use crate::backup::{BackupOutcome, BackupSet, SessionId};
use crate::{Result, ShortcutError};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Caller input for a new shortcut.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewShortcut {
    pub name: String,
    pub executable: PathBuf,
    pub start_dir: Option<String>,
    pub icon_path: Option<String>,
    pub launch_options: Option<String>,
}

impl NewShortcut {
    pub fn new(name: impl Into<String>, executable: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            executable: executable.into(),
            start_dir: None,
            icon_path: None,
            launch_options: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Added,
    /// Same executable was already registered; nothing was written.
    AlreadyPresent,
}

/// Result of [`ShortcutRegistry::add_shortcut`].
#[derive(Debug, Clone)]
pub struct AddedShortcut {
    pub record: ShortcutRecord,
    pub outcome: AddOutcome,
    /// `None` when nothing was written.
    pub backup: Option<BackupOutcome>,
}

/// One Steam user's shortcut file plus its backup set.
#[derive(Debug, Clone)]
pub struct ShortcutRegistry {
    shortcuts_path: PathBuf,
    backups: BackupSet,
}

impl ShortcutRegistry {
    pub fn new(shortcuts_path: impl Into<PathBuf>, backups: BackupSet) -> Self {
        Self {
            shortcuts_path: shortcuts_path.into(),
            backups,
        }
    }

    pub fn shortcuts_path(&self) -> &Path {
        &self.shortcuts_path
    }

    pub fn backups(&self) -> &BackupSet {
        &self.backups
    }

    /// Current file contents. Missing file is empty; malformed is an error.
    pub fn load(&self) -> Result<ShortcutFile> {
        ShortcutFile::load(&self.shortcuts_path)
    }

    pub fn list(&self) -> Result<Vec<ShortcutRecord>> {
        Ok(self.load()?.records())
    }

    pub fn find_by_app_id(&self, app_id: ShortcutAppId) -> Result<Option<ShortcutRecord>> {
        Ok(self.load()?.find_by_app_id(app_id))
    }

    /// Back up the live file, then write `file` in its place.
    pub fn save(&self, file: &ShortcutFile, session: &SessionId) -> Result<BackupOutcome> {
        let bytes = file.encode()?;
        self.backups
            .backup_and_save(&self.shortcuts_path, &bytes, session)
    }

    /// Register an executable.
    ///
    /// Re-adding the same executable is a no-op. If the derived id is already
    /// taken by a different executable a random negative id is used instead.
    pub fn add_shortcut(&self, new: &NewShortcut, session: &SessionId) -> Result<AddedShortcut> {
        if new.name.trim().is_empty() {
            return Err(ShortcutError::validation("AppName", "name is empty"));
        }

        let mut app_id = app_id_for_executable(&new.executable)?;
        let executable = absolute_exe(&new.executable)?;

        let mut file = self.load()?;
        if let Some(existing) = file.find_by_app_id(app_id) {
            if existing.executable_path == executable {
                info!(
                    "{} is already registered as {:?} (app id {})",
                    executable, existing.name, app_id
                );
                return Ok(AddedShortcut {
                    record: existing,
                    outcome: AddOutcome::AlreadyPresent,
                    backup: None,
                });
            }
            warn!(
                "App id {} already used by {:?}, picking a random id",
                app_id, existing.executable_path
            );
            let mut rng = rand::rng();
            while file.find_by_app_id(app_id).is_some() {
                app_id = random_negative_id(&mut rng);
            }
        }

        let mut record = ShortcutRecord::new(new.name.trim(), executable, app_id);
        if let Some(start_dir) = &new.start_dir {
            record.start_dir = start_dir.clone();
        }
        if let Some(icon) = &new.icon_path {
            record.icon_path = icon.clone();
        }
        if let Some(options) = &new.launch_options {
            record.launch_options = options.clone();
        }

        record.id = file.insert(record.clone())?;
        let backup = self.save(&file, session)?;
        info!(
            "Added shortcut {:?} as entry {} (app id {})",
            record.name, record.id, record.app_id
        );

        Ok(AddedShortcut {
            record,
            outcome: AddOutcome::Added,
            backup: Some(backup),
        })
    }

    /// Delete the entry with `app_id` and persist.
    pub fn remove_shortcut(
        &self,
        app_id: ShortcutAppId,
        session: &SessionId,
    ) -> Result<ShortcutRecord> {
        let mut file = self.load()?;
        let record = file
            .find_by_app_id(app_id)
            .ok_or(ShortcutError::ShortcutNotFound {
                app_id: app_id.value(),
            })?;

        file.remove(&record.id);
        self.save(&file, session)?;
        info!(
            "Removed shortcut {:?} (entry {}, app id {})",
            record.name, record.id, app_id
        );
        Ok(record)
    }
}

fn absolute_exe(path: &Path) -> Result<String> {
    let absolute = std::path::absolute(path).map_err(|source| {
        ShortcutError::SourceFileUnavailable {
            path: path.to_path_buf(),
            source,
        }
    })?;
    debug!("Resolved executable {} to {}", path.display(), absolute.display());
    absolute
        .to_str()
        .map(str::to_string)
        .ok_or_else(|| ShortcutError::validation("Exe", "path is not valid UTF-8"))
}
