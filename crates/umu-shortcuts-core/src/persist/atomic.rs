//! Atomic whole-buffer file writes.
//!
//! Writes go through:
//! 1. A temp file next to the target with a unique PID+TID suffix
//! 2. fsync so the data reaches disk
//! 3. An atomic rename onto the target path
//!
//! A failure at any step leaves the target untouched.

use crate::{Result, ShortcutError};
use serde::{de::DeserializeOwned, Serialize};
use std::ffi::OsString;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::process;
use std::thread;
use tracing::{debug, warn};

/// Read a whole file, returning `None` when it does not exist.
pub fn read_optional(path: &Path) -> Result<Option<Vec<u8>>> {
    match fs::read(path) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(ShortcutError::persistence(
            format!("Failed to read {}", path.display()),
            path,
            e,
        )),
    }
}

/// Replace `path` with `bytes` atomically, creating parent directories.
pub fn atomic_write_bytes(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(|e| {
                ShortcutError::persistence(
                    format!("Failed to create directory {}", parent.display()),
                    parent,
                    e,
                )
            })?;
        }
    }

    let temp_path = temp_path_for(path);

    if let Err(e) = write_synced(&temp_path, bytes) {
        discard_temp(&temp_path);
        return Err(e);
    }

    if let Err(e) = fs::rename(&temp_path, path) {
        discard_temp(&temp_path);
        return Err(ShortcutError::persistence(
            format!(
                "Failed to rename {} to {}",
                temp_path.display(),
                path.display()
            ),
            path,
            e,
        ));
    }

    debug!("Atomically wrote {} ({} bytes)", path.display(), bytes.len());
    Ok(())
}

/// Read and parse a JSON file.
///
/// Returns `None` if the file doesn't exist, or an error if parsing fails.
pub fn atomic_read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    let Some(bytes) = read_optional(path)? else {
        return Ok(None);
    };

    let data: T = serde_json::from_slice(&bytes).map_err(|e| ShortcutError::Json {
        message: format!("Failed to parse {}: {}", path.display(), e),
        source: Some(e),
    })?;

    Ok(Some(data))
}

/// Serialize `data` as pretty JSON and write it atomically.
pub fn atomic_write_json<T: Serialize>(path: &Path, data: &T) -> Result<()> {
    let serialized = serde_json::to_vec_pretty(data).map_err(|e| ShortcutError::Json {
        message: format!("Failed to serialize data: {}", e),
        source: Some(e),
    })?;

    atomic_write_bytes(path, &serialized)
}

fn write_synced(temp_path: &Path, bytes: &[u8]) -> Result<()> {
    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(temp_path)
        .map_err(|e| {
            ShortcutError::persistence(
                format!("Failed to create temp file {}", temp_path.display()),
                temp_path,
                e,
            )
        })?;

    file.write_all(bytes).map_err(|e| {
        ShortcutError::persistence(
            format!("Failed to write temp file {}", temp_path.display()),
            temp_path,
            e,
        )
    })?;

    file.sync_all().map_err(|e| {
        ShortcutError::persistence(
            format!("Failed to sync temp file {}", temp_path.display()),
            temp_path,
            e,
        )
    })?;

    Ok(())
}

fn discard_temp(temp_path: &Path) {
    if let Err(e) = fs::remove_file(temp_path) {
        if e.kind() != ErrorKind::NotFound {
            warn!("Failed to remove temp file {}: {}", temp_path.display(), e);
        }
    }
}

/// `<name>.<pid>.<tid>.tmp` in the target's directory.
pub(crate) fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| OsString::from("unnamed"));
    name.push(format!(".{}.{}.tmp", process::id(), thread_id()));
    path.with_file_name(name)
}

/// Get a unique thread identifier.
fn thread_id() -> u64 {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};
    let mut hasher = DefaultHasher::new();
    format!("{:?}", thread::current().id()).hash(&mut hasher);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};
    use tempfile::TempDir;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct TestData {
        name: String,
        value: i32,
    }

    #[test]
    fn test_write_bytes_and_read_back() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("shortcuts.vdf");

        atomic_write_bytes(&path, b"\x00shortcuts\x00\x08\x08").unwrap();
        assert_eq!(
            read_optional(&path).unwrap().as_deref(),
            Some(&b"\x00shortcuts\x00\x08\x08"[..])
        );
    }

    #[test]
    fn test_write_bytes_leaves_no_temp_files() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("shortcuts.vdf");

        atomic_write_bytes(&path, b"first").unwrap();
        atomic_write_bytes(&path, b"second").unwrap();

        let names: Vec<_> = fs::read_dir(temp_dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![OsString::from("shortcuts.vdf")]);
        assert_eq!(fs::read(&path).unwrap(), b"second");
    }

    #[test]
    fn test_read_optional_nonexistent() {
        let temp_dir = TempDir::new().unwrap();
        assert!(read_optional(&temp_dir.path().join("missing"))
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_write_into_missing_directory_creates_it() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("dir").join("test.json");

        let data = TestData {
            name: "nested".to_string(),
            value: 99,
        };

        atomic_write_json(&path, &data).unwrap();
        let read_back: Option<TestData> = atomic_read_json(&path).unwrap();
        assert_eq!(read_back, Some(data));
    }

    #[test]
    fn test_read_json_reports_parse_errors() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("broken.json");
        fs::write(&path, "{not json").unwrap();

        let result: Result<Option<TestData>> = atomic_read_json(&path);
        assert!(matches!(result, Err(ShortcutError::Json { .. })));
    }

    #[test]
    fn test_write_fails_when_target_is_directory() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("occupied");
        fs::create_dir(&path).unwrap();

        let result = atomic_write_bytes(&path, b"data");
        assert!(matches!(
            result,
            Err(ShortcutError::PersistenceFailure { .. })
        ));
        assert!(path.is_dir());
    }
}
