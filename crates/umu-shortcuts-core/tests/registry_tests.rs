//! Integration tests for the shortcut registry public interface.
//!
//! These drive a fake Steam `userdata` tree end to end: add, list, back up,
//! remove and restore.

use std::fs;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;
use tempfile::TempDir;
use umu_shortcuts::platform::{discover_shortcut_files, shortcuts_file};
use umu_shortcuts::vdf;
use umu_shortcuts::{
    AddOutcome, BackupOutcome, BackupSet, NewShortcut, SessionId, ShortcutError, ShortcutFile,
    ShortcutRegistry, VdfMap,
};

/// Create a Steam root with one user and a games directory.
fn create_test_env() -> TempDir {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");

    fs::create_dir_all(temp_dir.path().join("steam/userdata/22/config")).unwrap();
    fs::create_dir_all(temp_dir.path().join("games")).unwrap();

    temp_dir
}

fn registry(env: &TempDir) -> ShortcutRegistry {
    let path = shortcuts_file(&env.path().join("steam"), "22").unwrap();
    ShortcutRegistry::new(path, BackupSet::with_default_cap(env.path().join("backups")))
}

fn game(env: &TempDir, name: &str) -> PathBuf {
    let path = env.path().join("games").join(format!("{}.exe", name));
    fs::write(&path, format!("MZ {}", name)).unwrap();
    path
}

fn session(token: &str) -> SessionId {
    SessionId::new(token).unwrap()
}

#[test]
fn test_add_list_remove() {
    let env = create_test_env();
    let registry = registry(&env);
    let s = session("run1");

    let celeste = registry
        .add_shortcut(&NewShortcut::new("Celeste", game(&env, "celeste")), &s)
        .unwrap();
    let hades = registry
        .add_shortcut(&NewShortcut::new("Hades", game(&env, "hades")), &s)
        .unwrap();
    assert_eq!(celeste.record.id, "0");
    assert_eq!(hades.record.id, "1");

    let names: Vec<_> = registry.list().unwrap().into_iter().map(|r| r.name).collect();
    assert_eq!(names, vec!["Celeste", "Hades"]);

    registry.remove_shortcut(celeste.record.app_id, &s).unwrap();
    let remaining = registry.list().unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, "1");

    // a new entry continues after the highest key, not in the gap
    let third = registry
        .add_shortcut(&NewShortcut::new("Tunic", game(&env, "tunic")), &s)
        .unwrap();
    assert_eq!(third.record.id, "2");
}

#[test]
fn test_discovered_user_file_exists_after_add() {
    let env = create_test_env();
    let registry = registry(&env);
    registry
        .add_shortcut(&NewShortcut::new("Celeste", game(&env, "celeste")), &session("run1"))
        .unwrap();

    let users = discover_shortcut_files(&env.path().join("steam")).unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].user_id, 22);
    assert!(users[0].exists);
    assert_eq!(users[0].path, registry.shortcuts_path());
}

#[test]
fn test_one_backup_per_session_and_rotation() {
    let env = create_test_env();
    let registry = registry(&env);

    for i in 0..7 {
        let name = format!("game{}", i);
        let added = registry
            .add_shortcut(
                &NewShortcut::new(name.clone(), game(&env, &name)),
                &session(&format!("run{}", i)),
            )
            .unwrap();
        if i == 0 {
            assert_eq!(added.backup, Some(BackupOutcome::NoLiveFile));
        } else {
            assert!(matches!(added.backup, Some(BackupOutcome::Created(_))));
        }
        thread::sleep(Duration::from_millis(20));
    }

    let sessions: Vec<_> = registry
        .backups()
        .list()
        .unwrap()
        .into_iter()
        .map(|b| b.session)
        .collect();
    assert_eq!(sessions, vec!["run6", "run5", "run4", "run3", "run2"]);

    // run6's backup holds the state before game6 was added
    let latest = registry.backups().find("run6").unwrap();
    let snapshot = ShortcutFile::decode(&registry.backups().read(&latest).unwrap()).unwrap();
    assert_eq!(snapshot.len(), 6);
    assert_eq!(registry.list().unwrap().len(), 7);
}

#[test]
fn test_restore_previous_state() {
    let env = create_test_env();
    let registry = registry(&env);

    registry
        .add_shortcut(&NewShortcut::new("Keep", game(&env, "keep")), &session("first"))
        .unwrap();
    thread::sleep(Duration::from_millis(20));
    registry
        .add_shortcut(&NewShortcut::new("Mistake", game(&env, "mistake")), &session("second"))
        .unwrap();

    let entry = registry.backups().find("second").unwrap();
    registry
        .backups()
        .restore(&entry, registry.shortcuts_path(), &session("third"))
        .unwrap();

    let names: Vec<_> = registry.list().unwrap().into_iter().map(|r| r.name).collect();
    assert_eq!(names, vec!["Keep"]);
}

#[test]
fn test_entries_written_by_steam_survive() {
    let env = create_test_env();
    let registry = registry(&env);

    // entry in Steam's own layout: integer fields and a tags map
    let mut tags = VdfMap::new();
    tags.insert("0", "favorite");
    let mut steam_entry = VdfMap::new();
    steam_entry.insert("appid", -1_234_567i32);
    steam_entry.insert("AppName", "From Steam");
    steam_entry.insert("Exe", "\"/usr/bin/steam-game\"");
    steam_entry.insert("LastPlayTime", 1_700_000_000i32);
    steam_entry.insert("tags", tags);
    let mut entries = VdfMap::new();
    entries.insert("0", steam_entry.clone());
    let mut root = VdfMap::new();
    root.insert("shortcuts", entries);
    write(registry.shortcuts_path(), &vdf::encode(&root).unwrap());

    registry
        .add_shortcut(&NewShortcut::new("Mine", game(&env, "mine")), &session("run1"))
        .unwrap();

    let tree = vdf::decode(&fs::read(registry.shortcuts_path()).unwrap()).unwrap();
    let entries = tree.get("shortcuts").and_then(|n| n.as_map()).unwrap();
    assert_eq!(entries.keys().collect::<Vec<_>>(), vec!["0", "1"]);
    assert_eq!(
        entries.get("0").and_then(|n| n.as_map()),
        Some(&steam_entry)
    );

    let records = registry.list().unwrap();
    assert_eq!(records[0].last_play_time, 1_700_000_000);
    assert!(records[0].extra.contains_key("tags"));
}

#[test]
fn test_truncated_file_is_rejected_untouched() {
    let env = create_test_env();
    let registry = registry(&env);
    let mut bytes = ShortcutFile::new().encode().unwrap();
    bytes.pop();
    write(registry.shortcuts_path(), &bytes);

    let result = registry.add_shortcut(
        &NewShortcut::new("Celeste", game(&env, "celeste")),
        &session("run1"),
    );
    assert!(matches!(result, Err(ShortcutError::MalformedInput { .. })));
    assert_eq!(fs::read(registry.shortcuts_path()).unwrap(), bytes);
    assert!(registry.backups().list().unwrap().is_empty());
}

#[test]
fn test_readding_is_noop() {
    let env = create_test_env();
    let registry = registry(&env);
    let new = NewShortcut::new("Celeste", game(&env, "celeste"));

    let first = registry.add_shortcut(&new, &session("run1")).unwrap();
    let second = registry.add_shortcut(&new, &session("run2")).unwrap();

    assert_eq!(second.outcome, AddOutcome::AlreadyPresent);
    assert_eq!(second.record, first.record);
    assert_eq!(registry.list().unwrap().len(), 1);
}

#[test]
fn test_key_without_successor_is_rejected_untouched() {
    let env = create_test_env();
    let registry = registry(&env);

    let mut steam_entry = VdfMap::new();
    steam_entry.insert("appid", -42i32);
    steam_entry.insert("AppName", "Far Away");
    let mut entries = VdfMap::new();
    entries.insert(i64::MAX.to_string(), steam_entry);
    let mut root = VdfMap::new();
    root.insert("shortcuts", entries);
    let bytes = vdf::encode(&root).unwrap();
    write(registry.shortcuts_path(), &bytes);

    let result = registry.add_shortcut(
        &NewShortcut::new("Celeste", game(&env, "celeste")),
        &session("run1"),
    );
    assert!(matches!(result, Err(ShortcutError::Validation { .. })));
    assert_eq!(fs::read(registry.shortcuts_path()).unwrap(), bytes);
    assert!(registry.backups().list().unwrap().is_empty());
    assert_eq!(registry.list().unwrap().len(), 1);
}

fn write(path: &Path, bytes: &[u8]) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, bytes).unwrap();
}
