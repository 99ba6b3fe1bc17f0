//! Subcommand implementations.
//!
//! Each command writes its human-readable result to `out` so tests can
//! capture it.

use anyhow::{Context as _, Result};
use chrono::{DateTime, Local};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;
use umu_shortcuts::platform::{
    default_backup_dir, discover_shortcut_files, find_steam_root, settings_path, shortcuts_file,
};
use umu_shortcuts::shortcut::quote;
use umu_shortcuts::{
    app_id_for_executable, umu_id, AddOutcome, ArtworkKind, BackupOutcome, BackupSet,
    GameIdField, NewShortcut, SessionId, Settings, ShortcutAppId, ShortcutError, ShortcutFile,
    ShortcutRegistry,
};

/// Which `shortcuts.vdf` a command works on.
#[derive(clap::Args, Debug, Default, Clone)]
pub struct TargetArgs {
    /// Edit this shortcuts.vdf directly
    #[arg(long, conflicts_with = "user")]
    pub shortcuts: Option<PathBuf>,

    /// Numeric Steam user id (see `users`)
    #[arg(long)]
    pub user: Option<String>,

    /// Steam installation root
    #[arg(long)]
    pub steam_root: Option<PathBuf>,
}

/// Per-process state shared by all commands.
pub struct Context {
    pub settings: Settings,
    pub session: SessionId,
}

impl Context {
    pub fn load(config: Option<&Path>, session: SessionId) -> Result<Self> {
        let path = match config {
            Some(path) => path.to_path_buf(),
            None => settings_path()?,
        };
        let settings = Settings::load_or_default(&path)
            .with_context(|| format!("Failed to load settings from {}", path.display()))?;
        Ok(Self { settings, session })
    }

    /// Resolve the target file: explicit path, else `<root>/userdata/<user>`.
    /// Without a configured user, a single discovered user is used.
    pub fn shortcuts_path(&self, target: &TargetArgs) -> Result<PathBuf> {
        if let Some(path) = &target.shortcuts {
            return Ok(path.clone());
        }

        let root = self.steam_root(target.steam_root.as_deref())?;
        let user = match target
            .user
            .as_deref()
            .or(self.settings.steam_user.as_deref())
        {
            Some(user) => user.to_string(),
            None => {
                let users = discover_shortcut_files(&root)?;
                match users.as_slice() {
                    [only] => only.user_id.to_string(),
                    [] => {
                        return Err(ShortcutError::Config {
                            message: format!("No Steam users under {}", root.display()),
                        }
                        .into())
                    }
                    _ => {
                        return Err(ShortcutError::Config {
                            message: format!(
                                "{} Steam users found, pass --user (see `umu-shortcuts users`)",
                                users.len()
                            ),
                        }
                        .into())
                    }
                }
            }
        };

        Ok(shortcuts_file(&root, &user)?)
    }

    pub fn steam_root(&self, explicit: Option<&Path>) -> Result<PathBuf> {
        let explicit = explicit.or(self.settings.steam_root.as_deref());
        Ok(find_steam_root(explicit)?)
    }

    pub fn backup_set(&self, dir: Option<&Path>) -> Result<BackupSet> {
        let dir = match dir.or(self.settings.backup_dir.as_deref()) {
            Some(dir) => dir.to_path_buf(),
            None => default_backup_dir()?,
        };
        Ok(BackupSet::new(dir, self.settings.effective_max_backups()))
    }

    pub fn registry(&self, target: &TargetArgs, backup_dir: Option<&Path>) -> Result<ShortcutRegistry> {
        let path = self.shortcuts_path(target)?;
        let backups = self.backup_set(backup_dir)?;
        debug!(
            "Using {} with backups in {}",
            path.display(),
            backups.dir().display()
        );
        Ok(ShortcutRegistry::new(path, backups))
    }
}

/// Fields of `add` that describe the shortcut itself.
pub struct AddArgs {
    pub name: String,
    pub exe: PathBuf,
    pub start_dir: Option<String>,
    pub icon: Option<String>,
    pub launch_options: Option<String>,
    pub game_id: Option<GameIdField>,
}

/// Parse `--game-id`: a bare id (`570`) or a JSON list (`[570, 440]`).
pub fn parse_game_id(value: &str) -> std::result::Result<GameIdField, String> {
    serde_json::from_str(value.trim())
        .map_err(|e| format!("expected an id or a list of ids: {}", e))
}

/// Prefix launch options with `GAMEID=umu-<id>` so umu-run picks up the
/// right protonfixes. An env prefix needs `%command%` to follow it.
fn with_game_id(launch_options: Option<&str>, game_id: u32) -> String {
    let prefix = format!("GAMEID={}", umu_id(game_id));
    match launch_options.map(str::trim).filter(|o| !o.is_empty()) {
        None => format!("{} %command%", prefix),
        Some(options) if options.contains("%command%") => format!("{} {}", prefix, options),
        Some(options) => format!("{} %command% {}", prefix, options),
    }
}

pub fn add(
    ctx: &Context,
    out: &mut impl Write,
    args: AddArgs,
    target: &TargetArgs,
    backup_dir: Option<&Path>,
) -> Result<()> {
    let registry = ctx.registry(target, backup_dir)?;
    let start_dir = args.start_dir.or_else(|| default_start_dir(&args.exe));
    let launch_options = match &args.game_id {
        Some(field) => {
            let game_id = field.resolve().ok_or_else(|| {
                ShortcutError::validation("game-id", format!("{:?} has no usable id", field))
            })?;
            Some(with_game_id(args.launch_options.as_deref(), game_id))
        }
        None => args.launch_options,
    };
    let new = NewShortcut {
        name: args.name,
        executable: args.exe,
        start_dir,
        icon_path: args.icon,
        launch_options,
    };

    let added = registry.add_shortcut(&new, &ctx.session)?;
    let record = &added.record;
    match added.outcome {
        AddOutcome::Added => writeln!(
            out,
            "Added {:?} as entry {} (app id {})",
            record.name, record.id, record.app_id
        )?,
        AddOutcome::AlreadyPresent => writeln!(
            out,
            "{} is already registered as {:?} (app id {})",
            record.executable_path, record.name, record.app_id
        )?,
    }
    if let Some(BackupOutcome::Created(path)) = &added.backup {
        writeln!(out, "Backup: {}", path.display())?;
    }
    Ok(())
}

pub fn list(ctx: &Context, out: &mut impl Write, target: &TargetArgs) -> Result<()> {
    let path = ctx.shortcuts_path(target)?;
    let records = ShortcutFile::load(&path)?.records();
    if records.is_empty() {
        writeln!(out, "No shortcuts in {}", path.display())?;
        return Ok(());
    }
    for record in records {
        writeln!(
            out,
            "{:>4}  {:>11}  {}  {}",
            record.id, record.app_id, record.name, record.executable_path
        )?;
    }
    Ok(())
}

pub fn remove(
    ctx: &Context,
    out: &mut impl Write,
    app_id: i32,
    target: &TargetArgs,
    backup_dir: Option<&Path>,
) -> Result<()> {
    let registry = ctx.registry(target, backup_dir)?;
    let removed = registry.remove_shortcut(ShortcutAppId::from_raw(app_id), &ctx.session)?;
    writeln!(
        out,
        "Removed {:?} (entry {}, app id {})",
        removed.name, removed.id, removed.app_id
    )?;
    Ok(())
}

pub fn app_id(out: &mut impl Write, exe: &Path) -> Result<()> {
    let id = app_id_for_executable(exe)?;
    writeln!(out, "app id:        {}", id)?;
    writeln!(out, "steam file id: {}", id.steam_file_id())?;
    for kind in ArtworkKind::ALL {
        writeln!(out, "{:<14} {}", format!("{}:", kind.as_str()), id.artwork_file_name(kind))?;
    }
    Ok(())
}

pub fn users(ctx: &Context, out: &mut impl Write, steam_root: Option<&Path>) -> Result<()> {
    let root = ctx.steam_root(steam_root)?;
    let users = discover_shortcut_files(&root)?;
    if users.is_empty() {
        writeln!(out, "No Steam users under {}", root.display())?;
    }
    for user in users {
        let note = if user.exists { "" } else { " (no shortcuts yet)" };
        writeln!(out, "{:>10}  {}{}", user.user_id, user.path.display(), note)?;
    }
    Ok(())
}

pub fn backups(ctx: &Context, out: &mut impl Write, backup_dir: Option<&Path>) -> Result<()> {
    let set = ctx.backup_set(backup_dir)?;
    let entries = set.list()?;
    if entries.is_empty() {
        writeln!(out, "No backups in {}", set.dir().display())?;
    }
    for entry in entries {
        let modified: DateTime<Local> = entry.modified.into();
        writeln!(
            out,
            "{}  {}  {}",
            modified.format("%Y-%m-%d %H:%M:%S"),
            entry.session,
            entry.path.display()
        )?;
    }
    Ok(())
}

pub fn restore(
    ctx: &Context,
    out: &mut impl Write,
    session: &str,
    target: &TargetArgs,
    backup_dir: Option<&Path>,
) -> Result<()> {
    let registry = ctx.registry(target, backup_dir)?;
    let entry = registry.backups().find(session)?;
    let outcome = registry
        .backups()
        .restore(&entry, registry.shortcuts_path(), &ctx.session)?;
    writeln!(
        out,
        "Restored {} from session {}",
        registry.shortcuts_path().display(),
        entry.session
    )?;
    if let BackupOutcome::Created(path) = outcome {
        writeln!(out, "Previous state saved to {}", path.display())?;
    }
    Ok(())
}

/// Quoted parent directory of the executable, as Steam writes `StartDir`.
fn default_start_dir(exe: &Path) -> Option<String> {
    let absolute = std::path::absolute(exe).ok()?;
    absolute.parent()?.to_str().map(quote)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    struct Env {
        temp_dir: TempDir,
        ctx: Context,
        target: TargetArgs,
    }

    fn env() -> Env {
        let temp_dir = TempDir::new().unwrap();
        let settings = Settings {
            backup_dir: Some(temp_dir.path().join("backups")),
            ..Settings::default()
        };
        let target = TargetArgs {
            shortcuts: Some(temp_dir.path().join("shortcuts.vdf")),
            ..TargetArgs::default()
        };
        Env {
            temp_dir,
            ctx: Context {
                settings,
                session: SessionId::new("cli-test").unwrap(),
            },
            target,
        }
    }

    fn output(f: impl FnOnce(&mut Vec<u8>) -> Result<()>) -> String {
        let mut out = Vec::new();
        f(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    fn add_game(env: &Env, name: &str) -> String {
        let exe = env.temp_dir.path().join(format!("{}.exe", name));
        fs::write(&exe, name).unwrap();
        output(|out| {
            add(
                &env.ctx,
                out,
                AddArgs {
                    name: name.to_string(),
                    exe,
                    start_dir: None,
                    icon: None,
                    launch_options: None,
                    game_id: None,
                },
                &env.target,
                None,
            )
        })
    }

    #[test]
    fn test_add_then_list() {
        let env = env();
        let added = add_game(&env, "Celeste");
        assert!(added.starts_with("Added \"Celeste\" as entry 0"));

        let listed = output(|out| list(&env.ctx, out, &env.target));
        assert!(listed.contains("Celeste"));

        let records = ShortcutFile::load(env.target.shortcuts.as_deref().unwrap())
            .unwrap()
            .records();
        assert_eq!(records[0].start_dir, quote(env.temp_dir.path().to_str().unwrap()));
    }

    #[test]
    fn test_add_twice_reports_existing() {
        let env = env();
        add_game(&env, "Celeste");
        let again = add_game(&env, "Celeste");
        assert!(again.contains("already registered"));
    }

    #[test]
    fn test_list_empty() {
        let env = env();
        let listed = output(|out| list(&env.ctx, out, &env.target));
        assert!(listed.starts_with("No shortcuts in"));
    }

    #[test]
    fn test_remove_unknown_app_id() {
        let env = env();
        add_game(&env, "Celeste");
        let mut out = Vec::new();
        let err = remove(&env.ctx, &mut out, -1, &env.target, None).unwrap_err();
        let err = err.downcast_ref::<ShortcutError>().unwrap();
        assert!(matches!(err, ShortcutError::ShortcutNotFound { app_id: -1 }));
        assert_eq!(err.exit_code(), 5);
    }

    #[test]
    fn test_app_id_lists_artwork() {
        let env = env();
        let exe = env.temp_dir.path().join("game.exe");
        fs::write(&exe, b"game").unwrap();
        let printed = output(|out| app_id(out, &exe));
        let id = app_id_for_executable(&exe).unwrap();
        assert!(printed.contains(&format!("app id:        {}", id)));
        assert!(printed.contains(&format!("{}_hero.png", id.steam_file_id())));
    }

    #[test]
    fn test_backups_and_restore() {
        let mut env = env();
        add_game(&env, "Keep");

        env.ctx.session = SessionId::new("second").unwrap();
        add_game(&env, "Mistake");

        let listed = output(|out| backups(&env.ctx, out, None));
        assert!(listed.contains("second"));

        env.ctx.session = SessionId::new("third").unwrap();
        output(|out| restore(&env.ctx, out, "second", &env.target, None));
        let names: Vec<_> = ShortcutFile::load(env.target.shortcuts.as_deref().unwrap())
            .unwrap()
            .records()
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(names, vec!["Keep"]);
    }

    #[test]
    fn test_single_user_is_picked() {
        let env = env();
        let root = env.temp_dir.path().join("steam");
        fs::create_dir_all(root.join("userdata").join("22").join("config")).unwrap();
        let target = TargetArgs {
            steam_root: Some(root.clone()),
            ..TargetArgs::default()
        };

        assert_eq!(
            env.ctx.shortcuts_path(&target).unwrap(),
            root.join("userdata/22/config/shortcuts.vdf")
        );

        fs::create_dir_all(root.join("userdata").join("23")).unwrap();
        let err = env.ctx.shortcuts_path(&target).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ShortcutError>(),
            Some(ShortcutError::Config { .. })
        ));
        let users_out = output(|out| users(&env.ctx, out, Some(&root)));
        assert!(users_out.contains("(no shortcuts yet)"));
    }

    #[test]
    fn test_parse_game_id_shapes() {
        assert_eq!(parse_game_id("1245620").unwrap(), GameIdField::Single(1245620));
        assert_eq!(
            parse_game_id("[570, 440]").unwrap(),
            GameIdField::List(vec![570, 440])
        );
        assert!(parse_game_id("dota").is_err());
    }

    #[test]
    fn test_with_game_id_keeps_command_placement() {
        assert_eq!(with_game_id(None, 570), "GAMEID=umu-570 %command%");
        assert_eq!(
            with_game_id(Some("PROTON_LOG=1 %command%"), 570),
            "GAMEID=umu-570 PROTON_LOG=1 %command%"
        );
        assert_eq!(
            with_game_id(Some("-windowed"), 570),
            "GAMEID=umu-570 %command% -windowed"
        );
    }

    #[test]
    fn test_add_with_game_id_sets_launch_options() {
        let env = env();
        let exe = env.temp_dir.path().join("eldenring.exe");
        fs::write(&exe, b"elden").unwrap();
        output(|out| {
            add(
                &env.ctx,
                out,
                AddArgs {
                    name: "ELDEN RING".to_string(),
                    exe,
                    start_dir: None,
                    icon: None,
                    launch_options: None,
                    game_id: Some(GameIdField::List(vec![1245620])),
                },
                &env.target,
                None,
            )
        });

        let records = ShortcutFile::load(env.target.shortcuts.as_deref().unwrap())
            .unwrap()
            .records();
        assert_eq!(records[0].launch_options, "GAMEID=umu-1245620 %command%");
    }

    #[test]
    fn test_add_with_unusable_game_id_fails() {
        let env = env();
        let exe = env.temp_dir.path().join("game.exe");
        fs::write(&exe, b"game").unwrap();
        let mut out = Vec::new();
        let err = add(
            &env.ctx,
            &mut out,
            AddArgs {
                name: "Game".to_string(),
                exe,
                start_dir: None,
                icon: None,
                launch_options: None,
                game_id: Some(GameIdField::List(vec![])),
            },
            &env.target,
            None,
        )
        .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ShortcutError>(),
            Some(ShortcutError::Validation { .. })
        ));
        assert!(!env.target.shortcuts.as_deref().unwrap().exists());
    }
}
