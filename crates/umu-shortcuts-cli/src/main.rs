//! umu-shortcuts - register umu/Proton games as Steam non-Steam shortcuts.
//!
//! Thin command-line front end over the `umu-shortcuts` library. Results go to
//! stdout, logs go to stderr.

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, Level};
use tracing_subscriber::FmtSubscriber;
use umu_shortcuts::{GameIdField, SessionId, ShortcutError};

use crate::commands::{Context, TargetArgs};

#[derive(Parser, Debug)]
#[command(name = "umu-shortcuts")]
#[command(about = "Manage non-Steam game shortcuts in Steam's shortcuts.vdf")]
struct Args {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    /// Settings file (defaults to the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Add an executable as a shortcut
    Add {
        /// Title shown in the Steam library
        #[arg(long)]
        name: String,

        /// Executable to launch
        #[arg(long)]
        exe: PathBuf,

        /// Working directory (defaults to the executable's directory)
        #[arg(long)]
        start_dir: Option<String>,

        /// Icon image path
        #[arg(long)]
        icon: Option<String>,

        /// Launch options, e.g. `PROTON_LOG=1 %command%`
        #[arg(long, allow_hyphen_values = true)]
        launch_options: Option<String>,

        /// Steam app id for umu, e.g. `1245620` or `[570, 440]`; sets
        /// `GAMEID=umu-<id>` in the launch options
        #[arg(long, value_parser = commands::parse_game_id)]
        game_id: Option<GameIdField>,

        #[command(flatten)]
        target: TargetArgs,

        /// Backup directory
        #[arg(long)]
        backup_dir: Option<PathBuf>,
    },

    /// List shortcuts
    List {
        #[command(flatten)]
        target: TargetArgs,
    },

    /// Remove a shortcut by app id
    Remove {
        #[arg(long, allow_hyphen_values = true)]
        app_id: i32,

        #[command(flatten)]
        target: TargetArgs,

        /// Backup directory
        #[arg(long)]
        backup_dir: Option<PathBuf>,
    },

    /// Print the app id and artwork names for an executable
    AppId {
        #[arg(long)]
        exe: PathBuf,
    },

    /// List Steam users with a userdata directory
    Users {
        /// Steam installation root
        #[arg(long)]
        steam_root: Option<PathBuf>,
    },

    /// List backups, newest first
    Backups {
        /// Backup directory
        #[arg(long)]
        backup_dir: Option<PathBuf>,
    },

    /// Put a backup back in place of the live file
    Restore {
        /// Session token of the backup to restore
        #[arg(long)]
        session: String,

        #[command(flatten)]
        target: TargetArgs,

        /// Backup directory
        #[arg(long)]
        backup_dir: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    let args = Args::parse();

    // Set up logging
    let log_level = if args.debug { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_thread_ids(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {:#}", err);
            let code = err
                .downcast_ref::<ShortcutError>()
                .map(ShortcutError::exit_code)
                .unwrap_or(1);
            ExitCode::from(u8::try_from(code).unwrap_or(1))
        }
    }
}

fn run(args: Args) -> anyhow::Result<()> {
    let session = SessionId::generate();
    debug!("Session {}", session);
    let ctx = Context::load(args.config.as_deref(), session)?;
    let mut out = std::io::stdout().lock();

    match args.command {
        Command::Add {
            name,
            exe,
            start_dir,
            icon,
            launch_options,
            game_id,
            target,
            backup_dir,
        } => commands::add(
            &ctx,
            &mut out,
            commands::AddArgs {
                name,
                exe,
                start_dir,
                icon,
                launch_options,
                game_id,
            },
            &target,
            backup_dir.as_deref(),
        ),
        Command::List { target } => commands::list(&ctx, &mut out, &target),
        Command::Remove {
            app_id,
            target,
            backup_dir,
        } => commands::remove(&ctx, &mut out, app_id, &target, backup_dir.as_deref()),
        Command::AppId { exe } => commands::app_id(&mut out, &exe),
        Command::Users { steam_root } => commands::users(&ctx, &mut out, steam_root.as_deref()),
        Command::Backups { backup_dir } => commands::backups(&ctx, &mut out, backup_dir.as_deref()),
        Command::Restore {
            session,
            target,
            backup_dir,
        } => commands::restore(&ctx, &mut out, &session, &target, backup_dir.as_deref()),
    }
}
