use anyhow::{bail, Context, Result};
use chrono::{Local, NaiveDate};
use clap::Parser;
use file_targets::{CsvTarget, NowPlayingTarget, TrackListTarget};
use player_source::CommandSource;
use sqlite_target::SqliteTarget;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};
use trackcast_core::{
    init_logging, AppDirs, LoggingOptions, RunContext, RunMode, RunOverrides, Settings, TargetSpec,
};
use trackcast_engine::{close_all, run_archive, ArchiveStore, LiveLoop, TargetRegistry};
use webhook_target::WebhookTarget;

#[derive(Debug, Parser)]
#[command(
    name = "trackcast",
    version,
    about = "Polls the current track and fans changes out to configured targets"
)]
struct Cli {
    /// Episode identifier (required for archive replays)
    #[arg(short, long)]
    episode: Option<String>,
    /// Seconds between live polls (minimum 1)
    #[arg(short, long)]
    poll_time: Option<u64>,
    /// Only load targets whose id contains this pattern
    #[arg(short = 't', long, default_value = "all")]
    targets: String,
    /// Replay a previously archived episode instead of polling live
    #[arg(short, long)]
    archive: bool,
    /// Episode date override (YYYY-MM-DD), used in file names and headers
    #[arg(long)]
    date: Option<NaiveDate>,
    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,
    /// Config file override
    #[arg(long)]
    config: Option<PathBuf>,
}

/// Every target that ships with the binary. Config decides which of these
/// actually load; nothing here is active without its `enabled` key.
fn built_in_registry() -> TargetRegistry {
    let mut registry = TargetRegistry::new();
    registry.register(TargetSpec {
        id: "SqliteTarget",
        // The archive row should exist before anything announces the track.
        priority: 50,
        archive_safe: false,
        factory: SqliteTarget::from_settings,
    });
    registry.register(TargetSpec {
        id: "NowPlayingTarget",
        priority: 10,
        archive_safe: false,
        factory: NowPlayingTarget::from_settings,
    });
    registry.register(TargetSpec {
        id: "TrackListTarget",
        priority: 0,
        archive_safe: true,
        factory: TrackListTarget::from_settings,
    });
    registry.register(TargetSpec {
        id: "CsvTarget",
        priority: 0,
        archive_safe: true,
        factory: CsvTarget::from_settings,
    });
    registry.register(TargetSpec {
        id: "WebhookTarget",
        priority: 0,
        archive_safe: false,
        factory: WebhookTarget::from_settings,
    });
    registry
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let dirs = AppDirs::discover()?;
    let config_path = cli.config.clone().unwrap_or_else(|| dirs.config_file());
    let settings = if config_path.exists() {
        Settings::load(&config_path)?
    } else {
        Settings::empty()
    };

    let logging = LoggingOptions {
        directive: if cli.verbose {
            "debug".into()
        } else {
            settings
                .get_str("logging", "level")
                .unwrap_or_else(|| "info".into())
        },
        log_dir: settings
            .get_bool("logging", "file")
            .unwrap_or(false)
            .then(|| dirs.log_dir().to_path_buf()),
        ..LoggingOptions::default()
    };
    let _logging = init_logging(&logging)?;

    let overrides = RunOverrides {
        episode: cli.episode.clone(),
        episode_date: cli.date,
        poll_time: cli.poll_time,
        archive: cli.archive,
    };
    let ctx = RunContext::resolve(&settings, &overrides, Local::now().date_naive());

    match ctx.mode() {
        RunMode::Archive => run_archive_mode(&settings, &ctx, &cli.targets),
        RunMode::Live => run_live_mode(&settings, &ctx, &cli.targets),
    }
}

fn run_archive_mode(settings: &Settings, ctx: &RunContext, pattern: &str) -> Result<()> {
    // Both preconditions make the whole run meaningless, so they fail before
    // any target is constructed.
    let Some(episode) = ctx.episode.as_deref() else {
        bail!("archive mode requires an episode id (--episode)");
    };
    let Some(db) = ctx.archive_db.as_deref() else {
        bail!("archive mode requires archiveDbPath in [trackcast]");
    };
    let store = ArchiveStore::open(db)?;

    let mut loaded = built_in_registry().load(settings, ctx, pattern);
    if loaded.active.is_empty() {
        warn!("no targets loaded; the replay will not be recorded anywhere");
    }

    let dispatched = run_archive(&store, episode, ctx.ignore_album.clone(), &mut loaded.active)?;
    info!(episode, dispatched, "archive replay complete");

    close_all(&mut loaded.active);
    Ok(())
}

fn run_live_mode(settings: &Settings, ctx: &RunContext, pattern: &str) -> Result<()> {
    let mut source =
        CommandSource::from_settings(settings).context("live mode needs a track source")?;

    let mut loaded = built_in_registry().load(settings, ctx, pattern);
    if loaded.active.is_empty() {
        warn!("no targets loaded; track changes will go nowhere");
    }

    let shutdown = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&shutdown);
    ctrlc::set_handler(move || flag.store(true, Ordering::SeqCst))
        .context("failed to install interrupt handler")?;

    info!(poll_time = ctx.poll_time, "polling for track changes");
    let mut live = LiveLoop::new(ctx);
    live.run(&mut source, &mut loaded.active, ctx, &shutdown);

    close_all(&mut loaded.active);
    Ok(())
}
