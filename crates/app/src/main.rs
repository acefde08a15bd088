use std::{
    path::{Path, PathBuf},
    sync::atomic::AtomicBool,
};

use chrono::{Duration, Utc};
use clap::{Parser, Subcommand};
use rehab_tracker_core::{
    history, AppConfig, Dashboard, ExerciseType, RecordedPoseProvider, RunOutcome,
    ScriptedPoseSource,
};
use tracing_subscriber::EnvFilter;

fn main() -> rehab_tracker_core::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => AppConfig::from_json_file(path)?,
        None => AppConfig::default(),
    };

    match cli.command {
        Commands::Track {
            script,
            exercise,
            history,
        } => run_track(config, &script, exercise, history.as_deref()),
        Commands::Report { history, exercise } => run_report(config, &history, exercise),
        Commands::Summary { history } => run_summary(config, &history),
        Commands::Clear { history } => run_clear(&history),
    }
}

fn run_track(
    config: AppConfig,
    script: &Path,
    exercise: ExerciseType,
    history_path: Option<&Path>,
) -> rehab_tracker_core::Result<()> {
    tracing::info!(?script, %exercise, "starting scripted session");

    let mut dashboard = load_dashboard(config, history_path)?;
    let mut source = ScriptedPoseSource::from_json_file(script)?;
    let mut provider = RecordedPoseProvider::new();
    let fps = source.fps();

    let started = Utc::now();
    dashboard.start(exercise, started)?;
    let frames = match dashboard.run(&mut source, &mut provider, &AtomicBool::new(false))? {
        RunOutcome::Exhausted { frames } | RunOutcome::Stopped { frames } => frames,
    };

    if let Some(session) = dashboard.active() {
        println!("{}", serde_json::to_string_pretty(&session.tracker.summary())?);
    }

    // Scripted sessions run faster than real time; their length is derived
    // from the frame count instead of the wall clock.
    let elapsed = Duration::milliseconds((frames as f64 / f64::from(fps) * 1000.0).round() as i64);
    if let Some(record) = dashboard.stop(started + elapsed) {
        println!("{}", serde_json::to_string_pretty(&record)?);
    }

    if let Some(path) = history_path {
        history::export_csv(dashboard.analytics(), path)?;
    }
    Ok(())
}

fn run_report(
    config: AppConfig,
    history_path: &Path,
    exercise: Option<ExerciseType>,
) -> rehab_tracker_core::Result<()> {
    let dashboard = load_dashboard(config, Some(history_path))?;
    match dashboard.analytics().progress_metrics(exercise, Utc::now()) {
        Some(metrics) => {
            println!("{}", serde_json::to_string_pretty(&metrics)?);
            for area in &metrics.improvement_areas {
                println!("- {area}");
            }
        }
        None => println!("No sessions recorded yet."),
    }
    Ok(())
}

fn run_summary(config: AppConfig, history_path: &Path) -> rehab_tracker_core::Result<()> {
    let dashboard = load_dashboard(config, Some(history_path))?;
    let summary = dashboard.analytics().exercise_summary();
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

fn run_clear(history_path: &Path) -> rehab_tracker_core::Result<()> {
    if history_path.exists() {
        std::fs::remove_file(history_path)?;
    }
    tracing::info!(path = ?history_path, "history cleared");
    Ok(())
}

fn load_dashboard(
    config: AppConfig,
    history_path: Option<&Path>,
) -> rehab_tracker_core::Result<Dashboard> {
    let mut dashboard = Dashboard::new(config);
    if let Some(path) = history_path.filter(|path| path.exists()) {
        history::import_csv(dashboard.analytics_mut(), path)?;
    }
    Ok(dashboard)
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Pose-driven exercise repetition tracker", long_about = None)]
struct Cli {
    /// Optional JSON configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Replay a recorded pose script as one exercise session.
    Track {
        /// JSON script of pose frames.
        script: PathBuf,
        /// Exercise to track ("arm-raise", "Arm Raise", ...).
        #[arg(short, long, default_value = "arm-raise")]
        exercise: ExerciseType,
        /// CSV history the finished session is appended to.
        #[arg(long)]
        history: Option<PathBuf>,
    },
    /// Print progress metrics for the stored history.
    Report {
        /// CSV history to analyse.
        #[arg(long)]
        history: PathBuf,
        /// Restrict the report to one exercise.
        #[arg(short, long)]
        exercise: Option<ExerciseType>,
    },
    /// Print lifetime totals across all exercises.
    Summary {
        /// CSV history to analyse.
        #[arg(long)]
        history: PathBuf,
    },
    /// Delete the stored history.
    Clear {
        /// CSV history to remove.
        #[arg(long)]
        history: PathBuf,
    },
}
