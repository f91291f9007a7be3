//! Headless crawl runner.
//!
//! Plays runs without graphics under the autopilot and prints JSON to
//! stdout. Designed for balance batches and CI determinism checks.
//!
//! # Usage
//!
//! ```bash
//! # Single run
//! cargo run -p crawl_headless -- run --class caster --seed 3
//!
//! # Batch of seeds for every class
//! cargo run -p crawl_headless -- batch --count 500 --seed 1000
//!
//! # Determinism check
//! cargo run -p crawl_headless -- verify --seed 12345 --runs 5
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crawl_core::class::ClassKind;
use crawl_core::config::GameConfig;
use crawl_headless::batch::{run_batch, verify_determinism, BatchConfig};
use crawl_headless::error::HeadlessError;
use crawl_headless::runner::{run_autopilot, DEFAULT_MAX_FRAMES};

#[derive(Parser)]
#[command(name = "crawl_headless")]
#[command(about = "Headless dungeon run driver for balance testing and CI")]
#[command(version)]
struct Cli {
    /// Enable verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// RON config file overriding the defaults
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a single run and print its report
    Run {
        /// Class to play (melee, ranged, caster)
        #[arg(short, long, default_value = "melee", value_parser = parse_class)]
        class: ClassKind,

        /// Dungeon seed (defaults to the config seed)
        #[arg(short, long)]
        seed: Option<u64>,

        /// Frame cap (60 frames per second)
        #[arg(long, default_value_t = DEFAULT_MAX_FRAMES)]
        max_frames: u64,
    },

    /// Play many seeds in parallel and print per-class statistics
    Batch {
        /// Runs per class
        #[arg(short = 'n', long, default_value = "100")]
        count: u32,

        /// First seed
        #[arg(short, long, default_value = "0")]
        seed: u64,

        /// Only play this class
        #[arg(short, long, value_parser = parse_class)]
        class: Option<ClassKind>,

        /// Frame cap per run
        #[arg(long, default_value_t = DEFAULT_MAX_FRAMES)]
        max_frames: u64,
    },

    /// Verify determinism by running the same seed multiple times
    Verify {
        /// Seed to verify
        #[arg(short, long, default_value = "12345")]
        seed: u64,

        /// Number of verification runs
        #[arg(short, long, default_value = "5")]
        runs: usize,

        /// Class to play
        #[arg(short, long, default_value = "melee", value_parser = parse_class)]
        class: ClassKind,

        /// Frame cap per run
        #[arg(long, default_value_t = DEFAULT_MAX_FRAMES)]
        max_frames: u64,
    },
}

fn parse_class(value: &str) -> Result<ClassKind, String> {
    value.parse().map_err(|err: crawl_core::error::GameError| err.to_string())
}

fn main() {
    let cli = Cli::parse();

    // Logs go to stderr, stdout is for JSON
    let log_level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(true),
        )
        .with(tracing_subscriber::filter::LevelFilter::from_level(
            log_level,
        ))
        .init();

    if let Err(err) = dispatch(cli) {
        tracing::error!(error = %err, "Command failed");
        eprintln!("FATAL: {err}");
        std::process::exit(1);
    }
}

fn dispatch(cli: Cli) -> Result<(), HeadlessError> {
    let game = match &cli.config {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::default(),
    };

    match cli.command {
        Commands::Run {
            class,
            seed,
            max_frames,
        } => cmd_run(game, class, seed, max_frames),
        Commands::Batch {
            count,
            seed,
            class,
            max_frames,
        } => cmd_batch(game, count, seed, class, max_frames),
        Commands::Verify {
            seed,
            runs,
            class,
            max_frames,
        } => cmd_verify(game, seed, runs, class, max_frames),
    }
}

/// Play one run
fn cmd_run(
    mut game: GameConfig,
    class: ClassKind,
    seed: Option<u64>,
    max_frames: u64,
) -> Result<(), HeadlessError> {
    if let Some(seed) = seed {
        game.seed = seed;
    }
    let report = run_autopilot(&game, class, max_frames)?;
    println!("{}", report.to_json()?);
    Ok(())
}

/// Play a batch of seeds
fn cmd_batch(
    game: GameConfig,
    count: u32,
    seed: u64,
    class: Option<ClassKind>,
    max_frames: u64,
) -> Result<(), HeadlessError> {
    let config = BatchConfig {
        game,
        count,
        seed_start: seed,
        classes: class.map_or_else(|| ClassKind::ALL.to_vec(), |class| vec![class]),
        max_frames,
    };
    let summary = run_batch(&config)?;

    for class in &summary.classes {
        eprintln!(
            "{:<8} runs {:>5}  win rate {:>5.1}%  avg rooms {:>4.2}  avg frames {:>8.0}",
            class.class.to_string(),
            class.runs,
            class.win_rate * 100.0,
            class.average_rooms_cleared,
            class.average_frames
        );
    }
    println!("{}", summary.to_json()?);
    Ok(())
}

/// Check that one seed always ends in the same state
fn cmd_verify(
    mut game: GameConfig,
    seed: u64,
    runs: usize,
    class: ClassKind,
    max_frames: u64,
) -> Result<(), HeadlessError> {
    game.seed = seed;
    tracing::info!(seed, runs, class = %class, "Verifying determinism");

    let report = verify_determinism(&game, class, runs, max_frames)?;
    println!("{}", serde_json::to_string(&report)?);
    report.into_result()?;
    eprintln!("PASS: All {runs} runs produced identical results");
    Ok(())
}
