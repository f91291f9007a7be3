//! Batch runner for balance testing.
//!
//! Runs many seeds in parallel using rayon and aggregates per-class
//! outcome statistics.

use std::collections::BTreeMap;

use crawl_core::class::ClassKind;
use crawl_core::config::GameConfig;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::HeadlessError;
use crate::runner::{run_autopilot, RunReport, RunResult, DEFAULT_MAX_FRAMES};

/// Configuration for a batch run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchConfig {
    /// Base game config; its seed is replaced per run.
    pub game: GameConfig,
    /// Runs per class.
    pub count: u32,
    /// Seed of the first run; run `i` uses `seed_start + i`.
    pub seed_start: u64,
    /// Classes to play.
    pub classes: Vec<ClassKind>,
    /// Frame cap per run.
    pub max_frames: u64,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            game: GameConfig::default(),
            count: 100,
            seed_start: 0,
            classes: ClassKind::ALL.to_vec(),
            max_frames: DEFAULT_MAX_FRAMES,
        }
    }
}

/// Aggregate numbers for one class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassSummary {
    /// Class these runs played.
    pub class: ClassKind,
    /// Runs played.
    pub runs: u32,
    /// Runs won.
    pub victories: u32,
    /// Runs lost.
    pub defeats: u32,
    /// Runs that hit the frame cap.
    pub timeouts: u32,
    /// `victories / runs`.
    pub win_rate: f64,
    /// Mean frames per run.
    pub average_frames: f64,
    /// Mean rooms cleared per run.
    pub average_rooms_cleared: f64,
    /// Mean final level.
    pub average_level: f64,
}

impl ClassSummary {
    fn from_reports(class: ClassKind, reports: &[&RunReport]) -> Self {
        let runs = reports.len() as u32;
        let count = |result: RunResult| reports.iter().filter(|r| r.result == result).count() as u32;
        let mean = |value: fn(&RunReport) -> f64| {
            if reports.is_empty() {
                0.0
            } else {
                reports.iter().map(|r| value(r)).sum::<f64>() / reports.len() as f64
            }
        };
        let victories = count(RunResult::Victory);

        Self {
            class,
            runs,
            victories,
            defeats: count(RunResult::Defeat),
            timeouts: count(RunResult::Timeout),
            win_rate: if runs == 0 { 0.0 } else { victories as f64 / runs as f64 },
            average_frames: mean(|r| r.frames as f64),
            average_rooms_cleared: mean(|r| r.rooms_cleared as f64),
            average_level: mean(|r| r.level as f64),
        }
    }
}

/// Result of a batch, printed as JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Runs played across all classes.
    pub total_runs: u32,
    /// First seed used.
    pub seed_start: u64,
    /// Per-class numbers, in class order.
    pub classes: Vec<ClassSummary>,
    /// Every individual run.
    pub runs: Vec<RunReport>,
}

impl BatchSummary {
    /// Summarize finished runs.
    #[must_use]
    pub fn from_reports(seed_start: u64, runs: Vec<RunReport>) -> Self {
        let mut by_class: BTreeMap<ClassKind, Vec<&RunReport>> = BTreeMap::new();
        for report in &runs {
            by_class.entry(report.class).or_default().push(report);
        }
        let classes = by_class
            .into_iter()
            .map(|(class, reports)| ClassSummary::from_reports(class, &reports))
            .collect();

        Self {
            total_runs: runs.len() as u32,
            seed_start,
            classes,
            runs,
        }
    }

    /// Encode as pretty JSON.
    pub fn to_json(&self) -> Result<String, HeadlessError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Run every `(class, seed)` pair of the batch in parallel.
pub fn run_batch(config: &BatchConfig) -> Result<BatchSummary, HeadlessError> {
    info!(
        count = config.count,
        seed_start = config.seed_start,
        classes = config.classes.len(),
        max_frames = config.max_frames,
        "Starting batch"
    );

    let jobs: Vec<(ClassKind, u64)> = config
        .classes
        .iter()
        .flat_map(|&class| {
            (0..config.count).map(move |i| (class, config.seed_start.wrapping_add(u64::from(i))))
        })
        .collect();

    let reports = jobs
        .into_par_iter()
        .map(|(class, seed)| {
            let game = GameConfig {
                seed,
                ..config.game.clone()
            };
            let report = run_autopilot(&game, class, config.max_frames);
            debug!(class = %class, seed, ok = report.is_ok(), "Batch run done");
            report
        })
        .collect::<Result<Vec<_>, _>>()?;

    let summary = BatchSummary::from_reports(config.seed_start, reports);
    info!(total_runs = summary.total_runs, "Batch complete");
    Ok(summary)
}

/// Outcome of a determinism check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyReport {
    /// Seed under test.
    pub seed: u64,
    /// Class played.
    pub class: ClassKind,
    /// Final state hash of each run.
    pub hashes: Vec<u64>,
    /// Whether every hash matched.
    pub deterministic: bool,
}

/// Play the same seed `runs` times and compare final state hashes.
pub fn verify_determinism(
    game: &GameConfig,
    class: ClassKind,
    runs: usize,
    max_frames: u64,
) -> Result<VerifyReport, HeadlessError> {
    let hashes = (0..runs)
        .map(|_| run_autopilot(game, class, max_frames).map(|report| report.final_state_hash))
        .collect::<Result<Vec<_>, _>>()?;
    let deterministic = hashes.windows(2).all(|w| w[0] == w[1]);

    Ok(VerifyReport {
        seed: game.seed,
        class,
        hashes,
        deterministic,
    })
}

impl VerifyReport {
    /// Turn a failed check into an error.
    pub fn into_result(self) -> Result<Self, HeadlessError> {
        if self.deterministic {
            return Ok(self);
        }
        let mut unique = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        Err(HeadlessError::NonDeterministic {
            seed: self.seed,
            runs: self.hashes.len(),
            unique: unique.len(),
        })
    }
}
