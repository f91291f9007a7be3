//! Error type for headless runs.

use crawl_core::error::GameError;
use thiserror::Error;

/// Errors surfaced by the headless runner.
#[derive(Error, Debug)]
pub enum HeadlessError {
    /// Config loading or run state machine failure.
    #[error(transparent)]
    Game(#[from] GameError),
    /// Report could not be encoded.
    #[error("Failed to encode report: {0}")]
    Encode(#[from] serde_json::Error),
    /// Same seed and inputs produced different final states.
    #[error("Non-determinism detected for seed {seed}: {unique} distinct hashes over {runs} runs")]
    NonDeterministic {
        /// Seed under test.
        seed: u64,
        /// Runs performed.
        runs: usize,
        /// Distinct final hashes seen.
        unique: usize,
    },
}
