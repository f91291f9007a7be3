//! Headless run driver for balance batches and CI determinism checks.
//!
//! Runs the simulation without a window. An [`autopilot::Autopilot`]
//! stands in for the player's input, and results come out as JSON:
//!
//! - **stdout**: JSON reports
//! - **stderr**: logs (human-readable)
//!
//! # Example
//!
//! ```bash
//! # One run
//! cargo run -p crawl_headless -- run --class ranged --seed 7
//!
//! # 200 seeds per class, in parallel
//! cargo run -p crawl_headless -- batch --count 200
//!
//! # Same seed five times, fail on any hash mismatch
//! cargo run -p crawl_headless -- verify --seed 12345 --runs 5
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod autopilot;
pub mod batch;
pub mod error;
pub mod runner;

pub use autopilot::Autopilot;
pub use batch::{run_batch, verify_determinism, BatchConfig, BatchSummary, ClassSummary, VerifyReport};
pub use error::HeadlessError;
pub use runner::{run_autopilot, RunReport, RunResult};
