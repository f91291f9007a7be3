//! Error types for the crawl simulation.
//!
//! The frame loop itself never fails; errors only surface when loading
//! configuration or when a caller drives the run state machine out of order.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using [`GameError`].
pub type Result<T> = std::result::Result<T, GameError>;

/// Top-level error type for the crawl simulation.
#[derive(Debug, Error)]
pub enum GameError {
    /// Configuration file could not be read.
    #[error("Failed to read config file '{path}': {source}")]
    ConfigIo {
        /// Path to the file that failed to load.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Configuration text is not valid RON for [`GameConfig`](crate::config::GameConfig).
    #[error("Failed to parse config '{origin}': {source}")]
    ConfigParse {
        /// File path, or `<inline>` for string input.
        origin: String,
        /// Parser error with line/column span.
        #[source]
        source: ron::error::SpannedError,
    },

    /// Configuration parsed but holds values the simulation cannot run with.
    #[error("Invalid config: {}", .0.join("; "))]
    InvalidConfig(Vec<String>),

    /// Unknown class name.
    #[error("Unknown class: {0}")]
    UnknownClass(String),

    /// Operation is not allowed in the current run state.
    #[error("Invalid game state: {0}")]
    InvalidState(String),
}
