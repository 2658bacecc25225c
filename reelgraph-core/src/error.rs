//! Error types for reelgraph-core.

use thiserror::Error;

/// Error type for recommender operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid hyperparameter value. Reported before any graph work starts.
    #[error("invalid configuration: `{field}`: {reason}")]
    InvalidConfig {
        /// Name of the offending configuration field.
        field: &'static str,
        /// What was wrong with it.
        reason: String,
    },

    /// CSV reader error (file-level; malformed rows are skipped, not raised).
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for recommender operations.
pub type Result<T> = std::result::Result<T, Error>;
