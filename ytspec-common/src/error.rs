//! Common error types for ytspec

use thiserror::Error;

/// Common result type for ytspec operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error taxonomy for a single pipeline run
///
/// Every variant is fatal to the run unless the failing sink is best-effort
/// (see `ytspec::sinks::FailurePolicy`).
#[derive(Error, Debug)]
pub enum Error {
    /// Input audio file missing or unreadable
    #[error("Input error: {0}")]
    Input(String),

    /// The audio stream could not be probed or decoded
    #[error("Decode error: {0}")]
    Decode(String),

    /// Peak amplitude is zero, so there is nothing to normalize against
    #[error("Degenerate input: peak amplitude is zero across {sample_count} samples")]
    DegenerateInput { sample_count: usize },

    /// Extractor produced NaN or infinity
    #[error("Non-finite amplitude at slice {index}")]
    NonFiniteSample { index: usize },

    /// JSON encoding failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Database operation error (wraps sqlx::Error)
    #[cfg(feature = "sqlx")]
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed or returned a non-2xx status
    #[error("HTTP error: {0}")]
    Http(String),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid user input (clip name, identifier)
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
