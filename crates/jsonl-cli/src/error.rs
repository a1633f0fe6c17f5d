//! Error types for jsonl CLI operations.

use thiserror::Error;

/// The error type for jsonl CLI operations.
///
/// I/O failures are reported through `anyhow` with the path as context.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration file could not be read or understood.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A command-line value is not valid JSON.
    #[error("invalid JSON value {value:?}: {source}")]
    InvalidValue {
        /// The offending argument.
        value: String,
        /// Why it failed to parse.
        source: serde_json::Error,
    },
}

/// A specialized Result type for jsonl CLI operations.
pub type Result<T> = std::result::Result<T, Error>;
