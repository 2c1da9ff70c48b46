//! Error types for equilibrar

use crate::config::ValidationError;

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by configuration, data loading, and persistence
///
/// Degenerate training conditions (no generation candidates, no accepted
/// samples, vanishing gradients) are not errors and never appear here.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration: {0}")]
    Validation(#[from] ValidationError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Shape mismatch: expected {expected}, got {actual}")]
    Shape { expected: String, actual: String },

    #[error("Checkpoint error: {0}")]
    Checkpoint(String),

    #[error("Data error: {0}")]
    Data(String),
}
