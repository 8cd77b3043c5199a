//! Counters store error types.

use thiserror::Error;

/// Counters store operation errors.
#[derive(Debug, Error)]
pub enum CountersError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("increment of {counter} by {delta} exceeds the storable range")]
    Overflow { counter: &'static str, delta: u64 },

    #[error("internal error: {0}")]
    Internal(String),
}

/// Result type for counters operations.
pub type CountersResult<T> = std::result::Result<T, CountersError>;
