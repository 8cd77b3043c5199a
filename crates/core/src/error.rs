//! Error types for the core domain.

use thiserror::Error;

/// Core domain error type.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid path: {0}")]
    InvalidPath(String),

    #[error("invalid domain: {0}")]
    InvalidDomain(String),

    #[error("At least one file is required")]
    NoFilesProvided,

    #[error("File {name} exceeds {} limit ({})", human_bytes(.limit), human_bytes(.size))]
    FileTooLarge { name: String, size: u64, limit: u64 },

    #[error("configuration error: {0}")]
    Config(String),
}

fn human_bytes(bytes: &u64) -> String {
    crate::format::format_bytes(*bytes)
}

impl Error {
    /// Whether the error was caused by client input rather than a server fault.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, Error::Config(_))
    }
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, Error>;
