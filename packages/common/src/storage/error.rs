use thiserror::Error;

/// Errors that can occur during artifact storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The requested artifact was not found.
    #[error("artifact not found: {0}")]
    NotFound(String),

    /// An I/O error occurred.
    #[error("storage IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The provided storage key is malformed.
    #[error("invalid storage key: {0}")]
    InvalidKey(String),

    /// The artifact exceeds the configured size limit.
    #[error("artifact exceeds size limit ({actual} > {limit} bytes)")]
    SizeLimitExceeded { actual: u64, limit: u64 },
}
