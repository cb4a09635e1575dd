//! Error types for cache operations

use thiserror::Error;

/// Main error type for all cache operations
#[derive(Error, Debug, Clone)]
pub enum CacheError {
    /// Encoding a record to its cached text form failed
    #[error("encode error: {0}")]
    Encode(String),

    /// Cached text could not be decoded back into a record
    #[error("decode error: {0}")]
    Decode(String),

    /// Store connection failed
    #[error("connection error: {0}")]
    Connection(String),

    /// Store operation failed
    #[error("store error: {0}")]
    Store(String),

    /// Rebuild lock could not be acquired within the retry budget
    #[error("rebuild timed out for key: {0}")]
    RebuildTimeout(String),

    /// Internal error
    #[error("internal error: {0}")]
    Internal(String),
}

/// Result type alias for cache operations
pub type Result<T> = std::result::Result<T, CacheError>;
