use thiserror::Error;

/// Errors raised by cache backends.
///
/// These never reach callers of [`crate::KeyValueCache`], which turns every
/// failure into a miss, a failed write, or a zero count.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("libSQL error: {0}")]
    LibSql(#[from] libsql::Error),

    #[error("Invalid key pattern: {0}")]
    Pattern(#[from] globset::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Cache operation timed out after {0:?}")]
    Timeout(std::time::Duration),
}
