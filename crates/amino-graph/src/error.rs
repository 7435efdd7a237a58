//! Graph store error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GraphError {
    /// Schema migration failed.
    #[error("Migration failed: {0}")]
    Migration(String),

    /// A stored row could not be decoded.
    #[error("Invalid stored data: {0}")]
    InvalidState(String),

    /// Tried to store relations for a data kind that is not a relation.
    #[error("'{0}' is not a relation kind")]
    NotARelation(amino_core::DataKind),

    #[error("libSQL error: {0}")]
    LibSql(#[from] libsql::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
