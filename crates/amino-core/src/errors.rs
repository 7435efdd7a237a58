//! Cross-cutting error types for AminoVerse.
//!
//! Tier-specific errors (`CacheError`, `GraphError`, `SourceError`) live in
//! their own crates. `CoreError` covers contract violations that every crate
//! can hit, chiefly an unknown kind name coming from a collaborator.

use thiserror::Error;

/// Errors that can be raised by any AminoVerse crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A kind name did not match any known entity or data kind.
    #[error("Invalid {field}: '{value}' (expected one of: {expected})")]
    InvalidKind {
        field: &'static str,
        value: String,
        expected: String,
    },

    /// Data failed validation (shape, required fields, constraints).
    #[error("Validation error: {0}")]
    Validation(String),

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
