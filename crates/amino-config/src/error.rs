//! Configuration error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// Figment could not merge or extract the layered sources.
    #[error("failed to load configuration: {0}")]
    Figment(#[from] figment::Error),

    /// A section needed by the caller has no usable settings.
    #[error("'{section}' is not configured")]
    NotConfigured { section: String },

    /// A value parsed but violates a cross-field constraint.
    #[error("invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}
