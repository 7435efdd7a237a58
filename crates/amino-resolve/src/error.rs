//! Resolver error types.
//!
//! Resolution itself never fails: provider errors are absorbed by the chain.
//! These errors cover caller bugs (unknown kinds) and the write path.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ResolveError {
    /// An unknown entity or data kind. Always a caller bug.
    #[error(transparent)]
    Core(#[from] amino_core::CoreError),

    /// The graph store rejected a write.
    #[error("graph store error: {0}")]
    Graph(#[from] amino_graph::GraphError),

    #[error("configuration error: {0}")]
    Config(#[from] amino_config::ConfigError),
}
