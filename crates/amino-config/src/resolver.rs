//! Resolution policy knobs.

use std::time::Duration;

use serde::{Deserialize, Serialize};

const fn default_provider_timeout_ms() -> u64 {
    15_000
}

const fn default_graph_depth() -> usize {
    2
}

const fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ResolverConfig {
    /// Upper bound on a single provider step. A timeout advances the chain.
    #[serde(default = "default_provider_timeout_ms")]
    pub provider_timeout_ms: u64,

    /// Default traversal depth for entity graphs.
    #[serde(default = "default_graph_depth")]
    pub graph_depth: usize,

    /// Persist remote results into the graph store in the background.
    #[serde(default = "default_true")]
    pub promote_to_store: bool,

    /// Link the central node to orphaned neighbors with a generic edge.
    #[serde(default = "default_true")]
    pub edge_backfill: bool,
}

impl ResolverConfig {
    #[must_use]
    pub const fn provider_timeout(&self) -> Duration {
        Duration::from_millis(self.provider_timeout_ms)
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            provider_timeout_ms: default_provider_timeout_ms(),
            graph_depth: default_graph_depth(),
            promote_to_store: true,
            edge_backfill: true,
        }
    }
}
