//! Cache tier configuration: backend selection, latency bound, and TTLs.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Storage backend for the cache and graph tiers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Backend {
    /// Process-local, lost on exit.
    #[default]
    Memory,
    /// Local libSQL database file.
    Libsql,
}

const fn default_op_timeout_ms() -> u64 {
    2_000
}

fn default_cache_path() -> String {
    ".aminoverse/cache.db".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    #[serde(default)]
    pub backend: Backend,

    /// Database file for the `libsql` backend.
    #[serde(default = "default_cache_path")]
    pub path: String,

    /// Upper bound on any single cache operation. A timeout is a miss.
    #[serde(default = "default_op_timeout_ms")]
    pub op_timeout_ms: u64,
}

impl CacheConfig {
    #[must_use]
    pub const fn op_timeout(&self) -> Duration {
        Duration::from_millis(self.op_timeout_ms)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: Backend::default(),
            path: default_cache_path(),
            op_timeout_ms: default_op_timeout_ms(),
        }
    }
}

const fn default_info_secs() -> u64 {
    86_400
}

const fn default_structure_secs() -> u64 {
    604_800
}

const fn default_relations_secs() -> u64 {
    3_600
}

const fn default_graph_secs() -> u64 {
    3_600
}

const fn default_negative_secs() -> u64 {
    900
}

/// Longest allowed lifetime for a negative result.
pub const MAX_NEGATIVE_SECS: u64 = 3_600;

/// Time-to-live per kind of cached value.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TtlConfig {
    /// Entity attributes.
    #[serde(default = "default_info_secs")]
    pub info_secs: u64,

    /// Positive structure records.
    #[serde(default = "default_structure_secs")]
    pub structure_secs: u64,

    /// Relation lists (interactions, diseases, drugs, variants).
    #[serde(default = "default_relations_secs")]
    pub relations_secs: u64,

    /// Entity graph views.
    #[serde(default = "default_graph_secs")]
    pub graph_secs: u64,

    /// Negative and synthesized results.
    #[serde(default = "default_negative_secs")]
    pub negative_secs: u64,
}

impl TtlConfig {
    /// Negative results must expire sooner than any positive result and
    /// within an hour.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let shortest_positive = self
            .info_secs
            .min(self.structure_secs)
            .min(self.relations_secs)
            .min(self.graph_secs);

        if self.negative_secs == 0 {
            return Err(invalid("ttl.negative_secs", "must be greater than zero"));
        }
        if self.negative_secs > MAX_NEGATIVE_SECS {
            return Err(invalid(
                "ttl.negative_secs",
                &format!("must be at most {MAX_NEGATIVE_SECS}"),
            ));
        }
        if self.negative_secs > shortest_positive {
            return Err(invalid(
                "ttl.negative_secs",
                &format!("must not exceed the shortest positive TTL ({shortest_positive}s)"),
            ));
        }
        Ok(())
    }
}

impl Default for TtlConfig {
    fn default() -> Self {
        Self {
            info_secs: default_info_secs(),
            structure_secs: default_structure_secs(),
            relations_secs: default_relations_secs(),
            graph_secs: default_graph_secs(),
            negative_secs: default_negative_secs(),
        }
    }
}

fn invalid(field: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}
