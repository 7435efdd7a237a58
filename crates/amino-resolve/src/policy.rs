//! Deployment-tunable resolution policy.
//!
//! Provider order is fixed per data kind and is not part of the policy; only
//! lifetimes, timeouts, and optional behaviors are.

use std::time::Duration;

use amino_config::AminoConfig;
use amino_core::DataKind;

/// Cache lifetimes by data kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TtlPolicy {
    pub info: Duration,
    pub structure: Duration,
    pub relations: Duration,
    pub graph: Duration,
    /// Lifetime of explicit absence and of synthesized values.
    pub negative: Duration,
}

impl TtlPolicy {
    /// Lifetime for a resolved value of `kind`.
    #[must_use]
    pub const fn for_kind(&self, kind: DataKind, negative: bool) -> Duration {
        if negative {
            return self.negative;
        }
        match kind {
            DataKind::Info => self.info,
            DataKind::Structure => self.structure,
            DataKind::Interactions | DataKind::Diseases | DataKind::Drugs | DataKind::Variants => {
                self.relations
            }
        }
    }
}

impl Default for TtlPolicy {
    fn default() -> Self {
        Self {
            info: Duration::from_secs(86_400),
            structure: Duration::from_secs(604_800),
            relations: Duration::from_secs(3_600),
            graph: Duration::from_secs(3_600),
            negative: Duration::from_secs(900),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ResolverPolicy {
    pub ttl: TtlPolicy,
    /// Upper bound on one provider step. A timeout advances the chain.
    pub provider_timeout: Duration,
    /// Default hop count for entity graphs.
    pub graph_depth: usize,
    /// Persist remote results into the graph store in the background.
    pub promote_to_store: bool,
    /// Connect orphaned neighbors to the center with a generic edge.
    pub edge_backfill: bool,
}

impl ResolverPolicy {
    /// Policy from validated configuration.
    #[must_use]
    pub const fn from_config(config: &AminoConfig) -> Self {
        Self {
            ttl: TtlPolicy {
                info: Duration::from_secs(config.ttl.info_secs),
                structure: Duration::from_secs(config.ttl.structure_secs),
                relations: Duration::from_secs(config.ttl.relations_secs),
                graph: Duration::from_secs(config.ttl.graph_secs),
                negative: Duration::from_secs(config.ttl.negative_secs),
            },
            provider_timeout: config.resolver.provider_timeout(),
            graph_depth: config.resolver.graph_depth,
            promote_to_store: config.resolver.promote_to_store,
            edge_backfill: config.resolver.edge_backfill,
        }
    }
}

impl Default for ResolverPolicy {
    fn default() -> Self {
        Self {
            ttl: TtlPolicy::default(),
            provider_timeout: Duration::from_secs(15),
            graph_depth: 2,
            promote_to_store: true,
            edge_backfill: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn negative_results_expire_sooner() {
        let ttl = TtlPolicy::default();
        for kind in DataKind::ALL {
            assert!(ttl.for_kind(kind, true) < ttl.for_kind(kind, false), "{kind}");
        }
    }

    #[test]
    fn policy_follows_config() {
        let mut config = AminoConfig::default();
        config.ttl.structure_secs = 60;
        config.resolver.graph_depth = 3;
        config.resolver.promote_to_store = false;

        let policy = ResolverPolicy::from_config(&config);
        assert_eq!(policy.ttl.for_kind(DataKind::Structure, false), Duration::from_secs(60));
        assert_eq!(policy.graph_depth, 3);
        assert!(!policy.promote_to_store);
        assert_eq!(policy.provider_timeout, Duration::from_secs(15));
    }
}
