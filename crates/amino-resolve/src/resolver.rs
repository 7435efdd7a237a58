//! The resolution facade: `resolve`, `get_entity_graph`, `invalidate`.

use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::Arc;

use amino_cache::{KeyPattern, KeyValueCache};
use amino_core::keys::{graph_key, resolution_key};
use amino_core::{DataKind, EntityKey, EntityKind, GraphNode, GraphView, RelationRecord, Resolution};
use amino_graph::GraphStore;
use amino_llm::TextGenerator;
use amino_sources::RemoteSource;
use serde::Serialize;

use crate::chain::ProviderChain;
use crate::error::ResolveError;
use crate::flight::SingleFlight;
use crate::invalidation::InvalidationLog;
use crate::policy::ResolverPolicy;
use crate::subgraph::SubgraphBuilder;
use crate::synth::FallbackSynthesizer;

/// Every data kind of one protein, resolved concurrently.
#[derive(Debug, Clone, Serialize)]
pub struct Profile {
    pub info: Resolution,
    pub structure: Resolution,
    pub interactions: Resolution,
    pub diseases: Resolution,
    pub drugs: Resolution,
    pub variants: Resolution,
}

struct Inner {
    cache: KeyValueCache,
    store: Arc<dyn GraphStore>,
    chain: ProviderChain,
    subgraphs: SubgraphBuilder,
    policy: ResolverPolicy,
    flights: SingleFlight<Resolution, Infallible>,
    graph_flights: SingleFlight<GraphView, Infallible>,
    invalidations: InvalidationLog,
}

/// Resolves entity data through the provider chain with per-key request
/// coalescing. Cheap to clone.
#[derive(Clone)]
pub struct Resolver {
    inner: Arc<Inner>,
}

/// Wires tiers into a [`Resolver`].
pub struct ResolverBuilder {
    cache: KeyValueCache,
    store: Arc<dyn GraphStore>,
    sources: HashMap<DataKind, Vec<Arc<dyn RemoteSource>>>,
    generator: Option<Arc<dyn TextGenerator>>,
    policy: ResolverPolicy,
}

impl ResolverBuilder {
    /// Append a remote source to the chain for `kind`. Sources for the same
    /// kind are tried in the order they are added.
    #[must_use]
    pub fn source(mut self, kind: DataKind, source: Arc<dyn RemoteSource>) -> Self {
        self.sources.entry(kind).or_default().push(source);
        self
    }

    #[must_use]
    pub fn sources(self, sources: impl IntoIterator<Item = (DataKind, Arc<dyn RemoteSource>)>) -> Self {
        sources
            .into_iter()
            .fold(self, |builder, (kind, source)| builder.source(kind, source))
    }

    /// Enable the generative tier.
    #[must_use]
    pub fn generator(mut self, generator: Arc<dyn TextGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }

    #[must_use]
    pub fn policy(mut self, policy: ResolverPolicy) -> Self {
        self.policy = policy;
        self
    }

    #[must_use]
    pub fn build(self) -> Resolver {
        let synthesizer = FallbackSynthesizer::new(self.generator);
        let subgraphs = SubgraphBuilder::new(
            Arc::clone(&self.store),
            self.policy.edge_backfill,
            self.policy.provider_timeout,
        );
        let chain = ProviderChain::new(
            self.cache.clone(),
            Arc::clone(&self.store),
            self.sources,
            synthesizer,
            self.policy.clone(),
        );
        Resolver {
            inner: Arc::new(Inner {
                cache: self.cache,
                store: self.store,
                chain,
                subgraphs,
                policy: self.policy,
                flights: SingleFlight::new(),
                graph_flights: SingleFlight::new(),
                invalidations: InvalidationLog::new(),
            }),
        }
    }
}

impl Resolver {
    #[must_use]
    pub fn builder(cache: KeyValueCache, store: Arc<dyn GraphStore>) -> ResolverBuilder {
        ResolverBuilder {
            cache,
            store,
            sources: HashMap::new(),
            generator: None,
            policy: ResolverPolicy::default(),
        }
    }

    #[must_use]
    pub fn policy(&self) -> &ResolverPolicy {
        &self.inner.policy
    }

    #[must_use]
    pub fn store(&self) -> &Arc<dyn GraphStore> {
        &self.inner.store
    }

    /// Tier names in the order they run for `kind`.
    #[must_use]
    pub fn chain_order(&self, kind: DataKind) -> Vec<String> {
        self.inner.chain.describe(kind)
    }

    /// Keys with a resolution or graph build currently in flight.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.inner.flights.in_flight() + self.inner.graph_flights.in_flight()
    }

    /// Resolve `kind` data for `key`.
    ///
    /// Never fails. Concurrent calls for the same kind and key share one walk
    /// of the provider chain; when every tier comes up empty the result is an
    /// explicit absence with provenance `synthesized`.
    pub async fn resolve(&self, kind: DataKind, key: &EntityKey) -> Resolution {
        let flight_key = resolution_key(kind, key);
        let this = self.clone();
        let owned = key.clone();
        let outcome = self
            .inner
            .flights
            .execute(&flight_key, move || async move {
                let ticket = this.inner.invalidations.begin();
                Ok(this.inner.chain.run(kind, &owned, &ticket).await)
            })
            .await;
        match outcome {
            Ok(resolution) => resolution,
            Err(error) => {
                tracing::error!(entity = %key, %kind, %error, "resolution aborted");
                ProviderChain::terminal_resolution(key, kind)
            }
        }
    }

    /// [`Self::resolve`] with kind names as they arrive from callers.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::Core`] if either kind name is unknown.
    pub async fn resolve_named(&self, kind: &str, entity_type: &str, id: &str) -> Result<Resolution, ResolveError> {
        let kind: DataKind = kind.parse()?;
        let entity_type: EntityKind = entity_type.parse()?;
        Ok(self.resolve(kind, &EntityKey::new(entity_type, id)).await)
    }

    /// Resolve all six data kinds of a protein at once.
    pub async fn profile(&self, id: &str) -> Profile {
        let key = EntityKey::protein(id);
        let (info, structure, interactions, diseases, drugs, variants) = tokio::join!(
            self.resolve(DataKind::Info, &key),
            self.resolve(DataKind::Structure, &key),
            self.resolve(DataKind::Interactions, &key),
            self.resolve(DataKind::Diseases, &key),
            self.resolve(DataKind::Drugs, &key),
            self.resolve(DataKind::Variants, &key),
        );
        Profile {
            info,
            structure,
            interactions,
            diseases,
            drugs,
            variants,
        }
    }

    /// Subgraph around an entity, `depth` hops deep (the configured default
    /// when `None`).
    ///
    /// Never fails and never returns a graph too thin to show: an
    /// insufficient real graph is replaced by a demo graph flagged
    /// `is_demo`. Demo graphs are cached briefly; sufficient real graphs for
    /// the graph TTL.
    pub async fn get_entity_graph(&self, entity_id: &str, entity_type: EntityKind, depth: Option<usize>) -> GraphView {
        let depth = depth.unwrap_or(self.inner.policy.graph_depth);
        let cache_key = graph_key(entity_type, entity_id, depth);
        let this = self.clone();
        let owned_id = entity_id.to_string();
        let key = cache_key.clone();
        let outcome = self
            .inner
            .graph_flights
            .execute(&cache_key, move || async move {
                Ok(this.build_graph(&key, &owned_id, entity_type, depth).await)
            })
            .await;
        match outcome {
            Ok(view) => view,
            Err(error) => {
                tracing::error!(entity_id, %entity_type, %error, "graph build aborted");
                FallbackSynthesizer::demo_graph(&GraphNode::new(entity_id, entity_type, entity_id))
            }
        }
    }

    async fn build_graph(&self, cache_key: &str, entity_id: &str, entity_type: EntityKind, depth: usize) -> GraphView {
        let ticket = self.inner.invalidations.begin();
        if let Some(view) = self.inner.cache.get::<GraphView>(cache_key).await {
            if view.is_sufficient() && view.edges_are_closed() {
                tracing::debug!(key = cache_key, is_demo = view.is_demo, "graph cache hit");
                return view;
            }
            tracing::warn!(key = cache_key, "cached graph is malformed, rebuilding");
        }

        let view = self.inner.subgraphs.build(entity_id, entity_type, depth).await;
        let ttl = if view.is_demo {
            self.inner.policy.ttl.negative
        } else {
            self.inner.policy.ttl.graph
        };
        if ticket.is_stale(cache_key) {
            tracing::debug!(key = cache_key, "entity invalidated during graph build, not caching");
        } else {
            self.inner.cache.set(cache_key, &view, ttl).await;
        }
        view
    }

    /// Drop every cached value whose key mentions `entity_id`: all data
    /// kinds, all entity types, and every graph depth. Returns the number of
    /// keys removed.
    ///
    /// Matching is by substring, so an id that is a prefix of another
    /// (`P0463` and `P04637`) evicts both. That costs a refetch, never a
    /// stale read. An empty id removes nothing.
    ///
    /// Resolutions and graph builds already running for a matching key are
    /// not cached when they finish, and later callers no longer join them.
    pub async fn invalidate(&self, entity_id: &str) -> u64 {
        if entity_id.is_empty() {
            return 0;
        }
        self.inner.invalidations.mark(entity_id);
        let removed = self
            .inner
            .cache
            .delete_pattern(&KeyPattern::containing(entity_id))
            .await;
        let matches = |key: &str| key.contains(entity_id);
        let detached = self.inner.flights.detach(matches) + self.inner.graph_flights.detach(matches);
        tracing::info!(entity_id, removed, detached, "invalidated cached entries");
        removed
    }

    /// Write a relation into the graph store and invalidate both endpoints.
    /// Returns the number of cache keys removed.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::Graph`] if the store rejects the write, for
    /// example when `kind` is not a relation kind.
    pub async fn record_relation(
        &self,
        subject: &EntityKey,
        kind: DataKind,
        record: RelationRecord,
    ) -> Result<u64, ResolveError> {
        let object = record.id.clone();
        self.inner
            .store
            .upsert_relations(subject, kind, std::slice::from_ref(&record))
            .await?;
        let removed = self.invalidate(&subject.id).await + self.invalidate(&object).await;
        tracing::info!(subject = %subject, %kind, object, "recorded relation");
        Ok(removed)
    }
}
