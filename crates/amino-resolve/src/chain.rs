//! Per-kind provider waterfall.
//!
//! | Data kind   | Order                                                          |
//! |-------------|----------------------------------------------------------------|
//! | `info`      | cache, store, remote sources, generative, id-only stub         |
//! | `structure` | cache, remote sources (experimental, then predicted), sentinel |
//! | relations   | cache, store, remote sources, generative, empty list           |
//!
//! The order is fixed. Registered remote sources keep their registration
//! order within the remote tier; the generative tier only runs when a
//! generator is configured. Every step is timeout-bounded and any failure
//! advances the chain.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use amino_cache::KeyValueCache;
use amino_core::keys::resolution_key;
use amino_core::{DataKind, EntityKey, Payload, Provenance, RelationRecord, Resolution, StructureRecord};
use amino_graph::GraphStore;
use amino_sources::{RemoteSource, SourceError};

use crate::envelope::CacheEnvelope;
use crate::invalidation::Ticket;
use crate::policy::ResolverPolicy;
use crate::synth::FallbackSynthesizer;

enum Tier<'a> {
    Cache,
    Store,
    Remote(&'a Arc<dyn RemoteSource>),
    Generative,
    Terminal,
}

impl Tier<'_> {
    fn describe(&self) -> String {
        match self {
            Self::Cache => "cache".to_string(),
            Self::Store => "store".to_string(),
            Self::Remote(source) => format!("remote:{}", source.name()),
            Self::Generative => "generative".to_string(),
            Self::Terminal => "terminal".to_string(),
        }
    }
}

/// A value found by a tier below the cache.
struct Found {
    payload: Payload,
    provenance: Provenance,
    is_generated: bool,
}

pub(crate) struct ProviderChain {
    cache: KeyValueCache,
    store: Arc<dyn GraphStore>,
    sources: HashMap<DataKind, Vec<Arc<dyn RemoteSource>>>,
    synthesizer: FallbackSynthesizer,
    policy: ResolverPolicy,
}

async fn bounded<T, E: std::fmt::Display>(
    limit: Duration,
    provider: &str,
    entity: &EntityKey,
    kind: DataKind,
    step: impl Future<Output = Result<T, E>>,
) -> Option<T> {
    match tokio::time::timeout(limit, step).await {
        Ok(Ok(value)) => Some(value),
        Ok(Err(error)) => {
            tracing::warn!(provider, %entity, %kind, %error, "provider failed");
            None
        }
        Err(_) => {
            tracing::warn!(provider, %entity, %kind, ?limit, "provider timed out");
            None
        }
    }
}

impl ProviderChain {
    pub(crate) fn new(
        cache: KeyValueCache,
        store: Arc<dyn GraphStore>,
        sources: HashMap<DataKind, Vec<Arc<dyn RemoteSource>>>,
        synthesizer: FallbackSynthesizer,
        policy: ResolverPolicy,
    ) -> Self {
        Self {
            cache,
            store,
            sources,
            synthesizer,
            policy,
        }
    }

    fn tiers(&self, kind: DataKind) -> Vec<Tier<'_>> {
        let mut tiers = vec![Tier::Cache];
        if kind != DataKind::Structure {
            tiers.push(Tier::Store);
        }
        if let Some(sources) = self.sources.get(&kind) {
            tiers.extend(sources.iter().map(Tier::Remote));
        }
        if kind != DataKind::Structure && self.synthesizer.has_generator() {
            tiers.push(Tier::Generative);
        }
        tiers.push(Tier::Terminal);
        tiers
    }

    /// Tier names in the order they run for `kind`.
    #[must_use]
    pub fn describe(&self, kind: DataKind) -> Vec<String> {
        self.tiers(kind).iter().map(Tier::describe).collect()
    }

    /// Walk the chain for `kind` of `key`. Never fails.
    ///
    /// The answer is not cached if `ticket` has gone stale by the time it
    /// settles.
    pub async fn run(&self, kind: DataKind, key: &EntityKey, ticket: &Ticket) -> Resolution {
        let cache_key = resolution_key(kind, key);
        for tier in self.tiers(kind) {
            let found = match tier {
                Tier::Cache => {
                    if let Some(hit) = self.from_cache(&cache_key, key, kind).await {
                        return hit;
                    }
                    continue;
                }
                Tier::Store => self.from_store(key, kind).await,
                Tier::Remote(source) => self.from_remote(source, key, kind).await,
                Tier::Generative => self.from_generator(key, kind).await,
                Tier::Terminal => Some(Self::terminal(key, kind)),
            };
            if let Some(found) = found {
                return self.settle(&cache_key, key, kind, found, ticket).await;
            }
        }
        // `tiers` always ends with the terminal tier.
        let found = Self::terminal(key, kind);
        self.settle(&cache_key, key, kind, found, ticket).await
    }

    async fn from_cache(&self, cache_key: &str, key: &EntityKey, kind: DataKind) -> Option<Resolution> {
        let envelope: CacheEnvelope = self.cache.get(cache_key).await?;
        if !envelope.payload.matches(kind) {
            tracing::warn!(key = cache_key, "cached payload has the wrong shape, ignoring");
            return None;
        }
        tracing::debug!(key = cache_key, origin = %envelope.origin, "cache hit");
        Some(envelope.replay(key.clone(), kind))
    }

    async fn from_store(&self, key: &EntityKey, kind: DataKind) -> Option<Found> {
        let limit = self.policy.provider_timeout;
        let provider = self.store.name();
        let payload = if kind == DataKind::Info {
            let entity = bounded(limit, provider, key, kind, self.store.get_entity(key)).await??;
            Payload::Entity(entity)
        } else {
            let records = bounded(limit, provider, key, kind, self.store.get_relations(key, kind)).await?;
            Payload::Relations(records)
        };
        if payload.is_negative() {
            return None;
        }
        Some(Found {
            payload,
            provenance: Provenance::Store,
            is_generated: false,
        })
    }

    async fn from_remote(
        &self,
        source: &Arc<dyn RemoteSource>,
        key: &EntityKey,
        kind: DataKind,
    ) -> Option<Found> {
        let name = source.name();
        let fetch = async {
            match source.fetch(key, kind).await {
                Err(SourceError::Unsupported { .. }) => {
                    tracing::debug!(source = name, %key, %kind, "source does not serve this kind");
                    Ok(None)
                }
                other => other.map(Some),
            }
        };
        let payload = bounded(self.policy.provider_timeout, name, key, kind, fetch).await??;
        if !payload.matches(kind) {
            tracing::warn!(source = name, %key, %kind, "source returned the wrong payload shape");
            return None;
        }
        if payload.is_negative() {
            tracing::debug!(source = name, %key, %kind, "source has no data");
            return None;
        }
        self.promote(key, kind, &payload);
        Some(Found {
            payload,
            provenance: Provenance::remote(name),
            is_generated: false,
        })
    }

    async fn from_generator(&self, key: &EntityKey, kind: DataKind) -> Option<Found> {
        let limit = self.policy.provider_timeout;
        let payload = if kind == DataKind::Info {
            let step = async { Ok::<_, &str>(self.synthesizer.generate_entity(key).await) };
            Payload::Entity(bounded(limit, "generative", key, kind, step).await??)
        } else {
            let step = async { Ok::<_, &str>(self.synthesizer.generate_relations(key, kind).await) };
            Payload::Relations(bounded(limit, "generative", key, kind, step).await??)
        };
        Some(Found {
            payload,
            provenance: Provenance::Synthesized,
            is_generated: true,
        })
    }

    /// Explicit absence: an id-only stub for info, the unavailable sentinel
    /// for structure, an empty list for relations.
    pub(crate) fn terminal_resolution(key: &EntityKey, kind: DataKind) -> Resolution {
        let found = Self::terminal(key, kind);
        Resolution {
            key: key.clone(),
            kind,
            payload: found.payload,
            provenance: found.provenance.clone(),
            origin: found.provenance,
            is_generated: found.is_generated,
        }
    }

    fn terminal(key: &EntityKey, kind: DataKind) -> Found {
        let (payload, is_generated) = match kind {
            DataKind::Info => (Payload::Entity(FallbackSynthesizer::stub_entity(key)), true),
            DataKind::Structure => (Payload::Structure(StructureRecord::unavailable(&key.id)), false),
            _ => (Payload::Relations(Vec::<RelationRecord>::new()), false),
        };
        Found {
            payload,
            provenance: Provenance::Synthesized,
            is_generated,
        }
    }

    /// Cache the answer at the lifetime its kind and certainty call for.
    async fn settle(
        &self,
        cache_key: &str,
        key: &EntityKey,
        kind: DataKind,
        found: Found,
        ticket: &Ticket,
    ) -> Resolution {
        let resolution = Resolution {
            key: key.clone(),
            kind,
            payload: found.payload,
            provenance: found.provenance.clone(),
            origin: found.provenance,
            is_generated: found.is_generated,
        };
        let short_lived = resolution.is_generated
            || resolution.payload.is_negative()
            || resolution.origin == Provenance::Synthesized;
        let ttl = self.policy.ttl.for_kind(kind, short_lived);
        if ticket.is_stale(cache_key) {
            tracing::debug!(key = cache_key, "entity invalidated during resolution, not caching");
        } else if !self
            .cache
            .set(cache_key, &CacheEnvelope::wrap(&resolution), ttl)
            .await
        {
            tracing::debug!(key = cache_key, "resolution not cached");
        }
        tracing::debug!(
            entity = %key,
            %kind,
            provenance = %resolution.provenance,
            ttl_secs = ttl.as_secs(),
            "resolved"
        );
        resolution
    }

    /// Persist a remote answer into the store without delaying the caller.
    fn promote(&self, key: &EntityKey, kind: DataKind, payload: &Payload) {
        if !self.policy.promote_to_store || matches!(payload, Payload::Structure(_)) {
            return;
        }
        let store = Arc::clone(&self.store);
        let key = key.clone();
        let payload = payload.clone();
        tokio::spawn(async move {
            let written = match &payload {
                Payload::Entity(entity) => store.upsert_entity(entity).await,
                Payload::Relations(records) => store.upsert_relations(&key, kind, records).await,
                Payload::Structure(_) => Ok(()),
            };
            if let Err(error) = written {
                tracing::warn!(store = store.name(), entity = %key, %kind, %error, "write-through promotion failed");
            }
        });
    }
}
