//! Cached form of a resolution.
//!
//! The envelope keeps the tier that first produced the value so a replay can
//! still tell authoritative data from synthesized data.

use amino_core::{DataKind, EntityKey, Payload, Provenance, Resolution};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEnvelope {
    pub payload: Payload,
    pub origin: Provenance,
    pub is_generated: bool,
    pub stored_at: DateTime<Utc>,
}

impl CacheEnvelope {
    #[must_use]
    pub fn wrap(resolution: &Resolution) -> Self {
        Self {
            payload: resolution.payload.clone(),
            origin: resolution.origin.clone(),
            is_generated: resolution.is_generated,
            stored_at: Utc::now(),
        }
    }

    /// Replay as a cache hit. Synthesized values stay marked synthesized.
    #[must_use]
    pub fn replay(self, key: EntityKey, kind: DataKind) -> Resolution {
        let provenance = if self.origin == Provenance::Synthesized {
            Provenance::Synthesized
        } else {
            Provenance::Cache
        };
        Resolution {
            key,
            kind,
            payload: self.payload,
            provenance,
            origin: self.origin,
            is_generated: self.is_generated,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use amino_core::PartialEntity;
    use pretty_assertions::assert_eq;

    fn resolution(origin: Provenance, is_generated: bool) -> Resolution {
        let key = EntityKey::protein("P04637");
        Resolution {
            payload: Payload::Entity(PartialEntity::new(key.clone()).with("name", "p53")),
            key,
            kind: DataKind::Info,
            provenance: origin.clone(),
            origin,
            is_generated,
        }
    }

    #[test]
    fn remote_value_replays_as_cache() {
        let original = resolution(Provenance::remote("uniprot"), false);
        let replayed = CacheEnvelope::wrap(&original).replay(original.key.clone(), DataKind::Info);

        assert_eq!(replayed.provenance, Provenance::Cache);
        assert_eq!(replayed.origin, Provenance::remote("uniprot"));
        assert_eq!(replayed.payload, original.payload);
    }

    #[test]
    fn synthesized_value_stays_synthesized() {
        let original = resolution(Provenance::Synthesized, true);
        let raw = serde_json::to_string(&CacheEnvelope::wrap(&original)).unwrap();
        let envelope: CacheEnvelope = serde_json::from_str(&raw).unwrap();
        let replayed = envelope.replay(original.key.clone(), DataKind::Info);

        assert_eq!(replayed.provenance, Provenance::Synthesized);
        assert!(replayed.is_generated);
    }
}
