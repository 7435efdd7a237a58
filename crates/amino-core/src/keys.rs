//! Cache key builders.
//!
//! Every key embeds the raw entity id, so `*{id}*` matches all keys for an
//! entity regardless of kind.

use crate::entity::EntityKey;
use crate::enums::{DataKind, EntityKind};

/// Key for a resolved data kind: `{data_kind}:{entity_kind}:{id}`.
#[must_use]
pub fn resolution_key(kind: DataKind, key: &EntityKey) -> String {
    format!("{}:{}:{}", kind.as_str(), key.kind.as_str(), key.id)
}

/// Key for an entity graph view: `entity_graph:{entity_type}:{id}:{depth}`.
#[must_use]
pub fn graph_key(entity_type: EntityKind, entity_id: &str, depth: usize) -> String {
    format!("entity_graph:{}:{entity_id}:{depth}", entity_type.label())
}
