use std::collections::BTreeMap;

use amino_core::{DataKind, EntityKey, EntityKind, GraphEdge, GraphNode, PartialEntity, RelationRecord};
use async_trait::async_trait;
use serde_json::Value;

use crate::error::GraphError;
use crate::neighborhood::Neighborhood;

/// Query and write interface over the persistent property graph.
///
/// Implementations hold no cache and do no retries. Reads must return
/// sanitized results (see [`Neighborhood::sanitized`]). The store may be
/// written concurrently by other collaborators, so reads are only
/// eventually consistent with writes made elsewhere.
#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Short name for log fields.
    fn name(&self) -> &'static str;

    /// The entity and everything within `max_depth` hops of it, ignoring edge
    /// direction. Empty if no node with that id and type exists.
    async fn get_neighborhood(
        &self,
        entity_id: &str,
        entity_type: EntityKind,
        max_depth: usize,
    ) -> Result<Neighborhood, GraphError>;

    /// Stored attributes of an entity. Nodes known only as relation
    /// endpoints come back with no attributes.
    async fn get_entity(&self, key: &EntityKey) -> Result<Option<PartialEntity>, GraphError>;

    /// Relation records of one kind for an entity.
    async fn get_relations(
        &self,
        key: &EntityKey,
        kind: DataKind,
    ) -> Result<Vec<RelationRecord>, GraphError>;

    /// Insert or update an entity. Provided attributes are applied as a JSON
    /// merge patch (see [`merge_properties`]) in one atomic step; attributes
    /// not mentioned are kept.
    async fn upsert_entity(&self, entity: &PartialEntity) -> Result<(), GraphError>;

    /// Insert or update relation edges for an entity, creating endpoint nodes
    /// as needed.
    async fn upsert_relations(
        &self,
        key: &EntityKey,
        kind: DataKind,
        records: &[RelationRecord],
    ) -> Result<(), GraphError>;

    /// Bulk load raw nodes and edges. Edges with unknown endpoints are skipped.
    /// Returns the number of nodes and edges written.
    async fn load(&self, nodes: &[GraphNode], edges: &[GraphEdge]) -> Result<(usize, usize), GraphError>;
}

/// Apply `patch` to stored node properties as a JSON merge patch (RFC 7396):
/// a null removes the attribute, an object merges into the stored object,
/// anything else replaces the stored value.
pub fn merge_properties(stored: &mut BTreeMap<String, Value>, patch: &BTreeMap<String, Value>) {
    for (name, value) in patch {
        if value.is_null() {
            stored.remove(name);
        } else {
            merge_value(stored.entry(name.clone()).or_insert(Value::Null), value);
        }
    }
}

fn merge_value(target: &mut Value, patch: &Value) {
    let Value::Object(patch) = patch else {
        target.clone_from(patch);
        return;
    };
    if !target.is_object() {
        *target = Value::Object(serde_json::Map::new());
    }
    if let Value::Object(target) = target {
        for (name, value) in patch {
            if value.is_null() {
                target.remove(name);
            } else {
                merge_value(target.entry(name.clone()).or_insert(Value::Null), value);
            }
        }
    }
}
