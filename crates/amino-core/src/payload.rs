//! Resolved value shapes.
//!
//! Each [`DataKind`] resolves to exactly one [`Payload`] shape. Negative
//! results (no structure, empty relation list) are ordinary payloads, so a
//! resolution always yields something renderable.

use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::entity::PartialEntity;
use crate::enums::{DataKind, StructureStatus};

/// A structure summary for an entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct StructureRecord {
    pub status: StructureStatus,
    /// Source that produced the record (`"pdb"`, `"alphafold"`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Entry or model identifier in the source.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, Value>,
}

impl StructureRecord {
    #[must_use]
    pub fn available(
        status: StructureStatus,
        source: impl Into<String>,
        model_id: impl Into<String>,
    ) -> Self {
        Self {
            status,
            source: Some(source.into()),
            model_id: Some(model_id.into()),
            message: None,
            attributes: BTreeMap::new(),
        }
    }

    /// The "no structure known" sentinel.
    #[must_use]
    pub fn unavailable(entity_id: &str) -> Self {
        Self {
            status: StructureStatus::Unavailable,
            source: None,
            model_id: None,
            message: Some(format!("No structure data found for {entity_id}")),
            attributes: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub fn is_available(&self) -> bool {
        self.status != StructureStatus::Unavailable
    }
}

/// One edge of a relation list: the entity on the other end plus evidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RelationRecord {
    /// Identifier of the related entity.
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Confidence in `0.0..=1.0` when the source scores relations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, Value>,
}

impl RelationRecord {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            score: None,
            source: None,
            attributes: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn scored(mut self, score: f64) -> Self {
        self.score = Some(score);
        self
    }

    #[must_use]
    pub fn from_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }
}

/// A resolved value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "shape", content = "data", rename_all = "snake_case")]
pub enum Payload {
    Entity(PartialEntity),
    Structure(StructureRecord),
    Relations(Vec<RelationRecord>),
}

impl Payload {
    /// Whether this shape is the one `kind` resolves to.
    #[must_use]
    pub const fn matches(&self, kind: DataKind) -> bool {
        match self {
            Self::Entity(_) => matches!(kind, DataKind::Info),
            Self::Structure(_) => matches!(kind, DataKind::Structure),
            Self::Relations(_) => kind.is_relation(),
        }
    }

    /// Explicit absence: an attribute-less entity, an unavailable structure,
    /// or an empty relation list.
    #[must_use]
    pub fn is_negative(&self) -> bool {
        match self {
            Self::Entity(entity) => entity.is_empty(),
            Self::Structure(structure) => !structure.is_available(),
            Self::Relations(items) => items.is_empty(),
        }
    }

    #[must_use]
    pub const fn as_entity(&self) -> Option<&PartialEntity> {
        match self {
            Self::Entity(entity) => Some(entity),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_structure(&self) -> Option<&StructureRecord> {
        match self {
            Self::Structure(structure) => Some(structure),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_relations(&self) -> Option<&[RelationRecord]> {
        match self {
            Self::Relations(items) => Some(items),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::EntityKey;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn shape_matches_kind() {
        let entity = Payload::Entity(PartialEntity::new(EntityKey::protein("P1")));
        let structure = Payload::Structure(StructureRecord::unavailable("P1"));
        let relations = Payload::Relations(vec![]);

        assert!(entity.matches(DataKind::Info));
        assert!(!entity.matches(DataKind::Structure));
        assert!(structure.matches(DataKind::Structure));
        for kind in DataKind::RELATIONS {
            assert!(relations.matches(kind));
        }
        assert!(!relations.matches(DataKind::Info));
    }

    #[test]
    fn negative_payloads() {
        assert!(Payload::Relations(vec![]).is_negative());
        assert!(Payload::Structure(StructureRecord::unavailable("P1")).is_negative());
        assert!(Payload::Entity(PartialEntity::new(EntityKey::protein("P1"))).is_negative());

        let found = StructureRecord::available(StructureStatus::Predicted, "alphafold", "AF-P1");
        assert!(!Payload::Structure(found).is_negative());
        assert!(!Payload::Relations(vec![RelationRecord::new("P2")]).is_negative());
    }

    #[test]
    fn unavailable_message_names_entity() {
        let record = StructureRecord::unavailable("P04637");
        assert_eq!(
            record.message.as_deref(),
            Some("No structure data found for P04637")
        );
    }

    #[test]
    fn adjacently_tagged_json() {
        let payload = Payload::Relations(vec![
            RelationRecord::new("Q00987").named("MDM2").scored(0.999),
        ]);
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(
            json,
            json!({
                "shape": "relations",
                "data": [{"id": "Q00987", "name": "MDM2", "score": 0.999}]
            })
        );
        let back: Payload = serde_json::from_value(json).unwrap();
        assert_eq!(back, payload);
    }
}
