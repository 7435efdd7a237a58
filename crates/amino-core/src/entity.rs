//! Entity identity and partial attribute records.
//!
//! A [`PartialEntity`] distinguishes three states for every attribute:
//! absent (no key), explicitly null (`Value::Null`), and present (any other
//! value, including an empty string). Merging never collapses these states.

use std::collections::BTreeMap;
use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::enums::EntityKind;

/// Well-known attribute names.
pub mod attr {
    pub const NAME: &str = "name";
    pub const FULL_NAME: &str = "full_name";
    pub const FUNCTION: &str = "function";
    pub const DESCRIPTION: &str = "description";
    pub const SEQUENCE: &str = "sequence";
    pub const ORGANISM: &str = "organism";
    pub const LENGTH: &str = "length";
    pub const IS_GENERATED: &str = "is_generated";
}

/// Keys owned by [`EntityKey`] and never stored as attributes.
const RESERVED: [&str; 2] = ["id", "kind"];

/// Identity of an entity: exact match on `(kind, id)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
pub struct EntityKey {
    pub kind: EntityKind,
    pub id: String,
}

impl EntityKey {
    #[must_use]
    pub fn new(kind: EntityKind, id: impl Into<String>) -> Self {
        Self {
            kind,
            id: id.into(),
        }
    }

    #[must_use]
    pub fn protein(id: impl Into<String>) -> Self {
        Self::new(EntityKind::Protein, id)
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.id)
    }
}

/// An entity whose attributes may be incomplete.
///
/// Serializes flat: `{"kind": "protein", "id": "P04637", "name": "TP53", ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PartialEntity {
    #[serde(flatten)]
    pub key: EntityKey,
    #[serde(flatten)]
    pub attributes: BTreeMap<String, Value>,
}

impl PartialEntity {
    #[must_use]
    pub const fn new(key: EntityKey) -> Self {
        Self {
            key,
            attributes: BTreeMap::new(),
        }
    }

    /// Build from a JSON object, dropping the reserved `id`/`kind` keys.
    ///
    /// Non-object values produce an entity with no attributes.
    #[must_use]
    pub fn from_object(key: EntityKey, value: Value) -> Self {
        let mut entity = Self::new(key);
        if let Value::Object(map) = value {
            for (name, value) in map {
                entity.set(name, value);
            }
        }
        entity
    }

    /// Set an attribute. Reserved key names are ignored.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        let name = name.into();
        if !RESERVED.contains(&name.as_str()) {
            self.attributes.insert(name, value.into());
        }
        self
    }

    /// Builder-style [`set`](Self::set).
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(name, value);
        self
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    /// String attribute, if present and a string.
    #[must_use]
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).and_then(Value::as_str)
    }

    /// Display name: the `name` attribute when it is a non-empty string,
    /// otherwise the id.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.get_str(attr::NAME)
            .filter(|name| !name.is_empty())
            .unwrap_or(&self.key.id)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// Whether this record carries the synthesized-data marker.
    #[must_use]
    pub fn is_generated(&self) -> bool {
        self.get(attr::IS_GENERATED)
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    /// Fill gaps from a lower-priority record.
    ///
    /// Only absent or null attributes are taken from `lower`; any present
    /// value here, an empty string included, is kept.
    pub fn fill_from(&mut self, lower: &Self) {
        for (name, value) in &lower.attributes {
            match self.attributes.get(name) {
                None | Some(Value::Null) => {
                    self.attributes.insert(name.clone(), value.clone());
                }
                Some(_) => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn p53() -> PartialEntity {
        PartialEntity::new(EntityKey::protein("P04637"))
    }

    #[test]
    fn serializes_flat() {
        let entity = p53().with(attr::NAME, "TP53").with(attr::LENGTH, 393);
        let json = serde_json::to_value(&entity).unwrap();
        assert_eq!(
            json,
            json!({"kind": "protein", "id": "P04637", "name": "TP53", "length": 393})
        );
        let back: PartialEntity = serde_json::from_value(json).unwrap();
        assert_eq!(back, entity);
    }

    #[test]
    fn from_object_skips_reserved_keys() {
        let entity = PartialEntity::from_object(
            EntityKey::protein("P04637"),
            json!({"id": "other", "kind": "drug", "name": "p53"}),
        );
        assert_eq!(entity.key.id, "P04637");
        assert_eq!(entity.attributes.len(), 1);
        assert_eq!(entity.get_str("name"), Some("p53"));
    }

    #[test]
    fn fill_from_never_overwrites_present_values() {
        let mut primary = p53()
            .with(attr::NAME, "TP53")
            .with(attr::DESCRIPTION, "")
            .with(attr::ORGANISM, Value::Null);
        let lower = p53()
            .with(attr::NAME, "worse name")
            .with(attr::DESCRIPTION, "worse description")
            .with(attr::ORGANISM, "Homo sapiens")
            .with(attr::SEQUENCE, "MEEPQ");

        primary.fill_from(&lower);

        assert_eq!(primary.get_str(attr::NAME), Some("TP53"));
        // Empty string is present, not absent.
        assert_eq!(primary.get_str(attr::DESCRIPTION), Some(""));
        assert_eq!(primary.get_str(attr::ORGANISM), Some("Homo sapiens"));
        assert_eq!(primary.get_str(attr::SEQUENCE), Some("MEEPQ"));
    }

    #[test]
    fn display_name_falls_back_to_id() {
        assert_eq!(p53().display_name(), "P04637");
        assert_eq!(p53().with(attr::NAME, "").display_name(), "P04637");
        assert_eq!(p53().with(attr::NAME, "TP53").display_name(), "TP53");
    }

    #[test]
    fn generated_marker() {
        assert!(!p53().is_generated());
        assert!(p53().with(attr::IS_GENERATED, true).is_generated());
    }

    #[test]
    fn key_display() {
        assert_eq!(EntityKey::protein("P04637").to_string(), "protein:P04637");
    }
}
