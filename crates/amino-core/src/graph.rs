//! Graph nodes, edges, and visualization-ready views.

use std::collections::{BTreeMap, HashSet};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::entity::PartialEntity;
use crate::enums::EntityKind;

/// Edge type used when connectivity is inferred rather than stored.
pub const GENERIC_EDGE_TYPE: &str = "RELATED_TO";

/// Property set on the node a view is centered on.
pub const CENTRALITY: &str = "centrality";

/// Property marking placeholder nodes and edges.
pub const IS_DEMO: &str = "is_demo";

/// Property marking edges added by connectivity backfill.
pub const INFERRED: &str = "inferred";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct GraphNode {
    pub id: String,
    #[serde(rename = "type")]
    pub node_type: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, Value>,
}

impl GraphNode {
    #[must_use]
    pub fn new(id: impl Into<String>, kind: EntityKind, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            node_type: kind.label().to_string(),
            label: label.into(),
            properties: BTreeMap::new(),
        }
    }

    /// Node for an entity record; attributes become properties.
    #[must_use]
    pub fn from_entity(entity: &PartialEntity) -> Self {
        Self {
            id: entity.key.id.clone(),
            node_type: entity.key.kind.label().to_string(),
            label: entity.display_name().to_string(),
            properties: entity.attributes.clone(),
        }
    }

    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }

    /// Entity kind parsed from the node type label, if it is a known one.
    #[must_use]
    pub fn kind(&self) -> Option<EntityKind> {
        self.node_type.parse().ok()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct GraphEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(rename = "type")]
    pub edge_type: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, Value>,
}

impl GraphEdge {
    /// Edge with the deterministic id `{source}-{type}-{target}`.
    #[must_use]
    pub fn new(
        source: impl Into<String>,
        edge_type: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        let source = source.into();
        let target = target.into();
        let edge_type = edge_type.into();
        Self {
            id: format!("{source}-{edge_type}-{target}"),
            source,
            target,
            edge_type,
            properties: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub fn is_self_loop(&self) -> bool {
        self.source == self.target
    }
}

/// A graph centered on one entity, ready to render.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct GraphView {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
    /// True when the graph is synthesized placeholder data.
    #[serde(default)]
    pub is_demo: bool,
}

impl GraphView {
    /// At least two nodes joined by at least one edge.
    #[must_use]
    pub fn is_sufficient(&self) -> bool {
        self.nodes.len() > 1 && !self.edges.is_empty()
    }

    #[must_use]
    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.iter().find(|node| node.id == id)
    }

    /// Every edge references nodes present in this view.
    #[must_use]
    pub fn edges_are_closed(&self) -> bool {
        let ids: HashSet<&str> = self.nodes.iter().map(|node| node.id.as_str()).collect();
        self.edges
            .iter()
            .all(|edge| ids.contains(edge.source.as_str()) && ids.contains(edge.target.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{EntityKey, attr};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn node_serializes_type_field() {
        let node = GraphNode::new("P04637", EntityKind::Protein, "TP53").with(CENTRALITY, 1);
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(
            json,
            json!({"id": "P04637", "type": "Protein", "label": "TP53", "properties": {"centrality": 1}})
        );
        assert_eq!(node.kind(), Some(EntityKind::Protein));
    }

    #[test]
    fn node_from_entity_uses_display_name() {
        let entity = PartialEntity::new(EntityKey::protein("P04637")).with(attr::NAME, "TP53");
        let node = GraphNode::from_entity(&entity);
        assert_eq!(node.label, "TP53");
        assert_eq!(node.node_type, "Protein");
        assert_eq!(node.properties.get(attr::NAME), Some(&json!("TP53")));
    }

    #[test]
    fn edge_id_is_deterministic() {
        let edge = GraphEdge::new("DB1", "TARGETS", "P1");
        assert_eq!(edge.id, "DB1-TARGETS-P1");
        assert!(!edge.is_self_loop());
        assert!(GraphEdge::new("P1", "INTERACTS_WITH", "P1").is_self_loop());
    }

    #[test]
    fn sufficiency_and_closure() {
        let mut view = GraphView {
            nodes: vec![GraphNode::new("P1", EntityKind::Protein, "P1")],
            ..GraphView::default()
        };
        assert!(!view.is_sufficient());

        view.nodes.push(GraphNode::new("D1", EntityKind::Disease, "D1"));
        assert!(!view.is_sufficient());

        view.edges.push(GraphEdge::new("P1", "ASSOCIATED_WITH", "D1"));
        assert!(view.is_sufficient());
        assert!(view.edges_are_closed());

        view.edges.push(GraphEdge::new("P1", "TARGETS", "missing"));
        assert!(!view.edges_are_closed());
    }
}
