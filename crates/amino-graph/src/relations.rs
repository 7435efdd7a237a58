//! Mapping between relation records and graph edges.
//!
//! | Data kind      | Edge type         | Direction            |
//! |----------------|-------------------|----------------------|
//! | `interactions` | `INTERACTS_WITH`  | either               |
//! | `diseases`     | `ASSOCIATED_WITH` | subject -> disease   |
//! | `drugs`        | `TARGETS`         | drug -> subject      |
//! | `variants`     | `VARIANT_OF`      | variant -> subject   |

use std::collections::BTreeMap;

use amino_core::{DataKind, EntityKey, EntityKind, GraphEdge, GraphNode, RelationRecord};
use serde_json::Value;

use crate::error::GraphError;

const SCORE: &str = "score";
const SOURCE: &str = "source";

/// A relation expressed as the far endpoint node plus the connecting edge.
#[derive(Debug, Clone)]
pub struct RelationEdge {
    pub endpoint: GraphNode,
    pub edge: GraphEdge,
}

pub(crate) fn edge_type_of(kind: DataKind) -> Result<&'static str, GraphError> {
    kind.edge_type().ok_or(GraphError::NotARelation(kind))
}

/// Build the endpoint node and edge that store `record` for `subject`.
///
/// The endpoint node carries only a label, so it never passes for a fully
/// described entity.
pub fn to_edge(
    subject: &EntityKey,
    kind: DataKind,
    record: &RelationRecord,
) -> Result<RelationEdge, GraphError> {
    let edge_type = edge_type_of(kind)?;
    let endpoint_kind = kind.related_kind().unwrap_or(EntityKind::Protein);
    let endpoint = GraphNode::new(
        record.id.clone(),
        endpoint_kind,
        record.name.clone().unwrap_or_else(|| record.id.clone()),
    );

    let (source, target) = if kind.edge_points_inward() {
        (record.id.as_str(), subject.id.as_str())
    } else {
        (subject.id.as_str(), record.id.as_str())
    };

    let mut edge = GraphEdge::new(source, edge_type, target);
    edge.properties = record.attributes.clone();
    if let Some(score) = record.score {
        edge.properties.insert(SCORE.to_string(), score.into());
    }
    if let Some(source) = &record.source {
        edge.properties.insert(SOURCE.to_string(), source.clone().into());
    }

    Ok(RelationEdge { endpoint, edge })
}

/// Read a relation record back from a stored edge.
///
/// Returns `None` when the edge does not connect `subject_id` in the
/// direction `kind` requires, or the endpoint is the wrong kind of entity.
pub fn from_edge(
    subject_id: &str,
    kind: DataKind,
    edge: &GraphEdge,
    endpoint: &GraphNode,
) -> Option<RelationRecord> {
    if kind.edge_type() != Some(edge.edge_type.as_str()) || endpoint.kind() != kind.related_kind()
    {
        return None;
    }
    let other = match kind {
        DataKind::Interactions if edge.source == subject_id => &edge.target,
        DataKind::Interactions if edge.target == subject_id => &edge.source,
        _ if kind.edge_points_inward() && edge.target == subject_id => &edge.source,
        _ if !kind.edge_points_inward() && edge.source == subject_id => &edge.target,
        _ => return None,
    };
    if *other != endpoint.id {
        return None;
    }

    let mut attributes: BTreeMap<String, Value> = edge.properties.clone();
    let score = attributes.remove(SCORE).and_then(|v| v.as_f64());
    let source = attributes
        .remove(SOURCE)
        .and_then(|v| v.as_str().map(str::to_string));

    Some(RelationRecord {
        id: endpoint.id.clone(),
        name: Some(endpoint.label.clone()).filter(|label| !label.is_empty()),
        score,
        source,
        attributes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn drug_edges_point_at_the_protein() {
        let subject = EntityKey::protein("P04637");
        let record = RelationRecord::new("DB01234").named("Nutlin").scored(0.5);
        let stored = to_edge(&subject, DataKind::Drugs, &record).unwrap();

        assert_eq!(stored.edge.source, "DB01234");
        assert_eq!(stored.edge.target, "P04637");
        assert_eq!(stored.edge.edge_type, "TARGETS");
        assert_eq!(stored.endpoint.node_type, "Drug");
        assert!(stored.endpoint.properties.is_empty());

        let back = from_edge("P04637", DataKind::Drugs, &stored.edge, &stored.endpoint).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn interactions_read_from_either_side() {
        let subject = EntityKey::protein("A");
        let record = RelationRecord::new("B").from_source("string");
        let stored = to_edge(&subject, DataKind::Interactions, &record).unwrap();
        let a_node = GraphNode::new("A", EntityKind::Protein, "A");

        let from_a = from_edge("A", DataKind::Interactions, &stored.edge, &stored.endpoint).unwrap();
        assert_eq!(from_a.id, "B");
        let from_b = from_edge("B", DataKind::Interactions, &stored.edge, &a_node).unwrap();
        assert_eq!(from_b.id, "A");
    }

    #[test]
    fn wrong_direction_is_ignored() {
        let subject = EntityKey::protein("P1");
        let stored = to_edge(&subject, DataKind::Diseases, &RelationRecord::new("D1")).unwrap();
        let p1 = GraphNode::new("P1", EntityKind::Protein, "P1");

        // Seen from the disease, ASSOCIATED_WITH does not list P1 as a disease.
        assert!(from_edge("D1", DataKind::Diseases, &stored.edge, &p1).is_none());
        // A TARGETS query ignores ASSOCIATED_WITH edges.
        assert!(from_edge("P1", DataKind::Drugs, &stored.edge, &stored.endpoint).is_none());
    }

    #[test]
    fn info_is_not_a_relation() {
        let err = to_edge(&EntityKey::protein("P1"), DataKind::Info, &RelationRecord::new("x"));
        assert!(matches!(err, Err(GraphError::NotARelation(DataKind::Info))));
    }
}
