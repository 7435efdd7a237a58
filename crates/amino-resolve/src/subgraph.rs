//! Visualization-ready subgraphs centered on one entity.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use amino_core::graph::{CENTRALITY, GENERIC_EDGE_TYPE, INFERRED};
use amino_core::{EntityKind, GraphEdge, GraphNode, GraphView};
use amino_graph::{GraphStore, Neighborhood};

use crate::synth::FallbackSynthesizer;

/// Builds bounded-depth graphs from the store, falling back to a demo graph
/// when the real one is too thin to show.
#[derive(Clone)]
pub struct SubgraphBuilder {
    store: Arc<dyn GraphStore>,
    edge_backfill: bool,
    query_timeout: Duration,
}

impl SubgraphBuilder {
    #[must_use]
    pub fn new(store: Arc<dyn GraphStore>, edge_backfill: bool, query_timeout: Duration) -> Self {
        Self {
            store,
            edge_backfill,
            query_timeout,
        }
    }

    async fn neighborhood(&self, entity_id: &str, entity_type: EntityKind, depth: usize) -> Neighborhood {
        let query = self.store.get_neighborhood(entity_id, entity_type, depth);
        match tokio::time::timeout(self.query_timeout, query).await {
            Ok(Ok(hood)) => hood,
            Ok(Err(error)) => {
                tracing::warn!(store = self.store.name(), entity_id, %error, "neighborhood query failed");
                Neighborhood::default()
            }
            Err(_) => {
                tracing::warn!(store = self.store.name(), entity_id, "neighborhood query timed out");
                Neighborhood::default()
            }
        }
    }

    /// Graph around `entity_id` up to `depth` hops.
    ///
    /// The result always contains the center with `centrality = 1`, never
    /// holds an edge whose endpoints are missing, and is either sufficient
    /// (two or more nodes, at least one edge) or a demo graph.
    pub async fn build(&self, entity_id: &str, entity_type: EntityKind, depth: usize) -> GraphView {
        let hood = self.neighborhood(entity_id, entity_type, depth).await;
        let view = assemble(entity_id, entity_type, hood, self.edge_backfill);
        if view.is_sufficient() {
            return view;
        }
        tracing::debug!(
            entity_id,
            nodes = view.nodes.len(),
            edges = view.edges.len(),
            "graph insufficient, using demo graph"
        );
        let center = view
            .nodes
            .into_iter()
            .find(|node| node.id == entity_id)
            .unwrap_or_else(|| GraphNode::new(entity_id, entity_type, entity_id));
        FallbackSynthesizer::demo_graph(&center)
    }
}

/// Deduplicate, mark the center, drop orphan edges, and optionally backfill
/// connectivity.
fn assemble(entity_id: &str, entity_type: EntityKind, hood: Neighborhood, backfill: bool) -> GraphView {
    let mut seen = HashSet::new();
    let mut nodes: Vec<GraphNode> = hood
        .nodes
        .into_iter()
        .filter(|node| !node.id.is_empty() && seen.insert(node.id.clone()))
        .collect();

    match nodes.iter().position(|node| node.id == entity_id) {
        Some(0) => {}
        Some(pos) => {
            let center = nodes.remove(pos);
            nodes.insert(0, center);
        }
        None => {
            seen.insert(entity_id.to_string());
            nodes.insert(0, GraphNode::new(entity_id, entity_type, entity_id));
        }
    }
    nodes[0].properties.insert(CENTRALITY.to_string(), 1.into());

    let mut edge_ids = HashSet::new();
    let mut edges: Vec<GraphEdge> = hood
        .edges
        .into_iter()
        .filter(|edge| {
            !edge.is_self_loop()
                && seen.contains(&edge.source)
                && seen.contains(&edge.target)
                && edge_ids.insert(edge.id.clone())
        })
        .collect();

    if backfill {
        let touched: HashSet<String> = edges
            .iter()
            .flat_map(|edge| [edge.source.clone(), edge.target.clone()])
            .collect();
        let orphans: Vec<GraphEdge> = nodes[1..]
            .iter()
            .filter(|node| !touched.contains(&node.id))
            .map(|node| GraphEdge::new(entity_id, GENERIC_EDGE_TYPE, node.id.as_str()).with(INFERRED, true))
            .collect();
        if !orphans.is_empty() {
            tracing::debug!(entity_id, count = orphans.len(), "backfilled generic edges");
            edges.extend(orphans);
        }
    }

    GraphView {
        nodes,
        edges,
        is_demo: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use amino_graph::MemoryGraphStore;
    use pretty_assertions::assert_eq;

    fn protein(id: &str) -> GraphNode {
        GraphNode::new(id, EntityKind::Protein, id)
    }

    #[test]
    fn center_moves_first_and_duplicates_go() {
        let hood = Neighborhood::new(
            vec![protein("B"), protein("A"), protein("B")],
            vec![
                GraphEdge::new("A", "INTERACTS_WITH", "B"),
                GraphEdge::new("A", "INTERACTS_WITH", "B"),
                GraphEdge::new("A", "INTERACTS_WITH", "ghost"),
            ],
        );
        let view = assemble("A", EntityKind::Protein, hood, true);

        assert_eq!(view.nodes.len(), 2);
        assert_eq!(view.nodes[0].id, "A");
        assert_eq!(view.nodes[0].properties[CENTRALITY], 1);
        assert_eq!(view.edges.len(), 1);
        assert!(view.edges_are_closed());
    }

    #[test]
    fn orphans_get_generic_inferred_edges() {
        let hood = Neighborhood::new(
            vec![protein("A"), protein("B"), protein("C")],
            vec![GraphEdge::new("A", "INTERACTS_WITH", "B")],
        );
        let view = assemble("A", EntityKind::Protein, hood, true);

        assert_eq!(view.edges.len(), 2);
        let inferred = &view.edges[1];
        assert_eq!(inferred.edge_type, GENERIC_EDGE_TYPE);
        assert_eq!((inferred.source.as_str(), inferred.target.as_str()), ("A", "C"));
        assert_eq!(inferred.properties[INFERRED], true);
        assert!(!view.edges[0].properties.contains_key(INFERRED));
    }

    #[test]
    fn backfill_can_be_disabled() {
        let hood = Neighborhood::new(vec![protein("A"), protein("B")], vec![]);
        let view = assemble("A", EntityKind::Protein, hood, false);
        assert!(view.edges.is_empty());
        assert!(!view.is_sufficient());
    }

    #[test]
    fn missing_center_is_injected() {
        let view = assemble("Z", EntityKind::Disease, Neighborhood::default(), true);
        assert_eq!(view.nodes.len(), 1);
        assert_eq!(view.nodes[0].node_type, "Disease");
        assert_eq!(view.nodes[0].properties[CENTRALITY], 1);
    }

    #[tokio::test]
    async fn lone_node_becomes_demo_graph() {
        let store = Arc::new(MemoryGraphStore::new());
        store
            .load(&[protein("A").with("name", "Alpha")], &[])
            .await
            .unwrap();
        let builder = SubgraphBuilder::new(store, true, Duration::from_secs(1));

        let view = builder.build("A", EntityKind::Protein, 2).await;
        assert!(view.is_demo);
        assert!(view.is_sufficient());
        assert!(view.edges_are_closed());
        assert_eq!(view.nodes[0].id, "A");
        assert_eq!(view.nodes[0].properties["name"], "Alpha");
    }

    #[tokio::test]
    async fn real_graph_is_not_demo() {
        let store = Arc::new(MemoryGraphStore::new());
        store
            .load(
                &[protein("A"), protein("B"), protein("C")],
                &[
                    GraphEdge::new("A", "INTERACTS_WITH", "B"),
                    GraphEdge::new("B", "INTERACTS_WITH", "C"),
                ],
            )
            .await
            .unwrap();
        let builder = SubgraphBuilder::new(store, true, Duration::from_secs(1));

        let one = builder.build("A", EntityKind::Protein, 1).await;
        assert!(!one.is_demo);
        assert_eq!(one.nodes.len(), 2);

        let two = builder.build("A", EntityKind::Protein, 2).await;
        assert_eq!(two.nodes.len(), 3);
        assert_eq!(two.edges.len(), 2);
    }
}
