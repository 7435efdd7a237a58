use std::collections::HashSet;

use amino_core::{GraphEdge, GraphNode};

/// Nodes and edges around an entity, as returned by a [`crate::GraphStore`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Neighborhood {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

impl Neighborhood {
    #[must_use]
    pub const fn new(nodes: Vec<GraphNode>, edges: Vec<GraphEdge>) -> Self {
        Self { nodes, edges }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Make the result structurally valid.
    ///
    /// Drops nodes without an id, repeated node and edge ids (first wins),
    /// self-loops, and edges whose endpoints are not in the node list.
    #[must_use]
    pub fn sanitized(self) -> Self {
        let mut seen_nodes = HashSet::new();
        let nodes: Vec<GraphNode> = self
            .nodes
            .into_iter()
            .filter(|node| !node.id.is_empty() && seen_nodes.insert(node.id.clone()))
            .collect();

        let mut seen_edges = HashSet::new();
        let before = self.edges.len();
        let edges: Vec<GraphEdge> = self
            .edges
            .into_iter()
            .filter(|edge| {
                !edge.is_self_loop()
                    && seen_nodes.contains(&edge.source)
                    && seen_nodes.contains(&edge.target)
                    && seen_edges.insert(edge.id.clone())
            })
            .collect();

        let dropped = before - edges.len();
        if dropped > 0 {
            tracing::debug!(dropped, "dropped invalid or repeated edges");
        }
        Self { nodes, edges }
    }
}
