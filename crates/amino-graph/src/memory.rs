//! In-process graph store on a petgraph `DiGraph`.

use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};

use amino_core::{DataKind, EntityKey, EntityKind, GraphEdge, GraphNode, PartialEntity, RelationRecord};
use async_trait::async_trait;
use rustworkx_core::petgraph::Direction;
use rustworkx_core::petgraph::graph::{DiGraph, EdgeIndex, NodeIndex};
use rustworkx_core::petgraph::visit::EdgeRef;
use tokio::sync::RwLock;

use crate::error::GraphError;
use crate::neighborhood::Neighborhood;
use crate::relations;
use crate::store::{GraphStore, merge_properties};

#[derive(Default)]
struct Inner {
    graph: DiGraph<GraphNode, GraphEdge>,
    id_to_index: HashMap<String, NodeIndex>,
    edge_index: HashMap<String, EdgeIndex>,
}

impl Inner {
    fn lookup(&self, id: &str, kind: EntityKind) -> Option<NodeIndex> {
        let idx = *self.id_to_index.get(id)?;
        (self.graph[idx].node_type == kind.label()).then_some(idx)
    }

    /// Insert `node`, or merge it into the existing node with the same id.
    fn upsert_node(&mut self, mut node: GraphNode) -> NodeIndex {
        if let Some(&idx) = self.id_to_index.get(&node.id) {
            let existing = &mut self.graph[idx];
            existing.node_type = node.node_type;
            // An id-only label never replaces a real one.
            if node.label != node.id || existing.label.is_empty() {
                existing.label = node.label;
            }
            merge_properties(&mut existing.properties, &node.properties);
            return idx;
        }
        let mut properties = BTreeMap::new();
        merge_properties(&mut properties, &node.properties);
        node.properties = properties;
        let id = node.id.clone();
        let idx = self.graph.add_node(node);
        self.id_to_index.insert(id, idx);
        idx
    }

    /// Insert `node` only if no node with that id exists yet.
    fn ensure_node(&mut self, node: GraphNode) -> NodeIndex {
        if let Some(&idx) = self.id_to_index.get(&node.id) {
            return idx;
        }
        self.upsert_node(node)
    }

    /// Insert or replace an edge. Returns `None` when an endpoint is unknown.
    fn upsert_edge(&mut self, edge: GraphEdge) -> Option<EdgeIndex> {
        if let Some(&idx) = self.edge_index.get(&edge.id) {
            self.graph[idx] = edge;
            return Some(idx);
        }
        let source = *self.id_to_index.get(&edge.source)?;
        let target = *self.id_to_index.get(&edge.target)?;
        let id = edge.id.clone();
        let idx = self.graph.add_edge(source, target, edge);
        self.edge_index.insert(id, idx);
        Some(idx)
    }

    fn neighborhood(&self, start: NodeIndex, max_depth: usize) -> Neighborhood {
        let mut visited = HashSet::from([start]);
        let mut order = vec![start];
        let mut queue = VecDeque::from([(start, 0usize)]);

        while let Some((idx, depth)) = queue.pop_front() {
            if depth == max_depth {
                continue;
            }
            for next in self.graph.neighbors_undirected(idx) {
                if visited.insert(next) {
                    order.push(next);
                    queue.push_back((next, depth + 1));
                }
            }
        }

        let nodes = order.iter().map(|idx| self.graph[*idx].clone()).collect();
        let edges = self
            .graph
            .edge_references()
            .filter(|edge| visited.contains(&edge.source()) && visited.contains(&edge.target()))
            .map(|edge| edge.weight().clone())
            .collect();
        Neighborhood::new(nodes, edges)
    }
}

/// Graph store held entirely in memory. Suitable for tests, demos, and a
/// single-process deployment seeded at startup.
#[derive(Default)]
pub struct MemoryGraphStore {
    inner: RwLock<Inner>,
}

impl MemoryGraphStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn node_count(&self) -> usize {
        self.inner.read().await.graph.node_count()
    }

    pub async fn edge_count(&self) -> usize {
        self.inner.read().await.graph.edge_count()
    }
}

#[async_trait]
impl GraphStore for MemoryGraphStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn get_neighborhood(
        &self,
        entity_id: &str,
        entity_type: EntityKind,
        max_depth: usize,
    ) -> Result<Neighborhood, GraphError> {
        let inner = self.inner.read().await;
        let Some(start) = inner.lookup(entity_id, entity_type) else {
            return Ok(Neighborhood::default());
        };
        Ok(inner.neighborhood(start, max_depth).sanitized())
    }

    async fn get_entity(&self, key: &EntityKey) -> Result<Option<PartialEntity>, GraphError> {
        let inner = self.inner.read().await;
        Ok(inner.lookup(&key.id, key.kind).map(|idx| PartialEntity {
            key: key.clone(),
            attributes: inner.graph[idx].properties.clone(),
        }))
    }

    async fn get_relations(
        &self,
        key: &EntityKey,
        kind: DataKind,
    ) -> Result<Vec<RelationRecord>, GraphError> {
        relations::edge_type_of(kind)?;
        let inner = self.inner.read().await;
        let Some(idx) = inner.lookup(&key.id, key.kind) else {
            return Ok(Vec::new());
        };

        let mut records = Vec::new();
        for direction in [Direction::Outgoing, Direction::Incoming] {
            for edge in inner.graph.edges_directed(idx, direction) {
                let other = if edge.source() == idx {
                    edge.target()
                } else {
                    edge.source()
                };
                if let Some(record) =
                    relations::from_edge(&key.id, kind, edge.weight(), &inner.graph[other])
                {
                    records.push(record);
                }
            }
        }
        Ok(records)
    }

    async fn upsert_entity(&self, entity: &PartialEntity) -> Result<(), GraphError> {
        self.inner
            .write()
            .await
            .upsert_node(GraphNode::from_entity(entity));
        Ok(())
    }

    async fn upsert_relations(
        &self,
        key: &EntityKey,
        kind: DataKind,
        records: &[RelationRecord],
    ) -> Result<(), GraphError> {
        let mut inner = self.inner.write().await;
        inner.ensure_node(GraphNode::new(key.id.clone(), key.kind, key.id.clone()));
        for record in records.iter().filter(|record| record.id != key.id) {
            let stored = relations::to_edge(key, kind, record)?;
            inner.ensure_node(stored.endpoint);
            inner.upsert_edge(stored.edge);
        }
        Ok(())
    }

    async fn load(
        &self,
        nodes: &[GraphNode],
        edges: &[GraphEdge],
    ) -> Result<(usize, usize), GraphError> {
        let mut inner = self.inner.write().await;
        for node in nodes {
            inner.upsert_node(node.clone());
        }
        let mut written = 0;
        for edge in edges {
            if edge.is_self_loop() {
                continue;
            }
            if inner.upsert_edge(edge.clone()).is_some() {
                written += 1;
            } else {
                tracing::debug!(edge = %edge.id, "skipping edge with unknown endpoint");
            }
        }
        Ok((nodes.len(), written))
    }
}
