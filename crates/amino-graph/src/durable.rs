//! Graph store persisted in a local libSQL database.

use std::collections::{BTreeMap, HashMap, HashSet};

use amino_core::{DataKind, EntityKey, EntityKind, GraphEdge, GraphNode, PartialEntity, RelationRecord};
use async_trait::async_trait;
use serde_json::Value;

use crate::error::GraphError;
use crate::neighborhood::Neighborhood;
use crate::relations;
use crate::store::GraphStore;

/// Nodes and edges tables with JSON property columns.
const MIGRATION_001: &str = include_str!("../migrations/001_graph.sql");

const NODE_COLUMNS: &str = "id, node_type, label, properties";
const EDGE_COLUMNS: &str = "id, source, target, edge_type, properties";

pub struct LibsqlGraphStore {
    #[allow(dead_code)]
    db: libsql::Database,
    conn: libsql::Connection,
}

impl LibsqlGraphStore {
    /// Open a local-only database at the given path. `":memory:"` gives a
    /// private in-memory graph.
    ///
    /// Runs migrations automatically on open.
    pub async fn open_local(path: &str) -> Result<Self, GraphError> {
        let db = libsql::Builder::new_local(path).build().await?;
        let conn = db.connect()?;
        conn.execute_batch(MIGRATION_001)
            .await
            .map_err(|e| GraphError::Migration(format!("001_graph: {e}")))?;
        Ok(Self { db, conn })
    }

    async fn node(&self, id: &str) -> Result<Option<GraphNode>, GraphError> {
        let mut rows = self
            .conn
            .query(
                &format!("SELECT {NODE_COLUMNS} FROM graph_nodes WHERE id = ?1"),
                libsql::params![id],
            )
            .await?;
        match rows.next().await? {
            Some(row) => Ok(Some(node_from_row(&row)?)),
            None => Ok(None),
        }
    }

    async fn node_of_kind(
        &self,
        id: &str,
        kind: EntityKind,
    ) -> Result<Option<GraphNode>, GraphError> {
        Ok(self
            .node(id)
            .await?
            .filter(|node| node.node_type == kind.label()))
    }

    async fn edges_touching(&self, id: &str) -> Result<Vec<GraphEdge>, GraphError> {
        let mut rows = self
            .conn
            .query(
                &format!(
                    "SELECT {EDGE_COLUMNS} FROM graph_edges
                     WHERE source = ?1 OR target = ?1
                     ORDER BY rowid"
                ),
                libsql::params![id],
            )
            .await?;
        let mut edges = Vec::new();
        while let Some(row) = rows.next().await? {
            edges.push(edge_from_row(&row)?);
        }
        Ok(edges)
    }

    /// Upsert a node, merging properties inside SQLite so concurrent
    /// writers of the same id cannot drop each other's attributes.
    async fn write_node(&self, node: &GraphNode) -> Result<(), GraphError> {
        self.conn
            .execute(
                "INSERT INTO graph_nodes (id, node_type, label, properties)
                 VALUES (?1, ?2, ?3, json_patch('{}', ?4))
                 ON CONFLICT(id) DO UPDATE SET
                    node_type = excluded.node_type,
                    label = CASE
                        WHEN excluded.label <> excluded.id OR graph_nodes.label = ''
                        THEN excluded.label
                        ELSE graph_nodes.label
                    END,
                    properties = json_patch(graph_nodes.properties, ?4),
                    updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')",
                libsql::params![
                    node.id.as_str(),
                    node.node_type.as_str(),
                    node.label.as_str(),
                    serde_json::to_string(&node.properties)?
                ],
            )
            .await?;
        Ok(())
    }

    async fn ensure_node(&self, node: &GraphNode) -> Result<(), GraphError> {
        self.conn
            .execute(
                "INSERT INTO graph_nodes (id, node_type, label, properties)
                 VALUES (?1, ?2, ?3, json_patch('{}', ?4))
                 ON CONFLICT(id) DO NOTHING",
                libsql::params![
                    node.id.as_str(),
                    node.node_type.as_str(),
                    node.label.as_str(),
                    serde_json::to_string(&node.properties)?
                ],
            )
            .await?;
        Ok(())
    }

    async fn write_edge(&self, edge: &GraphEdge) -> Result<(), GraphError> {
        self.conn
            .execute(
                "INSERT INTO graph_edges (id, source, target, edge_type, properties)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT(id) DO UPDATE SET
                    properties = excluded.properties,
                    updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')",
                libsql::params![
                    edge.id.as_str(),
                    edge.source.as_str(),
                    edge.target.as_str(),
                    edge.edge_type.as_str(),
                    serde_json::to_string(&edge.properties)?
                ],
            )
            .await?;
        Ok(())
    }
}

fn properties(raw: &str) -> Result<BTreeMap<String, Value>, GraphError> {
    match serde_json::from_str::<Value>(raw)? {
        Value::Object(map) => Ok(map.into_iter().collect()),
        Value::Null => Ok(BTreeMap::new()),
        other => Err(GraphError::InvalidState(format!(
            "properties must be a JSON object, got {other}"
        ))),
    }
}

fn node_from_row(row: &libsql::Row) -> Result<GraphNode, GraphError> {
    Ok(GraphNode {
        id: row.get::<String>(0)?,
        node_type: row.get::<String>(1)?,
        label: row.get::<String>(2)?,
        properties: properties(&row.get::<String>(3)?)?,
    })
}

fn edge_from_row(row: &libsql::Row) -> Result<GraphEdge, GraphError> {
    Ok(GraphEdge {
        id: row.get::<String>(0)?,
        source: row.get::<String>(1)?,
        target: row.get::<String>(2)?,
        edge_type: row.get::<String>(3)?,
        properties: properties(&row.get::<String>(4)?)?,
    })
}

#[async_trait]
impl GraphStore for LibsqlGraphStore {
    fn name(&self) -> &'static str {
        "libsql"
    }

    async fn get_neighborhood(
        &self,
        entity_id: &str,
        entity_type: EntityKind,
        max_depth: usize,
    ) -> Result<Neighborhood, GraphError> {
        let Some(center) = self.node_of_kind(entity_id, entity_type).await? else {
            return Ok(Neighborhood::default());
        };

        let mut order = vec![center.id.clone()];
        let mut visited: HashSet<String> = HashSet::from([center.id.clone()]);
        let mut edges_by_id: HashMap<String, GraphEdge> = HashMap::new();
        let mut edge_order = Vec::new();
        let mut frontier = vec![center.id];

        // Layer `max_depth` is queried for edges but not expanded.
        for depth in 0..=max_depth {
            let mut next = Vec::new();
            for id in &frontier {
                for edge in self.edges_touching(id).await? {
                    let other = if edge.source == *id {
                        edge.target.clone()
                    } else {
                        edge.source.clone()
                    };
                    if depth < max_depth && visited.insert(other.clone()) {
                        order.push(other.clone());
                        next.push(other);
                    }
                    if !edges_by_id.contains_key(&edge.id) {
                        edge_order.push(edge.id.clone());
                        edges_by_id.insert(edge.id.clone(), edge);
                    }
                }
            }
            if next.is_empty() {
                break;
            }
            frontier = next;
        }

        let mut nodes = Vec::with_capacity(order.len());
        for id in &order {
            match self.node(id).await? {
                Some(node) => nodes.push(node),
                None => tracing::debug!(node = %id, "edge references a missing node"),
            }
        }
        let edges = edge_order
            .into_iter()
            .filter_map(|id| edges_by_id.remove(&id))
            .collect();

        Ok(Neighborhood::new(nodes, edges).sanitized())
    }

    async fn get_entity(&self, key: &EntityKey) -> Result<Option<PartialEntity>, GraphError> {
        Ok(self
            .node_of_kind(&key.id, key.kind)
            .await?
            .map(|node| PartialEntity {
                key: key.clone(),
                attributes: node.properties,
            }))
    }

    async fn get_relations(
        &self,
        key: &EntityKey,
        kind: DataKind,
    ) -> Result<Vec<RelationRecord>, GraphError> {
        let edge_type = relations::edge_type_of(kind)?;
        if self.node_of_kind(&key.id, key.kind).await?.is_none() {
            return Ok(Vec::new());
        }

        let mut records = Vec::new();
        for edge in self.edges_touching(&key.id).await? {
            if edge.edge_type != edge_type {
                continue;
            }
            let other_id = if edge.source == key.id {
                &edge.target
            } else {
                &edge.source
            };
            let Some(other) = self.node(other_id).await? else {
                continue;
            };
            if let Some(record) = relations::from_edge(&key.id, kind, &edge, &other) {
                records.push(record);
            }
        }
        Ok(records)
    }

    async fn upsert_entity(&self, entity: &PartialEntity) -> Result<(), GraphError> {
        self.write_node(&GraphNode::from_entity(entity)).await
    }

    async fn upsert_relations(
        &self,
        key: &EntityKey,
        kind: DataKind,
        records: &[RelationRecord],
    ) -> Result<(), GraphError> {
        self.ensure_node(&GraphNode::new(key.id.clone(), key.kind, key.id.clone()))
            .await?;
        for record in records.iter().filter(|record| record.id != key.id) {
            let stored = relations::to_edge(key, kind, record)?;
            self.ensure_node(&stored.endpoint).await?;
            self.write_edge(&stored.edge).await?;
        }
        Ok(())
    }

    async fn load(
        &self,
        nodes: &[GraphNode],
        edges: &[GraphEdge],
    ) -> Result<(usize, usize), GraphError> {
        for node in nodes {
            self.write_node(node).await?;
        }
        let mut written = 0;
        for edge in edges {
            if edge.is_self_loop()
                || self.node(&edge.source).await?.is_none()
                || self.node(&edge.target).await?.is_none()
            {
                tracing::debug!(edge = %edge.id, "skipping edge with unknown endpoint");
                continue;
            }
            self.write_edge(edge).await?;
            written += 1;
        }
        Ok((nodes.len(), written))
    }
}
