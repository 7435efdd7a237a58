//! `Resolver::get_entity_graph`: real graphs, demo fallback, caching.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use amino_cache::{KeyValueCache, MemoryBackend};
use amino_core::graph::{CENTRALITY, IS_DEMO};
use amino_core::keys::graph_key;
use amino_core::{DataKind, EntityKey, EntityKind, GraphEdge, GraphNode, GraphView, RelationRecord};
use amino_graph::{GraphStore, MemoryGraphStore};
use amino_resolve::{Resolver, ResolverPolicy};
use pretty_assertions::assert_eq;

fn resolver() -> (Resolver, Arc<MemoryBackend>, Arc<MemoryGraphStore>) {
    let backend = Arc::new(MemoryBackend::new());
    let store = Arc::new(MemoryGraphStore::new());
    let cache = KeyValueCache::new(backend.clone(), Duration::from_secs(1));
    let resolver = Resolver::builder(cache, store.clone()).build();
    (resolver, backend, store)
}

fn node(id: &str, kind: EntityKind) -> GraphNode {
    GraphNode::new(id, kind, id)
}

async fn seed_p53(store: &MemoryGraphStore) {
    store
        .load(
            &[
                node("P04637", EntityKind::Protein).with("name", "p53"),
                node("Q00987", EntityKind::Protein),
                node("DOID:1612", EntityKind::Disease),
                node("DB00945", EntityKind::Drug),
            ],
            &[
                GraphEdge::new("P04637", "INTERACTS_WITH", "Q00987"),
                GraphEdge::new("P04637", "ASSOCIATED_WITH", "DOID:1612"),
                GraphEdge::new("DB00945", "TARGETS", "Q00987"),
                GraphEdge::new("P04637", "INTERACTS_WITH", "P04637"),
            ],
        )
        .await
        .unwrap();
}

/// Invariants every returned graph must satisfy.
fn assert_well_formed(view: &GraphView, center: &str) {
    assert!(view.is_sufficient(), "graph too thin: {view:?}");
    assert!(view.edges_are_closed(), "dangling edge: {view:?}");
    assert_eq!(view.nodes[0].id, center);
    assert_eq!(view.nodes[0].properties[CENTRALITY], 1);

    let ids: HashSet<&str> = view.nodes.iter().map(|n| n.id.as_str()).collect();
    assert_eq!(ids.len(), view.nodes.len(), "duplicate node ids");
    assert!(view.edges.iter().all(|e| !e.is_self_loop()));
}

#[tokio::test]
async fn real_graph_respects_depth() {
    let (resolver, _, store) = resolver();
    seed_p53(&store).await;

    let one = resolver
        .get_entity_graph("P04637", EntityKind::Protein, Some(1))
        .await;
    assert_well_formed(&one, "P04637");
    assert!(!one.is_demo);
    assert_eq!(one.nodes.len(), 3);
    assert!(one.node("DB00945").is_none());

    let two = resolver
        .get_entity_graph("P04637", EntityKind::Protein, None)
        .await;
    assert_well_formed(&two, "P04637");
    assert_eq!(two.nodes.len(), 4);
    assert!(two.node("DB00945").is_some());
}

#[tokio::test]
async fn lone_entity_gets_a_demo_graph() {
    let (resolver, backend, store) = resolver();
    store
        .load(&[node("P04637", EntityKind::Protein).with("name", "p53")], &[])
        .await
        .unwrap();

    let view = resolver
        .get_entity_graph("P04637", EntityKind::Protein, None)
        .await;
    assert_well_formed(&view, "P04637");
    assert!(view.is_demo);
    assert!(view.nodes.iter().all(|n| n.properties[IS_DEMO] == true));
    assert_eq!(view.nodes[0].properties["name"], "p53");

    let ttl = backend
        .ttl_of(&graph_key(EntityKind::Protein, "P04637", 2))
        .await
        .unwrap();
    assert!(ttl <= ResolverPolicy::default().ttl.negative);
}

#[tokio::test]
async fn unknown_entity_gets_a_demo_graph() {
    let (resolver, _, _) = resolver();
    let view = resolver
        .get_entity_graph("DB99999", EntityKind::Drug, Some(3))
        .await;
    assert_well_formed(&view, "DB99999");
    assert!(view.is_demo);
    assert_eq!(view.nodes[0].node_type, "Drug");
}

#[tokio::test]
async fn real_graphs_are_cached_for_the_graph_ttl() {
    let (resolver, backend, store) = resolver();
    seed_p53(&store).await;
    let policy = ResolverPolicy::default();

    let first = resolver
        .get_entity_graph("P04637", EntityKind::Protein, None)
        .await;
    let key = graph_key(EntityKind::Protein, "P04637", policy.graph_depth);
    let ttl = backend.ttl_of(&key).await.unwrap();
    assert!(ttl > policy.ttl.negative && ttl <= policy.ttl.graph);

    // Later store writes are not visible until invalidation.
    store
        .load(&[node("O15350", EntityKind::Protein)], &[GraphEdge::new("P04637", "INTERACTS_WITH", "O15350")])
        .await
        .unwrap();
    let cached = resolver
        .get_entity_graph("P04637", EntityKind::Protein, None)
        .await;
    assert_eq!(cached, first);

    assert!(resolver.invalidate("P04637").await >= 1);
    let fresh = resolver
        .get_entity_graph("P04637", EntityKind::Protein, None)
        .await;
    assert!(fresh.node("O15350").is_some());
}

#[tokio::test]
async fn recorded_relation_makes_a_real_graph() {
    let (resolver, _, _) = resolver();
    let key = EntityKey::protein("P04637");

    let before = resolver
        .get_entity_graph("P04637", EntityKind::Protein, Some(1))
        .await;
    assert!(before.is_demo);

    resolver
        .record_relation(&key, DataKind::Interactions, RelationRecord::new("Q00987").named("MDM2"))
        .await
        .unwrap();

    let after = resolver
        .get_entity_graph("P04637", EntityKind::Protein, Some(1))
        .await;
    assert_well_formed(&after, "P04637");
    assert!(!after.is_demo);
    assert!(after.node("Q00987").is_some());
}

#[tokio::test]
async fn concurrent_graph_requests_agree() {
    let (resolver, _, store) = resolver();
    seed_p53(&store).await;

    let (a, b, c) = tokio::join!(
        resolver.get_entity_graph("P04637", EntityKind::Protein, None),
        resolver.get_entity_graph("P04637", EntityKind::Protein, None),
        resolver.get_entity_graph("P04637", EntityKind::Protein, None),
    );
    assert_eq!(a, b);
    assert_eq!(b, c);
    assert_eq!(resolver.in_flight(), 0);
}
