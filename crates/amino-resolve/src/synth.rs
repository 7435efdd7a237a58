//! Fallback synthesis for entities, relation lists, and graphs.
//!
//! Everything produced here is placeholder data and carries a marker:
//! entities and relation records get `is_generated = true`, graph nodes and
//! edges get `is_demo = true`, and demo graphs set [`GraphView::is_demo`].

use std::sync::Arc;

use amino_core::entity::attr;
use amino_core::graph::{CENTRALITY, IS_DEMO};
use amino_core::{DataKind, EntityKey, EntityKind, GraphEdge, GraphNode, GraphView, PartialEntity, RelationRecord};
use amino_llm::{TextGenerator, extract_json};
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::Value;

/// Source tag on generated relation records.
pub const GENERATED_SOURCE: &str = "generated";

/// Shape requested from the generator for entity attributes.
#[derive(Debug, Deserialize, JsonSchema)]
struct GeneratedEntity {
    /// Short display name or symbol.
    name: Option<String>,
    full_name: Option<String>,
    /// One or two sentences on biological function.
    function: Option<String>,
    description: Option<String>,
}

/// Shape requested from the generator for one relation.
#[derive(Debug, Deserialize, JsonSchema)]
struct GeneratedRelation {
    /// Identifier of the related entity.
    id: Option<String>,
    name: Option<String>,
    /// Confidence between 0 and 1.
    score: Option<f64>,
}

fn schema_text<T: JsonSchema>() -> String {
    serde_json::to_string_pretty(&schemars::schema_for!(T)).unwrap_or_default()
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

/// A placeholder neighbor in a demo graph.
struct Template {
    slot: &'static str,
    kind: EntityKind,
    label: &'static str,
    edge_type: &'static str,
    /// Edge runs from the neighbor to the center.
    inward: bool,
}

const fn template(
    slot: &'static str,
    kind: EntityKind,
    label: &'static str,
    edge_type: &'static str,
    inward: bool,
) -> Template {
    Template {
        slot,
        kind,
        label,
        edge_type,
        inward,
    }
}

/// Placeholder neighbors and cross-links (slot, edge type, slot) per center type.
fn templates(kind: EntityKind) -> (Vec<Template>, Vec<(&'static str, &'static str, &'static str)>) {
    match kind {
        EntityKind::Protein => (
            vec![
                template("protein", EntityKind::Protein, "Related protein", "INTERACTS_WITH", false),
                template("disease", EntityKind::Disease, "Associated disease", "ASSOCIATED_WITH", false),
                template("drug", EntityKind::Drug, "Targeting drug", "TARGETS", true),
                template("pathway", EntityKind::Pathway, "Pathway", "PARTICIPATES_IN", false),
            ],
            vec![
                ("drug", "TARGETS", "protein"),
                ("protein", "ASSOCIATED_WITH", "disease"),
            ],
        ),
        EntityKind::Disease => (
            vec![
                template("protein", EntityKind::Protein, "Associated protein", "ASSOCIATED_WITH", true),
                template("drug", EntityKind::Drug, "Treating drug", "TREATS", true),
                template("variant", EntityKind::Variant, "Risk variant", "ASSOCIATED_WITH", true),
            ],
            vec![("drug", "TARGETS", "protein"), ("variant", "VARIANT_OF", "protein")],
        ),
        EntityKind::Drug => (
            vec![
                template("protein", EntityKind::Protein, "Target protein", "TARGETS", false),
                template("disease", EntityKind::Disease, "Indicated disease", "TREATS", false),
                template("pathway", EntityKind::Pathway, "Affected pathway", "MODULATES", false),
            ],
            vec![("protein", "ASSOCIATED_WITH", "disease")],
        ),
        EntityKind::Variant => (
            vec![
                template("protein", EntityKind::Protein, "Affected protein", "VARIANT_OF", false),
                template("disease", EntityKind::Disease, "Associated disease", "ASSOCIATED_WITH", false),
            ],
            vec![("protein", "ASSOCIATED_WITH", "disease")],
        ),
        EntityKind::Pathway => (
            vec![
                template("protein", EntityKind::Protein, "Member protein", "PARTICIPATES_IN", true),
                template("partner", EntityKind::Protein, "Member protein", "PARTICIPATES_IN", true),
                template("disease", EntityKind::Disease, "Linked disease", "ASSOCIATED_WITH", false),
            ],
            vec![("protein", "INTERACTS_WITH", "partner")],
        ),
    }
}

/// Produces explicitly non-authoritative entities, relation lists, and
/// graphs when real providers come up empty.
#[derive(Clone, Default)]
pub struct FallbackSynthesizer {
    generator: Option<Arc<dyn TextGenerator>>,
}

impl FallbackSynthesizer {
    #[must_use]
    pub fn new(generator: Option<Arc<dyn TextGenerator>>) -> Self {
        Self { generator }
    }

    #[must_use]
    pub fn has_generator(&self) -> bool {
        self.generator.is_some()
    }

    /// Id-only record for an entity nothing is known about.
    #[must_use]
    pub fn stub_entity(key: &EntityKey) -> PartialEntity {
        PartialEntity::new(key.clone())
            .with(attr::NAME, key.id.clone())
            .with(
                attr::DESCRIPTION,
                format!("No information available for {} {}.", key.kind, key.id),
            )
            .with(attr::IS_GENERATED, true)
    }

    async fn ask(&self, prompt: &str) -> Option<Value> {
        let generator = self.generator.as_ref()?;
        let text = match generator.generate(prompt).await {
            Ok(text) => text,
            Err(error) => {
                tracing::warn!(generator = generator.name(), %error, "generation failed");
                return None;
            }
        };
        match extract_json(&text) {
            Ok(value) => Some(value),
            Err(error) => {
                tracing::warn!(generator = generator.name(), %error, "rejecting generated output");
                None
            }
        }
    }

    /// Generated attributes for an entity, or `None` when no generator is
    /// configured or its output is unusable.
    pub async fn generate_entity(&self, key: &EntityKey) -> Option<PartialEntity> {
        let prompt = format!(
            "Describe the {kind} with identifier {id}.\n\
             Respond with a single JSON object and nothing else, matching this JSON schema:\n\
             {schema}",
            kind = key.kind,
            id = key.id,
            schema = schema_text::<GeneratedEntity>(),
        );
        let value = self.ask(&prompt).await?;
        if !value.is_object() {
            tracing::warn!(entity = %key, "generated entity is not a JSON object");
            return None;
        }
        let generated: GeneratedEntity = match serde_json::from_value(value) {
            Ok(generated) => generated,
            Err(error) => {
                tracing::warn!(entity = %key, %error, "generated entity has the wrong shape");
                return None;
            }
        };

        let mut entity = PartialEntity::new(key.clone());
        for (name, value) in [
            (attr::NAME, generated.name),
            (attr::FULL_NAME, generated.full_name),
            (attr::FUNCTION, generated.function),
            (attr::DESCRIPTION, generated.description),
        ] {
            if let Some(value) = non_empty(value) {
                entity.set(name, value);
            }
        }
        if entity.is_empty() {
            return None;
        }
        entity.fill_from(&Self::stub_entity(key));
        entity.set(attr::IS_GENERATED, true);
        Some(entity)
    }

    /// Generated relation list, or `None` when no generator is configured or
    /// no usable record came back.
    pub async fn generate_relations(
        &self,
        key: &EntityKey,
        kind: DataKind,
    ) -> Option<Vec<RelationRecord>> {
        let related = kind.related_kind()?;
        let prompt = format!(
            "List up to 5 {related} entities linked to the {entity_kind} {id} by {kind}.\n\
             Respond with a single JSON array and nothing else, where each element matches this JSON schema:\n\
             {schema}",
            entity_kind = key.kind,
            id = key.id,
            schema = schema_text::<GeneratedRelation>(),
        );
        let value = self.ask(&prompt).await?;
        let items = match value {
            Value::Array(items) => items,
            // Tolerate `{"interactions": [...]}` style wrappers.
            Value::Object(map) => map
                .into_iter()
                .find_map(|(_, v)| match v {
                    Value::Array(items) => Some(items),
                    _ => None,
                })
                .unwrap_or_default(),
            _ => Vec::new(),
        };

        let records: Vec<RelationRecord> = items
            .into_iter()
            .filter_map(|item| serde_json::from_value::<GeneratedRelation>(item).ok())
            .filter_map(|item| {
                let name = non_empty(item.name);
                let id = non_empty(item.id).or_else(|| name.clone())?;
                if id == key.id {
                    return None;
                }
                let mut record = RelationRecord::new(id.clone())
                    .named(name.unwrap_or(id))
                    .from_source(GENERATED_SOURCE)
                    .with(attr::IS_GENERATED, true);
                if let Some(score) = item.score.filter(|s| s.is_finite()) {
                    record = record.scored(score.clamp(0.0, 1.0));
                }
                Some(record)
            })
            .collect();

        if records.is_empty() {
            tracing::warn!(entity = %key, %kind, "generated relation list had no usable records");
            return None;
        }
        Some(records)
    }

    /// Deterministic placeholder graph around `center`.
    ///
    /// Always has the center plus at least two typed neighbors, an edge from
    /// each neighbor to the center, and one or two cross-links.
    #[must_use]
    pub fn demo_graph(center: &GraphNode) -> GraphView {
        let kind = center.kind().unwrap_or(EntityKind::Protein);
        let (neighbors, cross_links) = templates(kind);
        let node_id = |slot: &str| format!("demo:{}:{slot}", center.id);

        let mut nodes = vec![center.clone().with(CENTRALITY, 1).with(IS_DEMO, true)];
        let mut edges = Vec::new();
        for neighbor in &neighbors {
            let id = node_id(neighbor.slot);
            nodes.push(GraphNode::new(id.clone(), neighbor.kind, neighbor.label).with(IS_DEMO, true));
            let (source, target) = if neighbor.inward {
                (id.as_str(), center.id.as_str())
            } else {
                (center.id.as_str(), id.as_str())
            };
            edges.push(GraphEdge::new(source, neighbor.edge_type, target).with(IS_DEMO, true));
        }
        for (from, edge_type, to) in cross_links {
            edges.push(GraphEdge::new(node_id(from), edge_type, node_id(to)).with(IS_DEMO, true));
        }

        GraphView {
            nodes,
            edges,
            is_demo: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use amino_llm::MockGenerator;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn with_mock(mock: MockGenerator) -> (FallbackSynthesizer, Arc<MockGenerator>) {
        let mock = Arc::new(mock);
        let generator: Arc<dyn TextGenerator> = mock.clone();
        (FallbackSynthesizer::new(Some(generator)), mock)
    }

    #[test]
    fn stub_is_marked_generated() {
        let stub = FallbackSynthesizer::stub_entity(&EntityKey::protein("P04637"));
        assert!(stub.is_generated());
        assert_eq!(stub.get_str(attr::NAME), Some("P04637"));
        assert_eq!(
            stub.get_str(attr::DESCRIPTION),
            Some("No information available for protein P04637.")
        );
    }

    #[rstest]
    #[case(EntityKind::Protein)]
    #[case(EntityKind::Disease)]
    #[case(EntityKind::Drug)]
    #[case(EntityKind::Variant)]
    #[case(EntityKind::Pathway)]
    fn demo_graphs_are_connected_and_marked(#[case] kind: EntityKind) {
        let center = GraphNode::new("X1", kind, "X1");
        let graph = FallbackSynthesizer::demo_graph(&center);

        assert!(graph.is_demo);
        assert!(graph.is_sufficient());
        assert!(graph.edges_are_closed());
        assert_eq!(graph.nodes[0].id, "X1");
        assert_eq!(graph.nodes[0].properties[CENTRALITY], 1);
        assert!(graph.nodes.iter().all(|n| n.properties[IS_DEMO] == true));
        assert!(graph.edges.iter().all(|e| e.properties[IS_DEMO] == true));

        // Cross-links join two placeholder nodes.
        let cross = graph
            .edges
            .iter()
            .filter(|e| e.source != "X1" && e.target != "X1")
            .count();
        assert!((1..=2).contains(&cross));
    }

    #[tokio::test]
    async fn generated_entity_fills_defaults() {
        let (synth, mock) = with_mock(
            MockGenerator::new().with_response("P04637", "```json\n{\"function\": \"Tumor suppressor\"}\n```"),
        );
        let entity = synth
            .generate_entity(&EntityKey::protein("P04637"))
            .await
            .unwrap();

        assert_eq!(entity.get_str(attr::FUNCTION), Some("Tumor suppressor"));
        assert_eq!(entity.get_str(attr::NAME), Some("P04637"));
        assert!(entity.is_generated());
        assert!(mock.prompts()[0].contains("\"function\""));
    }

    #[rstest]
    #[case::prose("I don't know this protein.")]
    #[case::array("[1, 2, 3]")]
    #[case::wrong_types("{\"name\": 42}")]
    #[case::empty_object("{}")]
    #[tokio::test]
    async fn unusable_entity_output_is_rejected(#[case] output: &str) {
        let (synth, _) = with_mock(MockGenerator::new().with_fallback(output));
        assert!(synth.generate_entity(&EntityKey::protein("P1")).await.is_none());
    }

    #[tokio::test]
    async fn generated_relations_are_validated() {
        let (synth, _) = with_mock(MockGenerator::new().with_fallback(
            r#"Sure! {"interactions": [
                {"id": "Q00987", "name": "MDM2", "score": 0.75},
                {"name": "EP300"},
                {"id": "P1"},
                {"score": 0.5},
                {"id": "X", "score": 7}
            ]}"#,
        ));
        let records = synth
            .generate_relations(&EntityKey::protein("P1"), DataKind::Interactions)
            .await
            .unwrap();

        let ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["Q00987", "EP300", "X"]);
        assert_eq!(records[0].score, Some(0.75));
        assert_eq!(records[1].name.as_deref(), Some("EP300"));
        assert_eq!(records[2].score, Some(1.0));
        assert!(records.iter().all(|r| r.attributes[attr::IS_GENERATED] == true));
    }

    #[tokio::test]
    async fn no_generator_means_no_generation() {
        let synth = FallbackSynthesizer::default();
        assert!(!synth.has_generator());
        assert!(synth.generate_entity(&EntityKey::protein("P1")).await.is_none());
        assert!(
            synth
                .generate_relations(&EntityKey::protein("P1"), DataKind::Drugs)
                .await
                .is_none()
        );
    }

    #[tokio::test]
    async fn generator_failure_is_absorbed() {
        let (synth, mock) = with_mock(MockGenerator::failing());
        assert!(synth.generate_entity(&EntityKey::protein("P1")).await.is_none());
        assert_eq!(mock.calls(), 1);
    }
}
