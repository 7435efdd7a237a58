use std::path::Path;

use amino_config::{AminoConfig, Backend};
use amino_core::{GraphEdge, GraphNode};
use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::bootstrap;
use crate::cli::Commands;

/// Body of a `seed` file.
#[derive(Debug, Deserialize)]
pub struct SeedDocument {
    #[serde(default)]
    pub nodes: Vec<GraphNode>,
    #[serde(default)]
    pub edges: Vec<GraphEdge>,
}

#[derive(Debug, Serialize)]
struct SeedReport {
    nodes: usize,
    edges: usize,
    skipped_edges: usize,
}

#[derive(Debug, Serialize)]
struct InvalidateReport<'a> {
    id: &'a str,
    removed: u64,
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn read_seed(path: &Path) -> anyhow::Result<SeedDocument> {
    let raw = std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("{} is not a {{nodes, edges}} document", path.display()))
}

pub async fn dispatch(command: Commands, config: &AminoConfig) -> anyhow::Result<()> {
    let resolver = bootstrap::build_resolver(config).await?;

    match command {
        Commands::Resolve { kind, id, entity_type } => {
            let resolution = resolver.resolve_named(&kind, &entity_type, &id).await?;
            print_json(&resolution)
        }
        Commands::Profile { id } => print_json(&resolver.profile(&id).await),
        Commands::Graph { id, entity_type, depth } => {
            print_json(&resolver.get_entity_graph(&id, entity_type, depth).await)
        }
        Commands::Invalidate { id } => {
            let removed = resolver.invalidate(&id).await;
            print_json(&InvalidateReport { id: &id, removed })
        }
        Commands::Seed { file } => {
            if config.store.backend == Backend::Memory {
                tracing::warn!("graph store backend is memory, seeded data is lost on exit");
            }
            let document = read_seed(&file)?;
            let (nodes, edges) = resolver
                .store()
                .load(&document.nodes, &document.edges)
                .await
                .context("failed to seed graph store")?;
            print_json(&SeedReport {
                nodes,
                edges,
                skipped_edges: document.edges.len().saturating_sub(edges),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn seed_document_parses_nodes_and_edges() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "nodes": [
                    {{"id": "P04637", "type": "Protein", "label": "p53"}},
                    {{"id": "Q00987", "type": "Protein", "label": "MDM2"}}
                ],
                "edges": [
                    {{"id": "e1", "source": "P04637", "target": "Q00987", "type": "INTERACTS_WITH"}}
                ]
            }}"#
        )
        .unwrap();

        let document = read_seed(file.path()).unwrap();
        assert_eq!(document.nodes.len(), 2);
        assert_eq!(document.nodes[1].label, "MDM2");
        assert_eq!(document.edges[0].edge_type, "INTERACTS_WITH");
    }

    #[test]
    fn seed_document_may_omit_edges() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"nodes": []}}"#).unwrap();
        let document = read_seed(file.path()).unwrap();
        assert!(document.edges.is_empty());
    }

    #[test]
    fn malformed_seed_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[1, 2, 3]").unwrap();
        let error = read_seed(file.path()).unwrap_err();
        assert!(format!("{error:#}").contains("is not a {nodes, edges} document"));
    }
}
