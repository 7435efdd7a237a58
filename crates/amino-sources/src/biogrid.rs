//! `BioGRID` curated physical and genetic interactions.
//!
//! Queried by gene symbol and only registered when an access key is
//! configured. Partners are keyed by official symbol so they line up with
//! STRING's preferred names in the graph.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use amino_core::{DataKind, EntityKey, Payload, RelationRecord};
use async_trait::async_trait;
use serde_json::Value;

use crate::http::{check_response, json_body};
use crate::{RemoteSource, SourceClient, SourceError, check_protein};

/// `BioGRID` scores nothing; curated interactions get a fixed confidence.
const CURATED_SCORE: f64 = 0.7;

#[derive(serde::Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
struct Interaction {
    #[serde(default)]
    official_symbol_a: String,
    #[serde(default)]
    official_symbol_b: String,
    #[serde(default)]
    entrez_gene_a: Value,
    #[serde(default)]
    entrez_gene_b: Value,
    #[serde(default)]
    experimental_system: String,
}

/// Results keyed by interaction id; an empty result may arrive as `[]`.
#[derive(serde::Deserialize)]
#[serde(untagged)]
enum Interactions {
    Keyed(BTreeMap<String, Interaction>),
    Empty(Vec<Value>),
}

fn entrez(value: &Value) -> Option<String> {
    match value {
        Value::String(id) if !id.is_empty() => Some(id.clone()),
        Value::Number(id) => Some(id.to_string()),
        _ => None,
    }
}

fn to_records(interactions: Interactions, gene_symbol: &str) -> Vec<RelationRecord> {
    let Interactions::Keyed(interactions) = interactions else {
        return Vec::new();
    };
    let mut seen = HashSet::new();
    let mut records = Vec::new();
    for interaction in interactions.into_values() {
        let query_is_a = interaction.official_symbol_a.eq_ignore_ascii_case(gene_symbol);
        let (partner, partner_entrez) = if query_is_a {
            (interaction.official_symbol_b, &interaction.entrez_gene_b)
        } else {
            (interaction.official_symbol_a, &interaction.entrez_gene_a)
        };
        if partner.is_empty() || partner.eq_ignore_ascii_case(gene_symbol) || !seen.insert(partner.clone()) {
            continue;
        }
        let mut record = RelationRecord::new(partner.clone())
            .named(partner)
            .scored(CURATED_SCORE)
            .from_source("biogrid");
        if let Some(id) = entrez(partner_entrez) {
            record = record.with("entrez_gene", id);
        }
        if !interaction.experimental_system.is_empty() {
            record = record.with("evidence", interaction.experimental_system);
        }
        records.push(record);
    }
    records
}

impl SourceClient {
    /// Fetch interaction partners for a gene symbol.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the HTTP request fails, `BioGRID` returns a
    /// non-success status (including a rejected access key), or the
    /// response cannot be parsed.
    pub async fn fetch_biogrid_partners(&self, gene_symbol: &str) -> Result<Vec<RelationRecord>, SourceError> {
        let url = format!(
            "{}/interactions/?geneList={}&searchNames=true&includeInteractors=true&format=json&taxId={}&max={}&accessKey={}",
            self.config.biogrid_url.trim_end_matches('/'),
            urlencoding::encode(gene_symbol),
            self.config.species,
            self.config.interaction_limit * 10,
            urlencoding::encode(&self.config.biogrid_access_key),
        );
        let Some(resp) = check_response(self.http.get(&url).send().await?).await? else {
            return Ok(Vec::new());
        };
        let interactions: Interactions = json_body(resp).await?;
        let mut records = to_records(interactions, gene_symbol);
        records.truncate(self.config.interaction_limit as usize);
        Ok(records)
    }
}

/// Protein-protein interactions from `BioGRID`, tried after STRING.
pub struct BioGridSource {
    client: Arc<SourceClient>,
}

impl BioGridSource {
    #[must_use]
    pub const fn new(client: Arc<SourceClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl RemoteSource for BioGridSource {
    fn name(&self) -> &'static str {
        "biogrid"
    }

    async fn fetch(&self, key: &EntityKey, kind: DataKind) -> Result<Payload, SourceError> {
        check_protein(self.name(), key, kind, DataKind::Interactions)?;
        let Some(symbol) = self.client.gene_symbol(key).await? else {
            tracing::debug!(entity = %key, "no gene symbol, skipping BioGRID");
            return Ok(Payload::Relations(Vec::new()));
        };
        let records = self.client.fetch_biogrid_partners(&symbol).await?;
        Ok(Payload::Relations(records))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const FIXTURE: &str = r#"{
        "103": {
            "BIOGRID_INTERACTION_ID": 103,
            "ENTREZ_GENE_A": "7157",
            "ENTREZ_GENE_B": "4193",
            "OFFICIAL_SYMBOL_A": "TP53",
            "OFFICIAL_SYMBOL_B": "MDM2",
            "EXPERIMENTAL_SYSTEM": "Affinity Capture-Western"
        },
        "117": {
            "ENTREZ_GENE_A": 4193,
            "ENTREZ_GENE_B": "7157",
            "OFFICIAL_SYMBOL_A": "MDM2",
            "OFFICIAL_SYMBOL_B": "TP53",
            "EXPERIMENTAL_SYSTEM": "Two-hybrid"
        },
        "120": {
            "ENTREZ_GENE_A": "7157",
            "ENTREZ_GENE_B": "7157",
            "OFFICIAL_SYMBOL_A": "TP53",
            "OFFICIAL_SYMBOL_B": "TP53",
            "EXPERIMENTAL_SYSTEM": "Reconstituted Complex"
        },
        "131": {
            "ENTREZ_GENE_A": "1026",
            "ENTREZ_GENE_B": "7157",
            "OFFICIAL_SYMBOL_A": "CDKN1A",
            "OFFICIAL_SYMBOL_B": "TP53",
            "EXPERIMENTAL_SYSTEM": ""
        }
    }"#;

    #[test]
    fn parse_partners_from_either_side() {
        let interactions: Interactions = serde_json::from_str(FIXTURE).unwrap();
        let records = to_records(interactions, "TP53");

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, "MDM2");
        assert_eq!(records[0].score, Some(CURATED_SCORE));
        assert_eq!(records[0].source.as_deref(), Some("biogrid"));
        assert_eq!(records[0].attributes["entrez_gene"], "4193");
        assert_eq!(records[0].attributes["evidence"], "Affinity Capture-Western");
        assert_eq!(records[1].id, "CDKN1A");
        assert_eq!(records[1].attributes["entrez_gene"], "1026");
        assert!(!records[1].attributes.contains_key("evidence"));
    }

    #[test]
    fn empty_list_means_no_partners() {
        let interactions: Interactions = serde_json::from_str("[]").unwrap();
        assert!(to_records(interactions, "TP53").is_empty());
    }

    #[tokio::test]
    #[ignore] // requires network and AMINO_SOURCES__BIOGRID_ACCESS_KEY
    async fn fetch_tp53_partners_live() {
        let config = amino_config::SourcesConfig {
            biogrid_access_key: std::env::var("AMINO_SOURCES__BIOGRID_ACCESS_KEY").unwrap(),
            ..amino_config::SourcesConfig::default()
        };
        let client = SourceClient::new(&config, "amino-test").unwrap();
        let records = client.fetch_biogrid_partners("TP53").await.unwrap();
        assert!(!records.is_empty());
    }
}
