//! `UniProt` entity lookup.
//!
//! Direct accession lookup via `{uniprot_url}/{accession}?format=json`. Only
//! proteins are served; a 404 yields an empty entity.

use std::sync::Arc;

use amino_core::entity::attr;
use amino_core::{DataKind, EntityKey, EntityKind, PartialEntity, Payload};
use async_trait::async_trait;

use crate::http::{check_response, json_body};
use crate::{RemoteSource, SourceClient, SourceError, unsupported};

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct UniProtEntry {
    primary_accession: Option<String>,
    #[serde(default)]
    genes: Vec<Gene>,
    protein_description: Option<ProteinDescription>,
    #[serde(default)]
    comments: Vec<Comment>,
    organism: Option<Organism>,
    sequence: Option<Sequence>,
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct Gene {
    gene_name: Option<Valued>,
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProteinDescription {
    recommended_name: Option<RecommendedName>,
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct RecommendedName {
    full_name: Option<Valued>,
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct Comment {
    comment_type: String,
    #[serde(default)]
    texts: Vec<Valued>,
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct Organism {
    scientific_name: Option<String>,
}

#[derive(serde::Deserialize)]
struct Sequence {
    value: Option<String>,
    length: Option<u64>,
}

#[derive(serde::Deserialize)]
struct Valued {
    value: String,
}

impl UniProtEntry {
    fn into_entity(self, key: EntityKey) -> PartialEntity {
        let mut entity = PartialEntity::new(key);
        if let Some(name) = self
            .genes
            .into_iter()
            .find_map(|gene| gene.gene_name)
            .map(|v| v.value)
        {
            entity.set(attr::NAME, name);
        }
        if let Some(full_name) = self
            .protein_description
            .and_then(|d| d.recommended_name)
            .and_then(|r| r.full_name)
        {
            entity.set(attr::FULL_NAME, full_name.value);
        }
        if let Some(function) = self
            .comments
            .into_iter()
            .filter(|c| c.comment_type == "FUNCTION")
            .find_map(|c| c.texts.into_iter().next())
        {
            entity.set(attr::FUNCTION, function.value);
        }
        if let Some(organism) = self.organism.and_then(|o| o.scientific_name) {
            entity.set(attr::ORGANISM, organism);
        }
        if let Some(sequence) = self.sequence {
            if let Some(value) = sequence.value {
                entity.set(attr::SEQUENCE, value);
            }
            if let Some(length) = sequence.length {
                entity.set(attr::LENGTH, length);
            }
        }
        if let Some(accession) = self.primary_accession {
            entity.set("accession", accession);
        }
        entity
    }
}

impl SourceClient {
    /// Look up a protein entry on `UniProt` by accession.
    ///
    /// Returns `None` if the accession is unknown (404).
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the HTTP request fails, `UniProt` returns a
    /// non-success status, or the response cannot be parsed.
    pub async fn fetch_uniprot(&self, key: &EntityKey) -> Result<Option<PartialEntity>, SourceError> {
        let url = format!(
            "{}/{}?format=json",
            self.config.uniprot_url.trim_end_matches('/'),
            urlencoding::encode(&key.id)
        );
        let Some(resp) = check_response(self.http.get(&url).send().await?).await? else {
            return Ok(None);
        };
        let entry: UniProtEntry = json_body(resp).await?;
        Ok(Some(entry.into_entity(key.clone())))
    }
}

/// Entity info for proteins from `UniProt`.
pub struct UniProtSource {
    client: Arc<SourceClient>,
}

impl UniProtSource {
    #[must_use]
    pub const fn new(client: Arc<SourceClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl RemoteSource for UniProtSource {
    fn name(&self) -> &'static str {
        "uniprot"
    }

    async fn fetch(&self, key: &EntityKey, kind: DataKind) -> Result<Payload, SourceError> {
        if kind != DataKind::Info || key.kind != EntityKind::Protein {
            return Err(unsupported(self.name(), kind));
        }
        let entity = self
            .client
            .fetch_uniprot(key)
            .await?
            .unwrap_or_else(|| PartialEntity::new(key.clone()));
        Ok(Payload::Entity(entity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const FIXTURE: &str = r#"{
        "primaryAccession": "P04637",
        "genes": [{"geneName": {"value": "TP53"}, "synonyms": [{"value": "P53"}]}],
        "proteinDescription": {
            "recommendedName": {"fullName": {"value": "Cellular tumor antigen p53"}}
        },
        "comments": [
            {"commentType": "SUBUNIT", "texts": [{"value": "Forms homodimers."}]},
            {"commentType": "FUNCTION", "texts": [{"value": "Acts as a tumor suppressor."}]}
        ],
        "organism": {"scientificName": "Homo sapiens", "taxonId": 9606},
        "sequence": {"value": "MEEPQSDPSV", "length": 393}
    }"#;

    #[test]
    fn parse_uniprot_entry() {
        let entry: UniProtEntry = serde_json::from_str(FIXTURE).unwrap();
        let entity = entry.into_entity(EntityKey::protein("P04637"));

        assert_eq!(entity.get_str(attr::NAME), Some("TP53"));
        assert_eq!(entity.get_str(attr::FULL_NAME), Some("Cellular tumor antigen p53"));
        assert_eq!(entity.get_str(attr::FUNCTION), Some("Acts as a tumor suppressor."));
        assert_eq!(entity.get_str(attr::ORGANISM), Some("Homo sapiens"));
        assert_eq!(entity.get_str(attr::SEQUENCE), Some("MEEPQSDPSV"));
        assert_eq!(entity.get(attr::LENGTH), Some(&serde_json::json!(393)));
        assert!(!entity.is_generated());
    }

    #[test]
    fn sparse_entry_leaves_attributes_absent() {
        let entry: UniProtEntry =
            serde_json::from_str(r#"{"primaryAccession": "Q00000"}"#).unwrap();
        let entity = entry.into_entity(EntityKey::protein("Q00000"));
        assert!(entity.get(attr::NAME).is_none());
        assert!(entity.get(attr::FUNCTION).is_none());
        assert_eq!(entity.get_str("accession"), Some("Q00000"));
    }

    #[tokio::test]
    async fn non_protein_is_unsupported() {
        let client = Arc::new(SourceClient::new(&amino_config::SourcesConfig::default(), "amino-test").unwrap());
        let source = UniProtSource::new(client);
        let err = source
            .fetch(&EntityKey::new(EntityKind::Drug, "DB0001"), DataKind::Info)
            .await
            .unwrap_err();
        assert!(matches!(err, SourceError::Unsupported { .. }));
    }

    #[tokio::test]
    #[ignore] // requires network
    async fn fetch_p53_live() {
        let client = SourceClient::new(&amino_config::SourcesConfig::default(), "amino-test").unwrap();
        let entity = client
            .fetch_uniprot(&EntityKey::protein("P04637"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(entity.get_str(attr::NAME), Some("TP53"));
    }
}
