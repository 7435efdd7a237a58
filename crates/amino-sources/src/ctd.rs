//! CTD curated gene-disease associations.
//!
//! The Comparative Toxicogenomics Database is queried by gene symbol through
//! its batch query endpoint, which answers with a flat JSON array. Rows that
//! did not match anything carry no disease id and are dropped.

use std::collections::HashSet;
use std::sync::Arc;

use amino_core::{DataKind, EntityKey, Payload, RelationRecord};
use async_trait::async_trait;

use crate::http::{check_response, json_body};
use crate::{RemoteSource, SourceClient, SourceError, check_protein};

#[derive(serde::Deserialize)]
struct Association {
    #[serde(rename = "DiseaseID")]
    disease_id: Option<String>,
    #[serde(rename = "DiseaseName", default)]
    disease_name: String,
    #[serde(rename = "DirectEvidence", default)]
    direct_evidence: String,
    #[serde(rename = "OmimIDs", default)]
    omim_ids: String,
}

fn to_records(associations: Vec<Association>, limit: usize) -> Vec<RelationRecord> {
    let mut seen = HashSet::new();
    associations
        .into_iter()
        .filter_map(|a| {
            let id = a.disease_id.clone().filter(|id| !id.is_empty())?;
            seen.insert(id.clone()).then_some((id, a))
        })
        .take(limit)
        .map(|(id, a)| {
            let mut record = RelationRecord::new(id).named(a.disease_name).from_source("ctd");
            if !a.direct_evidence.is_empty() {
                record = record.with("evidence", a.direct_evidence);
            }
            if !a.omim_ids.is_empty() {
                record = record.with("omim_ids", a.omim_ids);
            }
            record
        })
        .collect()
}

impl SourceClient {
    /// Fetch curated disease associations for a gene symbol.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the HTTP request fails, CTD returns a
    /// non-success status, or the response cannot be parsed.
    pub async fn fetch_ctd_diseases(&self, gene_symbol: &str) -> Result<Vec<RelationRecord>, SourceError> {
        let url = format!(
            "{}?inputType=gene&inputTerms={}&report=diseases_curated&format=json",
            self.config.ctd_url,
            urlencoding::encode(gene_symbol),
        );
        let Some(resp) = check_response(self.http.get(&url).send().await?).await? else {
            return Ok(Vec::new());
        };
        let associations: Vec<Association> = json_body(resp).await?;
        Ok(to_records(associations, self.config.relation_limit))
    }
}

/// Disease associations of proteins from CTD, by gene symbol.
pub struct CtdSource {
    client: Arc<SourceClient>,
}

impl CtdSource {
    #[must_use]
    pub const fn new(client: Arc<SourceClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl RemoteSource for CtdSource {
    fn name(&self) -> &'static str {
        "ctd"
    }

    async fn fetch(&self, key: &EntityKey, kind: DataKind) -> Result<Payload, SourceError> {
        check_protein(self.name(), key, kind, DataKind::Diseases)?;
        let Some(symbol) = self.client.gene_symbol(key).await? else {
            tracing::debug!(entity = %key, "no gene symbol, skipping CTD");
            return Ok(Payload::Relations(Vec::new()));
        };
        let records = self.client.fetch_ctd_diseases(&symbol).await?;
        Ok(Payload::Relations(records))
    }
}
