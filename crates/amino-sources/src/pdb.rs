//! RCSB PDB experimental structure search.
//!
//! Finds polymer entities whose reference sequence is the given `UniProt`
//! accession, best resolution first.

use std::sync::Arc;

use amino_core::{DataKind, EntityKey, EntityKind, Payload, StructureRecord, StructureStatus};
use async_trait::async_trait;
use serde_json::json;

use crate::http::{check_response, json_body};
use crate::{RemoteSource, SourceClient, SourceError, base_accession, unsupported};

const ACCESSION_ATTRIBUTE: &str =
    "rcsb_polymer_entity_container_identifiers.reference_sequence_identifiers.database_accession";

#[derive(serde::Deserialize)]
struct SearchResponse {
    #[serde(default)]
    total_count: u64,
    #[serde(default)]
    result_set: Vec<SearchHit>,
}

#[derive(serde::Deserialize)]
struct SearchHit {
    identifier: String,
    score: Option<f64>,
}

fn search_body(accession: &str) -> serde_json::Value {
    json!({
        "query": {
            "type": "terminal",
            "service": "text",
            "parameters": {
                "attribute": ACCESSION_ATTRIBUTE,
                "operator": "exact_match",
                "value": accession
            }
        },
        "return_type": "polymer_entity",
        "request_options": {
            "paginate": {"start": 0, "rows": 10},
            "sort": [{"sort_by": "rcsb_entry_info.resolution_combined", "direction": "asc"}]
        }
    })
}

impl SearchResponse {
    /// Best entry as a structure record. Identifiers look like `1TUP_1`.
    fn into_record(self) -> Option<StructureRecord> {
        let total = self.total_count;
        let best = self.result_set.into_iter().next()?;
        let entry = best
            .identifier
            .split('_')
            .next()
            .unwrap_or(&best.identifier)
            .to_string();
        if entry.is_empty() {
            return None;
        }
        let mut record = StructureRecord::available(StructureStatus::Experimental, "pdb", &entry)
            .with("viewer_url", format!("https://www.rcsb.org/3d-view/{entry}"))
            .with("download_url", format!("https://files.rcsb.org/download/{entry}.pdb"))
            .with("entry_count", total);
        if let Some(score) = best.score {
            record = record.with("score", score);
        }
        Some(record)
    }
}

impl SourceClient {
    /// Search RCSB for experimental structures of a protein.
    ///
    /// Returns `None` when no entry references the accession.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the HTTP request fails, RCSB returns a
    /// non-success status, or the response cannot be parsed.
    pub async fn search_pdb(&self, accession: &str) -> Result<Option<StructureRecord>, SourceError> {
        let url = format!("{}/query", self.config.pdb_url.trim_end_matches('/'));
        let resp = self
            .http
            .post(&url)
            .json(&search_body(accession))
            .send()
            .await?;
        let Some(resp) = check_response(resp).await? else {
            return Ok(None);
        };
        let data: SearchResponse = json_body(resp).await?;
        Ok(data.into_record())
    }
}

/// Experimental structures from the RCSB Protein Data Bank.
pub struct RcsbPdbSource {
    client: Arc<SourceClient>,
}

impl RcsbPdbSource {
    #[must_use]
    pub const fn new(client: Arc<SourceClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl RemoteSource for RcsbPdbSource {
    fn name(&self) -> &'static str {
        "pdb"
    }

    async fn fetch(&self, key: &EntityKey, kind: DataKind) -> Result<Payload, SourceError> {
        if kind != DataKind::Structure || key.kind != EntityKind::Protein {
            return Err(unsupported(self.name(), kind));
        }
        let record = self
            .client
            .search_pdb(base_accession(&key.id))
            .await?
            .unwrap_or_else(|| StructureRecord::unavailable(&key.id));
        Ok(Payload::Structure(record))
    }
}
