//! `ChEMBL` compounds active against a protein target.
//!
//! Two requests: the target whose components include the accession, then
//! its recorded bioactivities. Each distinct molecule becomes one drug
//! record carrying its best-described measurement.

use std::collections::HashSet;
use std::sync::Arc;

use amino_core::{DataKind, EntityKey, Payload, RelationRecord};
use async_trait::async_trait;

use crate::http::{check_response, json_body};
use crate::{RemoteSource, SourceClient, SourceError, base_accession, check_protein};

#[derive(serde::Deserialize)]
struct TargetPage {
    #[serde(default)]
    targets: Vec<Target>,
}

#[derive(serde::Deserialize)]
struct Target {
    target_chembl_id: String,
}

#[derive(serde::Deserialize)]
struct ActivityPage {
    #[serde(default)]
    activities: Vec<Activity>,
}

#[derive(serde::Deserialize)]
struct Activity {
    molecule_chembl_id: Option<String>,
    molecule_pref_name: Option<String>,
    standard_type: Option<String>,
    standard_value: Option<String>,
    standard_units: Option<String>,
}

impl Activity {
    /// `IC50 90 nM`, or whatever parts are present.
    fn measurement(&self) -> Option<String> {
        let parts: Vec<&str> = [&self.standard_type, &self.standard_value, &self.standard_units]
            .into_iter()
            .filter_map(|part| part.as_deref().filter(|p| !p.is_empty()))
            .collect();
        (!parts.is_empty()).then(|| parts.join(" "))
    }
}

fn to_records(activities: Vec<Activity>, target_id: &str, limit: usize) -> Vec<RelationRecord> {
    let mut seen = HashSet::new();
    let mut records = Vec::new();
    for activity in activities {
        if records.len() >= limit {
            break;
        }
        let Some(molecule) = activity.molecule_chembl_id.clone() else {
            continue;
        };
        if !seen.insert(molecule.clone()) {
            continue;
        }
        let name = activity
            .molecule_pref_name
            .clone()
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| molecule.clone());
        let mut record = RelationRecord::new(molecule)
            .named(name)
            .from_source("chembl")
            .with("chembl_target", target_id);
        if let Some(measurement) = activity.measurement() {
            record = record.with("activity", measurement);
        }
        records.push(record);
    }
    records
}

impl SourceClient {
    /// Fetch compounds with recorded activity against the `ChEMBL` target
    /// for a `UniProt` accession.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if either HTTP request fails, `ChEMBL`
    /// returns a non-success status, or a response cannot be parsed.
    pub async fn fetch_chembl_compounds(&self, accession: &str) -> Result<Vec<RelationRecord>, SourceError> {
        let base = self.config.chembl_url.trim_end_matches('/');
        let url = format!(
            "{base}/target.json?target_components__accession={}&limit=1",
            urlencoding::encode(accession),
        );
        let Some(resp) = check_response(self.http.get(&url).send().await?).await? else {
            return Ok(Vec::new());
        };
        let page: TargetPage = json_body(resp).await?;
        let Some(target) = page.targets.into_iter().next() else {
            return Ok(Vec::new());
        };

        // Over-fetch: several activities usually share one molecule.
        let url = format!(
            "{base}/activity.json?target_chembl_id={}&limit={}",
            urlencoding::encode(&target.target_chembl_id),
            self.config.relation_limit * 5,
        );
        let Some(resp) = check_response(self.http.get(&url).send().await?).await? else {
            return Ok(Vec::new());
        };
        let page: ActivityPage = json_body(resp).await?;
        Ok(to_records(page.activities, &target.target_chembl_id, self.config.relation_limit))
    }
}

/// Drugs and tool compounds targeting a protein, from `ChEMBL`.
pub struct ChemblSource {
    client: Arc<SourceClient>,
}

impl ChemblSource {
    #[must_use]
    pub const fn new(client: Arc<SourceClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl RemoteSource for ChemblSource {
    fn name(&self) -> &'static str {
        "chembl"
    }

    async fn fetch(&self, key: &EntityKey, kind: DataKind) -> Result<Payload, SourceError> {
        check_protein(self.name(), key, kind, DataKind::Drugs)?;
        let records = self.client.fetch_chembl_compounds(base_accession(&key.id)).await?;
        Ok(Payload::Relations(records))
    }
}
