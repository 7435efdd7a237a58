//! `AlphaFold` DB predicted structures.

use std::sync::Arc;

use amino_core::{DataKind, EntityKey, EntityKind, Payload, StructureRecord, StructureStatus};
use async_trait::async_trait;

use crate::http::{check_response, json_body};
use crate::{RemoteSource, SourceClient, SourceError, base_accession, unsupported};

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct Prediction {
    entry_id: String,
    #[serde(alias = "confidenceAvgLocalScore")]
    global_metric_value: Option<f64>,
    #[serde(alias = "uniprotLength")]
    uniprot_end: Option<u64>,
    pdb_url: Option<String>,
}

impl Prediction {
    fn into_record(self) -> StructureRecord {
        let mut record =
            StructureRecord::available(StructureStatus::Predicted, "alphafold", &self.entry_id);
        if let Some(confidence) = self.global_metric_value {
            record = record.with("confidence", confidence);
        }
        if let Some(length) = self.uniprot_end {
            record = record.with("length", length);
        }
        if let Some(url) = self.pdb_url {
            record = record.with("download_url", url);
        }
        record
    }
}

impl SourceClient {
    /// Fetch the first `AlphaFold` model for an accession.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the HTTP request fails, `AlphaFold` DB
    /// returns a non-success status, or the response cannot be parsed.
    pub async fn fetch_alphafold(
        &self,
        accession: &str,
    ) -> Result<Option<StructureRecord>, SourceError> {
        let url = format!(
            "{}/prediction/{}",
            self.config.alphafold_url.trim_end_matches('/'),
            urlencoding::encode(accession)
        );
        let Some(resp) = check_response(self.http.get(&url).send().await?).await? else {
            return Ok(None);
        };
        let predictions: Vec<Prediction> = json_body(resp).await?;
        Ok(predictions.into_iter().next().map(Prediction::into_record))
    }
}

/// Predicted structures from the `AlphaFold` Protein Structure Database.
pub struct AlphaFoldSource {
    client: Arc<SourceClient>,
}

impl AlphaFoldSource {
    #[must_use]
    pub const fn new(client: Arc<SourceClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl RemoteSource for AlphaFoldSource {
    fn name(&self) -> &'static str {
        "alphafold"
    }

    async fn fetch(&self, key: &EntityKey, kind: DataKind) -> Result<Payload, SourceError> {
        if kind != DataKind::Structure || key.kind != EntityKind::Protein {
            return Err(unsupported(self.name(), kind));
        }
        let record = self
            .client
            .fetch_alphafold(base_accession(&key.id))
            .await?
            .unwrap_or_else(|| StructureRecord::unavailable(&key.id));
        Ok(Payload::Structure(record))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const FIXTURE: &str = r#"[{
        "entryId": "AF-P04637-F1",
        "gene": "TP53",
        "uniprotAccession": "P04637",
        "uniprotStart": 1,
        "uniprotEnd": 393,
        "globalMetricValue": 75.5,
        "pdbUrl": "https://alphafold.ebi.ac.uk/files/AF-P04637-F1-model_v4.pdb"
    }]"#;

    #[test]
    fn parse_prediction() {
        let predictions: Vec<Prediction> = serde_json::from_str(FIXTURE).unwrap();
        let record = predictions.into_iter().next().unwrap().into_record();

        assert_eq!(record.status, StructureStatus::Predicted);
        assert_eq!(record.model_id.as_deref(), Some("AF-P04637-F1"));
        assert_eq!(record.attributes["confidence"], 75.5);
        assert_eq!(record.attributes["length"], 393);
    }

    #[test]
    fn legacy_field_names_are_accepted() {
        let predictions: Vec<Prediction> = serde_json::from_str(
            r#"[{"entryId": "AF-Q1-F1", "confidenceAvgLocalScore": 0.5, "uniprotLength": 10}]"#,
        )
        .unwrap();
        let record = predictions.into_iter().next().unwrap().into_record();
        assert_eq!(record.attributes["confidence"], 0.5);
        assert_eq!(record.attributes["length"], 10);
    }

    #[tokio::test]
    #[ignore] // requires network
    async fn fetch_p53_live() {
        let client = SourceClient::new(&amino_config::SourcesConfig::default(), "amino-test").unwrap();
        let record = client.fetch_alphafold("P04637").await.unwrap().unwrap();
        assert_eq!(record.status, StructureStatus::Predicted);
    }
}
