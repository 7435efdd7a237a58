//! Ensembl variants overlapping a gene.
//!
//! The gene symbol is resolved to an Ensembl gene id, then every variation
//! feature overlapping that gene is listed. The first allele is taken as the
//! reference, the rest as alternates.

use std::sync::Arc;

use amino_core::{DataKind, EntityKey, Payload, RelationRecord};
use async_trait::async_trait;

use crate::http::{check_response, json_body};
use crate::{RemoteSource, SourceClient, SourceError, check_protein};

#[derive(serde::Deserialize)]
struct GeneLookup {
    id: Option<String>,
}

#[derive(serde::Deserialize)]
struct Variation {
    id: String,
    start: Option<u64>,
    #[serde(default)]
    alleles: Vec<String>,
    consequence_type: Option<String>,
    #[serde(default)]
    clinical_significance: Vec<String>,
}

impl Variation {
    fn into_record(self, gene_id: &str) -> RelationRecord {
        let mut alleles = self.alleles.into_iter();
        let mut record = RelationRecord::new(self.id.clone())
            .named(self.id)
            .from_source("ensembl")
            .with("gene_id", gene_id);
        if let Some(position) = self.start {
            record = record.with("position", position);
        }
        if let Some(original) = alleles.next() {
            record = record.with("original", original);
            let variant: Vec<String> = alleles.collect();
            if !variant.is_empty() {
                record = record.with("variant", variant.join(", "));
            }
        }
        if let Some(effect) = self.consequence_type {
            record = record.with("effect", effect);
        }
        if !self.clinical_significance.is_empty() {
            record = record.with("clinical_significance", self.clinical_significance.join(", "));
        }
        record
    }
}

impl SourceClient {
    async fn ensembl_gene_id(&self, gene_symbol: &str) -> Result<Option<String>, SourceError> {
        let url = format!(
            "{}/lookup/symbol/{}/{}?content-type=application/json",
            self.config.ensembl_url.trim_end_matches('/'),
            urlencoding::encode(&self.config.ensembl_species),
            urlencoding::encode(gene_symbol),
        );
        // Ensembl answers an unknown symbol with 400, not 404.
        let resp = self.http.get(&url).send().await?;
        if resp.status() == 400 {
            return Ok(None);
        }
        let Some(resp) = check_response(resp).await? else {
            return Ok(None);
        };
        let lookup: GeneLookup = json_body(resp).await?;
        Ok(lookup.id)
    }

    /// Fetch variants overlapping the gene with this symbol, at most
    /// `variant_limit` of them.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if an HTTP request fails, Ensembl returns a
    /// non-success status, or a response cannot be parsed.
    pub async fn fetch_ensembl_variants(&self, gene_symbol: &str) -> Result<Vec<RelationRecord>, SourceError> {
        let Some(gene_id) = self.ensembl_gene_id(gene_symbol).await? else {
            return Ok(Vec::new());
        };
        let url = format!(
            "{}/overlap/id/{}?feature=variation;content-type=application/json",
            self.config.ensembl_url.trim_end_matches('/'),
            urlencoding::encode(&gene_id),
        );
        let Some(resp) = check_response(self.http.get(&url).send().await?).await? else {
            return Ok(Vec::new());
        };
        let variations: Vec<Variation> = json_body(resp).await?;
        Ok(variations
            .into_iter()
            .take(self.config.variant_limit)
            .map(|v| v.into_record(&gene_id))
            .collect())
    }
}

/// Genomic variants of a protein's gene from Ensembl.
pub struct EnsemblSource {
    client: Arc<SourceClient>,
}

impl EnsemblSource {
    #[must_use]
    pub const fn new(client: Arc<SourceClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl RemoteSource for EnsemblSource {
    fn name(&self) -> &'static str {
        "ensembl"
    }

    async fn fetch(&self, key: &EntityKey, kind: DataKind) -> Result<Payload, SourceError> {
        check_protein(self.name(), key, kind, DataKind::Variants)?;
        let Some(symbol) = self.client.gene_symbol(key).await? else {
            tracing::debug!(entity = %key, "no gene symbol, skipping Ensembl");
            return Ok(Payload::Relations(Vec::new()));
        };
        let records = self.client.fetch_ensembl_variants(&symbol).await?;
        Ok(Payload::Relations(records))
    }
}
