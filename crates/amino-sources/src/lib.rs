//! # amino-sources
//!
//! Remote data sources for the resolver's remote tier.
//!
//! Every source implements [`RemoteSource`]: an opaque async fetch that may
//! fail, time out, or return partial data. "Nothing found" is an ordinary
//! negative payload, not an error. Bundled sources:
//! - `UniProt` (entity info)
//! - RCSB PDB (experimental structures)
//! - `AlphaFold` DB (predicted structures)
//! - STRING, then `BioGRID` when an access key is set (protein-protein
//!   interactions)
//! - CTD (curated disease associations)
//! - `ChEMBL` (compounds with measured activity against the target)
//! - Ensembl (genomic variants overlapping the gene)
//!
//! [`FnSource`] wraps any async closure, for collaborators that bring their
//! own fetch functions.

pub mod alphafold;
pub mod biogrid;
pub mod chembl;
pub mod ctd;
pub mod ensembl;
pub mod pdb;
pub mod string_db;
pub mod uniprot;

mod error;
mod http;

pub use error::SourceError;

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};

use amino_config::SourcesConfig;
use amino_core::entity::attr;
use amino_core::{DataKind, EntityKey, EntityKind, Payload};
use async_trait::async_trait;

// ── Trait ──────────────────────────────────────────────────────────

/// One remote provider of entity data.
#[async_trait]
pub trait RemoteSource: Send + Sync {
    /// Source name used in provenance tags (`remote:<name>`) and logs.
    fn name(&self) -> &str;

    /// Fetch `kind` for `key`. A negative payload means the source has no
    /// data; an error means the source could not answer.
    async fn fetch(&self, key: &EntityKey, kind: DataKind) -> Result<Payload, SourceError>;
}

// ── Client ─────────────────────────────────────────────────────────

/// Shared HTTP client and endpoint settings for the bundled sources.
pub struct SourceClient {
    http: reqwest::Client,
    config: SourcesConfig,
    /// Accession -> gene symbol, for sources queried by symbol.
    symbols: Mutex<HashMap<String, String>>,
}

impl SourceClient {
    /// Build a client with the configured timeout and the given user agent.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Http`] if the TLS backend fails to initialize.
    pub fn new(config: &SourcesConfig, user_agent: &str) -> Result<Self, SourceError> {
        let http = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(config.timeout())
            .build()?;
        Ok(Self {
            http,
            config: config.clone(),
            symbols: Mutex::new(HashMap::new()),
        })
    }

    #[must_use]
    pub const fn config(&self) -> &SourcesConfig {
        &self.config
    }

    /// Gene symbol of a protein, looked up on `UniProt` once per accession.
    ///
    /// Returns `None` if `UniProt` has no entry or the entry names no gene.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the `UniProt` lookup fails.
    pub async fn gene_symbol(&self, key: &EntityKey) -> Result<Option<String>, SourceError> {
        let accession = base_accession(&key.id);
        let known = self
            .symbols
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(accession)
            .cloned();
        if known.is_some() {
            return Ok(known);
        }
        let symbol = self
            .fetch_uniprot(&EntityKey::protein(accession))
            .await?
            .and_then(|entity| entity.get_str(attr::NAME).map(str::to_string))
            .filter(|symbol| !symbol.is_empty());
        if let Some(symbol) = &symbol {
            self.symbols
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .insert(accession.to_string(), symbol.clone());
        }
        Ok(symbol)
    }

    /// The bundled sources in canonical chain order, paired with the data
    /// kind each serves. `BioGRID` is included only when it has an access
    /// key.
    #[must_use]
    pub fn bundled(self: &Arc<Self>) -> Vec<(DataKind, Arc<dyn RemoteSource>)> {
        let client = || Arc::clone(self);
        let mut sources: Vec<(DataKind, Arc<dyn RemoteSource>)> = Vec::new();
        let mut add = |kind: DataKind, source: Arc<dyn RemoteSource>| sources.push((kind, source));

        add(DataKind::Info, Arc::new(uniprot::UniProtSource::new(client())));
        add(DataKind::Structure, Arc::new(pdb::RcsbPdbSource::new(client())));
        add(DataKind::Structure, Arc::new(alphafold::AlphaFoldSource::new(client())));
        add(DataKind::Interactions, Arc::new(string_db::StringSource::new(client())));
        if self.config.has_biogrid() {
            add(DataKind::Interactions, Arc::new(biogrid::BioGridSource::new(client())));
        }
        add(DataKind::Diseases, Arc::new(ctd::CtdSource::new(client())));
        add(DataKind::Drugs, Arc::new(chembl::ChemblSource::new(client())));
        add(DataKind::Variants, Arc::new(ensembl::EnsemblSource::new(client())));
        sources
    }
}

/// Relation sources below serve one relation kind of proteins only.
pub(crate) fn check_protein(
    source_name: &str,
    key: &EntityKey,
    kind: DataKind,
    serves: DataKind,
) -> Result<(), SourceError> {
    if kind == serves && key.kind == EntityKind::Protein {
        Ok(())
    } else {
        Err(unsupported(source_name, kind))
    }
}

pub(crate) fn unsupported(source_name: &str, kind: DataKind) -> SourceError {
    SourceError::Unsupported {
        source_name: source_name.to_string(),
        kind,
    }
}

/// Strip an isoform suffix: `P04637-2` -> `P04637`.
pub(crate) fn base_accession(id: &str) -> &str {
    id.split_once('-').map_or(id, |(base, _)| base)
}

// ── Closure adapter ────────────────────────────────────────────────

/// A [`RemoteSource`] backed by an async closure.
pub struct FnSource<F> {
    name: String,
    fetch: F,
}

impl<F, Fut> FnSource<F>
where
    F: Fn(EntityKey, DataKind) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Payload, SourceError>> + Send,
{
    pub fn new(name: impl Into<String>, fetch: F) -> Self {
        Self {
            name: name.into(),
            fetch,
        }
    }
}

#[async_trait]
impl<F, Fut> RemoteSource for FnSource<F>
where
    F: Fn(EntityKey, DataKind) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Payload, SourceError>> + Send,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(&self, key: &EntityKey, kind: DataKind) -> Result<Payload, SourceError> {
        (self.fetch)(key.clone(), kind).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use amino_core::PartialEntity;

    #[test]
    fn isoform_suffix_is_stripped() {
        assert_eq!(base_accession("P04637-2"), "P04637");
        assert_eq!(base_accession("P04637"), "P04637");
    }

    #[tokio::test]
    async fn fn_source_forwards_to_closure() {
        let source = FnSource::new("stub", |key: EntityKey, kind: DataKind| async move {
            assert_eq!(kind, DataKind::Info);
            Ok(Payload::Entity(
                PartialEntity::new(key).with("name", "p53"),
            ))
        });

        assert_eq!(source.name(), "stub");
        let payload = source
            .fetch(&EntityKey::protein("P04637"), DataKind::Info)
            .await
            .unwrap();
        assert_eq!(payload.as_entity().unwrap().get_str("name"), Some("p53"));
    }

    #[test]
    fn bundled_sources_follow_chain_order() {
        let client = Arc::new(SourceClient::new(&SourcesConfig::default(), "amino-test/0.1").unwrap());
        let names: Vec<(DataKind, String)> = client
            .bundled()
            .into_iter()
            .map(|(kind, source)| (kind, source.name().to_string()))
            .collect();
        assert_eq!(
            names,
            vec![
                (DataKind::Info, "uniprot".to_string()),
                (DataKind::Structure, "pdb".to_string()),
                (DataKind::Structure, "alphafold".to_string()),
                (DataKind::Interactions, "string".to_string()),
                (DataKind::Diseases, "ctd".to_string()),
                (DataKind::Drugs, "chembl".to_string()),
                (DataKind::Variants, "ensembl".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn known_gene_symbol_skips_the_lookup() {
        let client = SourceClient::new(&SourcesConfig::default(), "amino-test/0.1").unwrap();
        client
            .symbols
            .lock()
            .unwrap()
            .insert("P04637".to_string(), "TP53".to_string());

        let symbol = client.gene_symbol(&EntityKey::protein("P04637-2")).await.unwrap();
        assert_eq!(symbol.as_deref(), Some("TP53"));
    }

    #[test]
    fn biogrid_follows_string_when_keyed() {
        let config = SourcesConfig {
            biogrid_access_key: "bg-key".to_string(),
            ..SourcesConfig::default()
        };
        let client = Arc::new(SourceClient::new(&config, "amino-test/0.1").unwrap());
        let interactions: Vec<String> = client
            .bundled()
            .into_iter()
            .filter(|(kind, _)| *kind == DataKind::Interactions)
            .map(|(_, source)| source.name().to_string())
            .collect();
        assert_eq!(interactions, ["string", "biogrid"]);
    }

    #[tokio::test]
    async fn relation_sources_reject_other_kinds() {
        let client = Arc::new(SourceClient::new(&SourcesConfig::default(), "amino-test/0.1").unwrap());
        let p53 = EntityKey::protein("P04637");
        for (serves, source) in client.bundled() {
            if serves == DataKind::Info || serves == DataKind::Structure {
                continue;
            }
            let err = source.fetch(&p53, DataKind::Info).await.unwrap_err();
            assert!(matches!(err, SourceError::Unsupported { .. }), "{}", source.name());
        }
    }
}
