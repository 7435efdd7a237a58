//! Remote source endpoints and request settings.

use std::time::Duration;

use serde::{Deserialize, Serialize};

fn default_uniprot_url() -> String {
    "https://rest.uniprot.org/uniprotkb".to_string()
}

fn default_alphafold_url() -> String {
    "https://alphafold.ebi.ac.uk/api".to_string()
}

fn default_pdb_url() -> String {
    "https://search.rcsb.org/rcsbsearch/v2".to_string()
}

fn default_string_url() -> String {
    "https://string-db.org/api".to_string()
}

fn default_biogrid_url() -> String {
    "https://webservice.thebiogrid.org".to_string()
}

fn default_ctd_url() -> String {
    "https://ctdbase.org/tools/batchQuery.go".to_string()
}

fn default_chembl_url() -> String {
    "https://www.ebi.ac.uk/chembl/api/data".to_string()
}

fn default_ensembl_url() -> String {
    "https://rest.ensembl.org".to_string()
}

fn default_ensembl_species() -> String {
    "homo_sapiens".to_string()
}

const fn default_timeout_secs() -> u64 {
    10
}

const fn default_species() -> u32 {
    9606
}

const fn default_required_score() -> u32 {
    700
}

const fn default_interaction_limit() -> u32 {
    10
}

const fn default_relation_limit() -> usize {
    20
}

const fn default_variant_limit() -> usize {
    50
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SourcesConfig {
    #[serde(default = "default_uniprot_url")]
    pub uniprot_url: String,

    #[serde(default = "default_alphafold_url")]
    pub alphafold_url: String,

    /// RCSB search API base.
    #[serde(default = "default_pdb_url")]
    pub pdb_url: String,

    #[serde(default = "default_string_url")]
    pub string_url: String,

    #[serde(default = "default_biogrid_url")]
    pub biogrid_url: String,

    /// `BioGRID` access key. The `BioGRID` interaction source is only
    /// registered when this is set.
    #[serde(default)]
    pub biogrid_access_key: String,

    /// CTD batch query endpoint.
    #[serde(default = "default_ctd_url")]
    pub ctd_url: String,

    #[serde(default = "default_chembl_url")]
    pub chembl_url: String,

    #[serde(default = "default_ensembl_url")]
    pub ensembl_url: String,

    /// Ensembl species name matching `species`.
    #[serde(default = "default_ensembl_species")]
    pub ensembl_species: String,

    /// HTTP timeout for every remote request.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// NCBI taxon id for interaction queries (9606 = human).
    #[serde(default = "default_species")]
    pub species: u32,

    /// Minimum STRING combined score, 0..=1000.
    #[serde(default = "default_required_score")]
    pub required_score: u32,

    #[serde(default = "default_interaction_limit")]
    pub interaction_limit: u32,

    /// Most disease or drug records kept per lookup.
    #[serde(default = "default_relation_limit")]
    pub relation_limit: usize,

    #[serde(default = "default_variant_limit")]
    pub variant_limit: usize,
}

impl SourcesConfig {
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    #[must_use]
    pub fn has_biogrid(&self) -> bool {
        !self.biogrid_access_key.trim().is_empty()
    }
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            uniprot_url: default_uniprot_url(),
            alphafold_url: default_alphafold_url(),
            pdb_url: default_pdb_url(),
            string_url: default_string_url(),
            biogrid_url: default_biogrid_url(),
            biogrid_access_key: String::new(),
            ctd_url: default_ctd_url(),
            chembl_url: default_chembl_url(),
            ensembl_url: default_ensembl_url(),
            ensembl_species: default_ensembl_species(),
            timeout_secs: default_timeout_secs(),
            species: default_species(),
            required_score: default_required_score(),
            interaction_limit: default_interaction_limit(),
            relation_limit: default_relation_limit(),
            variant_limit: default_variant_limit(),
        }
    }
}
