//! Graph store configuration.

use serde::{Deserialize, Serialize};

use crate::cache::Backend;

fn default_store_path() -> String {
    ".aminoverse/graph.db".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: Backend,

    /// Database file for the `libsql` backend.
    #[serde(default = "default_store_path")]
    pub path: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: Backend::default(),
            path: default_store_path(),
        }
    }
}
