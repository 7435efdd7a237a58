//! General application configuration.

use serde::{Deserialize, Serialize};

fn default_project_name() -> String {
    "AminoVerse".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GeneralConfig {
    /// Name used in user agents and log lines.
    #[serde(default = "default_project_name")]
    pub project_name: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            project_name: default_project_name(),
        }
    }
}
