//! # amino-config
//!
//! Layered configuration loading for AminoVerse using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`AMINO_*` prefix, `__` as separator)
//! 2. Project-level `.aminoverse/config.toml`
//! 3. User-level `~/.config/aminoverse/config.toml`
//! 4. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! Figment maps `AMINO_TTL__INFO_SECS` -> `ttl.info_secs`,
//! `AMINO_LLM__API_KEY` -> `llm.api_key`, etc.
//!
//! # Usage
//!
//! ```no_run
//! use amino_config::AminoConfig;
//!
//! let config = AminoConfig::load_with_dotenv().expect("config");
//! if config.llm.is_configured() {
//!     println!("generative fallback via {}", config.llm.model);
//! }
//! ```

mod cache;
mod error;
mod general;
mod llm;
mod resolver;
mod sources;
mod store;

pub use cache::{Backend, CacheConfig, MAX_NEGATIVE_SECS, TtlConfig};
pub use error::ConfigError;
pub use general::GeneralConfig;
pub use llm::LlmConfig;
pub use resolver::ResolverConfig;
pub use sources::SourcesConfig;
pub use store::StoreConfig;

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AminoConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub ttl: TtlConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub sources: SourcesConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub resolver: ResolverConfig,
}

impl AminoConfig {
    /// Load configuration from all sources (TOML files + environment variables).
    ///
    /// Does NOT call `dotenvy`; use [`Self::load_with_dotenv`] for `.env` support.
    pub fn load() -> Result<Self, ConfigError> {
        Self::extract(Self::figment())
    }

    /// Load configuration with `.env` file support.
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::load()
    }

    /// Load with an explicit TOML file layered above the project file.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::InvalidValue {
                field: "config".to_string(),
                reason: format!("{} does not exist", path.display()),
            });
        }
        let figment = Self::figment()
            .merge(Toml::file(path))
            .merge(Env::prefixed("AMINO_").split("__"));
        Self::extract(figment)
    }

    /// Build the figment provider chain.
    ///
    /// Public so tests can inspect the figment or layer providers on top.
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(global_path) = Self::global_config_path()
            && global_path.exists()
        {
            figment = figment.merge(Toml::file(global_path));
        }

        let local_path = PathBuf::from(".aminoverse/config.toml");
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        figment.merge(Env::prefixed("AMINO_").split("__"))
    }

    /// Check cross-field constraints that serde defaults cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.ttl.validate()?;
        if self.resolver.graph_depth == 0 {
            return Err(ConfigError::InvalidValue {
                field: "resolver.graph_depth".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    fn extract(figment: Figment) -> Result<Self, ConfigError> {
        let config: Self = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("aminoverse").join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = AminoConfig::default();
        assert!(config.validate().is_ok());
        assert!(!config.llm.is_configured());
        assert_eq!(config.cache.backend, Backend::Memory);
        assert_eq!(config.resolver.graph_depth, 2);
    }

    #[test]
    fn figment_builds_without_files() {
        let config: AminoConfig = AminoConfig::figment()
            .extract()
            .expect("should extract defaults");
        assert_eq!(config.general.project_name, "AminoVerse");
        assert_eq!(config.sources.species, 9606);
    }

    #[test]
    fn zero_depth_is_rejected() {
        let mut config = AminoConfig::default();
        config.resolver.graph_depth = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { .. })
        ));
    }
}
