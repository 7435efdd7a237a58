//! Config loading and tier wiring.

use std::path::Path;
use std::sync::Arc;

use amino_cache::{KeyValueCache, LibsqlBackend};
use amino_config::{AminoConfig, Backend, CacheConfig, StoreConfig};
use amino_graph::{GraphStore, LibsqlGraphStore, MemoryGraphStore};
use amino_llm::GeminiClient;
use amino_resolve::{Resolver, ResolverPolicy};
use amino_sources::SourceClient;
use anyhow::Context;

pub fn load_config(explicit: Option<&Path>) -> anyhow::Result<AminoConfig> {
    match explicit {
        Some(path) => AminoConfig::load_from(path)
            .with_context(|| format!("failed to load config from {}", path.display())),
        None => AminoConfig::load_with_dotenv().context("failed to load configuration"),
    }
}

fn ensure_parent(path: &str) -> anyhow::Result<()> {
    if let Some(parent) = Path::new(path).parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.display()))?;
    }
    Ok(())
}

pub async fn open_cache(config: &CacheConfig) -> anyhow::Result<KeyValueCache> {
    match config.backend {
        Backend::Memory => Ok(KeyValueCache::in_memory(config.op_timeout())),
        Backend::Libsql => {
            ensure_parent(&config.path)?;
            let backend = LibsqlBackend::open_local(&config.path)
                .await
                .with_context(|| format!("failed to open cache database at {}", config.path))?;
            Ok(KeyValueCache::new(Arc::new(backend), config.op_timeout()))
        }
    }
}

pub async fn open_store(config: &StoreConfig) -> anyhow::Result<Arc<dyn GraphStore>> {
    match config.backend {
        Backend::Memory => Ok(Arc::new(MemoryGraphStore::new())),
        Backend::Libsql => {
            ensure_parent(&config.path)?;
            let store = LibsqlGraphStore::open_local(&config.path)
                .await
                .with_context(|| format!("failed to open graph database at {}", config.path))?;
            Ok(Arc::new(store))
        }
    }
}

pub async fn build_resolver(config: &AminoConfig) -> anyhow::Result<Resolver> {
    let cache = open_cache(&config.cache).await?;
    let store = open_store(&config.store).await?;

    let user_agent = format!("{}/{}", config.general.project_name, env!("CARGO_PKG_VERSION"));
    let client = Arc::new(SourceClient::new(&config.sources, &user_agent).context("failed to build HTTP client")?);

    let mut builder = Resolver::builder(cache, store)
        .sources(client.bundled())
        .policy(ResolverPolicy::from_config(config));

    if config.llm.is_configured() {
        let gemini = GeminiClient::new(&config.llm).context("failed to build LLM client")?;
        builder = builder.generator(Arc::new(gemini));
    } else {
        tracing::info!("no LLM api key configured, generative fallback disabled");
    }

    Ok(builder.build())
}
