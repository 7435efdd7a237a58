//! Environment variables beat every file layer.

use amino_config::{AminoConfig, Backend};
use figment::Jail;

#[test]
fn env_overrides_nested_fields() {
    Jail::expect_with(|jail| {
        jail.set_env("AMINO_TTL__INFO_SECS", "120");
        jail.set_env("AMINO_CACHE__BACKEND", "libsql");
        jail.set_env("AMINO_LLM__API_KEY", "env-key");

        let config = AminoConfig::load().expect("config loads");
        assert_eq!(config.ttl.info_secs, 120);
        assert_eq!(config.cache.backend, Backend::Libsql);
        assert!(config.llm.is_configured());
        Ok(())
    });
}

#[test]
fn env_beats_project_file() {
    Jail::expect_with(|jail| {
        jail.create_dir(".aminoverse")?;
        jail.create_file(
            ".aminoverse/config.toml",
            r#"
[resolver]
graph_depth = 1
"#,
        )?;
        jail.set_env("AMINO_RESOLVER__GRAPH_DEPTH", "4");

        let config = AminoConfig::load().expect("config loads");
        assert_eq!(config.resolver.graph_depth, 4);
        Ok(())
    });
}

#[test]
fn env_beats_explicit_file() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "custom.toml",
            r#"
[sources]
timeout_secs = 30
"#,
        )?;
        jail.set_env("AMINO_SOURCES__TIMEOUT_SECS", "5");

        let config = AminoConfig::load_from(std::path::Path::new("custom.toml"))
            .expect("config loads");
        assert_eq!(config.sources.timeout_secs, 5);
        Ok(())
    });
}

#[test]
fn biogrid_is_enabled_by_its_access_key() {
    Jail::expect_with(|jail| {
        let config = AminoConfig::load().expect("config loads");
        assert!(!config.sources.has_biogrid());

        jail.set_env("AMINO_SOURCES__BIOGRID_ACCESS_KEY", "bg-key");
        let config = AminoConfig::load().expect("config loads");
        assert!(config.sources.has_biogrid());
        assert_eq!(config.sources.ensembl_species, "homo_sapiens");
        Ok(())
    });
}
