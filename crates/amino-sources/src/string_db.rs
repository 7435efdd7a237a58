//! STRING protein-protein interaction partners.

use std::sync::Arc;

use amino_core::{DataKind, EntityKey, EntityKind, Payload, RelationRecord};
use async_trait::async_trait;

use crate::http::{check_response, json_body};
use crate::{RemoteSource, SourceClient, SourceError, unsupported};

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct Partner {
    #[serde(rename = "stringId_A")]
    string_id_a: String,
    #[serde(rename = "stringId_B")]
    string_id_b: String,
    #[serde(rename = "preferredName_A", default)]
    preferred_name_a: String,
    #[serde(rename = "preferredName_B", default)]
    preferred_name_b: String,
    #[serde(default)]
    score: f64,
}

/// STRING reports combined scores either as `0..=1` or `0..=1000`.
fn normalize_score(score: f64) -> f64 {
    if score > 1.0 { score / 1000.0 } else { score }
}

fn to_records(partners: Vec<Partner>, query_id: &str) -> Vec<RelationRecord> {
    partners
        .into_iter()
        .filter(|p| {
            p.string_id_a != p.string_id_b
                && p.preferred_name_a != p.preferred_name_b
                && p.preferred_name_b != query_id
        })
        .map(|p| {
            let id = if p.preferred_name_b.is_empty() {
                p.string_id_b.clone()
            } else {
                p.preferred_name_b.clone()
            };
            RelationRecord::new(id)
                .named(p.preferred_name_b)
                .scored(normalize_score(p.score))
                .from_source("string")
                .with("string_id", p.string_id_b)
        })
        .collect()
}

impl SourceClient {
    /// Fetch interaction partners for a protein identifier.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the HTTP request fails, STRING returns a
    /// non-success status, or the response cannot be parsed.
    pub async fn fetch_string_partners(
        &self,
        identifier: &str,
    ) -> Result<Vec<RelationRecord>, SourceError> {
        let url = format!(
            "{}/json/interaction_partners?identifiers={}&species={}&required_score={}&limit={}",
            self.config.string_url.trim_end_matches('/'),
            urlencoding::encode(identifier),
            self.config.species,
            self.config.required_score,
            self.config.interaction_limit,
        );
        let Some(resp) = check_response(self.http.get(&url).send().await?).await? else {
            return Ok(Vec::new());
        };
        let partners: Vec<Partner> = json_body(resp).await?;
        Ok(to_records(partners, identifier))
    }
}

/// Protein-protein interactions from STRING.
pub struct StringSource {
    client: Arc<SourceClient>,
}

impl StringSource {
    #[must_use]
    pub const fn new(client: Arc<SourceClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl RemoteSource for StringSource {
    fn name(&self) -> &'static str {
        "string"
    }

    async fn fetch(&self, key: &EntityKey, kind: DataKind) -> Result<Payload, SourceError> {
        if kind != DataKind::Interactions || key.kind != EntityKind::Protein {
            return Err(unsupported(self.name(), kind));
        }
        let records = self.client.fetch_string_partners(&key.id).await?;
        Ok(Payload::Relations(records))
    }
}
