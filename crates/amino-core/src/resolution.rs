//! Provenance tags and resolution results.

use std::fmt;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::entity::{EntityKey, PartialEntity};
use crate::enums::DataKind;
use crate::errors::CoreError;
use crate::payload::Payload;

/// The tier that produced a value.
///
/// Serialized as `"cache"`, `"store"`, `"remote:<source>"`, or `"synthesized"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Provenance {
    Cache,
    Store,
    Remote(String),
    Synthesized,
}

impl Provenance {
    #[must_use]
    pub fn remote(source: impl Into<String>) -> Self {
        Self::Remote(source.into())
    }

    #[must_use]
    pub const fn is_remote(&self) -> bool {
        matches!(self, Self::Remote(_))
    }
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cache => f.write_str("cache"),
            Self::Store => f.write_str("store"),
            Self::Remote(source) => write!(f, "remote:{source}"),
            Self::Synthesized => f.write_str("synthesized"),
        }
    }
}

impl FromStr for Provenance {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cache" => Ok(Self::Cache),
            "store" => Ok(Self::Store),
            "synthesized" => Ok(Self::Synthesized),
            other => match other.strip_prefix("remote:") {
                Some(source) if !source.is_empty() => Ok(Self::Remote(source.to_string())),
                _ => Err(CoreError::InvalidKind {
                    field: "provenance",
                    value: other.to_string(),
                    expected: "cache, store, remote:<source>, synthesized".to_string(),
                }),
            },
        }
    }
}

impl From<Provenance> for String {
    fn from(value: Provenance) -> Self {
        value.to_string()
    }
}

impl TryFrom<String> for Provenance {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// The answer to `resolve(kind, id)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Resolution {
    pub key: EntityKey,
    pub kind: DataKind,
    pub payload: Payload,
    /// Tier that answered this call.
    #[schemars(with = "String")]
    pub provenance: Provenance,
    /// Tier that first produced the value. Differs from `provenance` on
    /// cache replays.
    #[schemars(with = "String")]
    pub origin: Provenance,
    /// True when the value is synthesized placeholder data.
    pub is_generated: bool,
}

impl Resolution {
    #[must_use]
    pub fn entity(&self) -> Option<&PartialEntity> {
        self.payload.as_entity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Provenance::Cache, "cache")]
    #[case(Provenance::Store, "store")]
    #[case(Provenance::remote("uniprot"), "remote:uniprot")]
    #[case(Provenance::Synthesized, "synthesized")]
    fn provenance_string_form(#[case] provenance: Provenance, #[case] expected: &str) {
        assert_eq!(provenance.to_string(), expected);
        let json = serde_json::to_string(&provenance).unwrap();
        assert_eq!(json, format!("\"{expected}\""));
        let back: Provenance = serde_json::from_str(&json).unwrap();
        assert_eq!(back, provenance);
    }

    #[rstest]
    #[case("remote:")]
    #[case("remote")]
    #[case("graph")]
    fn rejects_unknown_provenance(#[case] raw: &str) {
        assert!(raw.parse::<Provenance>().is_err());
    }
}
