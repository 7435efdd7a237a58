//! Entity kinds, data kinds, and structure availability.
//!
//! All enums use `snake_case` serialization. Parsing from strings is
//! case-insensitive and rejects unknown names with [`CoreError::InvalidKind`],
//! since an unknown kind always indicates a caller bug.

use std::fmt;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

// ---------------------------------------------------------------------------
// EntityKind
// ---------------------------------------------------------------------------

/// The kind of biological entity an identifier refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Protein,
    Disease,
    Drug,
    Variant,
    Pathway,
}

impl EntityKind {
    pub const ALL: [Self; 5] = [
        Self::Protein,
        Self::Disease,
        Self::Drug,
        Self::Variant,
        Self::Pathway,
    ];

    /// Return the string representation used in cache keys and SQL storage.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Protein => "protein",
            Self::Disease => "disease",
            Self::Drug => "drug",
            Self::Variant => "variant",
            Self::Pathway => "pathway",
        }
    }

    /// Node label used in graph views (`"Protein"`, `"Disease"`, ...).
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Protein => "Protein",
            Self::Disease => "Disease",
            Self::Drug => "Drug",
            Self::Variant => "Variant",
            Self::Pathway => "Pathway",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| CoreError::InvalidKind {
                field: "entity kind",
                value: s.to_string(),
                expected: join_names(Self::ALL.iter().map(|k| k.as_str())),
            })
    }
}

// ---------------------------------------------------------------------------
// DataKind
// ---------------------------------------------------------------------------

/// The facet of an entity a caller wants resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum DataKind {
    Info,
    Structure,
    Interactions,
    Diseases,
    Drugs,
    Variants,
}

impl DataKind {
    pub const ALL: [Self; 6] = [
        Self::Info,
        Self::Structure,
        Self::Interactions,
        Self::Diseases,
        Self::Drugs,
        Self::Variants,
    ];

    /// Relationship kinds, in the order a profile lists them.
    pub const RELATIONS: [Self; 4] = [
        Self::Interactions,
        Self::Diseases,
        Self::Drugs,
        Self::Variants,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Structure => "structure",
            Self::Interactions => "interactions",
            Self::Diseases => "diseases",
            Self::Drugs => "drugs",
            Self::Variants => "variants",
        }
    }

    /// Whether the resolved value is a list of relation records.
    #[must_use]
    pub const fn is_relation(self) -> bool {
        matches!(
            self,
            Self::Interactions | Self::Diseases | Self::Drugs | Self::Variants
        )
    }

    /// Kind of entity found at the far end of a relation.
    #[must_use]
    pub const fn related_kind(self) -> Option<EntityKind> {
        match self {
            Self::Interactions => Some(EntityKind::Protein),
            Self::Diseases => Some(EntityKind::Disease),
            Self::Drugs => Some(EntityKind::Drug),
            Self::Variants => Some(EntityKind::Variant),
            Self::Info | Self::Structure => None,
        }
    }

    /// Graph edge type that stores this relation.
    #[must_use]
    pub const fn edge_type(self) -> Option<&'static str> {
        match self {
            Self::Interactions => Some("INTERACTS_WITH"),
            Self::Diseases => Some("ASSOCIATED_WITH"),
            Self::Drugs => Some("TARGETS"),
            Self::Variants => Some("VARIANT_OF"),
            Self::Info | Self::Structure => None,
        }
    }

    /// Whether the stored edge points from the related entity to the subject.
    ///
    /// Drugs target proteins and variants are variants of proteins, so those
    /// edges run toward the protein.
    #[must_use]
    pub const fn edge_points_inward(self) -> bool {
        matches!(self, Self::Drugs | Self::Variants)
    }
}

impl fmt::Display for DataKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DataKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| CoreError::InvalidKind {
                field: "data kind",
                value: s.to_string(),
                expected: join_names(Self::ALL.iter().map(|k| k.as_str())),
            })
    }
}

// ---------------------------------------------------------------------------
// StructureStatus
// ---------------------------------------------------------------------------

/// Where a structure record came from, or that none exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum StructureStatus {
    /// Experimentally determined (X-ray, NMR, cryo-EM).
    Experimental,
    /// Computationally predicted model.
    Predicted,
    /// No structure is known.
    Unavailable,
}

impl StructureStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Experimental => "experimental",
            Self::Predicted => "predicted",
            Self::Unavailable => "unavailable",
        }
    }
}

impl fmt::Display for StructureStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn join_names<'a>(names: impl Iterator<Item = &'a str>) -> String {
    names.collect::<Vec<_>>().join(", ")
}
