//! # amino-core
//!
//! Shared vocabulary for the AminoVerse resolution core.
//!
//! - Entity and data kinds with their string forms
//! - Partial entities with explicit merge semantics
//! - Resolved payload shapes (entity record, structure, relation list)
//! - Graph nodes, edges, and views
//! - Provenance tags and resolution results
//! - Cache key builders shared by every tier

pub mod entity;
pub mod enums;
pub mod errors;
pub mod graph;
pub mod keys;
pub mod payload;
pub mod resolution;

pub use entity::{EntityKey, PartialEntity};
pub use enums::{DataKind, EntityKind, StructureStatus};
pub use errors::CoreError;
pub use graph::{GraphEdge, GraphNode, GraphView};
pub use payload::{Payload, RelationRecord, StructureRecord};
pub use resolution::{Provenance, Resolution};
