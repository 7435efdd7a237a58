//! # amino-graph
//!
//! The persistent graph tier: a query interface returning typed nodes and
//! edges for an entity and its neighborhood, plus the write-through entry
//! points the resolver uses to promote remote results.
//!
//! - [`GraphStore`]: the adapter trait
//! - [`MemoryGraphStore`]: petgraph `DiGraph` behind a `RwLock`
//! - [`LibsqlGraphStore`]: `graph_nodes` / `graph_edges` tables in libSQL
//!
//! Every read is sanitized: no self-loops, no edges to missing nodes, no
//! repeated ids.

mod durable;
mod error;
mod memory;
mod neighborhood;
pub mod relations;
mod store;

pub use durable::LibsqlGraphStore;
pub use error::GraphError;
pub use memory::MemoryGraphStore;
pub use neighborhood::Neighborhood;
pub use store::{GraphStore, merge_properties};
