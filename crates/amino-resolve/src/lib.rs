//! # amino-resolve
//!
//! Tiered resolution of biological entity data.
//!
//! A [`Resolver`] answers three questions for callers that only want an
//! answer, never an error:
//!
//! - [`Resolver::resolve`]: one kind of data for one entity, walked through
//!   cache, graph store, remote sources, the generative tier, and finally an
//!   explicit absence. Concurrent identical requests share one walk.
//! - [`Resolver::get_entity_graph`]: a bounded-depth subgraph, replaced by a
//!   flagged demo graph when the real one is too thin to draw.
//! - [`Resolver::invalidate`]: evict everything cached about an entity.
//!
//! Every answer carries its [`amino_core::Provenance`] and whether it was
//! generated rather than sourced.

mod chain;
mod envelope;
mod error;
mod flight;
mod invalidation;
mod policy;
mod resolver;
mod subgraph;
mod synth;

pub use envelope::CacheEnvelope;
pub use error::ResolveError;
pub use flight::{FlightError, SingleFlight};
pub use policy::{ResolverPolicy, TtlPolicy};
pub use resolver::{Profile, Resolver, ResolverBuilder};
pub use subgraph::SubgraphBuilder;
pub use synth::{FallbackSynthesizer, GENERATED_SOURCE};
