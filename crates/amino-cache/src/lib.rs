//! # amino-cache
//!
//! The short-term cache tier.
//!
//! [`KeyValueCache`] is what the resolver talks to: typed get/set with a
//! mandatory TTL, glob invalidation, and a hard latency bound on every call.
//! It absorbs all backend failures. Backends implement [`CacheBackend`]:
//!
//! - [`MemoryBackend`]: process-local map, lazy expiry
//! - [`LibsqlBackend`]: local libSQL file, shared across processes on one host

mod backend;
mod cache;
mod durable;
mod error;
mod memory;
mod pattern;

pub use backend::CacheBackend;
pub use cache::KeyValueCache;
pub use durable::LibsqlBackend;
pub use error::CacheError;
pub use memory::MemoryBackend;
pub use pattern::KeyPattern;
