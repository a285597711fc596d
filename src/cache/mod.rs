//! Tagged read-through caching for collection queries.
//!
//! List payloads are cached under a `"<collection>-<page>-<limit>"` key
//! and grouped by a collection tag. Any write to a collection
//! invalidates every cached window of that collection at once, so
//! writers never need to know which pagination windows readers have
//! materialized.
//!
//! Single-record lookups are intentionally not cached: list queries are
//! the repeated, expensive ones, while by-id reads are cheap and
//! near-unique.

mod config;
mod keys;
mod lock;
mod store;

pub use config::{CacheConfig, DEFAULT_ENTRY_LIMIT};
pub use keys::{CacheKey, CacheTag};
pub use store::{Loaded, TagCache};

pub(crate) use store::{METRIC_CACHE_HIT, METRIC_CACHE_INVALIDATED, METRIC_CACHE_MISS};
