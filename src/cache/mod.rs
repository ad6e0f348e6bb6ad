//! Caching subsystem.
//!
//! - [`key`] — freshness keys: `summary_<threadId>_<lastPostTimestamp>`.
//!   New replies change the key, which is the only invalidation mechanism.
//!
//! - [`summary::SummaryCache`] — bounded, TTL-based, in-memory map from
//!   freshness key to [`CacheEntry`]. See the [`summary`] module docs for the
//!   eviction and concurrency model.

pub mod key;
pub mod summary;

pub use key::{build_key, last_post_timestamp};
pub use summary::{CacheConfig, CacheEntry, SummaryCache};
