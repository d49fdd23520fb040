//! Bounded TTL cache with namespaced invalidation
//!
//! Memoizes the three cacheable exploration results (entry points, file
//! summaries, package APIs) behind blake3 query-shape keys, with
//! per-namespace reader/writer locks, oldest-by-creation eviction and
//! singleflight compute-if-absent wrappers.

pub mod cached;
pub mod key;
pub mod ttl_cache;

pub use cached::CachedExplorer;
pub use key::{digest, entry_point_key, file_summary_key, package_api_key};
pub use ttl_cache::{CacheConfig, CacheStats, ExplorationCache};
