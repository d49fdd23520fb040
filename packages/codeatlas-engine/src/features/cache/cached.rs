//! Compute-if-absent wrappers around the explorer
//!
//! Each lookup checks its cache namespace first; a miss computes through
//! the underlying engine inside a singleflight guard, so concurrent
//! identical queries share one computation, then stores the result.
//! Errors are never cached: a failing query recomputes on the next call.

use super::key::{entry_point_key, file_summary_key, package_api_key};
use super::ttl_cache::{CacheConfig, CacheStats, ExplorationCache};
use crate::features::exploration::{
    EntryPointQuery, EntryPointResult, Explorer, FileSummary, PackageApi, Singleflight,
};
use crate::shared::cancel::CancellationToken;
use crate::shared::models::Result;

/// Explorer with memoized entry-point / summary / package-API queries
pub struct CachedExplorer {
    explorer: Explorer,
    cache: ExplorationCache,
    flight: Singleflight<String>,
}

impl CachedExplorer {
    pub fn new(explorer: Explorer, config: CacheConfig) -> Self {
        Self {
            explorer,
            cache: ExplorationCache::new(config),
            flight: Singleflight::new(),
        }
    }

    pub fn with_defaults(explorer: Explorer) -> Self {
        Self::new(explorer, CacheConfig::default())
    }

    /// The uncached explorer (data flow and similarity pass straight
    /// through; their results depend on per-call bounds).
    pub fn explorer(&self) -> &Explorer {
        &self.explorer
    }

    pub fn entry_points(
        &self,
        query: &EntryPointQuery,
        token: &CancellationToken,
    ) -> Result<EntryPointResult> {
        let key = entry_point_key(query);
        if let Some(hit) = self.cache.get_entry_points(&key) {
            return Ok(hit);
        }

        self.flight.run(
            key.clone(),
            || self.cache.peek_entry_points(&key).map(Ok),
            || {
                let result = self.explorer.entry_points(query, token)?;
                self.cache.put_entry_points(key.clone(), result.clone());
                Ok(result)
            },
        )
    }

    pub fn file_summary(&self, file_path: &str) -> Result<FileSummary> {
        let key = file_summary_key(file_path);
        if let Some(hit) = self.cache.get_file_summary(&key) {
            return Ok(hit);
        }

        self.flight.run(
            key.clone(),
            || self.cache.peek_file_summary(&key).map(Ok),
            || {
                let result = self.explorer.file_summary(file_path)?;
                self.cache.put_file_summary(key.clone(), result.clone());
                Ok(result)
            },
        )
    }

    pub fn package_api(&self, package: &str) -> Result<PackageApi> {
        let key = package_api_key(package);
        if let Some(hit) = self.cache.get_package_api(&key) {
            return Ok(hit);
        }

        self.flight.run(
            key.clone(),
            || self.cache.peek_package_api(&key).map(Ok),
            || {
                let result = self.explorer.package_api(package)?;
                self.cache.put_package_api(key.clone(), result.clone());
                Ok(result)
            },
        )
    }

    pub fn invalidate_file(&self, file_path: &str) {
        self.cache.invalidate_file(file_path);
    }

    pub fn invalidate_package(&self, package: &str) {
        self.cache.invalidate_package(package);
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::symbol_graph::CodeGraph;
    use crate::shared::models::{Symbol, SymbolKind};
    use std::sync::Arc;

    fn cached_explorer() -> CachedExplorer {
        let mut graph = CodeGraph::new();
        graph
            .add_symbol(
                Symbol::new("main", SymbolKind::Function, "go", "cmd/main.go", 1, 10)
                    .with_package("main"),
            )
            .unwrap();
        graph
            .add_symbol(
                Symbol::new("helper", SymbolKind::Function, "go", "util/a.go", 1, 5)
                    .with_package("util")
                    .with_signature("func helper() int"),
            )
            .unwrap();
        graph.freeze();

        CachedExplorer::with_defaults(Explorer::new(Arc::new(graph)).unwrap())
    }

    #[test]
    fn test_miss_compute_store_then_hit() {
        let cached = cached_explorer();
        let token = CancellationToken::new();
        let query = EntryPointQuery::default();

        let first = cached.entry_points(&query, &token).unwrap();
        assert_eq!(cached.cache_stats().misses, 1);

        let second = cached.entry_points(&query, &token).unwrap();
        assert_eq!(first.total_found, second.total_found);
        assert_eq!(cached.cache_stats().hits, 1);
        assert_eq!(cached.cache_stats().entry_point_count, 1);
    }

    #[test]
    fn test_errors_are_not_cached() {
        let cached = cached_explorer();

        assert!(cached.file_summary("missing.go").is_err());
        assert_eq!(cached.cache_stats().file_summary_count, 0);

        // Still errors (and still recomputes) on the next call.
        assert!(cached.file_summary("missing.go").is_err());
    }

    #[test]
    fn test_invalidate_file_forces_recompute_and_flushes_entry_points() {
        let cached = cached_explorer();
        let token = CancellationToken::new();
        let query = EntryPointQuery::default();

        cached.file_summary("util/a.go").unwrap();
        cached.entry_points(&query, &token).unwrap();
        assert_eq!(cached.cache_stats().file_summary_count, 1);
        assert_eq!(cached.cache_stats().entry_point_count, 1);

        cached.invalidate_file("util/a.go");

        assert_eq!(cached.cache_stats().file_summary_count, 0);
        assert_eq!(cached.cache_stats().entry_point_count, 0);

        // A prior entry-point hit becomes a miss after the invalidation.
        let misses_before = cached.cache_stats().misses;
        cached.entry_points(&query, &token).unwrap();
        assert_eq!(cached.cache_stats().misses, misses_before + 1);
    }

    #[test]
    fn test_package_api_caching() {
        let cached = cached_explorer();

        cached.package_api("util").unwrap();
        cached.package_api("util").unwrap();

        let stats = cached.cache_stats();
        assert_eq!(stats.package_api_count, 1);
        assert_eq!(stats.hits, 1);
    }
}
