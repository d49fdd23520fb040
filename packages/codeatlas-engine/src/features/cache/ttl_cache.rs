//! TTL + bounded cache with namespaced invalidation
//!
//! Three namespaces (entry-point results, file summaries, package APIs),
//! each protected by its own reader/writer lock:
//! - hit path: read-lock lookup; an expired entry upgrades to a write lock
//!   for deletion and reports a miss,
//! - miss path: write-lock insert; when a namespace is full the
//!   oldest-by-creation entry is evicted under the same write lock.
//!
//! Invalidation is deliberately coarse for entry points: an entry-point
//! result may span files, so invalidating any file (or package) flushes the
//! whole entry-point namespace along with the targeted summary entry.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use ahash::AHashMap;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::key::{file_summary_key, package_api_key};
use crate::features::exploration::{EntryPointResult, FileSummary, PackageApi};

/// Cache bounds
#[derive(Debug, Clone, Copy)]
pub struct CacheConfig {
    /// Maximum entries per namespace
    pub max_size: usize,

    /// Per-entry time to live
    pub ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_size: 100,
            ttl: Duration::from_secs(300),
        }
    }
}

/// Aggregate cache counters
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CacheStats {
    pub entry_point_count: usize,
    pub file_summary_count: usize,
    pub package_api_count: usize,
    pub hits: u64,
    pub misses: u64,
    pub hit_rate: f64,
    pub max_size: usize,
    pub ttl_seconds: u64,
}

struct Entry<T> {
    value: T,
    created: Instant,
}

type Namespace<T> = RwLock<AHashMap<String, Entry<T>>>;

/// Bounded TTL cache over the three exploration result namespaces
pub struct ExplorationCache {
    config: CacheConfig,

    entry_points: Namespace<EntryPointResult>,
    file_summaries: Namespace<FileSummary>,
    package_apis: Namespace<PackageApi>,

    hits: AtomicU64,
    misses: AtomicU64,
}

impl ExplorationCache {
    pub fn new(config: CacheConfig) -> Self {
        Self {
            config,
            entry_points: RwLock::new(AHashMap::new()),
            file_summaries: RwLock::new(AHashMap::new()),
            package_apis: RwLock::new(AHashMap::new()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(CacheConfig::default())
    }

    pub fn config(&self) -> CacheConfig {
        self.config
    }

    // ── Namespace accessors ──────────────────────────────────────────────

    pub fn get_entry_points(&self, key: &str) -> Option<EntryPointResult> {
        self.get_in(&self.entry_points, key)
    }

    pub fn put_entry_points(&self, key: String, value: EntryPointResult) {
        self.put_in(&self.entry_points, key, value);
    }

    pub fn get_file_summary(&self, key: &str) -> Option<FileSummary> {
        self.get_in(&self.file_summaries, key)
    }

    pub fn put_file_summary(&self, key: String, value: FileSummary) {
        self.put_in(&self.file_summaries, key, value);
    }

    pub fn get_package_api(&self, key: &str) -> Option<PackageApi> {
        self.get_in(&self.package_apis, key)
    }

    pub fn put_package_api(&self, key: String, value: PackageApi) {
        self.put_in(&self.package_apis, key, value);
    }

    // ── Counter-free peeks (singleflight recheck path) ───────────────────

    pub(crate) fn peek_entry_points(&self, key: &str) -> Option<EntryPointResult> {
        self.peek_in(&self.entry_points, key)
    }

    pub(crate) fn peek_file_summary(&self, key: &str) -> Option<FileSummary> {
        self.peek_in(&self.file_summaries, key)
    }

    pub(crate) fn peek_package_api(&self, key: &str) -> Option<PackageApi> {
        self.peek_in(&self.package_apis, key)
    }

    // ── Invalidation ─────────────────────────────────────────────────────

    /// Drop the file's summary entry and flush the entire entry-point
    /// namespace (entry points may span files).
    pub fn invalidate_file(&self, file_path: &str) {
        self.file_summaries.write().remove(&file_summary_key(file_path));
        self.entry_points.write().clear();
        debug!(file_path, "cache invalidated for file");
    }

    /// Drop the package's API entry and flush the entry-point namespace.
    pub fn invalidate_package(&self, package: &str) {
        self.package_apis.write().remove(&package_api_key(package));
        self.entry_points.write().clear();
        debug!(package, "cache invalidated for package");
    }

    /// Drop every namespace.
    pub fn clear(&self) {
        self.entry_points.write().clear();
        self.file_summaries.write().clear();
        self.package_apis.write().clear();
    }

    // ── Stats ────────────────────────────────────────────────────────────

    pub fn stats(&self) -> CacheStats {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let total = hits + misses;
        let hit_rate = if total == 0 {
            0.0
        } else {
            hits as f64 / total as f64
        };

        CacheStats {
            entry_point_count: self.entry_points.read().len(),
            file_summary_count: self.file_summaries.read().len(),
            package_api_count: self.package_apis.read().len(),
            hits,
            misses,
            hit_rate,
            max_size: self.config.max_size,
            ttl_seconds: self.config.ttl.as_secs(),
        }
    }

    // ── Internals ────────────────────────────────────────────────────────

    fn get_in<T: Clone>(&self, namespace: &Namespace<T>, key: &str) -> Option<T> {
        {
            let guard = namespace.read();
            match guard.get(key) {
                Some(entry) if entry.created.elapsed() < self.config.ttl => {
                    self.hits.fetch_add(1, Ordering::Relaxed);
                    return Some(entry.value.clone());
                }
                Some(_) => { /* expired: upgrade below */ }
                None => {
                    self.misses.fetch_add(1, Ordering::Relaxed);
                    return None;
                }
            }
        }

        // Expired entry: delete under the write lock, re-checking the age
        // in case a writer replaced it in between.
        let mut guard = namespace.write();
        let state = guard
            .get(key)
            .map(|entry| entry.created.elapsed() >= self.config.ttl);
        match state {
            Some(true) => {
                guard.remove(key);
            }
            Some(false) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                return guard.get(key).map(|entry| entry.value.clone());
            }
            None => {}
        }
        self.misses.fetch_add(1, Ordering::Relaxed);
        None
    }

    /// TTL-respecting lookup that touches neither counters nor expired
    /// entries. Used by the singleflight recheck, whose fast-path `get`
    /// already accounted for the miss.
    fn peek_in<T: Clone>(&self, namespace: &Namespace<T>, key: &str) -> Option<T> {
        let guard = namespace.read();
        guard
            .get(key)
            .filter(|entry| entry.created.elapsed() < self.config.ttl)
            .map(|entry| entry.value.clone())
    }

    fn put_in<T>(&self, namespace: &Namespace<T>, key: String, value: T) {
        let mut guard = namespace.write();

        if guard.len() >= self.config.max_size && !guard.contains_key(&key) {
            // Evict the oldest-by-creation entry.
            if let Some(oldest) = guard
                .iter()
                .min_by_key(|(_, entry)| entry.created)
                .map(|(k, _)| k.clone())
            {
                guard.remove(&oldest);
            }
        }

        guard.insert(
            key,
            Entry {
                value,
                created: Instant::now(),
            },
        );
    }
}

impl Default for ExplorationCache {
    fn default() -> Self {
        Self::with_defaults()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn entry_point_result(n: usize) -> EntryPointResult {
        EntryPointResult {
            entry_points: Vec::new(),
            total_found: n,
            truncated: false,
        }
    }

    fn summary(path: &str) -> FileSummary {
        FileSummary {
            file_path: path.to_string(),
            purpose: String::new(),
            imports: Vec::new(),
            types: Vec::new(),
            functions: Vec::new(),
            symbol_count: 0,
        }
    }

    #[test]
    fn test_set_then_get_within_ttl() {
        let cache = ExplorationCache::with_defaults();
        cache.put_entry_points("k1".to_string(), entry_point_result(3));

        let got = cache.get_entry_points("k1").unwrap();
        assert_eq!(got.total_found, 3);
        assert_eq!(cache.stats().hits, 1);
    }

    #[test]
    fn test_expired_entry_is_deleted_and_misses() {
        let cache = ExplorationCache::new(CacheConfig {
            max_size: 100,
            ttl: Duration::from_millis(5),
        });
        cache.put_entry_points("k1".to_string(), entry_point_result(1));

        std::thread::sleep(Duration::from_millis(20));

        assert!(cache.get_entry_points("k1").is_none());
        assert_eq!(cache.stats().entry_point_count, 0);
        assert_eq!(cache.stats().misses, 1);
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let cache = ExplorationCache::new(CacheConfig {
            max_size: 3,
            ttl: Duration::from_secs(300),
        });

        for i in 0..3 {
            cache.put_entry_points(format!("k{}", i), entry_point_result(i));
            // Distinct creation instants
            std::thread::sleep(Duration::from_millis(2));
        }
        cache.put_entry_points("k3".to_string(), entry_point_result(3));

        let stats = cache.stats();
        assert_eq!(stats.entry_point_count, 3);
        assert!(cache.get_entry_points("k0").is_none(), "oldest entry must be evicted");
        assert!(cache.get_entry_points("k3").is_some());
    }

    #[test]
    fn test_invalidate_file_clears_summary_and_entry_points() {
        let cache = ExplorationCache::with_defaults();
        cache.put_file_summary(super::super::key::file_summary_key("a.go"), summary("a.go"));
        cache.put_file_summary(super::super::key::file_summary_key("b.go"), summary("b.go"));
        cache.put_entry_points("ep".to_string(), entry_point_result(1));

        cache.invalidate_file("a.go");

        let stats = cache.stats();
        assert_eq!(stats.file_summary_count, 1, "only a.go's summary drops");
        assert_eq!(stats.entry_point_count, 0, "entry-point namespace flushes");
    }

    #[test]
    fn test_invalidate_package() {
        let cache = ExplorationCache::with_defaults();
        cache.put_package_api(
            super::super::key::package_api_key("svc"),
            PackageApi {
                package: "svc".to_string(),
                files: Vec::new(),
                types: Vec::new(),
                functions: Vec::new(),
                constants: Vec::new(),
            },
        );
        cache.put_entry_points("ep".to_string(), entry_point_result(1));

        cache.invalidate_package("svc");

        let stats = cache.stats();
        assert_eq!(stats.package_api_count, 0);
        assert_eq!(stats.entry_point_count, 0);
    }

    #[test]
    fn test_clear_drops_all_namespaces() {
        let cache = ExplorationCache::with_defaults();
        cache.put_entry_points("a".to_string(), entry_point_result(1));
        cache.put_file_summary("b".to_string(), summary("b.go"));

        cache.clear();

        let stats = cache.stats();
        assert_eq!(stats.entry_point_count, 0);
        assert_eq!(stats.file_summary_count, 0);
    }

    #[test]
    fn test_hit_rate() {
        let cache = ExplorationCache::with_defaults();
        cache.put_entry_points("a".to_string(), entry_point_result(1));

        cache.get_entry_points("a"); // hit
        cache.get_entry_points("missing"); // miss

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert!((stats.hit_rate - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_size_never_exceeds_max() {
        let cache = ExplorationCache::new(CacheConfig {
            max_size: 5,
            ttl: Duration::from_secs(300),
        });
        for i in 0..50 {
            cache.put_entry_points(format!("k{}", i), entry_point_result(i));
        }
        assert!(cache.stats().entry_point_count <= 5);
    }
}
