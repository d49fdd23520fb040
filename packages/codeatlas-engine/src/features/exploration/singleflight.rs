//! Singleflight guard
//!
//! Collapses concurrent computations for the same key: the first caller
//! acquires the key's guard and computes; latecomers block on the same
//! guard and, once it is released, re-check the cache before computing.
//! Guards are per-key mutexes tracked in a concurrent map and removed when
//! the last holder drops.

use std::hash::Hash;
use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::Mutex;

/// Per-key execution collapser
#[derive(Debug, Default)]
pub struct Singleflight<K: Eq + Hash + Clone> {
    inflight: DashMap<K, Arc<Mutex<()>>>,
}

impl<K: Eq + Hash + Clone> Singleflight<K> {
    pub fn new() -> Self {
        Self {
            inflight: DashMap::new(),
        }
    }

    /// Run `compute` while holding the key's guard.
    ///
    /// `recheck` runs after the guard is acquired; when it produces a value
    /// (another flight already filled the cache) `compute` is skipped.
    pub fn run<T>(
        &self,
        key: K,
        recheck: impl FnOnce() -> Option<T>,
        compute: impl FnOnce() -> T,
    ) -> T {
        let guard = self
            .inflight
            .entry(key.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();

        let result = {
            let _held = guard.lock();
            match recheck() {
                Some(value) => value,
                None => compute(),
            }
        };

        // Drop the map entry once no other flight holds it.
        if Arc::strong_count(&guard) <= 2 {
            self.inflight.remove_if(&key, |_, v| Arc::strong_count(v) <= 2);
        }
        result
    }

    /// Number of keys currently tracked (diagnostics)
    pub fn inflight_keys(&self) -> usize {
        self.inflight.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_compute_runs_when_recheck_misses() {
        let flight: Singleflight<String> = Singleflight::new();
        let value = flight.run("k".to_string(), || None, || 42);
        assert_eq!(value, 42);
        assert_eq!(flight.inflight_keys(), 0);
    }

    #[test]
    fn test_recheck_short_circuits() {
        let flight: Singleflight<String> = Singleflight::new();
        let computed = AtomicUsize::new(0);
        let value = flight.run(
            "k".to_string(),
            || Some(7),
            || {
                computed.fetch_add(1, Ordering::SeqCst);
                42
            },
        );
        assert_eq!(value, 7);
        assert_eq!(computed.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_concurrent_callers_share_one_computation() {
        use std::sync::atomic::AtomicUsize;

        let flight: Arc<Singleflight<String>> = Arc::new(Singleflight::new());
        let computations = Arc::new(AtomicUsize::new(0));
        let cache: Arc<Mutex<Option<usize>>> = Arc::new(Mutex::new(None));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let flight = Arc::clone(&flight);
                let computations = Arc::clone(&computations);
                let cache = Arc::clone(&cache);
                std::thread::spawn(move || {
                    flight.run(
                        "key".to_string(),
                        {
                            let cache = Arc::clone(&cache);
                            move || *cache.lock()
                        },
                        move || {
                            computations.fetch_add(1, Ordering::SeqCst);
                            std::thread::sleep(std::time::Duration::from_millis(10));
                            let value = 99;
                            *cache.lock() = Some(value);
                            value
                        },
                    )
                })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), 99);
        }
        assert_eq!(computations.load(Ordering::SeqCst), 1);
    }
}
