//! Banded LSH index over MinHash signatures
//!
//! The signature is split into `num_bands` slices of `band_size` values;
//! each slice is FNV-hashed into a 64-bit bucket key and the symbol ID is
//! recorded in that band's bucket. Two items are candidates when they
//! collide in at least one band, which makes near-duplicate lookup
//! sub-linear in corpus size.
//!
//! # Tuning
//!
//! For a true Jaccard similarity t, the probability of becoming a candidate
//! is `1 - (1 - t^band_size)^num_bands`. The similarity at which that
//! probability crosses 50% is approximately
//! `(1 - 0.5^(1/num_bands))^(1/band_size)`. Callers choose the band shape
//! with this curve in mind (16×8 ≈ t 0.5; 20×5 ≈ t 0.8 is used by the
//! duplication detector).

use ahash::{AHashMap, AHashSet};

use super::minhash::{fnv1a, MinHashSignature};
use crate::shared::models::SymbolId;

/// Banded LSH bucket set, built once and queried concurrently
#[derive(Debug)]
pub struct LshIndex {
    num_bands: usize,
    band_size: usize,

    /// Per band: 64-bit band hash → set of symbol IDs
    buckets: Vec<AHashMap<u64, AHashSet<SymbolId>>>,

    entries: usize,
}

impl LshIndex {
    pub fn new(num_bands: usize, band_size: usize) -> Self {
        Self {
            num_bands,
            band_size,
            buckets: vec![AHashMap::new(); num_bands],
            entries: 0,
        }
    }

    /// Insert a signature. Re-inserting the same (id, signature) pair is
    /// idempotent in outcome because buckets are sets.
    pub fn insert(&mut self, id: &SymbolId, signature: &MinHashSignature) {
        debug_assert_eq!(
            signature.num_hashes(),
            self.num_bands * self.band_size,
            "signature length must match num_bands × band_size"
        );

        for band_idx in 0..self.num_bands {
            let key = self.band_key(signature, band_idx);
            self.buckets[band_idx]
                .entry(key)
                .or_insert_with(AHashSet::new)
                .insert(id.clone());
        }
        self.entries += 1;
    }

    /// Candidate IDs sharing at least one band bucket with the query,
    /// ranked by number of matching bands (descending, ties by ID) and
    /// truncated to `limit`. The query's own ID is never returned.
    pub fn query(
        &self,
        query_id: &SymbolId,
        signature: &MinHashSignature,
        limit: usize,
    ) -> Vec<SymbolId> {
        let mut band_matches: AHashMap<&SymbolId, usize> = AHashMap::new();

        for band_idx in 0..self.num_bands {
            let key = self.band_key(signature, band_idx);
            if let Some(bucket) = self.buckets[band_idx].get(&key) {
                for id in bucket {
                    if id != query_id {
                        *band_matches.entry(id).or_insert(0) += 1;
                    }
                }
            }
        }

        let mut ranked: Vec<(&SymbolId, usize)> = band_matches.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        ranked.into_iter().take(limit).map(|(id, _)| id.clone()).collect()
    }

    /// Number of inserted signatures (including re-inserts)
    pub fn len(&self) -> usize {
        self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries == 0
    }

    pub fn stats(&self) -> LshStats {
        let total_buckets = self.buckets.iter().map(|band| band.len()).sum();
        let max_bucket_size = self
            .buckets
            .iter()
            .flat_map(|band| band.values())
            .map(|bucket| bucket.len())
            .max()
            .unwrap_or(0);

        LshStats {
            num_bands: self.num_bands,
            band_size: self.band_size,
            total_buckets,
            entries: self.entries,
            max_bucket_size,
        }
    }

    fn band_key(&self, signature: &MinHashSignature, band_idx: usize) -> u64 {
        let start = band_idx * self.band_size;
        let band = &signature.values()[start..start + self.band_size];

        let mut bytes = Vec::with_capacity(self.band_size * 8);
        for &value in band {
            bytes.extend_from_slice(&value.to_le_bytes());
        }
        fnv1a(&bytes)
    }
}

/// LSH index statistics
#[derive(Debug, Clone, Copy)]
pub struct LshStats {
    pub num_bands: usize,
    pub band_size: usize,
    pub total_buckets: usize,
    pub entries: usize,
    pub max_bucket_size: usize,
}

// ============================================================================
// Tests
// ============================================================================
