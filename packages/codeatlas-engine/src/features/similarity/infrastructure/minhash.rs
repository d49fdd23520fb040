//! MinHash signatures for similarity estimation
//!
//! Broder's MinHash (1997): a fixed-length vector of minimum hash values
//! over a feature set; the position-wise agreement rate of two signatures
//! estimates the sets' Jaccard similarity.
//!
//! # Algorithm
//!
//! 1. Join features with `|` and shingle into k-grams (k=3 default)
//! 2. For each of H seeds, hash every shingle under seeded FNV-1a and keep
//!    the minimum (H=128 default)
//! 3. Similarity: fraction of positions where two signatures agree
//!
//! # Accuracy
//!
//! - H = 128 → standard error ≈ 1% on the Jaccard estimate
//! - H = 256 → standard error ≈ 0.5%
//!
//! FNV-1a is used instead of the std hasher because signatures must be
//! stable across processes and platforms.

// FNV-1a constants
const FNV_OFFSET: u64 = 14695981039346656037;
const FNV_PRIME: u64 = 1099511628211;

/// Hash bytes under FNV-1a, mixing in the seed bytes first so each seed
/// simulates an independent hash function.
pub fn fnv1a_seeded(seed: u64, data: &[u8]) -> u64 {
    let mut hash = FNV_OFFSET;
    for b in seed.to_le_bytes() {
        hash = (hash ^ b as u64).wrapping_mul(FNV_PRIME);
    }
    for &b in data {
        hash = (hash ^ b as u64).wrapping_mul(FNV_PRIME);
    }
    hash
}

/// Unseeded FNV-1a (band keys, token k-grams)
pub fn fnv1a(data: &[u8]) -> u64 {
    let mut hash = FNV_OFFSET;
    for &b in data {
        hash = (hash ^ b as u64).wrapping_mul(FNV_PRIME);
    }
    hash
}

/// Fixed-length vector of minimum hash values
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MinHashSignature {
    values: Vec<u64>,
}

impl MinHashSignature {
    /// Signature over string features joined with `|` and shingled into
    /// character k-grams.
    ///
    /// Empty input yields the all-max signature, which agrees only with
    /// other empty inputs.
    pub fn from_features(features: &[String], shingle_size: usize, num_hashes: usize) -> Self {
        let joined = features.join("|");
        if joined.is_empty() {
            return Self {
                values: vec![u64::MAX; num_hashes],
            };
        }

        let chars: Vec<char> = joined.chars().collect();
        let mut shingles: Vec<String> = Vec::new();
        if chars.len() < shingle_size {
            shingles.push(joined);
        } else {
            for window in chars.windows(shingle_size) {
                shingles.push(window.iter().collect());
            }
        }

        let mut values = vec![u64::MAX; num_hashes];
        for shingle in &shingles {
            let bytes = shingle.as_bytes();
            for (seed, slot) in values.iter_mut().enumerate() {
                let h = fnv1a_seeded(seed as u64, bytes);
                if h < *slot {
                    *slot = h;
                }
            }
        }

        Self { values }
    }

    /// Signature over pre-hashed features (token k-grams in the duplication
    /// detector). Each feature hash is re-hashed under every seed.
    pub fn from_hashed_features(features: &[u64], num_hashes: usize) -> Self {
        let mut values = vec![u64::MAX; num_hashes];
        for &feature in features {
            let bytes = feature.to_le_bytes();
            for (seed, slot) in values.iter_mut().enumerate() {
                let h = fnv1a_seeded(seed as u64, &bytes);
                if h < *slot {
                    *slot = h;
                }
            }
        }
        Self { values }
    }

    /// Estimate Jaccard similarity as the positional agreement rate.
    ///
    /// Both signatures must have the same length.
    pub fn jaccard_estimate(&self, other: &Self) -> f64 {
        debug_assert_eq!(
            self.values.len(),
            other.values.len(),
            "MinHash signatures must have the same number of hashes"
        );

        if self.values.is_empty() {
            return 0.0;
        }

        let matches = self
            .values
            .iter()
            .zip(&other.values)
            .filter(|(a, b)| a == b)
            .count();

        matches as f64 / self.values.len() as f64
    }

    pub fn num_hashes(&self) -> usize {
        self.values.len()
    }

    /// Raw hash values (band slicing in the LSH index)
    pub fn values(&self) -> &[u64] {
        &self.values
    }
}

// ============================================================================
// Tests
// ============================================================================
