//! Similarity engine configuration

use serde::{Deserialize, Serialize};

use crate::shared::models::{EngineError, Result};

/// Similarity engine options
///
/// `num_bands × band_size` must equal `num_hashes`. For a Jaccard threshold
/// t, the probability of two items becoming candidates in at least one band
/// is `1 - (1 - t^band_size)^num_bands`; the threshold at which that
/// probability crosses 50% is approximately
/// `(1 - 0.5^(1/num_bands))^(1/band_size)`.
///
/// | Threshold | num_bands | band_size |
/// |-----------|-----------|-----------|
/// | t ≈ 0.3   | 32        | 4         |
/// | t ≈ 0.5   | 16        | 8         |
/// | t ≈ 0.7   | 8         | 16        |
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimilarityConfig {
    /// Number of MinHash functions (signature length)
    pub num_hashes: usize,

    /// Character k-gram size for feature shingling
    pub shingle_size: usize,

    /// Include abstracted callee patterns in the feature set
    pub include_call_pattern: bool,

    pub num_bands: usize,
    pub band_size: usize,

    /// Results below this exact similarity are dropped
    pub min_similarity_threshold: f64,

    /// Corpora smaller than this fall back to brute-force Jaccard when the
    /// LSH candidate set is under-filled. Tunable; the default is arbitrary.
    pub brute_force_limit: usize,
}

impl Default for SimilarityConfig {
    fn default() -> Self {
        Self {
            num_hashes: 128,
            shingle_size: 3,
            include_call_pattern: true,
            num_bands: 16,
            band_size: 8,
            min_similarity_threshold: 0.3,
            brute_force_limit: 1000,
        }
    }
}

impl SimilarityConfig {
    pub fn validate(&self) -> Result<()> {
        if self.num_hashes == 0 || self.num_bands == 0 || self.band_size == 0 {
            return Err(EngineError::config(
                "num_hashes, num_bands and band_size must be non-zero",
            ));
        }
        if self.num_bands * self.band_size != self.num_hashes {
            return Err(EngineError::config(format!(
                "num_bands ({}) × band_size ({}) must equal num_hashes ({})",
                self.num_bands, self.band_size, self.num_hashes
            )));
        }
        if !(0.0..=1.0).contains(&self.min_similarity_threshold) {
            return Err(EngineError::config(
                "min_similarity_threshold must be within [0, 1]",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(SimilarityConfig::default().validate().is_ok());
    }

    #[test]
    fn test_band_mismatch_rejected() {
        let config = SimilarityConfig {
            num_bands: 10,
            band_size: 10,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
