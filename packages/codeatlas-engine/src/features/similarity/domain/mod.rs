//! Similarity domain models: fingerprints, configuration, scoring

pub mod config;
pub mod fingerprint;
pub mod scoring;

pub use config::SimilarityConfig;
pub use fingerprint::AstFingerprint;
pub use scoring::{overall_similarity, SimilarityScore};
