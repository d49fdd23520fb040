//! Code similarity
//!
//! AST-derived structural fingerprints, MinHash signatures and banded LSH
//! for sub-linear near-duplicate lookup.
//!
//! # Pipeline
//!
//! ```text
//! frozen graph ──► fingerprint every function/method (parallel)
//!              ──► MinHash signature per fingerprint
//!              ──► banded LSH buckets
//! query        ──► LSH candidates ──► exact weighted scoring ──► top-k
//! ```
//!
//! # Usage
//!
//! ```ignore
//! let engine = SimilarityEngine::new(SimilarityConfig::default())?;
//! engine.build(&graph)?;
//! let matches = engine.find_similar(&graph, &symbol_id, 10, &token)?;
//! ```

pub mod application;
pub mod domain;
pub mod infrastructure;

// Re-export application layer (primary interface)
pub use application::{SimilarResult, SimilarityCriteria, SimilarityEngine, SimilarityStats};

// Re-export domain types
pub use domain::{AstFingerprint, SimilarityConfig};

// Re-export infrastructure (internal use - prefer application layer)
#[doc(hidden)]
pub use infrastructure::{LshIndex, LshStats, MinHashSignature};
