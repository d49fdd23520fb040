//! Similarity application layer

pub mod engine;

pub use engine::{
    SimilarResult, SimilarityCriteria, SimilarityEngine, SimilarityStats,
};
