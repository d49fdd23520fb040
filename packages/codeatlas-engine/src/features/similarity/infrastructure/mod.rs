//! Similarity infrastructure: MinHash signatures and the banded LSH index

pub mod lsh;
pub mod minhash;

pub use lsh::{LshIndex, LshStats};
pub use minhash::MinHashSignature;
