//! Shared models and primitives used by every feature

pub mod cancel;
pub mod models;
pub mod signatures;

pub use cancel::{CancellationToken, CANCEL_CHECK_STRIDE};
