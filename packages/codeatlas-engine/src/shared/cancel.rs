//! Cooperative cancellation
//!
//! The engine performs no I/O, so cancellation is the only suspension point
//! callers need. Every long-running traversal checks a shared token at a
//! fixed stride (every 100 nodes is the canonical value) and returns a typed
//! `context_canceled` error when it fires.
//!
//! Tokens are cheap to clone (an `Arc<AtomicBool>`) and safe to share across
//! threads.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::shared::models::{EngineError, Result};

/// Canonical check stride for long traversals
pub const CANCEL_CHECK_STRIDE: usize = 100;

/// Shared cancellation flag
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    canceled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Signal cancellation. Idempotent.
    pub fn cancel(&self) {
        self.canceled.store(true, Ordering::Release);
    }

    pub fn is_canceled(&self) -> bool {
        self.canceled.load(Ordering::Acquire)
    }

    /// Return a `context_canceled` error if the token has fired.
    ///
    /// `operation` names the caller for the error message.
    pub fn check(&self, operation: &str) -> Result<()> {
        if self.is_canceled() {
            Err(EngineError::canceled(operation))
        } else {
            Ok(())
        }
    }

    /// Stride-gated variant for hot loops: only consults the flag every
    /// [`CANCEL_CHECK_STRIDE`] iterations.
    pub fn check_every(&self, iteration: usize, operation: &str) -> Result<()> {
        if iteration % CANCEL_CHECK_STRIDE == 0 {
            self.check(operation)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::models::ErrorKind;

    #[test]
    fn test_fresh_token_not_canceled() {
        let token = CancellationToken::new();
        assert!(!token.is_canceled());
        assert!(token.check("op").is_ok());
    }

    #[test]
    fn test_cancel_is_observed_by_clones() {
        let token = CancellationToken::new();
        let clone = token.clone();

        token.cancel();

        assert!(clone.is_canceled());
        let err = clone.check("trace_data_flow").unwrap_err();
        assert_eq!(err.kind, ErrorKind::ContextCanceled);
        assert!(err.message.contains("trace_data_flow"));
    }

    #[test]
    fn test_stride_gating() {
        let token = CancellationToken::new();
        token.cancel();

        // Off-stride iterations skip the check entirely.
        assert!(token.check_every(1, "op").is_ok());
        assert!(token.check_every(99, "op").is_ok());

        // On-stride iterations observe the flag.
        assert!(token.check_every(0, "op").is_err());
        assert!(token.check_every(100, "op").is_err());
    }
}
