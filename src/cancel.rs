//! Cooperative cancellation for long pipeline runs.
//!
//! A multi-chunk run against a local model can take minutes; the original
//! design had no abort path at all. [`CancelToken`] fixes that: the caller
//! keeps a clone, the pipeline checks it between chunks (never mid-inference —
//! the in-flight model call is allowed to finish), and a triggered token ends
//! the run with [`crate::error::NotesError::Cancelled`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A cloneable cancellation flag shared between the caller and the pipeline.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Idempotent; takes effect at the next
    /// between-chunks check.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}
