//! A cancellation token checked at every suspension point in the engine's loop:
//! provider calls, LLM calls, tool dispatch, store operations.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A cancellation token that can be cheaply cloned and checked by any task sharing
/// a turn's context.
#[derive(Clone)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Signal cancellation.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    /// Check if cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// A fresh, independent child token. The engine uses this to bound a single
    /// tool call without letting that call's timeout affect sibling calls.
    pub fn child(&self) -> CancelToken {
        CancelToken::new()
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}
