//! Cancelable notification arguments.
//!
//! Some notifications are emitted before an operation commits. Their
//! arguments carry a [`CancelFlag`]; a connected slot calls
//! [`CancelFlag::cancel`] to veto the operation, and the emitter checks the
//! flag once every slot has run.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared veto flag.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    /// Create a flag that is not cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Veto the pending operation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Returns `true` if any holder vetoed.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}
