//! Cooperative cancellation

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Something the export worker polls once per row
pub trait Cancellation: Send + Sync {
    /// Check if the export should stop
    fn is_cancelled(&self) -> bool;
}

/// Shared cancellation flag
///
/// Clones observe the same flag; cancelling is permanent.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Create an untripped token
    pub fn new() -> Self {
        Self::default()
    }

    /// Trip the token
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Release);
    }
}

impl Cancellation for CancellationToken {
    fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}
