//! Producer side of the bounded export queue

use super::types::{ExportShared, Halt, QueueItem};
use crossbeam_channel::{SendTimeoutError, Sender};
use std::sync::Arc;
use std::time::Duration;

/// Pushes items with timeout-bounded waits
///
/// A full queue blocks the worker; every timeout re-checks cancellation so an
/// abandoned export never hangs. A disconnected consumer cancels the export.
pub(crate) struct Producer<T> {
    tx: Sender<QueueItem<T>>,
    shared: Arc<ExportShared>,
    poll: Duration,
}

impl<T> Producer<T> {
    pub fn new(tx: Sender<QueueItem<T>>, shared: Arc<ExportShared>, poll: Duration) -> Self {
        Self { tx, shared, poll }
    }

    /// Push one item
    pub fn push(&self, item: T) -> Result<(), Halt> {
        let mut pending = QueueItem::Item(item);
        loop {
            if self.shared.should_stop() {
                return Err(Halt::Cancelled);
            }
            match self.tx.send_timeout(pending, self.poll) {
                Ok(()) => return Ok(()),
                Err(SendTimeoutError::Timeout(back)) => pending = back,
                Err(SendTimeoutError::Disconnected(_)) => {
                    tracing::debug!("Export consumer disconnected");
                    self.shared.stop.cancel();
                    return Err(Halt::Cancelled);
                }
            }
        }
    }

    /// Push the end-of-sequence sentinel
    ///
    /// Gives up once the export is cancelled; the consumer ends on its own
    /// after its next poll timeout.
    pub fn close(&self) {
        loop {
            match self.tx.send_timeout(QueueItem::End, self.poll) {
                Ok(()) | Err(SendTimeoutError::Disconnected(_)) => return,
                Err(SendTimeoutError::Timeout(_)) if self.shared.should_stop() => return,
                Err(SendTimeoutError::Timeout(_)) => {}
            }
        }
    }
}
