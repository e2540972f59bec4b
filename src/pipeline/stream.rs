//! Consumer side of a running export

use super::types::{ExportShared, QueueItem};
use crate::progress::{ExportState, ExportSummary, ProgressSnapshot};
use crate::schema::ExportSchema;
use crossbeam_channel::{Receiver, RecvTimeoutError};
use std::sync::Arc;
use std::time::Duration;

/// Lazy sequence of items produced by an export
///
/// Each pull waits on the queue for at most the poll timeout before
/// re-checking cancellation. Dropping the stream cancels the export; the
/// worker stops at its next row or push.
pub struct ExportStream<T> {
    rx: Receiver<QueueItem<T>>,
    done: Receiver<()>,
    shared: Arc<ExportShared>,
    poll: Duration,
    ended: bool,
}

impl<T> ExportStream<T> {
    pub(crate) fn new(
        rx: Receiver<QueueItem<T>>,
        done: Receiver<()>,
        shared: Arc<ExportShared>,
        poll: Duration,
    ) -> Self {
        Self {
            rx,
            done,
            shared,
            poll,
            ended: false,
        }
    }

    /// Current counters
    pub fn progress(&self) -> ProgressSnapshot {
        self.shared.progress.snapshot()
    }

    /// Current lifecycle state
    pub fn state(&self) -> ExportState {
        self.shared.progress.state()
    }

    /// Current outcome; final once the state is terminal
    pub fn summary(&self) -> ExportSummary {
        self.shared.progress.summary()
    }

    /// The export schema, once the worker has computed it
    pub fn schema(&self) -> Option<Arc<ExportSchema>> {
        self.shared.schema.get()
    }

    /// Ask the worker to stop
    pub fn cancel(&self) {
        self.shared.stop.cancel();
    }

    /// Check if the export was asked to stop
    pub fn is_cancelled(&self) -> bool {
        self.shared.should_stop()
    }

    /// Drain the remaining items and wait for the worker to finish
    pub fn finish(mut self) -> ExportSummary {
        for _ in self.by_ref() {}
        // The worker holds the sender until it has fully terminated
        let _ = self.done.recv();
        self.summary()
    }
}

impl<T> Iterator for ExportStream<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        while !self.ended {
            if self.shared.should_stop() {
                self.ended = true;
                break;
            }
            match self.rx.recv_timeout(self.poll) {
                Ok(QueueItem::Item(item)) => return Some(item),
                Ok(QueueItem::End) | Err(RecvTimeoutError::Disconnected) => self.ended = true,
                Err(RecvTimeoutError::Timeout) => {}
            }
        }
        None
    }
}

impl<T> Drop for ExportStream<T> {
    fn drop(&mut self) {
        if !self.ended {
            self.shared.stop.cancel();
        }
    }
}

impl<T> std::fmt::Debug for ExportStream<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExportStream")
            .field("state", &self.state())
            .field("ended", &self.ended)
            .finish_non_exhaustive()
    }
}
