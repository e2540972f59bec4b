//! Pipeline internals shared by the worker and the consumer

use super::cancel::{Cancellation, CancellationToken};
use crate::error::Error;
use crate::progress::ExportProgress;
use crate::schema::SchemaCell;
use std::sync::Arc;

/// Entry on the export queue
pub(crate) enum QueueItem<T> {
    Item(T),
    /// End-of-sequence sentinel
    End,
}

/// Why the worker stopped before the end of its rows
#[derive(Debug)]
pub(crate) enum Halt {
    Cancelled,
    Failed(Error),
}

impl From<Error> for Halt {
    fn from(err: Error) -> Self {
        Halt::Failed(err)
    }
}

/// State shared by one export's worker and consumer
pub(crate) struct ExportShared {
    pub progress: Arc<ExportProgress>,
    pub schema: SchemaCell,
    /// Tripped by the consumer (cancel, drop) or on disconnect
    pub stop: CancellationToken,
    /// Caller supplied cancellation
    pub external: Option<Arc<dyn Cancellation>>,
}

impl ExportShared {
    pub fn new(external: Option<Arc<dyn Cancellation>>) -> Arc<Self> {
        Arc::new(Self {
            progress: ExportProgress::new(),
            schema: SchemaCell::new(),
            stop: CancellationToken::new(),
            external,
        })
    }

    /// Check both cancellation sources
    pub fn should_stop(&self) -> bool {
        self.stop.is_cancelled() || self.external.as_ref().is_some_and(|c| c.is_cancelled())
    }
}
