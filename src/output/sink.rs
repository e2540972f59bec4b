//! Output sink abstraction

use crate::error::Result;
use crate::progress::ExportProgress;
use crate::schema::ExportSchema;
use arrow::record_batch::RecordBatch;

/// Receives encoded batches from the export worker
///
/// Each call may yield an item that the worker pushes onto the export queue.
pub trait OutputSink: Send + 'static {
    /// Item delivered to the consumer
    type Item: Send + 'static;

    /// Handle one encoded batch
    fn accept(&mut self, batch: &RecordBatch, progress: &ExportProgress)
        -> Result<Option<Self::Item>>;

    /// Complete the output after the last batch of a normal run
    fn finish(&mut self, schema: &ExportSchema, progress: &ExportProgress)
        -> Result<Option<Self::Item>>;

    /// Release held resources; called on every exit path, must be idempotent
    /// and must not fail
    fn release(&mut self);

    /// Whether a partial batch is still written when the export is cancelled
    fn flush_partial_on_cancel(&self) -> bool;
}
