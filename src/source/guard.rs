//! Progress-counting, error-catching wrapper around a row iterator

use super::types::{Row, RowIter};
use crate::progress::ExportProgress;
use std::sync::Arc;

/// Counts rows by kind and ends the sequence on the first read error
///
/// Read errors never escape: they are logged, recorded in the export
/// progress, and the sequence simply ends.
pub struct GuardedRows {
    inner: RowIter,
    progress: Arc<ExportProgress>,
    source: String,
    finished: bool,
}

impl GuardedRows {
    /// Wrap a row iterator
    pub fn new(inner: RowIter, progress: Arc<ExportProgress>, source: impl Into<String>) -> Self {
        Self {
            inner,
            progress,
            source: source.into(),
            finished: false,
        }
    }
}

impl Iterator for GuardedRows {
    type Item = Row;

    fn next(&mut self) -> Option<Row> {
        if self.finished {
            return None;
        }
        match self.inner.next() {
            Some(Ok(row)) => {
                self.progress.record_row(row.kind());
                Some(row)
            }
            Some(Err(e)) => {
                tracing::error!(source = %self.source, error = %e, "Failed to read row");
                self.progress
                    .record_failure(format!("Failed to read from {}: {e}", self.source));
                self.finished = true;
                None
            }
            None => {
                self.finished = true;
                None
            }
        }
    }
}
