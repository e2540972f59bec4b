//! In-memory IPC chunk sink

use super::sink::OutputSink;
use crate::encode::{encode_schema_chunk, encode_stream_chunk};
use crate::error::Result;
use crate::progress::ExportProgress;
use crate::schema::ExportSchema;
use arrow::record_batch::RecordBatch;
use bytes::Bytes;

/// Emits every batch as a self-contained Arrow IPC stream chunk
///
/// An export that produced no batches emits a single schema-only chunk so
/// consumers still learn the columns.
#[derive(Debug, Default)]
pub struct StreamSink {
    chunks: usize,
}

impl StreamSink {
    /// Create a stream sink
    pub fn new() -> Self {
        Self::default()
    }
}

impl OutputSink for StreamSink {
    type Item = Bytes;

    fn accept(&mut self, batch: &RecordBatch, _progress: &ExportProgress) -> Result<Option<Bytes>> {
        let chunk = encode_stream_chunk(batch)?;
        self.chunks += 1;
        Ok(Some(chunk))
    }

    fn finish(&mut self, schema: &ExportSchema, _progress: &ExportProgress) -> Result<Option<Bytes>> {
        if self.chunks > 0 {
            return Ok(None);
        }
        self.chunks += 1;
        encode_schema_chunk(&schema.arrow_schema()).map(Some)
    }

    fn release(&mut self) {}

    fn flush_partial_on_cancel(&self) -> bool {
        false
    }
}
