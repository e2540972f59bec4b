//! Durable file sink

use super::sink::OutputSink;
use super::writer::{BatchFileWriter, ParquetWriterConfig};
use crate::config::FileFormat;
use crate::error::Result;
use crate::progress::{ExportProgress, ProgressSnapshot};
use crate::schema::ExportSchema;
use arrow::record_batch::RecordBatch;
use std::path::{Path, PathBuf};

/// Writes the whole export to one file
///
/// The writer is created on the first batch (or at finish for an export
/// with no rows) and closed exactly once.
pub struct FileSink {
    path: PathBuf,
    format: FileFormat,
    parquet: ParquetWriterConfig,
    writer: Option<BatchFileWriter>,
    closed: bool,
    rows_written: usize,
}

impl FileSink {
    /// Create a sink writing the given format to `path`
    pub fn new(path: impl Into<PathBuf>, format: FileFormat) -> Self {
        Self {
            path: path.into(),
            format,
            parquet: ParquetWriterConfig::default(),
            writer: None,
            closed: false,
            rows_written: 0,
        }
    }

    /// Set Parquet writer options
    #[must_use]
    pub fn with_parquet_config(mut self, config: ParquetWriterConfig) -> Self {
        self.parquet = config;
        self
    }

    /// Output path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Rows written so far
    pub fn rows_written(&self) -> usize {
        self.rows_written
    }

    fn writer_for(&mut self, schema: &arrow::datatypes::Schema) -> Result<&mut BatchFileWriter> {
        if self.writer.is_none() {
            tracing::debug!(path = %self.path.display(), format = ?self.format, "Opening export file");
            let writer = BatchFileWriter::create(&self.path, schema, self.format, &self.parquet)?;
            self.writer = Some(writer);
        }
        self.writer
            .as_mut()
            .ok_or_else(|| crate::error::Error::output("Export file writer is not open"))
    }
}

impl OutputSink for FileSink {
    type Item = ProgressSnapshot;

    fn accept(
        &mut self,
        batch: &RecordBatch,
        progress: &ExportProgress,
    ) -> Result<Option<ProgressSnapshot>> {
        self.writer_for(batch.schema_ref())?.write(batch)?;
        self.rows_written += batch.num_rows();
        Ok(Some(progress.snapshot()))
    }

    fn finish(
        &mut self,
        schema: &ExportSchema,
        progress: &ExportProgress,
    ) -> Result<Option<ProgressSnapshot>> {
        self.writer_for(&schema.arrow_schema())?;
        if let Some(writer) = self.writer.take() {
            self.closed = true;
            writer.close()?;
        }
        tracing::debug!(path = %self.path.display(), rows = self.rows_written, "Closed export file");
        Ok(Some(progress.snapshot()))
    }

    fn release(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        if let Some(writer) = self.writer.take() {
            if let Err(e) = writer.close() {
                tracing::error!(path = %self.path.display(), error = %e, "Failed to close export file");
            }
        }
    }

    fn flush_partial_on_cancel(&self) -> bool {
        true
    }
}

impl Drop for FileSink {
    fn drop(&mut self) {
        self.release();
    }
}
