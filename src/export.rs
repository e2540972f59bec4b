//! One-call exports
//!
//! Composes any row source with the file or stream sink. Use
//! [`ExportPipeline`] directly to plug in a reporter, a cancellation source or
//! a read context.

use crate::config::ExportConfig;
use crate::error::Result;
use crate::output::{FileSink, ParquetWriterConfig, StreamSink};
use crate::pipeline::{ExportPipeline, ExportStream};
use crate::progress::ExportSummary;
use crate::schema::{infer_from_metadata, ExportSchema, SchemaInferrer};
use crate::source::{RowSource, SchemaHint};
use bytes::Bytes;
use std::path::Path;

/// Build the file sink for a config
pub fn file_sink(path: impl AsRef<Path>, config: &ExportConfig) -> Result<FileSink> {
    let parquet = ParquetWriterConfig::from_options(&config.parquet)?;
    Ok(FileSink::new(path.as_ref(), config.format).with_parquet_config(parquet))
}

/// Export a source to one Arrow IPC or Parquet file and wait for the outcome
pub fn export_to_file(
    source: Box<dyn RowSource>,
    path: impl AsRef<Path>,
    config: &ExportConfig,
) -> Result<ExportSummary> {
    let sink = file_sink(path, config)?;
    let stream = ExportPipeline::new(source, sink, config.clone()).start()?;
    Ok(stream.finish())
}

/// Export a source as a lazy sequence of Arrow IPC stream chunks
pub fn export_to_stream(
    source: Box<dyn RowSource>,
    config: &ExportConfig,
) -> Result<ExportStream<Bytes>> {
    ExportPipeline::new(source, StreamSink::new(), config.clone()).start()
}

/// Compute the schema an export of `source` would use, without exporting
///
/// Scanned sources are read to the end, exactly as an export would read them.
pub fn preview_schema(source: Box<dyn RowSource>) -> Result<ExportSchema> {
    match source.describe_for_schema()? {
        SchemaHint::Metadata(request) => infer_from_metadata(&request),
        SchemaHint::ScanRows => {
            let mut inferrer = SchemaInferrer::new();
            for row in source.produce()? {
                inferrer.observe_row(&row?);
            }
            inferrer.finish()
        }
    }
}
