//! Output module
//!
//! Sinks that receive encoded batches from the export worker.
//!
//! # Overview
//!
//! - [`FileSink`]: one Arrow IPC or Parquet file for the whole export
//! - [`StreamSink`]: self-contained Arrow IPC stream chunks for a consumer
//! - [`CloudDestination`]: upload of finished files to object storage
//! - Readers that turn exported data back into rows

mod cloud;
mod decode;
mod file;
mod sink;
mod stream;
mod writer;

pub use cloud::{export_object_name, CloudDestination};
pub use decode::{batch_to_rows, decode_stream_chunk, read_arrow_file, read_parquet_file};
pub use file::FileSink;
pub use sink::OutputSink;
pub use stream::StreamSink;
pub use writer::{BatchFileWriter, ParquetWriterConfig};

#[cfg(test)]
mod tests;
