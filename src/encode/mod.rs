//! Batch encoding module
//!
//! Turns batches of rows into Arrow `RecordBatch`es and IPC stream chunks.

mod convert;
mod encoder;
mod ipc;

pub use convert::{append, epoch_millis};
pub use encoder::BatchEncoder;
pub use ipc::{encode_schema_chunk, encode_stream_chunk};

#[cfg(test)]
mod tests;
