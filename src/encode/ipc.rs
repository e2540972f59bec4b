//! Arrow IPC stream chunks

use crate::error::Result;
use arrow::datatypes::Schema;
use arrow::ipc::writer::StreamWriter;
use arrow::record_batch::RecordBatch;
use bytes::Bytes;

/// Serialize one batch as a complete IPC stream: schema, batch, end marker
pub fn encode_stream_chunk(batch: &RecordBatch) -> Result<Bytes> {
    let mut buf = Vec::new();
    {
        let mut writer = StreamWriter::try_new(&mut buf, batch.schema_ref())?;
        writer.write(batch)?;
        writer.finish()?;
    }
    Ok(Bytes::from(buf))
}

/// Serialize a schema-only IPC stream (no batches)
pub fn encode_schema_chunk(schema: &Schema) -> Result<Bytes> {
    let mut buf = Vec::new();
    {
        let mut writer = StreamWriter::try_new(&mut buf, schema)?;
        writer.finish()?;
    }
    Ok(Bytes::from(buf))
}
