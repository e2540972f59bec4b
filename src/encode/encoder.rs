//! Batch encoder

use super::convert::append;
use crate::error::Result;
use crate::schema::ExportSchema;
use crate::source::Row;
use crate::value::Value;
use arrow::array::{make_builder, ArrayBuilder, ArrayRef};
use arrow::record_batch::{RecordBatch, RecordBatchOptions};
use std::sync::Arc;

static NULL: Value = Value::Null;

/// Encodes bounded batches of rows against a fixed schema
///
/// Builders are allocated once and reset after every batch. Taking `&mut
/// self` keeps encoding single-writer and strictly sequential.
pub struct BatchEncoder {
    schema: Arc<ExportSchema>,
    builders: Vec<Box<dyn ArrayBuilder>>,
}

impl BatchEncoder {
    /// Create an encoder with builders sized for `capacity` rows
    pub fn new(schema: Arc<ExportSchema>, capacity: usize) -> Self {
        let builders = schema
            .columns()
            .iter()
            .map(|c| make_builder(&c.physical_type.to_arrow(), capacity))
            .collect();
        Self { schema, builders }
    }

    /// Schema this encoder writes
    pub fn schema(&self) -> &Arc<ExportSchema> {
        &self.schema
    }

    /// Encode one batch
    ///
    /// Missing columns become null and row keys outside the schema are
    /// ignored. On error the partially filled builders are discarded.
    pub fn encode(&mut self, rows: &[Row]) -> Result<RecordBatch> {
        if let Err(e) = self.append_rows(rows) {
            self.reset();
            return Err(e);
        }

        let arrays: Vec<ArrayRef> = self.builders.iter_mut().map(|b| b.finish()).collect();
        let options = RecordBatchOptions::new().with_row_count(Some(rows.len()));
        let batch =
            RecordBatch::try_new_with_options(self.schema.arrow_schema(), arrays, &options)?;

        tracing::debug!(rows = batch.num_rows(), columns = batch.num_columns(), "Encoded batch");
        Ok(batch)
    }

    fn append_rows(&mut self, rows: &[Row]) -> Result<()> {
        for row in rows {
            for (column, builder) in self.schema.columns().iter().zip(self.builders.iter_mut()) {
                let value = row.get(&column.name).unwrap_or(&NULL);
                append(builder.as_mut(), &column.physical_type, value, &column.name)?;
            }
        }
        Ok(())
    }

    fn reset(&mut self) {
        for builder in &mut self.builders {
            drop(builder.finish());
        }
    }
}
