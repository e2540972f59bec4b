//! Background export worker

use super::queue::Producer;
use super::types::{ExportShared, Halt};
use crate::encode::BatchEncoder;
use crate::error::Error;
use crate::output::OutputSink;
use crate::progress::{ExportState, ProgressReporter};
use crate::schema::{infer_from_metadata, ExportSchema, SchemaInferrer};
use crate::source::{GuardedRows, Row, RowSource, SchemaHint};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

/// Pulls rows, encodes batches and feeds the sink
pub(crate) struct Worker<S: OutputSink> {
    pub sink: S,
    pub batch_size: usize,
    pub shared: Arc<ExportShared>,
    pub producer: Producer<S::Item>,
    pub reporter: Arc<dyn ProgressReporter>,
    pub encoder: Option<BatchEncoder>,
}

impl<S: OutputSink> Worker<S> {
    /// Run the export to a terminal state
    ///
    /// Never panics on export errors and always releases the sink and pushes
    /// the end-of-sequence sentinel. A panic while exporting counts as a
    /// failure.
    pub fn run(mut self, source: Box<dyn RowSource>) {
        let name = source.name().to_string();
        let progress = Arc::clone(&self.shared.progress);
        progress.set_state(ExportState::Running);
        tracing::info!(source = %name, batch_size = self.batch_size, "Export started");

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.execute(source)))
            .unwrap_or_else(|payload| {
                Err(Halt::Failed(Error::Other(format!(
                    "Export worker panicked: {}",
                    panic_message(payload.as_ref())
                ))))
            });

        let cancelled = match outcome {
            Ok(()) => false,
            Err(Halt::Cancelled) => {
                tracing::warn!(source = %name, rows = progress.snapshot().rows, "Export cancelled");
                true
            }
            Err(Halt::Failed(e)) => {
                tracing::error!(source = %name, error = %e, "Export failed");
                progress.record_failure(e.to_string());
                false
            }
        };

        self.sink.release();
        self.encoder = None;

        let state = if progress.has_failed() {
            ExportState::Failed
        } else if cancelled {
            ExportState::Cancelled
        } else {
            ExportState::Completed
        };
        progress.set_state(state);
        self.producer.close();

        let summary = progress.summary();
        tracing::info!(
            source = %name,
            state = ?summary.state,
            rows = summary.progress.rows,
            batches = summary.progress.batches,
            "Export finished"
        );
        self.reporter.done(&summary);
    }

    fn execute(&mut self, source: Box<dyn RowSource>) -> std::result::Result<(), Halt> {
        let hint = source.describe_for_schema()?;
        let name = source.name().to_string();
        let rows = GuardedRows::new(source.produce()?, Arc::clone(&self.shared.progress), name);

        match hint {
            SchemaHint::Metadata(request) => {
                let schema = self
                    .shared
                    .schema
                    .get_or_infer(|| infer_from_metadata(&request))?;
                self.encode_rows(rows, &schema)
            }
            SchemaHint::ScanRows => {
                let (schema, spooled) = self.scan(rows)?;
                self.encode_rows(spooled.into_iter(), &schema)
            }
        }
    }

    /// Read every row of a scanned source before encoding
    ///
    /// The schema is inferred over all rows, so no later row can carry a
    /// column or type the schema has not seen.
    fn scan(
        &mut self,
        mut rows: GuardedRows,
    ) -> std::result::Result<(Arc<ExportSchema>, Vec<Row>), Halt> {
        let mut inferrer = SchemaInferrer::new();
        let mut spooled = Vec::new();

        loop {
            if self.shared.should_stop() {
                let schema = self.shared.schema.get_or_infer(|| inferrer.finish())?;
                if self.sink.flush_partial_on_cancel() {
                    for chunk in spooled.chunks(self.batch_size) {
                        self.flush(&schema, chunk, false)?;
                    }
                }
                return Err(Halt::Cancelled);
            }
            let Some(row) = rows.next() else {
                break;
            };
            inferrer.observe_row(&row);
            spooled.push(row);
        }

        let schema = self.shared.schema.get_or_infer(|| inferrer.finish())?;
        tracing::debug!(rows = spooled.len(), schema = %schema, "Scanned rows for schema");
        Ok((schema, spooled))
    }

    fn encode_rows(
        &mut self,
        mut rows: impl Iterator<Item = Row>,
        schema: &Arc<ExportSchema>,
    ) -> std::result::Result<(), Halt> {
        let mut batch = Vec::with_capacity(self.batch_size);

        loop {
            if self.shared.should_stop() {
                if self.sink.flush_partial_on_cancel() && !batch.is_empty() {
                    self.flush(schema, &batch, false)?;
                }
                return Err(Halt::Cancelled);
            }
            let Some(row) = rows.next() else {
                break;
            };
            batch.push(row);
            if batch.len() >= self.batch_size {
                self.flush(schema, &batch, true)?;
                batch.clear();
            }
        }

        if !batch.is_empty() {
            self.flush(schema, &batch, true)?;
        }

        let progress = Arc::clone(&self.shared.progress);
        if let Some(item) = self.sink.finish(schema, &progress)? {
            self.producer.push(item)?;
        }
        Ok(())
    }

    fn flush(
        &mut self,
        schema: &Arc<ExportSchema>,
        rows: &[Row],
        deliver: bool,
    ) -> std::result::Result<(), Halt> {
        let batch_size = self.batch_size;
        let encoder = self
            .encoder
            .get_or_insert_with(|| BatchEncoder::new(Arc::clone(schema), batch_size));
        let record_batch = encoder.encode(rows)?;

        let progress = Arc::clone(&self.shared.progress);
        progress.record_batch();
        tracing::debug!(rows = record_batch.num_rows(), "Encoded batch");

        if let Some(item) = self.sink.accept(&record_batch, &progress)? {
            if deliver {
                self.producer.push(item)?;
            }
        }
        self.reporter.update(&progress.snapshot());
        Ok(())
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
