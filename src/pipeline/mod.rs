//! Streaming export pipeline
//!
//! Couples one row source to one output sink through a background worker
//! and a bounded queue.
//!
//! # Overview
//!
//! ```text
//! RowSource ──rows──▶ Worker ──batches──▶ OutputSink
//!                       │                     │ items
//!                       │                     ▼
//!                       └── progress ──▶ bounded queue ──▶ ExportStream
//! ```
//!
//! States move `Idle -> Running -> {Completed, Cancelled, Failed}`. Errors
//! never reach the consumer as items; the outcome is in the final summary.

mod cancel;
mod context;
mod queue;
mod stream;
mod types;
mod worker;

pub use cancel::{Cancellation, CancellationToken};
pub use context::{ReadContext, ThreadReadContext, TokioReadContext, WorkerTask};
pub use stream::ExportStream;

use crate::config::ExportConfig;
use crate::error::Result;
use crate::output::OutputSink;
use crate::progress::{ProgressReporter, TracingReporter};
use crate::source::RowSource;
use queue::Producer;
use std::sync::Arc;
use types::ExportShared;
use worker::Worker;

/// A configured, not yet started export
pub struct ExportPipeline<S: OutputSink> {
    source: Box<dyn RowSource>,
    sink: S,
    config: ExportConfig,
    reporter: Arc<dyn ProgressReporter>,
    cancellation: Option<Arc<dyn Cancellation>>,
    context: Arc<dyn ReadContext>,
}

impl<S: OutputSink> ExportPipeline<S> {
    /// Create a pipeline
    pub fn new(source: Box<dyn RowSource>, sink: S, config: ExportConfig) -> Self {
        let reporter = Arc::new(TracingReporter::new(source.name()));
        Self {
            source,
            sink,
            config,
            reporter,
            cancellation: None,
            context: Arc::new(ThreadReadContext),
        }
    }

    /// Set the progress reporter
    #[must_use]
    pub fn with_reporter(mut self, reporter: Arc<dyn ProgressReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Add a caller-controlled cancellation source
    #[must_use]
    pub fn with_cancellation(mut self, cancellation: Arc<dyn Cancellation>) -> Self {
        self.cancellation = Some(cancellation);
        self
    }

    /// Set where the worker runs
    #[must_use]
    pub fn with_context(mut self, context: Arc<dyn ReadContext>) -> Self {
        self.context = context;
        self
    }

    /// Start the worker and return the consumer stream
    pub fn start(self) -> Result<ExportStream<S::Item>> {
        self.config.validate()?;

        let poll = self.config.poll_timeout();
        let (tx, rx) = crossbeam_channel::bounded(self.config.queue_capacity);
        let (done_tx, done_rx) = crossbeam_channel::bounded::<()>(0);
        let shared = ExportShared::new(self.cancellation);
        let name = self.source.name().to_string();

        let worker = Worker {
            sink: self.sink,
            batch_size: self.config.batch_size,
            shared: Arc::clone(&shared),
            producer: Producer::new(tx, Arc::clone(&shared), poll),
            reporter: self.reporter,
            encoder: None,
        };
        let source = self.source;

        self.context.run(
            &name,
            Box::new(move || {
                let _done = done_tx;
                worker.run(source);
            }),
        )?;

        Ok(ExportStream::new(rx, done_rx, shared, poll))
    }
}

#[cfg(test)]
mod tests;
