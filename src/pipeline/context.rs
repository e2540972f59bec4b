//! Execution contexts for the export worker

use crate::error::{Error, Result};
use std::thread;
use tokio::runtime::Handle;

/// Unit of work handed to a read context
pub type WorkerTask = Box<dyn FnOnce() + Send + 'static>;

/// Runs the export worker off the consumer's thread
///
/// The task performs blocking reads, so contexts must not run it on an
/// async executor thread.
pub trait ReadContext: Send + Sync {
    /// Start `task` in the background
    fn run(&self, name: &str, task: WorkerTask) -> Result<()>;
}

/// Runs each worker on a dedicated, named OS thread
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadReadContext;

impl ReadContext for ThreadReadContext {
    fn run(&self, name: &str, task: WorkerTask) -> Result<()> {
        thread::Builder::new()
            .name(format!("export-{name}"))
            .spawn(task)
            .map(|_| ())
            .map_err(|e| Error::WorkerSpawn {
                message: format!("Failed to spawn worker thread: {e}"),
            })
    }
}

/// Runs each worker on a tokio runtime's blocking pool
#[derive(Debug, Clone)]
pub struct TokioReadContext {
    handle: Handle,
}

impl TokioReadContext {
    /// Use an explicit runtime handle
    pub fn new(handle: Handle) -> Self {
        Self { handle }
    }

    /// Use the runtime the caller is running on
    pub fn current() -> Result<Self> {
        Handle::try_current().map(Self::new).map_err(|e| Error::WorkerSpawn {
            message: format!("No tokio runtime available: {e}"),
        })
    }
}

impl ReadContext for TokioReadContext {
    fn run(&self, name: &str, task: WorkerTask) -> Result<()> {
        tracing::debug!(worker = %name, "Scheduling export worker on blocking pool");
        self.handle.spawn_blocking(task);
        Ok(())
    }
}
