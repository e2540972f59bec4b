//! Compute-once schema holder

use super::types::ExportSchema;
use crate::error::Result;
use once_cell::sync::OnceCell;
use std::sync::Arc;

/// Holds the schema of one export
///
/// The schema is computed at most once; concurrent first callers block
/// until the winning computation finishes. A failed computation leaves the
/// cell empty.
#[derive(Debug, Default)]
pub struct SchemaCell {
    inner: OnceCell<Arc<ExportSchema>>,
}

impl SchemaCell {
    /// Create an empty cell
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the schema, computing it with `infer` on first use
    pub fn get_or_infer<F>(&self, infer: F) -> Result<Arc<ExportSchema>>
    where
        F: FnOnce() -> Result<ExportSchema>,
    {
        self.inner
            .get_or_try_init(|| infer().map(Arc::new))
            .map(Arc::clone)
    }

    /// Get the schema if it has been computed
    pub fn get(&self) -> Option<Arc<ExportSchema>> {
        self.inner.get().map(Arc::clone)
    }
}
