//! Tabular result source

use super::types::{Row, RowIter, RowSource, SchemaHint};
use crate::error::Result;

/// Wraps an existing result cursor verbatim
///
/// No reserved columns are added; the schema is inferred by scanning rows.
pub struct TabularSource {
    name: String,
    rows: RowIter,
}

impl TabularSource {
    /// Wrap a fallible row iterator
    pub fn new<I>(rows: I) -> Self
    where
        I: Iterator<Item = Result<Row>> + Send + 'static,
    {
        Self {
            name: "query".to_string(),
            rows: Box::new(rows),
        }
    }

    /// Wrap already materialized rows
    pub fn from_rows(rows: Vec<Row>) -> Self {
        Self::new(rows.into_iter().map(Ok))
    }

    /// Set the name used in logs
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

impl RowSource for TabularSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn describe_for_schema(&self) -> Result<SchemaHint> {
        Ok(SchemaHint::ScanRows)
    }

    fn produce(self: Box<Self>) -> Result<RowIter> {
        Ok(self.rows)
    }
}
