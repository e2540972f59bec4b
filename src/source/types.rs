//! Row source types

use crate::config::SchemaSelection;
use crate::error::Result;
use crate::graph::TypeMetadata;
use crate::value::Value;
use std::sync::Arc;

/// What produced a row, used for progress counting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RowKind {
    Node,
    Relationship,
    Record,
}

/// One exported row: ordered, uniquely named columns
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    kind: RowKind,
    columns: Vec<(String, Value)>,
}

impl Row {
    /// Create an empty row
    pub fn new(kind: RowKind) -> Self {
        Self {
            kind,
            columns: Vec::new(),
        }
    }

    /// Create a tabular record from name/value pairs
    pub fn record<K, I>(columns: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        let mut row = Self::new(RowKind::Record);
        for (name, value) in columns {
            row.insert(name, value);
        }
        row
    }

    /// Set a column, replacing an existing value of the same name in place
    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        let name = name.into();
        match self.columns.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = value,
            None => self.columns.push((name, value)),
        }
    }

    /// Builder form of [`Row::insert`]
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value.into());
        self
    }

    /// Get a column value
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    /// Row kind
    pub fn kind(&self) -> RowKind {
        self.kind
    }

    /// Iterate columns in order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.columns.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// Number of columns
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Check if the row has no columns
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Render as a JSON object, keeping column order
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.columns
                .iter()
                .map(|(name, value)| (name.clone(), value.to_json()))
                .collect(),
        )
    }
}

/// Owned, sendable iterator of rows
pub type RowIter = Box<dyn Iterator<Item = Result<Row>> + Send>;

/// How a source's schema is computed
#[derive(Debug, Clone)]
pub enum SchemaHint {
    /// Build columns from cached store metadata without reading rows
    Metadata(MetadataRequest),
    /// Observe the values of every produced row before encoding
    ScanRows,
}

/// Store metadata plus the selection that restricts it
#[derive(Debug, Clone)]
pub struct MetadataRequest {
    pub metadata: Arc<TypeMetadata>,
    pub selection: SchemaSelection,
}

/// A finite, non-restartable sequence of rows
pub trait RowSource: Send {
    /// Short name used in logs
    fn name(&self) -> &str;

    /// How the schema for this source should be inferred
    fn describe_for_schema(&self) -> Result<SchemaHint>;

    /// Consume the source into its row sequence
    fn produce(self: Box<Self>) -> Result<RowIter>;
}
