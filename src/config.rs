//! Export configuration
//!
//! Configuration can be built in code with the `with_*` methods or loaded
//! from a YAML or JSON file. Every field has a default, so an empty document
//! is a valid configuration.

use crate::error::{Error, Result};
use crate::value::{Node, Relationship};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Default number of rows per encoded batch
pub const DEFAULT_BATCH_SIZE: usize = 2000;

/// Default number of batches buffered between worker and consumer
pub const DEFAULT_QUEUE_CAPACITY: usize = 10;

/// Default consumer poll timeout in milliseconds
pub const DEFAULT_POLL_TIMEOUT_MS: u64 = 100;

// ============================================================================
// Export Config
// ============================================================================

/// Settings for a single export
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Maximum rows per batch
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Maximum batches waiting in the queue
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    /// How long a consumer waits on the queue before re-checking cancellation
    #[serde(default = "default_poll_timeout_ms")]
    pub poll_timeout_ms: u64,

    /// Label/type/property selection used when sampling store metadata
    #[serde(default)]
    pub selection: SchemaSelection,

    /// Output file format
    #[serde(default)]
    pub format: FileFormat,

    /// Parquet writer options (used when `format` is parquet)
    #[serde(default)]
    pub parquet: ParquetOptions,
}

fn default_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}

fn default_queue_capacity() -> usize {
    DEFAULT_QUEUE_CAPACITY
}

fn default_poll_timeout_ms() -> u64 {
    DEFAULT_POLL_TIMEOUT_MS
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            poll_timeout_ms: DEFAULT_POLL_TIMEOUT_MS,
            selection: SchemaSelection::default(),
            format: FileFormat::default(),
            parquet: ParquetOptions::default(),
        }
    }
}

impl ExportConfig {
    /// Create a config with default settings
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a YAML document
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a JSON document
    pub fn from_json_str(content: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a file, choosing the parser by extension (`.json` or YAML)
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::FileNotFound {
                path: path.display().to_string(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("json"));
        if is_json {
            Self::from_json_str(&content)
        } else {
            Self::from_yaml_str(&content)
        }
    }

    /// Set batch size
    #[must_use]
    pub fn with_batch_size(mut self, size: usize) -> Self {
        self.batch_size = size;
        self
    }

    /// Set queue capacity
    #[must_use]
    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    /// Set poll timeout
    #[must_use]
    pub fn with_poll_timeout(mut self, timeout: Duration) -> Self {
        self.poll_timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Set metadata selection
    #[must_use]
    pub fn with_selection(mut self, selection: SchemaSelection) -> Self {
        self.selection = selection;
        self
    }

    /// Set output file format
    #[must_use]
    pub fn with_format(mut self, format: FileFormat) -> Self {
        self.format = format;
        self
    }

    /// Poll timeout as a duration
    pub fn poll_timeout(&self) -> Duration {
        Duration::from_millis(self.poll_timeout_ms)
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(Error::invalid_value("batch_size", "must be greater than 0"));
        }
        if self.queue_capacity == 0 {
            return Err(Error::invalid_value(
                "queue_capacity",
                "must be greater than 0",
            ));
        }
        if self.poll_timeout_ms == 0 {
            return Err(Error::invalid_value(
                "poll_timeout_ms",
                "must be greater than 0",
            ));
        }
        if self.parquet.row_group_size == 0 {
            return Err(Error::invalid_value(
                "parquet.row_group_size",
                "must be greater than 0",
            ));
        }
        Ok(())
    }
}

// ============================================================================
// Schema Selection
// ============================================================================

/// Restricts which labels, relationship types and properties a graph export
/// covers.
///
/// The same selection narrows the sampled metadata and the produced rows, so
/// every encoded value was part of the schema sample. Empty lists select
/// everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaSelection {
    #[serde(default)]
    pub labels: Vec<String>,

    #[serde(default)]
    pub relationship_types: Vec<String>,

    #[serde(default)]
    pub properties: Vec<String>,
}

impl SchemaSelection {
    /// Select specific labels
    #[must_use]
    pub fn with_labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.labels = labels.into_iter().map(Into::into).collect();
        self
    }

    /// Select specific relationship types
    #[must_use]
    pub fn with_relationship_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.relationship_types = types.into_iter().map(Into::into).collect();
        self
    }

    /// Select specific properties
    #[must_use]
    pub fn with_properties<I, S>(mut self, properties: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.properties = properties.into_iter().map(Into::into).collect();
        self
    }

    /// Check if a label is selected
    pub fn includes_label(&self, label: &str) -> bool {
        self.labels.is_empty() || self.labels.iter().any(|l| l == label)
    }

    /// Check if a relationship type is selected
    pub fn includes_relationship_type(&self, rel_type: &str) -> bool {
        self.relationship_types.is_empty() || self.relationship_types.iter().any(|t| t == rel_type)
    }

    /// Check if a property is selected
    pub fn includes_property(&self, property: &str) -> bool {
        self.properties.is_empty() || self.properties.iter().any(|p| p == property)
    }

    /// Check if a node carries at least one selected label
    pub fn selects_node(&self, node: &Node) -> bool {
        self.labels.is_empty() || node.labels.iter().any(|l| self.includes_label(l))
    }

    /// Check if a relationship has a selected type
    pub fn selects_relationship(&self, rel: &Relationship) -> bool {
        self.includes_relationship_type(&rel.rel_type)
    }
}

// ============================================================================
// Output Format
// ============================================================================

/// Durable output file format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileFormat {
    /// Arrow IPC file format
    #[default]
    Arrow,
    /// Apache Parquet
    Parquet,
}

impl FileFormat {
    /// Guess the format from a file extension, defaulting to Arrow
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        match path.as_ref().extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("parquet") => FileFormat::Parquet,
            _ => FileFormat::Arrow,
        }
    }
}

/// Parquet writer options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParquetOptions {
    /// Compression codec: none, snappy, gzip or zstd
    #[serde(default = "default_compression")]
    pub compression: String,

    #[serde(default = "default_row_group_size")]
    pub row_group_size: usize,

    #[serde(default = "default_true")]
    pub dictionary: bool,

    #[serde(default = "default_true")]
    pub statistics: bool,
}

fn default_compression() -> String {
    "snappy".to_string()
}

fn default_row_group_size() -> usize {
    1024 * 1024
}

fn default_true() -> bool {
    true
}

impl Default for ParquetOptions {
    fn default() -> Self {
        Self {
            compression: default_compression(),
            row_group_size: default_row_group_size(),
            dictionary: true,
            statistics: true,
        }
    }
}
