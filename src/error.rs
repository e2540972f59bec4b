//! Error types for the export engine
//!
//! This module defines the error hierarchy for the entire crate.
//! All public APIs return `Result<T, Error>` where Error is defined here.

use thiserror::Error;

/// The main error type for the export engine
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid config value for '{field}': {message}")]
    InvalidConfigValue { field: String, message: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    // ============================================================================
    // Schema Errors
    // ============================================================================
    #[error("Schema inference failed: {message}")]
    SchemaInference { message: String },

    #[error("Duplicate column '{column}' in schema")]
    DuplicateColumn { column: String },

    // ============================================================================
    // Encoding Errors
    // ============================================================================
    #[error("Cannot encode {found} value into column '{column}' of type {expected}")]
    Encoding {
        column: String,
        expected: String,
        found: String,
    },

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    // ============================================================================
    // Source Errors
    // ============================================================================
    #[error("Row source error: {message}")]
    Source { message: String },

    #[error("Database error: {0}")]
    Database(#[from] duckdb::Error),

    #[error("Graph store error: {message}")]
    Graph { message: String },

    // ============================================================================
    // Output Errors
    // ============================================================================
    #[error("Output error: {message}")]
    Output { message: String },

    #[error("Object store error: {0}")]
    ObjectStore(#[from] object_store::Error),

    // ============================================================================
    // Pipeline Errors
    // ============================================================================
    #[error("Failed to start export worker: {message}")]
    WorkerSpawn { message: String },

    // ============================================================================
    // I/O Errors
    // ============================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    // ============================================================================
    // Generic Errors
    // ============================================================================
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an invalid config value error
    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfigValue {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a schema inference error
    pub fn schema(message: impl Into<String>) -> Self {
        Self::SchemaInference {
            message: message.into(),
        }
    }

    /// Create an encoding error for a value that does not fit its column
    pub fn encoding(
        column: impl Into<String>,
        expected: impl ToString,
        found: impl Into<String>,
    ) -> Self {
        Self::Encoding {
            column: column.into(),
            expected: expected.to_string(),
            found: found.into(),
        }
    }

    /// Create a row source error
    pub fn source(message: impl Into<String>) -> Self {
        Self::Source {
            message: message.into(),
        }
    }

    /// Create a graph store error
    pub fn graph(message: impl Into<String>) -> Self {
        Self::Graph {
            message: message.into(),
        }
    }

    /// Create an output error
    pub fn output(message: impl Into<String>) -> Self {
        Self::Output {
            message: message.into(),
        }
    }

    /// Check if this error was raised while placing a value into a column
    pub fn is_encoding(&self) -> bool {
        matches!(self, Error::Encoding { .. })
    }
}

/// Result type alias for the export engine
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, message: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", message.into(), inner))
        })
    }

    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", f(), inner))
        })
    }
}
