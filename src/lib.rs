// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::unused_self)]
#![allow(clippy::struct_excessive_bools)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::match_wildcard_for_single_variants)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # Graph Arrow Export
//!
//! Streaming columnar export of graph snapshots and tabular query results to
//! Arrow IPC and Parquet.
//!
//! ## Features
//!
//! - **Graph and tabular sources**: In-memory graph snapshots, explicit node and
//!   relationship sets, plain record streams and DuckDB queries
//! - **Schema inference**: From graph type metadata or from every scanned row
//! - **Bounded streaming**: A background worker feeds a bounded queue; slow
//!   consumers slow the worker down
//! - **Cancellation**: Cooperative, checked once per row
//! - **Arrow Output**: Arrow IPC files, Parquet files, or a lazy sequence of
//!   Arrow IPC stream chunks
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use graph_arrow_export::{export_to_file, ExportConfig, GraphSnapshotSource, InMemoryGraph};
//! use std::sync::Arc;
//!
//! let graph = Arc::new(InMemoryGraph::from_file("graph.json")?);
//! let source = GraphSnapshotSource::new(graph);
//! let summary = export_to_file(Box::new(source), "graph.parquet", &ExportConfig::default())?;
//! println!("{} rows", summary.progress.rows);
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         ExportPipeline                          │
//! │  RowSource → schema → BatchEncoder → OutputSink → ExportStream  │
//! └─────────────────────────────────────────────────────────────────┘
//!                                │
//! ┌──────────┬───────────┬───────┴───────┬───────────┬─────────────┐
//! │  Source  │  Schema   │    Encode     │  Output   │  Pipeline   │
//! ├──────────┼───────────┼───────────────┼───────────┼─────────────┤
//! │ Snapshot │ Metadata  │ Value → Arrow │ IPC file  │ Worker      │
//! │ Entities │ Row scan  │ Record batch  │ Parquet   │ Bounded     │
//! │ Tabular  │ Degrade   │ IPC chunks    │ Stream    │ Cancel      │
//! │ DuckDB   │           │               │ Cloud     │ Progress    │
//! └──────────┴───────────┴───────────────┴───────────┴─────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Property values, nodes and relationships
pub mod value;

/// Graph stores and type metadata
pub mod graph;

/// Export configuration
pub mod config;

/// Progress counters and reporting
pub mod progress;

/// Row sources
pub mod source;

/// Export schema inference
pub mod schema;

/// Row to Arrow encoding
pub mod encode;

/// Output sinks (Arrow IPC, Parquet, stream chunks, cloud upload)
pub mod output;

/// Background export worker and consumer stream
pub mod pipeline;

/// One-call export entry points
pub mod export;

/// DuckDB query sources
pub mod database;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};

// Re-export commonly used types
pub use config::{ExportConfig, FileFormat, ParquetOptions, SchemaSelection};
pub use database::DuckDbSource;
pub use export::{export_to_file, export_to_stream, preview_schema};
pub use graph::{GraphStore, InMemoryGraph};
pub use output::{FileSink, OutputSink, StreamSink};
pub use pipeline::{Cancellation, CancellationToken, ExportPipeline, ExportStream};
pub use progress::{ExportState, ExportSummary, ProgressReporter, ProgressSnapshot};
pub use schema::{ColumnDef, ExportSchema, PhysicalType};
pub use source::{EntitySetSource, GraphSnapshotSource, Row, RowKind, RowSource, TabularSource};
pub use value::{Node, Relationship, Value};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
