//! CLI module
//!
//! Command-line interface for running exports.
//!
//! # Commands
//!
//! - `graph` - Export a graph document to an Arrow or Parquet file
//! - `query` - Export a DuckDB query result to a file
//! - `schema` - Print the schema an export would use
//! - `load` - Print an exported file as JSON lines
//! - `serve` - Start HTTP server mode

mod commands;
mod runner;
mod server;

pub use commands::{Cli, Commands, OutputFormat};
pub use runner::Runner;
pub use server::{router, serve, ServerConfig, ARROW_STREAM_CONTENT_TYPE};
