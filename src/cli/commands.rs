//! CLI commands and argument parsing

use crate::config::FileFormat;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Streaming Arrow/Parquet export of graphs and query results
#[derive(Parser, Debug)]
#[command(name = "graph-arrow-export")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Export configuration file (YAML or JSON)
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// Rows per batch (overrides the config file)
    #[arg(short, long, global = true)]
    pub batch_size: Option<usize>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Export a graph document to a file
    Graph {
        /// Graph document (JSON with "nodes" and "relationships")
        input: PathBuf,

        /// Output file
        #[arg(short, long)]
        output: PathBuf,

        /// Output format (default: from the output extension)
        #[arg(short, long)]
        format: Option<OutputFormat>,

        #[command(flatten)]
        selection: SelectionArgs,

        /// Upload the finished file (s3://, r2://, gs://, az:// or a local directory)
        #[arg(long)]
        upload: Option<String>,
    },

    /// Export the result of a SQL query to a file
    Query {
        /// SQL query
        sql: String,

        /// Output file
        #[arg(short, long)]
        output: PathBuf,

        /// Output format (default: from the output extension)
        #[arg(short, long)]
        format: Option<OutputFormat>,

        #[command(flatten)]
        database: DatabaseArgs,

        /// Upload the finished file (s3://, r2://, gs://, az:// or a local directory)
        #[arg(long)]
        upload: Option<String>,
    },

    /// Print the schema an export would use
    Schema {
        /// Graph document to describe
        #[arg(long, conflicts_with = "sql")]
        graph: Option<PathBuf>,

        /// SQL query to describe
        #[arg(long)]
        sql: Option<String>,

        #[command(flatten)]
        selection: SelectionArgs,

        #[command(flatten)]
        database: DatabaseArgs,
    },

    /// Print the rows of an exported Arrow or Parquet file as JSON lines
    Load {
        /// Exported file
        input: PathBuf,

        /// Maximum rows to print
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Start HTTP server mode
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "8080")]
        port: u16,

        /// Graph document served by the graph endpoints
        #[arg(long)]
        graph: Option<PathBuf>,

        /// DuckDB database file used by the query endpoint (default: in-memory)
        #[arg(long)]
        database: Option<PathBuf>,
    },
}

/// Label/type/property restriction for graph schemas
#[derive(clap::Args, Debug, Default, Clone)]
pub struct SelectionArgs {
    /// Node labels to sample (comma-separated, empty = all)
    #[arg(long, value_delimiter = ',')]
    pub labels: Vec<String>,

    /// Relationship types to sample (comma-separated, empty = all)
    #[arg(long, value_delimiter = ',')]
    pub rel_types: Vec<String>,

    /// Properties to include (comma-separated, empty = all)
    #[arg(long, value_delimiter = ',')]
    pub properties: Vec<String>,
}

impl SelectionArgs {
    /// Check if any restriction was given
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty() && self.rel_types.is_empty() && self.properties.is_empty()
    }
}

/// Where a query runs
#[derive(clap::Args, Debug, Default, Clone)]
pub struct DatabaseArgs {
    /// DuckDB database file (default: in-memory)
    #[arg(long)]
    pub database: Option<PathBuf>,

    /// SQL file executed before the query (DDL, inserts, ATTACH)
    #[arg(long)]
    pub setup: Option<PathBuf>,
}

/// Output file format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Arrow IPC file
    Arrow,
    /// Parquet file
    Parquet,
}

impl From<OutputFormat> for FileFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Arrow => FileFormat::Arrow,
            OutputFormat::Parquet => FileFormat::Parquet,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_graph_command() {
        let cli = Cli::parse_from([
            "graph-arrow-export",
            "--batch-size",
            "500",
            "graph",
            "graph.json",
            "-o",
            "out.parquet",
            "--labels",
            "Person,City",
        ]);
        assert_eq!(cli.batch_size, Some(500));
        let Commands::Graph {
            input,
            output,
            format,
            selection,
            upload,
        } = cli.command
        else {
            panic!("expected graph command");
        };
        assert_eq!(input, PathBuf::from("graph.json"));
        assert_eq!(output, PathBuf::from("out.parquet"));
        assert!(format.is_none());
        assert_eq!(selection.labels, vec!["Person", "City"]);
        assert!(upload.is_none());
    }

    #[test]
    fn test_parse_query_command() {
        let cli = Cli::parse_from([
            "graph-arrow-export",
            "query",
            "SELECT 1",
            "-o",
            "out.arrow",
            "--format",
            "arrow",
            "--setup",
            "init.sql",
        ]);
        let Commands::Query {
            sql,
            format,
            database,
            ..
        } = cli.command
        else {
            panic!("expected query command");
        };
        assert_eq!(sql, "SELECT 1");
        assert_eq!(format.map(FileFormat::from), Some(FileFormat::Arrow));
        assert_eq!(database.setup, Some(PathBuf::from("init.sql")));
    }
}
