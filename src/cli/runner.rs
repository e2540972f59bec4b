//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, DatabaseArgs, OutputFormat, SelectionArgs};
use crate::config::{ExportConfig, FileFormat, SchemaSelection};
use crate::database::DuckDbSource;
use crate::error::{Error, Result, ResultExt};
use crate::export::{export_to_file, preview_schema};
use crate::graph::InMemoryGraph;
use crate::output::{export_object_name, read_arrow_file, read_parquet_file, CloudDestination};
use crate::progress::{ExportState, ExportSummary};
use crate::source::{GraphSnapshotSource, RowSource};
use std::path::Path;
use std::sync::Arc;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        let config = self.load_config()?;
        match &self.cli.command {
            Commands::Graph {
                input,
                output,
                format,
                selection,
                upload,
            } => {
                let config = with_selection(with_format(config, *format, output), selection);
                let source = graph_source(input, &config)?;
                self.export(source, output, config, upload.as_deref()).await
            }
            Commands::Query {
                sql,
                output,
                format,
                database,
                upload,
            } => {
                let config = with_format(config, *format, output);
                let source = query_source(sql, database, &config)?;
                self.export(source, output, config, upload.as_deref()).await
            }
            Commands::Schema {
                graph,
                sql,
                selection,
                database,
            } => {
                let config = with_selection(config, selection);
                let source = match (graph, sql) {
                    (Some(graph), _) => graph_source(graph, &config)?,
                    (None, Some(sql)) => query_source(sql, database, &config)?,
                    (None, None) => {
                        return Err(Error::config("Specify --graph or --sql to describe"))
                    }
                };
                let schema = tokio::task::spawn_blocking(move || preview_schema(source))
                    .await
                    .map_err(|e| Error::Other(format!("Schema task failed: {e}")))??;
                println!("{}", serde_json::to_string_pretty(&schema)?);
                Ok(())
            }
            Commands::Load { input, limit } => load(input, *limit),
            Commands::Serve {
                port,
                graph,
                database,
            } => {
                let graph = match graph {
                    Some(path) => Some(Arc::new(InMemoryGraph::from_file(path)?)),
                    None => None,
                };
                let server = crate::cli::ServerConfig {
                    graph,
                    database: database.clone(),
                    export: config,
                };
                crate::cli::serve(server, *port).await
            }
        }
    }

    /// Load the export config file and apply command-line overrides
    fn load_config(&self) -> Result<ExportConfig> {
        let mut config = match &self.cli.config {
            Some(path) => ExportConfig::from_file(path)?,
            None => ExportConfig::default(),
        };
        if let Some(batch_size) = self.cli.batch_size {
            config = config.with_batch_size(batch_size);
        }
        config.validate()?;
        Ok(config)
    }

    /// Run a file export off the async runtime and report its outcome
    async fn export(
        &self,
        source: Box<dyn RowSource>,
        output: &Path,
        config: ExportConfig,
        upload: Option<&str>,
    ) -> Result<()> {
        let format = config.format;
        let name = source.name().to_string();
        let path = output.to_path_buf();
        let summary = tokio::task::spawn_blocking(move || export_to_file(source, &path, &config))
            .await
            .map_err(|e| Error::Other(format!("Export task failed: {e}")))??;

        self.output_summary(&summary, output);
        if summary.state != ExportState::Completed {
            return Err(Error::output(summary.error.unwrap_or_else(|| {
                format!("Export ended in state {:?}", summary.state)
            })));
        }

        if let Some(url) = upload {
            let destination = CloudDestination::parse(url)?;
            let location = destination
                .upload_file(output, &export_object_name(&name, format))
                .await?;
            println!("{}", serde_json::json!({ "type": "UPLOAD", "location": location }));
        }
        Ok(())
    }

    fn output_summary(&self, summary: &ExportSummary, output: &Path) {
        let message = serde_json::json!({
            "type": "SUMMARY",
            "output": output.display().to_string(),
            "summary": summary,
        });
        if self.cli.verbose {
            println!("{}", serde_json::to_string_pretty(&message).unwrap_or_default());
        } else {
            println!("{}", serde_json::to_string(&message).unwrap_or_default());
        }
    }
}

fn with_format(config: ExportConfig, format: Option<OutputFormat>, output: &Path) -> ExportConfig {
    let format = format.map_or_else(|| FileFormat::from_path(output), FileFormat::from);
    config.with_format(format)
}

fn with_selection(config: ExportConfig, args: &SelectionArgs) -> ExportConfig {
    if args.is_empty() {
        return config;
    }
    let selection = SchemaSelection::default()
        .with_labels(args.labels.iter().cloned())
        .with_relationship_types(args.rel_types.iter().cloned())
        .with_properties(args.properties.iter().cloned());
    config.with_selection(selection)
}

fn graph_source(path: &Path, config: &ExportConfig) -> Result<Box<dyn RowSource>> {
    let graph = InMemoryGraph::from_file(path)?;
    tracing::info!(
        nodes = graph.node_count(),
        relationships = graph.relationship_count(),
        "Loaded graph"
    );
    Ok(Box::new(
        GraphSnapshotSource::new(Arc::new(graph)).with_selection(config.selection.clone()),
    ))
}

fn query_source(
    sql: &str,
    args: &DatabaseArgs,
    config: &ExportConfig,
) -> Result<Box<dyn RowSource>> {
    let mut source = match &args.database {
        Some(path) => DuckDbSource::open(path, sql)?,
        None => DuckDbSource::in_memory(sql)?,
    };
    if let Some(setup) = &args.setup {
        source = source.with_setup(&read_setup(setup)?)?;
    }
    Ok(Box::new(source.with_prefetch(config.batch_size)))
}

fn read_setup(path: &Path) -> Result<String> {
    if !path.exists() {
        return Err(Error::FileNotFound {
            path: path.display().to_string(),
        });
    }
    std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read setup file {}", path.display()))
}

/// Print an exported file as JSON lines
fn load(input: &Path, limit: Option<usize>) -> Result<()> {
    let rows = match FileFormat::from_path(input) {
        FileFormat::Arrow => read_arrow_file(input)?,
        FileFormat::Parquet => read_parquet_file(input)?,
    };
    for row in rows.iter().take(limit.unwrap_or(usize::MAX)) {
        println!("{}", row.to_json());
    }
    Ok(())
}
