//! HTTP server mode for streaming exports over REST

use axum::{
    body::Body,
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::{ExportConfig, SchemaSelection};
use crate::database::DuckDbSource;
use crate::error::{Error, Result};
use crate::export::{export_to_stream, preview_schema};
use crate::graph::InMemoryGraph;
use crate::source::{GraphSnapshotSource, RowSource};

/// Arrow IPC stream media type
pub const ARROW_STREAM_CONTENT_TYPE: &str = "application/vnd.apache.arrow.stream";

/// Server configuration
#[derive(Clone)]
pub struct ServerConfig {
    /// Graph served by the graph endpoints
    pub graph: Option<Arc<InMemoryGraph>>,
    /// DuckDB database file for queries (in-memory when absent)
    pub database: Option<PathBuf>,
    /// Settings applied to every export
    pub export: ExportConfig,
}

/// App state shared across handlers
#[derive(Clone)]
struct AppState {
    config: ServerConfig,
}

/// Query string for graph endpoints
#[derive(Debug, Default, Deserialize)]
struct GraphParams {
    /// Comma-separated node labels
    #[serde(default)]
    labels: Option<String>,
    /// Comma-separated relationship types
    #[serde(default)]
    rel_types: Option<String>,
    /// Comma-separated property names
    #[serde(default)]
    properties: Option<String>,
    #[serde(default)]
    batch_size: Option<usize>,
}

impl GraphParams {
    fn selection(&self) -> SchemaSelection {
        SchemaSelection::default()
            .with_labels(split_list(self.labels.as_deref()))
            .with_relationship_types(split_list(self.rel_types.as_deref()))
            .with_properties(split_list(self.properties.as_deref()))
    }
}

/// Request body for the query export endpoint
#[derive(Debug, Deserialize)]
struct QueryRequest {
    /// SQL query to export
    sql: String,
    /// Statements executed before the query
    #[serde(default)]
    setup: Option<String>,
    #[serde(default)]
    batch_size: Option<usize>,
}

/// Response wrapper
#[derive(Debug, Serialize)]
struct ApiResponse<T> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    fn error(msg: impl Into<String>) -> ApiResponse<()> {
        ApiResponse {
            success: false,
            data: None,
            error: Some(msg.into()),
        }
    }
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(ApiResponse::<()>::error(message))).into_response()
}

fn split_list(value: Option<&str>) -> Vec<String> {
    value
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Build the application router
pub fn router(config: ServerConfig) -> Router {
    let state = AppState { config };

    // Build CORS layer - allow all origins for development
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/schema/graph", get(graph_schema))
        .route("/export/graph", get(export_graph))
        .route("/export/query", post(export_query))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}

/// Start the HTTP server
pub async fn serve(config: ServerConfig, port: u16) -> Result<()> {
    let app = router(config);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Starting HTTP server on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| Error::config(format!("Failed to bind to port {port}: {e}")))?;

    axum::serve(listener, app)
        .await
        .map_err(|e| Error::config(format!("Server error: {e}")))?;

    Ok(())
}

/// Health check endpoint
async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

fn graph_source(state: &AppState, params: &GraphParams) -> Option<Box<dyn RowSource>> {
    let graph = state.config.graph.clone()?;
    Some(Box::new(
        GraphSnapshotSource::new(graph).with_selection(params.selection()),
    ))
}

/// Schema a graph export would use
async fn graph_schema(
    State(state): State<Arc<AppState>>,
    Query(params): Query<GraphParams>,
) -> Response {
    let Some(source) = graph_source(&state, &params) else {
        return error_response(StatusCode::NOT_FOUND, "No graph loaded");
    };
    match tokio::task::spawn_blocking(move || preview_schema(source)).await {
        Ok(Ok(schema)) => (StatusCode::OK, Json(ApiResponse::success(schema))).into_response(),
        Ok(Err(e)) => error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
        Err(e) => error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    }
}

/// Stream a snapshot of the graph as Arrow IPC
async fn export_graph(
    State(state): State<Arc<AppState>>,
    Query(params): Query<GraphParams>,
) -> Response {
    let Some(source) = graph_source(&state, &params) else {
        return error_response(StatusCode::NOT_FOUND, "No graph loaded");
    };
    let mut config = state.config.export.clone();
    if let Some(batch_size) = params.batch_size {
        config = config.with_batch_size(batch_size);
    }
    arrow_response(source, config)
}

/// Stream the result of a SQL query as Arrow IPC
async fn export_query(
    State(state): State<Arc<AppState>>,
    Json(req): Json<QueryRequest>,
) -> Response {
    let mut config = state.config.export.clone();
    if let Some(batch_size) = req.batch_size {
        config = config.with_batch_size(batch_size);
    }

    let database = state.config.database.clone();
    let prefetch = config.batch_size;
    let source = tokio::task::spawn_blocking(move || -> Result<DuckDbSource> {
        let source = match database {
            Some(path) => DuckDbSource::open(path, req.sql)?,
            None => DuckDbSource::in_memory(req.sql)?,
        };
        let source = match req.setup {
            Some(setup) => source.with_setup(&setup)?,
            None => source,
        };
        Ok(source.with_prefetch(prefetch))
    })
    .await;

    match source {
        Ok(Ok(source)) => arrow_response(Box::new(source), config),
        Ok(Err(e)) => error_response(StatusCode::BAD_REQUEST, e.to_string()),
        Err(e) => error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    }
}

/// Run an export and forward its chunks as a chunked response body
///
/// A client that goes away closes the channel; dropping the export stream
/// then cancels the export.
fn arrow_response(source: Box<dyn RowSource>, config: ExportConfig) -> Response {
    let capacity = config.queue_capacity;
    let stream = match export_to_stream(source, &config) {
        Ok(stream) => stream,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, e.to_string()),
    };

    let (tx, rx) = tokio::sync::mpsc::channel::<Bytes>(capacity);
    tokio::task::spawn_blocking(move || {
        for chunk in stream {
            if tx.blocking_send(chunk).is_err() {
                tracing::debug!("Client disconnected, cancelling export");
                break;
            }
        }
    });

    let body = futures::stream::unfold(rx, |mut rx| async move {
        rx.recv()
            .await
            .map(|chunk| (Ok::<_, Infallible>(chunk), rx))
    });

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, ARROW_STREAM_CONTENT_TYPE)],
        Body::from_stream(body),
    )
        .into_response()
}
