//! Pipeline tests

use super::*;
use crate::config::{ExportConfig, FileFormat};
use crate::error::Error;
use crate::graph::{EntityIter, GraphStore, InMemoryGraph, TypeMetadata};
use crate::output::{decode_stream_chunk, read_arrow_file, FileSink, StreamSink};
use crate::progress::{ExportState, ExportSummary, ProgressSnapshot};
use crate::source::{GraphSnapshotSource, Row, TabularSource};
use crate::value::{Node, Relationship, Value};
use crossbeam_channel::{Receiver, Sender};
use pretty_assertions::assert_eq;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

fn config(batch_size: usize) -> ExportConfig {
    ExportConfig::default()
        .with_batch_size(batch_size)
        .with_poll_timeout(Duration::from_millis(20))
}

fn city(id: i64, name: &str) -> Row {
    Row::record([("id", Value::Int(id)), ("city", Value::from(name))])
}

/// Store with endless `Counter` nodes, counting how many were pulled
struct EndlessStore {
    pulled: Arc<AtomicUsize>,
}

impl GraphStore for EndlessStore {
    fn nodes(&self) -> crate::error::Result<EntityIter<Node>> {
        let pulled = Arc::clone(&self.pulled);
        Ok(Box::new((0..).map(move |i| {
            pulled.fetch_add(1, Ordering::SeqCst);
            Ok(Node::new(i, &["Counter"]).with_property("n", i))
        })))
    }

    fn relationships(&self) -> crate::error::Result<EntityIter<Relationship>> {
        Ok(Box::new(std::iter::empty()))
    }

    fn type_metadata(&self) -> crate::error::Result<Arc<TypeMetadata>> {
        let sample = Node::new(0, &["Counter"]).with_property("n", 0_i64);
        Ok(Arc::new(TypeMetadata::from_entities(&[sample], &[])))
    }
}

/// Endless streamed rows, counting how many were pulled
fn counting_source(pulled: Arc<AtomicUsize>) -> GraphSnapshotSource {
    GraphSnapshotSource::new(Arc::new(EndlessStore { pulled }))
}

struct ChannelReporter {
    done: Sender<ExportSummary>,
}

impl ProgressReporter for ChannelReporter {
    fn update(&self, _snapshot: &ProgressSnapshot) {}

    fn done(&self, summary: &ExportSummary) {
        let _ = self.done.send(summary.clone());
    }
}

fn channel_reporter() -> (Arc<ChannelReporter>, Receiver<ExportSummary>) {
    let (done, rx) = crossbeam_channel::unbounded();
    (Arc::new(ChannelReporter { done }), rx)
}

// ============================================================================
// Normal Termination Tests
// ============================================================================

#[test]
fn test_single_row_batches_through_stream() {
    let source = TabularSource::from_rows(vec![city(1, "Milan"), city(2, "Rome")]);
    let stream = ExportPipeline::new(Box::new(source), StreamSink::new(), config(1))
        .start()
        .unwrap();

    let chunks: Vec<_> = stream.collect();
    assert_eq!(chunks.len(), 2);

    let first = decode_stream_chunk(&chunks[0]).unwrap();
    let second = decode_stream_chunk(&chunks[1]).unwrap();
    assert_eq!(first, vec![city(1, "Milan")]);
    assert_eq!(second, vec![city(2, "Rome")]);
}

#[test]
fn test_summary_and_schema_after_completion() {
    let source = TabularSource::from_rows(vec![city(1, "Milan"), city(2, "Rome")]);
    let mut stream = ExportPipeline::new(Box::new(source), StreamSink::new(), config(1))
        .start()
        .unwrap();

    assert!(stream.next().is_some());
    let schema = stream.schema().unwrap();
    assert_eq!(schema.to_string(), "id:int64, city:utf8");

    let summary = stream.finish();
    assert_eq!(summary.state, ExportState::Completed);
    assert_eq!(summary.progress.records, 2);
    assert_eq!(summary.progress.batches, 2);
    assert!(summary.error.is_none());
}

#[test]
fn test_partial_last_batch_is_flushed() {
    let rows = (0..5).map(|i| city(i, "x")).collect();
    let stream = ExportPipeline::new(
        Box::new(TabularSource::from_rows(rows)),
        StreamSink::new(),
        config(2),
    )
    .start()
    .unwrap();

    let sizes: Vec<usize> = stream
        .map(|chunk| decode_stream_chunk(&chunk).unwrap().len())
        .collect();
    assert_eq!(sizes, vec![2, 2, 1]);
}

#[test]
fn test_empty_source_emits_schema_only_chunk() {
    let stream = ExportPipeline::new(
        Box::new(TabularSource::from_rows(vec![])),
        StreamSink::new(),
        config(10),
    )
    .start()
    .unwrap();

    let chunks: Vec<_> = stream.collect();
    assert_eq!(chunks.len(), 1);
    assert!(decode_stream_chunk(&chunks[0]).unwrap().is_empty());
}

#[test]
fn test_graph_snapshot_to_file() {
    let graph = InMemoryGraph::builder()
        .node(Node::new(1, &["Person"]).with_property("name", "Ada"))
        .node(Node::new(2, &["Person"]).with_property("name", "Alan"))
        .build()
        .unwrap();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("graph.arrow");

    let summary = ExportPipeline::new(
        Box::new(GraphSnapshotSource::new(Arc::new(graph))),
        FileSink::new(&path, FileFormat::Arrow),
        config(1),
    )
    .start()
    .unwrap()
    .finish();

    assert!(summary.is_completed());
    assert_eq!(summary.progress.nodes, 2);
    let rows = read_arrow_file(&path).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1].get("name"), Some(&Value::from("Alan")));
}

// ============================================================================
// Failure Tests
// ============================================================================

#[test]
fn test_read_failure_ends_sequence_as_failed() {
    let rows = vec![
        Ok(city(1, "Milan")),
        Ok(city(2, "Rome")),
        Err(Error::source("connection reset")),
        Ok(city(3, "never read")),
    ];
    let stream = ExportPipeline::new(
        Box::new(TabularSource::new(rows.into_iter())),
        StreamSink::new(),
        config(1),
    )
    .start()
    .unwrap();

    let summary = stream.finish();
    assert_eq!(summary.state, ExportState::Failed);
    assert_eq!(summary.progress.records, 2);
    assert!(summary.error.unwrap().contains("connection reset"));
}

#[test]
fn test_mixed_types_across_batches_degrade_to_text() {
    let rows = vec![
        Row::record([("id", Value::Int(1)), ("v", Value::Int(1))]),
        Row::record([("id", Value::Int(2)), ("v", Value::from("x"))]),
    ];
    let mut stream = ExportPipeline::new(
        Box::new(TabularSource::from_rows(rows)),
        StreamSink::new(),
        config(1),
    )
    .start()
    .unwrap();

    let chunks: Vec<_> = stream.by_ref().collect();
    assert_eq!(chunks.len(), 2);
    assert_eq!(
        decode_stream_chunk(&chunks[0]).unwrap()[0].get("v"),
        Some(&Value::from("1"))
    );
    assert_eq!(
        decode_stream_chunk(&chunks[1]).unwrap()[0].get("v"),
        Some(&Value::from("x"))
    );

    let summary = stream.finish();
    assert_eq!(summary.state, ExportState::Completed);
}

#[test]
fn test_scanned_schema_ignores_row_order() {
    let int_row = Row::record([("v", Value::Int(1))]);
    let text_row = Row::record([("v", Value::from("x"))]);
    let schema_of = |rows: Vec<Row>| {
        let mut stream = ExportPipeline::new(
            Box::new(TabularSource::from_rows(rows)),
            StreamSink::new(),
            config(1),
        )
        .start()
        .unwrap();
        for _ in stream.by_ref() {}
        stream.schema().unwrap().to_string()
    };

    assert_eq!(schema_of(vec![int_row.clone(), text_row.clone()]), "v:utf8");
    assert_eq!(schema_of(vec![text_row, int_row]), "v:utf8");
}

#[test]
fn test_column_first_seen_after_first_batch_is_kept() {
    let rows = vec![
        Row::record([("a", Value::Int(1))]),
        Row::record([("a", Value::Int(2)), ("b", Value::Int(3))]),
    ];
    let chunks: Vec<_> = ExportPipeline::new(
        Box::new(TabularSource::from_rows(rows)),
        StreamSink::new(),
        config(1),
    )
    .start()
    .unwrap()
    .collect();

    let first = decode_stream_chunk(&chunks[0]).unwrap();
    let second = decode_stream_chunk(&chunks[1]).unwrap();
    assert_eq!(first[0].get("b"), Some(&Value::Null));
    assert_eq!(second[0].get("b"), Some(&Value::Int(3)));
}

#[test]
fn test_panic_in_source_fails_export() {
    let source = TabularSource::new(std::iter::from_fn(|| -> Option<crate::error::Result<Row>> {
        panic!("cursor exploded")
    }));
    let summary = ExportPipeline::new(Box::new(source), StreamSink::new(), config(1))
        .start()
        .unwrap()
        .finish();

    assert_eq!(summary.state, ExportState::Failed);
    assert!(summary.error.unwrap().contains("cursor exploded"));
}

#[test]
fn test_invalid_config_is_rejected() {
    let result = ExportPipeline::new(
        Box::new(TabularSource::from_rows(vec![])),
        StreamSink::new(),
        ExportConfig::default().with_batch_size(0),
    )
    .start();
    assert!(matches!(result, Err(Error::InvalidConfigValue { .. })));
}

// ============================================================================
// Backpressure and Cancellation Tests
// ============================================================================

#[test]
fn test_full_queue_blocks_producer() {
    let pulled = Arc::new(AtomicUsize::new(0));
    let stream = ExportPipeline::new(
        Box::new(counting_source(Arc::clone(&pulled))),
        StreamSink::new(),
        config(1).with_queue_capacity(2),
    )
    .start()
    .unwrap();

    std::thread::sleep(Duration::from_millis(300));
    // Two queued chunks, one blocked in push, one row being batched
    assert!(pulled.load(Ordering::SeqCst) <= 4);

    stream.cancel();
    let summary = stream.finish();
    assert_eq!(summary.state, ExportState::Cancelled);
}

#[test]
fn test_cancellation_stops_after_current_row() {
    let token = CancellationToken::new();
    let pulled = Arc::new(AtomicUsize::new(0));
    let trip = token.clone();
    let counter = Arc::clone(&pulled);
    let source = TabularSource::new((0..).map(move |i| {
        if counter.fetch_add(1, Ordering::SeqCst) + 1 == 5 {
            trip.cancel();
        }
        Ok(Row::record([("n", Value::Int(i))]))
    }));

    let summary = ExportPipeline::new(Box::new(source), StreamSink::new(), config(100))
        .with_cancellation(Arc::new(token))
        .start()
        .unwrap()
        .finish();

    assert_eq!(summary.state, ExportState::Cancelled);
    assert_eq!(pulled.load(Ordering::SeqCst), 5);
}

#[test]
fn test_cancelled_file_export_keeps_partial_batch() {
    let token = CancellationToken::new();
    let trip = token.clone();
    let source = TabularSource::new((0..).map(move |i| {
        if i == 2 {
            trip.cancel();
        }
        Ok(Row::record([("n", Value::Int(i))]))
    }));
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("partial.arrow");

    let summary = ExportPipeline::new(
        Box::new(source),
        FileSink::new(&path, FileFormat::Arrow),
        config(100),
    )
    .with_cancellation(Arc::new(token))
    .start()
    .unwrap()
    .finish();

    assert_eq!(summary.state, ExportState::Cancelled);
    assert_eq!(read_arrow_file(&path).unwrap().len(), 3);
}

#[test]
fn test_dropping_stream_stops_worker() {
    let pulled = Arc::new(AtomicUsize::new(0));
    let (reporter, done) = channel_reporter();
    let mut stream = ExportPipeline::new(
        Box::new(counting_source(Arc::clone(&pulled))),
        StreamSink::new(),
        config(1).with_queue_capacity(1),
    )
    .with_reporter(reporter)
    .start()
    .unwrap();

    assert!(stream.next().is_some());
    drop(stream);

    let summary = done.recv_timeout(Duration::from_secs(5)).unwrap();
    assert_eq!(summary.state, ExportState::Cancelled);
    let after = pulled.load(Ordering::SeqCst);
    std::thread::sleep(Duration::from_millis(100));
    assert_eq!(pulled.load(Ordering::SeqCst), after);
}

// ============================================================================
// Read Context Tests
// ============================================================================

#[tokio::test(flavor = "multi_thread")]
async fn test_tokio_read_context() {
    let context = TokioReadContext::current().unwrap();
    let source = TabularSource::from_rows(vec![city(1, "Milan")]);
    let stream = ExportPipeline::new(Box::new(source), StreamSink::new(), config(1))
        .with_context(Arc::new(context))
        .start()
        .unwrap();

    let summary = tokio::task::spawn_blocking(move || stream.finish())
        .await
        .unwrap();
    assert!(summary.is_completed());
}

#[test]
fn test_tokio_context_requires_runtime() {
    assert!(matches!(
        TokioReadContext::current(),
        Err(Error::WorkerSpawn { .. })
    ));
}
