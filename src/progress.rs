//! Export progress tracking
//!
//! Counters are shared between the export worker (writer) and the consumer
//! (reader), so they are kept in atomics behind an `Arc`.

use crate::source::RowKind;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Lifecycle state of an export
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportState {
    Idle,
    Running,
    Completed,
    Cancelled,
    Failed,
}

impl ExportState {
    /// Check if the export reached a terminal state
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            ExportState::Completed | ExportState::Cancelled | ExportState::Failed
        )
    }
}

/// Point-in-time view of export counters
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressSnapshot {
    pub nodes: u64,
    pub relationships: u64,
    pub records: u64,
    pub rows: u64,
    pub batches: u64,
    pub elapsed_ms: u64,
}

/// Final outcome of an export
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportSummary {
    pub state: ExportState,
    pub progress: ProgressSnapshot,
    /// Failure message when the export did not complete
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ExportSummary {
    /// Check if the export completed normally
    pub fn is_completed(&self) -> bool {
        self.state == ExportState::Completed
    }
}

/// Shared, thread-safe export counters
#[derive(Debug)]
pub struct ExportProgress {
    nodes: AtomicU64,
    relationships: AtomicU64,
    records: AtomicU64,
    batches: AtomicU64,
    started: Instant,
    state: Mutex<ExportState>,
    error: Mutex<Option<String>>,
}

impl Default for ExportProgress {
    fn default() -> Self {
        Self {
            nodes: AtomicU64::new(0),
            relationships: AtomicU64::new(0),
            records: AtomicU64::new(0),
            batches: AtomicU64::new(0),
            started: Instant::now(),
            state: Mutex::new(ExportState::Idle),
            error: Mutex::new(None),
        }
    }
}

impl ExportProgress {
    /// Create shared counters
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Count one row by kind
    pub fn record_row(&self, kind: RowKind) {
        let counter = match kind {
            RowKind::Node => &self.nodes,
            RowKind::Relationship => &self.relationships,
            RowKind::Record => &self.records,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Count one flushed batch
    pub fn record_batch(&self) {
        self.batches.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a failure message, keeping the first one
    pub fn record_failure(&self, message: impl Into<String>) {
        if let Ok(mut error) = self.error.lock() {
            error.get_or_insert_with(|| message.into());
        }
    }

    /// Check if a failure has been recorded
    pub fn has_failed(&self) -> bool {
        self.error.lock().map(|e| e.is_some()).unwrap_or(true)
    }

    /// Move to a new state; terminal states are final
    pub fn set_state(&self, next: ExportState) {
        if let Ok(mut state) = self.state.lock() {
            if !state.is_terminal() {
                *state = next;
            }
        }
    }

    /// Current state
    pub fn state(&self) -> ExportState {
        self.state.lock().map_or(ExportState::Failed, |s| *s)
    }

    /// Time since the counters were created
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Capture the current counters
    pub fn snapshot(&self) -> ProgressSnapshot {
        let nodes = self.nodes.load(Ordering::Relaxed);
        let relationships = self.relationships.load(Ordering::Relaxed);
        let records = self.records.load(Ordering::Relaxed);
        ProgressSnapshot {
            nodes,
            relationships,
            records,
            rows: nodes + relationships + records,
            batches: self.batches.load(Ordering::Relaxed),
            elapsed_ms: u64::try_from(self.elapsed().as_millis()).unwrap_or(u64::MAX),
        }
    }

    /// Capture the final outcome
    pub fn summary(&self) -> ExportSummary {
        ExportSummary {
            state: self.state(),
            progress: self.snapshot(),
            error: self.error.lock().ok().and_then(|e| e.clone()),
        }
    }
}

/// Receives progress notifications from a running export
pub trait ProgressReporter: Send + Sync {
    /// Called after each flushed batch
    fn update(&self, snapshot: &ProgressSnapshot);

    /// Called once when the export reaches a terminal state
    fn done(&self, summary: &ExportSummary);
}

/// Reporter that emits progress as tracing events
#[derive(Debug, Clone, Default)]
pub struct TracingReporter {
    name: String,
}

impl TracingReporter {
    /// Create a reporter labelled with an export name
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl ProgressReporter for TracingReporter {
    fn update(&self, snapshot: &ProgressSnapshot) {
        tracing::debug!(
            export = %self.name,
            rows = snapshot.rows,
            batches = snapshot.batches,
            "Export progress"
        );
    }

    fn done(&self, summary: &ExportSummary) {
        match summary.state {
            ExportState::Completed => tracing::info!(
                export = %self.name,
                nodes = summary.progress.nodes,
                relationships = summary.progress.relationships,
                records = summary.progress.records,
                batches = summary.progress.batches,
                elapsed_ms = summary.progress.elapsed_ms,
                "Export completed"
            ),
            ExportState::Cancelled => tracing::warn!(
                export = %self.name,
                rows = summary.progress.rows,
                "Export cancelled"
            ),
            _ => tracing::error!(
                export = %self.name,
                error = summary.error.as_deref().unwrap_or("unknown"),
                "Export failed"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_by_kind() {
        let progress = ExportProgress::new();
        progress.record_row(RowKind::Node);
        progress.record_row(RowKind::Node);
        progress.record_row(RowKind::Relationship);
        progress.record_row(RowKind::Record);
        progress.record_batch();

        let snapshot = progress.snapshot();
        assert_eq!(snapshot.nodes, 2);
        assert_eq!(snapshot.relationships, 1);
        assert_eq!(snapshot.records, 1);
        assert_eq!(snapshot.rows, 4);
        assert_eq!(snapshot.batches, 1);
    }

    #[test]
    fn test_terminal_state_is_final() {
        let progress = ExportProgress::new();
        assert_eq!(progress.state(), ExportState::Idle);
        progress.set_state(ExportState::Running);
        progress.set_state(ExportState::Cancelled);
        progress.set_state(ExportState::Completed);
        assert_eq!(progress.state(), ExportState::Cancelled);
    }

    #[test]
    fn test_first_failure_wins() {
        let progress = ExportProgress::new();
        assert!(!progress.has_failed());
        progress.record_failure("first");
        progress.record_failure("second");
        assert_eq!(progress.summary().error.as_deref(), Some("first"));
    }

    #[test]
    fn test_summary_serializes_state() {
        let progress = ExportProgress::new();
        progress.set_state(ExportState::Completed);
        let json = serde_json::to_value(progress.summary()).unwrap();
        assert_eq!(json["state"], "completed");
        assert!(json.get("error").is_none());
    }
}
