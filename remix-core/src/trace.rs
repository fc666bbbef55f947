//! Append-only trace sink for pipeline checkpoints.
//!
//! Tracing must never interrupt a run: the sink is infallible and
//! implementations swallow their own failures.

use std::sync::Mutex;

use serde_json::Value;

/// A sink for named checkpoints with a snapshot of relevant state.
pub trait TraceSink: Send + Sync {
    fn record(&self, checkpoint: &str, snapshot: Value);
}

/// Sink that forwards checkpoints to the `tracing` subscriber.
#[derive(Debug, Default)]
pub struct LogTrace;

impl TraceSink for LogTrace {
    fn record(&self, checkpoint: &str, snapshot: Value) {
        tracing::info!(checkpoint, %snapshot, "trace");
    }
}

/// In-memory sink for tests.
#[derive(Debug, Default)]
pub struct RecordingTrace {
    entries: Mutex<Vec<(String, Value)>>,
}

impl RecordingTrace {
    pub fn new() -> Self {
        Self::default()
    }

    /// All recorded entries in order.
    pub fn entries(&self) -> Vec<(String, Value)> {
        self.entries.lock().map(|e| e.clone()).unwrap_or_default()
    }

    /// Checkpoint names in order.
    pub fn checkpoints(&self) -> Vec<String> {
        self.entries()
            .into_iter()
            .map(|(checkpoint, _)| checkpoint)
            .collect()
    }
}

impl TraceSink for RecordingTrace {
    fn record(&self, checkpoint: &str, snapshot: Value) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.push((checkpoint.to_string(), snapshot));
        }
    }
}
