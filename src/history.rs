//! Fire-and-forget analysis history.
//!
//! The core never persists anything itself. The HTTP layer hands each
//! successful result to a [`HistorySink`]; the channel implementation queues
//! it with `try_send` and a background task drains the queue. A full queue
//! drops the record; a computation never waits on history.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// One completed analysis.
#[derive(Debug, Clone, Serialize)]
pub struct HistoryRecord {
    pub operation: &'static str,
    pub recorded_at: DateTime<Utc>,
    /// Compact result summary (counts, top-level figures), not the full payload
    pub summary: serde_json::Value,
}

impl HistoryRecord {
    pub fn new(operation: &'static str, summary: serde_json::Value) -> Self {
        Self {
            operation,
            recorded_at: Utc::now(),
            summary,
        }
    }
}

/// Destination for analysis history. Must never block the caller.
pub trait HistorySink: Send + Sync {
    fn record(&self, record: HistoryRecord);
}

/// Discards every record.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl HistorySink for NullSink {
    fn record(&self, _record: HistoryRecord) {}
}

/// Bounded tokio channel drained by a logging task.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::Sender<HistoryRecord>,
    dropped: Arc<AtomicU64>,
}

impl ChannelSink {
    /// Create the sink and spawn its drain task on the current runtime.
    ///
    /// The task stops when `cancel` fires or every sender is gone, and
    /// returns the number of records it drained.
    pub fn spawn(capacity: usize, cancel: CancellationToken) -> (Self, JoinHandle<u64>) {
        let (tx, mut rx) = mpsc::channel::<HistoryRecord>(capacity.max(1));
        let handle = tokio::spawn(async move {
            let mut drained = 0u64;
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => {
                        debug!(drained, "History sink shutting down");
                        break;
                    }
                    next = rx.recv() => {
                        let Some(record) = next else { break };
                        drained += 1;
                        info!(
                            operation = record.operation,
                            recorded_at = %record.recorded_at.to_rfc3339(),
                            summary = %record.summary,
                            "Analysis recorded"
                        );
                    }
                }
            }
            drained
        });
        (
            Self {
                tx,
                dropped: Arc::new(AtomicU64::new(0)),
            },
            handle,
        )
    }

    /// Records dropped because the queue was full or closed.
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl HistorySink for ChannelSink {
    fn record(&self, record: HistoryRecord) {
        if let Err(e) = self.tx.try_send(record) {
            let total = self.dropped.fetch_add(1, Ordering::Relaxed) + 1;
            match e {
                mpsc::error::TrySendError::Full(r) => {
                    debug!(operation = r.operation, total, "History queue full, record dropped")
                }
                mpsc::error::TrySendError::Closed(r) => {
                    warn!(operation = r.operation, total, "History sink closed, record dropped")
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_channel_sink_drains_records() {
        let cancel = CancellationToken::new();
        let (sink, handle) = ChannelSink::spawn(8, cancel.clone());
        sink.record(HistoryRecord::new("simulate_propagation", json!({"steps": 13})));
        sink.record(HistoryRecord::new("analyze_fragility", json!({"critical": 1})));
        drop(sink);
        assert_eq!(handle.await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_full_queue_drops_without_blocking() {
        let (tx, _rx) = mpsc::channel::<HistoryRecord>(1);
        let sink = ChannelSink {
            tx,
            dropped: Arc::new(AtomicU64::new(0)),
        };
        for _ in 0..3 {
            sink.record(HistoryRecord::new("detect_vessel_anomalies", json!({})));
        }
        assert_eq!(sink.dropped(), 2);
    }

    #[tokio::test]
    async fn test_cancel_stops_drain_task() {
        let cancel = CancellationToken::new();
        let (_sink, handle) = ChannelSink::spawn(4, cancel.clone());
        cancel.cancel();
        assert_eq!(handle.await.unwrap(), 0);
    }
}
