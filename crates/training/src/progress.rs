// In crates/training/src/progress.rs

use events::{ProgressUpdate, RunSummary, TrainingEvent};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;

/// Somewhere to push training events.
///
/// Implementations must return quickly: `publish` is called from worker
/// threads in the middle of a run.
pub trait ProgressSink: Send + Sync {
    fn publish(&self, event: TrainingEvent);
}

impl<F> ProgressSink for F
where
    F: Fn(TrainingEvent) + Send + Sync,
{
    fn publish(&self, event: TrainingEvent) {
        self(event)
    }
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSink;

impl ProgressSink for NoopSink {
    fn publish(&self, _event: TrainingEvent) {}
}

/// Writes events to the tracing subscriber.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl ProgressSink for LogSink {
    fn publish(&self, event: TrainingEvent) {
        match event {
            TrainingEvent::Progress(update) => tracing::info!(
                completed = update.completed,
                total = update.total,
                percent = format!("{:.0}", update.percentage()),
                "Generating training data..."
            ),
            TrainingEvent::Finished(summary) => tracing::info!(
                status = ?summary.status,
                rows = summary.rows,
                failed_batches = summary.failed_batches,
                "Training run finished."
            ),
            TrainingEvent::Log(_) => {}
        }
    }
}

/// Forwards events to a broadcast channel. Lagging or absent receivers never
/// slow the sender down.
#[derive(Debug, Clone)]
pub struct BroadcastSink {
    tx: broadcast::Sender<TrainingEvent>,
}

impl BroadcastSink {
    pub fn new(tx: broadcast::Sender<TrainingEvent>) -> Self {
        Self { tx }
    }
}

impl ProgressSink for BroadcastSink {
    fn publish(&self, event: TrainingEvent) {
        let _ = self.tx.send(event);
    }
}

/// Counts produced samples across workers and reports each new whole percent.
pub struct ProgressReporter {
    sink: Arc<dyn ProgressSink>,
    total: u64,
    completed: AtomicU64,
    last_percent: AtomicU64,
    last_polled: AtomicU64,
}

impl ProgressReporter {
    pub fn new(total: u64, sink: Arc<dyn ProgressSink>) -> Self {
        Self {
            sink,
            total,
            completed: AtomicU64::new(0),
            last_percent: AtomicU64::new(0),
            last_polled: AtomicU64::new(0),
        }
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    /// Records `count` newly produced samples.
    pub fn advance(&self, count: u64) {
        if count == 0 {
            return;
        }
        let completed = self.completed.fetch_add(count, Ordering::Relaxed) + count;
        let percent = if self.total == 0 { 100 } else { (completed * 100 / self.total).min(100) };
        // Only the caller that moves the percentage forward publishes it.
        if self.last_percent.fetch_max(percent, Ordering::Relaxed) < percent {
            self.sink.publish(TrainingEvent::Progress(ProgressUpdate::new(completed, self.total)));
        }
    }

    pub fn snapshot(&self) -> ProgressUpdate {
        ProgressUpdate::new(self.completed.load(Ordering::Relaxed), self.total)
    }

    /// Publishes the current count if it moved since the previous poll.
    pub fn poll(&self) -> ProgressUpdate {
        let snapshot = self.snapshot();
        if self.last_polled.swap(snapshot.completed, Ordering::Relaxed) != snapshot.completed {
            self.sink.publish(TrainingEvent::Progress(snapshot));
        }
        snapshot
    }

    pub fn finish(&self, summary: RunSummary) {
        self.sink.publish(TrainingEvent::Finished(summary));
    }
}
