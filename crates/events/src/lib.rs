// --- Training Event Structures ---

use chrono::{DateTime, Utc};
use core_types::ThresholdSet;
use serde::Serialize;

/// Represents a log message event forwarded to observers.
#[derive(Debug, Clone, Serialize)]
pub struct LogMessage {
    pub timestamp: DateTime<Utc>,
    pub level: String,
    pub message: String,
}

/// A point-in-time view of how many samples have been produced.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProgressUpdate {
    pub completed: u64,
    pub total: u64,
}

impl ProgressUpdate {
    pub fn new(completed: u64, total: u64) -> Self {
        Self { completed, total }
    }

    /// Completion in percent, `100.0` for an empty run.
    pub fn percentage(&self) -> f64 {
        if self.total == 0 {
            return 100.0;
        }
        (self.completed as f64 / self.total as f64 * 100.0).min(100.0)
    }
}

/// How a training run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// Every batch finished.
    Completed,
    /// Finished, but some batches failed and were left out.
    CompletedWithFailures,
    /// Stopped by a cancellation request.
    Aborted,
    /// Nothing usable was produced.
    Failed,
}

/// The final summary of a training run.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub status: RunStatus,
    pub rows: usize,
    pub requested: u64,
    pub failed_batches: usize,
    pub thresholds: Option<ThresholdSet>,
    pub elapsed_secs: f64,
    pub finished_at: DateTime<Utc>,
}

/// The top-level event enum.
/// `tag` and `content` are used by serde for clean JSON representation.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "payload")]
pub enum TrainingEvent {
    Log(LogMessage),
    Progress(ProgressUpdate),
    Finished(RunSummary),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentage() {
        assert_eq!(ProgressUpdate::new(25, 100).percentage(), 25.0);
        assert_eq!(ProgressUpdate::new(0, 0).percentage(), 100.0);
        assert_eq!(ProgressUpdate::new(12, 10).percentage(), 100.0);
    }
}
