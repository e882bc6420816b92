// In crates/training/src/lib.rs

pub mod aggregator;
pub mod batch_file;
pub mod calibrator;
pub mod cancellation;
pub mod error;
pub mod estimate;
pub mod executor;
pub mod generator;
pub mod persister;
pub mod pipeline;
pub mod progress;

// Re-export public types
pub use aggregator::Aggregator;
pub use calibrator::calibrate;
pub use cancellation::{request_abort, CancellationToken};
pub use error::{Error, Result};
pub use executor::{BatchExecutor, ClusterExecutor, LocalPoolExecutor};
pub use generator::BatchGenerator;
pub use persister::{PersistSummary, ResultPersister};
pub use pipeline::{AbortReport, TrainingOutcome, TrainingParams, TrainingPipeline, TrainingReport};
pub use progress::{BroadcastSink, LogSink, NoopSink, ProgressReporter, ProgressSink};
