// In crates/app-config/src/types.rs

use serde::Deserialize;
use std::path::PathBuf;

use core_types::SampleRange;
use risk::RiskModelSettings;

use crate::{Error, Result};

#[derive(Deserialize, Debug, Clone)]
pub struct Settings {
    /// The application's general settings.
    pub app: AppSettings,
    /// What to generate and how much of it.
    pub training: TrainingSettings,
    /// Which executor runs the batches.
    #[serde(default)]
    pub executor: ExecutorSettings,
    /// Where intermediate and final files live.
    #[serde(default)]
    pub storage: StorageSettings,
    #[serde(default)]
    pub risk_model: RiskModelSettings,
}

impl Settings {
    /// Checks every section for values the pipeline cannot run with.
    pub fn validate(&self) -> Result<()> {
        self.training.validate()?;
        if self.executor.poll_interval_ms == 0 {
            return Err(Error::Invalid("executor.poll_interval_ms must be greater than zero".into()));
        }
        self.risk_model
            .validate()
            .map_err(|e| Error::Invalid(e.to_string()))
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct AppSettings {
    /// The environment the application is running in (e.g., "development", "production").
    pub environment: String,
    /// The log level for the application.
    pub log_level: String,
}

#[derive(Deserialize, Debug, Clone)]
pub struct TrainingSettings {
    /// Total number of simulated trades across all workers.
    pub total_iterations: u64,
    pub size_range: SampleRange,
    pub value_range: SampleRange,
    /// Number of parallel workers. Defaults to the available parallelism.
    #[serde(default)]
    pub worker_count: Option<usize>,
    /// Samples generated between two checkpoints inside a worker.
    #[serde(default = "default_sub_batch_size")]
    pub sub_batch_size: usize,
    #[serde(default)]
    pub benchmark: BenchmarkSettings,
}

impl TrainingSettings {
    pub fn validate(&self) -> Result<()> {
        if self.total_iterations == 0 {
            return Err(Error::Invalid("training.total_iterations must be greater than zero".into()));
        }
        if self.worker_count == Some(0) {
            return Err(Error::Invalid("training.worker_count must be greater than zero".into()));
        }
        if self.sub_batch_size == 0 {
            return Err(Error::Invalid("training.sub_batch_size must be greater than zero".into()));
        }
        self.size_range
            .validate()
            .map_err(|e| Error::Invalid(format!("training.size_range: {}", e)))?;
        self.value_range
            .validate()
            .map_err(|e| Error::Invalid(format!("training.value_range: {}", e)))?;
        Ok(())
    }

    /// The configured worker count, or the machine's available parallelism.
    pub fn resolved_worker_count(&self) -> usize {
        self.worker_count.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        })
    }
}

/// A reference timing used to estimate how long a run will take.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct BenchmarkSettings {
    pub iterations: u64,
    pub seconds: f64,
}

impl Default for BenchmarkSettings {
    fn default() -> Self {
        // 24,331,296 samples took 50 minutes on the reference machine.
        Self { iterations: 24_331_296, seconds: 3_000.0 }
    }
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ExecutorKind {
    /// A rayon thread pool on this machine.
    #[default]
    Local,
    /// Independent tasks submitted to a tokio scheduler.
    Cluster,
}

#[derive(Deserialize, Debug, Clone)]
pub struct ExecutorSettings {
    #[serde(default)]
    pub kind: ExecutorKind,
    /// How often the cluster executor polls task progress.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

impl Default for ExecutorSettings {
    fn default() -> Self {
        Self {
            kind: ExecutorKind::default(),
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct StorageSettings {
    /// Directory holding the per-worker batch files.
    #[serde(default = "default_work_dir")]
    pub work_dir: PathBuf,
    #[serde(default = "default_training_data_file")]
    pub training_data_file: PathBuf,
    #[serde(default = "default_thresholds_file")]
    pub thresholds_file: PathBuf,
    /// Creating this file aborts a running training job.
    #[serde(default = "default_abort_marker_file")]
    pub abort_marker_file: PathBuf,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            work_dir: default_work_dir(),
            training_data_file: default_training_data_file(),
            thresholds_file: default_thresholds_file(),
            abort_marker_file: default_abort_marker_file(),
        }
    }
}

/// Helper functions for serde defaults
fn default_sub_batch_size() -> usize { 500 }
fn default_poll_interval_ms() -> u64 { 250 }
fn default_work_dir() -> PathBuf { PathBuf::from("data/tmp") }
fn default_training_data_file() -> PathBuf { PathBuf::from("data/training_data.csv") }
fn default_thresholds_file() -> PathBuf { PathBuf::from("data/risk_thresholds.json") }
fn default_abort_marker_file() -> PathBuf { PathBuf::from("data/tmp/ABORT") }
