// In crates/training/src/pipeline.rs

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use app_config::{BenchmarkSettings, ExecutorKind, Settings, TrainingSettings};
use chrono::Utc;
use core_types::{SampleRange, ThresholdSet, TrainingDataset};
use events::{RunStatus, RunSummary};
use risk::RiskModelEngine;

use crate::aggregator::Aggregator;
use crate::batch_file::remove_stale_batches;
use crate::calibrator::calibrate;
use crate::cancellation::CancellationToken;
use crate::estimate::{estimate_duration, format_duration};
use crate::executor::{
    plan_batches, BatchExecutor, BatchManifest, ClusterExecutor, ExecutionContext, LocalPoolExecutor,
};
use crate::generator::BatchGenerator;
use crate::persister::{PersistSummary, ResultPersister};
use crate::progress::{LogSink, ProgressReporter, ProgressSink};
use crate::{Error, Result};

/// What to generate.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingParams {
    pub total_iterations: u64,
    pub size_range: SampleRange,
    pub value_range: SampleRange,
    pub worker_count: usize,
    pub sub_batch_size: usize,
}

impl TrainingParams {
    pub fn from_settings(settings: &TrainingSettings) -> Self {
        Self {
            total_iterations: settings.total_iterations,
            size_range: settings.size_range,
            value_range: settings.value_range,
            worker_count: settings.resolved_worker_count(),
            sub_batch_size: settings.sub_batch_size,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.total_iterations == 0 {
            return Err(Error::InvalidParameters("total_iterations must be greater than zero".into()));
        }
        if self.worker_count == 0 {
            return Err(Error::InvalidParameters("worker_count must be greater than zero".into()));
        }
        if self.sub_batch_size == 0 {
            return Err(Error::InvalidParameters("sub_batch_size must be greater than zero".into()));
        }
        self.size_range
            .validate()
            .map_err(|e| Error::InvalidParameters(format!("size_range: {}", e)))?;
        self.value_range
            .validate()
            .map_err(|e| Error::InvalidParameters(format!("value_range: {}", e)))
    }
}

/// A run that went all the way to calibration.
#[derive(Debug)]
pub struct TrainingReport {
    pub dataset: TrainingDataset,
    pub thresholds: ThresholdSet,
    /// Batches left out because their worker failed.
    pub failed_batches: usize,
    pub persisted: PersistSummary,
    pub elapsed: Duration,
}

/// A run stopped by cancellation. Rows produced before the stop are kept.
#[derive(Debug)]
pub struct AbortReport {
    pub dataset: TrainingDataset,
    pub failed_batches: usize,
    pub elapsed: Duration,
}

#[derive(Debug)]
pub enum TrainingOutcome {
    Completed(TrainingReport),
    Aborted(AbortReport),
}

/// Generate, aggregate, calibrate and persist, in that order.
pub struct TrainingPipeline {
    params: TrainingParams,
    engine: RiskModelEngine,
    executor: Box<dyn BatchExecutor>,
    work_dir: PathBuf,
    persister: ResultPersister,
    sink: Arc<dyn ProgressSink>,
    benchmark: BenchmarkSettings,
}

impl TrainingPipeline {
    pub fn new(
        params: TrainingParams,
        engine: RiskModelEngine,
        executor: Box<dyn BatchExecutor>,
        work_dir: impl Into<PathBuf>,
        persister: ResultPersister,
    ) -> Self {
        Self {
            params,
            engine,
            executor,
            work_dir: work_dir.into(),
            persister,
            sink: Arc::new(LogSink),
            benchmark: BenchmarkSettings::default(),
        }
    }

    /// Builds the pipeline described by `settings`.
    ///
    /// The cluster executor runs on `handle` when given, otherwise on a
    /// runtime of its own.
    pub fn from_settings(settings: &Settings, handle: Option<tokio::runtime::Handle>) -> Result<Self> {
        let params = TrainingParams::from_settings(&settings.training);
        let engine = RiskModelEngine::new(&settings.risk_model)?;
        let poll_interval = Duration::from_millis(settings.executor.poll_interval_ms);

        let executor: Box<dyn BatchExecutor> = match (settings.executor.kind, handle) {
            (ExecutorKind::Local, _) => Box::new(LocalPoolExecutor::new(params.worker_count)),
            (ExecutorKind::Cluster, Some(handle)) => Box::new(ClusterExecutor::with_handle(handle, poll_interval)),
            (ExecutorKind::Cluster, None) => Box::new(ClusterExecutor::new(poll_interval)?),
        };

        let persister = ResultPersister::new(
            &settings.storage.training_data_file,
            &settings.storage.thresholds_file,
        );

        Ok(Self::new(params, engine, executor, &settings.storage.work_dir, persister)
            .with_benchmark(settings.training.benchmark))
    }

    pub fn with_sink(mut self, sink: Arc<dyn ProgressSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn with_benchmark(mut self, benchmark: BenchmarkSettings) -> Self {
        self.benchmark = benchmark;
        self
    }

    pub fn params(&self) -> &TrainingParams {
        &self.params
    }

    /// Runs the whole pipeline.
    ///
    /// Cancellation through `token` yields [`TrainingOutcome::Aborted`] with
    /// the rows produced so far; thresholds are neither calibrated nor written
    /// in that case. If no rows survive a run that was not cancelled, the
    /// result is [`Error::EmptyDataset`].
    pub fn run(&self, token: &CancellationToken) -> Result<TrainingOutcome> {
        self.params.validate()?;
        let started = Instant::now();
        let estimate = estimate_duration(self.params.total_iterations, &self.benchmark);
        tracing::info!(
            total_iterations = self.params.total_iterations,
            workers = self.params.worker_count,
            executor = self.executor.name(),
            estimate = %format_duration(estimate),
            "Generating training data in parallel..."
        );

        remove_stale_batches(&self.work_dir);

        let jobs = plan_batches(self.params.total_iterations, self.params.worker_count, &self.work_dir);
        let progress = Arc::new(ProgressReporter::new(self.params.total_iterations, self.sink.clone()));
        let ctx = ExecutionContext {
            generator: Arc::new(BatchGenerator::new(
                self.engine.clone(),
                self.params.size_range,
                self.params.value_range,
            )),
            token: token.clone(),
            progress: progress.clone(),
            sub_batch_size: self.params.sub_batch_size,
        };

        let outcomes = match self.executor.execute(jobs.clone(), &ctx) {
            Ok(outcomes) => outcomes,
            Err(e) => {
                Aggregator::cleanup(&jobs);
                return Err(e);
            }
        };

        let mut manifests: Vec<BatchManifest> = Vec::with_capacity(outcomes.len());
        let mut failed_batches = 0;
        for outcome in outcomes {
            match outcome {
                Ok(manifest) => manifests.push(manifest),
                Err(_) => failed_batches += 1,
            }
        }
        if failed_batches > 0 {
            tracing::warn!(failed_batches, "Some batches failed and will be left out of the dataset.");
        }

        tracing::info!("Analyzing training data...");
        let dataset = Aggregator::from_files(&manifests);
        Aggregator::cleanup(&jobs);

        if token.is_cancelled() {
            let elapsed = started.elapsed();
            tracing::warn!(rows = dataset.len(), "Training was aborted. Thresholds were not recalculated.");
            progress.finish(self.summary(RunStatus::Aborted, dataset.len(), failed_batches, None, elapsed));
            return Ok(TrainingOutcome::Aborted(AbortReport { dataset, failed_batches, elapsed }));
        }

        let thresholds = match calibrate(&dataset) {
            Ok(thresholds) => thresholds,
            Err(e) => {
                tracing::error!(error = %e, failed_batches, "Calibration failed.");
                progress.finish(self.summary(RunStatus::Failed, 0, failed_batches, None, started.elapsed()));
                return Err(e);
            }
        };

        let persisted = self.persister.persist(&dataset, &thresholds);
        let elapsed = started.elapsed();
        let status = if failed_batches > 0 { RunStatus::CompletedWithFailures } else { RunStatus::Completed };
        progress.finish(self.summary(status, dataset.len(), failed_batches, Some(thresholds), elapsed));

        Ok(TrainingOutcome::Completed(TrainingReport {
            dataset,
            thresholds,
            failed_batches,
            persisted,
            elapsed,
        }))
    }

    fn summary(
        &self,
        status: RunStatus,
        rows: usize,
        failed_batches: usize,
        thresholds: Option<ThresholdSet>,
        elapsed: Duration,
    ) -> RunSummary {
        RunSummary {
            status,
            rows,
            requested: self.params.total_iterations,
            failed_batches,
            thresholds,
            elapsed_secs: elapsed.as_secs_f64(),
            finished_at: Utc::now(),
        }
    }
}
