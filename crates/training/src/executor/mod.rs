// In crates/training/src/executor/mod.rs

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::batch_file::{batch_path, BatchWriter};
use crate::cancellation::CancellationToken;
use crate::generator::BatchGenerator;
use crate::progress::ProgressReporter;
use crate::{Error, Result};

pub mod cluster;
pub mod local;

pub use cluster::ClusterExecutor;
pub use local::LocalPoolExecutor;

/// The work assigned to one worker.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchJob {
    pub worker_id: usize,
    pub num_samples: usize,
    /// The intermediate file this worker owns exclusively.
    pub path: PathBuf,
}

/// Where a finished worker left its rows.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchManifest {
    pub worker_id: usize,
    pub path: PathBuf,
    pub rows: usize,
    pub cancelled: bool,
}

/// A worker that could not produce its batch.
#[derive(Debug)]
pub struct BatchFailure {
    pub worker_id: usize,
    pub path: PathBuf,
    pub error: Error,
}

impl fmt::Display for BatchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "worker {} ({}): {}", self.worker_id, self.path.display(), self.error)
    }
}

pub type BatchOutcome = std::result::Result<BatchManifest, BatchFailure>;

/// Everything a worker shares with its siblings.
#[derive(Clone)]
pub struct ExecutionContext {
    pub generator: Arc<BatchGenerator>,
    pub token: CancellationToken,
    pub progress: Arc<ProgressReporter>,
    /// Samples generated and written between two checkpoints.
    pub sub_batch_size: usize,
}

/// Runs a set of batch jobs and reports one outcome per job.
///
/// A failing job must not stop the others; its failure is returned in its
/// outcome. An `Err` means the executor itself could not run.
pub trait BatchExecutor: Send + Sync {
    fn name(&self) -> &'static str;

    fn execute(&self, jobs: Vec<BatchJob>, ctx: &ExecutionContext) -> Result<Vec<BatchOutcome>>;
}

/// Splits `total` samples across `workers` jobs.
///
/// Every job gets `total / workers` samples and the first `total % workers`
/// jobs one more, so the job sizes add up to `total`. Workers that would get
/// nothing are not scheduled.
pub fn plan_batches(total: u64, workers: usize, work_dir: &Path) -> Vec<BatchJob> {
    let workers = workers.max(1) as u64;
    let base = total / workers;
    let remainder = total % workers;

    (0..workers)
        .map(|worker| {
            let extra = u64::from(worker < remainder);
            BatchJob {
                worker_id: worker as usize,
                num_samples: (base + extra) as usize,
                path: batch_path(work_dir, worker as usize),
            }
        })
        .filter(|job| job.num_samples > 0)
        .collect()
}

/// Generates one job's samples sub-batch by sub-batch, appending each to the
/// job's file.
///
/// Stops early when the token fires; whatever was written stays valid.
pub fn run_worker(job: &BatchJob, ctx: &ExecutionContext) -> BatchOutcome {
    let fail = |error: Error| BatchFailure {
        worker_id: job.worker_id,
        path: job.path.clone(),
        error,
    };

    let mut rng = rand::rng();
    let mut writer = BatchWriter::create(&job.path).map_err(fail)?;
    let sub_batch_size = ctx.sub_batch_size.max(1);
    let mut produced = 0;
    let mut cancelled = false;

    while produced < job.num_samples {
        let chunk = (job.num_samples - produced).min(sub_batch_size);
        let batch = ctx.generator.generate(job.worker_id, chunk, &mut rng, &ctx.token);
        writer.append(&batch.rows).map_err(fail)?;
        produced += batch.len();
        ctx.progress.advance(batch.len() as u64);
        if batch.cancelled {
            cancelled = true;
            break;
        }
    }

    let path = writer.finish().map_err(fail)?;
    tracing::debug!(worker_id = job.worker_id, rows = produced, cancelled, "Worker finished its batch.");

    Ok(BatchManifest {
        worker_id: job.worker_id,
        path,
        rows: produced,
        cancelled,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_spreads_remainder() {
        let jobs = plan_batches(10, 4, Path::new("work"));
        let sizes: Vec<usize> = jobs.iter().map(|j| j.num_samples).collect();
        assert_eq!(sizes, vec![3, 3, 2, 2]);
        assert_eq!(jobs[2].path, batch_path(Path::new("work"), 2));
    }

    #[test]
    fn test_plan_conserves_total() {
        for (total, workers) in [(1_000, 7), (24_331_296, 12), (5, 5), (99, 1)] {
            let jobs = plan_batches(total, workers, Path::new("w"));
            let planned: u64 = jobs.iter().map(|j| j.num_samples as u64).sum();
            assert_eq!(planned, total);
        }
    }

    #[test]
    fn test_plan_skips_idle_workers() {
        let jobs = plan_batches(2, 8, Path::new("w"));
        assert_eq!(jobs.len(), 2);
        assert!(plan_batches(0, 4, Path::new("w")).is_empty());
    }
}
