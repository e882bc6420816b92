// In crates/training/src/executor/cluster.rs

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::time::Duration;

use tokio::runtime::{Builder, Handle, Runtime};
use tokio::task::JoinSet;
use tokio::time::MissedTickBehavior;

use super::{run_worker, BatchExecutor, BatchFailure, BatchJob, BatchOutcome, ExecutionContext};
use crate::{Error, Result};

/// Submits every batch as an independent task to a tokio scheduler and polls
/// progress while they run.
///
/// `execute` blocks the calling thread, so it must not be called from inside
/// an async task. From async code, run the pipeline in `spawn_blocking`.
pub struct ClusterExecutor {
    handle: Handle,
    poll_interval: Duration,
    // Kept alive when the executor built its own scheduler.
    _runtime: Option<Runtime>,
}

impl ClusterExecutor {
    /// Uses an existing runtime.
    pub fn with_handle(handle: Handle, poll_interval: Duration) -> Self {
        Self { handle, poll_interval, _runtime: None }
    }

    /// Builds a dedicated multi-threaded runtime.
    pub fn new(poll_interval: Duration) -> Result<Self> {
        let runtime = Builder::new_multi_thread()
            .thread_name("risk-scheduler")
            .enable_time()
            .build()
            .map_err(|e| Error::Executor(format!("Failed to build tokio runtime: {}", e)))?;
        Ok(Self {
            handle: runtime.handle().clone(),
            poll_interval,
            _runtime: Some(runtime),
        })
    }

    async fn run_tasks(&self, jobs: Vec<BatchJob>, ctx: ExecutionContext) -> Vec<BatchOutcome> {
        let mut tasks = JoinSet::new();
        for job in jobs {
            let ctx = ctx.clone();
            tasks.spawn_blocking(move || {
                catch_unwind(AssertUnwindSafe(|| run_worker(&job, &ctx))).unwrap_or_else(|_| {
                    Err(BatchFailure {
                        worker_id: job.worker_id,
                        path: job.path.clone(),
                        error: Error::WorkerPanicked { worker_id: job.worker_id },
                    })
                })
            });
        }

        let mut ticker = tokio::time::interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut outcomes = Vec::new();

        loop {
            tokio::select! {
                joined = tasks.join_next() => match joined {
                    Some(Ok(outcome)) => {
                        if let Err(failure) = &outcome {
                            tracing::error!(%failure, "A batch task failed.");
                        }
                        outcomes.push(outcome);
                    }
                    Some(Err(e)) => tracing::error!(error = %e, "A batch task was lost."),
                    None => break,
                },
                _ = ticker.tick() => {
                    let snapshot = ctx.progress.poll();
                    tracing::debug!(completed = snapshot.completed, total = snapshot.total, "Polled batch progress.");
                }
            }
        }

        ctx.progress.poll();
        outcomes
    }
}

impl BatchExecutor for ClusterExecutor {
    fn name(&self) -> &'static str {
        "cluster"
    }

    fn execute(&self, jobs: Vec<BatchJob>, ctx: &ExecutionContext) -> Result<Vec<BatchOutcome>> {
        tracing::info!(batches = jobs.len(), poll_interval = ?self.poll_interval, "Submitting batches to the scheduler.");
        Ok(self.handle.block_on(self.run_tasks(jobs, ctx.clone())))
    }
}
