// In crates/training/src/executor/local.rs

use rayon::prelude::*;
use rayon::ThreadPoolBuilder;

use super::{run_worker, BatchExecutor, BatchJob, BatchOutcome, ExecutionContext};
use crate::{Error, Result};

/// Runs every batch on a dedicated rayon pool and waits for all of them.
#[derive(Debug, Clone)]
pub struct LocalPoolExecutor {
    workers: usize,
}

impl LocalPoolExecutor {
    pub fn new(workers: usize) -> Self {
        Self { workers: workers.max(1) }
    }
}

impl BatchExecutor for LocalPoolExecutor {
    fn name(&self) -> &'static str {
        "local"
    }

    fn execute(&self, jobs: Vec<BatchJob>, ctx: &ExecutionContext) -> Result<Vec<BatchOutcome>> {
        tracing::info!(threads = self.workers, batches = jobs.len(), "Configuring Rayon thread pool.");
        // Not the global pool: `build_global` only succeeds once per process.
        let pool = ThreadPoolBuilder::new()
            .num_threads(self.workers)
            .thread_name(|i| format!("risk-worker-{}", i))
            .build()
            .map_err(|e| Error::Executor(format!("Failed to build Rayon thread pool: {}", e)))?;

        let outcomes: Vec<BatchOutcome> = pool.install(|| {
            jobs.par_iter()
                .map(|job| {
                    let outcome = run_worker(job, ctx);
                    if let Err(failure) = &outcome {
                        tracing::error!(%failure, "A batch worker failed.");
                    }
                    outcome
                })
                .collect()
        });

        Ok(outcomes)
    }
}
