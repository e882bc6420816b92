// In crates/training/src/aggregator.rs

use core_types::{BatchResult, TrainingDataset};

use crate::batch_file::{read_rows, remove_batch_file};
use crate::executor::{BatchJob, BatchManifest};
use crate::Error;

/// Merges batch outputs into one dataset.
///
/// Batches that cannot be read are skipped with a warning. The merged rows
/// are the multiset union of the inputs, whatever order they arrive in.
#[derive(Debug, Default)]
pub struct Aggregator;

impl Aggregator {
    /// Reads the batch file of every manifest.
    pub fn from_files(manifests: &[BatchManifest]) -> TrainingDataset {
        let mut dataset = TrainingDataset::new();
        let mut skipped = 0;

        for manifest in manifests {
            if !manifest.path.exists() {
                tracing::warn!(worker_id = manifest.worker_id, path = %manifest.path.display(), "Batch file is missing. Skipping.");
                skipped += 1;
                continue;
            }
            match read_rows(&manifest.path) {
                Ok(rows) => {
                    if rows.len() != manifest.rows {
                        tracing::warn!(
                            worker_id = manifest.worker_id,
                            expected = manifest.rows,
                            found = rows.len(),
                            "Batch file row count differs from what the worker reported."
                        );
                    }
                    dataset.extend(rows);
                }
                Err(Error::Csv { path, source }) => {
                    tracing::warn!(worker_id = manifest.worker_id, path = %path.display(), error = %source, "Batch file is unreadable. Skipping.");
                    skipped += 1;
                }
                Err(e) => {
                    tracing::warn!(worker_id = manifest.worker_id, error = %e, "Could not read batch. Skipping.");
                    skipped += 1;
                }
            }
        }

        tracing::info!(batches = manifests.len() - skipped, skipped, rows = dataset.len(), "Aggregated batch files.");
        dataset
    }

    /// Merges batches that are already in memory.
    pub fn merge(batches: impl IntoIterator<Item = BatchResult>) -> TrainingDataset {
        let mut dataset = TrainingDataset::new();
        for batch in batches {
            dataset.extend(batch.rows);
        }
        dataset
    }

    /// Deletes the intermediate file of every job, whether or not it succeeded.
    pub fn cleanup(jobs: &[BatchJob]) {
        for job in jobs {
            remove_batch_file(&job.path);
        }
    }
}
