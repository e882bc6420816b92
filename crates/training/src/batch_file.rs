// In crates/training/src/batch_file.rs

use core_types::ScoredTrade;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

use crate::{Error, Result};

const BATCH_FILE_PREFIX: &str = "batch_";
const BATCH_FILE_EXTENSION: &str = "csv";

/// The intermediate file owned by `worker_id`.
pub fn batch_path(work_dir: &Path, worker_id: usize) -> PathBuf {
    work_dir.join(format!("{}{:03}.{}", BATCH_FILE_PREFIX, worker_id, BATCH_FILE_EXTENSION))
}

fn is_batch_file(path: &Path) -> bool {
    let name_matches = path
        .file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with(BATCH_FILE_PREFIX));
    let extension_matches = path.extension().and_then(|e| e.to_str()) == Some(BATCH_FILE_EXTENSION);
    name_matches && extension_matches
}

/// Creates `path`'s parent directory if it has one.
pub(crate) fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }
    }
    Ok(())
}

/// Appends scored rows to one worker's batch file.
pub struct BatchWriter {
    path: PathBuf,
    writer: csv::Writer<File>,
}

impl BatchWriter {
    /// Creates (or truncates) the file at `path`.
    pub fn create(path: &Path) -> Result<Self> {
        ensure_parent_dir(path)?;
        let writer = csv::Writer::from_path(path).map_err(|e| Error::csv(path, e))?;
        Ok(Self { path: path.to_path_buf(), writer })
    }

    pub fn append(&mut self, rows: &[ScoredTrade]) -> Result<()> {
        for row in rows {
            self.writer.serialize(row).map_err(|e| Error::csv(&self.path, e))?;
        }
        self.writer.flush().map_err(|e| Error::io(&self.path, e))
    }

    pub fn finish(mut self) -> Result<PathBuf> {
        self.writer.flush().map_err(|e| Error::io(&self.path, e))?;
        Ok(self.path)
    }
}

/// Reads every row of a batch or dataset file.
pub fn read_rows(path: &Path) -> Result<Vec<ScoredTrade>> {
    let mut reader = csv::Reader::from_path(path).map_err(|e| Error::csv(path, e))?;
    reader
        .deserialize()
        .collect::<std::result::Result<Vec<ScoredTrade>, csv::Error>>()
        .map_err(|e| Error::csv(path, e))
}

/// Deletes `path`, ignoring a file that is already gone.
pub fn remove_batch_file(path: &Path) {
    match fs::remove_file(path) {
        Ok(()) => tracing::debug!(path = %path.display(), "Removed batch file."),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!(path = %path.display(), error = %e, "Failed to remove batch file."),
    }
}

/// Removes batch files left in `work_dir` by an earlier, interrupted run.
///
/// Returns how many files were deleted.
pub fn remove_stale_batches(work_dir: &Path) -> usize {
    let entries = match fs::read_dir(work_dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return 0,
        Err(e) => {
            tracing::warn!(path = %work_dir.display(), error = %e, "Could not scan work directory for stale batches.");
            return 0;
        }
    };

    let mut removed = 0;
    for path in entries.filter_map(|entry| entry.ok().map(|e| e.path())) {
        if is_batch_file(&path) && fs::remove_file(&path).is_ok() {
            removed += 1;
        }
    }
    if removed > 0 {
        tracing::info!(removed, path = %work_dir.display(), "Removed stale batch files from a previous run.");
    }
    removed
}
