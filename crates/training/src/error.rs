// In crates/training/src/error.rs

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid training parameters: {0}")]
    InvalidParameters(String),

    #[error("No batches were available to aggregate; cannot calibrate thresholds")]
    EmptyDataset,

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error on {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Failed to encode thresholds: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Risk model error: {0}")]
    Risk(#[from] risk::Error),

    #[error("Executor failed: {0}")]
    Executor(String),

    #[error("Worker {worker_id} panicked")]
    WorkerPanicked { worker_id: usize },
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io { path: path.into(), source }
    }

    pub(crate) fn csv(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        Error::Csv { path: path.into(), source }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
