// In crates/training/src/persister.rs

use core_types::{ThresholdSet, TrainingDataset};
use std::fs;
use std::path::{Path, PathBuf};

use crate::batch_file::{ensure_parent_dir, BatchWriter};
use crate::{Error, Result};

/// Which outputs made it to disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PersistSummary {
    pub dataset_written: bool,
    pub thresholds_written: bool,
}

impl PersistSummary {
    pub fn all_written(&self) -> bool {
        self.dataset_written && self.thresholds_written
    }
}

/// Writes the training dataset (CSV) and the thresholds (JSON).
///
/// The two writes are independent and best-effort: a failure is logged and
/// reported in the returned [`PersistSummary`], never raised.
#[derive(Debug, Clone)]
pub struct ResultPersister {
    dataset_path: PathBuf,
    thresholds_path: PathBuf,
}

impl ResultPersister {
    pub fn new(dataset_path: impl Into<PathBuf>, thresholds_path: impl Into<PathBuf>) -> Self {
        Self {
            dataset_path: dataset_path.into(),
            thresholds_path: thresholds_path.into(),
        }
    }

    pub fn dataset_path(&self) -> &Path {
        &self.dataset_path
    }

    pub fn thresholds_path(&self) -> &Path {
        &self.thresholds_path
    }

    pub fn persist(&self, dataset: &TrainingDataset, thresholds: &ThresholdSet) -> PersistSummary {
        tracing::info!(path = %self.dataset_path.display(), rows = dataset.len(), "Saving training data to CSV...");
        let dataset_written = match self.write_dataset(dataset) {
            Ok(()) => {
                tracing::info!("Training data saved successfully.");
                true
            }
            Err(e) => {
                tracing::error!(error = %e, "Error saving training data.");
                false
            }
        };

        tracing::info!(path = %self.thresholds_path.display(), "Saving thresholds to JSON...");
        let thresholds_written = match self.write_thresholds(thresholds) {
            Ok(()) => {
                tracing::info!("Thresholds saved successfully.");
                true
            }
            Err(e) => {
                tracing::error!(error = %e, "Error saving thresholds.");
                false
            }
        };

        PersistSummary { dataset_written, thresholds_written }
    }

    pub fn write_dataset(&self, dataset: &TrainingDataset) -> Result<()> {
        let mut writer = BatchWriter::create(&self.dataset_path)?;
        writer.append(&dataset.rows)?;
        writer.finish()?;
        Ok(())
    }

    pub fn write_thresholds(&self, thresholds: &ThresholdSet) -> Result<()> {
        if !thresholds.is_finite() {
            return Err(Error::InvalidParameters(format!(
                "refusing to write non-finite thresholds {:?}",
                thresholds
            )));
        }
        ensure_parent_dir(&self.thresholds_path)?;
        let json = serde_json::to_string_pretty(thresholds)?;
        fs::write(&self.thresholds_path, json).map_err(|e| Error::io(&self.thresholds_path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch_file::read_rows;
    use core_types::{RiskScores, ScoredTrade, TradeSample};
    use tempfile::TempDir;

    fn dataset() -> TrainingDataset {
        TrainingDataset {
            rows: vec![
                ScoredTrade::new(TradeSample::new(5, 500.0), RiskScores { final_risk: 0.1, ..RiskScores::default() }),
                ScoredTrade::new(TradeSample::new(6, 600.0), RiskScores { final_risk: 0.2, ..RiskScores::default() }),
            ],
        }
    }

    #[test]
    fn test_persists_both_outputs() {
        let dir = TempDir::new().unwrap();
        let persister = ResultPersister::new(
            dir.path().join("out/training_data.csv"),
            dir.path().join("out/risk_thresholds.json"),
        );
        let thresholds = ThresholdSet::new(0.1, 0.15, 0.2).unwrap();

        let summary = persister.persist(&dataset(), &thresholds);
        assert!(summary.all_written());

        assert_eq!(read_rows(persister.dataset_path()).unwrap(), dataset().rows);
        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(persister.thresholds_path()).unwrap()).unwrap();
        assert_eq!(json["Low"].as_f64(), Some(0.1));
        assert_eq!(json["Medium"].as_f64(), Some(0.15));
        assert_eq!(json["High"].as_f64(), Some(0.2));
        assert!(json["Low"].is_f64());
    }

    #[test]
    fn test_whole_number_thresholds_are_written_as_floats() {
        let dir = TempDir::new().unwrap();
        let persister = ResultPersister::new(dir.path().join("d.csv"), dir.path().join("t.json"));
        persister.write_thresholds(&ThresholdSet::new(0.0, 0.5, 1.0).unwrap()).unwrap();

        let content = fs::read_to_string(dir.path().join("t.json")).unwrap();
        assert!(content.contains("\"Low\": 0.0"));
        assert!(content.contains("\"High\": 1.0"));
    }

    #[test]
    fn test_dataset_failure_does_not_block_thresholds() {
        let dir = TempDir::new().unwrap();
        // A regular file where a directory is expected makes the dataset write fail.
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "not a directory").unwrap();
        let persister = ResultPersister::new(blocker.join("training_data.csv"), dir.path().join("t.json"));

        let summary = persister.persist(&dataset(), &ThresholdSet::new(0.1, 0.2, 0.3).unwrap());
        assert!(!summary.dataset_written);
        assert!(summary.thresholds_written);
    }

    #[test]
    fn test_non_finite_thresholds_are_refused() {
        let dir = TempDir::new().unwrap();
        let persister = ResultPersister::new(dir.path().join("d.csv"), dir.path().join("t.json"));

        let summary = persister.persist(&dataset(), &ThresholdSet::default());
        assert!(summary.dataset_written);
        assert!(!summary.thresholds_written);
        assert!(!dir.path().join("t.json").exists());
    }
}
