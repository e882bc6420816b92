// In crates/training/src/calibrator.rs

use core_types::{ThresholdSet, TrainingDataset};
use risk::stats::{quantile_sorted, sort_ascending};

use crate::{Error, Result};

const LOW_QUANTILE: f64 = 0.3;
const MEDIUM_QUANTILE: f64 = 0.7;

/// Derives Low/Medium/High cut points from the `final_risk` distribution.
///
/// `low` is the 30th percentile, `medium` the 70th, `high` the maximum.
/// An empty dataset is an error: there is nothing to calibrate from.
pub fn calibrate(dataset: &TrainingDataset) -> Result<ThresholdSet> {
    let mut risks: Vec<f64> = dataset
        .rows
        .iter()
        .map(|row| row.final_risk)
        .filter(|risk| risk.is_finite())
        .collect();
    if risks.is_empty() {
        return Err(Error::EmptyDataset);
    }
    sort_ascending(&mut risks);

    let low = quantile_sorted(&risks, LOW_QUANTILE).ok_or(Error::EmptyDataset)?;
    let medium = quantile_sorted(&risks, MEDIUM_QUANTILE).ok_or(Error::EmptyDataset)?;
    let high = risks[risks.len() - 1];

    let thresholds = ThresholdSet::new(low, medium, high)
        .map_err(|e| Error::InvalidParameters(e.to_string()))?;
    tracing::info!(low, medium, high, rows = risks.len(), "Calibrated risk thresholds.");
    Ok(thresholds)
}
