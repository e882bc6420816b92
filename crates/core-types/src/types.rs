// In crates/core-types/src/types.rs

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{Error, Result};

/// A single simulated trade fed to the risk models.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TradeSample {
    pub trade_size: i64,
    pub trade_value: f64,
}

impl TradeSample {
    pub fn new(trade_size: i64, trade_value: f64) -> Self {
        Self { trade_size, trade_value }
    }
}

/// The four component scores and their weighted combination, each in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RiskScores {
    pub monte_carlo: f64,
    pub var: f64,
    pub cvar: f64,
    pub risk_parity: f64,
    pub final_risk: f64,
}

/// One row of a batch file or of the training dataset.
///
/// The struct is kept flat (no nested sample/scores) so it maps one-to-one onto
/// CSV columns.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoredTrade {
    #[serde(rename = "Trade Size")]
    pub trade_size: i64,
    #[serde(rename = "Trade Value")]
    pub trade_value: f64,
    #[serde(rename = "Monte Carlo")]
    pub monte_carlo: f64,
    #[serde(rename = "VaR")]
    pub var: f64,
    #[serde(rename = "CVaR")]
    pub cvar: f64,
    #[serde(rename = "Risk Parity")]
    pub risk_parity: f64,
    #[serde(rename = "Final Risk")]
    pub final_risk: f64,
}

impl ScoredTrade {
    pub fn new(sample: TradeSample, scores: RiskScores) -> Self {
        Self {
            trade_size: sample.trade_size,
            trade_value: sample.trade_value,
            monte_carlo: scores.monte_carlo,
            var: scores.var,
            cvar: scores.cvar,
            risk_parity: scores.risk_parity,
            final_risk: scores.final_risk,
        }
    }

    pub fn sample(&self) -> TradeSample {
        TradeSample::new(self.trade_size, self.trade_value)
    }

    pub fn scores(&self) -> RiskScores {
        RiskScores {
            monte_carlo: self.monte_carlo,
            var: self.var,
            cvar: self.cvar,
            risk_parity: self.risk_parity,
            final_risk: self.final_risk,
        }
    }
}

/// The rows produced by one worker.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchResult {
    pub worker_id: usize,
    pub rows: Vec<ScoredTrade>,
    /// `true` when the worker stopped before producing its full quota.
    pub cancelled: bool,
}

impl BatchResult {
    pub fn new(worker_id: usize) -> Self {
        Self { worker_id, rows: Vec::new(), cancelled: false }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// All rows gathered from every batch that made it through aggregation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrainingDataset {
    pub rows: Vec<ScoredTrade>,
}

impl TrainingDataset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn extend(&mut self, rows: impl IntoIterator<Item = ScoredTrade>) {
        self.rows.extend(rows);
    }

    /// The `final_risk` column.
    pub fn final_risks(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.final_risk).collect()
    }
}

/// The Low/Medium/High cut points.
///
/// Serialized with capitalised keys, which is the layout consumers of the
/// thresholds file expect.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdSet {
    #[serde(rename = "Low")]
    pub low: f64,
    #[serde(rename = "Medium")]
    pub medium: f64,
    #[serde(rename = "High")]
    pub high: f64,
}

impl ThresholdSet {
    pub const DEFAULT_LOW: f64 = 0.08;
    pub const DEFAULT_MEDIUM: f64 = 0.12;

    /// Builds a threshold set, rejecting values that break `low <= medium <= high`.
    pub fn new(low: f64, medium: f64, high: f64) -> Result<Self> {
        if !(low <= medium && medium <= high) {
            return Err(Error::UnorderedThresholds { low, medium, high });
        }
        Ok(Self { low, medium, high })
    }

    pub fn is_finite(&self) -> bool {
        self.low.is_finite() && self.medium.is_finite() && self.high.is_finite()
    }

    pub fn classify(&self, risk: f64) -> RiskLevel {
        if risk < self.low {
            RiskLevel::Low
        } else if risk < self.medium {
            RiskLevel::Medium
        } else {
            RiskLevel::High
        }
    }
}

impl Default for ThresholdSet {
    /// The fallback used whenever no calibrated thresholds are available.
    fn default() -> Self {
        Self {
            low: Self::DEFAULT_LOW,
            medium: Self::DEFAULT_MEDIUM,
            high: f64::INFINITY,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
        };
        f.write_str(label)
    }
}

/// An inclusive integer range that trade sizes or values are drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleRange {
    pub min: i64,
    pub max: i64,
}

impl SampleRange {
    pub fn new(min: i64, max: i64) -> Result<Self> {
        let range = Self { min, max };
        range.validate()?;
        Ok(range)
    }

    pub fn validate(&self) -> Result<()> {
        if self.min <= 0 || self.min > self.max {
            return Err(Error::InvalidRange { min: self.min, max: self.max });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_thresholds_match_fallback_values() {
        let defaults = ThresholdSet::default();
        assert_eq!(defaults.low, 0.08);
        assert_eq!(defaults.medium, 0.12);
        assert!(defaults.high.is_infinite());
        assert!(!defaults.is_finite());
    }

    #[test]
    fn test_classify_uses_strict_upper_bounds() {
        let thresholds = ThresholdSet::new(0.1, 0.2, 0.9).unwrap();
        assert_eq!(thresholds.classify(0.05), RiskLevel::Low);
        assert_eq!(thresholds.classify(0.1), RiskLevel::Medium);
        assert_eq!(thresholds.classify(0.19), RiskLevel::Medium);
        assert_eq!(thresholds.classify(0.2), RiskLevel::High);
        assert_eq!(thresholds.classify(5.0), RiskLevel::High);
    }

    #[test]
    fn test_unordered_thresholds_are_rejected() {
        assert!(ThresholdSet::new(0.3, 0.2, 0.9).is_err());
        assert!(ThresholdSet::new(0.1, 0.2, 0.15).is_err());
        assert!(ThresholdSet::new(f64::NAN, 0.2, 0.3).is_err());
        assert!(ThresholdSet::new(0.2, 0.2, 0.2).is_ok());
    }

    #[test]
    fn test_sample_range_validation() {
        assert!(SampleRange::new(1, 1000).is_ok());
        assert!(SampleRange::new(5, 5).is_ok());
        assert_eq!(
            SampleRange::new(10, 1),
            Err(Error::InvalidRange { min: 10, max: 1 })
        );
        assert!(SampleRange::new(0, 10).is_err());
    }

    #[test]
    fn test_scored_trade_splits_back_into_parts() {
        let sample = TradeSample::new(10, 2500.0);
        let scores = RiskScores {
            monte_carlo: 0.4,
            var: 0.1,
            cvar: 0.12,
            risk_parity: 0.09,
            final_risk: 0.2,
        };
        let row = ScoredTrade::new(sample, scores);
        assert_eq!(row.sample(), sample);
        assert_eq!(row.scores(), scores);
    }
}
