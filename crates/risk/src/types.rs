// In crates/risk/src/types.rs

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Tuning for the four risk models and the combiner.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct RiskModelSettings {
    /// Number of normal draws per model evaluation.
    #[serde(default = "default_num_simulations")]
    pub num_simulations: usize,
    /// Confidence level used by VaR and CVaR.
    #[serde(default = "default_confidence_level")]
    pub confidence_level: f64,
    #[serde(default)]
    pub weights: ModelWeights,
}

impl Default for RiskModelSettings {
    fn default() -> Self {
        Self {
            num_simulations: default_num_simulations(),
            confidence_level: default_confidence_level(),
            weights: ModelWeights::default(),
        }
    }
}

impl RiskModelSettings {
    pub fn validate(&self) -> Result<()> {
        if self.num_simulations == 0 {
            return Err(Error::InvalidParameters(
                "num_simulations must be greater than zero".to_string(),
            ));
        }
        if !(self.confidence_level > 0.0 && self.confidence_level < 1.0) {
            return Err(Error::InvalidParameters(format!(
                "confidence_level must be in (0, 1), got {}",
                self.confidence_level
            )));
        }
        self.weights.validate()
    }
}

/// Weights of the combiner. The defaults sum to one.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct ModelWeights {
    pub monte_carlo: f64,
    pub var: f64,
    pub cvar: f64,
    pub risk_parity: f64,
}

impl Default for ModelWeights {
    fn default() -> Self {
        Self {
            monte_carlo: 0.3,
            var: 0.3,
            cvar: 0.2,
            risk_parity: 0.2,
        }
    }
}

impl ModelWeights {
    /// Weighted sum of the component scores, clamped to `[0, 1]`.
    pub fn combine(&self, monte_carlo: f64, var: f64, cvar: f64, risk_parity: f64) -> f64 {
        let combined = monte_carlo * self.monte_carlo
            + var * self.var
            + cvar * self.cvar
            + risk_parity * self.risk_parity;
        combined.clamp(0.0, 1.0)
    }

    fn validate(&self) -> Result<()> {
        let weights = [self.monte_carlo, self.var, self.cvar, self.risk_parity];
        if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(Error::InvalidParameters(format!(
                "model weights must be finite and non-negative, got {:?}",
                self
            )));
        }
        Ok(())
    }
}

fn default_num_simulations() -> usize { 10_000 }
fn default_confidence_level() -> f64 { 0.95 }

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combine_with_equal_components() {
        let weights = ModelWeights::default();
        let combined = weights.combine(0.5, 0.5, 0.5, 0.5);
        assert!((combined - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_combine_applies_weights() {
        let weights = ModelWeights::default();
        let combined = weights.combine(1.0, 0.0, 0.0, 0.0);
        assert!((combined - 0.3).abs() < 1e-12);

        let combined = weights.combine(0.2, 0.4, 0.1, 0.05);
        let expected = 0.3 * 0.2 + 0.3 * 0.4 + 0.2 * 0.1 + 0.2 * 0.05;
        assert!((combined - expected).abs() < 1e-12);
    }

    #[test]
    fn test_combine_clamps_to_unit_interval() {
        let weights = ModelWeights {
            monte_carlo: 2.0,
            var: 2.0,
            cvar: 2.0,
            risk_parity: 2.0,
        };
        assert_eq!(weights.combine(1.0, 1.0, 1.0, 1.0), 1.0);
        assert_eq!(ModelWeights::default().combine(0.0, 0.0, 0.0, 0.0), 0.0);
    }

    #[test]
    fn test_settings_validation() {
        assert!(RiskModelSettings::default().validate().is_ok());

        let mut settings = RiskModelSettings::default();
        settings.num_simulations = 0;
        assert!(settings.validate().is_err());

        let mut settings = RiskModelSettings::default();
        settings.confidence_level = 1.0;
        assert!(settings.validate().is_err());

        let mut settings = RiskModelSettings::default();
        settings.weights.cvar = -0.1;
        assert!(settings.validate().is_err());
    }
}
