// In crates/risk/src/models.rs

use core_types::TradeSample;
use rand::Rng;
use rand_distr::{Distribution, Normal};

use crate::stats::{quantile_sorted, sort_ascending};
use crate::RiskModel;

/// Score returned by the Monte Carlo model when no simulated outcome is a loss.
pub const MIN_MONTE_CARLO_SCORE: f64 = 0.01;

const MEAN_RETURN_RANGE: (f64, f64) = (-0.05, 0.05);
const VOLATILITY_RANGE: (f64, f64) = (0.05, 0.25);
const LOSS_DRIFT: f64 = 0.01;
const LOSS_SCALE_RANGE: (f64, f64) = (0.03, 0.07);
const PARITY_FACTOR_RANGE: (f64, f64) = (0.05, 0.15);
const PARITY_OFFSET: f64 = 10.0;

fn is_usable_value(trade_value: f64) -> bool {
    trade_value > 0.0 && trade_value.is_finite()
}

/// Draws `count` samples from `Normal(mean, std_dev)`.
///
/// Returns `None` if the distribution parameters are not usable.
fn draw_normal<R: Rng + ?Sized>(mean: f64, std_dev: f64, count: usize, rng: &mut R) -> Option<Vec<f64>> {
    let distribution = Normal::new(mean, std_dev).ok()?;
    Some((0..count).map(|_| distribution.sample(rng)).collect())
}

/// Draws the simulated loss distribution shared by VaR and CVaR.
fn draw_loss_distribution<R: Rng + ?Sized>(trade_value: f64, count: usize, rng: &mut R) -> Option<Vec<f64>> {
    let scale = rng.random_range(LOSS_SCALE_RANGE.0..LOSS_SCALE_RANGE.1);
    draw_normal(trade_value * LOSS_DRIFT, trade_value * scale, count, rng)
}

/// Monte Carlo tail-loss model.
///
/// Simulates outcomes under a random drift and volatility, then measures the
/// 95th percentile of the losing outcomes relative to the volatility scale.
#[derive(Debug, Clone)]
pub struct MonteCarloModel {
    pub num_simulations: usize,
}

impl MonteCarloModel {
    pub fn new(num_simulations: usize) -> Self {
        Self { num_simulations }
    }

    /// Scores a set of simulated outcomes against the volatility `scale`.
    pub fn score_outcomes(outcomes: Vec<f64>, scale: f64) -> f64 {
        let mut losses: Vec<f64> = outcomes.into_iter().filter(|x| *x < 0.0).collect();
        if losses.is_empty() {
            return MIN_MONTE_CARLO_SCORE;
        }
        sort_ascending(&mut losses);
        let percentile_loss = match quantile_sorted(&losses, 0.95) {
            Some(value) => -value,
            None => return MIN_MONTE_CARLO_SCORE,
        };
        (percentile_loss / scale).clamp(MIN_MONTE_CARLO_SCORE, 1.0)
    }
}

impl RiskModel for MonteCarloModel {
    fn name(&self) -> &'static str {
        "MonteCarlo"
    }

    fn estimate<R: Rng + ?Sized>(&self, sample: &TradeSample, rng: &mut R) -> f64 {
        if sample.trade_size <= 0 || !is_usable_value(sample.trade_value) {
            return 0.0;
        }
        let mean_return = rng.random_range(MEAN_RETURN_RANGE.0..MEAN_RETURN_RANGE.1);
        let volatility = rng.random_range(VOLATILITY_RANGE.0..VOLATILITY_RANGE.1);
        let scale = sample.trade_value * volatility;

        match draw_normal(sample.trade_value * mean_return, scale, self.num_simulations, rng) {
            Some(outcomes) => Self::score_outcomes(outcomes, scale),
            None => 0.0,
        }
    }
}

/// Value at Risk at a fixed confidence level.
#[derive(Debug, Clone)]
pub struct ValueAtRiskModel {
    pub num_simulations: usize,
    pub confidence_level: f64,
}

impl ValueAtRiskModel {
    pub fn new(num_simulations: usize, confidence_level: f64) -> Self {
        Self { num_simulations, confidence_level }
    }

    /// Normalized VaR of a simulated loss distribution.
    pub fn score_distribution(&self, mut losses: Vec<f64>, trade_value: f64) -> f64 {
        sort_ascending(&mut losses);
        let threshold = quantile_sorted(&losses, 1.0 - self.confidence_level).unwrap_or(0.0);
        (threshold.abs() / trade_value).clamp(0.0, 1.0)
    }
}

impl RiskModel for ValueAtRiskModel {
    fn name(&self) -> &'static str {
        "VaR"
    }

    fn estimate<R: Rng + ?Sized>(&self, sample: &TradeSample, rng: &mut R) -> f64 {
        if !is_usable_value(sample.trade_value) {
            return 0.0;
        }
        match draw_loss_distribution(sample.trade_value, self.num_simulations, rng) {
            Some(losses) => self.score_distribution(losses, sample.trade_value),
            None => 0.0,
        }
    }
}

/// Conditional Value at Risk (expected shortfall).
#[derive(Debug, Clone)]
pub struct ConditionalValueAtRiskModel {
    pub num_simulations: usize,
    pub confidence_level: f64,
}

impl ConditionalValueAtRiskModel {
    pub fn new(num_simulations: usize, confidence_level: f64) -> Self {
        Self { num_simulations, confidence_level }
    }

    /// Normalized mean of the worst `(1 - confidence) * N` outcomes.
    pub fn score_distribution(&self, mut losses: Vec<f64>, trade_value: f64) -> f64 {
        sort_ascending(&mut losses);
        let tail_len = ((1.0 - self.confidence_level) * losses.len() as f64).floor() as usize;
        let cvar = if tail_len > 0 {
            losses[..tail_len].iter().sum::<f64>() / tail_len as f64
        } else {
            0.0
        };
        (cvar.abs() / trade_value).clamp(0.0, 1.0)
    }
}

impl RiskModel for ConditionalValueAtRiskModel {
    fn name(&self) -> &'static str {
        "CVaR"
    }

    fn estimate<R: Rng + ?Sized>(&self, sample: &TradeSample, rng: &mut R) -> f64 {
        if !is_usable_value(sample.trade_value) {
            return 0.0;
        }
        match draw_loss_distribution(sample.trade_value, self.num_simulations, rng) {
            Some(losses) => self.score_distribution(losses, sample.trade_value),
            None => 0.0,
        }
    }
}

/// Risk-parity sizing heuristic: a random fraction of the value, discounted by
/// a fixed offset.
#[derive(Debug, Clone, Default)]
pub struct RiskParityModel;

impl RiskModel for RiskParityModel {
    fn name(&self) -> &'static str {
        "RiskParity"
    }

    fn estimate<R: Rng + ?Sized>(&self, sample: &TradeSample, rng: &mut R) -> f64 {
        if !is_usable_value(sample.trade_value) {
            return 0.0;
        }
        let factor = rng.random_range(PARITY_FACTOR_RANGE.0..PARITY_FACTOR_RANGE.1);
        (sample.trade_value * factor / (sample.trade_value + PARITY_OFFSET)).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const SIMULATIONS: usize = 10_000;

    fn in_unit_interval(value: f64) -> bool {
        (0.0..=1.0).contains(&value)
    }

    #[test]
    fn test_models_stay_in_unit_interval() {
        let mut rng = StdRng::seed_from_u64(7);
        let mc = MonteCarloModel::new(SIMULATIONS);
        let var = ValueAtRiskModel::new(SIMULATIONS, 0.95);
        let cvar = ConditionalValueAtRiskModel::new(SIMULATIONS, 0.95);
        let parity = RiskParityModel;

        for (size, value) in [(1, 1.0), (10, 250.0), (1000, 50_000.0), (3, 7.5)] {
            let sample = TradeSample::new(size, value);
            let mc_score = mc.estimate(&sample, &mut rng);
            assert!((MIN_MONTE_CARLO_SCORE..=1.0).contains(&mc_score), "mc={}", mc_score);
            assert!(in_unit_interval(var.estimate(&sample, &mut rng)));
            assert!(in_unit_interval(cvar.estimate(&sample, &mut rng)));
            assert!(in_unit_interval(parity.estimate(&sample, &mut rng)));
        }
    }

    #[test]
    fn test_degenerate_inputs_score_zero() {
        let mut rng = StdRng::seed_from_u64(1);
        let mc = MonteCarloModel::new(100);
        let var = ValueAtRiskModel::new(100, 0.95);
        let cvar = ConditionalValueAtRiskModel::new(100, 0.95);

        assert_eq!(mc.estimate(&TradeSample::new(0, 100.0), &mut rng), 0.0);
        assert_eq!(mc.estimate(&TradeSample::new(-5, 100.0), &mut rng), 0.0);
        assert_eq!(mc.estimate(&TradeSample::new(5, 0.0), &mut rng), 0.0);

        for value in [0.0, -10.0, f64::NAN] {
            let sample = TradeSample::new(5, value);
            assert_eq!(var.estimate(&sample, &mut rng), 0.0);
            assert_eq!(cvar.estimate(&sample, &mut rng), 0.0);
            assert_eq!(RiskParityModel.estimate(&sample, &mut rng), 0.0);
        }
    }

    #[test]
    fn test_size_only_gates_monte_carlo() {
        let mut rng = StdRng::seed_from_u64(3);
        let sample = TradeSample::new(0, 1_000.0);
        let var = ValueAtRiskModel::new(1_000, 0.95);
        assert!(var.estimate(&sample, &mut rng) > 0.0);
        assert!(RiskParityModel.estimate(&sample, &mut rng) > 0.0);
    }

    #[test]
    fn test_monte_carlo_without_losses_scores_floor() {
        let score = MonteCarloModel::score_outcomes(vec![1.0, 2.0, 3.0], 10.0);
        assert_eq!(score, MIN_MONTE_CARLO_SCORE);
    }

    #[test]
    fn test_monte_carlo_uses_percentile_of_losses() {
        // Losses sorted: [-5, -4, -3, -2, -1]; 95th percentile = -1.2.
        let outcomes = vec![-1.0, -2.0, -3.0, -4.0, -5.0, 6.0, 7.0];
        let score = MonteCarloModel::score_outcomes(outcomes, 10.0);
        assert!((score - 0.12).abs() < 1e-12);
    }

    #[test]
    fn test_var_of_known_distribution() {
        let var = ValueAtRiskModel::new(5, 0.75);
        // Sorted: [-40, -20, 0, 20, 40]; 25th percentile = -20.
        let score = var.score_distribution(vec![40.0, -20.0, 0.0, 20.0, -40.0], 100.0);
        assert!((score - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_cvar_averages_the_tail() {
        let cvar = ConditionalValueAtRiskModel::new(8, 0.75);
        // k = floor(0.25 * 8) = 2 -> mean(-30, -10) = -20.
        let losses = vec![5.0, -10.0, 3.0, -30.0, 1.0, 2.0, 4.0, 6.0];
        let score = cvar.score_distribution(losses, 100.0);
        assert!((score - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_cvar_with_empty_tail_is_zero() {
        let cvar = ConditionalValueAtRiskModel::new(3, 0.95);
        assert_eq!(cvar.score_distribution(vec![-50.0, 1.0, 2.0], 100.0), 0.0);
    }

    #[test]
    fn test_risk_parity_bounds() {
        let mut rng = StdRng::seed_from_u64(11);
        let sample = TradeSample::new(1, 90.0);
        for _ in 0..100 {
            let score = RiskParityModel.estimate(&sample, &mut rng);
            // 90 * [0.05, 0.15) / 100
            assert!(score >= 0.045 && score < 0.135, "score={}", score);
        }
    }

    #[test]
    fn test_fresh_draws_differ_between_calls() {
        let mut rng = StdRng::seed_from_u64(5);
        let sample = TradeSample::new(10, 10_000.0);
        let model = ValueAtRiskModel::new(1_000, 0.95);
        let first = model.estimate(&sample, &mut rng);
        let second = model.estimate(&sample, &mut rng);
        assert_ne!(first, second);
    }
}
