// In crates/training/src/generator.rs

use core_types::{BatchResult, SampleRange, ScoredTrade, TradeSample};
use rand::Rng;
use risk::RiskModelEngine;

use crate::cancellation::CancellationToken;

/// Produces batches of random trades scored by the risk engine.
#[derive(Debug, Clone)]
pub struct BatchGenerator {
    engine: RiskModelEngine,
    size_range: SampleRange,
    value_range: SampleRange,
}

impl BatchGenerator {
    pub fn new(engine: RiskModelEngine, size_range: SampleRange, value_range: SampleRange) -> Self {
        Self { engine, size_range, value_range }
    }

    /// Draws a trade with integer size and value from the configured ranges.
    pub fn draw_sample<R: Rng + ?Sized>(&self, rng: &mut R) -> TradeSample {
        let trade_size = rng.random_range(self.size_range.min..=self.size_range.max);
        let trade_value = rng.random_range(self.value_range.min..=self.value_range.max);
        TradeSample::new(trade_size, trade_value as f64)
    }

    /// Generates up to `num_samples` scored trades.
    ///
    /// `token` is checked before every sample; when it fires the partial batch
    /// is returned with `cancelled` set.
    pub fn generate<R: Rng + ?Sized>(
        &self,
        worker_id: usize,
        num_samples: usize,
        rng: &mut R,
        token: &CancellationToken,
    ) -> BatchResult {
        let mut batch = BatchResult::new(worker_id);
        batch.rows.reserve(num_samples);

        for _ in 0..num_samples {
            if token.is_cancelled() {
                batch.cancelled = true;
                break;
            }
            let sample = self.draw_sample(rng);
            let scores = self.engine.assess(&sample, rng);
            batch.rows.push(ScoredTrade::new(sample, scores));
        }

        batch
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use risk::RiskModelSettings;

    fn generator() -> BatchGenerator {
        let engine = RiskModelEngine::new(&RiskModelSettings {
            num_simulations: 200,
            ..RiskModelSettings::default()
        })
        .unwrap();
        BatchGenerator::new(
            engine,
            SampleRange::new(1, 10).unwrap(),
            SampleRange::new(100, 200).unwrap(),
        )
    }

    #[test]
    fn test_generates_requested_count_within_ranges() {
        let mut rng = StdRng::seed_from_u64(21);
        let batch = generator().generate(3, 50, &mut rng, &CancellationToken::new());

        assert_eq!(batch.worker_id, 3);
        assert_eq!(batch.len(), 50);
        assert!(!batch.cancelled);
        for row in &batch.rows {
            assert!((1..=10).contains(&row.trade_size));
            assert!((100.0..=200.0).contains(&row.trade_value));
            assert_eq!(row.trade_value.fract(), 0.0);
            assert!((0.0..=1.0).contains(&row.final_risk));
        }
    }

    #[test]
    fn test_cancelled_token_yields_empty_partial_batch() {
        let token = CancellationToken::new();
        token.cancel();
        let mut rng = StdRng::seed_from_u64(1);
        let batch = generator().generate(0, 100, &mut rng, &token);
        assert!(batch.is_empty());
        assert!(batch.cancelled);
    }

    #[test]
    fn test_cancellation_mid_batch_keeps_completed_samples() {
        let token = CancellationToken::new();
        let generator = generator();
        let mut rng = StdRng::seed_from_u64(2);

        let first = generator.generate(0, 10, &mut rng, &token);
        token.cancel();
        let second = generator.generate(0, 10, &mut rng, &token);

        assert_eq!(first.len(), 10);
        assert!(!first.cancelled);
        assert!(second.is_empty() && second.cancelled);
    }
}
