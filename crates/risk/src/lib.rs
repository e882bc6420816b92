// In crates/risk/src/lib.rs

use core_types::TradeSample;
use rand::Rng;

pub mod engine;
pub mod error;
pub mod models;
pub mod stats;
pub mod types;

// Re-export public types
pub use engine::RiskModelEngine;
pub use error::{Error, Result};
pub use types::{ModelWeights, RiskModelSettings};

/// The common interface of the stochastic risk estimators.
///
/// Every call draws fresh randomness from `rng`, so two calls with the same
/// `sample` are expected to return different scores. Callers that need
/// reproducible output pass a seeded generator.
pub trait RiskModel: Send + Sync {
    /// A short, human-readable name for logs.
    fn name(&self) -> &'static str;

    /// Scores `sample`, returning a value in `[0, 1]`.
    ///
    /// Degenerate samples (non-positive size or value, depending on the model)
    /// score a fixed sentinel instead of failing.
    fn estimate<R: Rng + ?Sized>(&self, sample: &TradeSample, rng: &mut R) -> f64;
}
