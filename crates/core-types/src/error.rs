// In crates/core-types/src/error.rs

use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum Error {
    #[error("Invalid range: min ({min}) must be positive and not greater than max ({max})")]
    InvalidRange { min: i64, max: i64 },

    #[error("Thresholds are not ordered: low={low}, medium={medium}, high={high}")]
    UnorderedThresholds { low: f64, medium: f64, high: f64 },
}

pub type Result<T> = std::result::Result<T, Error>;
