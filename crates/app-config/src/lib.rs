// In crates/app-config/src/lib.rs

use config::{Config, Environment, File};
use core_types::ThresholdSet;
use std::path::Path;

pub mod error;
pub mod types;

// Re-export the most important types for easy access.
pub use error::{Error, Result};
pub use types::{
    AppSettings, BenchmarkSettings, ExecutorKind, ExecutorSettings, Settings, StorageSettings,
    TrainingSettings,
};

/// Loads the application settings from the `config/` directory.
pub fn load_settings() -> Result<Settings> {
    load_settings_from(Path::new("config"))
}

/// Loads the application settings from various sources.
///
/// This function orchestrates the layered configuration loading:
/// 1. Reads from a default `base.toml` file.
/// 2. Merges settings from an environment-specific file (e.g., `development.toml`).
/// 3. Merges settings from environment variables.
pub fn load_settings_from(config_dir: &Path) -> Result<Settings> {
    // Get the current environment. Default to "development" if not set.
    let environment = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "development".into());

    let settings = Config::builder()
        // 1. Load the base configuration file.
        .add_source(File::from(config_dir.join("base")))
        // 2. Load the environment-specific configuration file.
        .add_source(File::from(config_dir.join(&environment)).required(false))
        // 3. Load settings from environment variables (e.g., `APP_TRAINING__TOTAL_ITERATIONS=...`).
        // The prefix is `APP`, separator is `__`.
        .add_source(
            Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    // Deserialize the configuration into our `Settings` struct.
    let settings: Settings = settings.try_deserialize()?;
    settings.validate()?;

    Ok(settings)
}

/// Reads a calibrated threshold file.
pub fn read_thresholds(path: &Path) -> Result<ThresholdSet> {
    let content = std::fs::read_to_string(path)?;
    let thresholds: ThresholdSet = serde_json::from_str(&content)?;
    ThresholdSet::new(thresholds.low, thresholds.medium, thresholds.high)
        .map_err(|e| Error::Invalid(e.to_string()))
}

/// Loads the thresholds used to label trades, falling back to
/// [`ThresholdSet::default`] (`Low = 0.08`, `Medium = 0.12`, `High = +inf`)
/// when the file is missing or unusable.
///
/// Meant to be called once at startup; a missing file is the normal state
/// before the first calibration run and is not reported as an error.
pub fn load_thresholds(path: &Path) -> ThresholdSet {
    match read_thresholds(path) {
        Ok(thresholds) => {
            tracing::info!(path = %path.display(), ?thresholds, "Loaded calibrated risk thresholds.");
            thresholds
        }
        Err(Error::IoError(e)) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "No threshold file found. Using default thresholds.");
            ThresholdSet::default()
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Could not read threshold file. Using default thresholds.");
            ThresholdSet::default()
        }
    }
}
