// In crates/training/src/estimate.rs

use app_config::BenchmarkSettings;
use std::time::Duration;

/// Scales the benchmark timing linearly to `iterations`.
pub fn estimate_duration(iterations: u64, benchmark: &BenchmarkSettings) -> Duration {
    if benchmark.iterations == 0 || !(benchmark.seconds > 0.0) {
        return Duration::ZERO;
    }
    let seconds = iterations as f64 / benchmark.iterations as f64 * benchmark.seconds;
    Duration::from_secs_f64(seconds)
}

/// Renders a duration as "M minutes and S seconds".
pub fn format_duration(duration: Duration) -> String {
    let total = duration.as_secs();
    format!("{} minutes and {} seconds", total / 60, total % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_benchmark_run_takes_benchmark_time() {
        let benchmark = BenchmarkSettings::default();
        let estimate = estimate_duration(benchmark.iterations, &benchmark);
        assert_eq!(format_duration(estimate), "50 minutes and 0 seconds");
    }

    #[test]
    fn test_scales_linearly() {
        let benchmark = BenchmarkSettings { iterations: 400, seconds: 40.0 };
        assert_eq!(estimate_duration(1_000, &benchmark), Duration::from_secs(100));
        assert_eq!(format_duration(Duration::from_secs(100)), "1 minutes and 40 seconds");
    }

    #[test]
    fn test_degenerate_benchmark_estimates_zero() {
        let benchmark = BenchmarkSettings { iterations: 0, seconds: 10.0 };
        assert_eq!(estimate_duration(1_000, &benchmark), Duration::ZERO);
    }
}
