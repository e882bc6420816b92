// In crates/risk/src/stats.rs

/// Sorts `values` ascending. NaNs sort last.
pub fn sort_ascending(values: &mut [f64]) {
    values.sort_by(|a, b| a.total_cmp(b));
}

/// The `q`-quantile (`0.0..=1.0`) of an ascending slice, interpolating
/// linearly between the two closest ranks.
///
/// Returns `None` for an empty slice.
pub fn quantile_sorted(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let q = q.clamp(0.0, 1.0);
    let position = q * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * fraction)
}

/// Like [`quantile_sorted`], sorting `values` in place first.
pub fn quantile(values: &mut [f64], q: f64) -> Option<f64> {
    sort_ascending(values);
    quantile_sorted(values, q)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quantile_interpolates_between_ranks() {
        let mut values = vec![4.0, 1.0, 3.0, 2.0];
        assert_eq!(quantile(&mut values, 0.0), Some(1.0));
        assert_eq!(quantile(&mut values, 1.0), Some(4.0));
        assert_eq!(quantile(&mut values, 0.5), Some(2.5));
        // position = 0.3 * 3 = 0.9
        let q30 = quantile(&mut values, 0.3).unwrap();
        assert!((q30 - 1.9).abs() < 1e-12);
    }

    #[test]
    fn test_quantile_of_single_value() {
        assert_eq!(quantile_sorted(&[0.42], 0.7), Some(0.42));
    }

    #[test]
    fn test_quantile_of_empty_slice() {
        assert_eq!(quantile_sorted(&[], 0.5), None);
    }

    #[test]
    fn test_quantile_is_monotonic_in_q() {
        let mut values: Vec<f64> = (0..97).map(|i| ((i * 37) % 101) as f64 / 7.0).collect();
        sort_ascending(&mut values);
        let mut previous = f64::NEG_INFINITY;
        for step in 0..=20 {
            let q = step as f64 / 20.0;
            let current = quantile_sorted(&values, q).unwrap();
            assert!(current >= previous);
            previous = current;
        }
    }
}
