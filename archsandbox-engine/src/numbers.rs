//! Numeric conversion helpers centralizing safe numeric casts.

use num_traits::cast::cast;

use crate::constants::{METRIC_MAX, METRIC_MIN};

/// Convert a count to f64 while allowing precision loss in a single location.
#[must_use]
pub fn count_to_f64(value: usize) -> f64 {
    cast::<usize, f64>(value).unwrap_or(0.0)
}

/// Convert a count to i32, saturating at `i32::MAX`.
#[must_use]
pub fn count_to_i32(value: usize) -> i32 {
    cast::<usize, i32>(value).unwrap_or(i32::MAX)
}

/// Arithmetic mean of `values`, returning 0.0 for an empty input.
#[must_use]
pub fn mean(values: impl IntoIterator<Item = f64>) -> f64 {
    let (sum, count) = values
        .into_iter()
        .fold((0.0_f64, 0_usize), |(sum, count), value| {
            (sum + value, count + 1)
        });
    if count == 0 {
        return 0.0;
    }
    sum / count_to_f64(count)
}

/// Clamp a metric to `[0, 100]`, returning 0.0 for NaN values.
#[must_use]
pub fn clamp_metric(value: f64) -> f64 {
    if value.is_nan() {
        return METRIC_MIN;
    }
    value.clamp(METRIC_MIN, METRIC_MAX)
}

/// Convert i32 to f64.
#[must_use]
pub fn i32_to_f64(value: i32) -> f64 {
    f64::from(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_of_empty_is_zero() {
        assert!(mean(std::iter::empty()).abs() < f64::EPSILON);
        assert!((mean([10.0, 20.0, 60.0]) - 30.0).abs() < f64::EPSILON);
    }

    #[test]
    fn clamp_metric_handles_bounds_and_nan() {
        assert!((clamp_metric(-4.0)).abs() < f64::EPSILON);
        assert!((clamp_metric(140.0) - 100.0).abs() < f64::EPSILON);
        assert!((clamp_metric(f64::NAN)).abs() < f64::EPSILON);
        assert!((clamp_metric(42.5) - 42.5).abs() < f64::EPSILON);
    }

    #[test]
    fn counts_saturate_at_i32_max() {
        assert_eq!(count_to_i32(usize::MAX), i32::MAX);
    }
}
