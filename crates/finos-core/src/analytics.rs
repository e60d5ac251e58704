//! Analytics engine
//!
//! Pure functions over numbers. Nothing here holds state, performs I/O, or
//! fails: division-by-zero style edge cases resolve to guard values
//! (`f64::INFINITY`, `0.0`, or `None` for "insufficient data").

use serde::{Deserialize, Serialize};

/// Observations required before outlier statistics mean anything
pub const MIN_OUTLIER_SAMPLES: usize = 5;

/// Standard deviations above the mean that mark an outlier
pub const OUTLIER_SIGMA: f64 = 2.0;

/// Population statistics for outlier flagging
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OutlierStats {
    pub mean: f64,
    pub std_dev: f64,
    /// `mean + 2 * std_dev`
    pub threshold: f64,
}

impl OutlierStats {
    /// Whether `amount` lies strictly above the threshold
    pub fn exceeds(&self, amount: f64) -> bool {
        amount > self.threshold
    }
}

/// Round to a fixed number of decimal places
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Months the balance lasts at the given burn rate, to one decimal.
///
/// Zero (or negative) burn means the balance is never depleted. A negative
/// balance gives a negative runway.
pub fn runway_months(balance: f64, monthly_burn: f64) -> f64 {
    if monthly_burn <= 0.0 {
        return f64::INFINITY;
    }
    round_to(balance / monthly_burn, 1)
}

/// Share of income not spent, as a percentage. Zero income yields 0.
pub fn savings_rate(income: f64, expenses: f64) -> f64 {
    if income == 0.0 {
        return 0.0;
    }
    let expenses = expenses.max(0.0);
    (income - expenses) * 100.0 / income
}

/// Arithmetic mean, 0 for an empty slice
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation (divides by N)
fn population_std_dev(values: &[f64], mean: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let variance = values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// Mean, population std-dev and 2-sigma threshold.
///
/// Negative and non-finite amounts are dropped first. Returns `None` when
/// fewer than five observations remain.
pub fn outlier_stats(amounts: &[f64]) -> Option<OutlierStats> {
    let usable: Vec<f64> = amounts
        .iter()
        .copied()
        .filter(|a| a.is_finite() && *a >= 0.0)
        .collect();

    if usable.len() < MIN_OUTLIER_SAMPLES {
        return None;
    }

    let mean = mean(&usable);
    let std_dev = population_std_dev(&usable, mean);

    Some(OutlierStats {
        mean,
        std_dev,
        threshold: mean + OUTLIER_SIGMA * std_dev,
    })
}

/// Least-squares slope of `series[i]` against `i`.
///
/// The series must already be in chronological order. Fewer than two points
/// have no slope and yield 0.
pub fn trend_slope(series: &[f64]) -> f64 {
    let n = series.len();
    if n < 2 {
        return 0.0;
    }

    let n_f = n as f64;
    let (mut sum_x, mut sum_y, mut sum_xy, mut sum_xx) = (0.0, 0.0, 0.0, 0.0);
    for (i, y) in series.iter().enumerate() {
        let x = i as f64;
        sum_x += x;
        sum_y += y;
        sum_xy += x * y;
        sum_xx += x * x;
    }

    // Non-zero for n >= 2 with indices 0..n
    let denominator = n_f * sum_xx - sum_x * sum_x;
    (n_f * sum_xy - sum_x * sum_y) / denominator
}

/// Population std-dev over mean. 0 when the mean is 0 or there is no data.
pub fn coefficient_of_variation(values: &[f64]) -> f64 {
    let mean = mean(values);
    if mean == 0.0 {
        return 0.0;
    }
    population_std_dev(values, mean) / mean
}

/// 0-100 score, higher when period totals vary less.
///
/// `max(0, min(100, 100 - cv * 100))`; no data scores 0.
pub fn stability_score(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let cv = coefficient_of_variation(values);
    (100.0 - cv * 100.0).clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_runway_zero_burn_is_infinite() {
        assert_eq!(runway_months(5000.0, 0.0), f64::INFINITY);
        assert_eq!(runway_months(-5000.0, 0.0), f64::INFINITY);
        assert_eq!(runway_months(0.0, 0.0), f64::INFINITY);
    }

    #[test]
    fn test_runway_rounds_to_one_decimal() {
        assert_eq!(runway_months(1000.0, 300.0), 3.3);
        assert_eq!(runway_months(1000.0, 400.0), 2.5);
        assert_eq!(runway_months(-600.0, 200.0), -3.0);
    }

    #[test]
    fn test_runway_negative_burn_treated_as_zero() {
        assert_eq!(runway_months(1000.0, -50.0), f64::INFINITY);
    }

    #[test]
    fn test_savings_rate() {
        assert_eq!(savings_rate(0.0, 500.0), 0.0);
        assert_eq!(savings_rate(1000.0, 800.0), 20.0);
        assert_eq!(savings_rate(1000.0, 1500.0), -50.0);
        // Negative expenses would push the rate above 100
        assert_eq!(savings_rate(1000.0, -200.0), 100.0);
    }

    #[test]
    fn test_outlier_stats_insufficient_data() {
        assert!(outlier_stats(&[]).is_none());
        assert!(outlier_stats(&[1.0, 2.0, 3.0, 4.0]).is_none());
        // Dropped values do not count toward the minimum
        assert!(outlier_stats(&[1.0, 2.0, 3.0, 4.0, -5.0, f64::NAN]).is_none());
    }

    #[test]
    fn test_outlier_stats_population_formula() {
        let amounts = [10.0, 10.0, 10.0, 10.0, 100.0];
        let stats = outlier_stats(&amounts).unwrap();

        let n = amounts.len() as f64;
        let expected_mean = amounts.iter().sum::<f64>() / n;
        let expected_std =
            (amounts.iter().map(|a| (a - expected_mean).powi(2)).sum::<f64>() / n).sqrt();

        assert_eq!(stats.mean, expected_mean);
        assert_eq!(stats.std_dev, expected_std);
        assert_eq!(stats.threshold, expected_mean + 2.0 * expected_std);
        assert!((stats.mean - 28.0).abs() < 1e-9);
        assert!((stats.std_dev - 36.0).abs() < 1e-9);
        assert!((stats.threshold - 100.0).abs() < 1e-9);

        // The threshold is exclusive
        assert!(!stats.exceeds(100.0));
        assert!(stats.exceeds(100.01));
    }

    #[test]
    fn test_outlier_stats_constant_series() {
        let stats = outlier_stats(&[5.0; 6]).unwrap();
        assert_eq!(stats.std_dev, 0.0);
        assert_eq!(stats.threshold, 5.0);
    }

    #[test]
    fn test_trend_slope() {
        assert_eq!(trend_slope(&[1.0, 2.0, 3.0, 4.0]), 1.0);
        assert_eq!(trend_slope(&[5.0, 5.0, 5.0, 5.0]), 0.0);
        assert_eq!(trend_slope(&[]), 0.0);
        assert_eq!(trend_slope(&[7.0]), 0.0);
        assert_eq!(trend_slope(&[10.0, 8.0, 6.0]), -2.0);
    }

    #[test]
    fn test_trend_slope_noisy_series() {
        let series = [1.5, 2.5, 5.5, 6.5];
        let slope = trend_slope(&series);
        assert!((slope - 1.8).abs() < 1e-9);
        assert!(slope.is_finite());
    }

    #[test]
    fn test_coefficient_of_variation() {
        assert_eq!(coefficient_of_variation(&[]), 0.0);
        assert_eq!(coefficient_of_variation(&[0.0, 0.0]), 0.0);
        assert_eq!(coefficient_of_variation(&[100.0, 100.0]), 0.0);
        // mean 100, population std 50
        assert!((coefficient_of_variation(&[50.0, 150.0]) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_stability_score_clamped() {
        assert_eq!(stability_score(&[]), 0.0);
        assert_eq!(stability_score(&[3000.0, 3000.0, 3000.0]), 100.0);
        assert!((stability_score(&[50.0, 150.0]) - 50.0).abs() < 1e-9);
        // cv > 1 floors at zero
        assert_eq!(stability_score(&[0.0, 0.0, 0.0, 1000.0]), 0.0);
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(3.14159, 1), 3.1);
        assert_eq!(round_to(2.44, 0), 2.0);
        assert_eq!(round_to(-1.26, 1), -1.3);
    }
}
