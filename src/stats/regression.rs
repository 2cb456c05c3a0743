use serde::Serialize;

use super::distributions::two_sided_p_value;

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// One estimated coefficient with its inferential statistics.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Coefficient {
    pub estimate: f64,
    pub standard_error: f64,
    pub t_statistic: f64,
    pub p_value: f64,
}

/// Bivariate OLS fit `y = intercept + slope * x`.
///
/// The all-zero value (`RegressionResult::default()`) is the deterministic
/// answer for inputs that cannot be fitted.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegressionResult {
    pub slope: Coefficient,
    pub intercept: Coefficient,
    pub r_squared: f64,
    /// Residual sum of squares, kept for the Chow test.
    pub residual_ss: f64,
    /// Number of finite (x, y) pairs that entered the fit.
    pub n: usize,
}

impl RegressionResult {
    /// Fitted value at `x`.
    pub fn predict(&self, x: f64) -> f64 {
        self.intercept.estimate + self.slope.estimate * x
    }

    /// Whether this is the zero-filled result of a degenerate input.
    pub fn is_degenerate(&self) -> bool {
        *self == RegressionResult::default()
    }
}

// ---------------------------------------------------------------------------
// Ordinary least squares
// ---------------------------------------------------------------------------

/// Fit a bivariate OLS regression with t-tests on both coefficients.
///
/// Pairs where either value is non-finite are skipped. Fewer than two usable
/// pairs, mismatched lengths or a constant `x` yield the all-zero result.
pub fn linear_regression(x: &[f64], y: &[f64]) -> RegressionResult {
    if x.len() != y.len() {
        log::debug!(
            "regression input length mismatch: x has {} values, y has {}",
            x.len(),
            y.len()
        );
        return RegressionResult::default();
    }

    // Single pass: running means and centered co-moments (Welford update).
    let mut n = 0usize;
    let (mut x_mean, mut y_mean) = (0.0, 0.0);
    let (mut sxx, mut sxy, mut syy) = (0.0, 0.0, 0.0);
    for (&xi, &yi) in finite_pairs(x, y) {
        n += 1;
        let dx = xi - x_mean;
        let dy = yi - y_mean;
        x_mean += dx / n as f64;
        y_mean += dy / n as f64;
        sxx += dx * (xi - x_mean);
        sxy += dx * (yi - y_mean);
        syy += dy * (yi - y_mean);
    }

    if n < 2 || sxx <= 0.0 {
        log::debug!("regression skipped: n={n}, Sxx={sxx}");
        return RegressionResult::default();
    }

    let slope = sxy / sxx;
    let intercept = y_mean - slope * x_mean;

    let residual_ss: f64 = finite_pairs(x, y)
        .map(|(&xi, &yi)| {
            let r = yi - (intercept + slope * xi);
            r * r
        })
        .sum();

    let r_squared = if syy > 0.0 {
        (1.0 - residual_ss / syy).clamp(0.0, 1.0)
    } else {
        0.0
    };

    let df = n - 2;
    let (slope_se, intercept_se) = if df > 0 {
        let mse = residual_ss / df as f64;
        (
            (mse / sxx).sqrt(),
            (mse * (1.0 / n as f64 + x_mean * x_mean / sxx)).sqrt(),
        )
    } else {
        (0.0, 0.0)
    };

    RegressionResult {
        slope: coefficient(slope, slope_se, df),
        intercept: coefficient(intercept, intercept_se, df),
        r_squared,
        residual_ss,
        n,
    }
}

fn coefficient(estimate: f64, standard_error: f64, df: usize) -> Coefficient {
    if !(standard_error > 0.0) || df == 0 {
        return Coefficient {
            estimate,
            ..Coefficient::default()
        };
    }
    let t_statistic = estimate / standard_error;
    Coefficient {
        estimate,
        standard_error,
        t_statistic,
        p_value: two_sided_p_value(t_statistic, df as f64),
    }
}

pub(crate) fn finite_pairs<'a>(x: &'a [f64], y: &'a [f64]) -> impl Iterator<Item = (&'a f64, &'a f64)> {
    x.iter()
        .zip(y.iter())
        .filter(|(xi, yi)| xi.is_finite() && yi.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn perfect_line() {
        let fit = linear_regression(&[1.0, 2.0, 3.0, 4.0, 5.0], &[2.0, 4.0, 6.0, 8.0, 10.0]);
        assert_abs_diff_eq!(fit.slope.estimate, 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(fit.intercept.estimate, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(fit.r_squared, 1.0, epsilon = 1e-12);
        assert_eq!(fit.n, 5);
    }

    #[test]
    fn constant_x_is_all_zero() {
        let fit = linear_regression(&[1.0, 1.0, 1.0], &[1.0, 2.0, 3.0]);
        assert!(fit.is_degenerate());
    }

    #[test]
    fn mismatched_or_short_input_is_all_zero() {
        assert!(linear_regression(&[1.0, 2.0], &[1.0]).is_degenerate());
        assert!(linear_regression(&[1.0], &[1.0]).is_degenerate());
        assert!(linear_regression(&[], &[]).is_degenerate());
    }

    #[test]
    fn two_points_keep_estimates_without_inference() {
        let fit = linear_regression(&[0.0, 2.0], &[1.0, 5.0]);
        assert_abs_diff_eq!(fit.slope.estimate, 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(fit.intercept.estimate, 1.0, epsilon = 1e-12);
        assert_eq!(fit.slope.standard_error, 0.0);
        assert_eq!(fit.slope.p_value, 0.0);
    }

    #[test]
    fn non_finite_pairs_are_skipped() {
        let fit = linear_regression(
            &[1.0, 2.0, f64::NAN, 3.0, 4.0],
            &[3.0, 5.0, 100.0, 7.0, f64::INFINITY],
        );
        assert_eq!(fit.n, 3);
        assert_abs_diff_eq!(fit.slope.estimate, 2.0, epsilon = 1e-12);
    }

    #[test]
    fn clear_trend_has_significant_slope() {
        // y = 1 + 0.5x with alternating noise.
        let x: Vec<f64> = (0..10).map(f64::from).collect();
        let y: Vec<f64> = x
            .iter()
            .enumerate()
            .map(|(i, &v)| 1.0 + 0.5 * v + if i % 2 == 0 { 0.3 } else { -0.3 })
            .collect();
        let fit = linear_regression(&x, &y);
        assert!(fit.slope.standard_error > 0.0);
        assert_abs_diff_eq!(
            fit.slope.t_statistic,
            fit.slope.estimate / fit.slope.standard_error,
            epsilon = 1e-12
        );
        assert!(fit.slope.p_value < 1e-4);
        assert!(fit.r_squared > 0.9 && fit.r_squared <= 1.0);
    }
}
