//! Kernel-weighted local-mean smoother with a pointwise confidence band.
//!
//! Each sample point gets a tricube-weighted mean of `y` (Nadaraya-Watson
//! style, no local slope term). The band half-width is the t quantile at
//! `n - 2` degrees of freedom times the standard error of that weighted mean.

use serde::{Deserialize, Serialize};

use super::distributions::student_t_quantile;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LoessConfig {
    /// Kernel half-width as a fraction of the x range.
    pub bandwidth: f64,
    /// Number of equally spaced sample positions.
    pub steps: usize,
    /// Two-sided coverage of the band, e.g. 0.95.
    pub confidence: f64,
}

impl Default for LoessConfig {
    fn default() -> Self {
        Self {
            bandwidth: 0.2,
            steps: 100,
            confidence: 0.95,
        }
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// Fitted curve plus upper/lower band, each ordered by ascending x.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct LoessCurve {
    pub fitted: Vec<[f64; 2]>,
    pub upper: Vec<[f64; 2]>,
    pub lower: Vec<[f64; 2]>,
}

impl LoessCurve {
    pub fn len(&self) -> usize {
        self.fitted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fitted.is_empty()
    }
}

/// Tricube kernel `(1 - min(1, |u|)^3)^3`.
pub fn tricube(u: f64) -> f64 {
    let u = u.abs().min(1.0);
    let t = 1.0 - u * u * u;
    t * t * t
}

// ---------------------------------------------------------------------------
// Smoother
// ---------------------------------------------------------------------------

/// Smooth `(x, y)` into `config.steps` samples spanning `[min(x), max(x)]`.
///
/// `None` for empty or mismatched input and for `steps == 0`. Non-finite pairs
/// are skipped.
pub fn loess(x: &[f64], y: &[f64], config: &LoessConfig) -> Option<LoessCurve> {
    if x.len() != y.len() || config.steps == 0 {
        log::debug!(
            "loess skipped: x has {} values, y has {}, steps={}",
            x.len(),
            y.len(),
            config.steps
        );
        return None;
    }

    let (xs, ys): (Vec<f64>, Vec<f64>) = x
        .iter()
        .zip(y.iter())
        .filter(|(xi, yi)| xi.is_finite() && yi.is_finite())
        .map(|(&xi, &yi)| (xi, yi))
        .unzip();
    if xs.is_empty() {
        return None;
    }

    let min = xs.iter().copied().fold(f64::INFINITY, f64::min);
    let max = xs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let span = config.bandwidth * (max - min);

    let n = xs.len();
    let t_value = if n > 2 {
        let level = config.confidence.clamp(0.0, 1.0);
        student_t_quantile(0.5 + 0.5 * level, (n - 2) as f64)
    } else {
        0.0
    };

    let steps = config.steps;
    let step_width = if steps > 1 {
        (max - min) / (steps - 1) as f64
    } else {
        0.0
    };

    let mut curve = LoessCurve {
        fitted: Vec::with_capacity(steps),
        upper: Vec::with_capacity(steps),
        lower: Vec::with_capacity(steps),
    };
    let mut weights = vec![0.0; n];

    for i in 0..steps {
        // Pin the final sample to max so float drift never overshoots it.
        let x0 = if i + 1 == steps && steps > 1 {
            max
        } else {
            min + step_width * i as f64
        };

        let mut sum_w = 0.0;
        let mut sum_wy = 0.0;
        for (w, (&xj, &yj)) in weights.iter_mut().zip(xs.iter().zip(ys.iter())) {
            let d = (x0 - xj).abs();
            let u = if span > 0.0 {
                d / span
            } else if d == 0.0 {
                0.0
            } else {
                1.0
            };
            *w = tricube(u);
            sum_w += *w;
            sum_wy += *w * yj;
        }

        if sum_w <= 0.0 {
            curve.fitted.push([x0, 0.0]);
            curve.upper.push([x0, 0.0]);
            curve.lower.push([x0, 0.0]);
            continue;
        }

        let fitted = sum_wy / sum_w;
        let mut weighted_rss = 0.0;
        let mut sum_w2 = 0.0;
        for (&w, &yj) in weights.iter().zip(ys.iter()) {
            let r = yj - fitted;
            weighted_rss += w * r * r;
            sum_w2 += w * w;
        }
        let se = (weighted_rss / sum_w).sqrt() * sum_w2.sqrt() / sum_w;
        let half_width = t_value * se;

        curve.fitted.push([x0, fitted]);
        curve.upper.push([x0, fitted + half_width]);
        curve.lower.push([x0, fitted - half_width]);
    }

    Some(curve)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn tricube_shape() {
        assert_eq!(tricube(0.0), 1.0);
        assert_eq!(tricube(1.0), 0.0);
        assert_eq!(tricube(3.0), 0.0);
        assert_abs_diff_eq!(tricube(0.5), tricube(-0.5), epsilon = 1e-15);
    }

    #[test]
    fn constant_y_gives_flat_curve_with_zero_band() {
        let x: Vec<f64> = (0..20).map(f64::from).collect();
        let y = vec![3.0; 20];
        let curve = loess(&x, &y, &LoessConfig::default()).unwrap();
        assert_eq!(curve.len(), 100);
        for ((f, u), l) in curve.fitted.iter().zip(&curve.upper).zip(&curve.lower) {
            assert_abs_diff_eq!(f[1], 3.0, epsilon = 1e-12);
            assert_abs_diff_eq!(u[1], 3.0, epsilon = 1e-12);
            assert_abs_diff_eq!(l[1], 3.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn band_contains_fitted() {
        let x: Vec<f64> = (0..40).map(|i| f64::from(i) * 0.25).collect();
        let y: Vec<f64> = x.iter().map(|v| v.sin() + 0.1 * (v * 7.0).cos()).collect();
        let curve = loess(&x, &y, &LoessConfig::default()).unwrap();
        for ((f, u), l) in curve.fitted.iter().zip(&curve.upper).zip(&curve.lower) {
            assert!(l[1] <= f[1] && f[1] <= u[1]);
        }
    }

    #[test]
    fn single_x_value_collapses_to_mean() {
        let curve = loess(&[2.0, 2.0, 2.0], &[1.0, 2.0, 6.0], &LoessConfig::default()).unwrap();
        assert_eq!(curve.len(), 100);
        assert_abs_diff_eq!(curve.fitted[0][1], 3.0, epsilon = 1e-12);
        assert_eq!(curve.fitted[99][0], 2.0);
    }

    #[test]
    fn degenerate_inputs() {
        let config = LoessConfig::default();
        assert!(loess(&[], &[], &config).is_none());
        assert!(loess(&[1.0, 2.0], &[1.0], &config).is_none());
        let zero_steps = LoessConfig { steps: 0, ..config };
        assert!(loess(&[1.0, 2.0], &[1.0, 2.0], &zero_steps).is_none());
    }
}
