//! Tests for the LOESS smoother and the spatial helpers.
//!
//! ## Test Organization
//!
//! 1. **Sampling Grid** - Step count, ordering, span
//! 2. **Fitted Values** - Local mean behavior, band ordering
//! 3. **Spatial Helpers** - Standardize, lag, Moran scatter

use approx::assert_abs_diff_eq;

use brushlink::data::synth::{grid_neighbors, DemoRng};
use brushlink::stats::distributions::student_t_quantile;
use brushlink::stats::loess::tricube;
use brushlink::stats::{linear_regression, loess, moran_scatter, standardize, LoessConfig};

// ============================================================================
// Sampling Grid Tests
// ============================================================================

/// Test 50 points, bandwidth 0.2, 10 steps.
#[test]
fn test_steps_and_span() {
    let mut rng = DemoRng::new(5);
    let x: Vec<f64> = (0..50).map(|_| rng.next_f64() * 20.0 - 5.0).collect();
    let y: Vec<f64> = x.iter().map(|v| v * 0.5 + rng.gauss(0.0, 1.0)).collect();
    let config = LoessConfig {
        bandwidth: 0.2,
        steps: 10,
        ..LoessConfig::default()
    };

    let curve = loess(&x, &y, &config).unwrap();
    assert_eq!(curve.fitted.len(), 10);
    assert_eq!(curve.upper.len(), 10);
    assert_eq!(curve.lower.len(), 10);

    let min = x.iter().copied().fold(f64::INFINITY, f64::min);
    let max = x.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    assert_eq!(curve.fitted[0][0], min);
    assert_eq!(curve.fitted[9][0], max);
    for pair in curve.fitted.windows(2) {
        assert!(pair[0][0] <= pair[1][0]);
    }
}

/// Test a single sample step sits at the minimum.
#[test]
fn test_single_step() {
    let config = LoessConfig {
        steps: 1,
        ..LoessConfig::default()
    };
    let curve = loess(&[3.0, 1.0, 2.0], &[1.0, 1.0, 1.0], &config).unwrap();
    assert_eq!(curve.fitted, vec![[1.0, 1.0]]);
}

// ============================================================================
// Fitted Value Tests
// ============================================================================

/// Test a fitted value against a hand-computed tricube-weighted mean.
#[test]
fn test_weighted_local_mean() {
    let x = [0.0, 1.0, 2.0, 3.0, 4.0];
    let y = [0.0, 10.0, 0.0, 10.0, 0.0];
    let config = LoessConfig {
        bandwidth: 0.5,
        steps: 5,
        confidence: 0.95,
    };
    let curve = loess(&x, &y, &config).unwrap();

    // At x0 = 2 the span is 2: weights tricube(|2 - xj| / 2).
    let w: Vec<f64> = x.iter().map(|&xj| tricube((2.0f64 - xj).abs() / 2.0)).collect();
    let sum_w: f64 = w.iter().sum();
    let expected = w.iter().zip(&y).map(|(a, b)| a * b).sum::<f64>() / sum_w;
    assert_abs_diff_eq!(curve.fitted[2][1], expected, epsilon = 1e-12);

    let rss: f64 = w.iter().zip(&y).map(|(wj, yj)| wj * (yj - expected).powi(2)).sum();
    let sum_w2: f64 = w.iter().map(|v| v * v).sum();
    let se = (rss / sum_w).sqrt() * sum_w2.sqrt() / sum_w;
    let t = student_t_quantile(0.975, 3.0);
    assert_abs_diff_eq!(curve.upper[2][1], expected + t * se, epsilon = 1e-9);
    assert_abs_diff_eq!(curve.lower[2][1], expected - t * se, epsilon = 1e-9);
}

/// Test that a wider confidence level widens the band.
#[test]
fn test_band_widens_with_confidence() {
    let mut rng = DemoRng::new(8);
    let x: Vec<f64> = (0..60).map(|i| f64::from(i) / 6.0).collect();
    let y: Vec<f64> = x.iter().map(|v| v.cos() + rng.gauss(0.0, 0.3)).collect();

    let narrow = loess(&x, &y, &LoessConfig { confidence: 0.8, ..LoessConfig::default() }).unwrap();
    let wide = loess(&x, &y, &LoessConfig { confidence: 0.99, ..LoessConfig::default() }).unwrap();
    for (n, w) in narrow.upper.iter().zip(&wide.upper) {
        assert!(w[1] >= n[1]);
    }
    assert_eq!(narrow.fitted, wide.fitted);
}

/// Test that two points give a zero-width band (no t quantile at df = 0).
#[test]
fn test_two_points_have_no_band() {
    let curve = loess(&[0.0, 1.0], &[0.0, 2.0], &LoessConfig::default()).unwrap();
    assert_eq!(curve.fitted, curve.upper);
    assert_eq!(curve.fitted, curve.lower);
}

// ============================================================================
// Spatial Helper Tests
// ============================================================================

/// Test that standardized values have zero mean and unit sample variance.
#[test]
fn test_standardize_moments() {
    let mut rng = DemoRng::new(2);
    let data: Vec<f64> = (0..100).map(|_| rng.gauss(50.0, 12.0)).collect();
    let z = standardize(&data);
    let mean = z.iter().sum::<f64>() / 100.0;
    let var = z.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / 99.0;
    assert_abs_diff_eq!(mean, 0.0, epsilon = 1e-12);
    assert_abs_diff_eq!(var, 1.0, epsilon = 1e-12);
}

/// Test Moran scatter slope on a checkerboard (negative) and a gradient (positive).
#[test]
fn test_moran_slope_sign() {
    let side = 8;
    let neighbors = grid_neighbors(side);

    let checker: Vec<f64> = (0..side * side)
        .map(|i| if (i / side + i % side) % 2 == 0 { 1.0 } else { -1.0 })
        .collect();
    let (z, lag) = moran_scatter(&checker, &neighbors);
    assert!(linear_regression(&z, &lag).slope.estimate < -0.9);

    let gradient: Vec<f64> = (0..side * side).map(|i| (i % side) as f64).collect();
    let (z, lag) = moran_scatter(&gradient, &neighbors);
    assert!(linear_regression(&z, &lag).slope.estimate > 0.5);
}
