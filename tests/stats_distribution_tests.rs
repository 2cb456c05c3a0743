//! Tests for the Student-t and F distribution functions.
//!
//! The engine evaluates these through its own incomplete beta routine; the
//! `statrs` implementations serve as an independent reference.
//!
//! ## Test Organization
//!
//! 1. **Student-t** - CDF, two-sided p-values, quantiles
//! 2. **F distribution** - CDF against reference values

use approx::assert_abs_diff_eq;
use statrs::distribution::{ContinuousCDF, FisherSnedecor, StudentsT};

use brushlink::stats::distributions::{
    f_cdf, student_t_cdf, student_t_quantile, two_sided_p_value,
};

// ============================================================================
// Student-t Tests
// ============================================================================

/// Test the t CDF over a grid of statistics and degrees of freedom.
#[test]
fn test_t_cdf_matches_reference() {
    for &df in &[1.0, 2.0, 3.0, 5.0, 10.0, 30.0, 120.0, 1000.0] {
        let reference = StudentsT::new(0.0, 1.0, df).unwrap();
        for &t in &[-6.0, -2.5, -1.0, -0.2, 0.0, 0.3, 1.0, 1.96, 4.0, 12.0] {
            assert_abs_diff_eq!(student_t_cdf(t, df), reference.cdf(t), epsilon = 1e-8);
        }
    }
}

/// Test that two-sided p-values fall in [0, 1] and shrink as |t| grows.
#[test]
fn test_two_sided_p_value_is_monotone() {
    let mut last = 1.0;
    for i in 0..40 {
        let p = two_sided_p_value(f64::from(i) * 0.25, 12.0);
        assert!((0.0..=1.0).contains(&p));
        assert!(p <= last + 1e-15);
        last = p;
    }
    assert_abs_diff_eq!(two_sided_p_value(0.0, 12.0), 1.0, epsilon = 1e-12);
}

/// Test quantiles against the reference inverse CDF.
#[test]
fn test_t_quantile_matches_reference() {
    for &df in &[2.0, 5.0, 48.0, 400.0] {
        let reference = StudentsT::new(0.0, 1.0, df).unwrap();
        for &p in &[0.9, 0.95, 0.975, 0.995] {
            assert_abs_diff_eq!(
                student_t_quantile(p, df),
                reference.inverse_cdf(p),
                epsilon = 1e-6
            );
        }
    }
}

// ============================================================================
// F Distribution Tests
// ============================================================================

/// Test the F CDF used by the Chow test.
#[test]
fn test_f_cdf_matches_reference() {
    for &(d1, d2) in &[(2.0, 1.0), (2.0, 4.0), (2.0, 46.0), (2.0, 500.0), (5.0, 7.0)] {
        let reference = FisherSnedecor::new(d1, d2).unwrap();
        for &f in &[0.05, 0.5, 1.0, 2.0, 3.5, 10.0, 40.0] {
            assert_abs_diff_eq!(f_cdf(f, d1, d2), reference.cdf(f), epsilon = 1e-8);
        }
    }
}

/// Test F CDF bounds.
#[test]
fn test_f_cdf_bounds() {
    assert_eq!(f_cdf(0.0, 2.0, 10.0), 0.0);
    assert_eq!(f_cdf(f64::INFINITY, 2.0, 10.0), 1.0);
    assert!(f_cdf(1e6, 2.0, 10.0) > 0.999_999);
}
