//! Regression per selection partition and the Chow structural-break test.

use serde::Serialize;

use super::distributions::f_cdf;
use super::regression::{finite_pairs, linear_regression, RegressionResult};

// ---------------------------------------------------------------------------
// Partitioning
// ---------------------------------------------------------------------------

/// Rows split by membership in a selection set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Partition {
    pub selected_x: Vec<f64>,
    pub selected_y: Vec<f64>,
    pub unselected_x: Vec<f64>,
    pub unselected_y: Vec<f64>,
}

impl Partition {
    pub fn selected_len(&self) -> usize {
        self.selected_x.len()
    }

    pub fn unselected_len(&self) -> usize {
        self.unselected_x.len()
    }
}

/// Membership mask of length `num_rows`. Out-of-range indices are ignored.
pub fn selection_mask(selection: &[usize], num_rows: usize) -> Vec<bool> {
    let mut mask = vec![false; num_rows];
    for &idx in selection {
        if let Some(slot) = mask.get_mut(idx) {
            *slot = true;
        }
    }
    mask
}

/// Split `(x, y)` rows into selected and unselected pairs in O(n).
///
/// Rows beyond the shorter of the two columns are ignored.
pub fn partition(x: &[f64], y: &[f64], selection: &[usize]) -> Partition {
    let n = x.len().min(y.len());
    let mask = selection_mask(selection, n);
    let mut part = Partition::default();
    for ((&xi, &yi), &is_selected) in x.iter().zip(y.iter()).zip(mask.iter()) {
        if is_selected {
            part.selected_x.push(xi);
            part.selected_y.push(yi);
        } else {
            part.unselected_x.push(xi);
            part.unselected_y.push(yi);
        }
    }
    part
}

// ---------------------------------------------------------------------------
// Bundle + Chow test
// ---------------------------------------------------------------------------

/// Regression on all rows and on each partition with at least two points.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct RegressionBundle {
    pub all: RegressionResult,
    pub selected: Option<RegressionResult>,
    pub unselected: Option<RegressionResult>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChowTest {
    pub f_stat: f64,
    pub p_value: f64,
    pub numerator_df: usize,
    pub denominator_df: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct SubsetAnalysis {
    pub bundle: RegressionBundle,
    pub chow: Option<ChowTest>,
    pub selected_len: usize,
    pub unselected_len: usize,
}

/// Extra free parameters of the split model (one slope + one intercept).
const CHOW_NUMERATOR_DF: usize = 2;

/// Residual sum of squares and row count that one side contributes to a
/// Chow test.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PartitionFit {
    pub residual_ss: f64,
    /// Finite (x, y) pairs behind `residual_ss`.
    pub n: usize,
}

impl PartitionFit {
    /// Residuals of `fit` over `(x, y)`.
    ///
    /// A degenerate fit (constant x, fewer than two pairs) has no slope, so
    /// its rows are measured against the intercept-only model `y = mean(y)`.
    pub fn of(fit: &RegressionResult, x: &[f64], y: &[f64]) -> Self {
        if !fit.is_degenerate() {
            return Self {
                residual_ss: fit.residual_ss,
                n: fit.n,
            };
        }
        let ys: Vec<f64> = finite_pairs(x, y).map(|(_, &yi)| yi).collect();
        if ys.is_empty() {
            return Self::default();
        }
        let mean = ys.iter().sum::<f64>() / ys.len() as f64;
        Self {
            residual_ss: ys.iter().map(|v| (v - mean) * (v - mean)).sum(),
            n: ys.len(),
        }
    }
}

/// Regress on all rows and on each side of the selection, then run a Chow test.
pub fn analyze_subsets(x: &[f64], y: &[f64], selection: &[usize]) -> SubsetAnalysis {
    let part = partition(x, y, selection);
    let n = x.len().min(y.len());
    let (x, y) = (&x[..n], &y[..n]);
    let all = linear_regression(x, y);

    let selected_fit = fit_non_empty(&part.selected_x, &part.selected_y);
    let unselected_fit = fit_non_empty(&part.unselected_x, &part.unselected_y);

    let chow = match (&selected_fit, &unselected_fit) {
        (Some(sel), Some(unsel)) => chow_test(
            PartitionFit::of(&all, x, y).residual_ss,
            PartitionFit::of(sel, &part.selected_x, &part.selected_y),
            PartitionFit::of(unsel, &part.unselected_x, &part.unselected_y),
        ),
        _ => None,
    };

    SubsetAnalysis {
        bundle: RegressionBundle {
            all,
            selected: selected_fit.filter(|_| part.selected_len() >= 2),
            unselected: unselected_fit.filter(|_| part.unselected_len() >= 2),
        },
        chow,
        selected_len: part.selected_len(),
        unselected_len: part.unselected_len(),
    }
}

fn fit_non_empty(x: &[f64], y: &[f64]) -> Option<RegressionResult> {
    if x.is_empty() {
        None
    } else {
        Some(linear_regression(x, y))
    }
}

/// Chow test comparing the pooled fit against the two partition fits.
///
/// Degrees of freedom count only the rows each fit used. `None` when either
/// side has no usable rows, the denominator degrees of freedom are not
/// positive, or the split residual sum of squares is zero.
pub fn chow_test(
    pooled_residual_ss: f64,
    selected: PartitionFit,
    unselected: PartitionFit,
) -> Option<ChowTest> {
    if selected.n == 0 || unselected.n == 0 {
        return None;
    }
    let denominator_df = (selected.n + unselected.n)
        .checked_sub(4)
        .filter(|&df| df > 0)?;

    let split_ss = selected.residual_ss + unselected.residual_ss;
    if !(split_ss > 0.0) {
        log::debug!("chow test skipped: split residual SS is {split_ss}");
        return None;
    }

    let f_stat = ((pooled_residual_ss - split_ss) / CHOW_NUMERATOR_DF as f64)
        / (split_ss / denominator_df as f64);
    if !f_stat.is_finite() {
        return None;
    }
    let p_value = 1.0 - f_cdf(f_stat, CHOW_NUMERATOR_DF as f64, denominator_df as f64);

    Some(ChowTest {
        f_stat,
        p_value,
        numerator_df: CHOW_NUMERATOR_DF,
        denominator_df,
    })
}
