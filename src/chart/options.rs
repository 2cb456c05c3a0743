use serde::Serialize;

use crate::selection::reactor::ViewAnalytics;
use crate::stats::loess::LoessCurve;
use crate::stats::regression::RegressionResult;
use crate::stats::subset::{selection_mask, ChowTest};

// ---------------------------------------------------------------------------
// Renderable description of a scatter chart
// ---------------------------------------------------------------------------

/// Which rows an overlay was computed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SeriesRole {
    All,
    Selected,
    Unselected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LineStyle {
    Solid,
    Dashed,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverlaySeries {
    pub name: String,
    pub role: SeriesRole,
    pub style: LineStyle,
    pub points: Vec<[f64; 2]>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScatterPoint {
    pub row: usize,
    pub position: [f64; 2],
    pub highlighted: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ChartOptions {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub points: Vec<ScatterPoint>,
    pub overlays: Vec<OverlaySeries>,
    pub summary: Vec<String>,
}

#[derive(Debug, Clone, Copy)]
pub struct ChartLabels<'a> {
    pub title: &'a str,
    pub x: &'a str,
    pub y: &'a str,
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Assemble points, overlays and summary lines for a scatter view.
///
/// Missing analytics (no regression for a partition, no Chow test, no LOESS
/// curve) simply produce no overlay; rows with non-finite coordinates are not
/// plotted.
pub fn scatter_options(
    labels: ChartLabels<'_>,
    x: &[f64],
    y: &[f64],
    highlighted: &[usize],
    analytics: &ViewAnalytics,
) -> ChartOptions {
    let n = x.len().min(y.len());
    let mask = selection_mask(highlighted, n);

    let points: Vec<ScatterPoint> = (0..n)
        .filter(|&i| x[i].is_finite() && y[i].is_finite())
        .map(|i| ScatterPoint {
            row: i,
            position: [x[i], y[i]],
            highlighted: mask[i],
        })
        .collect();

    let mut options = ChartOptions {
        title: labels.title.to_string(),
        x_label: labels.x.to_string(),
        y_label: labels.y.to_string(),
        points,
        ..ChartOptions::default()
    };

    if let Some(subset) = &analytics.subset {
        let bundle = &subset.bundle;
        let fits = [
            (SeriesRole::All, Some(bundle.all)),
            (SeriesRole::Selected, bundle.selected),
            (SeriesRole::Unselected, bundle.unselected),
        ];
        for (role, fit) in fits {
            let Some(fit) = fit.filter(|f| !f.is_degenerate()) else {
                continue;
            };
            let extent = x_extent(&options.points, role);
            if let Some(line) = extent.map(|(lo, hi)| regression_line(&fit, lo, hi)) {
                options.overlays.push(OverlaySeries {
                    name: format!("{} fit", role_label(role)),
                    role,
                    style: LineStyle::Solid,
                    points: line,
                });
            }
            options.summary.push(describe_fit(role_label(role), &fit));
        }
        if let Some(chow) = &subset.chow {
            options.summary.push(describe_chow(chow));
        }
    }

    if let Some(curve) = &analytics.loess_all {
        push_loess(&mut options, SeriesRole::All, curve);
    }
    if let Some(curve) = &analytics.loess_selected {
        push_loess(&mut options, SeriesRole::Selected, curve);
    }

    options
}

fn push_loess(options: &mut ChartOptions, role: SeriesRole, curve: &LoessCurve) {
    let label = role_label(role);
    options.overlays.push(OverlaySeries {
        name: format!("{label} LOESS"),
        role,
        style: LineStyle::Solid,
        points: curve.fitted.clone(),
    });
    options.overlays.push(OverlaySeries {
        name: format!("{label} upper"),
        role,
        style: LineStyle::Dashed,
        points: curve.upper.clone(),
    });
    options.overlays.push(OverlaySeries {
        name: format!("{label} lower"),
        role,
        style: LineStyle::Dashed,
        points: curve.lower.clone(),
    });
}

fn role_label(role: SeriesRole) -> &'static str {
    match role {
        SeriesRole::All => "All",
        SeriesRole::Selected => "Selected",
        SeriesRole::Unselected => "Unselected",
    }
}

/// x range of the points belonging to `role`.
fn x_extent(points: &[ScatterPoint], role: SeriesRole) -> Option<(f64, f64)> {
    points
        .iter()
        .filter(|p| match role {
            SeriesRole::All => true,
            SeriesRole::Selected => p.highlighted,
            SeriesRole::Unselected => !p.highlighted,
        })
        .map(|p| p.position[0])
        .fold(None, |acc, x| match acc {
            None => Some((x, x)),
            Some((lo, hi)) => Some((lo.min(x), hi.max(x))),
        })
}

fn regression_line(fit: &RegressionResult, lo: f64, hi: f64) -> Vec<[f64; 2]> {
    vec![[lo, fit.predict(lo)], [hi, fit.predict(hi)]]
}

fn format_p(p: f64) -> String {
    if p < 0.001 {
        "< 0.001".to_string()
    } else {
        format!("{p:.3}")
    }
}

/// One-line summary, e.g. `All: y = 0.120 + 1.980x, R² 0.912, p 0.004 (n=40)`.
pub fn describe_fit(label: &str, fit: &RegressionResult) -> String {
    let sign = if fit.slope.estimate < 0.0 { '-' } else { '+' };
    format!(
        "{label}: y = {:.3} {sign} {:.3}x, R² {:.3}, p {} (n={})",
        fit.intercept.estimate,
        fit.slope.estimate.abs(),
        fit.r_squared,
        format_p(fit.slope.p_value),
        fit.n
    )
}

pub fn describe_chow(chow: &ChowTest) -> String {
    format!(
        "Chow F({}, {}) = {:.3}, p {}",
        chow.numerator_df,
        chow.denominator_df,
        chow.f_stat,
        format_p(chow.p_value)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::subset::analyze_subsets;

    const LABELS: ChartLabels<'static> = ChartLabels {
        title: "t",
        x: "x",
        y: "y",
    };

    #[test]
    fn no_analytics_means_no_overlays() {
        let options = scatter_options(LABELS, &[1.0, 2.0], &[3.0, 4.0], &[1], &ViewAnalytics::default());
        assert_eq!(options.points.len(), 2);
        assert!(options.points[1].highlighted);
        assert!(options.overlays.is_empty());
        assert!(options.summary.is_empty());
    }

    #[test]
    fn regression_overlays_follow_partitions() {
        let x = [0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let y = [0.0, 1.1, 1.9, 3.2, 8.0, 6.1, 4.2];
        let analytics = ViewAnalytics {
            subset: Some(analyze_subsets(&x, &y, &[0, 1, 2, 3])),
            ..ViewAnalytics::default()
        };
        let options = scatter_options(LABELS, &x, &y, &[0, 1, 2, 3], &analytics);

        let roles: Vec<SeriesRole> = options.overlays.iter().map(|o| o.role).collect();
        assert_eq!(
            roles,
            vec![SeriesRole::All, SeriesRole::Selected, SeriesRole::Unselected]
        );
        // Selected line spans only the selected rows.
        assert_eq!(options.overlays[1].points[0][0], 0.0);
        assert_eq!(options.overlays[1].points[1][0], 3.0);
        assert!(options.summary.iter().any(|s| s.starts_with("Chow F(2, 3)")));
    }

    #[test]
    fn fit_summary_formats_negative_slope() {
        let fit = crate::stats::regression::linear_regression(&[0.0, 1.0, 2.0], &[2.0, 1.0, 0.0]);
        let text = describe_fit("All", &fit);
        assert!(text.starts_with("All: y = 2.000 - 1.000x"), "{text}");
    }
}
