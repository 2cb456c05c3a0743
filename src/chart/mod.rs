/// Turns analytics results into renderable chart descriptions.
pub mod options;

pub use options::{scatter_options, ChartLabels, ChartOptions, LineStyle, OverlaySeries, ScatterPoint, SeriesRole};
