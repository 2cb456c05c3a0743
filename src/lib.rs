//! Linked-selection synchronization and regression analytics for chart views.
//!
//! A [`SelectionStore`] holds the current row selection per dataset and fans
//! every published [`SelectionEvent`] out to the other views of that dataset.
//! Each view owns a [`ChartReactor`] that highlights its surface and reruns
//! the regression, Chow and LOESS engines on the new partition.

pub mod chart;
pub mod config;
pub mod data;
pub mod selection;
pub mod stats;

pub use config::EngineConfig;
pub use selection::{
    AnalyticsSource, ChartReactor, DatasetId, HighlightSurface, SelectionStore, SelectionEvent,
    ViewAnalytics, ViewBinding, ViewId,
};
