/// Linked selection across views.
///
/// ```text
///   view A brush ──► ChartReactor A ──publish──► SelectionStore
///                                                   │ (all subscribers of the
///                                                   │  dataset except A)
///                                                   ▼
///                    ChartReactor B ◄───────────────┘
///                       │ highlight + recompute analytics
///                       ▼
///                    surface B
/// ```
pub mod event;
pub mod reactor;
pub mod store;

pub use event::{DatasetId, HostAction, RawSelectionEvent, SelectionError, SelectionEvent, ViewId};
pub use reactor::{AnalyticsSource, ChartReactor, HighlightSurface, SettleGuard, ViewAnalytics, ViewBinding};
pub use store::{SelectionStore, Subscription};
