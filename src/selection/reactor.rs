use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use super::event::{DatasetId, SelectionEvent, ViewId};
use super::store::{SelectionStore, Subscription};
use crate::stats::loess::{loess, LoessConfig, LoessCurve};
use crate::stats::subset::{analyze_subsets, partition, selection_mask, SubsetAnalysis};

// ---------------------------------------------------------------------------
// Host seams
// ---------------------------------------------------------------------------

/// Rendering surface of a chart view or map layer.
pub trait HighlightSurface {
    /// Emphasize the given rows, replacing any previous highlight.
    fn highlight(&mut self, indices: &[usize]);

    fn clear_highlight(&mut self);
}

/// Columns a view feeds into the analytics engines on every selection.
#[derive(Debug, Clone, Default)]
pub enum AnalyticsSource {
    /// Highlight only (e.g. a map layer).
    #[default]
    None,
    /// OLS per partition plus Chow test.
    Regression { x: Vec<f64>, y: Vec<f64> },
    /// LOESS over all rows and over the selected rows.
    Loess {
        x: Vec<f64>,
        y: Vec<f64>,
        config: LoessConfig,
    },
}

/// What a view renders besides its points; `None` entries are omitted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewAnalytics {
    pub subset: Option<SubsetAnalysis>,
    pub loess_all: Option<LoessCurve>,
    pub loess_selected: Option<LoessCurve>,
}

#[derive(Debug, Clone)]
pub struct ViewBinding {
    pub view_id: ViewId,
    pub dataset_id: DatasetId,
    pub num_rows: usize,
    pub analytics: AnalyticsSource,
}

/// Whether `indices` name every row of a dataset with `num_rows` rows.
pub fn covers_all_rows(indices: &[usize], num_rows: usize) -> bool {
    if num_rows == 0 || indices.len() < num_rows {
        return false;
    }
    selection_mask(indices, num_rows).iter().all(|&b| b)
}

// ---------------------------------------------------------------------------
// Settle guard
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
struct PendingBrush {
    indices: Vec<usize>,
    deadline: Instant,
}

/// Holds back empty or all-rows brushes for a short window.
///
/// A click that ends a brush gesture briefly reports an empty (or full)
/// selection before the final one arrives. Such brushes are staged and only
/// committed once the window elapses without a newer brush.
#[derive(Debug, Clone)]
pub struct SettleGuard {
    window: Duration,
    pending: Option<PendingBrush>,
}

impl SettleGuard {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            pending: None,
        }
    }

    /// Offer a brush result. Returns the indices to commit right away, or
    /// `None` if they were staged.
    pub fn offer(&mut self, indices: Vec<usize>, num_rows: usize, now: Instant) -> Option<Vec<usize>> {
        if indices.is_empty() || covers_all_rows(&indices, num_rows) {
            self.pending = Some(PendingBrush {
                indices,
                deadline: now + self.window,
            });
            return None;
        }
        if self.pending.take().is_some() {
            log::trace!("staged brush superseded");
        }
        Some(indices)
    }

    /// Release a staged brush whose window has elapsed.
    pub fn poll(&mut self, now: Instant) -> Option<Vec<usize>> {
        match &self.pending {
            Some(p) if now >= p.deadline => self.pending.take().map(|p| p.indices),
            _ => None,
        }
    }

    /// Drop a staged brush. Returns true if one was pending.
    pub fn cancel(&mut self) -> bool {
        self.pending.take().is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|p| p.deadline)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

// ---------------------------------------------------------------------------
// Chart reactor
// ---------------------------------------------------------------------------

/// Per-view adapter between the selection store and one rendering surface.
///
/// Foreign selections become highlights plus an analytics recompute; brushes
/// on the own surface are published with this view as the source.
pub struct ChartReactor<S: HighlightSurface> {
    binding: ViewBinding,
    surface: S,
    store: SelectionStore,
    settle: SettleGuard,
    highlighted: Vec<usize>,
    analytics: ViewAnalytics,
    subscription: Option<Subscription>,
}

impl<S: HighlightSurface + 'static> ChartReactor<S> {
    /// Build a reactor and subscribe it to its dataset.
    ///
    /// A selection already present in the store is applied immediately.
    pub fn attach(
        store: &SelectionStore,
        binding: ViewBinding,
        surface: S,
        settle_window: Duration,
    ) -> Rc<RefCell<Self>> {
        let dataset_id = binding.dataset_id.clone();
        let view_id = binding.view_id.clone();

        let mut reactor = Self {
            binding,
            surface,
            store: store.clone(),
            settle: SettleGuard::new(settle_window),
            highlighted: Vec::new(),
            analytics: ViewAnalytics::default(),
            subscription: None,
        };
        reactor.refresh_static_analytics();
        let current = store.selection(&dataset_id);
        reactor.apply(&current);

        let reactor = Rc::new(RefCell::new(reactor));
        let weak = Rc::downgrade(&reactor);
        let subscription = store.subscribe(dataset_id, view_id, move |event| {
            let Some(reactor) = weak.upgrade() else {
                return;
            };
            match reactor.try_borrow_mut() {
                Ok(mut r) => r.receive(event),
                Err(_) => log::warn!("view '{}' busy, dropped selection", event.source_view_id),
            };
        });
        reactor.borrow_mut().subscription = Some(subscription);
        reactor
    }
}

impl<S: HighlightSurface> ChartReactor<S> {
    /// Handle a store event.
    pub fn receive(&mut self, event: &SelectionEvent) {
        if event.source_view_id == self.binding.view_id {
            log::trace!("view '{}' ignoring its own selection", self.binding.view_id);
            return;
        }
        if event.dataset_id != self.binding.dataset_id {
            return;
        }
        // A newer selection from elsewhere supersedes a staged brush.
        if self.settle.cancel() {
            log::debug!(
                "view '{}' discarded staged brush, superseded by '{}'",
                self.binding.view_id,
                event.source_view_id
            );
        }
        self.apply(&event.selected_indices);
    }

    /// Handle a brush on this view's own surface.
    pub fn on_brush(&mut self, indices: Vec<usize>, now: Instant) {
        if let Some(indices) = self.settle.offer(indices, self.binding.num_rows, now) {
            self.commit(indices);
        }
    }

    /// Commit a staged brush once its settle window has elapsed.
    /// Returns true if something was committed.
    pub fn tick(&mut self, now: Instant) -> bool {
        match self.settle.poll(now) {
            Some(indices) => {
                self.commit(indices);
                true
            }
            None => false,
        }
    }

    /// Replace the row count and columns, e.g. after the dataset was reloaded.
    pub fn rebind(&mut self, num_rows: usize, analytics: AnalyticsSource) {
        self.binding.num_rows = num_rows;
        self.binding.analytics = analytics;
        self.refresh_static_analytics();
        let kept: Vec<usize> = self
            .highlighted
            .iter()
            .copied()
            .filter(|&i| i < num_rows)
            .collect();
        self.apply(&kept);
    }

    pub fn detach(&mut self) {
        if let Some(sub) = self.subscription.take() {
            sub.unsubscribe();
        }
    }

    pub fn view_id(&self) -> &ViewId {
        &self.binding.view_id
    }

    pub fn dataset_id(&self) -> &DatasetId {
        &self.binding.dataset_id
    }

    pub fn binding(&self) -> &ViewBinding {
        &self.binding
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn highlighted(&self) -> &[usize] {
        &self.highlighted
    }

    pub fn analytics(&self) -> &ViewAnalytics {
        &self.analytics
    }

    pub fn settle_deadline(&self) -> Option<Instant> {
        self.settle.deadline()
    }

    /// Publish as the origin, then update locally; no echo will come back.
    fn commit(&mut self, indices: Vec<usize>) {
        let event = SelectionEvent {
            source_view_id: self.binding.view_id.clone(),
            dataset_id: self.binding.dataset_id.clone(),
            selected_indices: indices,
        };
        match self.store.publish(event) {
            Ok(_) => {
                let indices = self.store.selection(&self.binding.dataset_id);
                self.apply(&indices);
            }
            Err(e) => log::debug!("view '{}' brush rejected: {e}", self.binding.view_id),
        }
    }

    fn apply(&mut self, indices: &[usize]) {
        if indices.is_empty() || covers_all_rows(indices, self.binding.num_rows) {
            self.highlighted.clear();
            self.surface.clear_highlight();
            self.recompute(&[]);
            return;
        }
        self.highlighted = indices.to_vec();
        self.surface.highlight(indices);
        self.recompute(indices);
    }

    fn refresh_static_analytics(&mut self) {
        self.analytics.loess_all = match &self.binding.analytics {
            AnalyticsSource::Loess { x, y, config } => loess(x, y, config),
            _ => None,
        };
    }

    fn recompute(&mut self, indices: &[usize]) {
        match &self.binding.analytics {
            AnalyticsSource::None => {
                self.analytics.subset = None;
                self.analytics.loess_selected = None;
            }
            AnalyticsSource::Regression { x, y } => {
                self.analytics.subset = Some(analyze_subsets(x, y, indices));
                self.analytics.loess_selected = None;
            }
            AnalyticsSource::Loess { x, y, config } => {
                self.analytics.subset = None;
                self.analytics.loess_selected = if indices.is_empty() {
                    None
                } else {
                    let part = partition(x, y, indices);
                    loess(&part.selected_x, &part.selected_y, config)
                };
            }
        }
    }
}

impl<S: HighlightSurface> Drop for ChartReactor<S> {
    fn drop(&mut self) {
        self.detach();
    }
}
