use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;
use std::time::Instant;

use brushlink::data::model::Table;
use brushlink::data::synth::demo_table;
use brushlink::stats::spatial::moran_scatter;
use brushlink::{
    AnalyticsSource, ChartReactor, DatasetId, EngineConfig, HighlightSurface, SelectionEvent,
    SelectionStore, ViewBinding, ViewId,
};

use crate::ui::plot::BrushState;

/// Dataset id of the demo tracts table.
pub const DEMO_DATASET: &str = "tracts";

/// Source id used when the side panel clears the selection.
pub const PANEL_SOURCE: &str = "panel";

// ---------------------------------------------------------------------------
// Plot surface
// ---------------------------------------------------------------------------

/// Highlight state of one egui plot.
#[derive(Debug, Default)]
pub struct PlotSurface {
    pub highlighted: BTreeSet<usize>,
}

impl HighlightSurface for PlotSurface {
    fn highlight(&mut self, indices: &[usize]) {
        self.highlighted = indices.iter().copied().collect();
    }

    fn clear_highlight(&mut self) {
        self.highlighted.clear();
    }
}

// ---------------------------------------------------------------------------
// Linked view panels
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewKind {
    /// lon/lat, highlight only.
    Map,
    /// income vs crime with OLS per partition and Chow test.
    Regression,
    /// income vs density with LOESS bands.
    Loess,
    /// standardized income vs its spatial lag; slope is Moran's I.
    Moran,
}

pub struct ViewPanel {
    pub kind: ViewKind,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub reactor: Rc<RefCell<ChartReactor<PlotSurface>>>,
    pub brush: BrushState,
}

struct ViewColumns {
    x_label: &'static str,
    y_label: &'static str,
    x: Vec<f64>,
    y: Vec<f64>,
    analytics: AnalyticsSource,
}

fn view_columns(kind: ViewKind, table: &Table, config: &EngineConfig) -> ViewColumns {
    let col = |name: &str| table.column(name).map(<[f64]>::to_vec).unwrap_or_default();
    match kind {
        ViewKind::Map => ViewColumns {
            x_label: "Longitude",
            y_label: "Latitude",
            x: col("lon"),
            y: col("lat"),
            analytics: AnalyticsSource::None,
        },
        ViewKind::Regression => {
            let (x, y) = (col("income"), col("crime"));
            ViewColumns {
                x_label: "Income",
                y_label: "Crime",
                analytics: AnalyticsSource::Regression { x: x.clone(), y: y.clone() },
                x,
                y,
            }
        }
        ViewKind::Loess => {
            let (x, y) = (col("income"), col("density"));
            ViewColumns {
                x_label: "Income",
                y_label: "Density",
                analytics: AnalyticsSource::Loess {
                    x: x.clone(),
                    y: y.clone(),
                    config: config.loess,
                },
                x,
                y,
            }
        }
        ViewKind::Moran => {
            let (x, y) = moran_scatter(&col("income"), table.neighbors());
            ViewColumns {
                x_label: "Income (z)",
                y_label: "Spatial lag",
                analytics: AnalyticsSource::Regression { x: x.clone(), y: y.clone() },
                x,
                y,
            }
        }
    }
}

fn view_title(kind: ViewKind) -> &'static str {
    match kind {
        ViewKind::Map => "Map",
        ViewKind::Regression => "Scatter + OLS",
        ViewKind::Loess => "Scatter + LOESS",
        ViewKind::Moran => "Moran scatter",
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: EngineConfig,

    /// Selection store shared by every view.
    pub store: SelectionStore,

    /// Loaded dataset (None until the demo data is generated).
    pub table: Option<Table>,

    pub views: Vec<ViewPanel>,

    /// Grid side length of the current demo dataset.
    pub grid_side: usize,

    pub seed: u64,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(config: EngineConfig) -> Self {
        let mut state = Self {
            config,
            store: SelectionStore::new(),
            table: None,
            views: Vec::new(),
            grid_side: 12,
            seed: 42,
            status_message: None,
        };
        state.load_demo(state.grid_side, state.seed);
        state
    }

    /// Generate demo tracts and (re)bind every view to them.
    pub fn load_demo(&mut self, side: usize, seed: u64) {
        let table = match demo_table(DatasetId::from(DEMO_DATASET), side, seed) {
            Ok(t) => t,
            Err(e) => {
                log::error!("Failed to build demo data: {e}");
                self.status_message = Some(format!("Error: {e}"));
                return;
            }
        };
        log::info!(
            "Generated {} tracts with columns {:?}",
            table.len(),
            table.column_names().collect::<Vec<_>>()
        );

        self.store.register_dataset(table.id.clone(), table.len());

        if self.views.is_empty() {
            for kind in [ViewKind::Map, ViewKind::Regression, ViewKind::Loess, ViewKind::Moran] {
                let view = self.build_view(kind, &table);
                self.views.push(view);
            }
        } else {
            for panel in &mut self.views {
                let cols = view_columns(panel.kind, &table, &self.config);
                panel.reactor.borrow_mut().rebind(table.len(), cols.analytics);
                panel.x = cols.x;
                panel.y = cols.y;
                panel.brush = BrushState::default();
            }
        }

        self.grid_side = side;
        self.seed = seed;
        self.table = Some(table);
        self.status_message = None;
    }

    fn build_view(&self, kind: ViewKind, table: &Table) -> ViewPanel {
        let cols = view_columns(kind, table, &self.config);
        let binding = ViewBinding {
            view_id: ViewId::new(format!("{kind:?}").to_lowercase()),
            dataset_id: table.id.clone(),
            num_rows: table.len(),
            analytics: cols.analytics,
        };
        let reactor = ChartReactor::attach(
            &self.store,
            binding,
            PlotSurface::default(),
            self.config.settle_window(),
        );
        ViewPanel {
            kind,
            title: view_title(kind).to_string(),
            x_label: cols.x_label.to_string(),
            y_label: cols.y_label.to_string(),
            x: cols.x,
            y: cols.y,
            reactor,
            brush: BrushState::default(),
        }
    }

    /// Commit settled brushes. Returns the earliest still-pending deadline.
    pub fn tick(&mut self, now: Instant) -> Option<Instant> {
        let mut next: Option<Instant> = None;
        for panel in &self.views {
            let mut reactor = panel.reactor.borrow_mut();
            reactor.tick(now);
            if let Some(deadline) = reactor.settle_deadline() {
                next = Some(next.map_or(deadline, |n| n.min(deadline)));
            }
        }
        next
    }

    /// Clear the selection for every view, as the host's "clear" action does.
    pub fn clear_selection(&mut self) {
        let event = SelectionEvent::new(PANEL_SOURCE, DEMO_DATASET, Vec::new());
        if let Err(e) = self.store.publish(event) {
            self.status_message = Some(format!("Error: {e}"));
        }
    }

    pub fn selection_len(&self) -> usize {
        self.store.selection(&DatasetId::from(DEMO_DATASET)).len()
    }
}
