use std::time::Instant;

use eframe::egui;

use brushlink::EngineConfig;

use crate::color::SeriesColors;
use crate::state::AppState;
use crate::ui::{panels, plot};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct BrushlinkApp {
    pub state: AppState,
    pub colors: SeriesColors,
}

impl BrushlinkApp {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            state: AppState::new(config),
            colors: SeriesColors::default(),
        }
    }
}

impl eframe::App for BrushlinkApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = Instant::now();

        // Staged empty/full brushes commit once their settle window passes.
        if let Some(deadline) = self.state.tick(now) {
            ctx.request_repaint_after(deadline.saturating_duration_since(now));
        }

        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: selection + regression summaries ----
        egui::SidePanel::left("summary_panel")
            .default_width(300.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state, &self.colors);
            });

        // ---- Central panel: 2 × 2 linked views ----
        egui::CentralPanel::default().show(ctx, |ui| {
            let rows = self.state.views.len().div_ceil(2).max(1);
            let height = (ui.available_height() / rows as f32 - 28.0).max(120.0);
            let colors = &self.colors;
            let views = &mut self.state.views;
            ui.columns(2, |cols| {
                for (i, panel) in views.iter_mut().enumerate() {
                    plot::linked_plot(&mut cols[i % 2], panel, colors, height, now);
                }
            });
        });
    }
}
