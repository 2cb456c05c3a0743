use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use brushlink::chart::options::{describe_chow, describe_fit};

use crate::color::SeriesColors;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – selection + analytics summary
// ---------------------------------------------------------------------------

/// Render the left summary panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState, colors: &SeriesColors) {
    ui.heading("Selection");
    ui.separator();

    let Some(table) = &state.table else {
        ui.label("No dataset loaded.");
        return;
    };
    let total = table.len();

    ui.label(format!("{} of {total} rows selected", state.selection_len()));
    if ui.button("Clear selection").clicked() {
        state.clear_selection();
    }
    ui.add_space(4.0);

    ui.horizontal_wrapped(|ui: &mut Ui| {
        for (label, color) in colors.legend_entries() {
            ui.label(RichText::new(format!("■ {label}")).color(color));
        }
    });
    ui.separator();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for panel in &state.views {
                let reactor = panel.reactor.borrow();
                let analytics = reactor.analytics();

                egui::CollapsingHeader::new(RichText::new(&panel.title).strong())
                    .id_salt(&panel.title)
                    .default_open(true)
                    .show(ui, |ui: &mut Ui| {
                        if let Some(subset) = &analytics.subset {
                            let bundle = &subset.bundle;
                            ui.label(describe_fit("All", &bundle.all));
                            match &bundle.selected {
                                Some(fit) => ui.label(describe_fit("Selected", fit)),
                                None => ui.weak(format!("Selected: {} rows, no fit", subset.selected_len)),
                            };
                            match &bundle.unselected {
                                Some(fit) => ui.label(describe_fit("Unselected", fit)),
                                None => ui.weak(format!("Unselected: {} rows, no fit", subset.unselected_len)),
                            };
                            match &subset.chow {
                                Some(chow) => ui.label(describe_chow(chow)),
                                None => ui.weak("Chow test: n/a"),
                            };
                        } else if analytics.loess_all.is_some() {
                            let band = if analytics.loess_selected.is_some() {
                                "all rows + selection"
                            } else {
                                "all rows"
                            };
                            ui.label(format!("LOESS band over {band}"));
                        } else {
                            ui.weak("Highlight only");
                        }
                    });
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("Data", |ui: &mut Ui| {
            if ui.button("Regenerate").clicked() {
                let seed = state.seed.wrapping_add(1);
                state.load_demo(state.grid_side, seed);
                ui.close_menu();
            }
            ui.separator();
            for side in [8usize, 12, 16] {
                if ui
                    .selectable_label(state.grid_side == side, format!("{side} × {side} tracts"))
                    .clicked()
                {
                    state.load_demo(side, state.seed);
                    ui.close_menu();
                }
            }
        });

        ui.separator();

        if let Some(table) = &state.table {
            ui.label(format!(
                "{} tracts, {} views linked",
                table.len(),
                state.store.subscriber_count(&table.id)
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}
