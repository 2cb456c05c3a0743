use std::time::Instant;

use eframe::egui::{Stroke, Ui};
use egui_plot::{Legend, Line, LineStyle as PlotLineStyle, Plot, PlotPoints, Points, Polygon};

use brushlink::chart::{scatter_options, ChartLabels, LineStyle, ScatterPoint};
use brushlink::data::filter::{brushed_indices, BrushRect};

use crate::color::SeriesColors;
use crate::state::ViewPanel;

// ---------------------------------------------------------------------------
// Brush gesture state
// ---------------------------------------------------------------------------

/// Corners of an in-progress drag, in plot coordinates.
#[derive(Debug, Clone, Copy, Default)]
pub struct BrushState {
    pub start: Option<[f64; 2]>,
    pub current: Option<[f64; 2]>,
}

impl BrushState {
    fn rect(&self) -> Option<BrushRect> {
        Some(BrushRect::from_corners(self.start?, self.current?))
    }
}

// ---------------------------------------------------------------------------
// Linked scatter plot
// ---------------------------------------------------------------------------

/// Render one linked view and forward brush gestures to its reactor.
pub fn linked_plot(ui: &mut Ui, panel: &mut ViewPanel, colors: &SeriesColors, height: f32, now: Instant) {
    let options = {
        let reactor = panel.reactor.borrow();
        let highlighted: Vec<usize> = reactor.surface().highlighted.iter().copied().collect();
        scatter_options(
            ChartLabels {
                title: &panel.title,
                x: &panel.x_label,
                y: &panel.y_label,
            },
            &panel.x,
            &panel.y,
            &highlighted,
            reactor.analytics(),
        )
    };

    ui.strong(&options.title);
    let brush = &mut panel.brush;

    let response = Plot::new(panel.title.as_str())
        .height(height)
        .legend(Legend::default())
        .x_axis_label(options.x_label.as_str())
        .y_axis_label(options.y_label.as_str())
        .allow_drag(false)
        .allow_boxed_zoom(false)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            let (hit, rest): (Vec<&ScatterPoint>, Vec<&ScatterPoint>) =
                options.points.iter().partition(|p| p.highlighted);
            let base: PlotPoints = rest.iter().map(|p| p.position).collect();
            plot_ui.points(Points::new(base).radius(2.5).color(colors.point));
            if !hit.is_empty() {
                let selected: PlotPoints = hit.iter().map(|p| p.position).collect();
                plot_ui.points(
                    Points::new(selected)
                        .radius(3.5)
                        .color(colors.highlighted_point)
                        .name("Selected"),
                );
            }

            for overlay in &options.overlays {
                let points: PlotPoints = overlay.points.iter().copied().collect();
                let mut line = Line::new(points)
                    .name(&overlay.name)
                    .color(colors.for_role(overlay.role))
                    .width(1.5);
                if overlay.style == LineStyle::Dashed {
                    line = line.style(PlotLineStyle::dashed_loose()).width(1.0);
                }
                plot_ui.line(line);
            }

            // Primary-button drag draws the brush; a bare click is an empty brush.
            let response = plot_ui.response().clone();
            let pointer = plot_ui.pointer_coordinate().map(|p| [p.x, p.y]);
            if response.drag_started() {
                brush.start = pointer;
                brush.current = pointer;
            } else if response.dragged() && pointer.is_some() {
                brush.current = pointer;
            }

            if let Some(rect) = brush.rect() {
                let corners: PlotPoints = vec![
                    [rect.min[0], rect.min[1]],
                    [rect.max[0], rect.min[1]],
                    [rect.max[0], rect.max[1]],
                    [rect.min[0], rect.max[1]],
                ]
                .into();
                plot_ui.polygon(
                    Polygon::new(corners)
                        .fill_color(colors.brush_fill)
                        .stroke(Stroke::new(1.0, colors.highlighted_point)),
                );
            }

            if response.drag_stopped() {
                let rect = brush.rect();
                *brush = BrushState::default();
                return rect.map(|r| brushed_indices(&panel.x, &panel.y, &r));
            }
            if response.clicked() {
                return Some(Vec::new());
            }
            None
        });

    if let Some(indices) = response.inner {
        log::debug!("{} brushed {} rows", options.title, indices.len());
        panel.reactor.borrow_mut().on_brush(indices, now);
    }
}
