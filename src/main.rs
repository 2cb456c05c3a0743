mod app;
mod color;
mod state;
mod ui;

use std::path::Path;

use app::BrushlinkApp;
use brushlink::EngineConfig;
use eframe::egui;

fn main() -> eframe::Result {
    env_logger::init();

    // Optional JSON config path as the first argument.
    let config = match std::env::args().nth(1) {
        Some(path) => EngineConfig::load(Path::new(&path)).unwrap_or_else(|e| {
            log::error!("Failed to load config: {e:#}");
            EngineConfig::default()
        }),
        None => EngineConfig::default(),
    };

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([800.0, 500.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Brushlink – Linked Views",
        options,
        Box::new(move |_cc| Ok(Box::new(BrushlinkApp::new(config)))),
    )
}
