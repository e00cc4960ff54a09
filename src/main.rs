mod app;
mod chart;
mod color;
mod config;
mod data;
mod fetch;
mod state;
mod ui;

use std::path::Path;

use app::DashboardApp;
use config::{AppConfig, DEFAULT_BASE_PATH};
use eframe::egui;

fn main() -> eframe::Result {
    env_logger::init();

    let config = AppConfig::resolve(Path::new(DEFAULT_BASE_PATH)).unwrap_or_else(|e| {
        log::error!("{e}; falling back to defaults");
        AppConfig::default()
    });
    log::info!(
        "Data directory {}, sources {} and {}",
        config.base_path.display(),
        config.aggregated_file,
        config.regional_file
    );

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 860.0])
            .with_min_inner_size([640.0, 420.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Housing Inventory Dashboard",
        options,
        Box::new(|cc| Ok(Box::new(DashboardApp::new(cc, config)))),
    )
}
