use std::path::Path;

use eframe::egui;

use crate::config::AppConfig;
use crate::fetch::{LoadOutcome, Loader};
use crate::state::AppState;
use crate::ui::panels::{self, PanelAction};
use crate::ui::plot;

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct DashboardApp {
    pub state: AppState,
    loader: Loader,
}

impl DashboardApp {
    pub fn new(cc: &eframe::CreationContext<'_>, config: AppConfig) -> Self {
        let ctx = cc.egui_ctx.clone();
        let mut app = Self {
            state: AppState::new(config),
            loader: Loader::new(move || ctx.request_repaint()),
        };
        app.reload();
        app
    }

    /// Issue fresh loads for both sources. Responses to earlier requests
    /// that are still in flight will be discarded.
    pub fn reload(&mut self) {
        log::info!("Loading data from {}", self.state.config.base_path.display());
        self.state.loading = true;
        self.state.summary.regional_loading = true;
        self.loader.request_aggregated(&self.state.config);
        self.loader.request_regional(&self.state.config);
    }

    /// Switch to another data directory and reload from it.
    pub fn open_directory(&mut self, dir: &Path) {
        match AppConfig::resolve(dir) {
            Ok(config) => {
                self.state.config = config;
                self.state.status_message = None;
                self.reload();
            }
            Err(e) => {
                log::error!("Failed to open {}: {e}", dir.display());
                self.state.status_message = Some(format!("Error: {e}"));
            }
        }
    }

    fn apply_loads(&mut self) {
        for outcome in self.loader.poll() {
            match outcome {
                LoadOutcome::Aggregated(Ok(table)) => self.state.set_table(table),
                LoadOutcome::Aggregated(Err(e)) => self.state.set_load_error(&e),
                LoadOutcome::Regional(Ok(table)) => self.state.set_regional(table),
                LoadOutcome::Regional(Err(e)) => self.state.set_regional_error(&e),
            }
        }
        self.state.loading = self.loader.aggregated_in_flight();
        self.state.summary.regional_loading = self.loader.regional_in_flight();
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.apply_loads();

        // ---- Top panel: menu bar + date range ----
        let action = egui::TopBottomPanel::top("top_bar")
            .show(ctx, |ui| panels::top_bar(ui, &mut self.state))
            .inner;
        match action {
            Some(PanelAction::Reload) => self.reload(),
            Some(PanelAction::OpenDirectory(dir)) => self.open_directory(&dir),
            None => {}
        }

        // ---- Left side panel: series selection ----
        egui::SidePanel::left("series_panel")
            .default_width(200.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::series_panel(ui, &mut self.state);
            });

        // ---- Right side panel: rankings ----
        egui::SidePanel::right("summary_panel")
            .default_width(260.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::summary_panel(ui, &self.state);
            });

        // ---- Central panel: plot ----
        egui::CentralPanel::default().show(ctx, |ui| {
            plot::inventory_plot(ui, &self.state);
        });
    }
}
