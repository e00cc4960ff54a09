use std::path::PathBuf;

use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::{Column, TableBuilder};

use crate::chart::{format_date_label, format_value};
use crate::state::AppState;

/// Requests from the panels that need more than the UI state (background
/// loads, a new data directory).
pub enum PanelAction {
    Reload,
    OpenDirectory(PathBuf),
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the menu bar and the date range controls.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) -> Option<PanelAction> {
    let mut action = None;

    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open data folder…").clicked() {
                action = pick_directory(state).map(PanelAction::OpenDirectory);
                ui.close_menu();
            }
            if ui.button("Reload data").clicked() {
                action = Some(PanelAction::Reload);
                ui.close_menu();
            }
        });

        ui.separator();
        ui.strong("Housing Inventory Dashboard");
        ui.separator();

        if let Some(store) = &state.store {
            ui.label(format!(
                "{} series, {} of {} weeks shown",
                store.catalog().len(),
                state.visible_rows().len(),
                store.len()
            ));
        }
        if state.loading || state.summary.regional_loading {
            ui.spinner();
        }
        if let Some(msg) = &state.status_message {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });

    date_range_controls(ui, state);
    action
}

/// Two sliders over the date list; the state layer orders the pair.
fn date_range_controls(ui: &mut Ui, state: &mut AppState) {
    let Some((mut start, mut end)) = state.range_indices() else {
        return;
    };
    let last = state.store.as_ref().map_or(0, |s| s.len().saturating_sub(1));

    ui.horizontal(|ui: &mut Ui| {
        ui.label(format!("Start: {}", format_date_label(&state.range.start)));
        let start_changed = ui
            .add(egui::Slider::new(&mut start, 0..=last).show_value(false))
            .changed();
        ui.label(format!("End: {}", format_date_label(&state.range.end)));
        let end_changed = ui
            .add(egui::Slider::new(&mut end, 0..=last).show_value(false))
            .changed();

        if start_changed || end_changed {
            state.set_range_indices(start, end);
        }
        if ui.small_button("Full range").clicked() {
            if let Some(full) = state.store.as_ref().map(|s| s.full_range()) {
                state.set_range(full);
            }
        }
    });
}

fn pick_directory(state: &AppState) -> Option<PathBuf> {
    rfd::FileDialog::new()
        .set_title("Choose the folder holding the inventory CSV files")
        .set_directory(&state.config.base_path)
        .pick_folder()
}

// ---------------------------------------------------------------------------
// Left side panel – series selection
// ---------------------------------------------------------------------------

pub fn series_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Select States");
    ui.separator();

    if state.store.is_none() {
        ui.label("No dataset loaded.");
        return;
    }

    ui.horizontal(|ui: &mut Ui| {
        if ui.small_button(format!("Top {}", state.config.top_k)).clicked() {
            state.reset_default_selection();
        }
        if ui.small_button("None").clicked() {
            state.clear_selection();
        }
    });
    if let Some(caption) = state.selection_caption() {
        ui.label(RichText::new(caption).weak().small());
    }

    // Snapshot the order so toggling inside the loop doesn't reshuffle it
    // mid-frame.
    let order = state.series_order();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for name in &order {
                let mut checked = state.is_selected(name);
                let mut text = RichText::new(name);
                if let Some(c) = state.palette.color_for(&state.selection, name) {
                    text = text.color(c);
                }
                if name == &state.config.aggregate_series {
                    text = text.strong();
                }
                if ui.checkbox(&mut checked, text).changed() {
                    state.toggle_series(name);
                }
            }
        });
}

// ---------------------------------------------------------------------------
// Right side panel – top-N summaries
// ---------------------------------------------------------------------------

pub fn summary_panel(ui: &mut Ui, state: &AppState) {
    let k = state.config.top_k;
    let summary = &state.summary;

    ui.heading(format!("Top {k} Regions by Inventory"));
    if let Some(date) = &summary.regions_as_of {
        ui.label(format_date_label(date));
    }
    if let Some(err) = &summary.regional_error {
        ui.label(RichText::new(format!("Error: {err}")).color(Color32::RED));
    } else if summary.regional_loading {
        ui.spinner();
    } else {
        let rows: Vec<(String, f64)> = summary
            .top_regions
            .iter()
            .map(|r| {
                let label = match &r.state {
                    Some(st) if !r.entry.name.ends_with(st.as_str()) => {
                        format!("{} ({st})", r.entry.name)
                    }
                    _ => r.entry.name.clone(),
                };
                (label, r.entry.value)
            })
            .collect();
        ui.push_id("top_regions", |ui: &mut Ui| ranking_table(ui, &rows));
    }

    ui.add_space(12.0);
    ui.separator();

    ui.heading(format!("Top {k} States by Inventory"));
    if let Some(date) = &summary.states_as_of {
        ui.label(format_date_label(date));
    }
    if let Some(err) = &state.load_error {
        ui.label(RichText::new(format!("Error: {err}")).color(Color32::RED));
    } else {
        let rows: Vec<(String, f64)> = summary
            .top_states
            .iter()
            .map(|e| (e.name.clone(), e.value))
            .collect();
        ui.push_id("top_states", |ui: &mut Ui| ranking_table(ui, &rows));
    }
}

fn ranking_table(ui: &mut Ui, rows: &[(String, f64)]) {
    if rows.is_empty() {
        ui.label("No data in the selected range.");
        return;
    }
    TableBuilder::new(ui)
        .striped(true)
        .column(Column::auto())
        .column(Column::remainder())
        .column(Column::auto())
        .body(|mut body| {
            for (i, (name, value)) in rows.iter().enumerate() {
                body.row(20.0, |mut row| {
                    row.col(|ui| {
                        ui.label(format!("{}.", i + 1));
                    });
                    row.col(|ui| {
                        ui.strong(name);
                    });
                    row.col(|ui| {
                        ui.label(format_value(*value));
                    });
                });
            }
        });
}
