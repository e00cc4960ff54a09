use eframe::egui::{Color32, RichText, Ui};
use egui_plot::{uniform_grid_spacer, GridMark, Legend, Line, Plot, PlotPoints, VLine};

use crate::chart::{format_date_label, line_segments, tick_interval, tooltip, TooltipPayload};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Inventory plot (central panel)
// ---------------------------------------------------------------------------

/// Render the line chart of the selected series over the active range.
pub fn inventory_plot(ui: &mut Ui, state: &AppState) {
    if let Some(err) = &state.load_error {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading(RichText::new(format!("Error: {err}")).color(Color32::RED));
        });
        return;
    }
    let store = match &state.store {
        Some(store) => store,
        None => {
            ui.centered_and_justified(|ui: &mut Ui| {
                if state.loading {
                    ui.heading("Loading data…");
                } else {
                    ui.heading("No data loaded  (File → Open data folder…)");
                }
            });
            return;
        }
    };

    ui.heading("Housing Inventory Over Time");

    let rows = store.dates_in_range(&state.range);
    let dates: Vec<String> = rows.iter().map(|r| r.date.clone()).collect();

    // Axis density is the only thing that depends on the window size.
    let viewport_width = ui.ctx().screen_rect().width();
    let step = tick_interval(dates.len(), viewport_width) as f64;

    let plot_response = Plot::new("inventory_plot")
        .legend(Legend::default())
        .y_axis_label("Inventory")
        .x_grid_spacer(uniform_grid_spacer(move |_| [step, step * 2.0, step * 4.0]))
        .x_axis_formatter(move |mark: GridMark, _range| axis_label(&dates, mark.value))
        .show_x(false)
        .show_y(false)
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            for (i, name) in state.selection.iter().enumerate() {
                let color = state.palette.color_at(i);
                for segment in line_segments(&rows, name) {
                    let line = Line::new(PlotPoints::from(segment))
                        .name(name)
                        .color(color)
                        .width(2.0);
                    plot_ui.line(line);
                }
            }

            let hovered = plot_ui
                .pointer_coordinate()
                .map(|p| p.x.round())
                .filter(|x| *x >= 0.0 && (*x as usize) < rows.len());
            if let Some(x) = hovered {
                plot_ui.vline(VLine::new(x).color(Color32::from_gray(160)));
            }
            hovered.map(|x| x as usize)
        });

    let payload = plot_response
        .inner
        .and_then(|idx| rows.get(idx))
        .and_then(|row| tooltip(store, &state.range, &row.date, &state.selection, &state.palette));
    if let Some(payload) = payload {
        plot_response
            .response
            .on_hover_ui_at_pointer(|ui: &mut Ui| tooltip_ui(ui, &payload));
    }
}

fn axis_label(dates: &[String], value: f64) -> String {
    if value < 0.0 || value.fract() != 0.0 {
        return String::new();
    }
    dates
        .get(value as usize)
        .map(|d| format_date_label(d))
        .unwrap_or_default()
}

fn tooltip_ui(ui: &mut Ui, payload: &TooltipPayload) {
    ui.label(RichText::new(&payload.label).strong());
    ui.add_space(4.0);
    for line in &payload.lines {
        ui.horizontal(|ui: &mut Ui| {
            ui.label(RichText::new(format!("{}:", line.name)).color(line.color).strong());
            ui.label(RichText::new(line.value_text()).color(line.color));
            if let Some(change) = line.change_text() {
                ui.label(RichText::new(change).color(line.change_color()).small());
            }
        });
    }
    if payload.lines.is_empty() {
        ui.label(RichText::new("No series selected").italics());
    }
}
