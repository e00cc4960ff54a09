use std::str::FromStr;

use eframe::egui::Color32;
use palette::Srgb;

use crate::chart::Trend;

// ---------------------------------------------------------------------------
// Fixed series palette
// ---------------------------------------------------------------------------

/// Line colours, picked cyclically by a series' position in the selection.
/// Long enough that every state can be selected without repeats.
pub const SERIES_COLORS: [&str; 25] = [
    "#8884d8", "#82ca9d", "#ffc658", "#ff7300", "#ff0000",
    "#00ff00", "#0000ff", "#ffff00", "#ff00ff", "#00ffff",
    "#800080", "#008000", "#000080", "#800000", "#808000",
    "#ff6b6b", "#4ecdc4", "#45b7d1", "#96ceb4", "#feca57",
    "#ff9ff3", "#54a0ff", "#5f27cd", "#00d2d3", "#ff9f43",
];

/// Parse `#rrggbb`; unparseable input falls back to grey.
pub fn hex_to_color32(hex: &str) -> Color32 {
    match Srgb::<u8>::from_str(hex) {
        Ok(rgb) => Color32::from_rgb(rgb.red, rgb.green, rgb.blue),
        Err(e) => {
            log::warn!("Invalid palette colour {hex:?}: {e}");
            Color32::GRAY
        }
    }
}

// ---------------------------------------------------------------------------
// Colour assignment: selection position → Color32
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct SeriesPalette {
    colors: Vec<Color32>,
}

impl Default for SeriesPalette {
    fn default() -> Self {
        Self {
            colors: SERIES_COLORS.iter().map(|h| hex_to_color32(h)).collect(),
        }
    }
}

impl SeriesPalette {
    /// Colour of the `index`-th selected series.
    pub fn color_at(&self, index: usize) -> Color32 {
        if self.colors.is_empty() {
            return Color32::GRAY;
        }
        self.colors[index % self.colors.len()]
    }

    /// Colour of `name` given the current selection order, or `None` if the
    /// series is not selected. Reordering the selection reassigns colours.
    pub fn color_for(&self, selection: &[String], name: &str) -> Option<Color32> {
        selection
            .iter()
            .position(|s| s == name)
            .map(|i| self.color_at(i))
    }
}

// ---------------------------------------------------------------------------
// Tooltip trend colours
// ---------------------------------------------------------------------------

pub fn trend_color(trend: Trend) -> Color32 {
    match trend {
        Trend::Positive => Color32::from_rgb(0, 128, 0),
        Trend::Negative => Color32::from_rgb(255, 0, 0),
        Trend::Neutral => Color32::from_rgb(0x88, 0x88, 0x88),
    }
}
