use std::cmp::Ordering;

use chrono::NaiveDate;
use eframe::egui::Color32;

use crate::color::{trend_color, SeriesPalette};
use crate::data::model::{DateRange, Row, SeriesCatalog};
use crate::data::store::TimeSeriesStore;

// ---------------------------------------------------------------------------
// Series ordering
// ---------------------------------------------------------------------------

/// Display order of the series list: the aggregate first, then the
/// selection in the order it was built, then everything else alphabetically.
///
/// Only catalog members are returned, each exactly once.
pub fn series_order(aggregate: &str, selection: &[String], catalog: &SeriesCatalog) -> Vec<String> {
    let mut order = Vec::with_capacity(catalog.len());
    if catalog.contains(aggregate) {
        order.push(aggregate.to_string());
    }
    for name in selection {
        if name != aggregate && catalog.contains(name) && !order.contains(name) {
            order.push(name.clone());
        }
    }
    let mut rest: Vec<String> = catalog
        .names()
        .filter(|n| *n != aggregate && !selection.iter().any(|s| s == n))
        .map(str::to_string)
        .collect();
    rest.sort_by(|a, b| locale_cmp(a, b));
    order.extend(rest);
    order
}

/// Case-insensitive comparison, ties broken by the raw strings so the
/// ordering stays total.
pub fn locale_cmp(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

// ---------------------------------------------------------------------------
// Period-over-period change
// ---------------------------------------------------------------------------

/// Percent change from `previous` to `current`.
///
/// A zero baseline is a defined case: `0 → 0` is `0`, `0 → x` is `100`
/// whatever the sign of `x`.
pub fn percent_change(current: Option<f64>, previous: Option<f64>) -> Option<f64> {
    let (current, previous) = (current?, previous?);
    if previous == 0.0 {
        return Some(if current == 0.0 { 0.0 } else { 100.0 });
    }
    Some((current - previous) / previous.abs() * 100.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    Positive,
    Negative,
    Neutral,
}

impl Trend {
    pub fn classify(change: Option<f64>) -> Self {
        match change {
            Some(c) if c > 0.0 => Trend::Positive,
            Some(c) if c < 0.0 => Trend::Negative,
            _ => Trend::Neutral,
        }
    }
}

// ---------------------------------------------------------------------------
// Label formatting
// ---------------------------------------------------------------------------

/// `2024-01-08` → `Jan 8, 2024`. Unparseable dates are shown verbatim.
pub fn format_date_label(date: &str) -> String {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map(|d| d.format("%b %-d, %Y").to_string())
        .unwrap_or_else(|_| date.to_string())
}

/// Thousands-grouped number with at most three decimals: `12345.5` → `12,345.5`.
pub fn format_value(value: f64) -> String {
    let rounded = format!("{:.3}", value.abs());
    let (int_part, frac_part) = rounded.split_once('.').unwrap_or((&rounded, ""));
    let frac_part = frac_part.trim_end_matches('0');

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    let sign = if value < 0.0 && (int_part != "0" || !frac_part.is_empty()) {
        "-"
    } else {
        ""
    };
    if frac_part.is_empty() {
        format!("{sign}{grouped}")
    } else {
        format!("{sign}{grouped}.{frac_part}")
    }
}

/// `10.0` → `+10.00%`, `-2.5` → `-2.50%`.
pub fn format_percent(change: f64) -> String {
    if change > 0.0 {
        format!("+{change:.2}%")
    } else {
        format!("{change:.2}%")
    }
}

// ---------------------------------------------------------------------------
// Tooltip payload
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct TooltipLine {
    pub name: String,
    pub value: Option<f64>,
    pub change: Option<f64>,
    pub trend: Trend,
    pub color: Color32,
}

impl TooltipLine {
    pub fn value_text(&self) -> String {
        self.value.map(format_value).unwrap_or_else(|| "—".to_string())
    }

    pub fn change_text(&self) -> Option<String> {
        self.change.map(format_percent)
    }

    pub fn change_color(&self) -> Color32 {
        trend_color(self.trend)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TooltipPayload {
    pub date: String,
    pub label: String,
    pub lines: Vec<TooltipLine>,
}

/// What the tooltip shows when hovering `hovered_date` with `range` active.
///
/// The baseline for the change is the previous row *inside the range*, so
/// the first visible point never shows a change. Returns `None` when the
/// date is not visible.
pub fn tooltip(
    store: &TimeSeriesStore,
    range: &DateRange,
    hovered_date: &str,
    selection: &[String],
    palette: &SeriesPalette,
) -> Option<TooltipPayload> {
    if !range.contains(hovered_date) {
        return None;
    }
    let row = store.row_at(hovered_date)?;
    let previous = store.previous_row(hovered_date, range);

    let lines = selection
        .iter()
        .enumerate()
        .filter(|(_, name)| row.has_series(name))
        .map(|(i, name)| {
            let value = row.get(name);
            let change = previous.and_then(|prev| percent_change(value, prev.get(name)));
            TooltipLine {
                name: name.clone(),
                value,
                change,
                trend: Trend::classify(change),
                color: palette.color_at(i),
            }
        })
        .collect();

    Some(TooltipPayload {
        date: hovered_date.to_string(),
        label: format_date_label(hovered_date),
        lines,
    })
}

// ---------------------------------------------------------------------------
// Plot geometry
// ---------------------------------------------------------------------------

/// Split a series into contiguous runs of readings; `x` is the row's index
/// in `rows`. Missing readings end a run, so the chart draws a gap.
pub fn line_segments(rows: &[&Row], series: &str) -> Vec<Vec<[f64; 2]>> {
    let mut segments = Vec::new();
    let mut current: Vec<[f64; 2]> = Vec::new();
    for (i, row) in rows.iter().enumerate() {
        match row.get(series) {
            Some(v) => current.push([i as f64, v]),
            None => {
                if !current.is_empty() {
                    segments.push(std::mem::take(&mut current));
                }
            }
        }
    }
    if !current.is_empty() {
        segments.push(current);
    }
    segments
}

/// Label every n-th date on the x-axis, denser on wider viewports.
pub fn tick_interval(points: usize, viewport_width: f32) -> usize {
    let divisor = if viewport_width < 600.0 {
        6
    } else if viewport_width < 900.0 {
        12
    } else {
        20
    };
    points.div_ceil(divisor).max(1)
}
