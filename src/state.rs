use std::collections::HashSet;

use crate::chart::{format_date_label, series_order};
use crate::color::SeriesPalette;
use crate::config::AppConfig;
use crate::data::error::LoadError;
use crate::data::model::{DateRange, RankedEntry, RegionalTable, Row, TimeSeriesTable};
use crate::data::ranking::{top_k, top_k_names};
use crate::data::store::TimeSeriesStore;

// ---------------------------------------------------------------------------
// Selection toggle
// ---------------------------------------------------------------------------

/// Remove `name` if selected (keeping the order of the rest), otherwise
/// append it. Toggling an unselected name twice restores the selection
/// exactly; toggling a selected name twice moves it to the end.
pub fn toggle(selection: &[String], name: &str) -> Vec<String> {
    if selection.iter().any(|s| s == name) {
        selection.iter().filter(|s| *s != name).cloned().collect()
    } else {
        let mut next = selection.to_vec();
        next.push(name.to_string());
        next
    }
}

// ---------------------------------------------------------------------------
// Summary panel state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct RankedRegion {
    pub entry: RankedEntry,
    pub state: Option<String>,
}

/// Rankings shown next to the chart, one list per source.
#[derive(Debug, Default)]
pub struct SummaryState {
    pub regional: Option<RegionalTable>,
    pub regional_error: Option<String>,
    pub regional_loading: bool,

    pub top_regions: Vec<RankedRegion>,
    pub regions_as_of: Option<String>,
    pub top_states: Vec<RankedEntry>,
    pub states_as_of: Option<String>,
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: AppConfig,

    /// Aggregated source (None until loaded, or after a failed load).
    pub store: Option<TimeSeriesStore>,
    pub load_error: Option<String>,
    pub loading: bool,

    /// Active date window; always made of known dates once a table is loaded.
    pub range: DateRange,

    /// Series drawn on the chart, in the order they were picked.
    pub selection: Vec<String>,
    /// False once the user toggled something since the last default reset.
    pub selection_is_default: bool,

    pub summary: SummaryState,
    pub palette: SeriesPalette,

    /// Status / error message shown in the top bar.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            store: None,
            load_error: None,
            loading: false,
            range: DateRange::default(),
            selection: Vec::new(),
            selection_is_default: true,
            summary: SummaryState::default(),
            palette: SeriesPalette::default(),
            status_message: None,
        }
    }

    fn excluded(&self) -> HashSet<String> {
        HashSet::from([self.config.aggregate_series.clone()])
    }

    // -- load results --

    /// Ingest a newly loaded aggregated table: full range, default
    /// selection, fresh state ranking.
    pub fn set_table(&mut self, table: TimeSeriesTable) {
        let store = TimeSeriesStore::new(table);
        self.range = store.full_range();
        self.store = Some(store);
        self.load_error = None;
        self.loading = false;
        self.reset_default_selection();
        self.recompute_summary();
    }

    /// A failed aggregated load clears the chart; the regional ranking
    /// keeps working on its own source.
    pub fn set_load_error(&mut self, err: &LoadError) {
        log::error!("Failed to load aggregated data: {err}");
        self.store = None;
        self.selection.clear();
        self.load_error = Some(err.to_string());
        self.loading = false;
        self.recompute_summary();
    }

    pub fn set_regional(&mut self, table: RegionalTable) {
        self.summary.regional = Some(table);
        self.summary.regional_error = None;
        self.summary.regional_loading = false;
        self.recompute_summary();
    }

    pub fn set_regional_error(&mut self, err: &LoadError) {
        log::error!("Failed to load regional data: {err}");
        self.summary.regional = None;
        self.summary.regional_error = Some(err.to_string());
        self.summary.regional_loading = false;
        self.recompute_summary();
    }

    // -- range --

    /// Change the date window. Any change resets the selection to the
    /// top-K of the new window and recomputes both rankings.
    pub fn set_range(&mut self, range: DateRange) {
        if range == self.range {
            return;
        }
        self.range = range;
        self.reset_default_selection();
        self.recompute_summary();
    }

    /// Slider entry point: a pair of positions in the date list.
    pub fn set_range_indices(&mut self, start: usize, end: usize) {
        let range = self
            .store
            .as_ref()
            .and_then(|s| s.range_from_indices(start, end));
        if let Some(range) = range {
            self.set_range(range);
        }
    }

    /// Slider positions of the current range.
    pub fn range_indices(&self) -> Option<(usize, usize)> {
        let store = self.store.as_ref()?;
        Some((store.index_of(&self.range.start)?, store.index_of(&self.range.end)?))
    }

    // -- selection --

    pub fn toggle_series(&mut self, name: &str) {
        self.selection = toggle(&self.selection, name);
        self.selection_is_default = false;
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
        self.selection_is_default = false;
    }

    /// Caption for the series list while the selection is still the
    /// automatic top-K; `None` once the user edited it.
    pub fn selection_caption(&self) -> Option<String> {
        if !self.selection_is_default {
            return None;
        }
        let date = self.latest_row()?.date.as_str();
        Some(format!(
            "Top {} as of {}",
            self.config.top_k,
            format_date_label(date)
        ))
    }

    pub fn is_selected(&self, name: &str) -> bool {
        self.selection.iter().any(|s| s == name)
    }

    /// Selection := top-K (aggregate excluded) of the latest in-range row.
    pub fn reset_default_selection(&mut self) {
        let k = self.config.top_k;
        let excluded = self.excluded();
        self.selection = self
            .latest_row()
            .map(|row| top_k_names(row, &excluded, k))
            .unwrap_or_default();
        self.selection_is_default = true;
        log::debug!("Default selection for {}: {:?}", self.range, self.selection);
    }

    /// Checkbox list order: aggregate, selection, rest alphabetically.
    pub fn series_order(&self) -> Vec<String> {
        match &self.store {
            Some(store) => series_order(
                &self.config.aggregate_series,
                &self.selection,
                store.catalog(),
            ),
            None => Vec::new(),
        }
    }

    pub fn visible_rows(&self) -> Vec<&Row> {
        self.store
            .as_ref()
            .map(|s| s.dates_in_range(&self.range))
            .unwrap_or_default()
    }

    fn latest_row(&self) -> Option<&Row> {
        let store = self.store.as_ref()?;
        let date = store.latest_date_in_range(&self.range)?;
        store.row_at(date)
    }

    // -- summary --

    /// Rank both sources at their most recent date inside the range,
    /// independently of the chart selection.
    pub fn recompute_summary(&mut self) {
        let k = self.config.top_k;
        let excluded = self.excluded();

        let states = self.latest_row().map(|row| (row.date.clone(), top_k(row, &excluded, k)));
        match states {
            Some((date, top)) => {
                self.summary.states_as_of = Some(date);
                self.summary.top_states = top;
            }
            None => {
                self.summary.states_as_of = None;
                self.summary.top_states.clear();
            }
        }

        let range = self.store.as_ref().map(|_| &self.range);
        let regions = self.summary.regional.as_ref().and_then(|table| {
            // Without a chart range the regional source falls back to its own latest date.
            let date = match range {
                Some(range) => table.latest_date_in_range(range)?,
                None => table.dates.last()?.as_str(),
            };
            let row = table.snapshot(date)?;
            let top = top_k(&row, &excluded, k)
                .into_iter()
                .map(|entry| RankedRegion {
                    state: table.state_of(&entry.name).map(str::to_string),
                    entry,
                })
                .collect();
            Some((date.to_string(), top))
        });
        match regions {
            Some((date, top)) => {
                self.summary.regions_as_of = Some(date);
                self.summary.top_regions = top;
            }
            None => {
                self.summary.regions_as_of = None;
                self.summary.top_regions.clear();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::{parse_regional, parse_table};
    use proptest::prelude::*;

    const AGGREGATED: &str = "\
date,United States,CA,TX,NY
2024-01-01,100,30,20,25
2024-01-08,110,33,18,35
";

    const REGIONAL: &str = "\
RegionName,StateName,2024-01-01,2024-01-08
United States,,\"1,000\",\"1,100\"
\"Los Angeles, CA\",CA,40,42
\"Houston, TX\",TX,50,41
\"New York, NY\",NY,,60
";

    fn names(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    fn loaded(k: usize) -> AppState {
        let mut state = AppState::new(AppConfig {
            top_k: k,
            ..AppConfig::default()
        });
        state.set_table(parse_table("agg.csv", AGGREGATED).unwrap());
        state.set_regional(parse_regional("wide.csv", REGIONAL).unwrap());
        state
    }

    #[test]
    fn load_defaults_to_full_range_and_top_k() {
        let state = loaded(2);
        assert_eq!(state.range, DateRange::new("2024-01-01", "2024-01-08"));
        assert_eq!(state.selection, names(&["NY", "CA"]));
        assert!(state.selection_is_default);
        assert_eq!(
            state.series_order(),
            names(&["United States", "NY", "CA", "TX"])
        );
    }

    #[test]
    fn summary_ranks_both_sources_without_aggregate() {
        let state = loaded(2);
        assert_eq!(state.summary.states_as_of.as_deref(), Some("2024-01-08"));
        assert_eq!(
            state.summary.top_states,
            vec![
                RankedEntry { name: "NY".into(), value: 35.0 },
                RankedEntry { name: "CA".into(), value: 33.0 },
            ]
        );
        assert_eq!(state.summary.regions_as_of.as_deref(), Some("2024-01-08"));
        let regions: Vec<&str> = state
            .summary
            .top_regions
            .iter()
            .map(|r| r.entry.name.as_str())
            .collect();
        assert_eq!(regions, vec!["New York, NY", "Los Angeles, CA"]);
        assert_eq!(state.summary.top_regions[0].state.as_deref(), Some("NY"));
    }

    #[test]
    fn range_change_resets_manual_selection() {
        let mut state = loaded(2);
        state.toggle_series("TX");
        assert_eq!(state.selection, names(&["NY", "CA", "TX"]));
        assert!(!state.selection_is_default);

        state.set_range_indices(0, 0);
        assert_eq!(state.range, DateRange::new("2024-01-01", "2024-01-01"));
        assert_eq!(state.selection, names(&["CA", "NY"]));
        assert!(state.selection_is_default);
        assert_eq!(state.summary.states_as_of.as_deref(), Some("2024-01-01"));
        assert_eq!(state.summary.top_regions[0].entry.name, "Houston, TX");
        assert_eq!(state.range_indices(), Some((0, 0)));
    }

    #[test]
    fn caption_follows_default_selection() {
        let mut state = loaded(2);
        assert_eq!(
            state.selection_caption().as_deref(),
            Some("Top 2 as of Jan 8, 2024")
        );

        state.toggle_series("TX");
        assert_eq!(state.selection_caption(), None);

        state.reset_default_selection();
        assert!(state.selection_caption().is_some());

        state.clear_selection();
        assert!(state.selection.is_empty());
        assert_eq!(state.selection_caption(), None);
    }

    #[test]
    fn unchanged_range_keeps_manual_selection() {
        let mut state = loaded(2);
        state.toggle_series("NY");
        let range = state.range.clone();
        state.set_range(range);
        assert_eq!(state.selection, names(&["CA"]));
    }

    #[test]
    fn aggregate_failure_leaves_regions_working() {
        let mut state = AppState::new(AppConfig::default());
        state.set_regional(parse_regional("wide.csv", REGIONAL).unwrap());
        state.set_load_error(&LoadError::empty("agg.csv"));
        assert!(state.store.is_none());
        assert!(state.load_error.is_some());
        assert!(state.summary.top_states.is_empty());
        assert_eq!(state.summary.regions_as_of.as_deref(), Some("2024-01-08"));
        assert_eq!(state.summary.top_regions[0].entry.name, "New York, NY");
        assert!(state.summary.regional_error.is_none());
    }

    #[test]
    fn regional_failure_leaves_chart_working() {
        let mut state = AppState::new(AppConfig::default());
        state.set_table(parse_table("agg.csv", AGGREGATED).unwrap());
        state.set_regional_error(&LoadError::parse("wide.csv", "bad"));
        assert!(state.store.is_some());
        assert!(!state.selection.is_empty());
        assert!(state.summary.top_regions.is_empty());
        assert_eq!(state.summary.top_states.len(), 3);
    }

    #[test]
    fn toggle_appends_and_removes() {
        let sel = names(&["A", "B", "C"]);
        assert_eq!(toggle(&sel, "B"), names(&["A", "C"]));
        assert_eq!(toggle(&sel, "D"), names(&["A", "B", "C", "D"]));
    }

    proptest! {
        #[test]
        fn toggle_is_self_inverse(
            picks in proptest::collection::hash_set("[A-E]", 0..5),
            name in "[A-G]",
        ) {
            let sel: Vec<String> = picks.into_iter().collect();
            let twice = toggle(&toggle(&sel, &name), &name);
            if sel.contains(&name) {
                // Removing then re-adding moves the name to the end.
                let mut expected: Vec<String> =
                    sel.iter().filter(|s| **s != name).cloned().collect();
                expected.push(name.clone());
                prop_assert_eq!(twice, expected);
            } else {
                prop_assert_eq!(twice, sel);
            }
        }
    }
}
