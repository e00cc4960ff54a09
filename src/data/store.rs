use super::filter::rows_in_range;
use super::model::{DateRange, Row, SeriesCatalog, TimeSeriesTable};

// ---------------------------------------------------------------------------
// TimeSeriesStore – read-only view over a loaded table
// ---------------------------------------------------------------------------

/// A loaded aggregated table plus its ordered date list.
///
/// Immutable after construction; a reload builds a new store.
#[derive(Debug, Clone)]
pub struct TimeSeriesStore {
    table: TimeSeriesTable,
    dates: Vec<String>,
}

impl TimeSeriesStore {
    pub fn new(table: TimeSeriesTable) -> Self {
        let dates = table.rows.iter().map(|r| r.date.clone()).collect();
        Self { table, dates }
    }

    pub fn catalog(&self) -> &SeriesCatalog {
        &self.table.catalog
    }

    pub(crate) fn len(&self) -> usize {
        self.table.rows.len()
    }

    /// The full span `(first.date, last.date)`; the default range on load.
    pub fn full_range(&self) -> DateRange {
        match (self.dates.first(), self.dates.last()) {
            (Some(first), Some(last)) => DateRange::new(first.clone(), last.clone()),
            _ => DateRange::default(),
        }
    }

    pub fn dates_in_range(&self, range: &DateRange) -> Vec<&Row> {
        rows_in_range(&self.table.rows, range)
    }

    pub fn row_at(&self, date: &str) -> Option<&Row> {
        self.table.rows.iter().find(|r| r.date == date)
    }

    pub fn latest_date_in_range(&self, range: &DateRange) -> Option<&str> {
        self.dates_in_range(range)
            .last()
            .map(|row| row.date.as_str())
    }

    pub fn index_of(&self, date: &str) -> Option<usize> {
        self.dates.iter().position(|d| d == date)
    }

    /// Map a slider position pair onto a range of known dates.
    ///
    /// Indices are clamped to the date list and swapped if reversed, so the
    /// result always satisfies `start <= end`.
    pub fn range_from_indices(&self, a: usize, b: usize) -> Option<DateRange> {
        let last = self.dates.len().checked_sub(1)?;
        let (lo, hi) = (a.min(b).min(last), a.max(b).min(last));
        Some(DateRange::new(self.dates[lo].clone(), self.dates[hi].clone()))
    }

    /// The in-range row immediately preceding `date`, used as the baseline
    /// for period-over-period change. `None` for the first row of the range.
    pub fn previous_row(&self, date: &str, range: &DateRange) -> Option<&Row> {
        let rows = self.dates_in_range(range);
        let pos = rows.iter().position(|r| r.date == date)?;
        pos.checked_sub(1).map(|p| rows[p])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixtures::scenario_store;

    #[test]
    fn full_range_spans_table() {
        let store = scenario_store();
        assert_eq!(store.full_range(), DateRange::new("2024-01-01", "2024-01-15"));
        assert_eq!(store.dates_in_range(&store.full_range()).len(), 3);
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn latest_date_in_range() {
        let store = scenario_store();
        let range = DateRange::new("2024-01-01", "2024-01-10");
        assert_eq!(store.latest_date_in_range(&range), Some("2024-01-08"));
        let before = DateRange::new("2023-01-01", "2023-12-31");
        assert_eq!(store.latest_date_in_range(&before), None);
    }

    #[test]
    fn row_lookup() {
        let store = scenario_store();
        assert_eq!(store.row_at("2024-01-08").and_then(|r| r.get("CA")), Some(33.0));
        assert!(store.row_at("2024-01-09").is_none());
        assert_eq!(store.index_of("2024-01-15"), Some(2));
    }

    #[test]
    fn slider_indices_are_clamped_and_ordered() {
        let store = scenario_store();
        assert_eq!(
            store.range_from_indices(2, 0),
            Some(DateRange::new("2024-01-01", "2024-01-15"))
        );
        assert_eq!(
            store.range_from_indices(1, 99),
            Some(DateRange::new("2024-01-08", "2024-01-15"))
        );
    }

    #[test]
    fn previous_row_respects_range() {
        let store = scenario_store();
        let full = store.full_range();
        assert_eq!(
            store.previous_row("2024-01-08", &full).map(|r| r.date.as_str()),
            Some("2024-01-01")
        );
        let narrow = DateRange::new("2024-01-08", "2024-01-15");
        assert!(store.previous_row("2024-01-08", &narrow).is_none());
    }
}
