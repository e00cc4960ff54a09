use std::fmt;

// ---------------------------------------------------------------------------
// Row – one snapshot of every series at a single date
// ---------------------------------------------------------------------------

/// A single snapshot: the reading of every series at `date`.
///
/// `values` keeps the catalog's column order, which is the natural order
/// used to break ranking ties. `None` means "no data", distinct from a
/// measured zero.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    /// ISO `YYYY-MM-DD` date; doubles as the sort key.
    pub date: String,
    pub values: Vec<(String, Option<f64>)>,
}

impl Row {
    /// Reading of `series` at this date. Unknown series and missing
    /// readings both yield `None`.
    pub fn get(&self, series: &str) -> Option<f64> {
        self.values
            .iter()
            .find(|(name, _)| name == series)
            .and_then(|(_, v)| *v)
    }

    /// Whether `series` is one of this row's keys (regardless of value).
    pub fn has_series(&self, series: &str) -> bool {
        self.values.iter().any(|(name, _)| name == series)
    }
}

// ---------------------------------------------------------------------------
// SeriesCatalog – series names discovered from a table header
// ---------------------------------------------------------------------------

/// A catalog entry: trimmed series name plus the CSV column it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub name: String,
    pub column: usize,
}

/// Ordered set of series names of a table, in header order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeriesCatalog {
    entries: Vec<CatalogEntry>,
}

impl SeriesCatalog {
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|e| e.name == name)
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}

// ---------------------------------------------------------------------------
// TimeSeriesTable – the aggregated (long) source
// ---------------------------------------------------------------------------

/// Rows sorted ascending by date, every row keyed by the same catalog.
#[derive(Debug, Clone)]
pub struct TimeSeriesTable {
    pub rows: Vec<Row>,
    pub catalog: SeriesCatalog,
}

impl TimeSeriesTable {
    pub(crate) fn len(&self) -> usize {
        self.rows.len()
    }
}

// ---------------------------------------------------------------------------
// DateRange
// ---------------------------------------------------------------------------

/// Inclusive date window. ISO dates compare correctly as strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DateRange {
    pub start: String,
    pub end: String,
}

impl DateRange {
    /// Build a range, swapping the bounds if they arrive reversed.
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        let (start, end) = (start.into(), end.into());
        if start <= end {
            Self { start, end }
        } else {
            Self {
                start: end,
                end: start,
            }
        }
    }

    pub fn contains(&self, date: &str) -> bool {
        self.start.as_str() <= date && date <= self.end.as_str()
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} – {}", self.start, self.end)
    }
}

// ---------------------------------------------------------------------------
// RankedEntry
// ---------------------------------------------------------------------------

/// A series and the reading it was ranked by.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedEntry {
    pub name: String,
    pub value: f64,
}

// ---------------------------------------------------------------------------
// RegionalTable – the wide (one column per date) source
// ---------------------------------------------------------------------------

/// One region of the wide source with its reading per date column.
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    pub name: String,
    pub state: Option<String>,
    /// Aligned with [`RegionalTable::dates`].
    pub values: Vec<Option<f64>>,
}

/// The wide source: regions as rows, dates as columns.
#[derive(Debug, Clone)]
pub struct RegionalTable {
    /// Date columns in header order.
    pub dates: Vec<String>,
    pub regions: Vec<Region>,
}

impl RegionalTable {
    /// Pivot one date column into a [`Row`] keyed by region name, in file
    /// order, so it can be ranked like any other snapshot.
    pub fn snapshot(&self, date: &str) -> Option<Row> {
        let idx = self.dates.iter().position(|d| d == date)?;
        let values = self
            .regions
            .iter()
            .map(|r| (r.name.clone(), r.values.get(idx).copied().flatten()))
            .collect();
        Some(Row {
            date: date.to_string(),
            values,
        })
    }

    /// Last date column falling inside `range`.
    pub fn latest_date_in_range(&self, range: &DateRange) -> Option<&str> {
        self.dates
            .iter()
            .rev()
            .find(|d| range.contains(d))
            .map(String::as_str)
    }

    pub fn state_of(&self, region: &str) -> Option<&str> {
        self.regions
            .iter()
            .find(|r| r.name == region)
            .and_then(|r| r.state.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> Row {
        Row {
            date: "2024-01-08".into(),
            values: vec![
                ("United States".into(), Some(110.0)),
                ("CA".into(), None),
                ("TX".into(), Some(0.0)),
            ],
        }
    }

    #[test]
    fn row_distinguishes_null_from_zero() {
        let r = row();
        assert_eq!(r.get("CA"), None);
        assert_eq!(r.get("TX"), Some(0.0));
        assert!(r.has_series("CA"));
        assert!(!r.has_series("NY"));
    }

    #[test]
    fn date_range_normalises_reversed_bounds() {
        let range = DateRange::new("2024-02-01", "2024-01-01");
        assert_eq!(range.start, "2024-01-01");
        assert_eq!(range.end, "2024-02-01");
        assert!(range.contains("2024-01-15"));
        assert!(range.contains("2024-02-01"));
        assert!(!range.contains("2024-02-02"));
    }

    #[test]
    fn regional_snapshot_pivots_date_column() {
        let table = RegionalTable {
            dates: vec!["2024-01-01".into(), "2024-01-08".into()],
            regions: vec![
                Region {
                    name: "Austin, TX".into(),
                    state: Some("TX".into()),
                    values: vec![Some(10.0), Some(12.0)],
                },
                Region {
                    name: "Fresno, CA".into(),
                    state: Some("CA".into()),
                    values: vec![Some(4.0), None],
                },
            ],
        };
        let snap = table.snapshot("2024-01-08").unwrap();
        assert_eq!(snap.get("Austin, TX"), Some(12.0));
        assert_eq!(snap.get("Fresno, CA"), None);
        assert!(table.snapshot("2023-12-25").is_none());
        assert_eq!(table.state_of("Fresno, CA"), Some("CA"));

        let range = DateRange::new("2023-01-01", "2024-01-05");
        assert_eq!(table.latest_date_in_range(&range), Some("2024-01-01"));
        let empty = DateRange::new("2025-01-01", "2025-02-01");
        assert_eq!(table.latest_date_in_range(&empty), None);
    }
}
