use std::collections::HashSet;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord};

use super::error::LoadError;
use super::model::{CatalogEntry, Region, RegionalTable, Row, SeriesCatalog, TimeSeriesTable};

/// Name of the date column in the aggregated source.
pub const DATE_COLUMN: &str = "date";
/// Region label column in the wide source.
pub const REGION_COLUMN: &str = "RegionName";
/// State label column in the wide source.
pub const STATE_COLUMN: &str = "StateName";

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Fetch `resource` under `base` and parse it as the aggregated
/// `date, <series>…` table. Every call reads the file again.
pub fn load_table(base: &Path, resource: &str) -> Result<TimeSeriesTable, LoadError> {
    let text = fetch_text(base, resource)?;
    let table = parse_table(resource, &text)?;
    log::info!(
        "Loaded {resource}: {} rows, {} series",
        table.len(),
        table.catalog.len()
    );
    Ok(table)
}

/// Fetch `resource` under `base` and parse it as the wide
/// `RegionName, StateName, <date>…` table.
pub fn load_regional(base: &Path, resource: &str) -> Result<RegionalTable, LoadError> {
    let text = fetch_text(base, resource)?;
    let table = parse_regional(resource, &text)?;
    log::info!(
        "Loaded {resource}: {} regions, {} date columns",
        table.regions.len(),
        table.dates.len()
    );
    Ok(table)
}

/// Read a static resource relative to the data directory.
///
/// Only I/O failures are `Network` errors; a file that arrives but is not
/// UTF-8 is malformed input.
pub fn fetch_text(base: &Path, resource: &str) -> Result<String, LoadError> {
    let path = base.join(resource);
    let bytes = std::fs::read(&path).map_err(|source| LoadError::Network { path, source })?;
    String::from_utf8(bytes)
        .map_err(|e| LoadError::parse(resource, format!("invalid UTF-8: {}", e.utf8_error())))
}

// ---------------------------------------------------------------------------
// Aggregated source
// ---------------------------------------------------------------------------

/// Parse the aggregated CSV layout:
///
/// ```text
/// date,United States,CA,TX
/// 2024-01-01,"1,000",300,
/// ```
///
/// Rows without a date or with a single field are dropped. Later rows
/// repeating an already-seen date are dropped too.
pub fn parse_table(resource: &str, text: &str) -> Result<TimeSeriesTable, LoadError> {
    let mut reader = csv_reader(text);
    let headers = read_headers(resource, &mut reader)?;

    let date_idx = headers
        .iter()
        .position(|h| h == DATE_COLUMN)
        .ok_or_else(|| LoadError::parse(resource, "missing `date` column"))?;

    let catalog = SeriesCatalog::new(
        headers
            .iter()
            .enumerate()
            .filter(|(i, h)| *i != date_idx && !h.is_empty())
            .map(|(column, h)| CatalogEntry {
                name: h.clone(),
                column,
            })
            .collect(),
    );

    let mut rows: Vec<Row> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();

    for (row_no, result) in reader.records().enumerate() {
        let record = result.map_err(|e| LoadError::parse(resource, format!("row {row_no}: {e}")))?;

        if record.len() <= 1 {
            log::debug!("{resource}: dropping row {row_no} with a single field");
            continue;
        }
        let date = record.get(date_idx).map(str::trim).unwrap_or("");
        if date.is_empty() {
            log::debug!("{resource}: dropping row {row_no} without a date");
            continue;
        }
        if !seen.insert(date.to_string()) {
            log::warn!("{resource}: duplicate date {date} at row {row_no}, keeping the first");
            continue;
        }
        if let Some(prev) = rows.last() {
            if prev.date.as_str() > date {
                log::warn!("{resource}: date {date} at row {row_no} is out of order");
            }
        }

        let values = catalog
            .entries()
            .iter()
            .map(|e| (e.name.clone(), coerce_number(record.get(e.column))))
            .collect();
        rows.push(Row {
            date: date.to_string(),
            values,
        });
    }

    if rows.is_empty() {
        return Err(LoadError::empty(resource));
    }
    Ok(TimeSeriesTable { rows, catalog })
}

// ---------------------------------------------------------------------------
// Wide (regional) source
// ---------------------------------------------------------------------------

/// Parse the wide regional layout: one row per region, one column per
/// ISO date. Non-date columns other than the region/state labels are ignored.
pub fn parse_regional(resource: &str, text: &str) -> Result<RegionalTable, LoadError> {
    let mut reader = csv_reader(text);
    let headers = read_headers(resource, &mut reader)?;

    let region_idx = headers
        .iter()
        .position(|h| h == REGION_COLUMN)
        .ok_or_else(|| LoadError::parse(resource, "missing `RegionName` column"))?;
    let state_idx = headers.iter().position(|h| h == STATE_COLUMN);

    let date_cols: Vec<(usize, String)> = headers
        .iter()
        .enumerate()
        .filter(|(_, h)| is_iso_date(h))
        .map(|(i, h)| (i, h.clone()))
        .collect();
    if date_cols.is_empty() {
        return Err(LoadError::parse(resource, "no YYYY-MM-DD date columns"));
    }

    let mut regions = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.map_err(|e| LoadError::parse(resource, format!("row {row_no}: {e}")))?;

        let name = record.get(region_idx).map(str::trim).unwrap_or("");
        if name.is_empty() {
            log::debug!("{resource}: dropping row {row_no} without a region name");
            continue;
        }
        let state = state_idx
            .and_then(|i| record.get(i))
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        let values = date_cols
            .iter()
            .map(|(i, _)| coerce_number(record.get(*i)))
            .collect();

        regions.push(Region {
            name: name.to_string(),
            state,
            values,
        });
    }

    if regions.is_empty() {
        return Err(LoadError::empty(resource));
    }
    Ok(RegionalTable {
        dates: date_cols.into_iter().map(|(_, d)| d).collect(),
        regions,
    })
}

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

/// Coerce a raw CSV cell into a reading.
///
/// Comma grouping separators and surrounding whitespace are stripped.
/// Missing, empty and non-numeric cells become `None`; the result is never
/// NaN or infinite.
pub fn coerce_number(raw: Option<&str>) -> Option<f64> {
    let cleaned: String = raw?.chars().filter(|c| *c != ',').collect();
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// `^\d{4}-\d{2}-\d{2}$`
pub fn is_iso_date(s: &str) -> bool {
    let b = s.as_bytes();
    b.len() == 10
        && b.iter().enumerate().all(|(i, c)| match i {
            4 | 7 => *c == b'-',
            _ => c.is_ascii_digit(),
        })
}

fn csv_reader(text: &str) -> csv::Reader<&[u8]> {
    ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes())
}

/// Header names, trimmed (and stripped of a leading byte-order mark).
fn read_headers(resource: &str, reader: &mut csv::Reader<&[u8]>) -> Result<Vec<String>, LoadError> {
    let headers: StringRecord = reader
        .headers()
        .map_err(|e| LoadError::parse(resource, format!("reading header: {e}")))?
        .clone();
    if headers.is_empty() {
        return Err(LoadError::parse(resource, "missing header row"));
    }
    Ok(headers
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
        .collect())
}
