use super::model::{DateRange, Row};

// ---------------------------------------------------------------------------
// Date-range predicate
// ---------------------------------------------------------------------------

/// Rows whose date lies inside `range` (inclusive on both ends), in their
/// original order.
pub fn rows_in_range<'a>(rows: &'a [Row], range: &DateRange) -> Vec<&'a Row> {
    rows.iter().filter(|row| range.contains(&row.date)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn rows(dates: &[&str]) -> Vec<Row> {
        dates
            .iter()
            .map(|d| Row {
                date: d.to_string(),
                values: vec![("CA".into(), Some(1.0))],
            })
            .collect()
    }

    #[test]
    fn inclusive_bounds() {
        let rows = rows(&["2024-01-01", "2024-01-08", "2024-01-15", "2024-01-22"]);
        let range = DateRange::new("2024-01-08", "2024-01-15");
        let hit: Vec<&str> = rows_in_range(&rows, &range)
            .iter()
            .map(|r| r.date.as_str())
            .collect();
        assert_eq!(hit, vec!["2024-01-08", "2024-01-15"]);
    }

    #[test]
    fn bounds_need_not_be_known_dates() {
        let rows = rows(&["2024-01-01", "2024-01-08"]);
        let range = DateRange::new("2024-01-02", "2024-12-31");
        assert_eq!(dates_of(&rows_in_range(&rows, &range)), vec!["2024-01-08"]);
    }

    fn dates_of(rows: &[&Row]) -> Vec<String> {
        rows.iter().map(|r| r.date.clone()).collect()
    }

    fn day(i: u32) -> String {
        format!("2024-{:02}-{:02}", 1 + i / 28, 1 + i % 28)
    }

    proptest! {
        #[test]
        fn widening_never_drops_rows(
            n in 1u32..60,
            a in 0u32..60, b in 0u32..60,
            widen_lo in 0u32..10, widen_hi in 0u32..10,
        ) {
            let dates: Vec<String> = (0..n).map(day).collect();
            let table: Vec<Row> = rows(&dates.iter().map(String::as_str).collect::<Vec<_>>());

            let (lo, hi) = (a.min(b), a.max(b));
            let narrow = DateRange::new(day(lo), day(hi));
            let wide = DateRange::new(
                day(lo.saturating_sub(widen_lo)),
                day((hi + widen_hi).min(59)),
            );

            let narrow_hits = dates_of(&rows_in_range(&table, &narrow));
            let wide_hits = dates_of(&rows_in_range(&table, &wide));
            for d in &narrow_hits {
                prop_assert!(wide_hits.contains(d));
            }
            prop_assert_eq!(dates_of(&rows_in_range(&table, &narrow)), narrow_hits);
        }
    }
}
