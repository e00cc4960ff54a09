use std::cmp::Ordering;
use std::collections::HashSet;

use super::model::{RankedEntry, Row};

/// Default number of entries in a ranking.
pub const DEFAULT_TOP_K: usize = 5;

/// The `k` largest series of a snapshot, descending.
///
/// Missing readings rank as `0` (the entry still reports `0.0`). Names in
/// `excluded` are skipped. The sort is stable over the row's series order,
/// so equal values keep their catalog order and repeated calls agree.
pub fn top_k(row: &Row, excluded: &HashSet<String>, k: usize) -> Vec<RankedEntry> {
    let mut entries: Vec<RankedEntry> = row
        .values
        .iter()
        .filter(|(name, _)| !excluded.contains(name))
        .map(|(name, value)| RankedEntry {
            name: name.clone(),
            value: value.unwrap_or(0.0),
        })
        .collect();

    // Values are finite, so only signed zeros need care: -0 ties with 0.
    entries.sort_by(|a, b| b.value.partial_cmp(&a.value).unwrap_or(Ordering::Equal));
    entries.truncate(k);
    entries
}

/// Names only, for seeding a selection.
pub fn top_k_names(row: &Row, excluded: &HashSet<String>, k: usize) -> Vec<String> {
    top_k(row, excluded, k).into_iter().map(|e| e.name).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixtures::scenario_store;
    use crate::data::loader::coerce_number;
    use proptest::prelude::*;

    fn excluded(names: &[&str]) -> HashSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn ranks_latest_snapshot_without_aggregate() {
        let store = scenario_store();
        let row = store.row_at("2024-01-08").unwrap();
        let top = top_k(row, &excluded(&["US"]), 2);
        assert_eq!(
            top,
            vec![
                RankedEntry { name: "CA".into(), value: 33.0 },
                RankedEntry { name: "TX".into(), value: 18.0 },
            ]
        );
    }

    #[test]
    fn null_ranks_as_zero() {
        let store = scenario_store();
        let row = store.row_at("2024-01-15").unwrap();
        let top = top_k(row, &excluded(&["US"]), 5);
        assert_eq!(top[0].name, "TX");
        assert_eq!(top[1], RankedEntry { name: "CA".into(), value: 0.0 });
    }

    #[test]
    fn ties_keep_catalog_order() {
        let row = Row {
            date: "2024-01-01".into(),
            values: vec![
                ("B".into(), Some(5.0)),
                ("A".into(), Some(5.0)),
                ("C".into(), Some(7.0)),
                ("D".into(), None),
                ("E".into(), Some(0.0)),
            ],
        };
        let names = top_k_names(&row, &HashSet::new(), 10);
        assert_eq!(names, vec!["C", "B", "A", "D", "E"]);
    }

    #[test]
    fn negative_zero_ties_with_null() {
        let row = Row {
            date: "2024-01-01".into(),
            values: vec![
                ("A".into(), coerce_number(Some("-0"))),
                ("B".into(), None),
                ("C".into(), Some(0.0)),
            ],
        };
        assert_eq!(top_k_names(&row, &HashSet::new(), 3), vec!["A", "B", "C"]);
    }

    #[test]
    fn k_larger_than_catalog() {
        let store = scenario_store();
        let row = store.row_at("2024-01-01").unwrap();
        assert_eq!(top_k(row, &HashSet::new(), 99).len(), 3);
        assert!(top_k(row, &HashSet::new(), 0).is_empty());
    }

    proptest! {
        #[test]
        fn deterministic_and_descending(
            values in proptest::collection::vec(proptest::option::of(0u32..50), 0..20),
            k in 0usize..25,
        ) {
            let row = Row {
                date: "2024-01-01".into(),
                values: values
                    .iter()
                    .enumerate()
                    .map(|(i, v)| (format!("S{i}"), v.map(f64::from)))
                    .collect(),
            };
            let first = top_k(&row, &excluded(&["S0"]), k);
            let second = top_k(&row, &excluded(&["S0"]), k);
            prop_assert_eq!(&first, &second);
            prop_assert!(first.len() <= k);
            prop_assert!(first.iter().all(|e| e.name != "S0"));
            prop_assert!(first.windows(2).all(|w| w[0].value >= w[1].value));
        }
    }
}
