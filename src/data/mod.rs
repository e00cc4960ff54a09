/// Data layer: core types, loading, filtering and ranking.
///
/// Architecture:
/// ```text
///  aggregated_states.csv          Metro_…_week.csv
///        │                              │
///        ▼                              ▼
///   ┌──────────┐                  ┌──────────┐
///   │  loader   │  fetch + coerce  │  loader   │
///   └──────────┘                  └──────────┘
///        │                              │
///        ▼                              ▼
///   ┌────────────────┐            ┌───────────────┐
///   │ TimeSeriesStore │            │ RegionalTable │
///   └────────────────┘            └───────────────┘
///        │  filter: rows in a DateRange    │  snapshot(date)
///        ▼                                 ▼
///   ┌──────────┐
///   │ ranking   │  top-K of a snapshot (default selection, summary)
///   └──────────┘
/// ```

pub mod error;
pub mod filter;
pub mod loader;
pub mod model;
pub mod ranking;
pub mod store;
