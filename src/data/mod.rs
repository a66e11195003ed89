/// Data layer: core types, loading, filtering and derived metrics.
///
/// Architecture:
/// ```text
///   remote URL / disk cache / local .csv
///        │
///        ▼
///   ┌──────────┐
///   │  source   │  fetch + memoize raw CSV bytes (background thread)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse CSV → CovidDataset
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  country + date range → view rows
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ metrics   │  Active, DailyConfirmed, GrowthRate, MA7, corr, histogram
///   └──────────┘
/// ```

pub mod error;
pub mod export;
pub mod filter;
pub mod geo;
pub mod loader;
pub mod metrics;
pub mod model;
pub mod source;
