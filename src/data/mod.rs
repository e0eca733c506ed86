/// Data layer: core types, loading, cleaning, filtering and aggregation.
///
/// Architecture:
/// ```text
///        .csv
///          │
///          ▼
///   ┌──────────┐
///   │  loader   │  parse file → RawTable (headers + optional cells)
///   └──────────┘
///          │
///          ▼
///   ┌──────────┐
///   │  clean    │  normalize, fill, coerce, derive, dedup → CrashTable
///   └──────────┘
///          │
///          ▼
///   ┌──────────┐
///   │  filter   │  sidebar selections → row indices
///   └──────────┘
///          │
///          ▼
///   ┌───────────┐
///   │ aggregate  │  metrics + chart tables → DashboardSnapshot
///   └───────────┘
/// ```

pub mod aggregate;
pub mod clean;
pub mod filter;
pub mod loader;
pub mod model;
