/// Data layer: core types, loading, filtering, aggregation and export.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet / uploaded bytes
///        │
///        ▼
///   ┌──────────┐      ┌───────┐
///   │  loader   │◄─────│ cache │  sha-256 of source bytes → Dataset
///   └──────────┘      └───────┘
///        │
///        ▼
///   ┌─────────┐
///   │ Dataset  │  Vec<Record>, distinct regions/items, date span
///   └─────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  region ∧ item ∧ date predicates → FilteredView
///   └──────────┘
///        │
///        ├──────────────► aggregate   totals, distribution, correlation, describe
///        │
///        ▼
///   ┌──────────┐
///   │  export   │  FilteredView → CSV bytes
///   └──────────┘
/// ```

pub mod aggregate;
pub mod cache;
pub mod error;
pub mod export;
pub mod filter;
pub mod loader;
pub mod model;
