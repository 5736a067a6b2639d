//! Data layer: core types, loading, filtering, aggregation and export.
//!
//! Architecture:
//! ```text
//!  .csv / .json
//!        │
//!        ▼
//!   ┌──────────┐      ┌──────────┐
//!   │  loader   │ ◄──  │  cache   │  one Arc<Dataset> per source
//!   └──────────┘      └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │ Dataset   │  Vec<Transaction>, category index, value spans
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  filter   │  FilterCriteria → FilteredView (record indices)
//!   └──────────┘
//!        │
//!        ├──────────────────┐
//!        ▼                  ▼
//!   ┌───────────┐      ┌──────────┐
//!   │ aggregate  │      │  export   │  filtered_data.csv
//!   └───────────┘      └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  report   │  recompute(criteria) → metrics + chart series
//!   └──────────┘
//! ```

pub mod aggregate;
pub mod cache;
pub mod calculator;
pub mod error;
pub mod export;
pub mod filter;
pub mod loader;
pub mod model;
pub mod report;

#[cfg(test)]
pub(crate) mod test_util;
