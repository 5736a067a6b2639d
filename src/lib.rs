//! Core of the sales dashboard: loading, filtering, aggregation and export of
//! sales transactions. Nothing in here depends on the UI toolkit.

pub mod data;
