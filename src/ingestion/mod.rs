//! Ingestion - turns source CSV files into `OrderLines`
//!
//! Two layouts are supported behind the `OrderLineSource` trait:
//! - `MergedCsvSource`: one pre-joined CSV
//! - `RawTablesSource`: orders, order items, products and customers joined on load
//!
//! `LoadCache` memoizes loads per resolved input path set.

pub mod cache;
pub mod merged_csv;
pub mod raw_tables;
pub mod source;

pub use cache::LoadCache;
pub use merged_csv::MergedCsvSource;
pub use raw_tables::RawTablesSource;
pub use source::{read_table, OrderLineSource};
