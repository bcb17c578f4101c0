//! Source trait - abstract interface for order-line loaders

use crate::error::{DashboardError, Result};
use crate::order_line::{require_columns, OrderLines};
use polars::prelude::*;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Anything that can produce the full, validated order-line set
///
/// Implementations:
/// - MergedCsvSource: a single pre-joined export
/// - RawTablesSource: the four raw tables, joined on load
pub trait OrderLineSource: Send + Sync {
    /// Read, join and validate. Either every row loads or the call fails.
    fn load(&self) -> Result<OrderLines>;

    /// Files this source reads, in a fixed order
    fn inputs(&self) -> Vec<PathBuf>;

    /// Short label for logs (e.g. "merged_csv", "raw_tables")
    fn source_type(&self) -> &str;
}

/// Load one CSV table eagerly with every column as text and check its header.
///
/// Cells stay strings here; typing happens once in `OrderLines::from_frame` so
/// errors can name the offending row.
pub fn read_table(path: &Path, table: &str, required: &[&str]) -> Result<DataFrame> {
    if !path.exists() {
        return Err(DashboardError::Load(format!(
            "Table file not found for '{}': {}",
            table,
            path.display()
        )));
    }

    let df = LazyCsvReader::new(path)
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .finish()
        .map_err(|e| DashboardError::Load(format!("Failed to scan CSV {}: {}", table, e)))?
        .collect()
        .map_err(|e| DashboardError::Load(format!("Failed to read CSV {}: {}", table, e)))?;

    require_columns(&df, table, required)?;
    debug!("Read table {} ({} rows) from {}", table, df.height(), path.display());
    Ok(df)
}
