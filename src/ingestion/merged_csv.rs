//! Merged CSV source - a single export that already carries the joined columns

use crate::error::Result;
use crate::ingestion::source::{read_table, OrderLineSource};
use crate::order_line::{OrderLines, REQUIRED_COLUMNS};
use std::path::PathBuf;
use tracing::info;

pub struct MergedCsvSource {
    path: PathBuf,
}

impl MergedCsvSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Table label used in errors: the file stem, e.g. "main_data"
    fn table_name(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "merged".to_string())
    }
}

impl OrderLineSource for MergedCsvSource {
    fn load(&self) -> Result<OrderLines> {
        let table = self.table_name();
        let df = read_table(&self.path, &table, &REQUIRED_COLUMNS)?;
        let lines = OrderLines::from_frame(&df, &table)?;
        info!("Loaded {} order lines from {}", lines.len(), self.path.display());
        Ok(lines)
    }

    fn inputs(&self) -> Vec<PathBuf> {
        vec![self.path.clone()]
    }

    fn source_type(&self) -> &str {
        "merged_csv"
    }
}
