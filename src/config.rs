//! Runtime configuration resolved from CLI arguments and the environment

use crate::error::Result;
use crate::ingestion::{MergedCsvSource, OrderLineSource, RawTablesSource};
use crate::order_line::OrderLines;
use crate::time::DateRange;
use chrono::NaiveDate;
use std::env;
use std::path::PathBuf;

/// Env var consulted when no data directory is passed on the command line
pub const DATA_DIR_ENV: &str = "DASHBOARD_DATA_DIR";
pub const DEFAULT_DATA_DIR: &str = "data";
pub const DEFAULT_TOP_N: usize = 5;

/// Where the order lines come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceConfig {
    Merged(PathBuf),
    RawTables(RawTablesSource),
}

impl SourceConfig {
    pub fn into_source(self) -> Box<dyn OrderLineSource> {
        match self {
            SourceConfig::Merged(path) => Box::new(MergedCsvSource::new(path)),
            SourceConfig::RawTables(tables) => Box::new(tables),
        }
    }
}

/// Date bounds as the user gave them; either may be missing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RangeSelection {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl RangeSelection {
    /// Two bounds make a range, one bound collapses to a single day, none falls
    /// back to the span of the loaded data (`None` if there is no data).
    pub fn resolve(&self, rows: &OrderLines) -> Result<Option<DateRange>> {
        match (self.start, self.end) {
            (Some(start), Some(end)) => Ok(Some(DateRange::new(start, end)?)),
            (Some(date), None) | (None, Some(date)) => Ok(Some(DateRange::single(date))),
            (None, None) => Ok(DateRange::covering(rows)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardConfig {
    pub source: SourceConfig,
    pub range: RangeSelection,
    pub top_n: usize,
    pub output: OutputFormat,
}

/// CLI value first, then `DASHBOARD_DATA_DIR`, then `./data`
pub fn resolve_data_dir(cli: Option<PathBuf>) -> PathBuf {
    cli.or_else(|| env::var(DATA_DIR_ENV).ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR))
}
