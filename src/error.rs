use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("Load error: {0}")]
    Load(String),

    #[error("Missing column '{column}' in table '{table}'")]
    MissingColumn {
        table: String,
        column: String,
    },

    #[error("Invalid value in table '{table}', column '{column}', row {row}: '{value}' ({reason})")]
    InvalidValue {
        table: String,
        column: String,
        row: usize,
        value: String,
        reason: String,
    },

    #[error("Invalid date range: start {start} is after end {end}")]
    InvalidDateRange {
        start: NaiveDate,
        end: NaiveDate,
    },

    #[error("Empty input: {0}")]
    EmptyInput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Polars error: {0}")]
    Polars(String),
}

impl From<polars::error::PolarsError> for DashboardError {
    fn from(err: polars::error::PolarsError) -> Self {
        DashboardError::Polars(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, DashboardError>;
