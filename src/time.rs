use crate::error::{DashboardError, Result};
use crate::order_line::OrderLines;
use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

/// Closed calendar-date interval used to slice order lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(DashboardError::InvalidDateRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// A one-day range
    pub fn single(date: NaiveDate) -> Self {
        Self { start: date, end: date }
    }

    /// The span from the first to the last purchase date in `rows`
    pub fn covering(rows: &OrderLines) -> Option<Self> {
        rows.purchase_date_bounds()
            .map(|(start, end)| Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Keep the rows whose purchase date falls inside `range`, in their original order.
/// A range outside the data gives an empty set.
pub fn filter_by_date(rows: &OrderLines, range: DateRange) -> OrderLines {
    let filtered: OrderLines = rows
        .iter()
        .filter(|line| range.contains(line.purchase_date()))
        .cloned()
        .collect();

    debug!(
        "Date filter {}..={} kept {} of {} order lines",
        range.start,
        range.end,
        filtered.len(),
        rows.len()
    );
    filtered
}
