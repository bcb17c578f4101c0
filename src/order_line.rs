//! Typed order-line rows
//!
//! Every source variant ends up here: a joined polars frame is validated column by
//! column and converted into `OrderLine` records, so the pipeline never looks a
//! column up by name.

use crate::error::{DashboardError, Result};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use polars::prelude::*;
use serde::Serialize;

/// Column names shared by the source CSVs
pub mod columns {
    pub const ORDER_ID: &str = "order_id";
    pub const CUSTOMER_ID: &str = "customer_id";
    pub const CUSTOMER_UNIQUE_ID: &str = "customer_unique_id";
    pub const CUSTOMER_STATE: &str = "customer_state";
    pub const PRODUCT_ID: &str = "product_id";
    pub const PRODUCT_CATEGORY_NAME: &str = "product_category_name";
    pub const PRICE: &str = "price";
    pub const ORDER_PURCHASE_TIMESTAMP: &str = "order_purchase_timestamp";
    pub const ORDER_DELIVERED_CUSTOMER_DATE: &str = "order_delivered_customer_date";
}

use columns::*;

/// Columns a joined frame must carry before it can become `OrderLines`
pub const REQUIRED_COLUMNS: [&str; 7] = [
    ORDER_ID,
    CUSTOMER_ID,
    CUSTOMER_UNIQUE_ID,
    CUSTOMER_STATE,
    PRODUCT_CATEGORY_NAME,
    PRICE,
    ORDER_PURCHASE_TIMESTAMP,
];

const TIMESTAMP_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
];

/// One purchased item within an order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderLine {
    pub order_id: String,
    pub customer_id: String,
    pub customer_unique_id: String,
    pub customer_state: String,
    pub product_category_name: Option<String>,
    pub price: f64,
    pub order_purchase_timestamp: NaiveDateTime,
    pub order_delivered_customer_date: Option<NaiveDateTime>,
}

impl OrderLine {
    /// Calendar day of the purchase, time of day dropped
    pub fn purchase_date(&self) -> NaiveDate {
        self.order_purchase_timestamp.date()
    }
}

/// Order lines sorted ascending by purchase timestamp
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct OrderLines {
    rows: Vec<OrderLine>,
}

impl OrderLines {
    pub fn new(mut rows: Vec<OrderLine>) -> Self {
        rows.sort_by_key(|row| row.order_purchase_timestamp);
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, OrderLine> {
        self.rows.iter()
    }

    pub fn as_slice(&self) -> &[OrderLine] {
        &self.rows
    }

    /// First and last purchase date present, `None` for an empty set
    pub fn purchase_date_bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        // rows are kept sorted, so the ends are the bounds
        let first = self.rows.first()?.purchase_date();
        let last = self.rows.last()?.purchase_date();
        Some((first, last))
    }

    /// Validate a joined frame and convert it into typed rows.
    ///
    /// Fails on the first missing column, null required cell, negative price or
    /// unparseable timestamp. `order_delivered_customer_date` may be absent.
    pub fn from_frame(df: &DataFrame, table: &str) -> Result<Self> {
        require_columns(df, table, &REQUIRED_COLUMNS)?;

        let mut order_ids = string_column(df, table, ORDER_ID)?;
        let mut customer_ids = string_column(df, table, CUSTOMER_ID)?;
        let mut unique_ids = string_column(df, table, CUSTOMER_UNIQUE_ID)?;
        let mut states = string_column(df, table, CUSTOMER_STATE)?;
        let mut categories = string_column(df, table, PRODUCT_CATEGORY_NAME)?;
        let prices = string_column(df, table, PRICE)?;
        let purchased = string_column(df, table, ORDER_PURCHASE_TIMESTAMP)?;
        let delivered = if df.column(ORDER_DELIVERED_CUSTOMER_DATE).is_ok() {
            string_column(df, table, ORDER_DELIVERED_CUSTOMER_DATE)?
        } else {
            vec![None; df.height()]
        };

        let mut rows = Vec::with_capacity(df.height());
        for row in 0..df.height() {
            let price_text = required(table, PRICE, row, prices[row].as_deref())?;
            let purchased_text = required(table, ORDER_PURCHASE_TIMESTAMP, row, purchased[row].as_deref())?;
            let order_delivered_customer_date = match delivered[row].as_deref() {
                Some(text) => Some(parse_timestamp(text).ok_or_else(|| {
                    invalid(table, ORDER_DELIVERED_CUSTOMER_DATE, row, text, "not a timestamp")
                })?),
                None => None,
            };

            rows.push(OrderLine {
                order_id: required_owned(table, ORDER_ID, row, order_ids[row].take())?,
                customer_id: required_owned(table, CUSTOMER_ID, row, customer_ids[row].take())?,
                customer_unique_id: required_owned(table, CUSTOMER_UNIQUE_ID, row, unique_ids[row].take())?,
                customer_state: required_owned(table, CUSTOMER_STATE, row, states[row].take())?,
                product_category_name: categories[row].take(),
                price: parse_price(price_text)
                    .map_err(|reason| invalid(table, PRICE, row, price_text, reason))?,
                order_purchase_timestamp: parse_timestamp(purchased_text).ok_or_else(|| {
                    invalid(table, ORDER_PURCHASE_TIMESTAMP, row, purchased_text, "not a timestamp")
                })?,
                order_delivered_customer_date,
            });
        }

        Ok(Self::new(rows))
    }
}

impl FromIterator<OrderLine> for OrderLines {
    fn from_iter<I: IntoIterator<Item = OrderLine>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a OrderLines {
    type Item = &'a OrderLine;
    type IntoIter = std::slice::Iter<'a, OrderLine>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

/// Fail with `MissingColumn` for the first name the frame lacks
pub(crate) fn require_columns(df: &DataFrame, table: &str, names: &[&str]) -> Result<()> {
    for name in names {
        if df.column(name).is_err() {
            return Err(DashboardError::MissingColumn {
                table: table.to_string(),
                column: name.to_string(),
            });
        }
    }
    Ok(())
}

/// Read a column as trimmed strings; blank cells become `None`
fn string_column(df: &DataFrame, table: &str, name: &str) -> Result<Vec<Option<String>>> {
    let series = df.column(name).map_err(|_| DashboardError::MissingColumn {
        table: table.to_string(),
        column: name.to_string(),
    })?;
    let series = series.cast(&DataType::String)?;
    let values = series
        .str()?
        .into_iter()
        .map(|value| {
            value
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        })
        .collect();
    Ok(values)
}

fn required<'a>(table: &str, column: &str, row: usize, value: Option<&'a str>) -> Result<&'a str> {
    value.ok_or_else(|| invalid(table, column, row, "", "required value is missing"))
}

fn required_owned(table: &str, column: &str, row: usize, value: Option<String>) -> Result<String> {
    value.ok_or_else(|| invalid(table, column, row, "", "required value is missing"))
}

fn invalid(table: &str, column: &str, row: usize, value: &str, reason: &str) -> DashboardError {
    DashboardError::InvalidValue {
        table: table.to_string(),
        column: column.to_string(),
        // 1-based data row, header excluded
        row: row + 1,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn parse_price(text: &str) -> std::result::Result<f64, &'static str> {
    let price: f64 = text.parse().map_err(|_| "not a number")?;
    if !price.is_finite() {
        return Err("not a finite number");
    }
    if price < 0.0 {
        return Err("price must be non-negative");
    }
    Ok(price)
}

/// Parse the timestamp layouts found in the source exports; a bare date means midnight
pub fn parse_timestamp(text: &str) -> Option<NaiveDateTime> {
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .map(|date| date.and_time(NaiveTime::MIN))
        })
}
