//! Aggregation pipeline
//!
//! Pure functions from a (filtered) `OrderLines` set to the four derived tables the
//! dashboard is built from. Nothing here keeps state between calls.

use crate::error::{DashboardError, Result};
use crate::order_line::{OrderLine, OrderLines};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use tracing::debug;

/// Immutable table of derived rows
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Table<R> {
    rows: Vec<R>,
}

impl<R> Table<R> {
    fn new(rows: Vec<R>) -> Self {
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, R> {
        self.rows.iter()
    }

    pub fn rows(&self) -> &[R] {
        &self.rows
    }
}

impl<'a, R> IntoIterator for &'a Table<R> {
    type Item = &'a R;
    type IntoIter = std::slice::Iter<'a, R>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyOrder {
    pub date: NaiveDate,
    pub order_count: usize,
    pub revenue: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    pub category: String,
    pub order_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StateCount {
    pub state: String,
    pub customer_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomerRfm {
    pub customer_unique_id: String,
    /// Distinct orders
    pub frequency: usize,
    /// Total spend
    pub monetary: f64,
    /// Days between the latest purchase in the set and this customer's latest purchase
    pub recency: i64,
}

pub type DailyOrders = Table<DailyOrder>;
pub type CategorySales = Table<CategoryCount>;
pub type StateCustomers = Table<StateCount>;
pub type Rfm = Table<CustomerRfm>;

impl Table<CategoryCount> {
    /// Best sellers: the head of the descending ranking
    pub fn top(&self, n: usize) -> Vec<CategoryCount> {
        self.rows.iter().take(n).cloned().collect()
    }

    /// Worst sellers: re-ranked ascending from group order, then the head.
    /// Not the reversed tail of `top`, ties come out differently.
    pub fn bottom(&self, n: usize) -> Vec<CategoryCount> {
        let mut ascending = self.rows.clone();
        ascending.sort_by(|a, b| {
            a.order_count
                .cmp(&b.order_count)
                .then_with(|| a.category.cmp(&b.category))
        });
        ascending.truncate(n);
        ascending
    }
}

impl Table<StateCount> {
    /// States with the most customers first; ties by state code
    pub fn ranked(&self, n: usize) -> Vec<StateCount> {
        let mut ranked = self.rows.clone();
        ranked.sort_by(|a, b| {
            b.customer_count
                .cmp(&a.customer_count)
                .then_with(|| a.state.cmp(&b.state))
        });
        ranked.truncate(n);
        ranked
    }
}

/// Distinct orders and revenue per purchase day, ascending.
/// Days without purchases are absent, not zero-filled.
pub fn daily_orders(rows: &OrderLines) -> DailyOrders {
    let mut days: BTreeMap<NaiveDate, (HashSet<&str>, f64)> = BTreeMap::new();
    for line in rows {
        let (orders, revenue) = days.entry(line.purchase_date()).or_default();
        orders.insert(line.order_id.as_str());
        *revenue += line.price;
    }

    let table = Table::new(
        days.into_iter()
            .map(|(date, (orders, revenue))| DailyOrder {
                date,
                order_count: orders.len(),
                revenue,
            })
            .collect(),
    );
    debug!("daily_orders: {} days from {} lines", table.len(), rows.len());
    table
}

/// Distinct orders per product category, most sold first.
///
/// Lines without a category are skipped. Groups start in category-name order and
/// the descending sort is stable, so equal counts keep that order.
pub fn category_sales(rows: &OrderLines) -> CategorySales {
    let mut categories: BTreeMap<&str, HashSet<&str>> = BTreeMap::new();
    for line in rows {
        if let Some(category) = line.product_category_name.as_deref() {
            categories
                .entry(category)
                .or_default()
                .insert(line.order_id.as_str());
        }
    }

    let mut ranking: Vec<CategoryCount> = categories
        .into_iter()
        .map(|(category, orders)| CategoryCount {
            category: category.to_string(),
            order_count: orders.len(),
        })
        .collect();
    ranking.sort_by(|a, b| b.order_count.cmp(&a.order_count));

    debug!("category_sales: {} categories", ranking.len());
    Table::new(ranking)
}

/// Distinct customers (by `customer_unique_id`) per state, in state-code order
pub fn customers_by_state(rows: &OrderLines) -> StateCustomers {
    let mut states: BTreeMap<&str, HashSet<&str>> = BTreeMap::new();
    for line in rows {
        states
            .entry(line.customer_state.as_str())
            .or_default()
            .insert(line.customer_unique_id.as_str());
    }

    Table::new(
        states
            .into_iter()
            .map(|(state, customers)| StateCount {
                state: state.to_string(),
                customer_count: customers.len(),
            })
            .collect(),
    )
}

struct CustomerActivity<'a> {
    orders: HashSet<&'a str>,
    monetary: f64,
    last_purchase: NaiveDate,
}

/// Recency, frequency and monetary value per customer, in customer-id order.
///
/// Recency is anchored on the latest purchase date of the whole input, so an empty
/// input has no anchor and is rejected with `EmptyInput`.
pub fn rfm(rows: &OrderLines) -> Result<Rfm> {
    let anchor = rows
        .iter()
        .map(OrderLine::purchase_date)
        .max()
        .ok_or_else(|| {
            DashboardError::EmptyInput("RFM needs at least one order line to anchor recency".to_string())
        })?;

    let mut customers: BTreeMap<&str, CustomerActivity> = BTreeMap::new();
    for line in rows {
        let date = line.purchase_date();
        let activity = customers
            .entry(line.customer_unique_id.as_str())
            .or_insert_with(|| CustomerActivity {
                orders: HashSet::new(),
                monetary: 0.0,
                last_purchase: date,
            });
        activity.orders.insert(line.order_id.as_str());
        activity.monetary += line.price;
        activity.last_purchase = activity.last_purchase.max(date);
    }

    let table = Table::new(
        customers
            .into_iter()
            .map(|(customer, activity)| CustomerRfm {
                customer_unique_id: customer.to_string(),
                frequency: activity.orders.len(),
                monetary: activity.monetary,
                recency: anchor.signed_duration_since(activity.last_purchase).num_days(),
            })
            .collect(),
    );
    debug!("rfm: {} customers anchored at {}", table.len(), anchor);
    Ok(table)
}
