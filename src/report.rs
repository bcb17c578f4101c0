//! Dashboard report
//!
//! Binds the derived tables to the numbers the dashboard shows: headline totals,
//! best/worst categories, busiest states and RFM leaders.

use crate::error::{DashboardError, Result};
use crate::order_line::OrderLines;
use crate::pipeline::{
    category_sales, customers_by_state, daily_orders, rfm, CategoryCount, CustomerRfm, DailyOrders, Rfm,
    StateCount,
};
use crate::time::{filter_by_date, DateRange};
use itertools::Itertools;
use serde::Serialize;
use std::fmt;
use tracing::info;

/// Number of states shown in the demographics section
pub const TOP_STATES: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardReport {
    pub range: DateRange,
    pub order_lines: usize,
    pub total_orders: usize,
    pub total_revenue: f64,
    pub daily_orders: DailyOrders,
    pub best_categories: Vec<CategoryCount>,
    pub worst_categories: Vec<CategoryCount>,
    pub top_states: Vec<StateCount>,
    /// Absent when the range holds no purchases
    pub rfm: Option<RfmSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RfmSummary {
    /// Mean recency in days, one decimal
    pub avg_recency: f64,
    /// Mean order count, two decimals
    pub avg_frequency: f64,
    pub avg_monetary: f64,
    pub most_recent: Vec<CustomerRfm>,
    pub most_frequent: Vec<CustomerRfm>,
    pub highest_spend: Vec<CustomerRfm>,
}

impl RfmSummary {
    fn from_table(table: &Rfm, top_n: usize) -> Self {
        let customers = table.len() as f64;
        let mean = |total: f64| if table.is_empty() { 0.0 } else { total / customers };

        let avg_recency = mean(table.iter().map(|r| r.recency as f64).sum());
        let avg_frequency = mean(table.iter().map(|r| r.frequency as f64).sum());
        let avg_monetary = mean(table.iter().map(|r| r.monetary).sum());

        Self {
            avg_recency: round_to(avg_recency, 1),
            avg_frequency: round_to(avg_frequency, 2),
            avg_monetary,
            most_recent: table
                .iter()
                .sorted_by(|a, b| a.recency.cmp(&b.recency))
                .take(top_n)
                .cloned()
                .collect(),
            most_frequent: table
                .iter()
                .sorted_by(|a, b| b.frequency.cmp(&a.frequency))
                .take(top_n)
                .cloned()
                .collect(),
            highest_spend: table
                .iter()
                .sorted_by(|a, b| b.monetary.total_cmp(&a.monetary))
                .take(top_n)
                .cloned()
                .collect(),
        }
    }
}

impl DashboardReport {
    /// Filter `rows` to `range` and build every section from the filtered set
    pub fn build(rows: &OrderLines, range: DateRange, top_n: usize) -> Result<Self> {
        let filtered = filter_by_date(rows, range);

        let daily = daily_orders(&filtered);
        let categories = category_sales(&filtered);
        let states = customers_by_state(&filtered);
        let rfm = match rfm(&filtered) {
            Ok(table) => Some(RfmSummary::from_table(&table, top_n)),
            Err(DashboardError::EmptyInput(reason)) => {
                info!("Skipping RFM section: {}", reason);
                None
            }
            Err(e) => return Err(e),
        };

        Ok(Self {
            range,
            order_lines: filtered.len(),
            total_orders: daily.iter().map(|d| d.order_count).sum(),
            total_revenue: daily.iter().map(|d| d.revenue).sum(),
            best_categories: categories.top(top_n),
            worst_categories: categories.bottom(top_n),
            top_states: states.ranked(TOP_STATES),
            daily_orders: daily,
            rfm,
        })
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

impl fmt::Display for DashboardReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Orders dashboard {} .. {}", self.range.start(), self.range.end())?;
        writeln!(f)?;
        writeln!(f, "Daily orders")?;
        writeln!(f, "  total orders:  {}", self.total_orders)?;
        writeln!(f, "  total revenue: {:.2}", self.total_revenue)?;
        writeln!(f, "  days with orders: {}", self.daily_orders.len())?;
        writeln!(f)?;

        writeln!(f, "Best selling categories")?;
        for c in &self.best_categories {
            writeln!(f, "  {:<40} {}", c.category, c.order_count)?;
        }
        writeln!(f, "Worst selling categories")?;
        for c in &self.worst_categories {
            writeln!(f, "  {:<40} {}", c.category, c.order_count)?;
        }
        writeln!(f)?;

        writeln!(f, "Customers by state")?;
        for s in &self.top_states {
            writeln!(f, "  {:<4} {}", s.state, s.customer_count)?;
        }
        writeln!(f)?;

        match &self.rfm {
            Some(summary) => {
                writeln!(f, "RFM")?;
                writeln!(f, "  avg recency (days): {}", summary.avg_recency)?;
                writeln!(f, "  avg frequency:      {}", summary.avg_frequency)?;
                writeln!(f, "  avg monetary:       {:.2}", summary.avg_monetary)?;
                write_customers(f, "most recent", &summary.most_recent, |c| c.recency.to_string())?;
                write_customers(f, "most frequent", &summary.most_frequent, |c| c.frequency.to_string())?;
                write_customers(f, "highest spend", &summary.highest_spend, |c| format!("{:.2}", c.monetary))
            }
            None => writeln!(f, "RFM: no purchases in range"),
        }
    }
}

fn write_customers(
    f: &mut fmt::Formatter<'_>,
    title: &str,
    customers: &[CustomerRfm],
    value: impl Fn(&CustomerRfm) -> String,
) -> fmt::Result {
    writeln!(f, "  {}:", title)?;
    for c in customers {
        writeln!(f, "    {} {}", c.customer_unique_id, value(c))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order_line::OrderLine;
    use chrono::NaiveDate;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2018, 6, d).unwrap()
    }

    fn line(order: &str, customer: &str, category: &str, price: f64, d: u32) -> OrderLine {
        OrderLine {
            order_id: order.to_string(),
            customer_id: format!("cid-{}", order),
            customer_unique_id: customer.to_string(),
            customer_state: if customer < "C3" { "SP" } else { "MG" }.to_string(),
            product_category_name: Some(category.to_string()),
            price,
            order_purchase_timestamp: day(d).and_hms_opt(9, 15, 0).unwrap(),
            order_delivered_customer_date: None,
        }
    }

    fn rows() -> OrderLines {
        OrderLines::new(vec![
            line("o1", "C1", "toys", 10.0, 1),
            line("o1", "C1", "audio", 2.5, 1),
            line("o2", "C2", "toys", 7.5, 2),
            line("o3", "C3", "garden", 30.0, 4),
            line("o4", "C1", "toys", 5.0, 4),
        ])
    }

    #[test]
    fn test_build_totals_and_sections() {
        let range = DateRange::new(day(1), day(4)).unwrap();
        let report = DashboardReport::build(&rows(), range, 2).unwrap();

        assert_eq!(report.order_lines, 5);
        assert_eq!(report.total_orders, 4);
        assert_eq!(report.total_revenue, 55.0);
        assert_eq!(report.best_categories[0].category, "toys");
        assert_eq!(report.best_categories.len(), 2);
        assert_eq!(report.worst_categories[0].category, "audio");
        assert_eq!(report.top_states[0].state, "SP");

        let rfm = report.rfm.unwrap();
        // C1: recency 0, C2: 2, C3: 0
        assert_eq!(rfm.avg_recency, 0.7);
        // C1 has 2 orders, others 1
        assert_eq!(rfm.avg_frequency, 1.33);
        assert_eq!(rfm.most_frequent[0].customer_unique_id, "C1");
        assert_eq!(rfm.highest_spend[0].customer_unique_id, "C3");
        assert_eq!(rfm.most_recent.len(), 2);
        assert!(rfm.most_recent.iter().all(|c| c.recency == 0));
    }

    #[test]
    fn test_build_on_empty_range_has_no_rfm() {
        let range = DateRange::single(NaiveDate::from_ymd_opt(2017, 1, 1).unwrap());
        let report = DashboardReport::build(&rows(), range, 5).unwrap();
        assert_eq!(report.order_lines, 0);
        assert_eq!(report.total_orders, 0);
        assert!(report.daily_orders.is_empty());
        assert!(report.best_categories.is_empty());
        assert!(report.top_states.is_empty());
        assert!(report.rfm.is_none());
        assert!(report.to_string().contains("no purchases in range"));
    }

    #[test]
    fn test_report_serializes_to_json() {
        let range = DateRange::new(day(1), day(2)).unwrap();
        let json = DashboardReport::build(&rows(), range, 5).unwrap().to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["total_orders"], 2);
        assert_eq!(value["daily_orders"][0]["date"], "2018-06-01");
        assert_eq!(value["range"]["start"], "2018-06-01");
    }
}
