//! # orders-dashboard
//!
//! Analytics core for an e-commerce orders dashboard. Loads the marketplace CSV
//! exports (a single merged file or the raw orders / order items / products /
//! customers tables), filters them by purchase date and derives:
//!
//! - daily distinct orders and revenue
//! - product categories ranked by distinct orders
//! - distinct customers per state
//! - recency / frequency / monetary values per customer
//!
//! ```no_run
//! use orders_dashboard::ingestion::{LoadCache, RawTablesSource};
//! use orders_dashboard::pipeline::{daily_orders, rfm};
//! use orders_dashboard::time::{filter_by_date, DateRange};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let cache = LoadCache::new();
//!     let rows = cache.load(&RawTablesSource::from_dir("data"))?;
//!
//!     let range = DateRange::covering(&rows).ok_or("no orders loaded")?;
//!     let filtered = filter_by_date(&rows, range);
//!
//!     for day in &daily_orders(&filtered) {
//!         println!("{} {} {:.2}", day.date, day.order_count, day.revenue);
//!     }
//!     println!("{} customers", rfm(&filtered)?.len());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod ingestion;
pub mod order_line;
pub mod pipeline;
pub mod report;
pub mod time;

pub use error::{DashboardError, Result};
pub use order_line::{OrderLine, OrderLines};
pub use report::DashboardReport;
