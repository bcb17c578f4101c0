//! Raw tables source - joins the four marketplace exports on load
//!
//! orders ⋈ order_items on order_id (inner)
//!        ⋈ customers   on customer_id (inner)
//!        ⋈ products    on product_id (left, only product_id + product_category_name)

use crate::error::{DashboardError, Result};
use crate::ingestion::source::{read_table, OrderLineSource};
use crate::order_line::columns::*;
use crate::order_line::OrderLines;
use polars::prelude::*;
use std::path::{Path, PathBuf};
use tracing::info;

const ORDERS_COLUMNS: [&str; 3] = [ORDER_ID, CUSTOMER_ID, ORDER_PURCHASE_TIMESTAMP];
const ORDER_ITEMS_COLUMNS: [&str; 3] = [ORDER_ID, PRODUCT_ID, PRICE];
const PRODUCTS_COLUMNS: [&str; 2] = [PRODUCT_ID, PRODUCT_CATEGORY_NAME];
const CUSTOMERS_COLUMNS: [&str; 3] = [CUSTOMER_ID, CUSTOMER_UNIQUE_ID, CUSTOMER_STATE];

/// Paths of the four raw tables
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTablesSource {
    pub orders: PathBuf,
    pub order_items: PathBuf,
    pub products: PathBuf,
    pub customers: PathBuf,
}

impl RawTablesSource {
    /// Default file names inside one directory
    pub fn from_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            orders: dir.join("orders.csv"),
            order_items: dir.join("order_items.csv"),
            products: dir.join("products.csv"),
            customers: dir.join("customers.csv"),
        }
    }

    /// Join the tables into one frame with the order-line columns
    pub fn join(&self) -> Result<DataFrame> {
        let orders = read_table(&self.orders, "orders", &ORDERS_COLUMNS)?;
        let items = read_table(&self.order_items, "order_items", &ORDER_ITEMS_COLUMNS)?;
        let products = read_table(&self.products, "products", &PRODUCTS_COLUMNS)?;
        let customers = read_table(&self.customers, "customers", &CUSTOMERS_COLUMNS)?;

        let products = products
            .lazy()
            .select([col(PRODUCT_ID), col(PRODUCT_CATEGORY_NAME)]);

        let joined = orders
            .lazy()
            .join(
                items.lazy(),
                [col(ORDER_ID)],
                [col(ORDER_ID)],
                JoinArgs::new(JoinType::Inner),
            )
            .join(
                customers.lazy(),
                [col(CUSTOMER_ID)],
                [col(CUSTOMER_ID)],
                JoinArgs::new(JoinType::Inner),
            )
            .join(
                products,
                [col(PRODUCT_ID)],
                [col(PRODUCT_ID)],
                JoinArgs::new(JoinType::Left),
            )
            .collect()
            .map_err(|e| DashboardError::Load(format!("Join failed: {}", e)))?;

        info!(
            "Joined raw tables into {} rows ({} columns)",
            joined.height(),
            joined.width()
        );
        Ok(joined)
    }
}

impl OrderLineSource for RawTablesSource {
    fn load(&self) -> Result<OrderLines> {
        let joined = self.join()?;
        let lines = OrderLines::from_frame(&joined, "joined")?;
        info!("Loaded {} order lines from raw tables", lines.len());
        Ok(lines)
    }

    fn inputs(&self) -> Vec<PathBuf> {
        vec![
            self.orders.clone(),
            self.order_items.clone(),
            self.products.clone(),
            self.customers.clone(),
        ]
    }

    fn source_type(&self) -> &str {
        "raw_tables"
    }
}
