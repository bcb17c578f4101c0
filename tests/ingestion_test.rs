use orders_dashboard::ingestion::{LoadCache, MergedCsvSource, OrderLineSource, RawTablesSource};
use orders_dashboard::DashboardError;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

const ORDERS: &str = "\
order_id,customer_id,order_status,order_purchase_timestamp,order_delivered_customer_date
o1,c1,delivered,2017-10-02 10:56:33,2017-10-10 21:25:13
o2,c2,delivered,2017-10-03 08:00:00,
o3,c3,delivered,2017-10-01 12:00:00,2017-10-05 09:00:00
o4,c4,canceled,2017-10-04 12:00:00,
";

const ORDER_ITEMS: &str = "\
order_id,order_item_id,product_id,seller_id,price,freight_value
o1,1,p1,s1,29.99,8.72
o1,2,p2,s1,10.01,8.72
o2,1,p1,s2,29.99,5.00
o3,1,p3,s3,100.00,12.00
";

const PRODUCTS: &str = "\
product_id,product_category_name,product_weight_g
p1,housewares,500
p2,,120
p3,bed_bath_table,900
";

const CUSTOMERS: &str = "\
customer_id,customer_unique_id,customer_zip_code_prefix,customer_city,customer_state
c1,u1,01151,sao paulo,SP
c2,u2,20031,rio de janeiro,RJ
c3,u1,01151,sao paulo,SP
c4,u4,30110,belo horizonte,MG
";

fn write_raw_tables(dir: &Path) {
    fs::write(dir.join("orders.csv"), ORDERS).unwrap();
    fs::write(dir.join("order_items.csv"), ORDER_ITEMS).unwrap();
    fs::write(dir.join("products.csv"), PRODUCTS).unwrap();
    fs::write(dir.join("customers.csv"), CUSTOMERS).unwrap();
}

#[test]
fn test_raw_tables_join_into_order_lines() {
    let dir = TempDir::new().unwrap();
    write_raw_tables(dir.path());

    let lines = RawTablesSource::from_dir(dir.path()).load().unwrap();

    // o4 has no items, so the inner join drops it
    assert_eq!(lines.len(), 4);
    assert!(lines.iter().all(|l| l.order_id != "o4"));

    // sorted by purchase timestamp, o3 first
    let first = &lines.as_slice()[0];
    assert_eq!(first.order_id, "o3");
    assert_eq!(first.customer_unique_id, "u1");
    assert_eq!(first.customer_state, "SP");
    assert_eq!(first.product_category_name.as_deref(), Some("bed_bath_table"));
    assert_eq!(first.price, 100.0);

    let uncategorized: Vec<_> = lines
        .iter()
        .filter(|l| l.product_category_name.is_none())
        .collect();
    assert_eq!(uncategorized.len(), 1);
    assert_eq!(uncategorized[0].price, 10.01);

    let o2 = lines.iter().find(|l| l.order_id == "o2").unwrap();
    assert_eq!(o2.order_delivered_customer_date, None);
}

#[test]
fn test_merged_csv_loads() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("main_data.csv");
    fs::write(
        &path,
        "\
order_id,customer_id,customer_unique_id,customer_state,product_id,product_category_name,price,order_purchase_timestamp,order_delivered_customer_date
o1,c1,u1,SP,p1,housewares,29.99,2017-10-02 10:56:33,2017-10-10 21:25:13
o2,c2,u2,RJ,p1,housewares,29.99,2017-10-03 08:00:00,
",
    )
    .unwrap();

    let lines = MergedCsvSource::new(&path).load().unwrap();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines.as_slice()[1].customer_state, "RJ");
}

#[test]
fn test_blank_required_cell_fails_the_whole_load() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("main_data.csv");
    fs::write(
        &path,
        "\
order_id,customer_id,customer_unique_id,customer_state,product_id,product_category_name,price,order_purchase_timestamp,order_delivered_customer_date
o1,c1,u1,,p1,housewares,29.99,2017-10-02 10:56:33,
o2,c2,u2,RJ,p1,housewares,29.99,2017-10-03 08:00:00,
",
    )
    .unwrap();

    let cache = LoadCache::new();
    let err = cache.load(&MergedCsvSource::new(&path)).unwrap_err();
    match err {
        DashboardError::InvalidValue { table, column, row, .. } => {
            assert_eq!(table, "main_data");
            assert_eq!(column, "customer_state");
            assert_eq!(row, 1);
        }
        other => panic!("unexpected error: {}", other),
    }
    // no partial load is kept around
    assert!(cache.is_empty());
}

#[test]
fn test_missing_table_file_fails_fast() {
    let dir = TempDir::new().unwrap();
    write_raw_tables(dir.path());
    fs::remove_file(dir.path().join("products.csv")).unwrap();

    let err = RawTablesSource::from_dir(dir.path()).load().unwrap_err();
    assert!(matches!(err, DashboardError::Load(ref msg) if msg.contains("products")));
}

#[test]
fn test_missing_required_column_fails_fast() {
    let dir = TempDir::new().unwrap();
    write_raw_tables(dir.path());
    fs::write(
        dir.path().join("customers.csv"),
        "customer_id,customer_unique_id,customer_city\nc1,u1,sao paulo\n",
    )
    .unwrap();

    let err = RawTablesSource::from_dir(dir.path()).load().unwrap_err();
    match err {
        DashboardError::MissingColumn { table, column } => {
            assert_eq!(table, "customers");
            assert_eq!(column, "customer_state");
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn test_unparseable_price_fails_at_load() {
    let dir = TempDir::new().unwrap();
    write_raw_tables(dir.path());
    fs::write(
        dir.path().join("order_items.csv"),
        "order_id,order_item_id,product_id,seller_id,price,freight_value\no1,1,p1,s1,twelve,8.72\n",
    )
    .unwrap();

    let err = RawTablesSource::from_dir(dir.path()).load().unwrap_err();
    assert!(matches!(err, DashboardError::InvalidValue { ref column, ref value, .. } if column == "price" && value == "twelve"));
}

#[test]
fn test_cache_memoizes_by_resolved_paths() {
    let dir = TempDir::new().unwrap();
    write_raw_tables(dir.path());
    let cache = LoadCache::new();

    let first = cache.load(&RawTablesSource::from_dir(dir.path())).unwrap();
    // same files reached through a different spelling of the directory
    let second = cache
        .load(&RawTablesSource::from_dir(dir.path().join(".")))
        .unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(cache.len(), 1);
}
