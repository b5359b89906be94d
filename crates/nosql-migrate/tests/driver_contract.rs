//! Contract tests for the uniform driver semantics.
//!
//! Run against the in-memory driver, which is the executable reference for
//! what every network driver must do. Engine-specific behavior is covered by
//! the ignored live suites (`mongo_live.rs`, `scylla_live.rs`).

use serde_json::json;

use nosql_migrate::{
    ConnectionError, Driver, DriverConfig, DriverError, MemoryDriver, Row, TableDescriptor,
};

fn row(value: serde_json::Value) -> Row {
    value.as_object().unwrap().clone()
}

fn default_rows() -> Vec<Row> {
    vec![
        row(json!({"number": 1})),
        row(json!({"number": 2})),
        row(json!({"number": 3})),
    ]
}

async fn connected_driver() -> MemoryDriver {
    let mut driver = MemoryDriver::new(DriverConfig::new("localhost", 1, "migration_test"));
    driver.connect().await.unwrap();
    driver
}

async fn seeded_driver() -> MemoryDriver {
    let driver = connected_driver().await;
    driver
        .create_tables(&[TableDescriptor::new("table1")])
        .await
        .unwrap();
    driver.insert_rows("table1", default_rows()).await.unwrap();
    driver
}

#[tokio::test]
async fn connect_then_close_succeeds() {
    let mut driver = connected_driver().await;
    driver.close().await.unwrap();
}

#[tokio::test]
async fn double_close_fails_with_already_closed() {
    let mut driver = connected_driver().await;
    driver.close().await.unwrap();
    assert!(matches!(
        driver.close().await,
        Err(ConnectionError::AlreadyClosed)
    ));
}

#[tokio::test]
async fn operations_after_close_fail_with_not_connected() {
    let mut driver = seeded_driver().await;
    driver.close().await.unwrap();

    assert!(matches!(
        driver.list_tables().await,
        Err(DriverError::NotConnected)
    ));
    assert!(matches!(
        driver.count_rows("table1").await,
        Err(DriverError::NotConnected)
    ));
    assert!(matches!(
        driver.get_rows("table1", 10, 0).await,
        Err(DriverError::NotConnected)
    ));
    assert!(matches!(
        driver.insert_rows("table1", default_rows()).await,
        Err(DriverError::NotConnected)
    ));
}

#[tokio::test]
async fn create_tables_is_idempotent() {
    let driver = connected_driver().await;
    let descriptors = [TableDescriptor::new("t")];

    driver.create_tables(&descriptors).await.unwrap();
    driver.create_tables(&descriptors).await.unwrap();

    let tables = driver.list_tables().await.unwrap();
    let matching: Vec<_> = tables.iter().filter(|t| t.name == "t").collect();
    assert_eq!(matching.len(), 1);
}

#[tokio::test]
async fn list_tables_returns_all_created_tables() {
    let driver = connected_driver().await;
    driver
        .create_tables(&[
            TableDescriptor::new("table1"),
            TableDescriptor::new("helloX"),
            TableDescriptor::new("anotherY"),
        ])
        .await
        .unwrap();

    let mut names: Vec<String> = driver
        .list_tables()
        .await
        .unwrap()
        .into_iter()
        .map(|t| t.name)
        .collect();
    names.sort();

    let mut expected = vec!["anotherY", "helloX", "table1"];
    expected.sort();
    assert_eq!(names, expected);
}

#[tokio::test]
async fn count_rows_is_exact() {
    let driver = seeded_driver().await;
    assert_eq!(driver.count_rows("table1").await.unwrap(), 3);
}

#[tokio::test]
async fn count_rows_on_missing_table_fails_with_not_found() {
    let driver = connected_driver().await;
    match driver.count_rows("missing").await {
        Err(DriverError::NotFound(name)) => assert_eq!(name, "missing"),
        other => panic!("expected NotFound, got {:?}", other),
    }
}

#[tokio::test]
async fn get_rows_pages_in_stable_order() {
    let driver = seeded_driver().await;

    let page = driver.get_rows("table1", 2, 0).await.unwrap();
    assert_eq!(page.len(), 2);
    assert_eq!(page.rows[0]["number"], json!(1));

    let all = driver.get_rows("table1", 10, 0).await.unwrap();
    assert_eq!(all.len(), 3);

    let past_end = driver.get_rows("table1", 2, 5).await.unwrap();
    assert!(past_end.is_empty());
}

#[tokio::test]
async fn get_rows_with_zero_limit_returns_empty_page() {
    let driver = seeded_driver().await;
    let page = driver.get_rows("table1", 0, 0).await.unwrap();
    assert!(page.is_empty());
    assert_eq!(page.limit, 0);
}

#[tokio::test]
async fn get_rows_is_repeatable() {
    let driver = seeded_driver().await;
    let first = driver.get_rows("table1", 2, 1).await.unwrap();
    let second = driver.get_rows("table1", 2, 1).await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn get_rows_respects_limit_invariant() {
    let driver = seeded_driver().await;
    for limit in 0..5u64 {
        let page = driver.get_rows("table1", limit, 0).await.unwrap();
        assert!(page.len() as u64 <= limit);
    }
}

#[tokio::test]
async fn insert_rows_reports_inserted_count() {
    let driver = seeded_driver().await;
    let report = driver
        .insert_rows("table1", vec![row(json!({"hello": 1})), row(json!({"hello": 2}))])
        .await
        .unwrap();
    assert_eq!(report.inserted_count, 2);
    assert!(report.is_complete());
    assert_eq!(driver.count_rows("table1").await.unwrap(), 5);
}

#[tokio::test]
async fn insert_rows_on_missing_table_fails_with_not_found() {
    let driver = connected_driver().await;
    match driver.insert_rows("missing", default_rows()).await {
        Err(DriverError::NotFound(name)) => assert_eq!(name, "missing"),
        other => panic!("expected NotFound, got {:?}", other),
    }
}

#[tokio::test]
async fn rows_keep_field_order_through_a_copy() {
    // A one-table migration between two driver instances: the destination
    // must see the rows in source order with fields in source order.
    let source = seeded_driver().await;
    let mut dest = MemoryDriver::new(DriverConfig::new("localhost", 1, "dest"));
    dest.connect().await.unwrap();

    let tables = source.list_tables().await.unwrap();
    dest.create_tables(&tables).await.unwrap();

    for table in &tables {
        let total = source.count_rows(&table.name).await.unwrap();
        let mut offset = 0u64;
        while offset < total {
            let page = source.get_rows(&table.name, 2, offset).await.unwrap();
            offset += page.len() as u64;
            dest.insert_rows(&table.name, page.rows).await.unwrap();
        }
    }

    let copied = dest.get_rows("table1", 10, 0).await.unwrap();
    assert_eq!(copied.len(), 3);
    assert_eq!(copied.rows[0]["number"], json!(1));
    assert_eq!(copied.rows[2]["number"], json!(3));
}
