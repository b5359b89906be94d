//! Live MongoDB integration tests.
//!
//! Ignored by default; they need a MongoDB instance without auth. Point
//! `MONGO_TEST_HOST` / `MONGO_TEST_PORT` at it (default localhost:27017) and
//! run with `--ignored`.

use serde_json::json;

use nosql_migrate::{
    ConnectionError, Driver, DriverConfig, DriverError, MongoDriver, Row, TableDescriptor,
};

fn test_config() -> DriverConfig {
    let host = std::env::var("MONGO_TEST_HOST").unwrap_or_else(|_| "localhost".into());
    let port = std::env::var("MONGO_TEST_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(27017);
    DriverConfig::new(host, port, "nosql_migrate_test")
}

fn row(value: serde_json::Value) -> Row {
    value.as_object().unwrap().clone()
}

async fn connected() -> MongoDriver {
    init_logging();
    let mut driver = MongoDriver::new(test_config());
    driver.connect().await.expect("live MongoDB required");
    driver
}

/// Driver logs go to stderr when RUST_LOG is set; repeated calls are no-ops.
fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Fresh table seeded with {number:1..3}.
///
/// Drop is not part of the migration contract, so the suite cannot clear
/// leftovers itself; a table dirtied by a previous run fails fast here
/// instead of skewing the counts below.
async fn seed(driver: &MongoDriver, table: &str) {
    driver
        .create_tables(&[TableDescriptor::new(table)])
        .await
        .unwrap();
    let existing = driver.count_rows(table).await.unwrap();
    if existing > 0 {
        panic!(
            "table '{}' is not empty; drop the nosql_migrate_test database before running",
            table
        );
    }
    driver
        .insert_rows(
            table,
            vec![
                row(json!({"number": 1})),
                row(json!({"number": 2})),
                row(json!({"number": 3})),
            ],
        )
        .await
        .unwrap();
}

#[tokio::test]
#[ignore = "requires a live MongoDB instance"]
async fn connect_and_close() {
    let mut driver = connected().await;
    driver.close().await.unwrap();
    assert!(matches!(
        driver.close().await,
        Err(ConnectionError::AlreadyClosed)
    ));
}

#[tokio::test]
#[ignore = "requires a live MongoDB instance"]
async fn connect_to_closed_port_is_refused() {
    let mut config = test_config();
    config.port = 9;
    config.connect_timeout_secs = 3;

    let mut driver = MongoDriver::new(config);
    match driver.connect().await {
        Err(ConnectionError::Refused { native, .. }) => {
            assert!(
                native.to_lowercase().contains("refused") || native.contains("os error"),
                "diagnostic should carry the transport refusal: {}",
                native
            );
        }
        other => panic!("expected Refused, got {:?}", other),
    }
}

#[tokio::test]
#[ignore = "requires a live MongoDB instance"]
async fn create_is_idempotent_and_listed() {
    let driver = connected().await;
    let descriptor = TableDescriptor::new("idempotent_create")
        .with_indexes(vec!["exampleIndex".to_string()]);

    driver.create_tables(&[descriptor.clone()]).await.unwrap();
    driver.create_tables(&[descriptor]).await.unwrap();

    let tables = driver.list_tables().await.unwrap();
    let matching: Vec<_> = tables
        .iter()
        .filter(|t| t.name == "idempotent_create")
        .collect();
    assert_eq!(matching.len(), 1);
    assert!(matching[0].indexes.iter().any(|i| i == "exampleIndex"));
}

#[tokio::test]
#[ignore = "requires a live MongoDB instance"]
async fn count_and_page_rows() {
    let driver = connected().await;
    seed(&driver, "paging").await;

    assert_eq!(driver.count_rows("paging").await.unwrap(), 3);

    let page = driver.get_rows("paging", 2, 0).await.unwrap();
    assert_eq!(page.len(), 2);
    assert_eq!(page.rows[0]["number"], json!(1));

    assert_eq!(driver.get_rows("paging", 10, 0).await.unwrap().len(), 3);
    assert!(driver.get_rows("paging", 2, 5).await.unwrap().is_empty());
    assert!(driver.get_rows("paging", 0, 0).await.unwrap().is_empty());

    let first = driver.get_rows("paging", 2, 1).await.unwrap();
    let second = driver.get_rows("paging", 2, 1).await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
#[ignore = "requires a live MongoDB instance"]
async fn insert_into_missing_collection_is_not_found() {
    let driver = connected().await;
    match driver
        .insert_rows("never_created", vec![row(json!({"number": 1}))])
        .await
    {
        Err(DriverError::NotFound(name)) => assert_eq!(name, "never_created"),
        other => panic!("expected NotFound, got {:?}", other),
    }
}

#[tokio::test]
#[ignore = "requires a live MongoDB instance"]
async fn duplicate_ids_are_reported_in_band() {
    let driver = connected().await;
    driver
        .create_tables(&[TableDescriptor::new("dup_ids")])
        .await
        .unwrap();

    let rows = vec![
        row(json!({"_id": 1, "v": "a"})),
        row(json!({"_id": 1, "v": "b"})),
        row(json!({"_id": 2, "v": "c"})),
    ];
    let report = driver.insert_rows("dup_ids", rows).await.unwrap();

    assert_eq!(report.inserted_count, 2);
    assert_eq!(report.failed_rows.len(), 1);
    assert!(report.failed_rows[0].reason.to_lowercase().contains("duplicate"));
}
