//! ScyllaDB/Cassandra driver (wide-column store).
//!
//! Schemaless rows have no native home in a wide-column engine, so this
//! driver provisions document-carrier tables (see [`ddl`]) that store each
//! row as JSON text keyed by a monotonically assigned `seq` clustering
//! column. Ordering key for pagination: `(bucket, seq)` clustering order,
//! which CQL guarantees stable for an unmodified table.
//!
//! The driver reads and writes tables in this layout; foreign tables with
//! arbitrary column sets are outside its contract. The keyspace is created
//! during table provisioning, never at connect time.

mod ddl;

use std::time::Duration;

use async_trait::async_trait;
use scylla::transport::errors::{DbError, NewSessionError, QueryError};
use scylla::{Session, SessionBuilder};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::DriverConfig;
use crate::core::state::ConnectionState;
use crate::core::table::{FailedRow, InsertReport, TableDescriptor};
use crate::core::traits::Driver;
use crate::core::value::{row_from_value, Page, Row};
use crate::drivers::common::classify_connect_message;
use crate::error::{ConnectionError, DriverError, Result};

/// Driver for ScyllaDB (and Cassandra-compatible engines speaking CQL).
pub struct ScyllaDriver {
    config: DriverConfig,
    state: ConnectionState<Session>,
}

impl ScyllaDriver {
    /// Create an unconnected driver.
    pub fn new(config: DriverConfig) -> Self {
        Self {
            config,
            state: ConnectionState::NotConnected,
        }
    }

    fn keyspace(&self) -> &str {
        &self.config.database
    }

    /// Wrap a native error from a data operation, detecting lost connections.
    fn classify_op_error(&self, context: &str, err: QueryError) -> DriverError {
        let text = err.to_string();
        let lowered = text.to_lowercase();
        if lowered.contains("broken connection") || lowered.contains("connection refused") {
            DriverError::Connection(classify_connect_message(&self.config.endpoint(), &text))
        } else {
            DriverError::unknown(context, text)
        }
    }

    /// Fail with `NotFound` unless the table exists in the keyspace.
    async fn ensure_table(&self, session: &Session, table: &str) -> Result<()> {
        let result = session
            .query_unpaged(ddl::table_exists_cql(), (self.keyspace(), table))
            .await
            .map_err(|e| self.classify_op_error("checking table existence", e))?;
        let rows = result
            .into_rows_result()
            .map_err(|e| DriverError::unknown("checking table existence", e))?;
        if rows.rows_num() > 0 {
            Ok(())
        } else {
            Err(DriverError::NotFound(table.to_string()))
        }
    }

    /// Highest assigned `seq` in the table, or -1 when empty.
    async fn max_seq(&self, session: &Session, table: &str) -> Result<i64> {
        let result = session
            .query_unpaged(ddl::max_seq_cql(self.keyspace(), table), ())
            .await
            .map_err(|e| self.classify_op_error("reading max seq", e))?;
        let rows = result
            .into_rows_result()
            .map_err(|e| DriverError::unknown("reading max seq", e))?;
        let mut iter = rows
            .rows::<(Option<i64>,)>()
            .map_err(|e| DriverError::unknown("reading max seq", e))?;
        match iter.next() {
            Some(row) => {
                let (max,) = row.map_err(|e| DriverError::unknown("reading max seq", e))?;
                Ok(max.unwrap_or(-1))
            }
            None => Ok(-1),
        }
    }
}

fn classify_session_error(endpoint: &str, err: &NewSessionError) -> ConnectionError {
    if let NewSessionError::DbError(DbError::AuthenticationError, message) = err {
        return ConnectionError::Unauthorized {
            native: message.clone(),
        };
    }
    classify_connect_message(endpoint, &err.to_string())
}

/// Classify a provisioning failure before deciding to swallow or propagate.
///
/// Only `AlreadyExists` is recovered locally by `create_tables`.
fn classify_create_error(name: &str, err: &QueryError) -> DriverError {
    match err {
        QueryError::DbError(DbError::AlreadyExists { .. }, _) => {
            DriverError::AlreadyExists(name.to_string())
        }
        _ => DriverError::unknown("provisioning table", err),
    }
}

#[async_trait]
impl Driver for ScyllaDriver {
    async fn connect(&mut self) -> std::result::Result<(), ConnectionError> {
        let endpoint = self.config.endpoint();
        let mut builder = SessionBuilder::new()
            .known_node(&endpoint)
            .connection_timeout(Duration::from_secs(self.config.connect_timeout_secs));
        if let Some(creds) = &self.config.credentials {
            builder = builder.user(creds.user.clone(), creds.password.clone());
        }

        let session = builder
            .build()
            .await
            .map_err(|e| classify_session_error(&endpoint, &e))?;

        // The keyspace is addressed by qualified names rather than USE, so
        // connecting does not require (or create) it.
        self.state.set_connected(session)?;
        info!(endpoint = %endpoint, keyspace = %self.config.database, "connected to ScyllaDB");
        Ok(())
    }

    async fn close(&mut self) -> std::result::Result<(), ConnectionError> {
        // Dropping the session tears down its connections.
        let _session = self.state.take_for_close()?;
        debug!("ScyllaDB session closed");
        Ok(())
    }

    async fn list_tables(&self) -> Result<Vec<TableDescriptor>> {
        let session = self.state.handle()?;
        let result = session
            .query_unpaged(ddl::list_tables_cql(), (self.keyspace(),))
            .await
            .map_err(|e| self.classify_op_error("listing tables", e))?;
        let rows = result
            .into_rows_result()
            .map_err(|e| DriverError::unknown("listing tables", e))?;

        let mut tables = Vec::new();
        for row in rows
            .rows::<(String,)>()
            .map_err(|e| DriverError::unknown("listing tables", e))?
        {
            let (name,) = row.map_err(|e| DriverError::unknown("listing tables", e))?;
            tables.push(TableDescriptor::new(name));
        }
        Ok(tables)
    }

    async fn create_tables(&self, descriptors: &[TableDescriptor]) -> Result<()> {
        let session = self.state.handle()?;

        session
            .query_unpaged(ddl::create_keyspace_cql(self.keyspace()), ())
            .await
            .map_err(|e| self.classify_op_error("creating keyspace", e))?;

        let mut created: Vec<String> = Vec::new();
        for descriptor in descriptors {
            match session
                .query_unpaged(ddl::create_table_cql(self.keyspace(), &descriptor.name), ())
                .await
            {
                Ok(_) => debug!(table = %descriptor.name, "created table"),
                Err(e) => match classify_create_error(&descriptor.name, &e) {
                    DriverError::AlreadyExists(_) => {
                        debug!(table = %descriptor.name, "table already exists, skipping")
                    }
                    _ => {
                        return Err(DriverError::PartialFailure {
                            created,
                            failed: descriptor.name.clone(),
                            native: e.to_string(),
                        })
                    }
                },
            }

            // Secondary indexes address fields inside the JSON payload,
            // which CQL secondary indexes cannot reach.
            for index in &descriptor.indexes {
                warn!(
                    table = %descriptor.name,
                    index = %index,
                    "secondary indexes are not supported on document-carrier tables, skipping"
                );
            }

            created.push(descriptor.name.clone());
        }
        Ok(())
    }

    async fn count_rows(&self, table: &str) -> Result<u64> {
        let session = self.state.handle()?;
        self.ensure_table(session, table).await?;

        let result = session
            .query_unpaged(ddl::count_rows_cql(self.keyspace(), table), ())
            .await
            .map_err(|e| self.classify_op_error("counting rows", e))?;
        let rows = result
            .into_rows_result()
            .map_err(|e| DriverError::unknown("counting rows", e))?;
        let mut iter = rows
            .rows::<(i64,)>()
            .map_err(|e| DriverError::unknown("counting rows", e))?;
        match iter.next() {
            Some(row) => {
                let (count,) = row.map_err(|e| DriverError::unknown("counting rows", e))?;
                Ok(count.max(0) as u64)
            }
            None => Ok(0),
        }
    }

    async fn get_rows(&self, table: &str, limit: u64, offset: u64) -> Result<Page> {
        let session = self.state.handle()?;
        self.ensure_table(session, table).await?;

        if limit == 0 {
            return Ok(Page::empty(limit, offset));
        }

        // No OFFSET in CQL: fetch the first offset+limit rows in clustering
        // order and drop the prefix client-side.
        let total = offset.saturating_add(limit);
        let fetch = i32::try_from(total).unwrap_or(i32::MAX);

        let result = session
            .query_unpaged(ddl::select_rows_cql(self.keyspace(), table), (fetch,))
            .await
            .map_err(|e| self.classify_op_error("reading rows", e))?;
        let rows_result = result
            .into_rows_result()
            .map_err(|e| DriverError::unknown("reading rows", e))?;

        let mut rows = Vec::new();
        for row in rows_result
            .rows::<(String,)>()
            .map_err(|e| DriverError::unknown("reading rows", e))?
            .skip(offset as usize)
        {
            let (doc,) = row.map_err(|e| DriverError::unknown("reading rows", e))?;
            let value: Value = serde_json::from_str(&doc)
                .map_err(|e| DriverError::unknown("decoding stored document", e))?;
            let row = row_from_value(value).ok_or_else(|| {
                DriverError::unknown("decoding stored document", "document is not a JSON object")
            })?;
            rows.push(row);
        }
        Ok(Page {
            rows,
            limit,
            offset,
        })
    }

    async fn insert_rows(&self, table: &str, rows: Vec<Row>) -> Result<InsertReport> {
        let session = self.state.handle()?;
        self.ensure_table(session, table).await?;

        if rows.is_empty() {
            return Ok(InsertReport::default());
        }

        // Single-writer seq assignment: sound for a migration task, which is
        // the one-driver-one-task usage this layer is contracted for.
        let base = self.max_seq(session, table).await?;
        let prepared = session
            .prepare(ddl::insert_row_cql(self.keyspace(), table))
            .await
            .map_err(|e| self.classify_op_error("preparing insert", e))?;

        let mut report = InsertReport::default();
        for (i, row) in rows.into_iter().enumerate() {
            let seq = base + 1 + i as i64;
            let doc = serde_json::to_string(&Value::Object(row.clone()))
                .map_err(|e| DriverError::unknown("encoding row", e))?;

            match session.execute_unpaged(&prepared, (seq, doc)).await {
                Ok(_) => report.inserted_count += 1,
                // A DbError is this row being rejected server-side; anything
                // else means the batch as a whole can no longer proceed.
                Err(QueryError::DbError(db_err, message)) => {
                    report.failed_rows.push(FailedRow {
                        row,
                        reason: format!("{}: {}", db_err, message),
                    });
                }
                Err(e) => return Err(self.classify_op_error("inserting rows", e)),
            }
        }

        if !report.is_complete() {
            warn!(
                table = %table,
                failed = report.failed_rows.len(),
                "bulk insert completed with per-row failures"
            );
        }
        Ok(report)
    }

    fn db_type(&self) -> &str {
        "scylla"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_error_classification() {
        let exists = QueryError::DbError(
            DbError::AlreadyExists {
                keyspace: "app".to_string(),
                table: "events".to_string(),
            },
            "table events already exists".to_string(),
        );
        assert!(matches!(
            classify_create_error("events", &exists),
            DriverError::AlreadyExists(name) if name == "events"
        ));

        let other = QueryError::DbError(DbError::Invalid, "malformed query".to_string());
        assert!(matches!(
            classify_create_error("events", &other),
            DriverError::Unknown { .. }
        ));
    }

    #[tokio::test]
    async fn test_operations_fail_before_connect() {
        let driver = ScyllaDriver::new(DriverConfig::new("localhost", 9042, "app"));
        assert!(matches!(
            driver.list_tables().await,
            Err(DriverError::NotConnected)
        ));
        assert!(matches!(
            driver.count_rows("t").await,
            Err(DriverError::NotConnected)
        ));
    }

    #[tokio::test]
    async fn test_close_before_connect_is_already_closed() {
        let mut driver = ScyllaDriver::new(DriverConfig::new("localhost", 9042, "app"));
        assert!(matches!(
            driver.close().await,
            Err(ConnectionError::AlreadyClosed)
        ));
    }
}
