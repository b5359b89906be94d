//! MongoDB driver (document store).
//!
//! Collections are the engine's tables. Ordering key for pagination: `_id`
//! ascending - every MongoDB collection carries the `_id` index, so the order
//! is stable across calls against an unmodified collection and pagination is
//! resumable.
//!
//! MongoDB auto-creates collections on first insert, which would mask missing
//! tables; `count_rows`, `get_rows` and `insert_rows` therefore check
//! collection existence explicitly to honor the `NotFound` contract.

mod convert;

use std::time::Duration;

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{doc, Document};
use mongodb::error::{Error as MongoError, ErrorKind};
use mongodb::options::{ClientOptions, Credential, IndexOptions, ServerAddress};
use mongodb::{Client, Database, IndexModel};
use tracing::{debug, info, warn};

use crate::config::DriverConfig;
use crate::core::state::ConnectionState;
use crate::core::table::{FailedRow, InsertReport, TableDescriptor};
use crate::core::traits::Driver;
use crate::core::value::{Page, Row};
use crate::drivers::common::classify_connect_message;
use crate::error::{ConnectionError, DriverError, Result};

use self::convert::{document_to_row, row_to_document};

/// MongoDB server error codes classified as "already exists".
const NAMESPACE_EXISTS: i32 = 48;
const INDEX_OPTIONS_CONFLICT: i32 = 85;
const INDEX_KEY_SPECS_CONFLICT: i32 = 86;

struct MongoConn {
    client: Client,
    db: Database,
}

/// Driver for MongoDB.
pub struct MongoDriver {
    config: DriverConfig,
    state: ConnectionState<MongoConn>,
}

impl MongoDriver {
    /// Create an unconnected driver.
    pub fn new(config: DriverConfig) -> Self {
        Self {
            config,
            state: ConnectionState::NotConnected,
        }
    }

    fn db(&self) -> Result<&Database> {
        Ok(&self.state.handle()?.db)
    }

    /// Fail with `NotFound` unless the collection exists.
    ///
    /// MongoDB materializes collections lazily, so a plain query against a
    /// missing collection would silently return nothing.
    async fn ensure_collection(&self, db: &Database, table: &str) -> Result<()> {
        let names = db
            .list_collection_names()
            .await
            .map_err(|e| self.classify_op_error("checking collection existence", e))?;
        if names.iter().any(|n| n == table) {
            Ok(())
        } else {
            Err(DriverError::NotFound(table.to_string()))
        }
    }

    /// Wrap a native error from a data operation, detecting lost connections.
    fn classify_op_error(&self, context: &str, err: MongoError) -> DriverError {
        match &*err.kind {
            ErrorKind::Io(_) | ErrorKind::ServerSelection { .. } => {
                DriverError::Connection(classify_connect_message(
                    &self.config.endpoint(),
                    &err.to_string(),
                ))
            }
            _ => DriverError::unknown(context, err),
        }
    }
}

fn classify_connect_error(endpoint: &str, err: &MongoError) -> ConnectionError {
    if let ErrorKind::Authentication { message, .. } = &*err.kind {
        return ConnectionError::Unauthorized {
            native: message.clone(),
        };
    }
    classify_connect_message(endpoint, &err.to_string())
}

/// Classify a provisioning failure before deciding to swallow or propagate.
///
/// Explicit classification on the server error code, not a blanket catch, so
/// real provisioning failures still propagate. Only `AlreadyExists` is
/// recovered locally by `create_tables`.
fn classify_create_error(name: &str, err: &MongoError) -> DriverError {
    match &*err.kind {
        ErrorKind::Command(cmd)
            if matches!(
                cmd.code,
                NAMESPACE_EXISTS | INDEX_OPTIONS_CONFLICT | INDEX_KEY_SPECS_CONFLICT
            ) =>
        {
            DriverError::AlreadyExists(name.to_string())
        }
        _ => DriverError::unknown("provisioning table", err),
    }
}

/// Clamp a caller-supplied limit to what the wire format can carry.
fn clamp_limit(limit: u64) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}

/// Build the in-band report for a bulk insert that returned per-row write
/// errors. `inserted_count` comes from the native partial result, not from
/// arithmetic on the batch size.
fn insert_report_from_write_errors(
    rows: &[Row],
    inserted_count: u64,
    write_errors: impl IntoIterator<Item = (usize, String)>,
) -> InsertReport {
    let failed_rows = write_errors
        .into_iter()
        .map(|(index, message)| FailedRow {
            row: rows.get(index).cloned().unwrap_or_default(),
            reason: message,
        })
        .collect();
    InsertReport {
        inserted_count,
        failed_rows,
    }
}

#[async_trait]
impl Driver for MongoDriver {
    async fn connect(&mut self) -> std::result::Result<(), ConnectionError> {
        let endpoint = self.config.endpoint();
        let timeout = Duration::from_secs(self.config.connect_timeout_secs);

        let mut options = ClientOptions::default();
        options.hosts = vec![ServerAddress::Tcp {
            host: self.config.host.clone(),
            port: Some(self.config.port),
        }];
        options.direct_connection = Some(true);
        options.connect_timeout = Some(timeout);
        options.server_selection_timeout = Some(timeout);
        options.app_name = Some("nosql-migrate".to_string());
        if let Some(creds) = &self.config.credentials {
            options.credential = Some(
                Credential::builder()
                    .username(creds.user.clone())
                    .password(creds.password.clone())
                    .build(),
            );
        }

        let client =
            Client::with_options(options).map_err(|e| classify_connect_error(&endpoint, &e))?;
        let db = client.database(&self.config.database);

        // The client connects lazily; a ping forces the handshake so
        // connect-time failures surface here and not on the first operation.
        db.run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| classify_connect_error(&endpoint, &e))?;

        self.state.set_connected(MongoConn { client, db })?;
        info!(endpoint = %endpoint, database = %self.config.database, "connected to MongoDB");
        Ok(())
    }

    async fn close(&mut self) -> std::result::Result<(), ConnectionError> {
        let conn = self.state.take_for_close()?;
        conn.client.shutdown().await;
        debug!("MongoDB connection closed");
        Ok(())
    }

    async fn list_tables(&self) -> Result<Vec<TableDescriptor>> {
        let db = self.db()?;
        let names = db
            .list_collection_names()
            .await
            .map_err(|e| self.classify_op_error("listing collections", e))?;

        let mut tables = Vec::with_capacity(names.len());
        for name in names {
            let index_names = db
                .collection::<Document>(&name)
                .list_index_names()
                .await
                .map_err(|e| self.classify_op_error("listing indexes", e))?;
            // The implicit _id index exists on every collection and is not a
            // provisioned secondary index.
            let indexes = index_names.into_iter().filter(|n| n != "_id_").collect();
            tables.push(TableDescriptor::new(name).with_indexes(indexes));
        }
        Ok(tables)
    }

    async fn create_tables(&self, descriptors: &[TableDescriptor]) -> Result<()> {
        let db = self.db()?;
        let mut created: Vec<String> = Vec::new();

        for descriptor in descriptors {
            match db.create_collection(&descriptor.name).await {
                Ok(()) => debug!(collection = %descriptor.name, "created collection"),
                Err(e) => match classify_create_error(&descriptor.name, &e) {
                    DriverError::AlreadyExists(_) => {
                        debug!(collection = %descriptor.name, "collection already exists, skipping")
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

            let coll = db.collection::<Document>(&descriptor.name);
            for index in &descriptor.indexes {
                let mut options = IndexOptions::default();
                options.name = Some(index.clone());
                let model = IndexModel::builder()
                    .keys(doc! { index.as_str(): 1 })
                    .options(options)
                    .build();
                match coll.create_index(model).await {
                    Ok(_) => debug!(collection = %descriptor.name, index = %index, "created index"),
                    Err(e) => match classify_create_error(index, &e) {
                        DriverError::AlreadyExists(_) => {
                            debug!(collection = %descriptor.name, index = %index, "index already exists, skipping")
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
            }

            created.push(descriptor.name.clone());
        }
        Ok(())
    }

    async fn count_rows(&self, table: &str) -> Result<u64> {
        let db = self.db()?;
        self.ensure_collection(db, table).await?;
        db.collection::<Document>(table)
            .count_documents(Document::new())
            .await
            .map_err(|e| self.classify_op_error("counting rows", e))
    }

    async fn get_rows(&self, table: &str, limit: u64, offset: u64) -> Result<Page> {
        let db = self.db()?;
        self.ensure_collection(db, table).await?;

        // MongoDB treats limit 0 as "no limit"; the contract says empty page.
        if limit == 0 {
            return Ok(Page::empty(limit, offset));
        }

        let mut cursor = db
            .collection::<Document>(table)
            .find(Document::new())
            .sort(doc! { "_id": 1 })
            .skip(offset)
            .limit(clamp_limit(limit))
            .await
            .map_err(|e| self.classify_op_error("reading rows", e))?;

        let mut rows = Vec::new();
        while let Some(document) = cursor
            .try_next()
            .await
            .map_err(|e| self.classify_op_error("draining cursor", e))?
        {
            rows.push(document_to_row(document)?);
        }
        Ok(Page {
            rows,
            limit,
            offset,
        })
    }

    async fn insert_rows(&self, table: &str, rows: Vec<Row>) -> Result<InsertReport> {
        let db = self.db()?;
        self.ensure_collection(db, table).await?;

        if rows.is_empty() {
            return Ok(InsertReport::default());
        }

        let mut documents = Vec::with_capacity(rows.len());
        for row in &rows {
            documents.push(row_to_document(row.clone())?);
        }

        // Unordered insert: the server attempts every document and reports
        // per-index write errors instead of stopping at the first one.
        let result = db
            .collection::<Document>(table)
            .insert_many(documents)
            .ordered(false)
            .await;

        match result {
            Ok(outcome) => Ok(InsertReport {
                inserted_count: outcome.inserted_ids.len() as u64,
                failed_rows: Vec::new(),
            }),
            Err(e) => {
                let partial = match &*e.kind {
                    ErrorKind::InsertMany(insert_err) => {
                        let write_errors: Vec<(usize, String)> = insert_err
                            .write_errors
                            .iter()
                            .flatten()
                            .map(|we| (we.index, we.message.clone()))
                            .collect();
                        // No per-row rejections means the failure is
                        // batch-wide (e.g. a write concern error) and must
                        // propagate, not masquerade as a clean report. A
                        // write-concern error alongside per-row errors also
                        // propagates: the per-row arithmetic below is only
                        // sound when the indexed write errors are the whole
                        // story.
                        if write_errors.is_empty() || insert_err.write_concern_error.is_some() {
                            None
                        } else {
                            // Unordered insert: every row either landed or
                            // carries an indexed write error, so the native
                            // partial result is batch size minus rejections.
                            let inserted_count = rows.len() as u64 - write_errors.len() as u64;
                            Some(insert_report_from_write_errors(
                                &rows,
                                inserted_count,
                                write_errors,
                            ))
                        }
                    }
                    _ => None,
                };
                match partial {
                    Some(report) => {
                        warn!(
                            table = %table,
                            failed = report.failed_rows.len(),
                            "bulk insert completed with per-row failures"
                        );
                        Ok(report)
                    }
                    None => Err(self.classify_op_error("inserting rows", e)),
                }
            }
        }
    }

    fn db_type(&self) -> &str {
        "mongodb"
    }
}
