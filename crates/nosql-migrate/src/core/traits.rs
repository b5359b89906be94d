//! The uniform driver contract.
//!
//! Every concrete engine driver (document store, wide-column store, in-memory
//! reference) implements [`Driver`] with identical external semantics, even
//! though translation to the native client differs completely. The
//! orchestration layer is written once against this trait and never touches
//! an engine-specific type.

use async_trait::async_trait;

use crate::error::{ConnectionError, Result};

use super::table::{InsertReport, TableDescriptor};
use super::value::{Page, Row};

/// Uniform database-operation contract for migration drivers.
///
/// # Lifecycle
///
/// A driver is constructed from a [`DriverConfig`](crate::config::DriverConfig)
/// in the NotConnected state. `connect` must succeed before any other
/// operation; everything else fails fast with
/// [`DriverError::NotConnected`](crate::error::DriverError::NotConnected)
/// until then, and again after `close`.
///
/// # Concurrency
///
/// One driver owns one connection and is intended for one logical task at a
/// time. Concurrent migrations across tables should use one driver instance
/// each rather than sharing a connection.
#[async_trait]
pub trait Driver: Send + Sync {
    /// Open the connection and select the configured database namespace.
    ///
    /// Does not create the database; provisioning belongs to
    /// [`create_tables`](Driver::create_tables).
    async fn connect(&mut self) -> std::result::Result<(), ConnectionError>;

    /// Release the connection.
    ///
    /// Not idempotent: a second call fails with
    /// [`ConnectionError::AlreadyClosed`].
    async fn close(&mut self) -> std::result::Result<(), ConnectionError>;

    /// List every table/collection visible in the active database.
    ///
    /// Order is engine-native; callers must sort if they need determinism.
    async fn list_tables(&self) -> Result<Vec<TableDescriptor>>;

    /// Create each named table (and its secondary indexes) if absent.
    ///
    /// Creating a table that already exists is success, not an error. A
    /// failure for any other reason aborts the batch and reports which
    /// tables were created before the failure.
    async fn create_tables(&self, tables: &[TableDescriptor]) -> Result<()>;

    /// Exact current row count of `table`.
    async fn count_rows(&self, table: &str) -> Result<u64>;

    /// Read up to `limit` rows starting at `offset`.
    ///
    /// Rows follow the driver's documented ordering key, stable across calls
    /// against an unmodified table, so pagination is resumable. `limit == 0`
    /// and an offset past the end both return an empty page.
    async fn get_rows(&self, table: &str, limit: u64, offset: u64) -> Result<Page>;

    /// Bulk-insert `rows` into `table`.
    ///
    /// Every row in the batch is attempted; per-row rejections are reported
    /// in the [`InsertReport`], not as an error. The call itself fails only
    /// when the whole batch is impossible (missing table, lost connection).
    async fn insert_rows(&self, table: &str, rows: Vec<Row>) -> Result<InsertReport>;

    /// Engine identifier (e.g. "mongodb", "scylla").
    fn db_type(&self) -> &str;
}
