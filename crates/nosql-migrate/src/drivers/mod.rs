//! Concrete driver implementations.
//!
//! - [`mongo`]: MongoDB (document store)
//! - [`scylla`]: ScyllaDB/Cassandra (wide-column store)
//! - [`memory`]: in-process reference driver used by the contract tests
//! - [`common`]: shared utilities (connection error classification)
//!
//! # Adding a new engine
//!
//! 1. Create a module under `drivers/` implementing [`Driver`]
//! 2. Document the engine's deterministic pagination ordering key
//! 3. Add an enum variant to [`DriverImpl`] and register it in
//!    [`DriverImpl::from_db_type`]

pub mod common;
pub mod memory;
pub mod mongo;
pub mod scylla;

pub use self::memory::MemoryDriver;
pub use self::mongo::MongoDriver;
pub use self::scylla::ScyllaDriver;

use async_trait::async_trait;

use crate::config::DriverConfig;
use crate::core::table::{InsertReport, TableDescriptor};
use crate::core::traits::Driver;
use crate::core::value::{Page, Row};
use crate::error::{ConnectionError, DriverError, Result};

/// Enum-based static dispatch over the concrete drivers.
///
/// Orchestration code that knows its engines at compile time can hold this
/// instead of a `Box<dyn Driver>`; both implement the same contract.
pub enum DriverImpl {
    Mongo(MongoDriver),
    Scylla(ScyllaDriver),
    Memory(MemoryDriver),
}

impl DriverImpl {
    /// Create a driver from an engine type string and configuration.
    ///
    /// Validates the configuration before constructing the driver.
    pub fn from_db_type(db_type: &str, config: DriverConfig) -> Result<Self> {
        crate::config::validate(&config)?;
        match db_type.to_lowercase().as_str() {
            "mongodb" | "mongo" => Ok(DriverImpl::Mongo(MongoDriver::new(config))),
            "scylla" | "scylladb" | "cassandra" => {
                Ok(DriverImpl::Scylla(ScyllaDriver::new(config)))
            }
            "memory" => Ok(DriverImpl::Memory(MemoryDriver::new(config))),
            other => Err(DriverError::unknown(
                "driver selection",
                format!(
                    "unknown database type '{}'; supported: mongodb, scylla, memory",
                    other
                ),
            )),
        }
    }
}

#[async_trait]
impl Driver for DriverImpl {
    async fn connect(&mut self) -> std::result::Result<(), ConnectionError> {
        match self {
            DriverImpl::Mongo(d) => d.connect().await,
            DriverImpl::Scylla(d) => d.connect().await,
            DriverImpl::Memory(d) => d.connect().await,
        }
    }

    async fn close(&mut self) -> std::result::Result<(), ConnectionError> {
        match self {
            DriverImpl::Mongo(d) => d.close().await,
            DriverImpl::Scylla(d) => d.close().await,
            DriverImpl::Memory(d) => d.close().await,
        }
    }

    async fn list_tables(&self) -> Result<Vec<TableDescriptor>> {
        match self {
            DriverImpl::Mongo(d) => d.list_tables().await,
            DriverImpl::Scylla(d) => d.list_tables().await,
            DriverImpl::Memory(d) => d.list_tables().await,
        }
    }

    async fn create_tables(&self, tables: &[TableDescriptor]) -> Result<()> {
        match self {
            DriverImpl::Mongo(d) => d.create_tables(tables).await,
            DriverImpl::Scylla(d) => d.create_tables(tables).await,
            DriverImpl::Memory(d) => d.create_tables(tables).await,
        }
    }

    async fn count_rows(&self, table: &str) -> Result<u64> {
        match self {
            DriverImpl::Mongo(d) => d.count_rows(table).await,
            DriverImpl::Scylla(d) => d.count_rows(table).await,
            DriverImpl::Memory(d) => d.count_rows(table).await,
        }
    }

    async fn get_rows(&self, table: &str, limit: u64, offset: u64) -> Result<Page> {
        match self {
            DriverImpl::Mongo(d) => d.get_rows(table, limit, offset).await,
            DriverImpl::Scylla(d) => d.get_rows(table, limit, offset).await,
            DriverImpl::Memory(d) => d.get_rows(table, limit, offset).await,
        }
    }

    async fn insert_rows(&self, table: &str, rows: Vec<Row>) -> Result<InsertReport> {
        match self {
            DriverImpl::Mongo(d) => d.insert_rows(table, rows).await,
            DriverImpl::Scylla(d) => d.insert_rows(table, rows).await,
            DriverImpl::Memory(d) => d.insert_rows(table, rows).await,
        }
    }

    fn db_type(&self) -> &str {
        match self {
            DriverImpl::Mongo(d) => d.db_type(),
            DriverImpl::Scylla(d) => d.db_type(),
            DriverImpl::Memory(d) => d.db_type(),
        }
    }
}
