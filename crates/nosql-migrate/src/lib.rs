//! # nosql-migrate
//!
//! Uniform driver layer for migrating data between heterogeneous NoSQL
//! engines (document stores, wide-column stores).
//!
//! Every engine is driven through the same contract - connect, list tables,
//! create tables, count rows, page rows, bulk-insert rows - so a migration
//! engine written against [`Driver`] is engine-agnostic:
//!
//! - **Deterministic pagination**: each driver documents one stable ordering
//!   key, making offset/limit reads resumable mid-migration
//! - **Idempotent provisioning**: creating a table that already exists is
//!   success, classified on the native error
//! - **Partial-failure bulk insert**: rejected rows are reported in-band,
//!   never by aborting the batch
//! - **Normalized errors**: native client failures are wrapped into one
//!   taxonomy, with the engine's message preserved for diagnostics
//!
//! ## Example
//!
//! ```rust,no_run
//! use nosql_migrate::{Driver, DriverConfig, DriverImpl, TableDescriptor};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = DriverConfig::new("localhost", 27017, "inventory");
//!     let mut source = DriverImpl::from_db_type("mongodb", config)?;
//!     source.connect().await?;
//!
//!     for table in source.list_tables().await? {
//!         let total = source.count_rows(&table.name).await?;
//!         println!("{}: {} rows", table.name, total);
//!     }
//!
//!     source.close().await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod core;
pub mod drivers;
pub mod error;

// Re-exports for convenient access
pub use self::config::{Credentials, DriverConfig};
pub use self::core::{Driver, FailedRow, InsertReport, Page, Row, TableDescriptor};
pub use self::drivers::{DriverImpl, MemoryDriver, MongoDriver, ScyllaDriver};
pub use self::error::{ConnectionError, DriverError, Result};
