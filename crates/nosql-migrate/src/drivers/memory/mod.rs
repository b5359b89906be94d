//! In-process reference driver.
//!
//! Implements the full contract against a table registry held in memory.
//! Used by the contract test suite and as the executable description of the
//! semantics every network driver must match.
//!
//! Ordering key: insertion order. Rows are returned exactly in the order they
//! were inserted, so pagination is trivially stable. `list_tables` returns
//! names in lexicographic order (this driver's "engine-native" order).

use std::collections::BTreeMap;

use async_trait::async_trait;
use tracing::debug;

use crate::config::DriverConfig;
use crate::core::state::ConnectionState;
use crate::core::table::{InsertReport, TableDescriptor};
use crate::core::traits::Driver;
use crate::core::value::{Page, Row};
use crate::error::{ConnectionError, DriverError, Result};

#[derive(Debug, Default)]
struct MemoryTable {
    indexes: Vec<String>,
    rows: Vec<Row>,
}

/// The in-memory "database": one registry per connection.
#[derive(Debug, Default)]
struct MemoryConn {
    tables: std::sync::Mutex<BTreeMap<String, MemoryTable>>,
}

/// Driver over an in-process table registry.
pub struct MemoryDriver {
    config: DriverConfig,
    state: ConnectionState<MemoryConn>,
}

impl MemoryDriver {
    /// Create an unconnected driver.
    pub fn new(config: DriverConfig) -> Self {
        Self {
            config,
            state: ConnectionState::NotConnected,
        }
    }

    fn with_tables<T>(
        &self,
        f: impl FnOnce(&mut BTreeMap<String, MemoryTable>) -> Result<T>,
    ) -> Result<T> {
        let conn = self.state.handle()?;
        let mut tables = conn
            .tables
            .lock()
            .map_err(|e| DriverError::unknown("memory registry", e))?;
        f(&mut tables)
    }
}

#[async_trait]
impl Driver for MemoryDriver {
    async fn connect(&mut self) -> std::result::Result<(), ConnectionError> {
        self.state.set_connected(MemoryConn::default())?;
        debug!(
            database = %self.config.database,
            "memory driver connected"
        );
        Ok(())
    }

    async fn close(&mut self) -> std::result::Result<(), ConnectionError> {
        self.state.take_for_close()?;
        debug!("memory driver closed");
        Ok(())
    }

    async fn list_tables(&self) -> Result<Vec<TableDescriptor>> {
        self.with_tables(|tables| {
            Ok(tables
                .iter()
                .map(|(name, t)| TableDescriptor::new(name).with_indexes(t.indexes.clone()))
                .collect())
        })
    }

    async fn create_tables(&self, descriptors: &[TableDescriptor]) -> Result<()> {
        self.with_tables(|tables| {
            for descriptor in descriptors {
                let entry = tables.entry(descriptor.name.clone()).or_default();
                // Idempotent: an existing table is left untouched, new index
                // names are merged in.
                for index in &descriptor.indexes {
                    if !entry.indexes.contains(index) {
                        entry.indexes.push(index.clone());
                    }
                }
            }
            Ok(())
        })
    }

    async fn count_rows(&self, table: &str) -> Result<u64> {
        self.with_tables(|tables| {
            let t = tables
                .get(table)
                .ok_or_else(|| DriverError::NotFound(table.to_string()))?;
            Ok(t.rows.len() as u64)
        })
    }

    async fn get_rows(&self, table: &str, limit: u64, offset: u64) -> Result<Page> {
        self.with_tables(|tables| {
            let t = tables
                .get(table)
                .ok_or_else(|| DriverError::NotFound(table.to_string()))?;
            let rows = t
                .rows
                .iter()
                .skip(offset as usize)
                .take(limit as usize)
                .cloned()
                .collect();
            Ok(Page {
                rows,
                limit,
                offset,
            })
        })
    }

    async fn insert_rows(&self, table: &str, rows: Vec<Row>) -> Result<InsertReport> {
        self.with_tables(|tables| {
            let t = tables
                .get_mut(table)
                .ok_or_else(|| DriverError::NotFound(table.to_string()))?;
            let inserted_count = rows.len() as u64;
            t.rows.extend(rows);
            Ok(InsertReport {
                inserted_count,
                failed_rows: Vec::new(),
            })
        })
    }

    fn db_type(&self) -> &str {
        "memory"
    }
}
