//! Table descriptors and bulk-insert reporting.

use serde::{Deserialize, Serialize};

use super::value::Row;

/// An existing or to-be-created table/collection.
///
/// Equality and hashing are by `name` within one database; the index list is
/// provisioning detail, not identity.
#[derive(Debug, Clone, Serialize, Deserialize, Eq)]
pub struct TableDescriptor {
    /// Table/collection name.
    pub name: String,

    /// Secondary indexes to provision with the table.
    ///
    /// Index creation follows the same idempotent-on-exists policy as table
    /// creation. Drivers that cannot express an index over schemaless rows
    /// log and skip these.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub indexes: Vec<String>,
}

impl TableDescriptor {
    /// Descriptor for a plain table with no secondary indexes.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            indexes: Vec::new(),
        }
    }

    /// Attach secondary index names.
    pub fn with_indexes(mut self, indexes: Vec<String>) -> Self {
        self.indexes = indexes;
        self
    }
}

impl PartialEq for TableDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl std::hash::Hash for TableDescriptor {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

/// Outcome of a bulk insert.
///
/// The batch is attempted in full; rows the engine rejects are reported here
/// in-band rather than failing the call. Only batch-wide conditions (missing
/// table, connection lost mid-batch) surface as a `DriverError`.
#[derive(Debug, Clone, Default)]
pub struct InsertReport {
    /// Number of rows the engine accepted.
    pub inserted_count: u64,

    /// Rows the engine rejected, with the native rejection reason.
    pub failed_rows: Vec<FailedRow>,
}

impl InsertReport {
    /// Whether every row in the batch was accepted.
    pub fn is_complete(&self) -> bool {
        self.failed_rows.is_empty()
    }
}

/// One rejected row from a bulk insert.
#[derive(Debug, Clone)]
pub struct FailedRow {
    /// The row as submitted.
    pub row: Row,
    /// Native engine reason for the rejection.
    pub reason: String,
}
