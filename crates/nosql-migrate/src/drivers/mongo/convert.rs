//! BSON <-> row conversion.
//!
//! Rows cross the driver boundary as ordered JSON maps; MongoDB speaks BSON
//! documents. Relaxed extended JSON is used in the BSON -> row direction so
//! types without a JSON equivalent (ObjectId, dates, binary) survive a
//! round trip through another engine.

use mongodb::bson::{Bson, Document};
use serde_json::Value;

use crate::core::value::{row_from_value, Row};
use crate::error::{DriverError, Result};

/// Convert a BSON document into a row, preserving field order.
pub fn document_to_row(doc: Document) -> Result<Row> {
    let value = Bson::Document(doc).into_relaxed_extjson();
    row_from_value(value)
        .ok_or_else(|| DriverError::unknown("decoding document", "document is not a JSON object"))
}

/// Convert a row into a BSON document for insertion.
pub fn row_to_document(row: Row) -> Result<Document> {
    match Bson::try_from(Value::Object(row)) {
        Ok(Bson::Document(doc)) => Ok(doc),
        Ok(other) => Err(DriverError::unknown(
            "encoding row",
            format!("row encoded to non-document BSON: {}", other),
        )),
        Err(e) => Err(DriverError::unknown("encoding row", e)),
    }
}
