//! Row and page types for engine-agnostic data transfer.

use serde_json::Value;

/// One record, modeled as an ordered field-to-value mapping.
///
/// No fixed schema is assumed across rows of the same table. Field order is
/// preserved end to end (`serde_json` is built with `preserve_order`), so a
/// row read from a source engine is written to the target with its fields in
/// the same order.
pub type Row = serde_json::Map<String, Value>;

/// Build a [`Row`] from a JSON value, returning `None` for non-objects.
pub fn row_from_value(value: Value) -> Option<Row> {
    match value {
        Value::Object(map) => Some(map),
        _ => None,
    }
}

/// A bounded, ordered slice of a table's rows returned by one read call.
///
/// Invariant: `rows.len() <= limit`. Rows reflect the driver's documented
/// ordering key, stable across calls unless the table is concurrently
/// mutated.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Page {
    /// Rows in the driver's documented order.
    pub rows: Vec<Row>,
    /// The limit the page was requested with.
    pub limit: u64,
    /// The offset the page was requested with.
    pub offset: u64,
}

impl Page {
    /// An empty page for the given limit/offset.
    pub fn empty(limit: u64, offset: u64) -> Self {
        Self {
            rows: Vec::new(),
            limit,
            offset,
        }
    }

    /// Number of rows in the page.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the page holds no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_row_from_value() {
        assert!(row_from_value(json!({"number": 1})).is_some());
        assert!(row_from_value(json!([1, 2])).is_none());
        assert!(row_from_value(json!(42)).is_none());
    }

    #[test]
    fn test_row_preserves_field_order() {
        let row = row_from_value(json!({"z": 1, "a": 2, "m": 3})).unwrap();
        let keys: Vec<&String> = row.keys().collect();
        assert_eq!(keys, ["z", "a", "m"]);
    }

    #[test]
    fn test_empty_page() {
        let page = Page::empty(10, 5);
        assert!(page.is_empty());
        assert_eq!(page.limit, 10);
        assert_eq!(page.offset, 5);
    }
}
