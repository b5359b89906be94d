//! Error types for the driver layer.
//!
//! Native client errors are always wrapped into one of these two enums before
//! they reach the caller; the original engine message is preserved verbatim in
//! a diagnostic field. This layer never retries - retry policy belongs to the
//! orchestration layer.

use thiserror::Error;

/// Connection lifecycle errors reported by `connect` and `close`.
#[derive(Error, Debug)]
pub enum ConnectionError {
    /// The transport could not reach host:port.
    #[error("connection refused at {endpoint}: {native}")]
    Refused { endpoint: String, native: String },

    /// Credentials were rejected by the engine.
    #[error("authentication rejected: {native}")]
    Unauthorized { native: String },

    /// The connection attempt timed out.
    #[error("connection timed out at {endpoint}: {native}")]
    Timeout { endpoint: String, native: String },

    /// `close` was called on a driver with no live connection.
    #[error("connection already closed")]
    AlreadyClosed,
}

/// Errors reported by schema and row operations.
#[derive(Error, Debug)]
pub enum DriverError {
    /// Operation invoked before `connect` succeeded, or after `close`.
    #[error("driver is not connected")]
    NotConnected,

    /// The named table/collection does not exist.
    #[error("table '{0}' does not exist")]
    NotFound(String),

    /// The named table/collection already exists.
    ///
    /// Idempotent creates classify the native error into this variant and
    /// then swallow it locally; it is never surfaced by `create_tables`.
    #[error("'{0}' already exists")]
    AlreadyExists(String),

    /// `create_tables` failed part way through a batch of descriptors.
    #[error("failed to create table '{failed}' after creating [{}]: {native}", .created.join(", "))]
    PartialFailure {
        /// Tables created before the failure, in creation order.
        created: Vec<String>,
        /// Table whose creation failed.
        failed: String,
        /// Native engine message for the failure.
        native: String,
    },

    /// Connection-level failure observed during a data operation.
    #[error("connection error: {0}")]
    Connection(#[from] ConnectionError),

    /// Any other engine failure, with the native message preserved.
    #[error("{context}: {native}")]
    Unknown { context: String, native: String },
}

impl DriverError {
    /// Wrap a native engine error with context about where it occurred.
    pub fn unknown(context: impl Into<String>, native: impl ToString) -> Self {
        DriverError::Unknown {
            context: context.into(),
            native: native.to_string(),
        }
    }
}

/// Result type alias for driver operations.
pub type Result<T> = std::result::Result<T, DriverError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_refused_display_keeps_native_text() {
        let err = ConnectionError::Refused {
            endpoint: "localhost:9999".into(),
            native: "os error 111: Connection refused".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("localhost:9999"));
        assert!(msg.contains("Connection refused"));
    }

    #[test]
    fn test_partial_failure_reports_created_tables() {
        let err = DriverError::PartialFailure {
            created: vec!["a".into(), "b".into()],
            failed: "c".into(),
            native: "quota exceeded".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("'c'"));
        assert!(msg.contains("a, b"));
        assert!(msg.contains("quota exceeded"));
    }

    #[test]
    fn test_unknown_helper() {
        let err = DriverError::unknown("listing tables", "boom");
        assert_eq!(err.to_string(), "listing tables: boom");
    }
}
