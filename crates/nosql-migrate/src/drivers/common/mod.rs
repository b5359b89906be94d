//! Utilities shared by the network drivers.

use crate::error::ConnectionError;

/// Classify a native connection-time failure into the common taxonomy.
///
/// Works on the native message text, which is kept verbatim as the
/// diagnostic field. Anything that is neither an authentication rejection
/// nor a timeout is reported as `Refused`: the transport failed to produce a
/// usable connection.
pub fn classify_connect_message(endpoint: &str, native: &str) -> ConnectionError {
    let lowered = native.to_lowercase();
    if lowered.contains("auth") && (lowered.contains("fail") || lowered.contains("reject")) {
        return ConnectionError::Unauthorized {
            native: native.to_string(),
        };
    }
    if lowered.contains("timed out") || lowered.contains("timeout") {
        return ConnectionError::Timeout {
            endpoint: endpoint.to_string(),
            native: native.to_string(),
        };
    }
    ConnectionError::Refused {
        endpoint: endpoint.to_string(),
        native: native.to_string(),
    }
}
