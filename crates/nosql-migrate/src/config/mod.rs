//! Driver configuration types and validation.

use serde::{Deserialize, Serialize};

use crate::error::{DriverError, Result};

/// Default connect timeout in seconds.
///
/// Timeouts apply at connect time only; per-call timeouts are the caller's
/// responsibility (wrap calls externally if needed).
fn default_connect_timeout() -> u64 {
    30
}

/// Connection options for a single driver instance.
///
/// Immutable after driver construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriverConfig {
    /// Database host.
    pub host: String,

    /// Database port.
    pub port: u16,

    /// Database/keyspace name to select as the active namespace.
    pub database: String,

    /// Optional credentials. Omitted for engines running without auth.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credentials: Option<Credentials>,

    /// Connect timeout in seconds (default: 30).
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

impl DriverConfig {
    /// Create a config with no credentials and the default timeout.
    pub fn new(host: impl Into<String>, port: u16, database: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port,
            database: database.into(),
            credentials: None,
            connect_timeout_secs: default_connect_timeout(),
        }
    }

    /// Attach credentials.
    pub fn with_credentials(mut self, user: impl Into<String>, password: impl Into<String>) -> Self {
        self.credentials = Some(Credentials {
            user: user.into(),
            password: password.into(),
        });
        self
    }

    /// `host:port` string used in diagnostics.
    pub fn endpoint(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Username/password pair, treated as opaque by this layer.
#[derive(Clone, Serialize, Deserialize)]
pub struct Credentials {
    /// Username.
    pub user: String,

    /// Password.
    pub password: String,
}

// Manual Debug so passwords never end up in logs.
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Validate a driver configuration.
pub fn validate(config: &DriverConfig) -> Result<()> {
    if config.host.is_empty() {
        return Err(DriverError::unknown("config", "host is required"));
    }
    if config.port == 0 {
        return Err(DriverError::unknown("config", "port must be non-zero"));
    }
    if config.database.is_empty() {
        return Err(DriverError::unknown("config", "database is required"));
    }
    if let Some(creds) = &config.credentials {
        if creds.user.is_empty() {
            return Err(DriverError::unknown(
                "config",
                "credentials.user must be non-empty when credentials are set",
            ));
        }
    }
    Ok(())
}
