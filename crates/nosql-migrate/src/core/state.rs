//! Explicit connection state machine shared by all drivers.
//!
//! Transitions: `connect`: NotConnected -> Connected, `close`:
//! Connected -> Closed. Every other operation is valid only in Connected and
//! fails fast otherwise. Modeled as an enum rather than implicit null checks
//! so a closed driver can never be mistaken for one that was never connected.

use crate::error::{ConnectionError, DriverError};

/// Lifecycle state of a driver's single connection handle.
#[derive(Debug, Default)]
pub enum ConnectionState<C> {
    /// `connect` has not succeeded yet.
    #[default]
    NotConnected,
    /// Live connection handle, exclusively owned by this driver.
    Connected(C),
    /// `close` has been called; the driver is spent.
    Closed,
}

impl<C> ConnectionState<C> {
    /// Borrow the live handle, or fail fast with `NotConnected`.
    pub fn handle(&self) -> Result<&C, DriverError> {
        match self {
            ConnectionState::Connected(conn) => Ok(conn),
            _ => Err(DriverError::NotConnected),
        }
    }

    /// Whether the state machine is in Connected.
    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionState::Connected(_))
    }

    /// Install a handle after a successful `connect`.
    ///
    /// Reconnecting a closed driver is not supported; callers construct a
    /// fresh driver instead.
    pub fn set_connected(&mut self, conn: C) -> Result<(), ConnectionError> {
        match self {
            ConnectionState::NotConnected => {
                *self = ConnectionState::Connected(conn);
                Ok(())
            }
            _ => Err(ConnectionError::AlreadyClosed),
        }
    }

    /// Take the handle for `close`, transitioning to Closed.
    ///
    /// Closing twice, or closing a driver that never connected, reports
    /// `AlreadyClosed`: there is no live connection to release either way.
    pub fn take_for_close(&mut self) -> Result<C, ConnectionError> {
        match std::mem::replace(self, ConnectionState::Closed) {
            ConnectionState::Connected(conn) => Ok(conn),
            _ => Err(ConnectionError::AlreadyClosed),
        }
    }
}
