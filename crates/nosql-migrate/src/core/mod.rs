//! Core abstractions shared by every driver.
//!
//! - [`traits::Driver`]: the uniform operation contract
//! - [`table`]: table descriptors and bulk-insert reporting
//! - [`value`]: row and page types
//! - [`state`]: the connect/close state machine

pub mod state;
pub mod table;
pub mod traits;
pub mod value;

pub use state::ConnectionState;
pub use table::{FailedRow, InsertReport, TableDescriptor};
pub use traits::Driver;
pub use value::{row_from_value, Page, Row};
