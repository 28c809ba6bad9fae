//! Driver seam for sqlbridge
//!
//! This crate owns everything that talks to the engine:
//! - Driver / ForeignConnection: the traits sessions are written against
//! - ForeignResultSet: materialized result rows with column type codes
//! - ConnectionUrl: connection string parsing
//! - SqliteDriver: the bundled embedded engine

#![warn(clippy::all)]

pub mod driver;
pub mod error;
pub mod sqlite;
pub mod url;

pub use driver::{Driver, ForeignColumn, ForeignConnection, ForeignResultSet};
pub use error::{DriverError, DriverResult};
pub use sqlite::{SqliteConnection, SqliteDriver};
pub use url::{redact, ConnectionUrl, UrlTarget};
