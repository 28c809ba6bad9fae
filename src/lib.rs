//! sqlbridge - typed sessions over an embedded SQL engine
//!
//! sqlbridge puts a host-typed command and transaction API in front of a
//! driver that speaks only integer type codes and loosely typed wire values.
//! Every value that crosses the boundary goes through one marshalling table
//! that pairs a type code with a semantic kind, a host representation and a
//! pair of converters.
//!
//! # Quick Start
//!
//! ```ignore
//! use sqlbridge::{Command, SemanticType, Session};
//!
//! let mut session = Session::open_in_memory()?;
//! session.execute_non_query("CREATE TABLE users (id INTEGER, name VARCHAR(50))")?;
//!
//! session.begin_transaction(None)?;
//! session.execute_non_query(
//!     Command::new("INSERT INTO users VALUES (?, ?)")
//!         .bind(SemanticType::Int32, 1)
//!         .bind(SemanticType::AnsiString, "Alice"),
//! )?;
//! session.commit()?;
//! ```
//!
//! # Architecture
//!
//! - `sqlbridge-core`: type vocabulary, values and the marshalling table
//! - `sqlbridge-driver`: the driver seam and the bundled SQLite driver
//! - `sqlbridge-executor`: sessions, commands and result tables

pub use sqlbridge_executor::*;

pub use sqlbridge_core::{
    Bridge, BridgeBuilder, BridgeError, ConvertContext, EpochAnchor, ForeignBlob, ForeignValue,
    HostType, IsolationLevel, SemanticType, TypeCode, Value,
};
pub use sqlbridge_driver::{Driver, DriverError, ForeignConnection, SqliteDriver};

