//! # sqlbridge executor
//!
//! Sessions, transactions and commands over a foreign SQL driver.
//!
//! - [`Session`] - one connection plus at most one active transaction
//! - [`Command`] - SQL text with typed positional parameters
//! - [`CommandExecutor`] - stateless execution through a marshalling table
//! - [`ResultTable`] - materialized query results, with markup interchange
//! - [`SessionConfig`] - settings, optionally read from `sqlbridge.toml`
//!
//! ## Quick Start
//!
//! ```text
//! use sqlbridge_executor::{Command, Session};
//! use sqlbridge_core::SemanticType;
//!
//! let mut session = Session::open_in_memory()?;
//! session.execute_non_query("CREATE TABLE users (id INTEGER, name VARCHAR(50))")?;
//! session.execute_non_query(
//!     Command::new("INSERT INTO users VALUES (?, ?)")
//!         .bind(SemanticType::Int32, 1)
//!         .bind(SemanticType::AnsiString, "Alice"),
//! )?;
//!
//! let table = session.execute_query("SELECT * FROM users")?;
//! assert_eq!(table.row_count(), 1);
//! ```

#![warn(clippy::all)]

mod command;
mod config;
mod convert;
mod error;
mod executor;
mod markup;
mod session;
mod table;
mod transaction;

#[cfg(test)]
mod tests;

pub use command::{Command, Parameter};
pub use config::{SessionConfig, CONFIG_FILE_NAME, IN_MEMORY_URL};
pub use error::{Error, Result};
pub use executor::CommandExecutor;
pub use session::Session;
pub use table::{Column, ResultTable};
pub use transaction::{Transaction, TransactionState};
