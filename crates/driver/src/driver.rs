//! The driver seam
//!
//! A [`Driver`] opens [`ForeignConnection`]s from connection strings. A
//! connection speaks only [`ForeignValue`]s and integer type codes; all
//! host-side typing happens above this layer.

use std::collections::VecDeque;

use sqlbridge_core::{ForeignValue, TypeCode};

use crate::error::DriverResult;

/// Factory for connections.
pub trait Driver: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &str;

    /// True if `url` is a connection string this driver understands
    fn accepts(&self, url: &str) -> bool;

    /// Open a connection
    fn connect(&self, url: &str) -> DriverResult<Box<dyn ForeignConnection>>;
}

/// One open connection to the engine.
///
/// Statements run in autocommit mode unless [`begin`](Self::begin) was
/// called. Parameters bind positionally to `?` placeholders.
pub trait ForeignConnection: Send {
    /// Start a transaction at a driver isolation constant
    fn begin(&mut self, isolation: i32) -> DriverResult<()>;

    fn commit(&mut self) -> DriverResult<()>;

    fn rollback(&mut self) -> DriverResult<()>;

    /// Run a statement that returns no rows; returns the affected row count
    fn execute_update(&mut self, sql: &str, params: Vec<ForeignValue>) -> DriverResult<u64>;

    /// Run a query and materialize its rows
    fn execute_query(&mut self, sql: &str, params: Vec<ForeignValue>)
        -> DriverResult<ForeignResultSet>;

    /// Release the connection; further calls fail with `Closed`
    fn close(&mut self) -> DriverResult<()>;

    fn is_closed(&self) -> bool;
}

/// Result column metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignColumn {
    pub name: String,
    pub type_code: TypeCode,
    /// Declared SQL type, when the column maps to a table column
    pub declared_type: Option<String>,
}

/// A fully read result set, consumed row by row.
#[derive(Debug, Default)]
pub struct ForeignResultSet {
    columns: Vec<ForeignColumn>,
    rows: VecDeque<Vec<ForeignValue>>,
}

impl ForeignResultSet {
    pub fn new(columns: Vec<ForeignColumn>, rows: Vec<Vec<ForeignValue>>) -> Self {
        Self {
            columns,
            rows: rows.into(),
        }
    }

    pub fn columns(&self) -> &[ForeignColumn] {
        &self.columns
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Rows not yet consumed
    pub fn remaining(&self) -> usize {
        self.rows.len()
    }

    /// Take the next row, `None` once exhausted
    pub fn next_row(&mut self) -> Option<Vec<ForeignValue>> {
        self.rows.pop_front()
    }
}
