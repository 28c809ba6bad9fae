//! Stateless command execution.
//!
//! The [`CommandExecutor`] holds only the marshalling table. It is handed a
//! connection per call, so the same executor serves the synchronous path
//! and the background path of `execute_query_async`.
//!
//! Every parameter is encoded before any SQL reaches the driver: a missing
//! mapping or converter fails the command without side effects.

use std::sync::Arc;

use sqlbridge_core::{Bridge, ForeignValue, Value};
use sqlbridge_driver::{ForeignConnection, ForeignResultSet};
use tracing::trace;

use crate::command::{Command, Parameter};
use crate::table::{Column, ResultTable};
use crate::Result;

/// Runs commands against a connection through one marshalling table.
#[derive(Debug, Clone)]
pub struct CommandExecutor {
    bridge: Arc<Bridge>,
}

impl CommandExecutor {
    pub fn new(bridge: Arc<Bridge>) -> Self {
        Self { bridge }
    }

    pub fn bridge(&self) -> &Arc<Bridge> {
        &self.bridge
    }

    /// Run a statement that returns no rows; returns the affected row count.
    pub fn execute_non_query(&self, conn: &mut dyn ForeignConnection, cmd: Command) -> Result<u64> {
        let (sql, params) = cmd.into_parts();
        let foreign = self.encode_parameters(params)?;
        trace!(target: "sqlbridge::executor", sql = %sql, params = foreign.len(), "execute_non_query");
        Ok(conn.execute_update(&sql, foreign)?)
    }

    /// First column of the first row, or `Value::Null` when there is none.
    pub fn execute_scalar(&self, conn: &mut dyn ForeignConnection, cmd: Command) -> Result<Value> {
        let mut rs = self.run_query(conn, cmd)?;
        let code = match rs.columns().first() {
            Some(col) => col.type_code,
            None => return Ok(Value::Null),
        };
        match rs.next_row().and_then(|row| row.into_iter().next()) {
            Some(cell) => Ok(self.bridge.decode_column(code, cell)?),
            None => Ok(Value::Null),
        }
    }

    /// Run a query and materialize every row.
    pub fn execute_query(&self, conn: &mut dyn ForeignConnection, cmd: Command) -> Result<ResultTable> {
        let mut table = ResultTable::default();
        self.fill(conn, &mut table, cmd)?;
        Ok(table)
    }

    /// Run a query and append its rows to `table`.
    ///
    /// A table without a schema adopts the result's columns; otherwise the
    /// result must have the same column names. Returns the rows appended.
    pub fn fill(
        &self,
        conn: &mut dyn ForeignConnection,
        table: &mut ResultTable,
        cmd: Command,
    ) -> Result<usize> {
        let mut rs = self.run_query(conn, cmd)?;

        let registry = self.bridge.registry();
        let mut columns = Vec::with_capacity(rs.column_count());
        let mut codes = Vec::with_capacity(rs.column_count());
        for col in rs.columns() {
            let semantic_type = registry.resolve_semantic_type(col.type_code)?;
            let host_type = registry.resolve_host_type(col.type_code).ok();
            columns.push(Column::new(col.name.clone(), semantic_type, host_type));
            codes.push(col.type_code);
        }

        // Decode into a scratch buffer so a failing row leaves `table` untouched
        let mut decoded = Vec::with_capacity(rs.remaining());
        while let Some(row) = rs.next_row() {
            let values = row
                .into_iter()
                .zip(&codes)
                .map(|(cell, code)| self.bridge.decode_column(*code, cell))
                .collect::<std::result::Result<Vec<_>, _>>()?;
            decoded.push(values);
        }

        table.adopt_schema(columns)?;
        let appended = decoded.len();
        table.rows_mut().extend(decoded);
        Ok(appended)
    }

    fn run_query(&self, conn: &mut dyn ForeignConnection, cmd: Command) -> Result<ForeignResultSet> {
        let (sql, params) = cmd.into_parts();
        let foreign = self.encode_parameters(params)?;
        trace!(target: "sqlbridge::executor", sql = %sql, params = foreign.len(), "execute_query");
        Ok(conn.execute_query(&sql, foreign)?)
    }

    fn encode_parameters(&self, params: Vec<Parameter>) -> Result<Vec<ForeignValue>> {
        params
            .into_iter()
            .map(|p| {
                self.bridge
                    .encode_parameter(p.semantic, p.value)
                    .map(|(_, foreign)| foreign)
                    .map_err(Into::into)
            })
            .collect()
    }
}
