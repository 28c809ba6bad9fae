//! In-memory tabular results.

use serde::{Deserialize, Serialize};
use sqlbridge_core::{HostType, SemanticType, Value};

use crate::{Error, Result};

/// Result column metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub semantic_type: SemanticType,
    /// `None` for kinds without a fixed host shape (arrays)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host_type: Option<HostType>,
}

impl Column {
    pub fn new(name: impl Into<String>, semantic_type: SemanticType, host_type: Option<HostType>) -> Self {
        Self {
            name: name.into(),
            semantic_type,
            host_type,
        }
    }
}

/// Ordered columns and positionally aligned rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultTable {
    columns: Vec<Column>,
    rows: Vec<Vec<Value>>,
}

impl ResultTable {
    /// Empty table with a schema
    pub fn new(columns: Vec<Column>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of the column named `name` (case-insensitive)
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.name.eq_ignore_ascii_case(name))
    }

    /// Cell at (`row`, `column`)
    pub fn get(&self, row: usize, column: usize) -> Option<&Value> {
        self.rows.get(row)?.get(column)
    }

    /// Cell at `row` in the column named `name`
    pub fn get_by_name(&self, row: usize, name: &str) -> Option<&Value> {
        self.get(row, self.column_index(name)?)
    }

    /// Append a row; its width must match the schema
    pub fn push_row(&mut self, row: Vec<Value>) -> Result<()> {
        if row.len() != self.columns.len() {
            return Err(Error::invalid_input(format!(
                "row has {} values but the table has {} columns",
                row.len(),
                self.columns.len()
            )));
        }
        self.rows.push(row);
        Ok(())
    }

    /// Remove all rows, keeping the schema
    pub fn clear(&mut self) {
        self.rows.clear();
    }

    /// Remove rows and schema
    pub fn reset(&mut self) {
        self.rows.clear();
        self.columns.clear();
    }

    /// Adopt `columns` when the table has no schema yet, otherwise require
    /// the same column names in the same order.
    pub(crate) fn adopt_schema(&mut self, columns: Vec<Column>) -> Result<()> {
        if self.columns.is_empty() {
            self.columns = columns;
            return Ok(());
        }
        let same = self.columns.len() == columns.len()
            && self
                .columns
                .iter()
                .zip(&columns)
                .all(|(a, b)| a.name.eq_ignore_ascii_case(&b.name));
        if !same {
            return Err(Error::invalid_operation(format!(
                "result columns [{}] do not match table columns [{}]",
                names(&columns),
                names(&self.columns)
            )));
        }
        Ok(())
    }

    pub(crate) fn rows_mut(&mut self) -> &mut Vec<Vec<Value>> {
        &mut self.rows
    }
}

fn names(columns: &[Column]) -> String {
    columns
        .iter()
        .map(|c| c.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
