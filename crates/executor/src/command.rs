//! Commands: SQL text plus positional parameters.
//!
//! ```ignore
//! let cmd = Command::new("INSERT INTO users (name, active) VALUES (?, ?)")
//!     .bind(SemanticType::AnsiString, "Alice")
//!     .bind_inferred(true);
//! session.execute_non_query(cmd)?;
//! ```

use sqlbridge_core::{SemanticType, Value};

/// One positional parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    /// Declared kind; selects the encoder and the wire type code
    pub semantic: SemanticType,
    pub value: Value,
}

impl Parameter {
    pub fn new(semantic: SemanticType, value: impl Into<Value>) -> Self {
        Self {
            semantic,
            value: value.into(),
        }
    }

    /// Parameter whose semantic type is inferred from the value
    pub fn inferred(value: impl Into<Value>) -> Self {
        let value = value.into();
        Self {
            semantic: SemanticType::infer(&value),
            value,
        }
    }
}

/// A SQL statement with `?` placeholders and its bound parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    sql: String,
    parameters: Vec<Parameter>,
}

impl Command {
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            parameters: Vec::new(),
        }
    }

    /// Bind the next positional parameter with an explicit semantic type
    pub fn bind(mut self, semantic: SemanticType, value: impl Into<Value>) -> Self {
        self.parameters.push(Parameter::new(semantic, value));
        self
    }

    /// Bind the next positional parameter, inferring its semantic type
    pub fn bind_inferred(mut self, value: impl Into<Value>) -> Self {
        self.parameters.push(Parameter::inferred(value));
        self
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    pub fn into_parts(self) -> (String, Vec<Parameter>) {
        (self.sql, self.parameters)
    }
}

impl From<&str> for Command {
    fn from(sql: &str) -> Self {
        Command::new(sql)
    }
}

impl From<String> for Command {
    fn from(sql: String) -> Self {
        Command::new(sql)
    }
}
