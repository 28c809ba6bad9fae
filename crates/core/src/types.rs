//! Type vocabularies on both sides of the driver boundary
//!
//! This module defines:
//! - TypeCode: integer type identifier assigned by the driver
//! - SemanticType: host-side parameter/column kind
//! - HostType: the Rust representation a column materializes as
//! - IsolationLevel: the five-level transaction isolation vocabulary

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{BridgeError, BridgeResult};
use crate::value::Value;

// =============================================================================
// TypeCode
// =============================================================================

/// Driver-assigned SQL type identifier.
///
/// Opaque lookup key; the constants below follow the numbering the
/// embedded engine's driver reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeCode(pub i32);

impl TypeCode {
    pub const BIT: TypeCode = TypeCode(-7);
    pub const TINYINT: TypeCode = TypeCode(-6);
    pub const SMALLINT: TypeCode = TypeCode(5);
    pub const INTEGER: TypeCode = TypeCode(4);
    pub const BIGINT: TypeCode = TypeCode(-5);
    pub const FLOAT: TypeCode = TypeCode(6);
    pub const REAL: TypeCode = TypeCode(7);
    pub const DOUBLE: TypeCode = TypeCode(8);
    pub const NUMERIC: TypeCode = TypeCode(2);
    pub const DECIMAL: TypeCode = TypeCode(3);
    pub const CHAR: TypeCode = TypeCode(1);
    pub const VARCHAR: TypeCode = TypeCode(12);
    pub const LONGVARCHAR: TypeCode = TypeCode(-1);
    pub const DATE: TypeCode = TypeCode(91);
    pub const TIME: TypeCode = TypeCode(92);
    pub const TIMESTAMP: TypeCode = TypeCode(93);
    pub const BINARY: TypeCode = TypeCode(-2);
    pub const VARBINARY: TypeCode = TypeCode(-3);
    pub const LONGVARBINARY: TypeCode = TypeCode(-4);
    pub const NULL: TypeCode = TypeCode(0);
    pub const OTHER: TypeCode = TypeCode(1111);
    pub const JAVA_OBJECT: TypeCode = TypeCode(2000);
    pub const ARRAY: TypeCode = TypeCode(2003);
    pub const BLOB: TypeCode = TypeCode(2004);
    pub const CLOB: TypeCode = TypeCode(2005);
    pub const BOOLEAN: TypeCode = TypeCode(16);
    pub const NCHAR: TypeCode = TypeCode(-15);
    pub const NVARCHAR: TypeCode = TypeCode(-9);

    /// Map a declared SQL type name to a type code.
    ///
    /// Precision/length suffixes (`DECIMAL(10,2)`, `VARCHAR(255)`) and case
    /// are ignored. Unrecognized names map to [`TypeCode::OTHER`].
    pub fn from_sql_name(name: &str) -> TypeCode {
        let base = name.split('(').next().unwrap_or(name);
        let normalized = base.split_whitespace().collect::<Vec<_>>().join(" ");
        match normalized.to_ascii_uppercase().as_str() {
            "INTEGER" | "INT" | "INT4" | "MEDIUMINT" => TypeCode::INTEGER,
            "BIGINT" | "INT8" => TypeCode::BIGINT,
            "SMALLINT" | "INT2" => TypeCode::SMALLINT,
            "TINYINT" => TypeCode::TINYINT,
            "BOOLEAN" | "BOOL" => TypeCode::BOOLEAN,
            "DOUBLE" | "DOUBLE PRECISION" => TypeCode::DOUBLE,
            "FLOAT" => TypeCode::FLOAT,
            "REAL" => TypeCode::REAL,
            "DECIMAL" => TypeCode::DECIMAL,
            "NUMERIC" => TypeCode::NUMERIC,
            "VARCHAR" | "CHARACTER VARYING" | "TEXT" | "VARCHAR_IGNORECASE" => TypeCode::VARCHAR,
            "CHAR" | "CHARACTER" => TypeCode::CHAR,
            "NVARCHAR" | "NATIONAL CHARACTER VARYING" => TypeCode::NVARCHAR,
            "NCHAR" | "NATIONAL CHARACTER" => TypeCode::NCHAR,
            "CLOB" | "CHARACTER LARGE OBJECT" => TypeCode::CLOB,
            "BLOB" | "BINARY LARGE OBJECT" => TypeCode::BLOB,
            "VARBINARY" | "BINARY VARYING" => TypeCode::VARBINARY,
            "BINARY" => TypeCode::BINARY,
            "LONGVARBINARY" => TypeCode::LONGVARBINARY,
            "DATE" => TypeCode::DATE,
            "TIME" => TypeCode::TIME,
            "TIMESTAMP" | "DATETIME" => TypeCode::TIMESTAMP,
            "ARRAY" => TypeCode::ARRAY,
            _ => TypeCode::OTHER,
        }
    }

    /// True for the three millisecond-encoded temporal codes
    pub fn is_temporal(self) -> bool {
        matches!(self, TypeCode::DATE | TypeCode::TIME | TypeCode::TIMESTAMP)
    }
}

impl fmt::Display for TypeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// SemanticType
// =============================================================================

/// Host-side parameter and column kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SemanticType {
    AnsiString,
    AnsiStringFixedLength,
    String,
    StringFixedLength,
    Binary,
    Boolean,
    Byte,
    SByte,
    Date,
    DateTime,
    DateTime2,
    DateTimeOffset,
    Decimal,
    Double,
    Int16,
    Int32,
    Int64,
    UInt16,
    UInt32,
    UInt64,
    Single,
    Object,
    Time,
    VarNumeric,
}

impl SemanticType {
    /// Every semantic type, in declaration order
    pub const ALL: [SemanticType; 24] = [
        SemanticType::AnsiString,
        SemanticType::AnsiStringFixedLength,
        SemanticType::String,
        SemanticType::StringFixedLength,
        SemanticType::Binary,
        SemanticType::Boolean,
        SemanticType::Byte,
        SemanticType::SByte,
        SemanticType::Date,
        SemanticType::DateTime,
        SemanticType::DateTime2,
        SemanticType::DateTimeOffset,
        SemanticType::Decimal,
        SemanticType::Double,
        SemanticType::Int16,
        SemanticType::Int32,
        SemanticType::Int64,
        SemanticType::UInt16,
        SemanticType::UInt32,
        SemanticType::UInt64,
        SemanticType::Single,
        SemanticType::Object,
        SemanticType::Time,
        SemanticType::VarNumeric,
    ];

    /// Name used in logs and in the markup interchange form
    pub fn name(&self) -> &'static str {
        match self {
            SemanticType::AnsiString => "AnsiString",
            SemanticType::AnsiStringFixedLength => "AnsiStringFixedLength",
            SemanticType::String => "String",
            SemanticType::StringFixedLength => "StringFixedLength",
            SemanticType::Binary => "Binary",
            SemanticType::Boolean => "Boolean",
            SemanticType::Byte => "Byte",
            SemanticType::SByte => "SByte",
            SemanticType::Date => "Date",
            SemanticType::DateTime => "DateTime",
            SemanticType::DateTime2 => "DateTime2",
            SemanticType::DateTimeOffset => "DateTimeOffset",
            SemanticType::Decimal => "Decimal",
            SemanticType::Double => "Double",
            SemanticType::Int16 => "Int16",
            SemanticType::Int32 => "Int32",
            SemanticType::Int64 => "Int64",
            SemanticType::UInt16 => "UInt16",
            SemanticType::UInt32 => "UInt32",
            SemanticType::UInt64 => "UInt64",
            SemanticType::Single => "Single",
            SemanticType::Object => "Object",
            SemanticType::Time => "Time",
            SemanticType::VarNumeric => "VarNumeric",
        }
    }

    /// The host representation values of this kind naturally take.
    ///
    /// `None` for kinds with no fixed host shape.
    pub fn natural_host_type(&self) -> Option<HostType> {
        match self {
            SemanticType::AnsiString
            | SemanticType::AnsiStringFixedLength
            | SemanticType::String
            | SemanticType::StringFixedLength => Some(HostType::String),
            SemanticType::Binary => Some(HostType::Bytes),
            SemanticType::Boolean => Some(HostType::Bool),
            SemanticType::Byte => Some(HostType::U8),
            SemanticType::SByte => Some(HostType::I8),
            SemanticType::Date
            | SemanticType::DateTime
            | SemanticType::DateTime2
            | SemanticType::Time => Some(HostType::DateTime),
            SemanticType::DateTimeOffset => Some(HostType::DateTimeOffset),
            SemanticType::Decimal => Some(HostType::Decimal),
            SemanticType::Double => Some(HostType::F64),
            SemanticType::Int16 => Some(HostType::I16),
            SemanticType::Int32 => Some(HostType::I32),
            SemanticType::Int64 => Some(HostType::I64),
            SemanticType::UInt16 => Some(HostType::U16),
            SemanticType::UInt32 => Some(HostType::U32),
            SemanticType::UInt64 => Some(HostType::U64),
            SemanticType::Single => Some(HostType::F32),
            SemanticType::Object => Some(HostType::Object),
            SemanticType::VarNumeric => None,
        }
    }

    /// Infer the semantic type of a host value.
    ///
    /// Used when a parameter is bound without a declared type. `Null`
    /// infers as `Object`, which passes through unchanged.
    pub fn infer(value: &Value) -> SemanticType {
        match value {
            Value::Null => SemanticType::Object,
            Value::Bool(_) => SemanticType::Boolean,
            Value::U8(_) => SemanticType::Byte,
            Value::I8(_) => SemanticType::SByte,
            Value::I16(_) => SemanticType::Int16,
            Value::I32(_) => SemanticType::Int32,
            Value::I64(_) => SemanticType::Int64,
            Value::U16(_) => SemanticType::UInt16,
            Value::U32(_) => SemanticType::UInt32,
            Value::U64(_) => SemanticType::UInt64,
            Value::F32(_) => SemanticType::Single,
            Value::F64(_) => SemanticType::Double,
            Value::Decimal(_) => SemanticType::Decimal,
            Value::String(_) => SemanticType::String,
            Value::Bytes(_) => SemanticType::Binary,
            Value::DateTime(_) => SemanticType::DateTime,
            Value::DateTimeOffset(_) => SemanticType::DateTimeOffset,
            Value::Array(_) => SemanticType::VarNumeric,
        }
    }
}

impl fmt::Display for SemanticType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SemanticType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SemanticType::ALL
            .iter()
            .copied()
            .find(|t| t.name() == s)
            .ok_or_else(|| format!("unknown semantic type '{}'", s))
    }
}

// =============================================================================
// HostType
// =============================================================================

/// Rust representation of a column's values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HostType {
    String,
    Bytes,
    Bool,
    U8,
    I8,
    I16,
    I32,
    I64,
    U16,
    U32,
    U64,
    F32,
    F64,
    Decimal,
    DateTime,
    DateTimeOffset,
    /// Any value; no fixed shape
    Object,
}

impl HostType {
    const ALL: [HostType; 17] = [
        HostType::String,
        HostType::Bytes,
        HostType::Bool,
        HostType::U8,
        HostType::I8,
        HostType::I16,
        HostType::I32,
        HostType::I64,
        HostType::U16,
        HostType::U32,
        HostType::U64,
        HostType::F32,
        HostType::F64,
        HostType::Decimal,
        HostType::DateTime,
        HostType::DateTimeOffset,
        HostType::Object,
    ];

    /// Name used in the markup interchange form
    pub fn name(&self) -> &'static str {
        match self {
            HostType::String => "String",
            HostType::Bytes => "Bytes",
            HostType::Bool => "Bool",
            HostType::U8 => "U8",
            HostType::I8 => "I8",
            HostType::I16 => "I16",
            HostType::I32 => "I32",
            HostType::I64 => "I64",
            HostType::U16 => "U16",
            HostType::U32 => "U32",
            HostType::U64 => "U64",
            HostType::F32 => "F32",
            HostType::F64 => "F64",
            HostType::Decimal => "Decimal",
            HostType::DateTime => "DateTime",
            HostType::DateTimeOffset => "DateTimeOffset",
            HostType::Object => "Object",
        }
    }
}

impl fmt::Display for HostType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for HostType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HostType::ALL
            .iter()
            .copied()
            .find(|t| t.name() == s)
            .ok_or_else(|| format!("unknown host type '{}'", s))
    }
}

// =============================================================================
// Isolation levels
// =============================================================================

/// Isolation constants understood by the driver.
pub mod isolation {
    pub const TRANSACTION_NONE: i32 = 0;
    pub const TRANSACTION_READ_UNCOMMITTED: i32 = 1;
    pub const TRANSACTION_READ_COMMITTED: i32 = 2;
    pub const TRANSACTION_REPEATABLE_READ: i32 = 4;
    pub const TRANSACTION_SERIALIZABLE: i32 = 8;
}

/// Host transaction isolation levels.
///
/// Only the first five are supported by the driver; `Snapshot` and `Chaos`
/// exist on the host side and are rejected at `begin`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IsolationLevel {
    #[default]
    Unspecified,
    ReadUncommitted,
    ReadCommitted,
    RepeatableRead,
    Serializable,
    Snapshot,
    Chaos,
}

/// Host level / driver constant pairs, in vocabulary order.
const ISOLATION_TABLE: [(IsolationLevel, i32); 5] = [
    (IsolationLevel::Unspecified, isolation::TRANSACTION_NONE),
    (IsolationLevel::ReadUncommitted, isolation::TRANSACTION_READ_UNCOMMITTED),
    (IsolationLevel::ReadCommitted, isolation::TRANSACTION_READ_COMMITTED),
    (IsolationLevel::RepeatableRead, isolation::TRANSACTION_REPEATABLE_READ),
    (IsolationLevel::Serializable, isolation::TRANSACTION_SERIALIZABLE),
];

impl IsolationLevel {
    /// Driver constant for this level
    pub fn to_driver(self) -> BridgeResult<i32> {
        ISOLATION_TABLE
            .iter()
            .find(|(level, _)| *level == self)
            .map(|(_, code)| *code)
            .ok_or_else(|| BridgeError::unsupported_isolation(self))
    }

    /// Host level for a driver constant
    pub fn from_driver(code: i32) -> BridgeResult<IsolationLevel> {
        ISOLATION_TABLE
            .iter()
            .find(|(_, c)| *c == code)
            .map(|(level, _)| *level)
            .ok_or_else(|| BridgeError::UnsupportedIsolationLevel {
                level: format!("driver level {}", code),
            })
    }
}

impl fmt::Display for IsolationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            IsolationLevel::Unspecified => "unspecified",
            IsolationLevel::ReadUncommitted => "read_uncommitted",
            IsolationLevel::ReadCommitted => "read_committed",
            IsolationLevel::RepeatableRead => "repeatable_read",
            IsolationLevel::Serializable => "serializable",
            IsolationLevel::Snapshot => "snapshot",
            IsolationLevel::Chaos => "chaos",
        };
        f.write_str(name)
    }
}
