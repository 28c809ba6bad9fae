//! Error types for sessions and command execution.
//!
//! Everything a [`Session`](crate::Session) or
//! [`CommandExecutor`](crate::CommandExecutor) can fail with is an
//! [`Error`]. Driver failures keep their full cause chain through
//! `#[source]`, so callers can walk `std::error::Error::source` down to the
//! engine's own error.
//!
//! # Categories
//!
//! | Category | Variants | Description |
//! |----------|----------|-------------|
//! | Connection | `Connection` | Opening the connection failed |
//! | Types | `UnsupportedType`, `UnknownTypeCode` | Missing type mapping |
//! | Values | `ConversionNotSupported`, `ConversionFailed`, `StreamRead` | Value could not cross the boundary |
//! | Protocol | `InvalidOperation`, `UnsupportedIsolationLevel`, `InvalidInput` | Caller misuse |
//! | System | `Driver`, `Config`, `Internal` | Engine, configuration and runtime failures |

use std::io;

use sqlbridge_core::{SemanticType, TypeCode};
use sqlbridge_driver::DriverError;

/// Result type alias for session operations
pub type Result<T> = std::result::Result<T, Error>;

/// Session and command execution errors.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    // ==================== Connection ====================
    /// The driver refused to open a connection
    #[error("connection failed: {reason}")]
    Connection {
        reason: String,
        #[source]
        source: DriverError,
    },

    // ==================== Types ====================
    /// No type code is registered for the semantic type
    #[error("cannot convert the {semantic} semantic type to a driver type code")]
    UnsupportedType { semantic: SemanticType },

    /// No semantic or host type is registered for the type code
    #[error("cannot convert driver type code {code} to a semantic type")]
    UnknownTypeCode { code: TypeCode },

    // ==================== Values ====================
    /// No converter registered for the key
    #[error("no converter registered for {key}")]
    ConversionNotSupported { key: String },

    /// Value not representable in the target
    #[error("cannot convert {actual} to {target}: {reason}")]
    ConversionFailed {
        target: String,
        actual: String,
        reason: String,
    },

    /// Reading a binary stream failed; the partial buffer was discarded
    #[error("failed to read binary stream after {bytes_read} bytes")]
    StreamRead {
        bytes_read: usize,
        #[source]
        source: io::Error,
    },

    // ==================== Protocol ====================
    /// Operation not valid in the current session state
    #[error("invalid operation: {reason}")]
    InvalidOperation { reason: String },

    /// Isolation level outside the supported set
    #[error("unsupported isolation level: {level}")]
    UnsupportedIsolationLevel { level: String },

    /// Bad argument
    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },

    // ==================== System ====================
    /// Statement execution failed in the driver
    #[error("driver error: {source}")]
    Driver {
        #[source]
        source: DriverError,
    },

    /// Configuration file could not be read, parsed or written
    #[error("configuration error: {reason}")]
    Config { reason: String },

    /// Internal failure (lost background task)
    #[error("internal error: {reason}")]
    Internal { reason: String },
}

impl Error {
    pub(crate) fn invalid_operation(reason: impl Into<String>) -> Self {
        Error::InvalidOperation {
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_input(reason: impl Into<String>) -> Self {
        Error::InvalidInput {
            reason: reason.into(),
        }
    }

    pub(crate) fn config(reason: impl Into<String>) -> Self {
        Error::Config {
            reason: reason.into(),
        }
    }

    /// True for caller misuse, as opposed to a failure of the engine
    pub fn is_protocol_error(&self) -> bool {
        matches!(
            self,
            Error::InvalidOperation { .. }
                | Error::UnsupportedIsolationLevel { .. }
                | Error::InvalidInput { .. }
        )
    }
}
