//! Error types for type and value marshalling
//!
//! Every failure raised by the type registry, the value converters and the
//! isolation-level vocabulary is a [`BridgeError`]. These are static
//! configuration errors (a missing mapping or converter) or value errors
//! (a value that cannot be represented on the other side); none of them
//! is transient, so callers never retry them.

use std::io;
use thiserror::Error;

use crate::types::{IsolationLevel, SemanticType, TypeCode};

/// Result type alias for marshalling operations
pub type BridgeResult<T> = std::result::Result<T, BridgeError>;

/// Errors raised while mapping types or converting values across the driver boundary
#[derive(Debug, Error)]
pub enum BridgeError {
    /// No TypeCode is registered for the semantic type
    #[error("cannot convert the {semantic} semantic type to a driver type code")]
    UnsupportedType {
        /// The semantic type that has no mapping
        semantic: SemanticType,
    },

    /// No semantic or host type is registered for the type code
    #[error("cannot convert driver type code {code} to a semantic type")]
    UnknownTypeCode {
        /// The unmapped driver type code
        code: TypeCode,
    },

    /// No converter is registered for the key
    #[error("no converter registered for {key}")]
    ConversionNotSupported {
        /// Human readable converter key (`encode Int32`, `decode 2004`)
        key: String,
    },

    /// A converter exists but the value cannot be represented in the target
    #[error("cannot convert {actual} to {target}: {reason}")]
    ConversionFailed {
        /// Target representation
        target: String,
        /// Kind of the value that was offered
        actual: String,
        /// Why the conversion failed
        reason: String,
    },

    /// Reading a binary large object stream failed
    #[error("failed to read binary stream after {bytes_read} bytes")]
    StreamRead {
        /// Bytes accumulated before the failure (discarded)
        bytes_read: usize,
        /// Underlying I/O failure
        #[source]
        source: io::Error,
    },

    /// Isolation level outside the supported five-level set
    #[error("unsupported isolation level: {level}")]
    UnsupportedIsolationLevel {
        /// Display form of the rejected level
        level: String,
    },

    /// A registration entry was rejected while building a table
    #[error("invalid mapping for type code {code} / {semantic}: {reason}")]
    InvalidMapping {
        /// Type code of the rejected entry
        code: TypeCode,
        /// Semantic type of the rejected entry
        semantic: SemanticType,
        /// Why it was rejected
        reason: String,
    },
}

impl BridgeError {
    /// Shorthand for [`BridgeError::ConversionFailed`]
    pub fn conversion(
        target: impl Into<String>,
        actual: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        BridgeError::ConversionFailed {
            target: target.into(),
            actual: actual.into(),
            reason: reason.into(),
        }
    }

    /// Shorthand for [`BridgeError::UnsupportedIsolationLevel`]
    pub fn unsupported_isolation(level: IsolationLevel) -> Self {
        BridgeError::UnsupportedIsolationLevel {
            level: level.to_string(),
        }
    }

    /// True for errors that indicate a missing mapping rather than a bad value
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            BridgeError::UnsupportedType { .. }
                | BridgeError::UnknownTypeCode { .. }
                | BridgeError::ConversionNotSupported { .. }
                | BridgeError::InvalidMapping { .. }
        )
    }
}
