//! Driver error types

use std::io;
use thiserror::Error;

/// Result type alias for driver operations
pub type DriverResult<T> = std::result::Result<T, DriverError>;

/// Errors raised by a driver or its connections.
#[derive(Debug, Error)]
pub enum DriverError {
    /// The embedded engine reported a failure
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// The connection string could not be parsed
    #[error("malformed connection url '{url}': {reason}")]
    MalformedUrl {
        /// The offending url, with credentials redacted
        url: String,
        /// Reason for rejection
        reason: String,
    },

    /// I/O failure (reading a parameter stream, opening a file)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Operation on a closed connection
    #[error("connection is closed")]
    Closed,

    /// The driver cannot bind or return this kind of value
    #[error("unsupported by driver: {reason}")]
    Unsupported {
        /// What is unsupported
        reason: String,
    },

    /// A bound parameter could not be sent
    #[error("parameter {index}: {reason}")]
    InvalidParameter {
        /// 1-based parameter position
        index: usize,
        /// Reason for rejection
        reason: String,
    },
}

impl DriverError {
    /// True when the failure came from the engine itself
    pub fn is_engine(&self) -> bool {
        matches!(self, DriverError::Sqlite(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_sqlite_error_keeps_source() {
        let err: DriverError = rusqlite::Error::InvalidQuery.into();
        assert!(err.is_engine());
        assert!(err.source().is_some());
    }

    #[test]
    fn test_malformed_url_display() {
        let err = DriverError::MalformedUrl {
            url: "tcp://x".into(),
            reason: "unknown scheme".into(),
        };
        assert_eq!(err.to_string(), "malformed connection url 'tcp://x': unknown scheme");
    }
}
