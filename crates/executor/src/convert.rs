//! Error conversion from marshalling and driver errors.
//!
//! Marshalling errors map one-to-one onto executor variants. Driver errors
//! raised while running a statement become [`Error::Driver`]; failures to
//! open a connection are wrapped as [`Error::Connection`] at the call site.

use sqlbridge_core::BridgeError;
use sqlbridge_driver::DriverError;

use crate::Error;

impl From<BridgeError> for Error {
    fn from(err: BridgeError) -> Self {
        match err {
            BridgeError::UnsupportedType { semantic } => Error::UnsupportedType { semantic },
            BridgeError::UnknownTypeCode { code } => Error::UnknownTypeCode { code },
            BridgeError::ConversionNotSupported { key } => Error::ConversionNotSupported { key },
            BridgeError::ConversionFailed {
                target,
                actual,
                reason,
            } => Error::ConversionFailed {
                target,
                actual,
                reason,
            },
            BridgeError::StreamRead { bytes_read, source } => {
                Error::StreamRead { bytes_read, source }
            }
            BridgeError::UnsupportedIsolationLevel { level } => {
                Error::UnsupportedIsolationLevel { level }
            }
            // Only produced while building a table, which never fails outright
            e @ BridgeError::InvalidMapping { .. } => Error::Config {
                reason: e.to_string(),
            },
        }
    }
}

impl From<DriverError> for Error {
    fn from(source: DriverError) -> Self {
        Error::Driver { source }
    }
}
