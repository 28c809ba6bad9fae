//! Values on the driver side of the boundary
//!
//! [`ForeignValue`] is the tagged union of everything the driver accepts
//! as a parameter or hands back in a result row. Drivers commonly return
//! one numeric family (`Long`/`Double`) regardless of the declared SQL
//! width, so decoders must not assume the variant matches the column's
//! type code.

use std::fmt;
use std::io::{self, Cursor, Read};

/// Streamed binary large object handed out by the driver.
///
/// The stream is read exactly once, by the BLOB decoder.
pub struct ForeignBlob {
    reader: Box<dyn Read + Send>,
    length_hint: Option<u64>,
}

impl ForeignBlob {
    /// Wrap an arbitrary reader
    pub fn new(reader: impl Read + Send + 'static) -> Self {
        Self {
            reader: Box::new(reader),
            length_hint: None,
        }
    }

    /// Blob backed by an in-memory buffer
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        let len = bytes.len() as u64;
        Self {
            reader: Box::new(Cursor::new(bytes)),
            length_hint: Some(len),
        }
    }

    /// Total length, when the driver knows it up front
    pub fn length_hint(&self) -> Option<u64> {
        self.length_hint
    }

    /// Read the next chunk into `buf`, returning the byte count (0 at end)
    pub fn read_chunk(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        loop {
            match self.reader.read(buf) {
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                other => return other,
            }
        }
    }
}

impl fmt::Debug for ForeignBlob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ForeignBlob")
            .field("length_hint", &self.length_hint)
            .finish_non_exhaustive()
    }
}

/// Driver-side value.
///
/// Temporal variants carry milliseconds relative to the driver epoch.
#[derive(Debug)]
pub enum ForeignValue {
    Null,
    Boolean(bool),
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    /// Canonical decimal text, e.g. `"123.45"`
    Decimal(String),
    String(String),
    Bytes(Vec<u8>),
    Blob(ForeignBlob),
    Date(i64),
    Time(i64),
    Timestamp(i64),
    Array(Vec<ForeignValue>),
}

impl ForeignValue {
    /// Variant name, used in conversion errors
    pub fn kind(&self) -> &'static str {
        match self {
            ForeignValue::Null => "Null",
            ForeignValue::Boolean(_) => "Boolean",
            ForeignValue::Byte(_) => "Byte",
            ForeignValue::Short(_) => "Short",
            ForeignValue::Int(_) => "Int",
            ForeignValue::Long(_) => "Long",
            ForeignValue::Float(_) => "Float",
            ForeignValue::Double(_) => "Double",
            ForeignValue::Decimal(_) => "Decimal",
            ForeignValue::String(_) => "String",
            ForeignValue::Bytes(_) => "Bytes",
            ForeignValue::Blob(_) => "Blob",
            ForeignValue::Date(_) => "Date",
            ForeignValue::Time(_) => "Time",
            ForeignValue::Timestamp(_) => "Timestamp",
            ForeignValue::Array(_) => "Array",
        }
    }

    /// Check if this is a null value
    pub fn is_null(&self) -> bool {
        matches!(self, ForeignValue::Null)
    }

    /// True for the generic numeric family (including boolean 0/1)
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            ForeignValue::Byte(_)
                | ForeignValue::Short(_)
                | ForeignValue::Int(_)
                | ForeignValue::Long(_)
                | ForeignValue::Float(_)
                | ForeignValue::Double(_)
                | ForeignValue::Decimal(_)
        )
    }
}

/// Equality for the comparable variants; a blob never equals anything.
impl PartialEq for ForeignValue {
    fn eq(&self, other: &Self) -> bool {
        use ForeignValue::*;
        match (self, other) {
            (Null, Null) => true,
            (Boolean(a), Boolean(b)) => a == b,
            (Byte(a), Byte(b)) => a == b,
            (Short(a), Short(b)) => a == b,
            (Int(a), Int(b)) => a == b,
            (Long(a), Long(b)) => a == b,
            (Float(a), Float(b)) => a == b,
            (Double(a), Double(b)) => a == b,
            (Decimal(a), Decimal(b)) => a == b,
            (String(a), String(b)) => a == b,
            (Bytes(a), Bytes(b)) => a == b,
            (Date(a), Date(b)) => a == b,
            (Time(a), Time(b)) => a == b,
            (Timestamp(a), Timestamp(b)) => a == b,
            (Array(a), Array(b)) => a == b,
            _ => false,
        }
    }
}
