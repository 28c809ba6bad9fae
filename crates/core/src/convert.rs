//! Value converters
//!
//! Encoders turn a host [`Value`] into a [`ForeignValue`] and are keyed by
//! the caller's declared [`SemanticType`]. Decoders turn a driver value
//! back into a host value and are keyed by the column's [`TypeCode`],
//! because what comes back is dictated by the result, not by the caller.
//!
//! ## Tolerance rules
//!
//! - Integer and float decoders accept any value of the driver's numeric
//!   family and narrow or widen it to the requested width. A value that
//!   does not fit fails with `ConversionFailed`.
//! - Unsigned host widths travel as the signed driver type of the same
//!   width (two's complement), and decode accepts either reading.
//! - Date/time values travel as milliseconds relative to one shared
//!   [`EpochAnchor`], so encode and decode are exact inverses at
//!   millisecond granularity.
//! - `Null` passes through every registered converter unchanged.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Local, NaiveDateTime, TimeDelta, TimeZone};
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;

use crate::error::{BridgeError, BridgeResult};
use crate::foreign::{ForeignBlob, ForeignValue};
use crate::types::{SemanticType, TypeCode};
use crate::value::Value;

/// Chunk size used when draining BLOB streams.
pub const DEFAULT_BLOB_CHUNK_SIZE: usize = 8192;

/// Host → driver converter
pub type Encoder = fn(&ConvertContext, Value) -> BridgeResult<ForeignValue>;

/// Driver → host converter
pub type Decoder = fn(&ConvertContext, ForeignValue) -> BridgeResult<Value>;

// =============================================================================
// Epoch anchor
// =============================================================================

/// Reference instant for the millisecond date/time encoding.
///
/// Every temporal converter of one table shares the same anchor; using two
/// different anchors for encode and decode breaks round-tripping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EpochAnchor(NaiveDateTime);

impl EpochAnchor {
    /// 1970-01-01T00:00:00, read as local wall-clock time
    pub fn unix() -> Self {
        Self(DateTime::UNIX_EPOCH.naive_utc())
    }

    /// Anchor at an arbitrary instant
    pub fn new(at: NaiveDateTime) -> Self {
        Self(at)
    }

    /// Local wall-clock reading of the Unix epoch plus one hour.
    ///
    /// Matches the anchor of the engine's historical .NET bridge and is only
    /// useful when bit-exact parity with data written through it matters.
    pub fn legacy_offset() -> Self {
        let local = Local.from_utc_datetime(&DateTime::UNIX_EPOCH.naive_utc());
        Self(local.naive_local() + TimeDelta::hours(1))
    }

    /// The anchor instant
    pub fn instant(&self) -> NaiveDateTime {
        self.0
    }

    /// Whole milliseconds from the anchor to `at` (truncated toward zero)
    pub fn to_millis(&self, at: NaiveDateTime) -> i64 {
        at.signed_duration_since(self.0).num_milliseconds()
    }

    /// Anchor plus `ms` milliseconds
    pub fn from_millis(&self, ms: i64) -> BridgeResult<NaiveDateTime> {
        TimeDelta::try_milliseconds(ms)
            .and_then(|delta| self.0.checked_add_signed(delta))
            .ok_or_else(|| {
                BridgeError::conversion("DateTime", "Timestamp", format!("{} ms is out of range", ms))
            })
    }
}

impl Default for EpochAnchor {
    fn default() -> Self {
        Self::unix()
    }
}

/// Settings shared by every converter of one table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConvertContext {
    /// Reference instant for temporal values
    pub anchor: EpochAnchor,
    /// Read size used when draining BLOB streams
    pub blob_chunk_size: usize,
}

impl Default for ConvertContext {
    fn default() -> Self {
        Self {
            anchor: EpochAnchor::default(),
            blob_chunk_size: DEFAULT_BLOB_CHUNK_SIZE,
        }
    }
}

// =============================================================================
// ValueConverters
// =============================================================================

/// Immutable encode/decode tables.
#[derive(Clone, Default)]
pub struct ValueConverters {
    encoders: HashMap<SemanticType, Encoder>,
    decoders: HashMap<TypeCode, Decoder>,
    context: ConvertContext,
}

impl ValueConverters {
    /// Start an empty table using `context`
    pub fn builder(context: ConvertContext) -> ValueConvertersBuilder {
        ValueConvertersBuilder {
            converters: ValueConverters {
                context,
                ..ValueConverters::default()
            },
        }
    }

    /// Settings the converters run with
    pub fn context(&self) -> &ConvertContext {
        &self.context
    }

    /// True when an encoder exists for `semantic`
    pub fn has_encoder(&self, semantic: SemanticType) -> bool {
        self.encoders.contains_key(&semantic)
    }

    /// True when a decoder exists for `code`
    pub fn has_decoder(&self, code: TypeCode) -> bool {
        self.decoders.contains_key(&code)
    }

    /// Encode a host value declared as `semantic`
    pub fn encode(&self, semantic: SemanticType, value: Value) -> BridgeResult<ForeignValue> {
        let encoder = self
            .encoders
            .get(&semantic)
            .ok_or_else(|| BridgeError::ConversionNotSupported {
                key: format!("encode {}", semantic),
            })?;
        if value.is_null() {
            return Ok(ForeignValue::Null);
        }
        encoder(&self.context, value)
    }

    /// Decode a driver value from a column typed `code`
    pub fn decode(&self, code: TypeCode, value: ForeignValue) -> BridgeResult<Value> {
        let decoder = self
            .decoders
            .get(&code)
            .ok_or_else(|| BridgeError::ConversionNotSupported {
                key: format!("decode type code {}", code),
            })?;
        if value.is_null() {
            return Ok(Value::Null);
        }
        decoder(&self.context, value)
    }
}

impl fmt::Debug for ValueConverters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValueConverters")
            .field("encoders", &self.encoders.len())
            .field("decoders", &self.decoders.len())
            .field("context", &self.context)
            .finish()
    }
}

/// Accumulates converters; the first registration of a key wins.
pub struct ValueConvertersBuilder {
    converters: ValueConverters,
}

impl ValueConvertersBuilder {
    /// Register the encoder for `semantic`; returns false if one already exists
    pub fn register_encoder(&mut self, semantic: SemanticType, encoder: Encoder) -> bool {
        if self.converters.encoders.contains_key(&semantic) {
            return false;
        }
        self.converters.encoders.insert(semantic, encoder);
        true
    }

    /// Register the decoder for `code`; returns false if one already exists
    pub fn register_decoder(&mut self, code: TypeCode, decoder: Decoder) -> bool {
        if self.converters.decoders.contains_key(&code) {
            return false;
        }
        self.converters.decoders.insert(code, decoder);
        true
    }

    /// Finish building
    pub fn build(self) -> ValueConverters {
        self.converters
    }
}

// =============================================================================
// Shared helpers
// =============================================================================

fn parse_decimal(text: &str) -> Option<Decimal> {
    let t = text.trim();
    Decimal::from_str_exact(t)
        .or_else(|_| Decimal::from_str(t))
        .or_else(|_| Decimal::from_scientific(t))
        .ok()
}

fn float_to_decimal(f: f64) -> Option<Decimal> {
    if !f.is_finite() {
        return None;
    }
    // Display gives the shortest text that reads back as `f`
    parse_decimal(&f.to_string())
}

fn decimal_integral(d: Decimal) -> Option<i128> {
    if d.fract().is_zero() {
        d.to_i128()
    } else {
        None
    }
}

fn float_integral(f: f64) -> Option<i128> {
    if f.is_finite() && f.fract() == 0.0 {
        Some(f as i128)
    } else {
        None
    }
}

/// Integral reading of a driver value, if it has one.
fn foreign_integral(value: &ForeignValue) -> Option<i128> {
    match value {
        ForeignValue::Boolean(b) => Some(i128::from(*b)),
        ForeignValue::Byte(v) => Some(i128::from(*v)),
        ForeignValue::Short(v) => Some(i128::from(*v)),
        ForeignValue::Int(v) => Some(i128::from(*v)),
        ForeignValue::Long(v) => Some(i128::from(*v)),
        ForeignValue::Float(v) => float_integral(f64::from(*v)),
        ForeignValue::Double(v) => float_integral(*v),
        ForeignValue::Decimal(text) => parse_decimal(text).and_then(decimal_integral),
        ForeignValue::String(s) => s.trim().parse::<i128>().ok(),
        _ => None,
    }
}

/// Floating reading of a driver value, if it has one.
fn foreign_real(value: &ForeignValue) -> Option<f64> {
    match value {
        ForeignValue::Boolean(b) => Some(if *b { 1.0 } else { 0.0 }),
        ForeignValue::Byte(v) => Some(f64::from(*v)),
        ForeignValue::Short(v) => Some(f64::from(*v)),
        ForeignValue::Int(v) => Some(f64::from(*v)),
        ForeignValue::Long(v) => Some(*v as f64),
        ForeignValue::Float(v) => Some(f64::from(*v)),
        ForeignValue::Double(v) => Some(*v),
        ForeignValue::Decimal(text) => parse_decimal(text).and_then(|d| d.to_f64()),
        ForeignValue::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// Integral reading of a host value, if it has one.
fn host_integral(value: &Value) -> Option<i128> {
    match value {
        Value::U8(v) => Some(i128::from(*v)),
        Value::I8(v) => Some(i128::from(*v)),
        Value::I16(v) => Some(i128::from(*v)),
        Value::I32(v) => Some(i128::from(*v)),
        Value::I64(v) => Some(i128::from(*v)),
        Value::U16(v) => Some(i128::from(*v)),
        Value::U32(v) => Some(i128::from(*v)),
        Value::U64(v) => Some(i128::from(*v)),
        Value::Decimal(d) => decimal_integral(*d),
        Value::F32(v) => float_integral(f64::from(*v)),
        Value::F64(v) => float_integral(*v),
        Value::String(s) => s.trim().parse::<i128>().ok(),
        _ => None,
    }
}

/// Floating reading of a host value, if it has one.
fn host_real(value: &Value) -> Option<f64> {
    match value {
        Value::F32(v) => Some(f64::from(*v)),
        Value::F64(v) => Some(*v),
        Value::Decimal(d) => d.to_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        other => host_integral(other).map(|n| n as f64),
    }
}

fn narrow<T: TryFrom<i128>>(n: i128, target: &str, actual: &str) -> BridgeResult<T> {
    T::try_from(n)
        .map_err(|_| BridgeError::conversion(target, actual, format!("{} is out of range", n)))
}

fn foreign_int<T: TryFrom<i128>>(value: &ForeignValue, target: &str) -> BridgeResult<T> {
    let n = foreign_integral(value)
        .ok_or_else(|| BridgeError::conversion(target, value.kind(), "not an integral number"))?;
    narrow(n, target, value.kind())
}

fn host_int<T: TryFrom<i128>>(value: &Value, target: &str) -> BridgeResult<T> {
    let n = host_integral(value)
        .ok_or_else(|| BridgeError::conversion(target, value.type_name(), "not an integral number"))?;
    narrow(n, target, value.type_name())
}

/// Read an unsigned width from either its own range or the same-width signed range.
macro_rules! foreign_unsigned {
    ($value:expr, $unsigned:ty, $signed:ty, $target:expr) => {{
        let value = $value;
        let n = foreign_integral(&value)
            .ok_or_else(|| BridgeError::conversion($target, value.kind(), "not an integral number"))?;
        <$unsigned>::try_from(n)
            .or_else(|_| <$signed>::try_from(n).map(|s| s as $unsigned))
            .map_err(|_| BridgeError::conversion($target, value.kind(), format!("{} is out of range", n)))?
    }};
}

fn instant_millis(ctx: &ConvertContext, value: &Value, target: &str) -> BridgeResult<i64> {
    match value {
        Value::DateTime(dt) => Ok(ctx.anchor.to_millis(*dt)),
        Value::DateTimeOffset(dto) => Ok(ctx.anchor.to_millis(dto.naive_utc())),
        other => Err(BridgeError::conversion(target, other.type_name(), "not a date/time value")),
    }
}

fn foreign_millis(value: &ForeignValue, target: &str) -> BridgeResult<i64> {
    match value {
        ForeignValue::Date(ms) | ForeignValue::Time(ms) | ForeignValue::Timestamp(ms) => Ok(*ms),
        other => foreign_int::<i64>(other, target),
    }
}

/// Drain a BLOB stream in `chunk_size` reads into one buffer.
///
/// On failure the partial buffer is dropped and only its length is reported.
pub fn drain_blob(mut blob: ForeignBlob, chunk_size: usize) -> BridgeResult<Vec<u8>> {
    let mut buffer = Vec::with_capacity(blob.length_hint().unwrap_or(0) as usize);
    let mut chunk = vec![0u8; chunk_size.max(1)];
    loop {
        match blob.read_chunk(&mut chunk) {
            Ok(0) => return Ok(buffer),
            Ok(n) => buffer.extend_from_slice(&chunk[..n]),
            Err(source) => {
                return Err(BridgeError::StreamRead {
                    bytes_read: buffer.len(),
                    source,
                })
            }
        }
    }
}

// =============================================================================
// Identity (natural) converters
// =============================================================================

/// Pass a host value through as its natural driver counterpart.
pub fn encode_identity(ctx: &ConvertContext, value: Value) -> BridgeResult<ForeignValue> {
    Ok(match value {
        Value::Null => ForeignValue::Null,
        Value::Bool(b) => ForeignValue::Boolean(b),
        Value::U8(v) => ForeignValue::Short(i16::from(v)),
        Value::I8(v) => ForeignValue::Byte(v),
        Value::I16(v) => ForeignValue::Short(v),
        Value::I32(v) => ForeignValue::Int(v),
        Value::I64(v) => ForeignValue::Long(v),
        Value::U16(v) => ForeignValue::Int(i32::from(v)),
        Value::U32(v) => ForeignValue::Long(i64::from(v)),
        Value::U64(v) => match i64::try_from(v) {
            Ok(n) => ForeignValue::Long(n),
            Err(_) => ForeignValue::Decimal(v.to_string()),
        },
        Value::F32(v) => ForeignValue::Float(v),
        Value::F64(v) => ForeignValue::Double(v),
        Value::Decimal(d) => ForeignValue::Decimal(d.to_string()),
        Value::String(s) => ForeignValue::String(s),
        Value::Bytes(b) => ForeignValue::Bytes(b),
        Value::DateTime(dt) => ForeignValue::Timestamp(ctx.anchor.to_millis(dt)),
        Value::DateTimeOffset(dto) => ForeignValue::Timestamp(ctx.anchor.to_millis(dto.naive_utc())),
        Value::Array(items) => ForeignValue::Array(
            items
                .into_iter()
                .map(|v| encode_identity(ctx, v))
                .collect::<BridgeResult<_>>()?,
        ),
    })
}

/// Take a driver value as its natural host counterpart.
pub fn decode_identity(ctx: &ConvertContext, value: ForeignValue) -> BridgeResult<Value> {
    Ok(match value {
        ForeignValue::Null => Value::Null,
        ForeignValue::Boolean(b) => Value::Bool(b),
        ForeignValue::Byte(v) => Value::I8(v),
        ForeignValue::Short(v) => Value::I16(v),
        ForeignValue::Int(v) => Value::I32(v),
        ForeignValue::Long(v) => Value::I64(v),
        ForeignValue::Float(v) => Value::F32(v),
        ForeignValue::Double(v) => Value::F64(v),
        ForeignValue::Decimal(text) => Value::Decimal(
            parse_decimal(&text)
                .ok_or_else(|| BridgeError::conversion("Decimal", "Decimal", format!("bad text '{}'", text)))?,
        ),
        ForeignValue::String(s) => Value::String(s),
        ForeignValue::Bytes(b) => Value::Bytes(b),
        ForeignValue::Blob(blob) => Value::Bytes(drain_blob(blob, ctx.blob_chunk_size)?),
        ForeignValue::Date(ms) | ForeignValue::Time(ms) | ForeignValue::Timestamp(ms) => {
            Value::DateTime(ctx.anchor.from_millis(ms)?)
        }
        ForeignValue::Array(items) => Value::Array(
            items
                .into_iter()
                .map(|v| decode_identity(ctx, v))
                .collect::<BridgeResult<_>>()?,
        ),
    })
}

// =============================================================================
// Binary large objects
// =============================================================================

/// Send bytes as a driver-side blob
pub fn encode_blob(_ctx: &ConvertContext, value: Value) -> BridgeResult<ForeignValue> {
    match value {
        Value::Bytes(b) => Ok(ForeignValue::Blob(ForeignBlob::from_bytes(b))),
        other => Err(BridgeError::conversion("Blob", other.type_name(), "expected bytes")),
    }
}

/// Drain a blob stream; raw byte arrays pass through
pub fn decode_blob(ctx: &ConvertContext, value: ForeignValue) -> BridgeResult<Value> {
    match value {
        ForeignValue::Blob(blob) => Ok(Value::Bytes(drain_blob(blob, ctx.blob_chunk_size)?)),
        ForeignValue::Bytes(b) => Ok(Value::Bytes(b)),
        other => decode_identity(ctx, other),
    }
}

/// Character large object: text, or a stream of UTF-8 bytes
pub fn decode_clob(ctx: &ConvertContext, value: ForeignValue) -> BridgeResult<Value> {
    match value {
        ForeignValue::Blob(blob) => {
            let bytes = drain_blob(blob, ctx.blob_chunk_size)?;
            String::from_utf8(bytes)
                .map(Value::String)
                .map_err(|e| BridgeError::conversion("String", "Blob", e.to_string()))
        }
        other => decode_identity(ctx, other),
    }
}

// =============================================================================
// Boolean, byte, integers
// =============================================================================

/// Box a boolean
pub fn encode_bool(_ctx: &ConvertContext, value: Value) -> BridgeResult<ForeignValue> {
    match value {
        Value::Bool(b) => Ok(ForeignValue::Boolean(b)),
        other => host_int::<i128>(&other, "Boolean").map(|n| ForeignValue::Boolean(n != 0)),
    }
}

/// Unbox a boolean, accepting any numeric (non-zero is true) and true/false text
pub fn decode_bool(_ctx: &ConvertContext, value: ForeignValue) -> BridgeResult<Value> {
    match value {
        ForeignValue::Boolean(b) => Ok(Value::Bool(b)),
        ForeignValue::String(ref s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" => Ok(Value::Bool(true)),
            "false" | "0" => Ok(Value::Bool(false)),
            _ => Err(BridgeError::conversion("Bool", "String", format!("'{}' is not a boolean", s))),
        },
        other => foreign_real(&other)
            .map(|f| Value::Bool(f != 0.0))
            .ok_or_else(|| BridgeError::conversion("Bool", other.kind(), "not a boolean")),
    }
}

/// Unsigned byte, sent as the driver's signed byte
pub fn encode_u8(_ctx: &ConvertContext, value: Value) -> BridgeResult<ForeignValue> {
    let v: u8 = host_int(&value, "Byte")?;
    Ok(ForeignValue::Byte(v as i8))
}

/// Unsigned byte from any numeric
pub fn decode_u8(_ctx: &ConvertContext, value: ForeignValue) -> BridgeResult<Value> {
    Ok(Value::U8(foreign_unsigned!(value, u8, i8, "U8")))
}

/// Signed byte
pub fn encode_i8(_ctx: &ConvertContext, value: Value) -> BridgeResult<ForeignValue> {
    host_int(&value, "Byte").map(ForeignValue::Byte)
}

/// Signed byte from any numeric
pub fn decode_i8(_ctx: &ConvertContext, value: ForeignValue) -> BridgeResult<Value> {
    foreign_int(&value, "I8").map(Value::I8)
}

/// 16-bit signed integer
pub fn encode_i16(_ctx: &ConvertContext, value: Value) -> BridgeResult<ForeignValue> {
    host_int(&value, "Short").map(ForeignValue::Short)
}

/// 16-bit signed integer, narrowed from any numeric
pub fn decode_i16(_ctx: &ConvertContext, value: ForeignValue) -> BridgeResult<Value> {
    foreign_int(&value, "I16").map(Value::I16)
}

/// 32-bit signed integer
pub fn encode_i32(_ctx: &ConvertContext, value: Value) -> BridgeResult<ForeignValue> {
    host_int(&value, "Int").map(ForeignValue::Int)
}

/// 32-bit signed integer, narrowed from any numeric
pub fn decode_i32(_ctx: &ConvertContext, value: ForeignValue) -> BridgeResult<Value> {
    foreign_int(&value, "I32").map(Value::I32)
}

/// 64-bit signed integer
pub fn encode_i64(_ctx: &ConvertContext, value: Value) -> BridgeResult<ForeignValue> {
    host_int(&value, "Long").map(ForeignValue::Long)
}

/// 64-bit signed integer from any numeric
pub fn decode_i64(_ctx: &ConvertContext, value: ForeignValue) -> BridgeResult<Value> {
    foreign_int(&value, "I64").map(Value::I64)
}

/// 16-bit unsigned integer, sent as the same bits in a signed short
pub fn encode_u16(_ctx: &ConvertContext, value: Value) -> BridgeResult<ForeignValue> {
    let v: u16 = host_int(&value, "Short")?;
    Ok(ForeignValue::Short(v as i16))
}

/// 16-bit unsigned integer from any numeric
pub fn decode_u16(_ctx: &ConvertContext, value: ForeignValue) -> BridgeResult<Value> {
    Ok(Value::U16(foreign_unsigned!(value, u16, i16, "U16")))
}

/// 32-bit unsigned integer, sent as the same bits in a signed int
pub fn encode_u32(_ctx: &ConvertContext, value: Value) -> BridgeResult<ForeignValue> {
    let v: u32 = host_int(&value, "Int")?;
    Ok(ForeignValue::Int(v as i32))
}

/// 32-bit unsigned integer from any numeric
pub fn decode_u32(_ctx: &ConvertContext, value: ForeignValue) -> BridgeResult<Value> {
    Ok(Value::U32(foreign_unsigned!(value, u32, i32, "U32")))
}

/// 64-bit unsigned integer, sent as the same bits in a signed long
pub fn encode_u64(_ctx: &ConvertContext, value: Value) -> BridgeResult<ForeignValue> {
    let v: u64 = host_int(&value, "Long")?;
    Ok(ForeignValue::Long(v as i64))
}

/// 64-bit unsigned integer from any numeric
pub fn decode_u64(_ctx: &ConvertContext, value: ForeignValue) -> BridgeResult<Value> {
    Ok(Value::U64(foreign_unsigned!(value, u64, i64, "U64")))
}

// =============================================================================
// Floating point and decimal
// =============================================================================

/// Single-precision float
pub fn encode_f32(_ctx: &ConvertContext, value: Value) -> BridgeResult<ForeignValue> {
    host_real(&value)
        .map(|f| ForeignValue::Float(f as f32))
        .ok_or_else(|| BridgeError::conversion("Float", value.type_name(), "not a number"))
}

/// Single-precision float, narrowed from any numeric
pub fn decode_f32(_ctx: &ConvertContext, value: ForeignValue) -> BridgeResult<Value> {
    match value {
        ForeignValue::Float(f) => Ok(Value::F32(f)),
        other => foreign_real(&other)
            .map(|f| Value::F32(f as f32))
            .ok_or_else(|| BridgeError::conversion("F32", other.kind(), "not a number")),
    }
}

/// Double-precision float
pub fn encode_f64(_ctx: &ConvertContext, value: Value) -> BridgeResult<ForeignValue> {
    host_real(&value)
        .map(ForeignValue::Double)
        .ok_or_else(|| BridgeError::conversion("Double", value.type_name(), "not a number"))
}

/// Double-precision float, widened from any numeric
pub fn decode_f64(_ctx: &ConvertContext, value: ForeignValue) -> BridgeResult<Value> {
    foreign_real(&value)
        .map(Value::F64)
        .ok_or_else(|| BridgeError::conversion("F64", value.kind(), "not a number"))
}

/// Exact decimal, sent as canonical text
pub fn encode_decimal(_ctx: &ConvertContext, value: Value) -> BridgeResult<ForeignValue> {
    let decimal = match &value {
        Value::Decimal(d) => Some(*d),
        Value::F32(f) => float_to_decimal(f64::from(*f)),
        Value::F64(f) => float_to_decimal(*f),
        Value::String(s) => parse_decimal(s),
        other => host_integral(other).and_then(Decimal::from_i128),
    };
    decimal
        .map(|d| ForeignValue::Decimal(d.to_string()))
        .ok_or_else(|| BridgeError::conversion("Decimal", value.type_name(), "not representable as a decimal"))
}

/// Exact decimal from decimal text or any numeric
pub fn decode_decimal(_ctx: &ConvertContext, value: ForeignValue) -> BridgeResult<Value> {
    let decimal = match &value {
        ForeignValue::Decimal(text) | ForeignValue::String(text) => parse_decimal(text),
        ForeignValue::Float(f) => float_to_decimal(f64::from(*f)),
        ForeignValue::Double(f) => float_to_decimal(*f),
        other => foreign_integral(other).and_then(Decimal::from_i128),
    };
    decimal
        .map(Value::Decimal)
        .ok_or_else(|| BridgeError::conversion("Decimal", value.kind(), "not representable as a decimal"))
}

// =============================================================================
// Date and time
// =============================================================================

/// Date, as milliseconds from the anchor
pub fn encode_date(ctx: &ConvertContext, value: Value) -> BridgeResult<ForeignValue> {
    instant_millis(ctx, &value, "Date").map(ForeignValue::Date)
}

/// Time of day, as milliseconds from the anchor
pub fn encode_time(ctx: &ConvertContext, value: Value) -> BridgeResult<ForeignValue> {
    instant_millis(ctx, &value, "Time").map(ForeignValue::Time)
}

/// Timestamp, as milliseconds from the anchor
pub fn encode_timestamp(ctx: &ConvertContext, value: Value) -> BridgeResult<ForeignValue> {
    instant_millis(ctx, &value, "Timestamp").map(ForeignValue::Timestamp)
}

/// Anchor plus the value's milliseconds
pub fn decode_datetime(ctx: &ConvertContext, value: ForeignValue) -> BridgeResult<Value> {
    let ms = foreign_millis(&value, "DateTime")?;
    ctx.anchor.from_millis(ms).map(Value::DateTime)
}

/// Anchor plus the value's milliseconds, read as UTC
pub fn decode_datetime_offset(ctx: &ConvertContext, value: ForeignValue) -> BridgeResult<Value> {
    let ms = foreign_millis(&value, "DateTimeOffset")?;
    let at = ctx.anchor.from_millis(ms)?;
    Ok(Value::DateTimeOffset(at.and_utc().fixed_offset()))
}
