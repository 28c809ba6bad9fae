//! The standard marshalling table
//!
//! A [`Bridge`] pairs a [`TypeRegistry`] with the [`ValueConverters`] built
//! alongside it. [`Bridge::standard`] loads the table for the embedded
//! engine; the build is best effort, so an entry that fails validation is
//! logged and skipped while the rest still load.
//!
//! Order matters: several semantic types share a type code, and the first
//! registration of each key is the one that sticks. TIMESTAMP therefore
//! decodes as `DateTime`, TINYINT as `Byte`, and SMALLINT/INTEGER/BIGINT as
//! the signed widths.

use tracing::warn;

use crate::convert::{self, ConvertContext, Decoder, Encoder, EpochAnchor, ValueConverters};
use crate::error::BridgeResult;
use crate::foreign::ForeignValue;
use crate::registry::TypeRegistry;
use crate::types::{HostType, SemanticType, TypeCode};
use crate::value::Value;

/// A registration entry that failed validation while building a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedMapping {
    pub code: TypeCode,
    pub semantic: SemanticType,
    pub reason: String,
}

/// Type registry plus converters, immutable once built.
#[derive(Debug, Clone)]
pub struct Bridge {
    registry: TypeRegistry,
    converters: ValueConverters,
    rejected: Vec<RejectedMapping>,
}

impl Bridge {
    /// Standard table with the default context
    pub fn standard() -> Self {
        Self::with_context(ConvertContext::default())
    }

    /// Standard table with temporal values anchored at `anchor`
    pub fn with_anchor(anchor: EpochAnchor) -> Self {
        Self::with_context(ConvertContext {
            anchor,
            ..ConvertContext::default()
        })
    }

    /// Standard table with explicit converter settings
    pub fn with_context(context: ConvertContext) -> Self {
        let mut b = Bridge::builder(context);
        load_standard_table(&mut b);
        b.build()
    }

    /// Start an empty table
    pub fn builder(context: ConvertContext) -> BridgeBuilder {
        BridgeBuilder {
            registry: TypeRegistry::builder(),
            converters: ValueConverters::builder(context),
            rejected: Vec::new(),
        }
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    pub fn converters(&self) -> &ValueConverters {
        &self.converters
    }

    /// Entries dropped during the build
    pub fn rejected(&self) -> &[RejectedMapping] {
        &self.rejected
    }

    /// Resolve the wire type of a parameter and encode its value.
    pub fn encode_parameter(
        &self,
        semantic: SemanticType,
        value: Value,
    ) -> BridgeResult<(TypeCode, ForeignValue)> {
        let code = self.registry.resolve_type_code(semantic)?;
        let foreign = self.converters.encode(semantic, value)?;
        Ok((code, foreign))
    }

    /// Decode one cell of a column typed `code`
    pub fn decode_column(&self, code: TypeCode, value: ForeignValue) -> BridgeResult<Value> {
        self.converters.decode(code, value)
    }
}

impl Default for Bridge {
    fn default() -> Self {
        Self::standard()
    }
}

/// Accumulates mappings and converters for a [`Bridge`].
pub struct BridgeBuilder {
    registry: crate::registry::TypeRegistryBuilder,
    converters: crate::convert::ValueConvertersBuilder,
    rejected: Vec<RejectedMapping>,
}

impl BridgeBuilder {
    /// Register one entry of the table.
    ///
    /// Never fails: a rejected mapping is logged, recorded and skipped, and
    /// its converters are not registered either.
    pub fn map(
        &mut self,
        code: TypeCode,
        semantic: SemanticType,
        host: Option<HostType>,
        encoder: Encoder,
        decoder: Decoder,
    ) -> &mut Self {
        match self.registry.register_mapping(code, semantic, host) {
            Ok(_) => {
                self.converters.register_encoder(semantic, encoder);
                self.converters.register_decoder(code, decoder);
            }
            Err(e) => {
                warn!(
                    target: "sqlbridge::registry",
                    code = code.0,
                    semantic = %semantic,
                    error = %e,
                    "Skipping type mapping"
                );
                self.rejected.push(RejectedMapping {
                    code,
                    semantic,
                    reason: e.to_string(),
                });
            }
        }
        self
    }

    pub fn build(self) -> Bridge {
        Bridge {
            registry: self.registry.build(),
            converters: self.converters.build(),
            rejected: self.rejected,
        }
    }
}

// =============================================================================
// Standard table
// =============================================================================

fn load_standard_table(b: &mut BridgeBuilder) {
    use convert::*;
    use HostType as H;
    use SemanticType as S;

    b.map(TypeCode::VARCHAR, S::AnsiString, Some(H::String), encode_identity, decode_identity)
        .map(TypeCode::CHAR, S::AnsiStringFixedLength, Some(H::String), encode_identity, decode_identity)
        .map(TypeCode::LONGVARBINARY, S::Binary, Some(H::Bytes), encode_identity, decode_identity)
        .map(TypeCode::BINARY, S::Binary, Some(H::Bytes), encode_identity, decode_identity)
        .map(TypeCode::BLOB, S::Binary, Some(H::Bytes), encode_blob, decode_blob)
        .map(TypeCode::BOOLEAN, S::Boolean, Some(H::Bool), encode_bool, decode_bool)
        .map(TypeCode::TINYINT, S::Byte, Some(H::U8), encode_u8, decode_u8)
        .map(TypeCode::DATE, S::Date, Some(H::DateTime), encode_date, decode_datetime)
        .map(TypeCode::TIMESTAMP, S::DateTime, Some(H::DateTime), encode_timestamp, decode_datetime)
        .map(TypeCode::TIMESTAMP, S::DateTime2, Some(H::DateTime), encode_timestamp, decode_datetime)
        .map(
            TypeCode::TIMESTAMP,
            S::DateTimeOffset,
            Some(H::DateTimeOffset),
            encode_timestamp,
            decode_datetime_offset,
        )
        .map(TypeCode::DECIMAL, S::Decimal, Some(H::Decimal), encode_decimal, decode_decimal)
        .map(TypeCode::DOUBLE, S::Double, Some(H::F64), encode_f64, decode_f64)
        .map(TypeCode::SMALLINT, S::Int16, Some(H::I16), encode_i16, decode_i16)
        .map(TypeCode::INTEGER, S::Int32, Some(H::I32), encode_i32, decode_i32)
        .map(TypeCode::BIGINT, S::Int64, Some(H::I64), encode_i64, decode_i64)
        .map(TypeCode::SMALLINT, S::UInt16, Some(H::U16), encode_u16, decode_u16)
        .map(TypeCode::INTEGER, S::UInt32, Some(H::U32), encode_u32, decode_u32)
        .map(TypeCode::BIGINT, S::UInt64, Some(H::U64), encode_u64, decode_u64)
        .map(TypeCode::JAVA_OBJECT, S::Object, Some(H::Object), encode_identity, decode_identity)
        .map(TypeCode::TINYINT, S::SByte, Some(H::I8), encode_i8, decode_i8)
        .map(TypeCode::FLOAT, S::Single, Some(H::F32), encode_f32, decode_f32)
        .map(TypeCode::REAL, S::Single, Some(H::F32), encode_f32, decode_f32)
        .map(TypeCode::NVARCHAR, S::String, Some(H::String), encode_identity, decode_identity)
        .map(TypeCode::NCHAR, S::StringFixedLength, Some(H::String), encode_identity, decode_identity)
        .map(TypeCode::TIME, S::Time, Some(H::DateTime), encode_time, decode_datetime)
        .map(TypeCode::ARRAY, S::VarNumeric, None, encode_identity, decode_identity);

    // Codes the engine reports for declared types the table above does not
    // name; their semantic types are already taken, so only the reverse
    // direction is added.
    b.map(TypeCode::NUMERIC, S::Decimal, Some(H::Decimal), encode_decimal, decode_decimal)
        .map(TypeCode::VARBINARY, S::Binary, Some(H::Bytes), encode_identity, decode_blob)
        .map(TypeCode::LONGVARCHAR, S::String, Some(H::String), encode_identity, decode_clob)
        .map(TypeCode::CLOB, S::String, Some(H::String), encode_identity, decode_clob)
        .map(TypeCode::OTHER, S::Object, Some(H::Object), encode_identity, decode_identity)
        .map(TypeCode::NULL, S::Object, Some(H::Object), encode_identity, decode_identity);
}
