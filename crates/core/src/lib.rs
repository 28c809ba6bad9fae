//! Type and value marshalling for sqlbridge
//!
//! This crate defines everything that crosses the driver boundary:
//! - TypeCode: driver-assigned SQL type identifiers
//! - SemanticType / HostType: the host-side vocabularies
//! - Value: host-native values
//! - ForeignValue / ForeignBlob: driver-side values
//! - TypeRegistry: TypeCode ⇄ SemanticType ⇄ HostType lookups
//! - ValueConverters: encode/decode tables and the epoch anchor
//! - Bridge: the standard table for the embedded engine
//! - IsolationLevel: the five-level isolation vocabulary

#![warn(clippy::all)]

pub mod bridge;
pub mod convert;
pub mod error;
pub mod foreign;
pub mod registry;
pub mod types;
pub mod value;

pub use bridge::{Bridge, BridgeBuilder, RejectedMapping};
pub use convert::{
    ConvertContext, Decoder, Encoder, EpochAnchor, ValueConverters, ValueConvertersBuilder,
    DEFAULT_BLOB_CHUNK_SIZE,
};
pub use error::{BridgeError, BridgeResult};
pub use foreign::{ForeignBlob, ForeignValue};
pub use registry::{semantic_type_of, TypeRegistry, TypeRegistryBuilder};
pub use types::{isolation, HostType, IsolationLevel, SemanticType, TypeCode};
pub use value::Value;
