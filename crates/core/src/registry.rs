//! Type registry: TypeCode ⇄ SemanticType ⇄ HostType
//!
//! Built once through [`TypeRegistryBuilder`] and immutable afterwards.
//! Every key is first-writer-wins: registering a second SemanticType for a
//! TypeCode that already has one leaves the reverse map untouched, which is
//! what makes several semantic types able to share one type code.

use std::collections::HashMap;

use crate::error::{BridgeError, BridgeResult};
use crate::types::{HostType, SemanticType, TypeCode};
use crate::value::Value;

/// Immutable lookup tables between the three type vocabularies.
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    code_to_semantic: HashMap<TypeCode, SemanticType>,
    semantic_to_code: HashMap<SemanticType, TypeCode>,
    code_to_host: HashMap<TypeCode, HostType>,
}

impl TypeRegistry {
    /// Start an empty registry
    pub fn builder() -> TypeRegistryBuilder {
        TypeRegistryBuilder::default()
    }

    /// Driver type code that parameters of `semantic` are sent as
    pub fn resolve_type_code(&self, semantic: SemanticType) -> BridgeResult<TypeCode> {
        self.semantic_to_code
            .get(&semantic)
            .copied()
            .ok_or(BridgeError::UnsupportedType { semantic })
    }

    /// Semantic type of a result column with the given type code
    pub fn resolve_semantic_type(&self, code: TypeCode) -> BridgeResult<SemanticType> {
        self.code_to_semantic
            .get(&code)
            .copied()
            .ok_or(BridgeError::UnknownTypeCode { code })
    }

    /// Host representation of a result column with the given type code
    pub fn resolve_host_type(&self, code: TypeCode) -> BridgeResult<HostType> {
        self.code_to_host
            .get(&code)
            .copied()
            .ok_or(BridgeError::UnknownTypeCode { code })
    }

    /// Number of type codes with a semantic mapping
    pub fn len(&self) -> usize {
        self.code_to_semantic.len()
    }

    /// True when nothing is registered
    pub fn is_empty(&self) -> bool {
        self.code_to_semantic.is_empty()
    }

    /// Type code for a declared SQL type name (`VARCHAR(20)`, `BIGINT`, ...)
    ///
    /// Unrecognized names map to `OTHER`.
    pub fn type_code_for_sql_name(&self, name: &str) -> TypeCode {
        TypeCode::from_sql_name(name)
    }
}

/// Semantic type a parameter takes when bound without a declared type
pub fn semantic_type_of(value: &Value) -> SemanticType {
    SemanticType::infer(value)
}

/// Accumulates mappings; later duplicates of a key are dropped silently.
#[derive(Debug, Default)]
pub struct TypeRegistryBuilder {
    registry: TypeRegistry,
}

impl TypeRegistryBuilder {
    /// Register `(code, semantic, host)`.
    ///
    /// The entry is validated before anything is inserted: a host type must
    /// be the semantic type's natural host type (any host type is accepted
    /// for `Object`). Returns whether any of the three keys was new.
    pub fn register_mapping(
        &mut self,
        code: TypeCode,
        semantic: SemanticType,
        host: Option<HostType>,
    ) -> BridgeResult<bool> {
        if let Some(host) = host {
            if semantic != SemanticType::Object && semantic.natural_host_type() != Some(host) {
                return Err(BridgeError::InvalidMapping {
                    code,
                    semantic,
                    reason: format!(
                        "host type {} does not represent {} values",
                        host, semantic
                    ),
                });
            }
        }

        let r = &mut self.registry;
        let mut inserted = false;
        if !r.code_to_semantic.contains_key(&code) {
            r.code_to_semantic.insert(code, semantic);
            inserted = true;
        }
        if !r.semantic_to_code.contains_key(&semantic) {
            r.semantic_to_code.insert(semantic, code);
            inserted = true;
        }
        if let Some(host) = host {
            if !r.code_to_host.contains_key(&code) {
                r.code_to_host.insert(code, host);
                inserted = true;
            }
        }
        Ok(inserted)
    }

    /// Finish building
    pub fn build(self) -> TypeRegistry {
        self.registry
    }
}
