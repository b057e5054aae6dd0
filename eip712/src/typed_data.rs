//! Schema registry and the typed-data hashing pipeline.

use std::collections::HashSet;

use alloy_primitives::{keccak256, B256};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::encode::encode_primitive;
use crate::error::{EncodingError, Eip712Error, SchemaError};
use crate::field::{FieldDef, FieldType};

/// Name of the built-in domain type.
pub const EIP712_DOMAIN_TYPE: &str = "EIP712Domain";

/// Value nesting deeper than this aborts with [`SchemaError::TooDeep`].
const MAX_DEPTH: usize = 64;

/// Domain fields recognized in a declared `EIP712Domain` type, with the
/// declared type each must carry. Anything else fails closed.
const DOMAIN_FIELDS: [(&str, &str); 5] = [
    ("name", "string"),
    ("version", "string"),
    ("chainId", "uint256"),
    ("verifyingContract", "address"),
    ("salt", "bytes32"),
];

/// Schema of named struct types, each an ordered field list.
///
/// Field order within a type is semantic: it drives both the canonical type
/// string and the encoding order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Types(IndexMap<String, Vec<FieldDef>>);

impl Types {
    pub fn insert(&mut self, name: impl Into<String>, fields: Vec<FieldDef>) {
        self.0.insert(name.into(), fields);
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.0.contains_key(type_name)
    }

    pub fn fields(&self, type_name: &str) -> Result<&[FieldDef], SchemaError> {
        self.0
            .get(type_name)
            .map(Vec::as_slice)
            .ok_or_else(|| SchemaError::UnknownType(type_name.to_owned()))
    }

    /// Struct types referenced, directly or transitively, by `type_name`'s
    /// fields (array brackets ignored), excluding `type_name` itself, sorted
    /// lexicographically. Unknown struct references are rejected here.
    pub fn dependencies_of(&self, type_name: &str) -> Result<Vec<String>, SchemaError> {
        let mut seen = HashSet::new();
        self.collect_deps(type_name, &mut seen)?;
        seen.remove(type_name);
        let mut dependencies: Vec<String> = seen.into_iter().collect();
        dependencies.sort();
        Ok(dependencies)
    }

    fn collect_deps(&self, type_name: &str, seen: &mut HashSet<String>) -> Result<(), SchemaError> {
        for field in self.fields(type_name)? {
            let field_type = FieldType::parse(&field.r#type)?;
            if let FieldType::Struct(name) = field_type.base() {
                if !self.contains(name) {
                    return Err(SchemaError::UnknownType(name.clone()));
                }
                if seen.insert(name.clone()) {
                    self.collect_deps(name, seen)?;
                }
            }
        }
        Ok(())
    }
}

impl From<IndexMap<String, Vec<FieldDef>>> for Types {
    fn from(types: IndexMap<String, Vec<FieldDef>>) -> Self {
        Self(types)
    }
}

/// One complete hashing input: schema, primary type, domain value, and the
/// message value tree. Read-only for the duration of a hashing call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypedData {
    pub types: Types,
    #[serde(rename = "primaryType")]
    pub primary_type: String,
    pub domain: Value,
    pub message: Value,
}

impl TypedData {
    pub fn new(
        types: Types,
        primary_type: impl Into<String>,
        domain: Value,
        message: Value,
    ) -> Self {
        Self {
            types,
            primary_type: primary_type.into(),
            domain,
            message,
        }
    }

    /// Canonical type signature: the named type's own signature first, then
    /// every transitively referenced type in lexicographic order, with no
    /// separator.
    pub fn encode_type(&self, type_name: &str) -> Result<String, SchemaError> {
        let dependencies = self.types.dependencies_of(type_name)?;
        let mut encoded = String::new();
        for name in std::iter::once(type_name.to_owned()).chain(dependencies) {
            let fields = self
                .types
                .fields(&name)?
                .iter()
                .map(|field| format!("{} {}", field.r#type, field.name))
                .collect::<Vec<_>>()
                .join(",");
            encoded.push_str(&format!("{name}({fields})"));
        }
        Ok(encoded)
    }

    /// keccak256 of the UTF-8 canonical type signature.
    pub fn type_hash(&self, type_name: &str) -> Result<B256, SchemaError> {
        Ok(keccak256(self.encode_type(type_name)?.as_bytes()))
    }

    /// Type hash followed by one 32-byte word per field, in declared order.
    pub fn encode_data(&self, type_name: &str, value: &Value) -> Result<Vec<u8>, Eip712Error> {
        self.encode_data_at(type_name, value, type_name, 0)
    }

    /// keccak256 of [`Self::encode_data`].
    pub fn struct_hash(&self, type_name: &str, value: &Value) -> Result<B256, Eip712Error> {
        self.struct_hash_at(type_name, value, type_name, 0)
    }

    /// Struct hash of the domain value under the declared `EIP712Domain`
    /// type. The declared field list must stay within the recognized domain
    /// field subset.
    pub fn domain_separator(&self) -> Result<B256, Eip712Error> {
        self.validate_domain_type()?;
        self.struct_hash(EIP712_DOMAIN_TYPE, &self.domain)
    }

    /// Struct hash of the message under the primary type.
    pub fn message_struct_hash(&self) -> Result<B256, Eip712Error> {
        self.struct_hash(&self.primary_type, &self.message)
    }

    /// Final 32-byte digest: `keccak256(0x19 || 0x01 || domainSeparator ||
    /// structHash(primaryType, message))`.
    pub fn signing_hash(&self) -> Result<B256, Eip712Error> {
        let domain_separator = self.domain_separator()?;
        let message_hash = self.message_struct_hash()?;

        let mut payload = Vec::with_capacity(66);
        payload.extend_from_slice(&[0x19, 0x01]);
        payload.extend_from_slice(domain_separator.as_slice());
        payload.extend_from_slice(message_hash.as_slice());
        let digest = keccak256(&payload);

        debug!(primary_type = %self.primary_type, %digest, "computed signing hash");
        Ok(digest)
    }

    fn validate_domain_type(&self) -> Result<(), SchemaError> {
        for field in self.types.fields(EIP712_DOMAIN_TYPE)? {
            match DOMAIN_FIELDS.iter().find(|(name, _)| *name == field.name) {
                None => {
                    return Err(SchemaError::UnrecognizedDomainField(field.name.clone()));
                }
                Some((_, expected)) if field.r#type != *expected => {
                    return Err(SchemaError::DomainFieldType {
                        name: field.name.clone(),
                        declared: field.r#type.clone(),
                        expected,
                    });
                }
                Some(_) => {}
            }
        }
        Ok(())
    }

    fn struct_hash_at(
        &self,
        type_name: &str,
        value: &Value,
        path: &str,
        depth: usize,
    ) -> Result<B256, Eip712Error> {
        Ok(keccak256(self.encode_data_at(type_name, value, path, depth)?))
    }

    fn encode_data_at(
        &self,
        type_name: &str,
        value: &Value,
        path: &str,
        depth: usize,
    ) -> Result<Vec<u8>, Eip712Error> {
        let Value::Object(object) = value else {
            return Err(EncodingError::TypeMismatch {
                path: path.to_owned(),
                declared: type_name.to_owned(),
            }
            .into());
        };

        let mut encoded = self.type_hash(type_name)?.to_vec();
        for field in self.types.fields(type_name)? {
            let field_type = FieldType::parse(&field.r#type)?;
            let field_path = format!("{path}.{}", field.name);
            let field_value = object
                .get(&field.name)
                .ok_or_else(|| EncodingError::MissingField(field_path.clone()))?;
            let word = self.encode_value(&field_type, field_value, &field_path, depth)?;
            encoded.extend_from_slice(word.as_slice());
        }
        Ok(encoded)
    }

    fn encode_value(
        &self,
        field_type: &FieldType,
        value: &Value,
        path: &str,
        depth: usize,
    ) -> Result<B256, Eip712Error> {
        if depth > MAX_DEPTH {
            return Err(SchemaError::TooDeep {
                path: path.to_owned(),
                limit: MAX_DEPTH,
            }
            .into());
        }

        match field_type {
            FieldType::Primitive(primitive) => Ok(encode_primitive(*primitive, value, path)?),
            FieldType::Struct(name) => self.struct_hash_at(name, value, path, depth + 1),
            FieldType::Array { element, length } => {
                let Value::Array(elements) = value else {
                    return Err(EncodingError::TypeMismatch {
                        path: path.to_owned(),
                        declared: field_type.to_string(),
                    }
                    .into());
                };
                if let Some(expected) = length {
                    if elements.len() != *expected {
                        return Err(EncodingError::ArrayLengthMismatch {
                            path: path.to_owned(),
                            expected: *expected,
                            got: elements.len(),
                        }
                        .into());
                    }
                }

                // Each element collapses to one word; the field's word is
                // the hash of the concatenation. An empty array hashes the
                // empty byte string.
                let mut encoded = Vec::with_capacity(elements.len() * 32);
                for (index, element_value) in elements.iter().enumerate() {
                    let word = self.encode_value(
                        element,
                        element_value,
                        &format!("{path}[{index}]"),
                        depth + 1,
                    )?;
                    encoded.extend_from_slice(word.as_slice());
                }
                Ok(keccak256(&encoded))
            }
        }
    }
}
