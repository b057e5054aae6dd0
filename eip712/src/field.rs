use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::SchemaError;

/// A single `name`/`type` pair as declared in a schema.
///
/// The declared type string is kept verbatim: it is emitted byte-for-byte
/// into canonical type strings, so normalizing it here would change hashes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDef {
    pub name: String,
    pub r#type: String,
}

impl FieldDef {
    pub fn new(name: impl Into<String>, r#type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            r#type: r#type.into(),
        }
    }
}

/// Parsed form of a declared field type.
///
/// Array suffixes bind from the right: `Person[2][]` is a dynamic array
/// whose elements are 2-element arrays of `Person`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
    Primitive(Primitive),
    Struct(String),
    Array {
        element: Box<FieldType>,
        length: Option<usize>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
    Uint(usize),
    Int(usize),
    Address,
    Bool,
    Bytes,
    FixedBytes(usize),
    String,
}

impl FieldType {
    /// Parses a declared type string.
    ///
    /// Identifiers that are not recognized primitives resolve as struct
    /// names; whether they exist in the registry is checked at lookup time.
    pub fn parse(declared: &str) -> Result<Self, SchemaError> {
        if let Some(stripped) = declared.strip_suffix(']') {
            let open = stripped
                .rfind('[')
                .ok_or_else(|| SchemaError::InvalidTypeName(declared.to_owned()))?;
            let element = &stripped[..open];
            let length = &stripped[open + 1..];
            let length = if length.is_empty() {
                None
            } else {
                Some(
                    length
                        .parse::<usize>()
                        .map_err(|_| SchemaError::InvalidTypeName(declared.to_owned()))?,
                )
            };
            return Ok(Self::Array {
                element: Box::new(Self::parse(element)?),
                length,
            });
        }
        if let Some(primitive) = Primitive::parse(declared) {
            return Ok(Self::Primitive(primitive));
        }
        if is_identifier(declared) {
            Ok(Self::Struct(declared.to_owned()))
        } else {
            Err(SchemaError::InvalidTypeName(declared.to_owned()))
        }
    }

    /// The element type behind any level of array nesting.
    pub fn base(&self) -> &Self {
        match self {
            Self::Array { element, .. } => element.base(),
            other => other,
        }
    }
}

impl Primitive {
    fn parse(declared: &str) -> Option<Self> {
        match declared {
            "address" => Some(Self::Address),
            "bool" => Some(Self::Bool),
            "bytes" => Some(Self::Bytes),
            "string" => Some(Self::String),
            _ => {
                if let Some(bits) = declared.strip_prefix("uint") {
                    parse_bit_width(bits).map(Self::Uint)
                } else if let Some(bits) = declared.strip_prefix("int") {
                    parse_bit_width(bits).map(Self::Int)
                } else if let Some(len) = declared.strip_prefix("bytes") {
                    let len = len.parse::<usize>().ok()?;
                    (1..=32).contains(&len).then_some(Self::FixedBytes(len))
                } else {
                    None
                }
            }
        }
    }
}

fn parse_bit_width(s: &str) -> Option<usize> {
    let bits = s.parse::<usize>().ok()?;
    (bits % 8 == 0 && (8..=256).contains(&bits)).then_some(bits)
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primitive(primitive) => primitive.fmt(f),
            Self::Struct(name) => f.write_str(name),
            Self::Array {
                element,
                length: Some(length),
            } => write!(f, "{element}[{length}]"),
            Self::Array {
                element,
                length: None,
            } => write!(f, "{element}[]"),
        }
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uint(bits) => write!(f, "uint{bits}"),
            Self::Int(bits) => write!(f, "int{bits}"),
            Self::Address => f.write_str("address"),
            Self::Bool => f.write_str("bool"),
            Self::Bytes => f.write_str("bytes"),
            Self::FixedBytes(len) => write!(f, "bytes{len}"),
            Self::String => f.write_str("string"),
        }
    }
}
