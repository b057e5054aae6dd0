//! Deterministic, domain-separated hashing of typed structured data for
//! off-chain message signing and on-chain verification (EIP-712).
//!
//! Callers describe a schema of named struct types, bind a JSON value tree
//! to it, and get back the single 32-byte digest suitable for signing:
//! `keccak256(0x19 || 0x01 || domainSeparator || structHash)`.

mod encode;
pub mod error;
pub mod field;
pub mod typed_data;

pub use error::{EncodingError, Eip712Error, SchemaError};
pub use field::{FieldDef, FieldType, Primitive};
pub use typed_data::{TypedData, Types, EIP712_DOMAIN_TYPE};

// Re-exported so callers can consume digests without depending on
// alloy-primitives directly.
pub use alloy_primitives::B256;

/// Computes the final signing digest for one typed-data input.
///
/// Decomposed intermediates are available as
/// [`TypedData::domain_separator`] and [`TypedData::message_struct_hash`]
/// for callers assembling the `0x19 0x01` payload themselves.
pub fn hash_structured_data(typed_data: &TypedData) -> Result<B256, Eip712Error> {
    typed_data.signing_hash()
}
