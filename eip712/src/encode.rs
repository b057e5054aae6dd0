//! Encoding of primitive values into 32-byte ABI words.
//!
//! Dynamic data (`string`, `bytes`) never lands in the word directly; only
//! its keccak256 hash does. Integers accept native JSON numbers as well as
//! decimal or `0x` hex strings, so magnitudes beyond native precision
//! survive the JSON layer.

use alloy_primitives::{hex, keccak256, Address, B256, U256};
use serde_json::Value;

use crate::error::EncodingError;
use crate::field::Primitive;

pub(crate) fn encode_primitive(
    primitive: Primitive,
    value: &Value,
    path: &str,
) -> Result<B256, EncodingError> {
    match primitive {
        Primitive::Uint(bits) => {
            let number = parse_uint(primitive, value, path)?;
            if bits < 256 && number >> bits != U256::ZERO {
                return Err(out_of_range(primitive, path));
            }
            Ok(B256::from(number))
        }
        Primitive::Int(bits) => {
            let (negative, magnitude) = parse_int(primitive, value, path)?;
            let bound = U256::ONE << (bits - 1);
            let in_range = if negative {
                magnitude <= bound
            } else {
                magnitude < bound
            };
            if !in_range {
                return Err(out_of_range(primitive, path));
            }
            // 256-bit two's complement, which also sign-extends.
            let word = if negative {
                (!magnitude).wrapping_add(U256::ONE)
            } else {
                magnitude
            };
            Ok(B256::from(word))
        }
        Primitive::Address => {
            let Value::String(text) = value else {
                return Err(mismatch(primitive, path));
            };
            let bytes = decode_hex(text, path).map_err(|_| EncodingError::InvalidAddress {
                path: path.to_owned(),
            })?;
            if bytes.len() != 20 {
                return Err(EncodingError::InvalidAddress {
                    path: path.to_owned(),
                });
            }
            Ok(Address::from_slice(&bytes).into_word())
        }
        Primitive::Bool => match value {
            Value::Bool(b) => {
                let mut word = B256::ZERO;
                word.0[31] = u8::from(*b);
                Ok(word)
            }
            _ => Err(mismatch(primitive, path)),
        },
        Primitive::FixedBytes(len) => {
            let Value::String(text) = value else {
                return Err(mismatch(primitive, path));
            };
            let bytes = decode_hex(text, path)?;
            if bytes.len() != len {
                return Err(EncodingError::InvalidByteLength {
                    path: path.to_owned(),
                    expected: len,
                    got: bytes.len(),
                });
            }
            let mut word = B256::ZERO;
            word.0[..len].copy_from_slice(&bytes);
            Ok(word)
        }
        Primitive::Bytes => {
            let Value::String(text) = value else {
                return Err(mismatch(primitive, path));
            };
            Ok(keccak256(decode_hex(text, path)?))
        }
        Primitive::String => match value {
            Value::String(text) => Ok(keccak256(text.as_bytes())),
            _ => Err(mismatch(primitive, path)),
        },
    }
}

fn parse_uint(primitive: Primitive, value: &Value, path: &str) -> Result<U256, EncodingError> {
    let text = number_text(primitive, value, path)?;
    u256_from_text(&text).ok_or_else(|| mismatch(primitive, path))
}

fn parse_int(
    primitive: Primitive,
    value: &Value,
    path: &str,
) -> Result<(bool, U256), EncodingError> {
    let text = number_text(primitive, value, path)?;
    let (negative, magnitude) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.as_str()),
    };
    u256_from_text(magnitude)
        .map(|magnitude| (negative, magnitude))
        .ok_or_else(|| mismatch(primitive, path))
}

fn number_text(primitive: Primitive, value: &Value, path: &str) -> Result<String, EncodingError> {
    match value {
        Value::Number(n) => Ok(n.to_string()),
        Value::String(s) => Ok(s.clone()),
        _ => Err(mismatch(primitive, path)),
    }
}

fn u256_from_text(text: &str) -> Option<U256> {
    match text.strip_prefix("0x") {
        Some(digits) => U256::from_str_radix(digits, 16).ok(),
        None => U256::from_str_radix(text, 10).ok(),
    }
}

fn decode_hex(text: &str, path: &str) -> Result<Vec<u8>, EncodingError> {
    let digits = text.strip_prefix("0x").ok_or_else(|| EncodingError::InvalidHex {
        path: path.to_owned(),
    })?;
    hex::decode(digits).map_err(|_| EncodingError::InvalidHex {
        path: path.to_owned(),
    })
}

fn mismatch(primitive: Primitive, path: &str) -> EncodingError {
    EncodingError::TypeMismatch {
        path: path.to_owned(),
        declared: primitive.to_string(),
    }
}

fn out_of_range(primitive: Primitive, path: &str) -> EncodingError {
    EncodingError::NumberOutOfRange {
        path: path.to_owned(),
        declared: primitive.to_string(),
    }
}
