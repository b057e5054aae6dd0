use thiserror::Error;

/// Failures caused by the schema itself: unknown or ill-formed type
/// declarations, domain types outside the recognized field set, or a type
/// graph nested past the recursion bound.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("unknown type `{0}`")]
    UnknownType(String),
    #[error("invalid type name `{0}`")]
    InvalidTypeName(String),
    #[error("unrecognized domain field `{0}`")]
    UnrecognizedDomainField(String),
    #[error("domain field `{name}` declared as `{declared}`, expected `{expected}`")]
    DomainFieldType {
        name: String,
        declared: String,
        expected: &'static str,
    },
    #[error("value at `{path}` nested deeper than {limit} levels")]
    TooDeep { path: String, limit: usize },
}

/// Failures caused by a value tree that does not fit its declared schema.
/// Every variant carries the path of the offending value, e.g.
/// `Mail.to[1].wallets`.
#[derive(Debug, Error)]
pub enum EncodingError {
    #[error("missing field `{0}`")]
    MissingField(String),
    #[error("value at `{path}` does not match declared type `{declared}`")]
    TypeMismatch { path: String, declared: String },
    #[error("number at `{path}` does not fit `{declared}`")]
    NumberOutOfRange { path: String, declared: String },
    #[error("malformed address at `{path}`")]
    InvalidAddress { path: String },
    #[error("malformed hex data at `{path}`")]
    InvalidHex { path: String },
    #[error("expected {expected} bytes at `{path}`, got {got}")]
    InvalidByteLength {
        path: String,
        expected: usize,
        got: usize,
    },
    #[error("expected {expected} array elements at `{path}`, got {got}")]
    ArrayLengthMismatch {
        path: String,
        expected: usize,
        got: usize,
    },
}

#[derive(Debug, Error)]
pub enum Eip712Error {
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error(transparent)]
    Encoding(#[from] EncodingError),
}
