//! ARC-4 ABI codec: type strings, method signatures, argument encoding and
//! return value decoding.

mod abi_type;
mod method;
mod value;

pub use abi_type::*;
pub use method::*;
pub use value::*;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AbiError {
    #[error("unsupported or malformed ABI type: {0}")]
    InvalidType(String),
    #[error("invalid method signature: {0}")]
    InvalidSignature(String),
    #[error("value {value} cannot be encoded as {expected}")]
    TypeMismatch { expected: String, value: String },
    #[error("{abi_type} expects {expected} elements, got {actual}")]
    LengthMismatch {
        abi_type: String,
        expected: usize,
        actual: usize,
    },
    #[error("encoded data too short for {0}")]
    Truncated(String),
    #[error("{0} unexpected trailing bytes after {1}")]
    TrailingBytes(usize, String),
    #[error("invalid dynamic offset {0}")]
    InvalidOffset(usize),
    #[error("encoded value exceeds the 16-bit length limit")]
    TooLong,
    #[error("string is not valid utf-8")]
    InvalidUtf8,
    #[error("method {0} did not log a return value")]
    MissingReturn(String),
    #[error("contract has no method named {0}")]
    UnknownMethod(String),
}
