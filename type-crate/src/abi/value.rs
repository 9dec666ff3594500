use core::fmt;

/// A decoded ARC-4 value.
///
/// Tuples and arrays both decode to `Array`; `address` and byte arrays decode
/// to `Bytes`. Integer variants keep the declared width so record decoders can
/// reject a `uint64` where a `uint16` was promised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbiValue {
    Uint8(u8),
    Uint16(u16),
    Uint32(u32),
    Uint64(u64),
    Bool(bool),
    Byte(u8),
    Bytes(Vec<u8>),
    String(String),
    Array(Vec<AbiValue>),
}

impl AbiValue {
    /// Short name of the variant, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            AbiValue::Uint8(_) => "uint8",
            AbiValue::Uint16(_) => "uint16",
            AbiValue::Uint32(_) => "uint32",
            AbiValue::Uint64(_) => "uint64",
            AbiValue::Bool(_) => "bool",
            AbiValue::Byte(_) => "byte",
            AbiValue::Bytes(_) => "bytes",
            AbiValue::String(_) => "string",
            AbiValue::Array(_) => "array",
        }
    }

    pub fn as_array(&self) -> Option<&[AbiValue]> {
        match self {
            AbiValue::Array(items) => Some(items),
            _ => None,
        }
    }
}

impl fmt::Display for AbiValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbiValue::Uint8(v) => write!(f, "{v}"),
            AbiValue::Uint16(v) => write!(f, "{v}"),
            AbiValue::Uint32(v) => write!(f, "{v}"),
            AbiValue::Uint64(v) => write!(f, "{v}"),
            AbiValue::Bool(v) => write!(f, "{v}"),
            AbiValue::Byte(v) => write!(f, "{v:#04x}"),
            AbiValue::Bytes(v) => write!(f, "bytes[{}]", v.len()),
            AbiValue::String(v) => write!(f, "{v:?}"),
            AbiValue::Array(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
        }
    }
}

impl From<u64> for AbiValue {
    fn from(value: u64) -> Self {
        AbiValue::Uint64(value)
    }
}

impl From<bool> for AbiValue {
    fn from(value: bool) -> Self {
        AbiValue::Bool(value)
    }
}

impl From<&str> for AbiValue {
    fn from(value: &str) -> Self {
        AbiValue::String(value.to_string())
    }
}

impl From<crate::types::Address> for AbiValue {
    fn from(value: crate::types::Address) -> Self {
        AbiValue::Bytes(value.to_bytes().to_vec())
    }
}
