use core::fmt;
use std::str::FromStr;

use super::{AbiError, AbiValue};

const LENGTH_PREFIX_LEN: usize = 2;
const BOOL_TRUE: u8 = 0x80;

/// An ARC-4 type.
///
/// Only the unsigned widths the contracts use (8, 16, 32 and 64 bits) are
/// supported.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AbiType {
    Uint(u16),
    Bool,
    Byte,
    Address,
    String,
    StaticArray(Box<AbiType>, usize),
    DynamicArray(Box<AbiType>),
    Tuple(Vec<AbiType>),
}

impl AbiType {
    pub fn is_dynamic(&self) -> bool {
        match self {
            AbiType::String | AbiType::DynamicArray(_) => true,
            AbiType::StaticArray(elem, _) => elem.is_dynamic(),
            AbiType::Tuple(elems) => elems.iter().any(AbiType::is_dynamic),
            _ => false,
        }
    }

    /// Encoded byte length of a static type, `None` for dynamic types.
    pub fn static_len(&self) -> Option<usize> {
        match self {
            AbiType::Uint(bits) => Some(*bits as usize / 8),
            AbiType::Bool | AbiType::Byte => Some(1),
            AbiType::Address => Some(32),
            AbiType::StaticArray(elem, len) => match elem.as_ref() {
                AbiType::Bool => Some(len.div_ceil(8)),
                elem => elem.static_len().map(|elem_len| elem_len * len),
            },
            AbiType::Tuple(elems) => sequence_static_len(elems),
            AbiType::String | AbiType::DynamicArray(_) => None,
        }
    }

    pub fn encode(&self, value: &AbiValue) -> Result<Vec<u8>, AbiError> {
        match (self, value) {
            (AbiType::Uint(8), AbiValue::Uint8(v)) => Ok(vec![*v]),
            (AbiType::Uint(16), AbiValue::Uint16(v)) => Ok(v.to_be_bytes().to_vec()),
            (AbiType::Uint(32), AbiValue::Uint32(v)) => Ok(v.to_be_bytes().to_vec()),
            (AbiType::Uint(64), AbiValue::Uint64(v)) => Ok(v.to_be_bytes().to_vec()),
            (AbiType::Bool, AbiValue::Bool(v)) => Ok(vec![if *v { BOOL_TRUE } else { 0 }]),
            (AbiType::Byte, AbiValue::Byte(v)) => Ok(vec![*v]),
            (AbiType::Address, AbiValue::Bytes(bytes)) if bytes.len() == 32 => Ok(bytes.clone()),
            (AbiType::String, AbiValue::String(text)) => {
                with_length_prefix(text.len(), text.as_bytes())
            }
            (AbiType::StaticArray(elem, len), AbiValue::Bytes(bytes))
                if **elem == AbiType::Byte && bytes.len() == *len =>
            {
                Ok(bytes.clone())
            }
            (AbiType::DynamicArray(elem), AbiValue::Bytes(bytes)) if **elem == AbiType::Byte => {
                with_length_prefix(bytes.len(), bytes)
            }
            (AbiType::StaticArray(elem, len), AbiValue::Array(items)) => {
                self.check_len(*len, items.len())?;
                encode_sequence(&vec![(**elem).clone(); *len], items)
            }
            (AbiType::DynamicArray(elem), AbiValue::Array(items)) => {
                let body = encode_sequence(&vec![(**elem).clone(); items.len()], items)?;
                with_length_prefix(items.len(), &body)
            }
            (AbiType::Tuple(elems), AbiValue::Array(items)) => {
                self.check_len(elems.len(), items.len())?;
                encode_sequence(elems, items)
            }
            _ => Err(self.mismatch(value)),
        }
    }

    pub fn decode(&self, bytes: &[u8]) -> Result<AbiValue, AbiError> {
        if let Some(len) = self.static_len() {
            if bytes.len() < len {
                return Err(AbiError::Truncated(self.to_string()));
            }
            if bytes.len() > len {
                return Err(AbiError::TrailingBytes(bytes.len() - len, self.to_string()));
            }
        }

        match self {
            AbiType::Uint(8) => Ok(AbiValue::Uint8(bytes[0])),
            AbiType::Uint(16) => Ok(AbiValue::Uint16(u16::from_be_bytes(fixed_bytes(bytes)?))),
            AbiType::Uint(32) => Ok(AbiValue::Uint32(u32::from_be_bytes(fixed_bytes(bytes)?))),
            AbiType::Uint(64) => Ok(AbiValue::Uint64(u64::from_be_bytes(fixed_bytes(bytes)?))),
            AbiType::Uint(_) => Err(AbiError::InvalidType(self.to_string())),
            AbiType::Bool => match bytes[0] {
                BOOL_TRUE => Ok(AbiValue::Bool(true)),
                0 => Ok(AbiValue::Bool(false)),
                other => Err(self.mismatch(&AbiValue::Byte(other))),
            },
            AbiType::Byte => Ok(AbiValue::Byte(bytes[0])),
            AbiType::Address => Ok(AbiValue::Bytes(bytes.to_vec())),
            AbiType::String => {
                let body = split_length_prefixed(bytes, 1, self)?.1;
                String::from_utf8(body.to_vec())
                    .map(AbiValue::String)
                    .map_err(|_| AbiError::InvalidUtf8)
            }
            AbiType::StaticArray(elem, _) if **elem == AbiType::Byte => {
                Ok(AbiValue::Bytes(bytes.to_vec()))
            }
            AbiType::StaticArray(elem, len) => {
                decode_sequence(&vec![(**elem).clone(); *len], bytes).map(AbiValue::Array)
            }
            AbiType::DynamicArray(elem) if **elem == AbiType::Byte => {
                let body = split_length_prefixed(bytes, 1, self)?.1;
                Ok(AbiValue::Bytes(body.to_vec()))
            }
            AbiType::DynamicArray(elem) => {
                let (count, body) = split_length_prefixed(bytes, 0, self)?;
                decode_sequence(&vec![(**elem).clone(); count], body).map(AbiValue::Array)
            }
            AbiType::Tuple(elems) => decode_sequence(elems, bytes).map(AbiValue::Array),
        }
    }

    fn check_len(&self, expected: usize, actual: usize) -> Result<(), AbiError> {
        if expected != actual {
            return Err(AbiError::LengthMismatch {
                abi_type: self.to_string(),
                expected,
                actual,
            });
        }
        Ok(())
    }

    fn mismatch(&self, value: &AbiValue) -> AbiError {
        AbiError::TypeMismatch {
            expected: self.to_string(),
            value: format!("{}({})", value.kind(), value),
        }
    }
}

impl fmt::Display for AbiType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbiType::Uint(bits) => write!(f, "uint{bits}"),
            AbiType::Bool => write!(f, "bool"),
            AbiType::Byte => write!(f, "byte"),
            AbiType::Address => write!(f, "address"),
            AbiType::String => write!(f, "string"),
            AbiType::StaticArray(elem, len) => write!(f, "{elem}[{len}]"),
            AbiType::DynamicArray(elem) => write!(f, "{elem}[]"),
            AbiType::Tuple(elems) => {
                write!(f, "(")?;
                for (i, elem) in elems.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{elem}")?;
                }
                write!(f, ")")
            }
        }
    }
}

impl FromStr for AbiType {
    type Err = AbiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || AbiError::InvalidType(s.to_string());

        if let Some(body) = s.strip_suffix(']') {
            let open = body.rfind('[').ok_or_else(invalid)?;
            let elem = Box::new(body[..open].parse::<AbiType>()?);
            let len = &body[open + 1..];
            if len.is_empty() {
                return Ok(AbiType::DynamicArray(elem));
            }
            let len = len.parse::<usize>().map_err(|_| invalid())?;
            return Ok(AbiType::StaticArray(elem, len));
        }

        if let Some(inner) = s.strip_prefix('(').and_then(|rest| rest.strip_suffix(')')) {
            return split_top_level(inner)
                .ok_or_else(invalid)?
                .into_iter()
                .map(str::parse)
                .collect::<Result<Vec<_>, _>>()
                .map(AbiType::Tuple);
        }

        match s {
            "bool" => Ok(AbiType::Bool),
            "byte" => Ok(AbiType::Byte),
            "address" => Ok(AbiType::Address),
            "string" => Ok(AbiType::String),
            _ => match s.strip_prefix("uint").and_then(|bits| bits.parse::<u16>().ok()) {
                Some(bits @ (8 | 16 | 32 | 64)) => Ok(AbiType::Uint(bits)),
                _ => Err(invalid()),
            },
        }
    }
}

/// Splits a comma separated list at nesting depth zero. `None` when the
/// parentheses are unbalanced or an element is empty.
pub(crate) fn split_top_level(list: &str) -> Option<Vec<&str>> {
    if list.is_empty() {
        return Some(vec![]);
    }

    let mut parts = vec![];
    let mut depth = 0i32;
    let mut start = 0;
    for (i, c) in list.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth < 0 {
                    return None;
                }
            }
            ',' if depth == 0 => {
                parts.push(&list[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    if depth != 0 {
        return None;
    }
    parts.push(&list[start..]);

    if parts.iter().any(|part| part.is_empty()) {
        return None;
    }
    Some(parts)
}

/// Number of consecutive bools starting at `start`, capped at one byte's worth.
fn bool_run(types: &[AbiType], start: usize) -> usize {
    types[start..]
        .iter()
        .take(8)
        .take_while(|t| **t == AbiType::Bool)
        .count()
}

fn sequence_static_len(types: &[AbiType]) -> Option<usize> {
    let mut len = 0;
    let mut i = 0;
    while i < types.len() {
        if types[i] == AbiType::Bool {
            len += 1;
            i += bool_run(types, i);
        } else {
            len += types[i].static_len()?;
            i += 1;
        }
    }
    Some(len)
}

fn with_length_prefix(count: usize, body: &[u8]) -> Result<Vec<u8>, AbiError> {
    let count = u16::try_from(count).map_err(|_| AbiError::TooLong)?;
    let mut out = Vec::with_capacity(LENGTH_PREFIX_LEN + body.len());
    out.extend_from_slice(&count.to_be_bytes());
    out.extend_from_slice(body);
    Ok(out)
}

/// Reads the 16-bit length prefix. When `elem_len` is non-zero the body must be
/// exactly `count * elem_len` bytes long.
fn split_length_prefixed<'a>(
    bytes: &'a [u8],
    elem_len: usize,
    abi_type: &AbiType,
) -> Result<(usize, &'a [u8]), AbiError> {
    let count = read_u16(bytes, 0, abi_type)? as usize;
    let body = &bytes[LENGTH_PREFIX_LEN..];
    if elem_len > 0 {
        let expected = count * elem_len;
        if body.len() < expected {
            return Err(AbiError::Truncated(abi_type.to_string()));
        }
        if body.len() > expected {
            return Err(AbiError::TrailingBytes(
                body.len() - expected,
                abi_type.to_string(),
            ));
        }
    }
    Ok((count, body))
}

fn read_u16(bytes: &[u8], pos: usize, abi_type: &AbiType) -> Result<u16, AbiError> {
    bytes
        .get(pos..pos + LENGTH_PREFIX_LEN)
        .map(|raw| u16::from_be_bytes([raw[0], raw[1]]))
        .ok_or_else(|| AbiError::Truncated(abi_type.to_string()))
}

fn fixed_bytes<const N: usize>(bytes: &[u8]) -> Result<[u8; N], AbiError> {
    bytes
        .try_into()
        .map_err(|_| AbiError::Truncated(format!("uint{}", N * 8)))
}

fn encode_sequence(types: &[AbiType], values: &[AbiValue]) -> Result<Vec<u8>, AbiError> {
    let mut heads: Vec<Vec<u8>> = Vec::with_capacity(types.len());
    let mut tails: Vec<Option<Vec<u8>>> = Vec::with_capacity(types.len());

    let mut i = 0;
    while i < types.len() {
        if types[i] == AbiType::Bool {
            let run = bool_run(types, i);
            let mut packed = 0u8;
            for (bit, value) in values[i..i + run].iter().enumerate() {
                match value {
                    AbiValue::Bool(true) => packed |= BOOL_TRUE >> bit,
                    AbiValue::Bool(false) => {}
                    other => return Err(AbiType::Bool.mismatch(other)),
                }
            }
            heads.push(vec![packed]);
            tails.push(None);
            i += run;
        } else if types[i].is_dynamic() {
            heads.push(vec![0; LENGTH_PREFIX_LEN]);
            tails.push(Some(types[i].encode(&values[i])?));
            i += 1;
        } else {
            heads.push(types[i].encode(&values[i])?);
            tails.push(None);
            i += 1;
        }
    }

    let mut offset: usize = heads.iter().map(Vec::len).sum();
    let mut out = Vec::with_capacity(offset);
    let mut tail_bytes = vec![];
    for (mut head, tail) in heads.into_iter().zip(tails) {
        if let Some(tail) = tail {
            let encoded = u16::try_from(offset).map_err(|_| AbiError::TooLong)?;
            head.copy_from_slice(&encoded.to_be_bytes());
            offset += tail.len();
            tail_bytes.extend(tail);
        }
        out.extend(head);
    }
    out.extend(tail_bytes);
    Ok(out)
}

fn decode_sequence(types: &[AbiType], bytes: &[u8]) -> Result<Vec<AbiValue>, AbiError> {
    let mut values: Vec<Option<AbiValue>> = Vec::with_capacity(types.len());
    let mut dynamic: Vec<(usize, usize)> = vec![];

    let mut pos = 0;
    let mut i = 0;
    while i < types.len() {
        let abi_type = &types[i];
        if *abi_type == AbiType::Bool {
            let run = bool_run(types, i);
            let packed = *bytes
                .get(pos)
                .ok_or_else(|| AbiError::Truncated(abi_type.to_string()))?;
            for bit in 0..run {
                values.push(Some(AbiValue::Bool(packed & (BOOL_TRUE >> bit) != 0)));
            }
            pos += 1;
            i += run;
        } else if abi_type.is_dynamic() {
            let offset = read_u16(bytes, pos, abi_type)? as usize;
            dynamic.push((i, offset));
            values.push(None);
            pos += LENGTH_PREFIX_LEN;
            i += 1;
        } else {
            let len = abi_type
                .static_len()
                .ok_or_else(|| AbiError::InvalidType(abi_type.to_string()))?;
            let chunk = bytes
                .get(pos..pos + len)
                .ok_or_else(|| AbiError::Truncated(abi_type.to_string()))?;
            values.push(Some(abi_type.decode(chunk)?));
            pos += len;
            i += 1;
        }
    }

    match dynamic.first() {
        None if pos != bytes.len() => {
            return Err(AbiError::TrailingBytes(
                bytes.len() - pos,
                format!("{} element sequence", types.len()),
            ));
        }
        Some((_, first_offset)) if *first_offset != pos => {
            return Err(AbiError::InvalidOffset(*first_offset));
        }
        _ => {}
    }

    for (k, (index, start)) in dynamic.iter().enumerate() {
        let end = dynamic
            .get(k + 1)
            .map(|(_, next)| *next)
            .unwrap_or(bytes.len());
        if end < *start || end > bytes.len() {
            return Err(AbiError::InvalidOffset(*start));
        }
        values[*index] = Some(types[*index].decode(&bytes[*start..end])?);
    }

    values
        .into_iter()
        .collect::<Option<Vec<_>>>()
        .ok_or(AbiError::InvalidOffset(pos))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    #[test_case("uint64")]
    #[test_case("(uint64,uint16,uint64)[]")]
    #[test_case("((uint64[4])[12])")]
    #[test_case("((uint64,uint64,uint64),bool,bool)")]
    #[test_case("(uint64,address,address,uint64,address,uint64,uint64,uint64,uint16,uint32,address,uint64,uint64,uint8,uint64,uint64)")]
    #[test_case("byte[]")]
    #[test_case("()")]
    fn parse_and_display_are_inverse(text: &str) {
        let parsed: AbiType = text.parse().unwrap();
        assert_eq!(parsed.to_string(), text);
    }

    #[test_case("uint24")]
    #[test_case("uint128")]
    #[test_case("(uint64,")]
    #[test_case("(uint64,,bool)")]
    #[test_case("uint64[x]")]
    #[test_case("ufixed64x2")]
    fn rejects_unsupported_types(text: &str) {
        assert_matches!(text.parse::<AbiType>(), Err(AbiError::InvalidType(_)));
    }

    #[test]
    fn node_assignment_layout_is_static() {
        let abi_type: AbiType = "((uint64[4])[12])".parse().unwrap();
        assert!(!abi_type.is_dynamic());
        assert_eq!(abi_type.static_len(), Some(12 * 4 * 8));
    }

    #[test]
    fn consecutive_bools_share_one_byte() {
        let abi_type: AbiType = "((uint64,uint64,uint64),bool,bool)".parse().unwrap();
        let value = AbiValue::Array(vec![
            AbiValue::Array(vec![
                AbiValue::Uint64(1),
                AbiValue::Uint64(2),
                AbiValue::Uint64(99),
            ]),
            AbiValue::Bool(false),
            AbiValue::Bool(true),
        ]);

        let encoded = abi_type.encode(&value).unwrap();
        assert_eq!(encoded.len(), 25);
        assert_eq!(encoded[24], 0b0100_0000);
        assert_eq!(abi_type.decode(&encoded).unwrap(), value);
    }

    #[test]
    fn dynamic_elements_use_head_offsets() {
        let abi_type: AbiType = "(uint16,string,byte[])".parse().unwrap();
        let value = AbiValue::Array(vec![
            AbiValue::Uint16(7),
            AbiValue::String("ab".to_string()),
            AbiValue::Bytes(vec![9]),
        ]);

        let encoded = abi_type.encode(&value).unwrap();
        assert_eq!(
            encoded,
            vec![0, 7, 0, 6, 0, 10, 0, 2, b'a', b'b', 0, 1, 9]
        );
        assert_eq!(abi_type.decode(&encoded).unwrap(), value);
    }

    #[test]
    fn dynamic_array_of_tuples_has_length_prefix() {
        let abi_type: AbiType = "(uint64,uint16,uint64)[]".parse().unwrap();
        let pool = |app: u64| {
            AbiValue::Array(vec![
                AbiValue::Uint64(app),
                AbiValue::Uint16(3),
                AbiValue::Uint64(1_000),
            ])
        };
        let value = AbiValue::Array(vec![pool(10), pool(11)]);

        let encoded = abi_type.encode(&value).unwrap();
        assert_eq!(&encoded[..2], &[0, 2]);
        assert_eq!(encoded.len(), 2 + 2 * 18);
        assert_eq!(abi_type.decode(&encoded).unwrap(), value);
    }

    #[test]
    fn integer_width_must_match() {
        let abi_type = AbiType::Uint(16);
        assert_matches!(
            abi_type.encode(&AbiValue::Uint64(1)),
            Err(AbiError::TypeMismatch { .. })
        );
    }

    #[test]
    fn decode_rejects_truncated_and_trailing_input() {
        let abi_type: AbiType = "(uint64,uint64)".parse().unwrap();
        assert_matches!(abi_type.decode(&[0; 15]), Err(AbiError::Truncated(_)));
        assert_matches!(abi_type.decode(&[0; 17]), Err(AbiError::TrailingBytes(1, _)));
    }

    #[test]
    fn decode_rejects_bad_offsets() {
        let abi_type: AbiType = "(string)".parse().unwrap();
        assert_matches!(
            abi_type.decode(&[0, 5, 0, 0]),
            Err(AbiError::InvalidOffset(5))
        );
    }
}
