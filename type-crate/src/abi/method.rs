use core::fmt;
use std::str::FromStr;

use sha2::{Digest, Sha512_256};

use super::{abi_type::split_top_level, AbiError, AbiType, AbiValue};
use crate::constants::ABI_RETURN_PREFIX;

/// Transaction-typed method argument, satisfied by a transaction placed
/// immediately before the call in the same group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TxnArgKind {
    Any,
    Payment,
    KeyRegistration,
    AssetConfig,
    AssetTransfer,
    AssetFreeze,
    ApplicationCall,
}

impl TxnArgKind {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "txn" => Some(TxnArgKind::Any),
            "pay" => Some(TxnArgKind::Payment),
            "keyreg" => Some(TxnArgKind::KeyRegistration),
            "acfg" => Some(TxnArgKind::AssetConfig),
            "axfer" => Some(TxnArgKind::AssetTransfer),
            "afrz" => Some(TxnArgKind::AssetFreeze),
            "appl" => Some(TxnArgKind::ApplicationCall),
            _ => None,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            TxnArgKind::Any => "txn",
            TxnArgKind::Payment => "pay",
            TxnArgKind::KeyRegistration => "keyreg",
            TxnArgKind::AssetConfig => "acfg",
            TxnArgKind::AssetTransfer => "axfer",
            TxnArgKind::AssetFreeze => "afrz",
            TxnArgKind::ApplicationCall => "appl",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReferenceKind {
    Account,
    Asset,
    Application,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ArgType {
    Value(AbiType),
    Transaction(TxnArgKind),
    Reference(ReferenceKind),
}

impl fmt::Display for ArgType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgType::Value(abi_type) => write!(f, "{abi_type}"),
            ArgType::Transaction(kind) => write!(f, "{}", kind.name()),
            ArgType::Reference(ReferenceKind::Account) => write!(f, "account"),
            ArgType::Reference(ReferenceKind::Asset) => write!(f, "asset"),
            ArgType::Reference(ReferenceKind::Application) => write!(f, "application"),
        }
    }
}

impl FromStr for ArgType {
    type Err = AbiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(kind) = TxnArgKind::from_name(s) {
            return Ok(ArgType::Transaction(kind));
        }
        match s {
            "account" => Ok(ArgType::Reference(ReferenceKind::Account)),
            "asset" => Ok(ArgType::Reference(ReferenceKind::Asset)),
            "application" => Ok(ArgType::Reference(ReferenceKind::Application)),
            _ => s.parse().map(ArgType::Value),
        }
    }
}

/// An ARC-4 method, e.g. `addStake(pay,uint64,uint64)(uint64,uint64,uint64)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Method {
    pub name: String,
    pub args: Vec<ArgType>,
    /// `None` for `void` methods.
    pub returns: Option<AbiType>,
}

impl Method {
    pub fn signature(&self) -> String {
        let args = self
            .args
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",");
        let returns = self
            .returns
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_else(|| "void".to_string());
        format!("{}({}){}", self.name, args, returns)
    }

    /// First four bytes of SHA-512/256 over the signature.
    pub fn selector(&self) -> [u8; 4] {
        let digest = Sha512_256::digest(self.signature().as_bytes());
        [digest[0], digest[1], digest[2], digest[3]]
    }

    /// ABI-typed (non-transaction, non-reference) arguments in call order.
    pub fn value_args(&self) -> impl Iterator<Item = &AbiType> {
        self.args.iter().filter_map(|arg| match arg {
            ArgType::Value(abi_type) => Some(abi_type),
            _ => None,
        })
    }

    pub fn txn_arg_count(&self) -> usize {
        self.args
            .iter()
            .filter(|arg| matches!(arg, ArgType::Transaction(_)))
            .count()
    }

    /// Extracts the return value from the call's logs. The return value is the
    /// last log line and carries the `151f7c75` prefix.
    pub fn decode_return(&self, logs: &[Vec<u8>]) -> Result<Option<AbiValue>, AbiError> {
        let Some(returns) = &self.returns else {
            return Ok(None);
        };
        let encoded = logs
            .last()
            .and_then(|log| log.strip_prefix(ABI_RETURN_PREFIX.as_slice()))
            .ok_or_else(|| AbiError::MissingReturn(self.name.clone()))?;
        returns.decode(encoded).map(Some)
    }

    /// Log line a contract emits when returning `value` from this method.
    pub fn encode_return(&self, value: &AbiValue) -> Result<Vec<u8>, AbiError> {
        let returns = self
            .returns
            .as_ref()
            .ok_or_else(|| AbiError::MissingReturn(self.name.clone()))?;
        let mut log = ABI_RETURN_PREFIX.to_vec();
        log.extend(returns.encode(value)?);
        Ok(log)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.signature())
    }
}

impl FromStr for Method {
    type Err = AbiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || AbiError::InvalidSignature(s.to_string());

        let open = s.find('(').ok_or_else(invalid)?;
        let name = &s[..open];
        if name.is_empty() {
            return Err(invalid());
        }

        let mut depth = 0i32;
        let mut close = None;
        for (i, c) in s[open..].char_indices() {
            match c {
                '(' => depth += 1,
                ')' => {
                    depth -= 1;
                    if depth == 0 {
                        close = Some(open + i);
                        break;
                    }
                }
                _ => {}
            }
        }
        let close = close.ok_or_else(invalid)?;

        let args = split_top_level(&s[open + 1..close])
            .ok_or_else(invalid)?
            .into_iter()
            .map(str::parse)
            .collect::<Result<Vec<ArgType>, _>>()?;

        let returns = match &s[close + 1..] {
            "void" => None,
            "" => return Err(invalid()),
            returns => Some(returns.parse()?),
        };

        Ok(Method {
            name: name.to_string(),
            args,
            returns,
        })
    }
}
