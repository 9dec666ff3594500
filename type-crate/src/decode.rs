//! Typed decoding of registry return values.
//!
//! Every record is checked against a fixed shape (arity plus the ABI width of
//! each element) before any field is read, so a contract/client mismatch
//! surfaces as a [`DecodeError`] instead of a silently wrong record.

use thiserror::Error;

use crate::{
    abi::AbiValue,
    constants::{MAX_NODES, MAX_POOLS_PER_NODE},
    types::{
        Address, FoundPool, MbrAmounts, NodeConfig, NodePoolAssignmentConfig, PoolInfo,
        ValidatorConfig, ValidatorCurState, ValidatorPoolKey,
    },
};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("{record}: expected a tuple or array, got {observed}")]
    NotAnArray {
        record: &'static str,
        observed: &'static str,
    },
    #[error("{record}: expected {expected} elements, got {observed}")]
    Arity {
        record: &'static str,
        expected: usize,
        observed: usize,
    },
    #[error("{record}: element {index} expected {expected}, got {observed}")]
    ElementType {
        record: &'static str,
        index: usize,
        expected: &'static str,
        observed: &'static str,
    },
    #[error("{record}: element {index} holds {observed} bytes, expected a 32-byte account")]
    AccountLength {
        record: &'static str,
        index: usize,
        observed: usize,
    },
    #[error("{record}: expected {expected}, got {observed}")]
    Scalar {
        record: &'static str,
        expected: &'static str,
        observed: &'static str,
    },
}

/// ABI element kinds a record field may hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Bool,
    Account,
    /// Nested tuple or array, validated by its own decoder.
    Nested,
}

impl FieldKind {
    fn name(&self) -> &'static str {
        match self {
            FieldKind::Uint8 => "uint8",
            FieldKind::Uint16 => "uint16",
            FieldKind::Uint32 => "uint32",
            FieldKind::Uint64 => "uint64",
            FieldKind::Bool => "bool",
            FieldKind::Account => "address",
            FieldKind::Nested => "array",
        }
    }

    fn accepts(&self, value: &AbiValue) -> bool {
        matches!(
            (self, value),
            (FieldKind::Uint8, AbiValue::Uint8(_))
                | (FieldKind::Uint16, AbiValue::Uint16(_))
                | (FieldKind::Uint32, AbiValue::Uint32(_))
                | (FieldKind::Uint64, AbiValue::Uint64(_))
                | (FieldKind::Bool, AbiValue::Bool(_))
                | (FieldKind::Account, AbiValue::Bytes(_))
                | (FieldKind::Nested, AbiValue::Array(_))
        )
    }
}

#[derive(Debug)]
pub struct RecordShape {
    pub name: &'static str,
    pub fields: &'static [FieldKind],
}

use FieldKind::*;

pub const VALIDATOR_CONFIG_SHAPE: RecordShape = RecordShape {
    name: "ValidatorConfig",
    fields: &[
        Uint64, Account, Account, Uint64, Account, Uint64, Uint64, Uint64, Uint16, Uint32,
        Account, Uint64, Uint64, Uint8, Uint64, Uint64,
    ],
};

pub const VALIDATOR_CUR_STATE_SHAPE: RecordShape = RecordShape {
    name: "ValidatorCurState",
    fields: &[Uint16, Uint64, Uint64],
};

pub const POOL_INFO_SHAPE: RecordShape = RecordShape {
    name: "PoolInfo",
    fields: &[Uint64, Uint16, Uint64],
};

pub const VALIDATOR_POOL_KEY_SHAPE: RecordShape = RecordShape {
    name: "ValidatorPoolKey",
    fields: &[Uint64, Uint64, Uint64],
};

pub const MBR_AMOUNTS_SHAPE: RecordShape = RecordShape {
    name: "MbrAmounts",
    fields: &[Uint64, Uint64, Uint64, Uint64],
};

pub const FOUND_POOL_SHAPE: RecordShape = RecordShape {
    name: "FoundPool",
    fields: &[Nested, Bool, Bool],
};

const NODE_POOL_ASSIGNMENT_SHAPE: RecordShape = RecordShape {
    name: "NodePoolAssignmentConfig",
    fields: &[Nested],
};

const NODE_CONFIG_SHAPE: RecordShape = RecordShape {
    name: "NodeConfig",
    fields: &[Nested],
};

/// A tuple whose arity and element kinds already match a [`RecordShape`].
struct Record<'a> {
    shape: &'static RecordShape,
    items: &'a [AbiValue],
}

impl<'a> Record<'a> {
    fn open(shape: &'static RecordShape, value: &'a AbiValue) -> Result<Self, DecodeError> {
        let items = as_items(shape.name, value)?;
        if items.len() != shape.fields.len() {
            return Err(DecodeError::Arity {
                record: shape.name,
                expected: shape.fields.len(),
                observed: items.len(),
            });
        }
        for (index, (kind, item)) in shape.fields.iter().zip(items).enumerate() {
            if !kind.accepts(item) {
                return Err(DecodeError::ElementType {
                    record: shape.name,
                    index,
                    expected: kind.name(),
                    observed: item.kind(),
                });
            }
        }
        Ok(Record { shape, items })
    }

    fn mismatch(&self, index: usize, expected: FieldKind) -> DecodeError {
        DecodeError::ElementType {
            record: self.shape.name,
            index,
            expected: expected.name(),
            observed: self.items[index].kind(),
        }
    }

    fn u8(&self, index: usize) -> Result<u8, DecodeError> {
        match self.items[index] {
            AbiValue::Uint8(v) => Ok(v),
            _ => Err(self.mismatch(index, Uint8)),
        }
    }

    fn u16(&self, index: usize) -> Result<u16, DecodeError> {
        match self.items[index] {
            AbiValue::Uint16(v) => Ok(v),
            _ => Err(self.mismatch(index, Uint16)),
        }
    }

    fn u32(&self, index: usize) -> Result<u32, DecodeError> {
        match self.items[index] {
            AbiValue::Uint32(v) => Ok(v),
            _ => Err(self.mismatch(index, Uint32)),
        }
    }

    fn u64(&self, index: usize) -> Result<u64, DecodeError> {
        match self.items[index] {
            AbiValue::Uint64(v) => Ok(v),
            _ => Err(self.mismatch(index, Uint64)),
        }
    }

    fn bool(&self, index: usize) -> Result<bool, DecodeError> {
        match self.items[index] {
            AbiValue::Bool(v) => Ok(v),
            _ => Err(self.mismatch(index, Bool)),
        }
    }

    fn account(&self, index: usize) -> Result<Address, DecodeError> {
        match &self.items[index] {
            AbiValue::Bytes(bytes) => {
                Address::from_slice(bytes).ok_or(DecodeError::AccountLength {
                    record: self.shape.name,
                    index,
                    observed: bytes.len(),
                })
            }
            _ => Err(self.mismatch(index, Account)),
        }
    }

    fn nested(&self, index: usize) -> &'a AbiValue {
        &self.items[index]
    }
}

fn as_items<'a>(record: &'static str, value: &'a AbiValue) -> Result<&'a [AbiValue], DecodeError> {
    value.as_array().ok_or(DecodeError::NotAnArray {
        record,
        observed: value.kind(),
    })
}

/// Conversion from a decoded ABI return value into a typed record.
pub trait FromAbi: Sized {
    fn from_abi(value: &AbiValue) -> Result<Self, DecodeError>;
}

pub fn decode<T: FromAbi>(value: &AbiValue) -> Result<T, DecodeError> {
    T::from_abi(value)
}

impl FromAbi for ValidatorConfig {
    fn from_abi(value: &AbiValue) -> Result<Self, DecodeError> {
        let r = Record::open(&VALIDATOR_CONFIG_SHAPE, value)?;
        Ok(ValidatorConfig {
            id: r.u64(0)?,
            owner: r.account(1)?,
            manager: r.account(2)?,
            nfd_for_info: r.u64(3)?,
            must_hold_creator_nft: r.account(4)?,
            creator_nft_min_balance: r.u64(5)?,
            reward_token_id: r.u64(6)?,
            reward_per_payout: r.u64(7)?,
            payout_every_x_mins: r.u16(8)?,
            percent_to_validator: r.u32(9)?,
            validator_commission_address: r.account(10)?,
            min_entry_stake: r.u64(11)?,
            max_algo_per_pool: r.u64(12)?,
            pools_per_node: r.u8(13)?,
            sunsetting_on: r.u64(14)?,
            sunsetting_to: r.u64(15)?,
        })
    }
}

impl FromAbi for ValidatorCurState {
    fn from_abi(value: &AbiValue) -> Result<Self, DecodeError> {
        let r = Record::open(&VALIDATOR_CUR_STATE_SHAPE, value)?;
        Ok(ValidatorCurState {
            num_pools: r.u16(0)?,
            total_stakers: r.u64(1)?,
            total_algo_staked: r.u64(2)?,
        })
    }
}

impl FromAbi for PoolInfo {
    fn from_abi(value: &AbiValue) -> Result<Self, DecodeError> {
        let r = Record::open(&POOL_INFO_SHAPE, value)?;
        Ok(PoolInfo {
            pool_app_id: r.u64(0)?,
            total_stakers: r.u16(1)?,
            total_algo_staked: r.u64(2)?,
        })
    }
}

impl FromAbi for ValidatorPoolKey {
    fn from_abi(value: &AbiValue) -> Result<Self, DecodeError> {
        let r = Record::open(&VALIDATOR_POOL_KEY_SHAPE, value)?;
        Ok(ValidatorPoolKey {
            id: r.u64(0)?,
            pool_id: r.u64(1)?,
            pool_app_id: r.u64(2)?,
        })
    }
}

impl FromAbi for MbrAmounts {
    fn from_abi(value: &AbiValue) -> Result<Self, DecodeError> {
        let r = Record::open(&MBR_AMOUNTS_SHAPE, value)?;
        Ok(MbrAmounts {
            add_validator_mbr: r.u64(0)?,
            add_pool_mbr: r.u64(1)?,
            pool_init_mbr: r.u64(2)?,
            add_staker_mbr: r.u64(3)?,
        })
    }
}

impl FromAbi for FoundPool {
    fn from_abi(value: &AbiValue) -> Result<Self, DecodeError> {
        let r = Record::open(&FOUND_POOL_SHAPE, value)?;
        Ok(FoundPool {
            pool_key: ValidatorPoolKey::from_abi(r.nested(0))?,
            is_new_staker_to_validator: r.bool(1)?,
            is_new_staker_to_protocol: r.bool(2)?,
        })
    }
}

/// Decodes `((uint64[4])[12])`. Zero slots are unused and dropped; the order
/// of the remaining pool app ids is kept.
impl FromAbi for NodePoolAssignmentConfig {
    fn from_abi(value: &AbiValue) -> Result<Self, DecodeError> {
        let outer = Record::open(&NODE_POOL_ASSIGNMENT_SHAPE, value)?;
        let node_values = as_items(NODE_POOL_ASSIGNMENT_SHAPE.name, outer.nested(0))?;
        if node_values.len() != MAX_NODES {
            return Err(DecodeError::Arity {
                record: NODE_POOL_ASSIGNMENT_SHAPE.name,
                expected: MAX_NODES,
                observed: node_values.len(),
            });
        }

        let nodes = node_values
            .iter()
            .map(|node_value| {
                let node = Record::open(&NODE_CONFIG_SHAPE, node_value)?;
                let slots = as_items(NODE_CONFIG_SHAPE.name, node.nested(0))?;
                if slots.len() != MAX_POOLS_PER_NODE {
                    return Err(DecodeError::Arity {
                        record: NODE_CONFIG_SHAPE.name,
                        expected: MAX_POOLS_PER_NODE,
                        observed: slots.len(),
                    });
                }
                let mut pool_app_ids = Vec::with_capacity(MAX_POOLS_PER_NODE);
                for (index, slot) in slots.iter().enumerate() {
                    match slot {
                        AbiValue::Uint64(0) => {}
                        AbiValue::Uint64(app_id) => pool_app_ids.push(*app_id),
                        other => {
                            return Err(DecodeError::ElementType {
                                record: NODE_CONFIG_SHAPE.name,
                                index,
                                expected: Uint64.name(),
                                observed: other.kind(),
                            })
                        }
                    }
                }
                Ok(NodeConfig { pool_app_ids })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(NodePoolAssignmentConfig { nodes })
    }
}

impl<T: FromAbi> FromAbi for Vec<T> {
    fn from_abi(value: &AbiValue) -> Result<Self, DecodeError> {
        as_items("list", value)?.iter().map(T::from_abi).collect()
    }
}

impl FromAbi for u64 {
    fn from_abi(value: &AbiValue) -> Result<Self, DecodeError> {
        match value {
            AbiValue::Uint64(v) => Ok(*v),
            other => Err(DecodeError::Scalar {
                record: "uint64",
                expected: Uint64.name(),
                observed: other.kind(),
            }),
        }
    }
}

impl FromAbi for bool {
    fn from_abi(value: &AbiValue) -> Result<Self, DecodeError> {
        match value {
            AbiValue::Bool(v) => Ok(*v),
            other => Err(DecodeError::Scalar {
                record: "bool",
                expected: Bool.name(),
                observed: other.kind(),
            }),
        }
    }
}
