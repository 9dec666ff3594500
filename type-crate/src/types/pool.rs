use core::fmt;

use serde::{Deserialize, Serialize};

use crate::abi::AbiValue;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolInfo {
    pub pool_app_id: u64,
    pub total_stakers: u16,
    pub total_algo_staked: u64,
}

/// Identifies one staking pool of one validator. `pool_id` is 1-based; a key
/// with `id == 0` or `pool_id == 0` means "no pool".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ValidatorPoolKey {
    pub id: u64,
    pub pool_id: u64,
    pub pool_app_id: u64,
}

impl ValidatorPoolKey {
    pub fn new(id: u64, pool_id: u64, pool_app_id: u64) -> Self {
        ValidatorPoolKey {
            id,
            pool_id,
            pool_app_id,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.id != 0 && self.pool_id != 0
    }

    pub fn to_abi_value(&self) -> AbiValue {
        AbiValue::Array(vec![
            AbiValue::Uint64(self.id),
            AbiValue::Uint64(self.pool_id),
            AbiValue::Uint64(self.pool_app_id),
        ])
    }
}

impl fmt::Display for ValidatorPoolKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ValidatorPoolKey{{ID: {}, PoolID: {}, PoolAppID: {}}}",
            self.id, self.pool_id, self.pool_app_id
        )
    }
}

/// Registry's answer to "which pool would this stake land in".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FoundPool {
    pub pool_key: ValidatorPoolKey,
    pub is_new_staker_to_validator: bool,
    pub is_new_staker_to_protocol: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MbrAmounts {
    pub add_validator_mbr: u64,
    pub add_pool_mbr: u64,
    pub pool_init_mbr: u64,
    pub add_staker_mbr: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    #[test_case(0, 0, false)]
    #[test_case(5, 0, false)]
    #[test_case(0, 2, false)]
    #[test_case(5, 2, true)]
    fn key_validity(id: u64, pool_id: u64, valid: bool) {
        assert_eq!(ValidatorPoolKey::new(id, pool_id, 999).is_valid(), valid);
    }

    #[test]
    fn key_display() {
        assert_eq!(
            ValidatorPoolKey::new(1, 2, 3).to_string(),
            "ValidatorPoolKey{ID: 1, PoolID: 2, PoolAppID: 3}"
        );
    }
}
