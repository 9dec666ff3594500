use core::fmt;
use std::collections::BTreeMap;

use chrono::{DateTime, SecondsFormat, TimeZone, Utc};
use fixed::types::I80F48;
use serde::{Deserialize, Serialize};

use super::{Address, NodePoolAssignmentConfig, PoolInfo};
use crate::{
    abi::AbiValue,
    constants::COMMISSION_SCALE,
    utils::{formatted_algo_amount, formatted_minutes},
};

/// Registry-side configuration of one validator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorConfig {
    /// Sequentially assigned by the registry, starting at 1.
    pub id: u64,
    /// Controls the configuration.
    pub owner: Address,
    /// Signs payouts and key registrations from the node.
    pub manager: Address,
    /// NFD app describing the validator, 0 if unset.
    pub nfd_for_info: u64,
    /// Creator whose assets stakers must hold. Zero address disables gating.
    pub must_hold_creator_nft: Address,
    pub creator_nft_min_balance: u64,
    pub reward_token_id: u64,
    pub reward_per_payout: u64,
    pub payout_every_x_mins: u16,
    /// Commission with four implied decimals, `50_000` is 5%.
    pub percent_to_validator: u32,
    pub validator_commission_address: Address,
    pub min_entry_stake: u64,
    pub max_algo_per_pool: u64,
    pub pools_per_node: u8,
    /// Unix timestamp at which the validator sunsets, 0 if never.
    pub sunsetting_on: u64,
    /// Validator id stakers are being moved to, 0 if unknown.
    pub sunsetting_to: u64,
}

impl ValidatorConfig {
    pub fn commission_percent(&self) -> I80F48 {
        I80F48::from_num(self.percent_to_validator) / COMMISSION_SCALE
    }

    pub fn is_token_gated(&self) -> bool {
        !self.must_hold_creator_nft.is_zero()
    }

    pub fn sunset_time(&self) -> Option<DateTime<Utc>> {
        if self.sunsetting_on == 0 {
            return None;
        }
        Utc.timestamp_opt(i64::try_from(self.sunsetting_on).ok()?, 0)
            .single()
    }

    /// Tuple form expected by `addValidator`.
    pub fn to_abi_value(&self) -> AbiValue {
        AbiValue::Array(vec![
            AbiValue::Uint64(self.id),
            self.owner.into(),
            self.manager.into(),
            AbiValue::Uint64(self.nfd_for_info),
            self.must_hold_creator_nft.into(),
            AbiValue::Uint64(self.creator_nft_min_balance),
            AbiValue::Uint64(self.reward_token_id),
            AbiValue::Uint64(self.reward_per_payout),
            AbiValue::Uint16(self.payout_every_x_mins),
            AbiValue::Uint32(self.percent_to_validator),
            self.validator_commission_address.into(),
            AbiValue::Uint64(self.min_entry_stake),
            AbiValue::Uint64(self.max_algo_per_pool),
            AbiValue::Uint8(self.pools_per_node),
            AbiValue::Uint64(self.sunsetting_on),
            AbiValue::Uint64(self.sunsetting_to),
        ])
    }
}

impl fmt::Display for ValidatorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "ID: {}", self.id)?;
        writeln!(f, "Owner: {}", self.owner)?;
        writeln!(f, "Manager: {}", self.manager)?;
        writeln!(
            f,
            "Validator Commission Address: {}",
            self.validator_commission_address
        )?;
        writeln!(f, "% to Validator: {:.4}", self.commission_percent())?;
        if self.nfd_for_info != 0 {
            writeln!(f, "NFD ID: {}", self.nfd_for_info)?;
        }
        if self.is_token_gated() {
            writeln!(f, "Reward Token Creator Reqd: {}", self.must_hold_creator_nft)?;
            writeln!(f, "Reward Token Min Bal: {}", self.creator_nft_min_balance)?;
            writeln!(f, "Reward Token ID: {}", self.reward_token_id)?;
            writeln!(f, "Reward Per Payout: {}", self.reward_per_payout)?;
        }
        writeln!(
            f,
            "Payout Every {}",
            formatted_minutes(self.payout_every_x_mins as u64)
        )?;
        writeln!(
            f,
            "Min Entry Stake: {}",
            formatted_algo_amount(self.min_entry_stake)
        )?;
        writeln!(
            f,
            "Max Algo Per Pool: {}",
            formatted_algo_amount(self.max_algo_per_pool)
        )?;
        writeln!(f, "Max Pools per Node: {}", self.pools_per_node)?;
        if let Some(sunset) = self.sunset_time() {
            writeln!(
                f,
                "Sunsetting On: {}",
                sunset.to_rfc3339_opts(SecondsFormat::Secs, true)
            )?;
            if self.sunsetting_to != 0 {
                writeln!(f, "Sunsetting To: {}", self.sunsetting_to)?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorCurState {
    pub num_pools: u16,
    pub total_stakers: u64,
    pub total_algo_staked: u64,
}

impl fmt::Display for ValidatorCurState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "NumPools: {}, TotalStakers: {}, TotalAlgoStaked: {}",
            self.num_pools, self.total_stakers, self.total_algo_staked
        )
    }
}

/// Everything a node daemon needs about its validator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorInfo {
    pub config: ValidatorConfig,
    pub pools: Vec<PoolInfo>,
    pub node_pool_assignments: NodePoolAssignmentConfig,
    /// 1-based pool id to pool app id, for pools hosted on the local node.
    pub local_pools: BTreeMap<u64, u64>,
}

impl ValidatorInfo {
    pub fn new(
        config: ValidatorConfig,
        pools: Vec<PoolInfo>,
        node_pool_assignments: NodePoolAssignmentConfig,
        node_num: u64,
    ) -> Self {
        let local_pools = pools
            .iter()
            .enumerate()
            .filter(|(_, pool)| {
                node_pool_assignments.node_for_pool(pool.pool_app_id) == Some(node_num)
            })
            .map(|(index, pool)| (index as u64 + 1, pool.pool_app_id))
            .collect();

        ValidatorInfo {
            config,
            pools,
            node_pool_assignments,
            local_pools,
        }
    }

    /// 1-based pool id of `pool_app_id` within this validator.
    pub fn pool_id_for_app(&self, pool_app_id: u64) -> Option<u64> {
        self.pools
            .iter()
            .position(|pool| pool.pool_app_id == pool_app_id)
            .map(|index| index as u64 + 1)
    }
}
