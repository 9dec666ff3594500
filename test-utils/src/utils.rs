//! ABI-shaped return values the mock ledger hands back for registry reads.

use retitypecrate::{
    abi::AbiValue,
    constants::{MAX_NODES, MAX_POOLS_PER_NODE},
    types::{FoundPool, MbrAmounts, PoolInfo, ValidatorCurState},
};

pub fn mbr_amounts_value(mbrs: &MbrAmounts) -> AbiValue {
    AbiValue::Array(vec![
        AbiValue::Uint64(mbrs.add_validator_mbr),
        AbiValue::Uint64(mbrs.add_pool_mbr),
        AbiValue::Uint64(mbrs.pool_init_mbr),
        AbiValue::Uint64(mbrs.add_staker_mbr),
    ])
}

pub fn validator_state_value(state: &ValidatorCurState) -> AbiValue {
    AbiValue::Array(vec![
        AbiValue::Uint16(state.num_pools),
        AbiValue::Uint64(state.total_stakers),
        AbiValue::Uint64(state.total_algo_staked),
    ])
}

pub fn pool_info_value(pool: &PoolInfo) -> AbiValue {
    AbiValue::Array(vec![
        AbiValue::Uint64(pool.pool_app_id),
        AbiValue::Uint16(pool.total_stakers),
        AbiValue::Uint64(pool.total_algo_staked),
    ])
}

pub fn pools_value(pools: &[PoolInfo]) -> AbiValue {
    AbiValue::Array(pools.iter().map(pool_info_value).collect())
}

pub fn found_pool_value(found: &FoundPool) -> AbiValue {
    AbiValue::Array(vec![
        found.pool_key.to_abi_value(),
        AbiValue::Bool(found.is_new_staker_to_validator),
        AbiValue::Bool(found.is_new_staker_to_protocol),
    ])
}

/// `((uint64[4])[12])` from per-node pool app ids; missing nodes and slots
/// are zero filled.
pub fn node_assignments_value(nodes: &[&[u64]]) -> AbiValue {
    let node_values = (0..MAX_NODES)
        .map(|node| {
            let pools = nodes.get(node).copied().unwrap_or_default();
            let slots = (0..MAX_POOLS_PER_NODE)
                .map(|slot| AbiValue::Uint64(pools.get(slot).copied().unwrap_or_default()))
                .collect();
            AbiValue::Array(vec![AbiValue::Array(slots)])
        })
        .collect();
    AbiValue::Array(vec![AbiValue::Array(node_values)])
}
