//! Read-only registry calls. Each is a single unsigned simulation that is
//! never committed.

use {
    super::Reti,
    crate::{
        errors::RetiResult,
        ledger::{LedgerClient, SimulateRequest},
        resources::ResourceReferenceResolver,
    },
    retitypecrate::{
        abi::AbiValue,
        decode::decode,
        types::{
            Address, FoundPool, MbrAmounts, NodePoolAssignmentConfig, PoolInfo, ValidatorConfig,
            ValidatorCurState, ValidatorInfo, ValidatorPoolKey,
        },
    },
};

impl<L: LedgerClient> Reti<L> {
    pub fn get_validator_config(&self, validator_id: u64) -> RetiResult<ValidatorConfig> {
        let value = self.simulate_registry_call(
            "getValidatorConfig",
            vec![AbiValue::Uint64(validator_id)],
            ResourceReferenceResolver::validator_read(validator_id),
            self.simulation_sender()?,
            SimulateRequest::unsigned(),
        )?;
        Ok(decode(&value)?)
    }

    pub fn get_validator_state(&self, validator_id: u64) -> RetiResult<ValidatorCurState> {
        let value = self.simulate_registry_call(
            "getValidatorState",
            vec![AbiValue::Uint64(validator_id)],
            ResourceReferenceResolver::validator_read(validator_id),
            self.simulation_sender()?,
            SimulateRequest::unsigned(),
        )?;
        Ok(decode(&value)?)
    }

    pub fn get_validator_pools(&self, validator_id: u64) -> RetiResult<Vec<PoolInfo>> {
        let value = self.simulate_registry_call(
            "getPools",
            vec![AbiValue::Uint64(validator_id)],
            ResourceReferenceResolver::validator_read(validator_id),
            self.simulation_sender()?,
            SimulateRequest::unsigned(),
        )?;
        Ok(decode(&value)?)
    }

    pub fn get_validator_pool_info(&self, pool_key: &ValidatorPoolKey) -> RetiResult<PoolInfo> {
        let value = self.simulate_registry_call(
            "getPoolInfo",
            vec![pool_key.to_abi_value()],
            ResourceReferenceResolver::pool_info(pool_key),
            self.simulation_sender()?,
            SimulateRequest::unsigned(),
        )?;
        Ok(decode(&value)?)
    }

    /// Pools `staker` has stake in. Empty keys are skipped.
    pub fn get_staked_pools_for_account(
        &self,
        staker: &Address,
    ) -> RetiResult<Vec<ValidatorPoolKey>> {
        let value = self.simulate_registry_call(
            "getStakedPoolsForAccount",
            vec![(*staker).into()],
            ResourceReferenceResolver::lookup(),
            *staker,
            SimulateRequest::unsigned(),
        )?;
        let keys: Vec<ValidatorPoolKey> = decode(&value)?;
        Ok(keys.into_iter().filter(ValidatorPoolKey::is_valid).collect())
    }

    pub fn get_validator_node_pool_assignments(
        &self,
        validator_id: u64,
    ) -> RetiResult<NodePoolAssignmentConfig> {
        let value = self.simulate_registry_call(
            "getNodePoolAssignments",
            vec![AbiValue::Uint64(validator_id)],
            ResourceReferenceResolver::validator_read(validator_id),
            self.simulation_sender()?,
            SimulateRequest::unsigned().with_more_logging(),
        )?;
        Ok(decode(&value)?)
    }

    /// The registry's prediction of where a stake of `amount` would land.
    /// Advisory only: the registry decides again when the stake is committed.
    pub fn find_pool_for_staker(
        &self,
        validator_id: u64,
        staker: &Address,
        amount: u64,
    ) -> RetiResult<FoundPool> {
        let value = self.simulate_registry_call(
            "findPoolForStaker",
            vec![
                AbiValue::Uint64(validator_id),
                (*staker).into(),
                AbiValue::Uint64(amount),
            ],
            ResourceReferenceResolver::lookup(),
            *staker,
            SimulateRequest::unsigned(),
        )?;
        Ok(decode(&value)?)
    }

    pub fn get_mbr_amounts(&self, caller: &Address) -> RetiResult<MbrAmounts> {
        let value = self.simulate_registry_call(
            "getMbrAmounts",
            vec![],
            ResourceReferenceResolver::lookup(),
            *caller,
            SimulateRequest::unsigned(),
        )?;
        Ok(decode(&value)?)
    }

    pub fn does_staker_need_to_pay_mbr(&self, staker: &Address) -> RetiResult<bool> {
        let value = self.simulate_registry_call(
            "doesStakerNeedToPayMBR",
            vec![(*staker).into()],
            ResourceReferenceResolver::lookup(),
            *staker,
            SimulateRequest::unsigned(),
        )?;
        Ok(decode(&value)?)
    }

    /// Fresh snapshot of a validator as seen from node `node_num`.
    pub fn load_validator_info(&self, validator_id: u64, node_num: u64) -> RetiResult<ValidatorInfo> {
        let config = self.get_validator_config(validator_id)?;
        let pools = self.get_validator_pools(validator_id)?;
        let assignments = self.get_validator_node_pool_assignments(validator_id)?;
        Ok(ValidatorInfo::new(config, pools, assignments, node_num))
    }
}
