//! Validator-owner and manager operations on the registry.

use {
    super::Reti,
    crate::{
        errors::RetiResult,
        fees::{add_pool_fee, move_pool_fee},
        group::{Fee, MethodArg, MethodCall, PaymentStep, TransactionGroupBuilder},
        ledger::LedgerClient,
        methods::{STAKING_POOL, VALIDATOR_REGISTRY},
        resources::ResourceReferenceResolver,
    },
    log::info,
    retitypecrate::{
        abi::AbiValue,
        box_keys::staker_ledger_box_name,
        types::{Address, NodeAssignmentError, ValidatorConfig, ValidatorInfo, ValidatorPoolKey},
        utils::formatted_algo_amount,
    },
};

/// Whether a pool's staker ledger has been allocated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolStorageState {
    Uninitialized,
    Initialized,
}

impl<L: LedgerClient> Reti<L> {
    /// Registers a new validator owned by `config.owner` and returns the id the
    /// registry assigned. `config.id` is ignored.
    pub fn add_validator(&self, config: &ValidatorConfig, nfd_name: &str) -> RetiResult<u64> {
        let owner = config.owner;
        let mbrs = self.get_mbr_amounts(&owner)?;
        let num_validators = self.get_num_validators()?;
        info!(
            "registering validator, mbr payment: {}",
            formatted_algo_amount(mbrs.add_validator_mbr)
        );

        let registration = ValidatorConfig {
            id: 0,
            ..config.clone()
        };
        let call = MethodCall::new(
            self.registry_app_id(),
            VALIDATOR_REGISTRY.method("addValidator")?,
            owner,
            self.signer_for(owner),
        )
        .arg(MethodArg::Payment(PaymentStep {
            sender: owner,
            receiver: Address::for_application(self.registry_app_id()),
            amount: mbrs.add_validator_mbr,
            signer: self.signer_for(owner),
            fee: Fee::Minimum,
        }))
        .arg(AbiValue::from(nfd_name))
        .arg(registration.to_abi_value())
        .resources(ResourceReferenceResolver::add_validator(num_validators));

        let mut builder = TransactionGroupBuilder::new(self.suggested_params()?);
        builder.add_method_call(call)?;
        let validator_id: u64 = self.commit(builder)?.decoded("addValidator")?;
        info!("registered validator id:{}", validator_id);
        Ok(validator_id)
    }

    pub fn change_validator_commission_address(
        &self,
        validator_id: u64,
        sender: &Address,
        commission_address: &Address,
    ) -> RetiResult<()> {
        let call = MethodCall::new(
            self.registry_app_id(),
            VALIDATOR_REGISTRY.method("changeValidatorCommissionAddress")?,
            *sender,
            self.signer_for(*sender),
        )
        .arg(AbiValue::Uint64(validator_id))
        .arg(AbiValue::from(*commission_address))
        .resources(ResourceReferenceResolver::change_commission_address(
            validator_id,
            self.pool_template_app_id(),
        ));

        let mut builder = TransactionGroupBuilder::new(self.suggested_params()?);
        builder.add_method_call(call)?;
        self.commit(builder)?;
        info!(
            "validator id:{} commission address set to {}",
            validator_id, commission_address
        );
        Ok(())
    }

    /// Creates a staking pool on node `node_num` and initializes its storage.
    /// Node range and capacity are checked against `info` before anything is sent.
    pub fn add_staking_pool(
        &self,
        info: &ValidatorInfo,
        node_num: u64,
    ) -> RetiResult<ValidatorPoolKey> {
        if !info.node_pool_assignments.node_has_capacity(node_num)? {
            return Err(NodeAssignmentError::NodeFull(node_num).into());
        }

        let validator_id = info.config.id;
        let manager = info.config.manager;
        let params = self.suggested_params()?;
        let mbrs = self.get_mbr_amounts(&manager)?;
        info!("adding staking pool to node:{}", node_num);

        let call = MethodCall::new(
            self.registry_app_id(),
            VALIDATOR_REGISTRY.method("addPool")?,
            manager,
            self.signer_for(manager),
        )
        .arg(MethodArg::Payment(PaymentStep {
            sender: manager,
            receiver: Address::for_application(self.registry_app_id()),
            amount: mbrs.add_pool_mbr,
            signer: self.signer_for(manager),
            fee: Fee::Minimum,
        }))
        .arg(AbiValue::Uint64(validator_id))
        .arg(AbiValue::Uint64(node_num))
        .resources(ResourceReferenceResolver::add_pool(
            validator_id,
            self.pool_template_app_id(),
        ))
        .fee(Fee::Flat(add_pool_fee(params.min_fee)));

        let mut builder = TransactionGroupBuilder::new(params);
        builder.add_method_call(call)?;
        let pool_key: ValidatorPoolKey = self.commit(builder)?.decoded("addPool")?;
        info!("created {}", pool_key);

        self.check_and_init_staking_pool_storage(&pool_key, &manager)?;
        Ok(pool_key)
    }

    /// A missing or empty staker ledger box means the pool is uninitialized.
    pub fn pool_storage_state(&self, pool_app_id: u64) -> RetiResult<PoolStorageState> {
        let ledger_box = self
            .ledger()
            .application_box(pool_app_id, &staker_ledger_box_name())?;
        Ok(match ledger_box {
            Some(contents) if !contents.is_empty() => PoolStorageState::Initialized,
            _ => PoolStorageState::Uninitialized,
        })
    }

    /// Allocates the pool's staker ledger if needed, paying the pool-init MBR
    /// from `payer`, and returns the state found before acting. An initialized
    /// pool is left alone and nothing is paid, so repeating this is harmless.
    pub fn check_and_init_staking_pool_storage(
        &self,
        pool_key: &ValidatorPoolKey,
        payer: &Address,
    ) -> RetiResult<PoolStorageState> {
        if self.pool_storage_state(pool_key.pool_app_id)? == PoolStorageState::Initialized {
            return Ok(PoolStorageState::Initialized);
        }

        let params = self.suggested_params()?;
        let mbrs = self.get_mbr_amounts(payer)?;
        info!(
            "initializing staking pool storage, mbr payment to pool:{}",
            formatted_algo_amount(mbrs.pool_init_mbr)
        );

        let call = MethodCall::new(
            pool_key.pool_app_id,
            STAKING_POOL.method("initStorage")?,
            *payer,
            self.signer_for(*payer),
        )
        .arg(MethodArg::Payment(PaymentStep {
            sender: *payer,
            receiver: Address::for_application(pool_key.pool_app_id),
            amount: mbrs.pool_init_mbr,
            signer: self.signer_for(*payer),
            fee: Fee::Minimum,
        }))
        .resources(ResourceReferenceResolver::init_storage());

        let mut builder = TransactionGroupBuilder::new(params);
        builder.add_method_call(call)?;
        self.commit(builder)?;
        Ok(PoolStorageState::Uninitialized)
    }

    /// Moves one of the validator's pools to node `node_num`. The move is
    /// checked against `info` locally before anything is sent.
    pub fn move_pool_to_node(
        &self,
        info: &ValidatorInfo,
        pool_app_id: u64,
        node_num: u64,
    ) -> RetiResult<()> {
        if info.pool_id_for_app(pool_app_id).is_none() {
            return Err(NodeAssignmentError::UnknownPool(pool_app_id).into());
        }
        let mut assignments = info.node_pool_assignments.clone();
        assignments.remove_pool(pool_app_id);
        assignments.add_pool_to_node(node_num, pool_app_id)?;

        let validator_id = info.config.id;
        let manager = info.config.manager;
        let params = self.suggested_params()?;
        info!(
            "moving pool app id:{} to node number:{}",
            pool_app_id, node_num
        );

        let call = MethodCall::new(
            self.registry_app_id(),
            VALIDATOR_REGISTRY.method("movePoolToNode")?,
            manager,
            self.signer_for(manager),
        )
        .arg(AbiValue::Uint64(validator_id))
        .arg(AbiValue::Uint64(pool_app_id))
        .arg(AbiValue::Uint64(node_num))
        .resources(ResourceReferenceResolver::move_pool_to_node(
            validator_id,
            self.pool_template_app_id(),
            pool_app_id,
        ))
        .fee(Fee::Flat(move_pool_fee(params.min_fee)));

        let mut builder = TransactionGroupBuilder::new(params);
        builder.add_method_call(call)?;
        self.commit(builder)?;
        Ok(())
    }
}
