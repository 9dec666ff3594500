//! Stake deposits and withdrawals. Both run variable-cost contract code, so
//! their fee is found by simulating first (see [`crate::fees`]).

use {
    super::Reti,
    crate::{
        errors::{RetiError, RetiResult},
        fees::{Decided, Discovery},
        group::{ComposedGroup, Fee, MethodArg, MethodCall, PaymentStep, TransactionGroupBuilder},
        ledger::{LedgerClient, SuggestedParams},
        methods::{STAKING_POOL, VALIDATOR_REGISTRY},
        resources::ResourceReferenceResolver,
    },
    log::info,
    retitypecrate::{
        abi::AbiValue,
        types::{Address, ValidatorPoolKey},
        utils::formatted_algo_amount,
    },
};

impl<L: LedgerClient> Reti<L> {
    /// Stakes `amount` with validator `validator_id` and returns the pool the
    /// registry placed it in. A first-time staker's MBR is added on top.
    ///
    /// The target pool is predicted up front so its references can be
    /// declared; if the prediction is stale by commit time the ledger rejects
    /// the group and that error is returned as is.
    pub fn add_stake(
        &self,
        validator_id: u64,
        staker: &Address,
        amount: u64,
        asset_id_to_check: u64,
    ) -> RetiResult<ValidatorPoolKey> {
        let params = self.suggested_params()?;
        let mbrs = self.get_mbr_amounts(staker)?;

        let mut amount_to_stake = amount;
        if self.does_staker_need_to_pay_mbr(staker)? {
            info!(
                "adding {} to stake to cover first-time MBR",
                formatted_algo_amount(mbrs.add_staker_mbr)
            );
            amount_to_stake = amount
                .checked_add(mbrs.add_staker_mbr)
                .ok_or(RetiError::InvalidAmount(amount))?;
        }

        let found = self.find_pool_for_staker(validator_id, staker, amount)?;
        if !is_callable(&found.pool_key) {
            return Err(RetiError::NoPoolAvailable(validator_id));
        }
        let pool_app_id = found.pool_key.pool_app_id;
        info!(
            "staking {} to validator:{} pool app id:{}",
            formatted_algo_amount(amount_to_stake),
            validator_id,
            pool_app_id
        );

        let add_stake = VALIDATOR_REGISTRY.method("addStake")?;
        let build = |fee: u64| -> RetiResult<ComposedGroup> {
            let mut builder = TransactionGroupBuilder::new(params.clone());
            builder.add_method_call(self.gas_call(validator_id, staker)?)?;
            builder.add_method_call(
                MethodCall::new(
                    self.registry_app_id(),
                    add_stake,
                    *staker,
                    self.signer_for(*staker),
                )
                .arg(MethodArg::Payment(PaymentStep {
                    sender: *staker,
                    receiver: Address::for_application(self.registry_app_id()),
                    amount: amount_to_stake,
                    signer: self.signer_for(*staker),
                    fee: Fee::Minimum,
                }))
                .arg(AbiValue::Uint64(validator_id))
                .arg(AbiValue::Uint64(asset_id_to_check))
                .resources(ResourceReferenceResolver::add_stake(pool_app_id))
                .fee(Fee::Flat(fee)),
            )?;
            builder.build()
        };

        let committed = self
            .discover(&params, build)?
            .commit(self.config().wait_rounds)?;
        let pool_key: ValidatorPoolKey = committed.outcome.decoded("addStake")?;
        info!("stake landed in {}", pool_key);
        Ok(pool_key)
    }

    /// Withdraws `amount` of `staker`'s stake from the pool in `pool_key`.
    pub fn remove_stake(
        &self,
        pool_key: &ValidatorPoolKey,
        staker: &Address,
        amount: u64,
    ) -> RetiResult<()> {
        if !is_callable(pool_key) {
            return Err(RetiError::NoPoolAvailable(pool_key.id));
        }
        let params = self.suggested_params()?;
        let remove_stake = STAKING_POOL.method("removeStake")?;
        info!(
            "removing {} from {}",
            formatted_algo_amount(amount),
            pool_key
        );

        let build = |fee: u64| -> RetiResult<ComposedGroup> {
            let mut builder = TransactionGroupBuilder::new(params.clone());
            builder.add_method_call(self.gas_call(pool_key.id, staker)?)?;
            builder.add_method_call(
                MethodCall::new(
                    pool_key.pool_app_id,
                    remove_stake,
                    *staker,
                    self.signer_for(*staker),
                )
                .arg(AbiValue::Uint64(amount))
                .resources(ResourceReferenceResolver::remove_stake(pool_key.pool_app_id))
                .fee(Fee::Flat(fee)),
            )?;
            builder.build()
        };

        self.discover(&params, build)?
            .commit(self.config().wait_rounds)?;
        Ok(())
    }

    fn discover<'a, F>(
        &'a self,
        params: &SuggestedParams,
        build: F,
    ) -> RetiResult<Decided<'a, L, F>>
    where
        F: Fn(u64) -> RetiResult<ComposedGroup>,
    {
        Discovery::new(self.ledger(), params.min_fee, build).discover()
    }

    /// Zero-argument registry call placed first in the group. It does
    /// nothing itself; its references widen the group's shared resources.
    fn gas_call(&self, validator_id: u64, staker: &Address) -> RetiResult<MethodCall> {
        Ok(MethodCall::new(
            self.registry_app_id(),
            VALIDATOR_REGISTRY.method("gas")?,
            *staker,
            self.signer_for(*staker),
        )
        .resources(ResourceReferenceResolver::stake_gas(validator_id, staker)))
    }
}

/// A key whose pool app can be called. App id 0 would address an app creation.
fn is_callable(pool_key: &ValidatorPoolKey) -> bool {
    pool_key.is_valid() && pool_key.pool_app_id != 0
}
