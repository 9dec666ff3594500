pub mod queries;
pub mod staking;
pub mod validator;

use {
    crate::{
        config::Config,
        errors::{RetiError, RetiResult},
        group::{GroupOutcome, MethodArg, MethodCall, TransactionGroupBuilder},
        ledger::{global_state_uint, LedgerClient, SimulateRequest, SuggestedParams},
        methods::VALIDATOR_REGISTRY,
        resources::ResourcePlan,
        signer::{Signer, StepSigner},
    },
    log::{debug, info, warn},
    retitypecrate::{
        abi::AbiValue,
        constants::{NUM_VALIDATORS_GLOBAL_KEY, POOL_TEMPLATE_APP_ID_GLOBAL_KEY},
        types::Address,
    },
    std::sync::Arc,
};

pub use validator::PoolStorageState;

/// Client for one deployment of the validator registry.
///
/// Holds no mutable state: every operation fetches fee parameters, MBR
/// amounts and validator records fresh from the ledger.
pub struct Reti<L: LedgerClient> {
    config: Config,
    ledger: L,
    signer: Arc<dyn Signer>,
    pool_template_app_id: u64,
}

impl<L: LedgerClient> Reti<L> {
    /// Builds the client, reading the pool template app id from the registry
    /// when the config does not carry one.
    pub fn new(config: Config, ledger: L, signer: Arc<dyn Signer>) -> RetiResult<Self> {
        let pool_template_app_id = match config.pool_template_app_id {
            Some(app_id) => app_id,
            None => {
                let state = ledger.application_global_state(config.registry_app_id)?;
                match global_state_uint(&state, POOL_TEMPLATE_APP_ID_GLOBAL_KEY) {
                    Some(app_id) => {
                        info!("pool template app id from registry: {}", app_id);
                        app_id
                    }
                    None => {
                        warn!(
                            "registry app id:{} has no pool template in global state",
                            config.registry_app_id
                        );
                        0
                    }
                }
            }
        };

        Ok(Reti {
            config,
            ledger,
            signer,
            pool_template_app_id,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    pub fn registry_app_id(&self) -> u64 {
        self.config.registry_app_id
    }

    pub fn pool_template_app_id(&self) -> u64 {
        self.pool_template_app_id
    }

    /// Current validator count, kept in the registry's global state.
    pub fn get_num_validators(&self) -> RetiResult<u64> {
        let state = self
            .ledger
            .application_global_state(self.config.registry_app_id)?;
        Ok(global_state_uint(&state, NUM_VALIDATORS_GLOBAL_KEY).unwrap_or_default())
    }

    pub(crate) fn suggested_params(&self) -> RetiResult<SuggestedParams> {
        Ok(self.ledger.suggested_params()?)
    }

    pub(crate) fn signer_for(&self, account: Address) -> StepSigner {
        StepSigner::for_account(Arc::clone(&self.signer), account)
    }

    /// Sender for simulated reads that have no natural sender.
    pub(crate) fn simulation_sender(&self) -> RetiResult<Address> {
        self.signer
            .accounts()
            .first()
            .copied()
            .ok_or(RetiError::NoSimulationAccount)
    }

    /// Simulates a single registry call and returns its decoded return value.
    pub(crate) fn simulate_registry_call(
        &self,
        method: &str,
        args: Vec<AbiValue>,
        resources: ResourcePlan,
        sender: Address,
        request: SimulateRequest,
    ) -> RetiResult<AbiValue> {
        let method = VALIDATOR_REGISTRY.method(method)?;
        let call = args.into_iter().fold(
            MethodCall::new(
                self.config.registry_app_id,
                method,
                sender,
                StepSigner::Empty,
            ),
            |call, arg| call.arg(MethodArg::Value(arg)),
        );

        let mut builder = TransactionGroupBuilder::new(self.suggested_params()?);
        builder.add_method_call(call.resources(resources))?;
        let outcome = builder.build()?.simulate(&self.ledger, &request)?;
        debug!(
            "simulated {} using {} opcode budget",
            method.name, outcome.app_budget_consumed
        );
        outcome.value(&method.name).cloned()
    }

    pub(crate) fn commit(&self, builder: TransactionGroupBuilder) -> RetiResult<GroupOutcome> {
        builder
            .build()?
            .execute(&self.ledger, self.config.wait_rounds)
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::{
            ledger::{ExecuteResponse, SimulateResponse, TealKeyValue},
            signer::SignedTransaction,
        },
        anyhow::{bail, Result},
    };

    struct OfflineLedger;

    impl LedgerClient for OfflineLedger {
        fn suggested_params(&self) -> Result<SuggestedParams> {
            bail!("offline")
        }

        fn simulate(
            &self,
            _group: &[SignedTransaction],
            _request: &SimulateRequest,
        ) -> Result<SimulateResponse> {
            bail!("offline")
        }

        fn execute(
            &self,
            _group: &[SignedTransaction],
            _wait_rounds: u64,
        ) -> Result<ExecuteResponse> {
            bail!("offline")
        }

        fn application_box(&self, _app_id: u64, _name: &[u8]) -> Result<Option<Vec<u8>>> {
            Ok(None)
        }

        fn application_global_state(&self, _app_id: u64) -> Result<Vec<TealKeyValue>> {
            Ok(vec![])
        }
    }

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn client_is_shareable_across_threads() {
        assert_send_sync::<Reti<OfflineLedger>>();
        assert_send_sync::<StepSigner>();
        assert_send_sync::<Arc<dyn Signer>>();
    }
}
