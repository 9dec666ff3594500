//! In-memory ledger that answers registry and staking pool calls from scripted
//! return values and records every group it sees.

use std::{cell::RefCell, collections::HashMap, rc::Rc};

use anyhow::{anyhow, bail, Result};
use log::debug;
use reticlient::{
    ledger::{
        ExecuteResponse, LedgerClient, SimulateRequest, SimulateResponse, SimulateTxnGroupResult,
        SuggestedParams, TealKeyValue, TealValue, TransactionBody, TxnResult,
    },
    methods::{STAKING_POOL, VALIDATOR_REGISTRY},
    signer::SignedTransaction,
};
use retitypecrate::{
    abi::{AbiValue, Method},
    box_keys::staker_ledger_box_name,
    constants::{NUM_VALIDATORS_GLOBAL_KEY, POOL_TEMPLATE_APP_ID_GLOBAL_KEY},
};

#[derive(Debug, Default)]
pub struct MockLedgerState {
    pub params: SuggestedParams,
    /// Return value per method name, used by both simulate and execute.
    pub returns: HashMap<String, AbiValue>,
    /// Simulation failure message per method name.
    pub failures: HashMap<String, String>,
    /// Transport error per method name; simulate returns `Err` instead of a response.
    pub transport_failures: HashMap<String, String>,
    pub app_budget_added: u64,
    pub app_budget_consumed: u64,
    pub boxes: HashMap<(u64, Vec<u8>), Vec<u8>>,
    pub global_state: HashMap<u64, Vec<TealKeyValue>>,
    /// When set, every execute fails with this message.
    pub execute_failure: Option<String>,
    pub next_round: u64,

    pub simulated: Vec<Vec<SignedTransaction>>,
    pub simulate_requests: Vec<SimulateRequest>,
    pub executed: Vec<Vec<SignedTransaction>>,
    pub box_reads: Vec<(u64, Vec<u8>)>,
    pub global_state_reads: usize,
}

/// Cloning shares the same state, so a test can keep a handle after moving
/// the ledger into a client.
#[derive(Debug, Clone, Default)]
pub struct MockLedger {
    state: Rc<RefCell<MockLedgerState>>,
}

impl MockLedger {
    pub fn new(params: SuggestedParams) -> Self {
        let ledger = MockLedger::default();
        {
            let mut state = ledger.state_mut();
            state.next_round = params.first_valid + 1;
            state.params = params;
        }
        ledger
    }

    pub fn state(&self) -> std::cell::Ref<'_, MockLedgerState> {
        self.state.borrow()
    }

    pub fn state_mut(&self) -> std::cell::RefMut<'_, MockLedgerState> {
        self.state.borrow_mut()
    }

    pub fn set_return(&self, method: &str, value: AbiValue) {
        self.state_mut().returns.insert(method.to_string(), value);
    }

    pub fn fail_simulation(&self, method: &str, message: &str) {
        self.state_mut()
            .failures
            .insert(method.to_string(), message.to_string());
    }

    pub fn fail_simulate_transport(&self, method: &str, message: &str) {
        self.state_mut()
            .transport_failures
            .insert(method.to_string(), message.to_string());
    }

    pub fn set_app_budget_added(&self, added: u64) {
        self.state_mut().app_budget_added = added;
    }

    pub fn set_box(&self, app_id: u64, name: &[u8], contents: Vec<u8>) {
        self.state_mut().boxes.insert((app_id, name.to_vec()), contents);
    }

    pub fn set_global_uint(&self, app_id: u64, key: &[u8], value: u64) {
        let mut state = self.state_mut();
        let entries = state.global_state.entry(app_id).or_default();
        entries.retain(|kv| kv.key != key);
        entries.push(TealKeyValue {
            key: key.to_vec(),
            value: TealValue::Uint(value),
        });
    }

    pub fn set_num_validators(&self, registry_app_id: u64, num_validators: u64) {
        self.set_global_uint(registry_app_id, NUM_VALIDATORS_GLOBAL_KEY, num_validators);
    }

    pub fn set_pool_template(&self, registry_app_id: u64, template_app_id: u64) {
        self.set_global_uint(
            registry_app_id,
            POOL_TEMPLATE_APP_ID_GLOBAL_KEY,
            template_app_id,
        );
    }

    pub fn fail_execute(&self, message: &str) {
        self.state_mut().execute_failure = Some(message.to_string());
    }

    pub fn simulated_groups(&self) -> Vec<Vec<SignedTransaction>> {
        self.state().simulated.clone()
    }

    pub fn executed_groups(&self) -> Vec<Vec<SignedTransaction>> {
        self.state().executed.clone()
    }

    /// Names of the methods called by a group, in group order.
    pub fn method_names(group: &[SignedTransaction]) -> Vec<String> {
        group
            .iter()
            .filter_map(|stxn| method_for(stxn).map(|method| method.name.clone()))
            .collect()
    }

    /// Names of every method simulated so far, flattened across groups.
    pub fn simulated_methods(&self) -> Vec<String> {
        self.state()
            .simulated
            .iter()
            .flat_map(|group| Self::method_names(group))
            .collect()
    }

    fn txn_results(&self, group: &[SignedTransaction]) -> Result<Vec<TxnResult>> {
        let state = self.state();
        group
            .iter()
            .map(|stxn| {
                let logs = match method_for(stxn) {
                    Some(method) if method.returns.is_some() => {
                        match state.returns.get(&method.name) {
                            Some(value) => vec![method.encode_return(value)?],
                            None => vec![],
                        }
                    }
                    _ => vec![],
                };
                Ok(TxnResult { logs })
            })
            .collect()
    }

    /// Storage effects of a committed group that later reads depend on.
    fn apply(&self, group: &[SignedTransaction]) {
        for stxn in group {
            if let (Some(method), Some(app_id)) = (method_for(stxn), stxn.txn.app_id()) {
                if method.name == "initStorage" {
                    self.set_box(app_id, &staker_ledger_box_name(), vec![0; 64]);
                }
            }
        }
    }
}

/// Resolves the ARC-4 method an application call invokes from its selector.
pub fn method_for(stxn: &SignedTransaction) -> Option<&'static Method> {
    let selector = stxn.txn.selector()?;
    VALIDATOR_REGISTRY
        .by_selector(selector)
        .or_else(|| STAKING_POOL.by_selector(selector))
}

impl LedgerClient for MockLedger {
    fn suggested_params(&self) -> Result<SuggestedParams> {
        Ok(self.state().params.clone())
    }

    fn simulate(
        &self,
        group: &[SignedTransaction],
        request: &SimulateRequest,
    ) -> Result<SimulateResponse> {
        {
            let mut state = self.state_mut();
            state.simulated.push(group.to_vec());
            state.simulate_requests.push(request.clone());
        }

        let transport_failure = group.iter().find_map(|stxn| {
            let method = method_for(stxn)?;
            self.state().transport_failures.get(&method.name).cloned()
        });
        if let Some(message) = transport_failure {
            bail!(message);
        }

        let failure = group.iter().enumerate().find_map(|(index, stxn)| {
            let method = method_for(stxn)?;
            self.state()
                .failures
                .get(&method.name)
                .map(|message| (index as u64, message.clone()))
        });

        let txn_results = self.txn_results(group)?;
        let state = self.state();
        let (failure_message, failed_at) = match failure {
            Some((index, message)) => (message, vec![index]),
            None => (String::new(), vec![]),
        };
        debug!(
            "simulated {:?}, failure: {:?}",
            MockLedger::method_names(group),
            failure_message
        );

        Ok(SimulateResponse {
            txn_groups: vec![SimulateTxnGroupResult {
                failure_message,
                failed_at,
                app_budget_added: state.app_budget_added,
                app_budget_consumed: state.app_budget_consumed,
                txn_results,
            }],
        })
    }

    fn execute(&self, group: &[SignedTransaction], _wait_rounds: u64) -> Result<ExecuteResponse> {
        if let Some(message) = self.state().execute_failure.clone() {
            bail!(message);
        }
        if let Some(index) = group.iter().position(|stxn| !stxn.is_signed()) {
            return Err(anyhow!("transaction {} in group is not signed", index));
        }

        let txn_results = self.txn_results(group)?;
        self.apply(group);

        let mut state = self.state_mut();
        state.executed.push(group.to_vec());
        let confirmed_round = state.next_round;
        state.next_round += 1;

        Ok(ExecuteResponse {
            confirmed_round,
            tx_ids: (0..group.len())
                .map(|index| format!("TX-{confirmed_round}-{index}"))
                .collect(),
            txn_results,
        })
    }

    fn application_box(&self, app_id: u64, name: &[u8]) -> Result<Option<Vec<u8>>> {
        let mut state = self.state_mut();
        state.box_reads.push((app_id, name.to_vec()));
        Ok(state.boxes.get(&(app_id, name.to_vec())).cloned())
    }

    fn application_global_state(&self, app_id: u64) -> Result<Vec<TealKeyValue>> {
        let mut state = self.state_mut();
        state.global_state_reads += 1;
        Ok(state.global_state.get(&app_id).cloned().unwrap_or_default())
    }
}

/// Amount of a payment transaction.
pub fn payment_amount(stxn: &SignedTransaction) -> Option<u64> {
    match stxn.txn.body {
        TransactionBody::Payment { amount, .. } => Some(amount),
        TransactionBody::ApplicationCall { .. } => None,
    }
}
