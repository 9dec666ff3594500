//! Atomic groups of payments and ARC-4 method calls.

use log::debug;
use retitypecrate::{
    abi::{AbiValue, ArgType, Method, TxnArgKind},
    constants::MAX_GROUP_SIZE,
    decode::{decode, FromAbi},
    types::Address,
};

use crate::{
    errors::{GroupError, RetiError, RetiResult},
    ledger::{
        LedgerClient, SimulateRequest, SuggestedParams, Transaction, TransactionBody, TxnResult,
    },
    resources::ResourcePlan,
    signer::{SignedTransaction, StepSigner},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fee {
    /// The network's current minimum fee.
    Minimum,
    /// Exact fee in microAlgos, covering inner transactions.
    Flat(u64),
}

impl Fee {
    fn resolve(&self, params: &SuggestedParams) -> u64 {
        match self {
            Fee::Minimum => params.min_fee,
            Fee::Flat(fee) => *fee,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PaymentStep {
    pub sender: Address,
    pub receiver: Address,
    pub amount: u64,
    pub signer: StepSigner,
    pub fee: Fee,
}

#[derive(Debug, Clone)]
pub enum MethodArg {
    Value(AbiValue),
    /// Payment embedded as a `pay` argument; it lands right before the call.
    Payment(PaymentStep),
}

impl From<AbiValue> for MethodArg {
    fn from(value: AbiValue) -> Self {
        MethodArg::Value(value)
    }
}

#[derive(Debug, Clone)]
pub struct MethodCall {
    pub app_id: u64,
    pub method: Method,
    pub args: Vec<MethodArg>,
    pub resources: ResourcePlan,
    pub sender: Address,
    pub signer: StepSigner,
    pub fee: Fee,
}

impl MethodCall {
    pub fn new(app_id: u64, method: &Method, sender: Address, signer: StepSigner) -> Self {
        MethodCall {
            app_id,
            method: method.clone(),
            args: vec![],
            resources: ResourcePlan::none(),
            sender,
            signer,
            fee: Fee::Minimum,
        }
    }

    pub fn arg(mut self, arg: impl Into<MethodArg>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn resources(mut self, resources: ResourcePlan) -> Self {
        self.resources = resources;
        self
    }

    pub fn fee(mut self, fee: Fee) -> Self {
        self.fee = fee;
        self
    }
}

#[derive(Debug, Clone)]
struct MethodCallRef {
    txn_index: usize,
    method: Method,
}

/// Accumulates group steps. Validation of arguments and references happens
/// as each call is added; size is checked in [`TransactionGroupBuilder::build`].
#[derive(Debug)]
pub struct TransactionGroupBuilder {
    params: SuggestedParams,
    txns: Vec<Transaction>,
    signers: Vec<StepSigner>,
    method_calls: Vec<MethodCallRef>,
}

impl TransactionGroupBuilder {
    pub fn new(params: SuggestedParams) -> Self {
        TransactionGroupBuilder {
            params,
            txns: vec![],
            signers: vec![],
            method_calls: vec![],
        }
    }

    pub fn add_payment(&mut self, payment: PaymentStep) -> &mut Self {
        let txn = self.transaction(
            payment.sender,
            payment.fee,
            TransactionBody::Payment {
                receiver: payment.receiver,
                amount: payment.amount,
            },
        );
        self.txns.push(txn);
        self.signers.push(payment.signer);
        self
    }

    pub fn add_method_call(&mut self, call: MethodCall) -> RetiResult<&mut Self> {
        call.resources.validate(call.app_id)?;

        if call.args.len() != call.method.args.len() {
            return Err(GroupError::ArgumentCount {
                method: call.method.name.clone(),
                expected: call.method.args.len(),
                actual: call.args.len(),
            }
            .into());
        }

        let mut app_args = vec![call.method.selector().to_vec()];
        let mut embedded = vec![];
        for (index, (arg_type, arg)) in call.method.args.iter().zip(call.args).enumerate() {
            match (arg_type, arg) {
                (ArgType::Value(abi_type), MethodArg::Value(value)) => {
                    app_args.push(abi_type.encode(&value)?);
                }
                (
                    ArgType::Transaction(TxnArgKind::Payment | TxnArgKind::Any),
                    MethodArg::Payment(payment),
                ) => embedded.push(payment),
                (expected, _) => {
                    return Err(GroupError::ArgumentKind {
                        method: call.method.name.clone(),
                        index,
                        expected: expected.to_string(),
                    }
                    .into())
                }
            }
        }

        for payment in embedded {
            self.add_payment(payment);
        }

        let txn = self.transaction(
            call.sender,
            call.fee,
            TransactionBody::ApplicationCall {
                app_id: call.app_id,
                app_args,
                foreign_apps: call.resources.foreign_apps,
                boxes: call.resources.boxes,
            },
        );
        self.method_calls.push(MethodCallRef {
            txn_index: self.txns.len(),
            method: call.method,
        });
        self.txns.push(txn);
        self.signers.push(call.signer);
        Ok(self)
    }

    pub fn build(self) -> RetiResult<ComposedGroup> {
        if self.txns.is_empty() {
            return Err(GroupError::Empty.into());
        }
        if self.txns.len() > MAX_GROUP_SIZE {
            return Err(GroupError::TooLarge(self.txns.len()).into());
        }
        Ok(ComposedGroup {
            txns: self.txns,
            signers: self.signers,
            method_calls: self.method_calls,
        })
    }

    fn transaction(&self, sender: Address, fee: Fee, body: TransactionBody) -> Transaction {
        Transaction {
            sender,
            fee: fee.resolve(&self.params),
            first_valid: self.params.first_valid,
            last_valid: self.params.last_valid,
            genesis_id: self.params.genesis_id.clone(),
            genesis_hash: self.params.genesis_hash,
            body,
        }
    }
}

/// A built group, ready to simulate or commit.
#[derive(Debug, Clone)]
pub struct ComposedGroup {
    txns: Vec<Transaction>,
    signers: Vec<StepSigner>,
    method_calls: Vec<MethodCallRef>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodResult {
    pub method: String,
    pub txn_index: usize,
    /// `None` for void methods.
    pub value: Option<AbiValue>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupOutcome {
    /// Set for committed groups.
    pub confirmed_round: Option<u64>,
    pub app_budget_added: u64,
    pub app_budget_consumed: u64,
    pub method_results: Vec<MethodResult>,
}

impl GroupOutcome {
    /// Return value of the first call to `method`.
    pub fn value(&self, method: &str) -> RetiResult<&AbiValue> {
        self.method_results
            .iter()
            .find(|result| result.method == method)
            .and_then(|result| result.value.as_ref())
            .ok_or_else(|| GroupError::MissingResult(method.to_string()).into())
    }

    pub fn decoded<T: FromAbi>(&self, method: &str) -> RetiResult<T> {
        Ok(decode(self.value(method)?)?)
    }
}

impl ComposedGroup {
    pub fn transactions(&self) -> &[Transaction] {
        &self.txns
    }

    pub fn len(&self) -> usize {
        self.txns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.txns.is_empty()
    }

    /// Simulates the group without signatures. A failure reported by the
    /// ledger comes back as [`RetiError::SimulationFailed`] with its message untouched.
    pub fn simulate<L: LedgerClient + ?Sized>(
        &self,
        ledger: &L,
        request: &SimulateRequest,
    ) -> RetiResult<GroupOutcome> {
        let unsigned: Vec<_> = self
            .txns
            .iter()
            .cloned()
            .map(SignedTransaction::unsigned)
            .collect();

        let response = ledger.simulate(&unsigned, request)?;
        let group = response
            .txn_groups
            .into_iter()
            .next()
            .ok_or(GroupError::EmptySimulation)?;
        if !group.failure_message.is_empty() {
            debug!("simulation failed at {:?}", group.failed_at);
            return Err(RetiError::SimulationFailed(group.failure_message));
        }

        Ok(GroupOutcome {
            confirmed_round: None,
            app_budget_added: group.app_budget_added,
            app_budget_consumed: group.app_budget_consumed,
            method_results: self.method_results(&group.txn_results)?,
        })
    }

    /// Signs every step and submits the group. Refuses before signing
    /// anything if any step lacks an authenticating signer.
    pub fn execute<L: LedgerClient + ?Sized>(
        &self,
        ledger: &L,
        wait_rounds: u64,
    ) -> RetiResult<GroupOutcome> {
        if let Some(index) = self.signers.iter().position(|s| !s.is_authenticating()) {
            return Err(GroupError::UnauthenticatedCommit(index).into());
        }

        let signed = self
            .signers
            .iter()
            .enumerate()
            .map(|(index, signer)| signer.sign(&self.txns, index))
            .collect::<RetiResult<Vec<_>>>()?;

        let response = ledger.execute(&signed, wait_rounds)?;
        debug!(
            "group of {} confirmed in round {}",
            signed.len(),
            response.confirmed_round
        );

        Ok(GroupOutcome {
            confirmed_round: Some(response.confirmed_round),
            app_budget_added: 0,
            app_budget_consumed: 0,
            method_results: self.method_results(&response.txn_results)?,
        })
    }

    fn method_results(&self, txn_results: &[TxnResult]) -> RetiResult<Vec<MethodResult>> {
        self.method_calls
            .iter()
            .map(|call| {
                let logs = txn_results
                    .get(call.txn_index)
                    .map(|result| result.logs.as_slice())
                    .unwrap_or_default();
                Ok(MethodResult {
                    method: call.method.name.clone(),
                    txn_index: call.txn_index,
                    value: call.method.decode_return(logs)?,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{methods::VALIDATOR_REGISTRY, resources::ResourceReferenceResolver};
    use assert_matches::assert_matches;
    use pretty_assertions::assert_eq;

    fn params() -> SuggestedParams {
        SuggestedParams {
            fee: 0,
            min_fee: 1_000,
            first_valid: 100,
            last_valid: 1_100,
            genesis_id: "testnet-v1.0".to_string(),
            genesis_hash: [7; 32],
        }
    }

    fn payment(amount: u64) -> PaymentStep {
        PaymentStep {
            sender: Address::new([1; 32]),
            receiver: Address::new([2; 32]),
            amount,
            signer: StepSigner::Empty,
            fee: Fee::Minimum,
        }
    }

    #[test]
    fn embedded_payment_precedes_call() {
        let method = VALIDATOR_REGISTRY.method("addStake").unwrap();
        let call = MethodCall::new(10, method, Address::new([1; 32]), StepSigner::Empty)
            .arg(MethodArg::Payment(payment(5_000)))
            .arg(AbiValue::Uint64(3))
            .arg(AbiValue::Uint64(0))
            .resources(ResourceReferenceResolver::add_stake(500))
            .fee(Fee::Flat(240_000));

        let mut builder = TransactionGroupBuilder::new(params());
        builder.add_method_call(call).unwrap();
        let group = builder.build().unwrap();

        let txns = group.transactions();
        assert_eq!(txns.len(), 2);
        assert_matches!(txns[0].body, TransactionBody::Payment { amount: 5_000, .. });
        assert_eq!(txns[0].fee, 1_000);
        assert_eq!(txns[1].fee, 240_000);
        assert_eq!(txns[1].selector(), Some(method.selector().as_slice()));
        assert_matches!(
            &txns[1].body,
            TransactionBody::ApplicationCall { app_args, foreign_apps, .. }
                if app_args.len() == 3 && foreign_apps == &vec![500]
        );
    }

    #[test]
    fn rejects_wrong_argument_shapes() {
        let method = VALIDATOR_REGISTRY.method("addStake").unwrap();
        let mut builder = TransactionGroupBuilder::new(params());

        let missing = MethodCall::new(10, method, Address::ZERO, StepSigner::Empty)
            .arg(AbiValue::Uint64(3));
        assert_matches!(
            builder.add_method_call(missing),
            Err(RetiError::Group(GroupError::ArgumentCount { expected: 3, actual: 1, .. }))
        );

        let swapped = MethodCall::new(10, method, Address::ZERO, StepSigner::Empty)
            .arg(AbiValue::Uint64(3))
            .arg(AbiValue::Uint64(3))
            .arg(AbiValue::Uint64(3));
        assert_matches!(
            builder.add_method_call(swapped),
            Err(RetiError::Group(GroupError::ArgumentKind { index: 0, .. }))
        );
    }

    #[test]
    fn enforces_group_size() {
        let mut builder = TransactionGroupBuilder::new(params());
        for _ in 0..=MAX_GROUP_SIZE {
            builder.add_payment(payment(1));
        }
        assert_matches!(
            builder.build(),
            Err(RetiError::Group(GroupError::TooLarge(17)))
        );
        assert_matches!(
            TransactionGroupBuilder::new(params()).build(),
            Err(RetiError::Group(GroupError::Empty))
        );
    }
}
