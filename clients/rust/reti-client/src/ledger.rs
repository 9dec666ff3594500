//! Wire-level view of the ledger as consumed by the client. The transport
//! itself lives behind [`LedgerClient`].

use anyhow::Result;
use retitypecrate::types::Address;
use serde::{Deserialize, Serialize};

use crate::signer::SignedTransaction;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SuggestedParams {
    pub fee: u64,
    pub min_fee: u64,
    pub first_valid: u64,
    pub last_valid: u64,
    pub genesis_id: String,
    pub genesis_hash: [u8; 32],
}

/// A box an application call may touch. `app_id == 0` means the called
/// application; an empty name is an unnamed slot reserving I/O budget.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoxReference {
    pub app_id: u64,
    pub name: Vec<u8>,
}

impl BoxReference {
    pub fn own(name: Vec<u8>) -> Self {
        BoxReference { app_id: 0, name }
    }

    pub fn of_app(app_id: u64, name: Vec<u8>) -> Self {
        BoxReference { app_id, name }
    }

    pub fn blank() -> Self {
        BoxReference::default()
    }

    pub fn is_blank(&self) -> bool {
        self.name.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionBody {
    Payment {
        receiver: Address,
        amount: u64,
    },
    /// NoOp application call.
    ApplicationCall {
        app_id: u64,
        app_args: Vec<Vec<u8>>,
        foreign_apps: Vec<u64>,
        boxes: Vec<BoxReference>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub sender: Address,
    pub fee: u64,
    pub first_valid: u64,
    pub last_valid: u64,
    pub genesis_id: String,
    pub genesis_hash: [u8; 32],
    pub body: TransactionBody,
}

impl Transaction {
    pub fn app_id(&self) -> Option<u64> {
        match &self.body {
            TransactionBody::ApplicationCall { app_id, .. } => Some(*app_id),
            TransactionBody::Payment { .. } => None,
        }
    }

    /// Leading app arg of an application call, the ARC-4 selector.
    pub fn selector(&self) -> Option<&[u8]> {
        match &self.body {
            TransactionBody::ApplicationCall { app_args, .. } => {
                app_args.first().map(Vec::as_slice)
            }
            TransactionBody::Payment { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SimulateRequest {
    pub allow_empty_signatures: bool,
    pub allow_unnamed_resources: bool,
    #[serde(default)]
    pub allow_more_logging: bool,
}

impl SimulateRequest {
    /// Unsigned simulation with unnamed resources, as used by queries and fee discovery.
    pub fn unsigned() -> Self {
        SimulateRequest {
            allow_empty_signatures: true,
            allow_unnamed_resources: true,
            ..Default::default()
        }
    }

    pub fn with_more_logging(mut self) -> Self {
        self.allow_more_logging = true;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct TxnResult {
    #[serde(default)]
    pub logs: Vec<Vec<u8>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SimulateTxnGroupResult {
    #[serde(default)]
    pub failure_message: String,
    #[serde(default)]
    pub failed_at: Vec<u64>,
    #[serde(default)]
    pub app_budget_added: u64,
    #[serde(default)]
    pub app_budget_consumed: u64,
    pub txn_results: Vec<TxnResult>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SimulateResponse {
    pub txn_groups: Vec<SimulateTxnGroupResult>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ExecuteResponse {
    pub confirmed_round: u64,
    pub tx_ids: Vec<String>,
    pub txn_results: Vec<TxnResult>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TealValue {
    Bytes(Vec<u8>),
    Uint(u64),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TealKeyValue {
    pub key: Vec<u8>,
    pub value: TealValue,
}

/// Integer stored under `key` in an application's global state.
pub fn global_state_uint(state: &[TealKeyValue], key: &[u8]) -> Option<u64> {
    state.iter().find_map(|kv| match &kv.value {
        TealValue::Uint(value) if kv.key == key => Some(*value),
        _ => None,
    })
}

/// Network transport for the ledger. Errors propagate unchanged.
pub trait LedgerClient {
    fn suggested_params(&self) -> Result<SuggestedParams>;

    /// Dry-runs a group against current state; nothing is committed.
    fn simulate(
        &self,
        group: &[SignedTransaction],
        request: &SimulateRequest,
    ) -> Result<SimulateResponse>;

    /// Submits a signed group and waits up to `wait_rounds` for confirmation.
    fn execute(&self, group: &[SignedTransaction], wait_rounds: u64) -> Result<ExecuteResponse>;

    /// Contents of box `name` of `app_id`, `None` if the box does not exist.
    fn application_box(&self, app_id: u64, name: &[u8]) -> Result<Option<Vec<u8>>>;

    fn application_global_state(&self, app_id: u64) -> Result<Vec<TealKeyValue>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn simulate_request_uses_kebab_case() {
        let json = serde_json::to_value(SimulateRequest::unsigned()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "allow-empty-signatures": true,
                "allow-unnamed-resources": true,
                "allow-more-logging": false,
            })
        );
    }

    #[test]
    fn global_state_lookup_skips_byte_values() {
        let state = vec![
            TealKeyValue {
                key: b"numV".to_vec(),
                value: TealValue::Bytes(vec![1]),
            },
            TealKeyValue {
                key: b"numV".to_vec(),
                value: TealValue::Uint(4),
            },
        ];
        assert_eq!(global_state_uint(&state, b"numV"), Some(4));
        assert_eq!(global_state_uint(&state, b"poolTemplateAppID"), None);
    }
}
