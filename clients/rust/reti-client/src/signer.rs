use core::fmt;
use std::sync::Arc;

use retitypecrate::types::Address;
use serde::{Deserialize, Serialize};

use crate::{
    errors::{GroupError, RetiResult},
    ledger::Transaction,
};

/// Produces authorizations for the accounts it controls.
pub trait Signer: Send + Sync {
    fn accounts(&self) -> Vec<Address>;

    /// Signs `group[index]` on behalf of `account`. The whole group is passed
    /// so the signer can bind the signature to the group.
    fn sign(
        &self,
        account: &Address,
        group: &[Transaction],
        index: usize,
    ) -> anyhow::Result<SignedTransaction>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedTransaction {
    pub txn: Transaction,
    pub signature: Option<Vec<u8>>,
    /// Set when the signing key differs from the sender.
    pub auth_address: Option<Address>,
}

impl SignedTransaction {
    pub fn unsigned(txn: Transaction) -> Self {
        SignedTransaction {
            txn,
            signature: None,
            auth_address: None,
        }
    }

    pub fn is_signed(&self) -> bool {
        self.signature.is_some()
    }
}

/// Signer attached to one step of a group.
#[derive(Clone)]
pub enum StepSigner {
    Account {
        signer: Arc<dyn Signer>,
        account: Address,
    },
    /// Simulation only; a group holding an `Empty` step can never be committed.
    Empty,
}

impl StepSigner {
    pub fn for_account(signer: Arc<dyn Signer>, account: Address) -> Self {
        StepSigner::Account { signer, account }
    }

    pub fn is_authenticating(&self) -> bool {
        matches!(self, StepSigner::Account { .. })
    }

    pub fn sign(&self, group: &[Transaction], index: usize) -> RetiResult<SignedTransaction> {
        match self {
            StepSigner::Account { signer, account } => Ok(signer.sign(account, group, index)?),
            StepSigner::Empty => Err(GroupError::UnauthenticatedCommit(index).into()),
        }
    }
}

impl fmt::Debug for StepSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepSigner::Account { account, .. } => write!(f, "StepSigner::Account({account})"),
            StepSigner::Empty => write!(f, "StepSigner::Empty"),
        }
    }
}
