use std::sync::{Arc, Mutex};

use anyhow::{bail, Result};
use reticlient::{
    ledger::Transaction,
    signer::{SignedTransaction, Signer},
};
use retitypecrate::types::Address;

/// Signs for a fixed set of accounts with a fake signature and records
/// every request.
#[derive(Debug, Default)]
pub struct TestSigner {
    accounts: Vec<Address>,
    signed: Mutex<Vec<(Address, usize)>>,
}

impl TestSigner {
    pub fn new(accounts: &[Address]) -> Arc<Self> {
        Arc::new(TestSigner {
            accounts: accounts.to_vec(),
            signed: Mutex::new(vec![]),
        })
    }

    /// `(account, index in group)` for every signature produced so far.
    pub fn signed(&self) -> Vec<(Address, usize)> {
        self.signed.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

impl Signer for TestSigner {
    fn accounts(&self) -> Vec<Address> {
        self.accounts.clone()
    }

    fn sign(
        &self,
        account: &Address,
        group: &[Transaction],
        index: usize,
    ) -> Result<SignedTransaction> {
        if !self.accounts.contains(account) {
            bail!("no key for account {}", account);
        }
        let Some(txn) = group.get(index) else {
            bail!("group has no transaction at index {}", index);
        };
        if let Ok(mut signed) = self.signed.lock() {
            signed.push((*account, index));
        }

        let mut signature = account.to_bytes().to_vec();
        signature.extend_from_slice(&(index as u64).to_be_bytes());
        Ok(SignedTransaction {
            txn: txn.clone(),
            signature: Some(signature),
            auth_address: (txn.sender != *account).then_some(*account),
        })
    }
}
