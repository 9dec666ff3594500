use std::sync::Arc;

use lazy_static::lazy_static;
use reticlient::{config::Config, ledger::SuggestedParams, signer::Signer, Reti};
use retitypecrate::{
    abi::AbiValue,
    types::{Address, MbrAmounts, NodePoolAssignmentConfig, PoolInfo, ValidatorConfig, ValidatorInfo},
};

use crate::{ledger::MockLedger, signer::TestSigner, utils::mbr_amounts_value};

pub const REGISTRY_APP_ID: u64 = 1_000;
pub const POOL_TEMPLATE_APP_ID: u64 = 999;
pub const VALIDATOR_ID: u64 = 1;
pub const MIN_FEE: u64 = 1_000;

pub const OWNER: Address = Address::new([0x11; 32]);
pub const MANAGER: Address = Address::new([0x22; 32]);
pub const STAKER: Address = Address::new([0x33; 32]);
pub const COMMISSION: Address = Address::new([0x44; 32]);

lazy_static! {
    pub static ref DEFAULT_MBRS: MbrAmounts = MbrAmounts {
        add_validator_mbr: 2_000_000,
        add_pool_mbr: 1_500_000,
        pool_init_mbr: 3_400_000,
        add_staker_mbr: 100_000,
    };
    pub static ref DEFAULT_VALIDATOR_CONFIG: ValidatorConfig = ValidatorConfig {
        id: VALIDATOR_ID,
        owner: OWNER,
        manager: MANAGER,
        payout_every_x_mins: 60,
        percent_to_validator: 50_000,
        validator_commission_address: COMMISSION,
        min_entry_stake: 1_000_000,
        max_algo_per_pool: 70_000_000_000_000,
        pools_per_node: 3,
        ..ValidatorConfig::default()
    };
}

pub fn test_params() -> SuggestedParams {
    SuggestedParams {
        fee: 0,
        min_fee: MIN_FEE,
        first_valid: 1_000,
        last_valid: 2_000,
        genesis_id: "testnet-v1.0".to_string(),
        genesis_hash: [9; 32],
    }
}

pub struct TestFixture {
    pub ledger: MockLedger,
    pub signer: Arc<TestSigner>,
    pub reti: Reti<MockLedger>,
}

impl TestFixture {
    /// Registry with one validator and a pool template, signing for the
    /// owner, manager and staker.
    pub fn new() -> Self {
        Self::with_accounts(&[OWNER, MANAGER, STAKER])
    }

    pub fn with_accounts(accounts: &[Address]) -> Self {
        let ledger = MockLedger::new(test_params());
        ledger.set_num_validators(REGISTRY_APP_ID, 1);
        ledger.set_pool_template(REGISTRY_APP_ID, POOL_TEMPLATE_APP_ID);
        ledger.set_return("getMbrAmounts", mbr_amounts_value(&DEFAULT_MBRS));

        let signer = TestSigner::new(accounts);
        let reti = Reti::new(
            Config::new(REGISTRY_APP_ID),
            ledger.clone(),
            Arc::clone(&signer) as Arc<dyn Signer>,
        )
        .unwrap();

        TestFixture {
            ledger,
            signer,
            reti,
        }
    }

    pub fn set_return(&self, method: &str, value: AbiValue) -> &Self {
        self.ledger.set_return(method, value);
        self
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of the default validator with `pools` laid out per node.
pub fn validator_info(nodes: &[&[u64]], node_num: u64) -> ValidatorInfo {
    let mut assignments = NodePoolAssignmentConfig::default();
    let mut pools = vec![];
    for (index, node_pools) in nodes.iter().enumerate() {
        for &pool_app_id in node_pools.iter() {
            assignments
                .add_pool_to_node(index as u64 + 1, pool_app_id)
                .unwrap();
            pools.push(PoolInfo {
                pool_app_id,
                ..PoolInfo::default()
            });
        }
    }
    ValidatorInfo::new(DEFAULT_VALIDATOR_CONFIG.clone(), pools, assignments, node_num)
}
