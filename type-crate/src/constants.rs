use fixed::types::I80F48;
use fixed_macro::types::I80F48;

// These must match the deployed registry contract.
pub const MAX_NODES: usize = 12;
pub const MAX_POOLS_PER_NODE: usize = 4;

pub const VALIDATOR_LIST_BOX_PREFIX: &[u8] = b"v";
pub const STAKER_POOL_SET_BOX_PREFIX: &[u8] = b"sps";
pub const STAKER_LEDGER_BOX_NAME: &[u8] = b"stakers";

/// Registry global state key holding the number of registered validators.
pub const NUM_VALIDATORS_GLOBAL_KEY: &[u8] = b"numV";
/// Registry global state key holding the staking pool template application ID.
pub const POOL_TEMPLATE_APP_ID_GLOBAL_KEY: &[u8] = b"poolTemplateAppID";

/// Network-wide minimum transaction fee, in microAlgo.
pub const MIN_TXN_FEE: u64 = 1_000;
/// Opcode budget granted per application call; each inner or padding call adds this much.
pub const OPCODE_BUDGET_UNIT: u64 = 700;
/// Fee multiplier used as the ceiling while discovering the real opcode cost of a call.
pub const DISCOVERY_FEE_MULTIPLIER: u64 = 240;
/// Minimum-fee units covering the payment and `gas()` steps surrounding a stake call.
pub const SUPPORTING_CALLS_FEE_UNITS: u64 = 2;

/// Maximum foreign references (apps, assets, accounts, boxes) one application call may declare.
pub const MAX_TXN_REFERENCES: usize = 8;
pub const MAX_GROUP_SIZE: usize = 16;

/// Number of rounds to wait for a committed group to be confirmed.
pub const DEFAULT_WAIT_ROUNDS: u64 = 4;

/// Prefix of the log line carrying an ARC-4 method return value.
pub const ABI_RETURN_PREFIX: [u8; 4] = [0x15, 0x1f, 0x7c, 0x75];

pub const MICROALGO_PER_ALGO: u64 = 1_000_000;

/// Commission is stored with four implied decimals.
pub const COMMISSION_SCALE: I80F48 = I80F48!(10_000);
