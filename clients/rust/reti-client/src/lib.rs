//! Client-side composer for the Reti validator registry and its staking pools.
//!
//! Builds atomic transaction groups, declares the box and app references the
//! contracts touch, simulates reads and fee discovery, and commits groups
//! through a pluggable [`ledger::LedgerClient`] and [`signer::Signer`].

pub mod config;
pub mod errors;
pub mod fees;
pub mod group;
pub mod ledger;
pub mod methods;
pub mod processor;
pub mod resources;
pub mod signer;

pub use errors::{GroupError, ResourceError, RetiError, RetiResult};
pub use processor::{PoolStorageState, Reti};
