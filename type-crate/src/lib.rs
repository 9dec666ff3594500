//! Record types, box naming and the ARC-4 codec shared by the Reti client
//! and its test fixtures.

pub mod abi;
pub mod box_keys;
pub mod constants;
pub mod decode;
pub mod types;
pub mod utils;
