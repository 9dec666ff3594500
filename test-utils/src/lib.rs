pub mod ledger;
pub mod signer;
pub mod test;
pub mod utils;

pub mod prelude {
    pub use crate::{ledger::MockLedger, signer::TestSigner, test::*, utils::*};
}
