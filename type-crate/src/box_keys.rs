//! Box names used by the registry and staking pool contracts.
//!
//! The ledger treats these as literal storage identifiers, so the layout has to
//! match the contracts byte for byte.

use crate::{
    constants::{STAKER_LEDGER_BOX_NAME, STAKER_POOL_SET_BOX_PREFIX, VALIDATOR_LIST_BOX_PREFIX},
    types::Address,
};

/// Registry box holding a validator's config, state, pools and node assignments.
pub fn validator_list_box_name(validator_id: u64) -> Vec<u8> {
    let mut name = Vec::with_capacity(VALIDATOR_LIST_BOX_PREFIX.len() + 8);
    name.extend_from_slice(VALIDATOR_LIST_BOX_PREFIX);
    name.extend_from_slice(&validator_id.to_be_bytes());
    name
}

/// Registry box holding the set of pools a staker is in.
pub fn staker_pool_set_box_name(staker: &Address) -> Vec<u8> {
    let mut name = Vec::with_capacity(STAKER_POOL_SET_BOX_PREFIX.len() + 32);
    name.extend_from_slice(STAKER_POOL_SET_BOX_PREFIX);
    name.extend_from_slice(staker.as_ref());
    name
}

/// Per-pool staker ledger box.
pub fn staker_ledger_box_name() -> Vec<u8> {
    STAKER_LEDGER_BOX_NAME.to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn validator_list_name_is_prefix_and_big_endian_id() {
        assert_eq!(
            validator_list_box_name(1),
            vec![b'v', 0, 0, 0, 0, 0, 0, 0, 1]
        );
        assert_eq!(
            validator_list_box_name(0x0102_0304_0506_0708),
            vec![b'v', 1, 2, 3, 4, 5, 6, 7, 8]
        );
    }

    #[test]
    fn staker_pool_set_name_embeds_public_key() {
        let staker = Address::new([0xab; 32]);
        let name = staker_pool_set_box_name(&staker);
        assert_eq!(&name[..3], b"sps");
        assert_eq!(&name[3..], &[0xab; 32]);
        assert_eq!(name.len(), 35);
    }

    #[test]
    fn staker_ledger_name_is_fixed() {
        assert_eq!(staker_ledger_box_name(), b"stakers".to_vec());
    }
}
