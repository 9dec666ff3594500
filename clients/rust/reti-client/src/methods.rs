//! ARC-4 interfaces of the validator registry and staking pool contracts.

use lazy_static::lazy_static;
use retitypecrate::abi::{AbiError, Method};

pub struct Contract {
    pub name: &'static str,
    methods: Vec<Method>,
}

impl Contract {
    fn from_signatures(name: &'static str, signatures: &[&str]) -> Self {
        let methods = signatures
            .iter()
            .map(|signature| {
                signature
                    .parse()
                    .unwrap_or_else(|err| panic!("{name} method {signature}: {err}"))
            })
            .collect();
        Contract { name, methods }
    }

    pub fn method(&self, name: &str) -> Result<&Method, AbiError> {
        self.methods
            .iter()
            .find(|method| method.name == name)
            .ok_or_else(|| AbiError::UnknownMethod(format!("{}.{}", self.name, name)))
    }

    pub fn by_selector(&self, selector: &[u8]) -> Option<&Method> {
        self.methods
            .iter()
            .find(|method| method.selector().as_slice() == selector)
    }

    pub fn methods(&self) -> &[Method] {
        &self.methods
    }
}

const VALIDATOR_CONFIG_TUPLE: &str = "(uint64,address,address,uint64,address,uint64,uint64,uint64,uint16,uint32,address,uint64,uint64,uint8,uint64,uint64)";

lazy_static! {
    pub static ref VALIDATOR_REGISTRY: Contract = Contract::from_signatures(
        "ValidatorRegistry",
        &[
            format!("addValidator(pay,string,{VALIDATOR_CONFIG_TUPLE})uint64").as_str(),
            format!("getValidatorConfig(uint64){VALIDATOR_CONFIG_TUPLE}").as_str(),
            "getValidatorState(uint64)(uint16,uint64,uint64)",
            "getPools(uint64)(uint64,uint16,uint64)[]",
            "getPoolInfo((uint64,uint64,uint64))(uint64,uint16,uint64)",
            "getStakedPoolsForAccount(address)(uint64,uint64,uint64)[]",
            "getNodePoolAssignments(uint64)((uint64[4])[12])",
            "findPoolForStaker(uint64,address,uint64)((uint64,uint64,uint64),bool,bool)",
            "changeValidatorCommissionAddress(uint64,address)void",
            "addPool(pay,uint64,uint64)(uint64,uint64,uint64)",
            "movePoolToNode(uint64,uint64,uint64)void",
            "addStake(pay,uint64,uint64)(uint64,uint64,uint64)",
            "getMbrAmounts()(uint64,uint64,uint64,uint64)",
            "doesStakerNeedToPayMBR(address)bool",
            "gas()void",
        ],
    );
    pub static ref STAKING_POOL: Contract = Contract::from_signatures(
        "StakingPool",
        &["initStorage(pay)void", "removeStake(uint64)void", "gas()void"],
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use pretty_assertions::assert_eq;

    #[test]
    fn tables_parse_and_round_trip() {
        assert_eq!(VALIDATOR_REGISTRY.methods().len(), 15);
        let add_stake = VALIDATOR_REGISTRY.method("addStake").unwrap();
        assert_eq!(
            add_stake.signature(),
            "addStake(pay,uint64,uint64)(uint64,uint64,uint64)"
        );
        assert_eq!(
            VALIDATOR_REGISTRY
                .by_selector(&add_stake.selector())
                .map(|m| m.name.as_str()),
            Some("addStake")
        );
        assert_eq!(STAKING_POOL.method("removeStake").unwrap().txn_arg_count(), 0);
    }

    #[test]
    fn unknown_method_is_an_error() {
        assert_matches!(
            STAKING_POOL.method("addStake"),
            Err(AbiError::UnknownMethod(name)) if name == "StakingPool.addStake"
        );
    }

    #[test]
    fn selectors_are_unique() {
        let mut selectors: Vec<_> = VALIDATOR_REGISTRY
            .methods()
            .iter()
            .map(|m| m.selector())
            .collect();
        selectors.sort();
        selectors.dedup();
        assert_eq!(selectors.len(), VALIDATOR_REGISTRY.methods().len());
    }
}
