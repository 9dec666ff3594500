//! Fee budgeting for calls whose opcode cost depends on ledger state.
//!
//! The group is simulated once with a generous fee ceiling, the extra opcode
//! budget the ledger had to grant is read back, and the identical group is
//! rebuilt with the exact flat fee and committed. The three stages are
//! separate types so a commit can only come out of a successful discovery.

use log::{debug, info};
use retitypecrate::constants::{
    DISCOVERY_FEE_MULTIPLIER, MIN_TXN_FEE, OPCODE_BUDGET_UNIT, SUPPORTING_CALLS_FEE_UNITS,
};

use crate::{
    errors::RetiResult,
    group::{ComposedGroup, GroupOutcome},
    ledger::{LedgerClient, SimulateRequest},
};

/// Fee ceiling used while discovering the real cost.
pub fn discovery_fee(min_fee: u64) -> u64 {
    DISCOVERY_FEE_MULTIPLIER * min_fee
}

/// Flat fee for a variable-cost call given the opcode budget the ledger added.
pub fn variable_call_fee(min_fee: u64, added_budget: u64) -> u64 {
    let budget_units =
        added_budget / OPCODE_BUDGET_UNIT + u64::from(added_budget % OPCODE_BUDGET_UNIT != 0);
    SUPPORTING_CALLS_FEE_UNITS * min_fee + min_fee * budget_units
}

/// addPool covers one inner call.
pub fn add_pool_fee(min_fee: u64) -> u64 {
    min_fee.max(MIN_TXN_FEE) + min_fee
}

/// movePoolToNode covers two inner calls, one of them taking the pool offline.
pub fn move_pool_fee(min_fee: u64) -> u64 {
    min_fee.max(MIN_TXN_FEE) + 2 * min_fee
}

/// Entry state. `build` rebuilds the whole group given the flat fee of the
/// variable-cost call; it is invoked once per phase.
pub struct Discovery<'a, L: ?Sized, F> {
    ledger: &'a L,
    min_fee: u64,
    build: F,
}

/// Discovery succeeded; the exact fee is known.
pub struct Decided<'a, L: ?Sized, F> {
    ledger: &'a L,
    build: F,
    added_budget: u64,
    flat_fee: u64,
}

/// The group landed on the ledger.
#[derive(Debug, Clone)]
pub struct Committed {
    pub added_budget: u64,
    pub flat_fee: u64,
    pub outcome: GroupOutcome,
}

impl<'a, L, F> Discovery<'a, L, F>
where
    L: LedgerClient + ?Sized,
    F: Fn(u64) -> RetiResult<ComposedGroup>,
{
    pub fn new(ledger: &'a L, min_fee: u64, build: F) -> Self {
        Discovery {
            ledger,
            min_fee,
            build,
        }
    }

    pub fn ceiling_fee(&self) -> u64 {
        discovery_fee(self.min_fee)
    }

    /// Simulates the group at the ceiling fee. A reported failure aborts here
    /// with the ledger's message, so no commit can follow.
    pub fn discover(self) -> RetiResult<Decided<'a, L, F>> {
        let ceiling = self.ceiling_fee();
        let group = (self.build)(ceiling)?;
        let simulated = group.simulate(self.ledger, &SimulateRequest::unsigned())?;

        let added_budget = simulated.app_budget_added;
        let flat_fee = variable_call_fee(self.min_fee, added_budget);
        info!(
            "simulation added {} opcode budget, using flat fee {} (ceiling {})",
            added_budget, flat_fee, ceiling
        );

        Ok(Decided {
            ledger: self.ledger,
            build: self.build,
            added_budget,
            flat_fee,
        })
    }
}

impl<'a, L, F> Decided<'a, L, F>
where
    L: LedgerClient + ?Sized,
    F: Fn(u64) -> RetiResult<ComposedGroup>,
{
    pub fn added_budget(&self) -> u64 {
        self.added_budget
    }

    pub fn flat_fee(&self) -> u64 {
        self.flat_fee
    }

    pub fn commit(self, wait_rounds: u64) -> RetiResult<Committed> {
        let group = (self.build)(self.flat_fee)?;
        debug!("committing group of {} at flat fee {}", group.len(), self.flat_fee);
        let outcome = group.execute(self.ledger, wait_rounds)?;
        Ok(Committed {
            added_budget: self.added_budget,
            flat_fee: self.flat_fee,
            outcome,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    #[test_case(1_000, 0, 2_000 ; "no added budget")]
    #[test_case(1_000, 1_400, 4_000 ; "exact units")]
    #[test_case(1_000, 1_401, 5_000 ; "partial unit rounds up")]
    #[test_case(1_000, 1, 3_000 ; "single opcode")]
    #[test_case(2_000, 700, 6_000 ; "congested min fee")]
    fn variable_fee(min_fee: u64, added: u64, expected: u64) {
        assert_eq!(variable_call_fee(min_fee, added), expected);
    }

    #[test]
    fn fixed_fees() {
        assert_eq!(discovery_fee(1_000), 240_000);
        assert_eq!(add_pool_fee(1_000), 2_000);
        assert_eq!(move_pool_fee(1_000), 3_000);
        assert_eq!(add_pool_fee(0), 1_000);
        assert_eq!(move_pool_fee(2_000), 6_000);
    }
}
