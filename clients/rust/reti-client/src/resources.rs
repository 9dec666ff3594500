//! Box and foreign-app references each protocol call must declare up front.

use retitypecrate::{
    box_keys::{staker_ledger_box_name, staker_pool_set_box_name, validator_list_box_name},
    constants::MAX_TXN_REFERENCES,
    types::{Address, ValidatorPoolKey},
};

use crate::{errors::ResourceError, ledger::BoxReference};

/// Unnamed slots reserved next to the staker ledger box for the pool's
/// dynamic I/O.
const STAKER_LEDGER_PADDING: usize = 6;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourcePlan {
    pub foreign_apps: Vec<u64>,
    pub boxes: Vec<BoxReference>,
}

impl ResourcePlan {
    pub fn none() -> Self {
        ResourcePlan::default()
    }

    pub fn reference_count(&self) -> usize {
        self.foreign_apps.len() + self.boxes.len()
    }

    /// Checks the plan against the per-call reference limit. Box references
    /// must target the callee (app id 0 or `callee`) or a declared foreign app.
    pub fn validate(&self, callee: u64) -> Result<(), ResourceError> {
        let count = self.reference_count();
        if count > MAX_TXN_REFERENCES {
            return Err(ResourceError::TooManyReferences(count));
        }
        if let Some(stray) = self.boxes.iter().find(|b| {
            b.app_id != 0 && b.app_id != callee && !self.foreign_apps.contains(&b.app_id)
        }) {
            return Err(ResourceError::UndeclaredBoxApp(stray.app_id));
        }
        Ok(())
    }

    fn with_foreign_apps(mut self, apps: &[u64]) -> Self {
        self.foreign_apps.extend_from_slice(apps);
        self
    }

    fn with_box(mut self, reference: BoxReference) -> Self {
        self.boxes.push(reference);
        self
    }

    fn padded(mut self, blanks: usize) -> Self {
        self.boxes
            .extend(std::iter::repeat_with(BoxReference::blank).take(blanks));
        self
    }
}

/// Per-operation reference plans.
pub struct ResourceReferenceResolver;

impl ResourceReferenceResolver {
    /// `num_validators` is the registry's current count. The next two ids are
    /// both declared in case another registration lands first.
    pub fn add_validator(num_validators: u64) -> ResourcePlan {
        ResourcePlan::none()
            .with_box(BoxReference::own(validator_list_box_name(num_validators + 1)))
            .with_box(BoxReference::own(validator_list_box_name(num_validators + 2)))
            .padded(1)
    }

    /// getValidatorConfig, getValidatorState, getPools and getNodePoolAssignments.
    pub fn validator_read(validator_id: u64) -> ResourcePlan {
        Self::validator_box(validator_id)
    }

    pub fn pool_info(pool_key: &ValidatorPoolKey) -> ResourcePlan {
        Self::validator_box(pool_key.id).with_foreign_apps(&[pool_key.pool_app_id])
    }

    pub fn change_commission_address(validator_id: u64, pool_template_app_id: u64) -> ResourcePlan {
        Self::validator_box(validator_id).with_foreign_apps(&[pool_template_app_id])
    }

    pub fn add_pool(validator_id: u64, pool_template_app_id: u64) -> ResourcePlan {
        Self::validator_box(validator_id).with_foreign_apps(&[pool_template_app_id])
    }

    pub fn move_pool_to_node(
        validator_id: u64,
        pool_template_app_id: u64,
        pool_app_id: u64,
    ) -> ResourcePlan {
        Self::validator_box(validator_id)
            .with_foreign_apps(&[pool_template_app_id, pool_app_id])
    }

    /// initStorage, called on the pool itself.
    pub fn init_storage() -> ResourcePlan {
        ResourcePlan::none()
            .with_box(BoxReference::own(staker_ledger_box_name()))
            .padded(STAKER_LEDGER_PADDING)
    }

    /// Budget call placed ahead of addStake / removeStake.
    pub fn stake_gas(validator_id: u64, staker: &Address) -> ResourcePlan {
        Self::validator_box(validator_id)
            .with_box(BoxReference::own(staker_pool_set_box_name(staker)))
    }

    pub fn add_stake(pool_app_id: u64) -> ResourcePlan {
        ResourcePlan::none()
            .with_foreign_apps(&[pool_app_id])
            .with_box(BoxReference::of_app(pool_app_id, staker_ledger_box_name()))
            .padded(STAKER_LEDGER_PADDING)
    }

    /// removeStake, called on the pool itself.
    pub fn remove_stake(pool_app_id: u64) -> ResourcePlan {
        ResourcePlan::none()
            .with_foreign_apps(&[pool_app_id])
            .with_box(BoxReference::own(staker_ledger_box_name()))
            .padded(STAKER_LEDGER_PADDING)
    }

    /// Read-only lookups rely on unnamed resources during simulation.
    pub fn lookup() -> ResourcePlan {
        ResourcePlan::none()
    }

    fn validator_box(validator_id: u64) -> ResourcePlan {
        ResourcePlan::none()
            .with_box(BoxReference::own(validator_list_box_name(validator_id)))
            .padded(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use pretty_assertions::assert_eq;

    type R = ResourceReferenceResolver;

    #[test]
    fn every_plan_fits_the_reference_limit() {
        let staker = Address::new([8; 32]);
        let key = ValidatorPoolKey::new(3, 1, 500);
        let plans = [
            (1, R::add_validator(4)),
            (1, R::validator_read(3)),
            (1, R::pool_info(&key)),
            (1, R::change_commission_address(3, 20)),
            (1, R::add_pool(3, 20)),
            (1, R::move_pool_to_node(3, 20, 500)),
            (500, R::init_storage()),
            (1, R::stake_gas(3, &staker)),
            (1, R::add_stake(500)),
            (500, R::remove_stake(500)),
            (1, R::lookup()),
        ];
        for (callee, plan) in plans {
            assert!(plan.reference_count() <= MAX_TXN_REFERENCES);
            plan.validate(callee).unwrap();
        }
    }

    #[test]
    fn add_validator_declares_next_two_ids() {
        let plan = R::add_validator(4);
        assert_eq!(
            plan.boxes,
            vec![
                BoxReference::own(validator_list_box_name(5)),
                BoxReference::own(validator_list_box_name(6)),
                BoxReference::blank(),
            ]
        );
        assert!(plan.foreign_apps.is_empty());
    }

    #[test]
    fn pool_info_reads_the_validator_box() {
        let plan = R::pool_info(&ValidatorPoolKey::new(3, 2, 900));
        assert_eq!(plan.boxes[0].name, validator_list_box_name(3));
        assert_eq!(plan.foreign_apps, vec![900]);
    }

    #[test]
    fn stake_plans_reference_the_pool_ledger() {
        let staker = Address::new([8; 32]);
        let gas = R::stake_gas(3, &staker);
        assert_eq!(
            gas.boxes,
            vec![
                BoxReference::own(validator_list_box_name(3)),
                BoxReference::blank(),
                BoxReference::own(staker_pool_set_box_name(&staker)),
            ]
        );

        let add = R::add_stake(500);
        assert_eq!(add.foreign_apps, vec![500]);
        assert_eq!(add.boxes[0], BoxReference::of_app(500, b"stakers".to_vec()));
        assert_eq!(add.boxes.iter().filter(|b| b.is_blank()).count(), 6);
        assert_eq!(add.reference_count(), 8);
    }

    #[test]
    fn rejects_oversized_plans() {
        let plan = R::add_stake(500).with_box(BoxReference::blank());
        assert_matches!(plan.validate(1), Err(ResourceError::TooManyReferences(9)));
    }

    #[test]
    fn rejects_boxes_of_undeclared_apps() {
        let plan = ResourcePlan::none().with_box(BoxReference::of_app(77, b"x".to_vec()));
        assert_matches!(plan.validate(1), Err(ResourceError::UndeclaredBoxApp(77)));
        plan.validate(77).unwrap();
    }
}
