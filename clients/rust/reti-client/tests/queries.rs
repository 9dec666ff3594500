use std::sync::Arc;

use assert_matches::assert_matches;
use fixtures::{ledger::MockLedger, prelude::*};
use pretty_assertions::assert_eq;
use reticlient::{
    config::Config,
    group::{Fee, MethodCall, PaymentStep, TransactionGroupBuilder},
    ledger::TransactionBody,
    methods::VALIDATOR_REGISTRY,
    signer::{Signer, StepSigner},
    GroupError, Reti, RetiError,
};
use retitypecrate::{
    abi::AbiValue,
    types::{Address, PoolInfo, ValidatorCurState, ValidatorPoolKey},
};

#[test]
fn validator_config_round_trips_through_simulation() -> anyhow::Result<()> {
    let test_f = TestFixture::new();
    test_f.set_return("getValidatorConfig", DEFAULT_VALIDATOR_CONFIG.to_abi_value());

    let config = test_f.reti.get_validator_config(VALIDATOR_ID)?;
    assert_eq!(config, *DEFAULT_VALIDATOR_CONFIG);

    // Reads are unsigned simulations sent from the first local account
    let state = test_f.ledger.state();
    let request = state.simulate_requests.last().unwrap();
    assert!(request.allow_empty_signatures);
    assert!(request.allow_unnamed_resources);
    let group = state.simulated.last().unwrap();
    assert_eq!(group[0].txn.sender, OWNER);
    assert!(!group[0].is_signed());
    assert!(state.executed.is_empty());

    Ok(())
}

#[test]
fn validator_state_and_pools_decode() -> anyhow::Result<()> {
    let test_f = TestFixture::new();
    let cur_state = ValidatorCurState {
        num_pools: 2,
        total_stakers: 7,
        total_algo_staked: 90_000_000,
    };
    let pools = vec![
        PoolInfo {
            pool_app_id: 5_001,
            total_stakers: 4,
            total_algo_staked: 50_000_000,
        },
        PoolInfo {
            pool_app_id: 5_002,
            total_stakers: 3,
            total_algo_staked: 40_000_000,
        },
    ];
    test_f
        .set_return("getValidatorState", validator_state_value(&cur_state))
        .set_return("getPools", pools_value(&pools))
        .set_return("getPoolInfo", pool_info_value(&pools[1]));

    assert_eq!(test_f.reti.get_validator_state(VALIDATOR_ID)?, cur_state);
    assert_eq!(test_f.reti.get_validator_pools(VALIDATOR_ID)?, pools);
    assert_eq!(
        test_f
            .reti
            .get_validator_pool_info(&ValidatorPoolKey::new(VALIDATOR_ID, 2, 5_002))?,
        pools[1]
    );

    Ok(())
}

#[test]
fn staked_pools_skip_empty_keys() -> anyhow::Result<()> {
    let test_f = TestFixture::new();
    let staked = ValidatorPoolKey::new(VALIDATOR_ID, 1, 5_001);
    test_f.set_return(
        "getStakedPoolsForAccount",
        AbiValue::Array(vec![
            staked.to_abi_value(),
            ValidatorPoolKey::default().to_abi_value(),
        ]),
    );

    let pools = test_f.reti.get_staked_pools_for_account(&STAKER)?;
    assert_eq!(pools, vec![staked]);
    let state = test_f.ledger.state();
    assert_eq!(state.simulated.last().unwrap()[0].txn.sender, STAKER);

    Ok(())
}

#[test]
fn node_assignments_and_local_pools() -> anyhow::Result<()> {
    let test_f = TestFixture::new();
    test_f
        .set_return("getValidatorConfig", DEFAULT_VALIDATOR_CONFIG.to_abi_value())
        .set_return(
            "getPools",
            pools_value(&[
                PoolInfo {
                    pool_app_id: 5_001,
                    ..PoolInfo::default()
                },
                PoolInfo {
                    pool_app_id: 5_002,
                    ..PoolInfo::default()
                },
                PoolInfo {
                    pool_app_id: 5_003,
                    ..PoolInfo::default()
                },
            ]),
        )
        .set_return(
            "getNodePoolAssignments",
            node_assignments_value(&[&[5_001, 5_003], &[5_002]]),
        );

    let info = test_f.reti.load_validator_info(VALIDATOR_ID, 1)?;
    assert_eq!(info.node_pool_assignments.pools_on_node(1)?, &[5_001, 5_003]);
    assert_eq!(info.node_pool_assignments.pools_on_node(2)?, &[5_002]);
    assert_eq!(
        info.local_pools.into_iter().collect::<Vec<_>>(),
        vec![(1, 5_001), (3, 5_003)]
    );

    // The assignment read asks for extra logging
    let state = test_f.ledger.state();
    assert!(state.simulate_requests.iter().any(|r| r.allow_more_logging));

    Ok(())
}

#[test]
fn mbr_and_staker_queries_decode() -> anyhow::Result<()> {
    let test_f = TestFixture::new();
    test_f.set_return("doesStakerNeedToPayMBR", AbiValue::Bool(true));

    assert_eq!(test_f.reti.get_mbr_amounts(&STAKER)?, *DEFAULT_MBRS);
    assert!(test_f.reti.does_staker_need_to_pay_mbr(&STAKER)?);

    Ok(())
}

#[test]
fn query_failure_is_reported_verbatim() {
    let test_f = TestFixture::new();
    test_f
        .ledger
        .fail_simulation("getValidatorConfig", "logic eval error: invalid validator id");

    assert_matches!(
        test_f.reti.get_validator_config(99),
        Err(RetiError::SimulationFailed(msg)) if msg == "logic eval error: invalid validator id"
    );
}

#[test]
fn queries_need_a_local_account() {
    let test_f = TestFixture::with_accounts(&[]);

    assert_matches!(
        test_f.reti.get_validator_config(VALIDATOR_ID),
        Err(RetiError::NoSimulationAccount)
    );
}

#[test]
fn pool_template_comes_from_registry_state() -> anyhow::Result<()> {
    let test_f = TestFixture::new();
    assert_eq!(test_f.reti.pool_template_app_id(), POOL_TEMPLATE_APP_ID);
    assert_eq!(test_f.reti.get_num_validators()?, 1);

    // An explicit template skips the registry read
    let ledger = MockLedger::new(test_params());
    let signer: Arc<dyn Signer> = TestSigner::new(&[OWNER]);
    let reti = Reti::new(
        Config {
            pool_template_app_id: Some(77),
            ..Config::new(REGISTRY_APP_ID)
        },
        ledger.clone(),
        signer,
    )?;
    assert_eq!(reti.pool_template_app_id(), 77);
    assert_eq!(ledger.state().global_state_reads, 0);

    Ok(())
}

#[test]
fn group_with_empty_signer_is_never_signed() -> anyhow::Result<()> {
    let test_f = TestFixture::new();
    let signer: Arc<dyn Signer> = test_f.signer.clone();

    let mut builder = TransactionGroupBuilder::new(test_params());
    builder.add_payment(PaymentStep {
        sender: OWNER,
        receiver: Address::for_application(REGISTRY_APP_ID),
        amount: 1_000,
        signer: StepSigner::for_account(signer, OWNER),
        fee: Fee::Minimum,
    });
    builder.add_method_call(MethodCall::new(
        REGISTRY_APP_ID,
        VALIDATOR_REGISTRY.method("gas")?,
        OWNER,
        StepSigner::Empty,
    ))?;
    let group = builder.build()?;

    assert_matches!(
        group.execute(&test_f.ledger, 4),
        Err(RetiError::Group(GroupError::UnauthenticatedCommit(1)))
    );
    assert!(test_f.signer.signed().is_empty());
    assert!(test_f.ledger.executed_groups().is_empty());

    // The same group still simulates
    let outcome = group.simulate(&test_f.ledger, &Default::default())?;
    assert_eq!(outcome.confirmed_round, None);
    assert_matches!(
        &test_f.ledger.simulated_groups()[0][0].txn.body,
        TransactionBody::Payment { amount: 1_000, .. }
    );

    Ok(())
}
