//! Ad-hoc withdrawals and parameter setters.

use fire_sim_core::{
    config::{PlayerSeed, SimConfig},
    error::SimError,
    event::{Parameter, SimEvent},
    SimEngine,
};

fn engine_holding(invested: f64, basis: f64) -> SimEngine {
    let seed = PlayerSeed {
        invested_value: invested,
        invested_cost_basis: basis,
        ..PlayerSeed::default()
    };
    SimEngine::new(SimConfig::default_test().with_player(seed), 11).unwrap()
}

#[test]
fn withdrawal_moves_value_to_cash_and_shrinks_basis() {
    let mut engine = engine_holding(100_000.0, 80_000.0);

    let w = engine.withdraw(25_000.0).unwrap();

    assert_eq!(w.withdrawn, 25_000.0);
    assert!(!w.clamped);
    let p = engine.player();
    assert_eq!(p.invested_value, 75_000.0);
    assert_eq!(p.cash, 225_000.0);
    // Proportional share would leave 60,000; principal left is only 55,000.
    assert_eq!(p.invested_cost_basis, 55_000.0);
    assert!(p.invested_cost_basis <= p.net_contributions());
}

#[test]
fn contributions_after_withdrawing_profits_keep_basis_within_principal() {
    let seed = PlayerSeed {
        invested_value: 100_000.0,
        invested_cost_basis: 50_000.0,
        ..PlayerSeed::default()
    };
    let config = SimConfig::default_test().with_player(seed).with_returns(vec![0.0]);
    let mut engine = SimEngine::new(config, 11).unwrap();

    // 60,000 out against 50,000 put in: nothing of the principal is left.
    engine.withdraw(60_000.0).unwrap();
    assert_eq!(engine.player().invested_cost_basis, 0.0);
    assert_eq!(engine.player().net_contributions(), 0.0);

    engine.set_monthly_invest_target(15_000.0).unwrap();
    engine.advance_month().unwrap();

    let p = engine.player();
    assert_eq!(p.total_contributed, 65_000.0);
    assert_eq!(p.total_withdrawn, 60_000.0);
    assert_eq!(p.invested_cost_basis, 5_000.0);
}

#[test]
fn emptying_the_position_then_investing_again_stays_within_principal() {
    let config = SimConfig::default_test().with_player(PlayerSeed {
        monthly_invest_target: 10_000.0,
        ..PlayerSeed::default()
    });
    let mut engine = SimEngine::new(config, 11).unwrap();
    engine.run_months(6).unwrap();

    let everything = engine.player().invested_value;
    assert!(everything > 60_000.0, "six months of gains on 60,000");
    engine.withdraw(everything).unwrap();
    assert_eq!(engine.player().invested_cost_basis, 0.0);

    engine.advance_month().unwrap();

    let p = engine.player();
    assert!(p.net_contributions() < 10_000.0);
    assert_eq!(p.invested_cost_basis, p.net_contributions());
    assert_eq!(p.invested_value, 10_000.0 + 100.0 + 20.0);
}

#[test]
fn withdrawal_at_a_loss_reduces_basis_proportionally() {
    let mut engine = engine_holding(50_000.0, 80_000.0);

    engine.withdraw(25_000.0).unwrap();

    let p = engine.player();
    assert_eq!(p.invested_value, 25_000.0);
    assert_eq!(p.invested_cost_basis, 40_000.0);
}

#[test]
fn oversized_withdrawal_is_clamped_and_reported() {
    let mut engine = engine_holding(10_000.0, 10_000.0);

    let w = engine.withdraw(50_000.0).unwrap();

    assert_eq!(w.withdrawn, 10_000.0);
    assert!(w.clamped);
    assert_eq!(engine.player().invested_value, 0.0);
    assert_eq!(engine.player().invested_cost_basis, 0.0);
    assert_eq!(engine.player().cash, 210_000.0);
    assert!(matches!(
        engine.events().latest().map(|e| &e.event),
        Some(SimEvent::Withdrawal { requested, withdrawn, .. })
            if *requested == 50_000.0 && *withdrawn == 10_000.0
    ));
}

#[test]
fn withdrawal_with_nothing_invested_fails() {
    let mut engine = engine_holding(0.0, 0.0);
    let before = engine.player().clone();

    let err = engine.withdraw(1_000.0).unwrap_err();

    assert!(matches!(err, SimError::InsufficientFunds { available, .. } if available == 0.0));
    assert_eq!(engine.player(), &before);
}

#[test]
fn non_positive_or_nan_amounts_are_rejected() {
    let mut engine = engine_holding(10_000.0, 10_000.0);

    for amount in [0.0, -5.0, f64::NAN, f64::INFINITY] {
        assert!(
            matches!(engine.withdraw(amount), Err(SimError::InvalidParameter { field: "amount", .. })),
            "amount {amount} should be rejected"
        );
    }
    assert_eq!(engine.player().invested_value, 10_000.0);
}

#[test]
fn withdrawal_is_allowed_while_paused() {
    let mut engine = engine_holding(10_000.0, 10_000.0);
    engine.pause().unwrap();

    engine.withdraw(4_000.0).unwrap();

    assert_eq!(engine.player().invested_value, 6_000.0);
}

#[test]
fn setters_validate_and_record_changes() {
    let mut engine = engine_holding(0.0, 0.0);

    engine.set_monthly_invest_target(7_500.0).unwrap();
    engine.set_monthly_salary(32_000.0).unwrap();
    engine.set_monthly_basic_expense(16_000.0).unwrap();

    let p = engine.player();
    assert_eq!(p.monthly_invest_target, 7_500.0);
    assert_eq!(p.monthly_salary, 32_000.0);
    assert_eq!(p.monthly_basic_expense, 16_000.0);

    let changed: Vec<Parameter> = engine
        .events()
        .entries()
        .iter()
        .filter_map(|e| match e.event {
            SimEvent::ParameterChanged { parameter, .. } => Some(parameter),
            _ => None,
        })
        .collect();
    assert_eq!(
        changed,
        vec![Parameter::MonthlyInvestTarget, Parameter::MonthlySalary, Parameter::MonthlyBasicExpense]
    );

    assert!(engine.set_monthly_salary(-1.0).is_err());
    assert!(engine.set_monthly_invest_target(f64::NAN).is_err());
    assert_eq!(engine.player().monthly_salary, 32_000.0);
    assert_eq!(engine.player().monthly_invest_target, 7_500.0);
}

#[test]
fn new_target_takes_effect_next_tick() {
    let mut engine = SimEngine::new(
        SimConfig::default_test().with_returns(vec![0.0]),
        5,
    )
    .unwrap();
    engine.advance_month().unwrap();
    assert_eq!(engine.player().invested_cost_basis, 0.0);

    engine.set_monthly_invest_target(4_000.0).unwrap();
    engine.advance_month().unwrap();

    assert_eq!(engine.player().invested_cost_basis, 4_000.0);
}
