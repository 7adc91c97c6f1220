//! Terminal states: FIRE success, insolvency, and what happens after.

use fire_sim_core::{
    config::{PlayerSeed, SimConfig},
    error::SimError,
    event::SimEvent,
    review::AnnualDecision,
    Lifecycle, Outcome, SimEngine,
};

fn engine(seed: PlayerSeed) -> SimEngine {
    SimEngine::new(SimConfig::default_test().with_player(seed), 17).unwrap()
}

fn nearly_there() -> PlayerSeed {
    PlayerSeed { cash: 9_990_000.0, ..PlayerSeed::default() }
}

fn broke() -> PlayerSeed {
    PlayerSeed {
        cash: -100_000.0,
        monthly_salary: 0.0,
        monthly_basic_expense: 1_000.0,
        ..PlayerSeed::default()
    }
}

#[test]
fn reaching_the_target_ends_the_session_in_success() {
    let mut engine = engine(nearly_there());

    let events = engine.advance_month().unwrap();

    assert_eq!(engine.lifecycle(), Lifecycle::Terminated { outcome: Outcome::Success });
    assert!(matches!(
        events.last(),
        Some(SimEvent::FireAchieved { tick: 1, age: 25, net_worth }) if *net_worth == 10_005_000.0
    ));
}

#[test]
fn negative_cash_with_nothing_invested_is_insolvent() {
    let mut engine = engine(broke());

    let events = engine.advance_month().unwrap();

    assert_eq!(engine.lifecycle(), Lifecycle::Terminated { outcome: Outcome::Insolvent });
    assert!(matches!(events.last(), Some(SimEvent::Insolvent { cash, .. }) if *cash == -101_000.0));
}

#[test]
fn negative_cash_is_tolerated_while_something_is_invested() {
    let seed = PlayerSeed { invested_value: 50_000.0, invested_cost_basis: 50_000.0, ..broke() };
    let mut engine = engine(seed);

    engine.advance_month().unwrap();

    assert!(engine.player().cash < 0.0);
    assert!(engine.is_running());
}

#[test]
fn success_is_checked_before_insolvency() {
    let seed = PlayerSeed { fire_target_net_worth: -1e9, ..broke() };
    let mut engine = engine(seed);

    engine.advance_month().unwrap();

    assert_eq!(engine.lifecycle(), Lifecycle::Terminated { outcome: Outcome::Success });
}

#[test]
fn terminal_state_is_absorbing() {
    let mut engine = engine(broke());
    engine.advance_month().unwrap();

    let player = engine.player().clone();
    let history = engine.history().clone();
    let feed_len = engine.events().len();

    let terminated = |r: Result<(), SimError>| {
        matches!(r, Err(SimError::AlreadyTerminated { outcome: Outcome::Insolvent }))
    };
    assert!(terminated(engine.advance_month().map(|_| ())));
    assert!(terminated(engine.run_months(5).map(|_| ())));
    assert!(terminated(engine.pause()));
    assert!(terminated(engine.resume()));
    assert!(terminated(engine.withdraw(1.0).map(|_| ())));
    assert!(terminated(engine.set_monthly_salary(50_000.0)));
    assert!(terminated(engine.skip_annual_decision()));
    assert!(terminated(engine.apply_annual_decision(AnnualDecision::default()).map(|_| ())));

    assert_eq!(engine.player(), &player);
    assert_eq!(engine.history(), &history);
    assert_eq!(engine.events().len(), feed_len);
}

#[test]
fn success_on_a_review_month_skips_the_pause() {
    // 200,000 + 12 * 15,000 + 45,000 bonus = 425,000 at tick 12.
    let seed = PlayerSeed { fire_target_net_worth: 420_000.0, ..PlayerSeed::default() };
    let mut engine = engine(seed);

    assert_eq!(engine.run_months(24).unwrap(), 12);

    assert_eq!(engine.lifecycle(), Lifecycle::Terminated { outcome: Outcome::Success });
    assert_eq!(engine.history().annual_returns.len(), 1);
    assert!(engine.pending_review().is_none());
    assert_eq!(engine.reviews().len(), 1);
}

#[test]
fn reset_leaves_a_terminated_session() {
    let mut engine = engine(broke());
    engine.advance_month().unwrap();
    assert!(engine.is_terminated());

    engine.reset();

    assert!(engine.is_running());
    assert_eq!(engine.player().clock.total_months_elapsed, 0);
    assert_eq!(engine.player().cash, -100_000.0);
}
