//! Annual review tests — pause semantics, compounding, decisions.

use fire_sim_core::{
    config::{PlayerSeed, SimConfig},
    error::SimError,
    event::SimEvent,
    review::{compounded_return, AdvisoryTag, AnnualDecision},
    rng::{RandomSource, ScriptedRng, SubsystemSlot},
    Lifecycle, PauseReason, SimEngine,
};

const REVIEW: Lifecycle = Lifecycle::Paused { reason: PauseReason::AnnualReview };

fn investing(invest: f64) -> PlayerSeed {
    PlayerSeed { monthly_invest_target: invest, ..PlayerSeed::default() }
}

/// Portfolio draws walk the table in order: -2%, +1%, +3%, +5%, repeat.
fn cycling_engine() -> SimEngine {
    let config = SimConfig::default_test()
        .with_player(investing(5_000.0))
        .with_returns(vec![-0.02, 0.01, 0.03, 0.05]);
    SimEngine::with_random_sources(config, |slot| -> Box<dyn RandomSource> {
        match slot {
            SubsystemSlot::Portfolio => Box::new(ScriptedRng::new(vec![0.0, 0.3, 0.6, 0.9])),
            _ => Box::new(ScriptedRng::constant(0.5)),
        }
    })
    .expect("engine")
}

fn first_year() -> SimEngine {
    let mut engine = SimEngine::new(SimConfig::default_test().with_player(investing(5_000.0)), 1).unwrap();
    engine.run_months(12).unwrap();
    engine
}

#[test]
fn engine_pauses_after_twelfth_month() {
    let mut engine = SimEngine::new(SimConfig::default_test(), 1).unwrap();

    assert_eq!(engine.run_months(11).unwrap(), 11);
    assert_eq!(engine.lifecycle(), Lifecycle::Running);

    let events = engine.advance_month().unwrap();
    assert_eq!(engine.lifecycle(), REVIEW);
    assert!(events.iter().any(|e| matches!(e, SimEvent::AnnualReviewReady { tick: 12, .. })));
    assert_eq!(engine.history().annual_returns.len(), 1);
    assert_eq!(engine.history().annual_returns[0].age_years, 25);
}

#[test]
fn ticks_and_plain_resume_are_rejected_during_review() {
    let mut engine = first_year();
    let before = engine.player().clone();

    assert!(matches!(
        engine.advance_month(),
        Err(SimError::InvalidOperationInState { operation: "advance_month", .. })
    ));
    assert!(engine.resume().is_err());
    assert!(engine.pause().is_err());
    assert_eq!(engine.player(), &before);
    assert_eq!(engine.lifecycle(), REVIEW);
}

#[test]
fn skip_keeps_targets_and_continues_to_the_next_review() {
    let mut engine = first_year();
    let target = engine.player().monthly_invest_target;

    engine.skip_annual_decision().unwrap();
    assert_eq!(engine.lifecycle(), Lifecycle::Running);
    assert_eq!(engine.player().monthly_invest_target, target);
    assert!(engine
        .events()
        .latest()
        .is_some_and(|e| matches!(e.event, SimEvent::AnnualDecisionSkipped { tick: 12 })));

    assert_eq!(engine.run_months(24).unwrap(), 12);
    assert_eq!(engine.player().clock.total_months_elapsed, 24);
    let ages: Vec<u32> = engine.history().annual_returns.iter().map(|a| a.age_years).collect();
    assert_eq!(ages, vec![25, 26]);
    assert_eq!(engine.reviews().len(), 2);
}

#[test]
fn resume_after_review_records_no_decision() {
    let mut engine = first_year();
    let feed_len = engine.events().len();

    engine.resume_after_annual_review().unwrap();

    assert!(engine.is_running());
    assert_eq!(engine.events().len(), feed_len);
}

#[test]
fn compounded_return_covers_the_last_twelve_realised_months() {
    let mut engine = cycling_engine();
    engine.run_months(12).unwrap();

    let cycle = [-0.02, 0.01, 0.03, 0.05];
    let year: Vec<f64> = cycle.iter().cycle().take(12).copied().collect();
    let expected = compounded_return(&year);

    assert_eq!(engine.history().monthly_return_by_tick[1..], year[..]);
    assert_eq!(engine.history().annual_returns[0].compounded_return, expected);

    let summary = engine.pending_review().expect("pending review");
    assert_eq!(summary.compounded_return, expected);
    assert_eq!(summary.net_worth_start, 200_000.0);
    assert_eq!(summary.net_worth_delta, engine.player().net_worth() - 200_000.0);
}

#[test]
fn summary_flags_strong_growth_and_keeps_cash_idle_note_quiet() {
    let mut engine = SimEngine::new(SimConfig::default_test(), 3).unwrap();
    engine.run_months(12).unwrap();

    let summary = engine.pending_review().expect("pending review");
    // 200,000 -> 425,000 with nothing invested.
    assert_eq!(summary.net_worth_end, 425_000.0);
    assert!(!summary.is_invested());
    assert!(summary.advisories.contains(&AdvisoryTag::StrongPerformance));
    assert!(!summary.advisories.contains(&AdvisoryTag::ShouldInvest));
}

#[test]
fn decision_updates_targets_and_resumes() {
    let mut engine = first_year();
    let invested = engine.player().invested_value;
    let cash = engine.player().cash;

    let outcome = engine
        .apply_annual_decision(AnnualDecision {
            new_monthly_invest_target: Some(9_000.0),
            new_basic_expense: Some(14_000.0),
            withdraw_amount: 10_000.0,
        })
        .unwrap();

    assert_eq!(outcome.withdrawn, 10_000.0);
    assert!(!outcome.withdraw_clamped);
    let p = engine.player();
    assert_eq!(p.monthly_invest_target, 9_000.0);
    assert_eq!(p.monthly_basic_expense, 14_000.0);
    assert_eq!(p.invested_value, invested - 10_000.0);
    assert_eq!(p.cash, cash + 10_000.0);
    assert!(engine.is_running());
}

#[test]
fn decision_withdrawal_is_clamped_to_the_position() {
    let mut engine = first_year();
    let invested = engine.player().invested_value;

    let outcome = engine
        .apply_annual_decision(AnnualDecision { withdraw_amount: 1e12, ..AnnualDecision::default() })
        .unwrap();

    assert_eq!(outcome.withdrawn, invested);
    assert!(outcome.withdraw_clamped);
    assert_eq!(engine.player().invested_value, 0.0);
    assert_eq!(engine.player().invested_cost_basis, 0.0);
}

#[test]
fn negative_decision_withdrawal_becomes_zero() {
    let mut engine = first_year();
    let before = engine.player().clone();

    let outcome = engine
        .apply_annual_decision(AnnualDecision { withdraw_amount: -500.0, ..AnnualDecision::default() })
        .unwrap();

    assert_eq!(outcome.withdrawn, 0.0);
    assert!(outcome.withdraw_clamped);
    assert_eq!(engine.player().invested_value, before.invested_value);
    assert_eq!(engine.player().cash, before.cash);
}

#[test]
fn invalid_targets_reject_the_whole_decision() {
    let mut engine = first_year();
    let before = engine.player().clone();

    let err = engine
        .apply_annual_decision(AnnualDecision {
            new_monthly_invest_target: Some(-1.0),
            new_basic_expense: Some(10_000.0),
            withdraw_amount: 5_000.0,
        })
        .unwrap_err();

    assert!(matches!(err, SimError::InvalidParameter { field: "new_monthly_invest_target", .. }));
    assert_eq!(engine.player(), &before);
    assert_eq!(engine.lifecycle(), REVIEW);

    assert!(engine
        .apply_annual_decision(AnnualDecision { withdraw_amount: f64::NAN, ..AnnualDecision::default() })
        .is_err());
    assert!(engine
        .apply_annual_decision(AnnualDecision { new_basic_expense: Some(f64::INFINITY), ..AnnualDecision::default() })
        .is_err());
    assert_eq!(engine.player(), &before);
}

#[test]
fn decisions_outside_a_review_are_rejected() {
    let mut engine = SimEngine::new(SimConfig::default_test(), 1).unwrap();

    assert!(matches!(
        engine.apply_annual_decision(AnnualDecision::default()),
        Err(SimError::InvalidOperationInState { .. })
    ));
    assert!(engine.skip_annual_decision().is_err());
    assert!(engine.pending_review().is_none());
}
