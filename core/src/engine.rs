//! The simulation engine — one player's finances, one month per tick.
//!
//! EXECUTION ORDER (fixed, documented, never reordered):
//!   1. Clock: increment `total_months_elapsed`
//!   2. Payroll subsystem    (inflation + raise on a new age-year, year-end bonus)
//!   3. Portfolio subsystem  (contribution, sampled return, dividend, cash flow)
//!   4. Market event subsystem (every third tick)
//!   5. Calendar roll-over
//!   6. History append + month summary
//!   7. Annual review on a completed 12-month block (pauses the engine)
//!   8. Terminal conditions: FIRE success first, then insolvency
//!
//! RULES:
//!   - Subsystems execute in registration order, every tick.
//!   - All randomness flows through the per-slot `RandomSource`s.
//!   - Every policy action is recorded in the event feed.
//!   - A rejected call leaves every field untouched.

use crate::{
    clock::{label_for_tick, SimClock},
    config::SimConfig,
    error::{SimError, SimResult},
    event::{Parameter, SimEvent},
    event_log::EventLog,
    market_event_subsystem::MarketEventSubsystem,
    payroll_subsystem::PayrollSubsystem,
    portfolio_subsystem::PortfolioSubsystem,
    review::{AnnualDecision, AnnualReviewSummary, DecisionOutcome},
    rng::{RandomSource, RngBank, SubsystemSlot},
    snapshot::{SessionMetrics, SessionSnapshot},
    state::{AnnualReturn, HistorySeries, PlayerState},
    subsystem::{MonthFlows, SimSubsystem},
    types::{new_session_id, Money, SessionId, Tick},
};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Success,
    Insolvent,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PauseReason {
    /// The collaborator stopped time.
    Manual,
    /// Waiting for an annual decision to be applied or skipped.
    AnnualReview,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Lifecycle {
    Running,
    Paused { reason: PauseReason },
    Terminated { outcome: Outcome },
}

impl fmt::Display for Lifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lifecycle::Running => write!(f, "running"),
            Lifecycle::Paused { reason: PauseReason::Manual } => write!(f, "paused"),
            Lifecycle::Paused { reason: PauseReason::AnnualReview } => {
                write!(f, "paused for annual review")
            }
            Lifecycle::Terminated { outcome: Outcome::Success } => write!(f, "terminated (FIRE reached)"),
            Lifecycle::Terminated { outcome: Outcome::Insolvent } => write!(f, "terminated (insolvent)"),
        }
    }
}

/// Result of a withdrawal outside the annual review.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Withdrawal {
    pub requested: Money,
    pub withdrawn: Money,
    /// True when the request exceeded the invested value.
    pub clamped: bool,
}

struct Registered {
    slot: SubsystemSlot,
    subsystem: Box<dyn SimSubsystem>,
    rng: Box<dyn RandomSource>,
}

pub struct SimEngine {
    pub session_id: SessionId,
    seed: Option<u64>,
    config: SimConfig,
    initial_player: PlayerState,
    player: PlayerState,
    history: HistorySeries,
    reviews: Vec<AnnualReviewSummary>,
    lifecycle: Lifecycle,
    events: EventLog,
    subsystems: Vec<Registered>,
}

impl SimEngine {
    /// Build a fully wired engine whose random streams derive from `seed`.
    pub fn new(config: SimConfig, seed: u64) -> SimResult<Self> {
        let bank = RngBank::new(seed);
        let mut engine = Self::with_random_sources(config, |slot| bank.source(slot))?;
        engine.seed = Some(seed);
        Ok(engine)
    }

    /// Build a fully wired engine with injected random sources, one per slot.
    pub fn with_random_sources(
        config: SimConfig,
        mut source_for: impl FnMut(SubsystemSlot) -> Box<dyn RandomSource>,
    ) -> SimResult<Self> {
        config.validate()?;
        let player = initial_player(&config);

        let mut engine = Self {
            session_id: new_session_id(),
            seed: None,
            history: HistorySeries::seeded(&player),
            initial_player: player.clone(),
            player,
            reviews: Vec::new(),
            lifecycle: Lifecycle::Running,
            events: EventLog::new(),
            subsystems: Vec::new(),
            config,
        };

        // EXECUTION ORDER — fixed, documented, never reordered.
        let economy = engine.config.economy.clone();
        engine.register(
            SubsystemSlot::Payroll,
            Box::new(PayrollSubsystem::new(economy.clone())),
            source_for(SubsystemSlot::Payroll),
        );
        engine.register(
            SubsystemSlot::Portfolio,
            Box::new(PortfolioSubsystem::new(
                economy.clone(),
                engine.config.historical_returns.clone(),
            )),
            source_for(SubsystemSlot::Portfolio),
        );
        engine.register(
            SubsystemSlot::MarketEvents,
            Box::new(MarketEventSubsystem::new(
                engine.config.market_events.clone(),
                economy.market_event_interval,
            )),
            source_for(SubsystemSlot::MarketEvents),
        );

        engine.announce_start();
        Ok(engine)
    }

    /// Register a subsystem. Call in the documented execution order.
    fn register(
        &mut self,
        slot: SubsystemSlot,
        subsystem: Box<dyn SimSubsystem>,
        rng: Box<dyn RandomSource>,
    ) {
        log::debug!("registered subsystem '{}' in slot {}", subsystem.name(), slot.name());
        self.subsystems.push(Registered { slot, subsystem, rng });
    }

    // ── Read accessors ─────────────────────────────────────────

    pub fn player(&self) -> &PlayerState {
        &self.player
    }

    pub fn history(&self) -> &HistorySeries {
        &self.history
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn is_running(&self) -> bool {
        self.lifecycle == Lifecycle::Running
    }

    pub fn is_terminated(&self) -> bool {
        matches!(self.lifecycle, Lifecycle::Terminated { .. })
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    pub fn events(&self) -> &EventLog {
        &self.events
    }

    /// Every annual summary produced this session, oldest first.
    pub fn reviews(&self) -> &[AnnualReviewSummary] {
        &self.reviews
    }

    /// The summary awaiting a decision; only while paused for review.
    pub fn pending_review(&self) -> Option<&AnnualReviewSummary> {
        match self.lifecycle {
            Lifecycle::Paused { reason: PauseReason::AnnualReview } => self.reviews.last(),
            _ => None,
        }
    }

    /// Serializable read model for UI collaborators.
    pub fn snapshot(&self, recent_events: usize) -> SessionSnapshot {
        SessionSnapshot {
            session_id: self.session_id.clone(),
            seed: self.seed,
            lifecycle: self.lifecycle,
            clock_label: self.player.clock.label(),
            metrics: SessionMetrics::from_player(&self.player),
            player: self.player.clone(),
            tick_labels: self.history.tick_labels(self.player.clock.start_age()),
            history: self.history.clone(),
            pending_review: self.pending_review().cloned(),
            recent_events: self.events.recent(recent_events).to_vec(),
        }
    }

    // ── Time ───────────────────────────────────────────────────

    /// Advance one month. This is the core simulation step.
    /// Returns the notable events of the tick, in emission order.
    pub fn advance_month(&mut self) -> SimResult<Vec<SimEvent>> {
        self.ensure_running("advance_month")?;

        let tick = self.player.clock.begin_month();
        let label = label_for_tick(self.player.clock.start_age(), tick);
        let mut flows = MonthFlows::default();
        let mut tick_events: Vec<SimEvent> = Vec::new();

        for reg in &mut self.subsystems {
            let new_events =
                reg.subsystem
                    .update(tick, &mut self.player, &mut flows, reg.rng.as_mut())?;
            if !new_events.is_empty() {
                log::debug!(
                    "tick={tick} {} (slot {}) emitted {} event(s)",
                    reg.subsystem.name(),
                    reg.slot.name(),
                    new_events.len()
                );
            }
            tick_events.extend(new_events);
        }

        self.player.clock.end_month();
        self.history.record_month(&self.player, flows.realised_return);

        tick_events.push(SimEvent::MonthClosed {
            tick,
            invested: flows.invested,
            monthly_return: flows.monthly_return,
            dividends: flows.dividends,
            net_worth: self.player.net_worth(),
        });

        if self.player.clock.completed_year() {
            tick_events.push(self.close_year(tick));
        }

        if let Some(event) = self.check_terminal(tick) {
            tick_events.push(event);
        }

        for event in &tick_events {
            self.events.append(tick, label.clone(), event.clone());
        }

        log::debug!(
            "tick={tick} closed: cash={} invested={} basis={} state={}",
            self.player.cash,
            self.player.invested_value,
            self.player.invested_cost_basis,
            self.lifecycle
        );

        Ok(tick_events)
    }

    /// Advance up to `n` months, stopping early when the engine leaves
    /// `Running`. Returns the number of months completed.
    pub fn run_months(&mut self, n: u64) -> SimResult<u64> {
        self.ensure_running("run_months")?;
        let mut completed = 0;
        while completed < n && self.is_running() {
            self.advance_month()?;
            completed += 1;
        }
        Ok(completed)
    }

    pub fn pause(&mut self) -> SimResult<()> {
        self.ensure_running("pause")?;
        self.lifecycle = Lifecycle::Paused { reason: PauseReason::Manual };
        self.emit(SimEvent::Paused { tick: self.tick() });
        Ok(())
    }

    /// Resume after a manual pause. An annual review must be answered
    /// with a decision or a skip instead.
    pub fn resume(&mut self) -> SimResult<()> {
        self.ensure_not_terminated()?;
        if self.lifecycle != (Lifecycle::Paused { reason: PauseReason::Manual }) {
            return Err(self.invalid_in_state("resume"));
        }
        self.lifecycle = Lifecycle::Running;
        self.emit(SimEvent::Resumed { tick: self.tick() });
        Ok(())
    }

    // ── Annual review ──────────────────────────────────────────

    /// Apply a strategy revision and return to `Running`.
    ///
    /// Targets are validated independently; a negative or non-finite target
    /// rejects the whole decision. The withdrawal is clamped into
    /// `[0, invested_value]`.
    pub fn apply_annual_decision(&mut self, decision: AnnualDecision) -> SimResult<DecisionOutcome> {
        self.ensure_awaiting_review("apply_annual_decision")?;

        let invest_target = decision
            .new_monthly_invest_target
            .map(|v| SimError::check_amount("new_monthly_invest_target", v))
            .transpose()?;
        let basic_expense = decision
            .new_basic_expense
            .map(|v| SimError::check_amount("new_basic_expense", v))
            .transpose()?;
        if decision.withdraw_amount.is_nan() {
            return Err(SimError::InvalidParameter {
                field: "withdraw_amount",
                value: decision.withdraw_amount,
            });
        }

        let withdrawn = decision.withdraw_amount.clamp(0.0, self.player.invested_value);
        let outcome = DecisionOutcome {
            withdrawn,
            withdraw_clamped: withdrawn != decision.withdraw_amount,
        };

        self.player.liquidate(withdrawn);
        if let Some(v) = invest_target {
            self.player.monthly_invest_target = v;
        }
        if let Some(v) = basic_expense {
            self.player.monthly_basic_expense = v;
        }
        self.lifecycle = Lifecycle::Running;

        self.emit(SimEvent::AnnualDecisionApplied {
            tick: self.tick(),
            monthly_invest_target: self.player.monthly_invest_target,
            monthly_basic_expense: self.player.monthly_basic_expense,
            withdrawn,
        });
        log::info!("annual decision applied at tick {}: {outcome:?}", self.tick());
        Ok(outcome)
    }

    /// Leave every target unchanged and return to `Running`.
    pub fn skip_annual_decision(&mut self) -> SimResult<()> {
        self.resume_after_annual_review()?;
        self.emit(SimEvent::AnnualDecisionSkipped { tick: self.tick() });
        Ok(())
    }

    /// Clear the annual-review pause without recording a decision.
    pub fn resume_after_annual_review(&mut self) -> SimResult<()> {
        self.ensure_awaiting_review("resume_after_annual_review")?;
        self.lifecycle = Lifecycle::Running;
        log::info!("annual review closed at tick {}", self.tick());
        Ok(())
    }

    // ── Player actions ─────────────────────────────────────────

    /// Move funds from the investment position to cash. Requests above
    /// the invested value are clamped and reported as such.
    pub fn withdraw(&mut self, amount: Money) -> SimResult<Withdrawal> {
        self.ensure_not_terminated()?;
        if !amount.is_finite() || amount <= 0.0 {
            return Err(SimError::InvalidParameter { field: "amount", value: amount });
        }
        let available = self.player.invested_value;
        if available <= 0.0 {
            return Err(SimError::InsufficientFunds { requested: amount, available });
        }

        let withdrawn = amount.min(available);
        self.player.liquidate(withdrawn);
        self.emit(SimEvent::Withdrawal { tick: self.tick(), requested: amount, withdrawn });

        Ok(Withdrawal { requested: amount, withdrawn, clamped: withdrawn < amount })
    }

    pub fn set_monthly_salary(&mut self, value: Money) -> SimResult<()> {
        self.set_parameter(Parameter::MonthlySalary, value)
    }

    pub fn set_monthly_basic_expense(&mut self, value: Money) -> SimResult<()> {
        self.set_parameter(Parameter::MonthlyBasicExpense, value)
    }

    pub fn set_monthly_invest_target(&mut self, value: Money) -> SimResult<()> {
        self.set_parameter(Parameter::MonthlyInvestTarget, value)
    }

    pub fn set_parameter(&mut self, parameter: Parameter, value: Money) -> SimResult<()> {
        self.ensure_not_terminated()?;
        let value = SimError::check_amount(parameter.field_name(), value)?;
        let slot = match parameter {
            Parameter::MonthlySalary => &mut self.player.monthly_salary,
            Parameter::MonthlyBasicExpense => &mut self.player.monthly_basic_expense,
            Parameter::MonthlyInvestTarget => &mut self.player.monthly_invest_target,
        };
        *slot = value;
        self.emit(SimEvent::ParameterChanged { tick: self.tick(), parameter, value });
        Ok(())
    }

    /// Start the session over from the seed position. Random streams keep
    /// running; they are not rewound.
    pub fn reset(&mut self) {
        self.player = self.initial_player.clone();
        self.history = HistorySeries::seeded(&self.player);
        self.reviews.clear();
        self.lifecycle = Lifecycle::Running;
        self.events.clear();
        self.session_id = new_session_id();
        log::info!("session reset: {}", self.session_id);
        self.announce_start();
    }

    // ── Internals ──────────────────────────────────────────────

    fn tick(&self) -> Tick {
        self.player.clock.total_months_elapsed
    }

    fn announce_start(&mut self) {
        self.emit(SimEvent::SessionStarted {
            session_id: self.session_id.clone(),
            start_age: self.player.clock.start_age(),
        });
    }

    /// Append an event outside the tick loop, labelled with the latest tick.
    fn emit(&mut self, event: SimEvent) {
        let label = self.player.clock.label();
        self.events.append(self.tick(), label, event);
    }

    fn close_year(&mut self, tick: Tick) -> SimEvent {
        let summary = AnnualReviewSummary::compute(&self.player, &self.history, &self.config.review);
        self.history.annual_returns.push(AnnualReturn {
            age_years: summary.completed_age,
            compounded_return: summary.compounded_return,
        });
        let event = SimEvent::AnnualReviewReady {
            tick,
            completed_age: summary.completed_age,
            compounded_return: summary.compounded_return,
            net_worth_delta: summary.net_worth_delta,
        };
        log::info!(
            "tick={tick} annual review for age {}: return={:.4} advisories={:?}",
            summary.completed_age,
            summary.compounded_return,
            summary.advisories
        );
        self.reviews.push(summary);
        self.lifecycle = Lifecycle::Paused { reason: PauseReason::AnnualReview };
        event
    }

    fn check_terminal(&mut self, tick: Tick) -> Option<SimEvent> {
        let net_worth = self.player.net_worth();
        let (outcome, event) = if net_worth >= self.player.fire_target_net_worth {
            (
                Outcome::Success,
                SimEvent::FireAchieved { tick, age: self.player.clock.age_years, net_worth },
            )
        } else if self.player.is_insolvent() {
            (Outcome::Insolvent, SimEvent::Insolvent { tick, cash: self.player.cash })
        } else {
            return None;
        };
        self.lifecycle = Lifecycle::Terminated { outcome };
        log::info!("tick={tick} session terminated: {outcome:?} net_worth={net_worth}");
        Some(event)
    }

    fn ensure_not_terminated(&self) -> SimResult<()> {
        match self.lifecycle {
            Lifecycle::Terminated { outcome } => Err(SimError::AlreadyTerminated { outcome }),
            _ => Ok(()),
        }
    }

    fn ensure_running(&self, operation: &'static str) -> SimResult<()> {
        self.ensure_not_terminated()?;
        if self.lifecycle != Lifecycle::Running {
            return Err(self.invalid_in_state(operation));
        }
        Ok(())
    }

    fn ensure_awaiting_review(&self, operation: &'static str) -> SimResult<()> {
        self.ensure_not_terminated()?;
        if self.lifecycle != (Lifecycle::Paused { reason: PauseReason::AnnualReview }) {
            return Err(self.invalid_in_state(operation));
        }
        Ok(())
    }

    fn invalid_in_state(&self, operation: &'static str) -> SimError {
        log::warn!("rejected '{operation}' while {}", self.lifecycle);
        SimError::InvalidOperationInState { operation, state: self.lifecycle.to_string() }
    }
}

fn initial_player(config: &SimConfig) -> PlayerState {
    let seed = &config.player;
    PlayerState {
        clock: SimClock::new(seed.start_age),
        cash: seed.cash,
        invested_value: seed.invested_value,
        invested_cost_basis: seed.invested_cost_basis,
        total_contributed: seed.invested_cost_basis,
        total_withdrawn: 0.0,
        monthly_salary: seed.monthly_salary,
        monthly_basic_expense: seed.monthly_basic_expense,
        monthly_invest_target: seed.monthly_invest_target,
        retirement_age_years: seed.retirement_age_years,
        fire_target_net_worth: seed.fire_target_net_worth,
    }
}
