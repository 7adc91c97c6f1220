//! Notable events — the engine's outward feed.
//!
//! RULE: Every policy action the engine takes is described by exactly
//! one event. Events are data; rendering them is the collaborator's job.

use crate::{
    format::{format_money, format_percent},
    market::MarketEventKind,
    types::{Money, SessionId, Tick},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warning,
    Milestone,
}

/// User-editable monthly parameters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Parameter {
    MonthlySalary,
    MonthlyBasicExpense,
    MonthlyInvestTarget,
}

impl Parameter {
    pub fn field_name(&self) -> &'static str {
        match self {
            Self::MonthlySalary => "monthly_salary",
            Self::MonthlyBasicExpense => "monthly_basic_expense",
            Self::MonthlyInvestTarget => "monthly_invest_target",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Self::MonthlySalary => "Salary",
            Self::MonthlyBasicExpense => "Basic expense",
            Self::MonthlyInvestTarget => "Monthly investment",
        }
    }
}

/// Every event emitted during a session.
/// Variants may be added — never removed or reordered.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SimEvent {
    // ── Session events ─────────────────────────────
    SessionStarted {
        session_id: SessionId,
        start_age: u32,
    },
    Paused {
        tick: Tick,
    },
    Resumed {
        tick: Tick,
    },

    // ── Payroll events ─────────────────────────────
    InflationApplied {
        tick: Tick,
        rate: f64,
        new_basic_expense: Money,
    },
    SalaryRaised {
        tick: Tick,
        rate: f64,
        new_salary: Money,
    },
    BonusPaid {
        tick: Tick,
        amount: Money,
    },

    // ── Portfolio events ───────────────────────────
    MonthClosed {
        tick: Tick,
        invested: Money,
        monthly_return: f64,
        dividends: Money,
        net_worth: Money,
    },
    MarketShock {
        tick: Tick,
        kind: MarketEventKind,
        name: String,
        description: String,
        percent_impact: f64,
        impact: Money,
    },

    // ── Annual review ──────────────────────────────
    AnnualReviewReady {
        tick: Tick,
        completed_age: u32,
        compounded_return: f64,
        net_worth_delta: Money,
    },
    AnnualDecisionApplied {
        tick: Tick,
        monthly_invest_target: Money,
        monthly_basic_expense: Money,
        withdrawn: Money,
    },
    AnnualDecisionSkipped {
        tick: Tick,
    },

    // ── Player actions ─────────────────────────────
    Withdrawal {
        tick: Tick,
        requested: Money,
        withdrawn: Money,
    },
    ParameterChanged {
        tick: Tick,
        parameter: Parameter,
        value: Money,
    },

    // ── Terminal conditions ────────────────────────
    FireAchieved {
        tick: Tick,
        age: u32,
        net_worth: Money,
    },
    Insolvent {
        tick: Tick,
        cash: Money,
    },
}

impl SimEvent {
    /// Stable string name of the variant.
    pub fn type_name(&self) -> &'static str {
        match self {
            SimEvent::SessionStarted { .. }        => "session_started",
            SimEvent::Paused { .. }                => "paused",
            SimEvent::Resumed { .. }               => "resumed",
            SimEvent::InflationApplied { .. }      => "inflation_applied",
            SimEvent::SalaryRaised { .. }          => "salary_raised",
            SimEvent::BonusPaid { .. }             => "bonus_paid",
            SimEvent::MonthClosed { .. }           => "month_closed",
            SimEvent::MarketShock { .. }           => "market_shock",
            SimEvent::AnnualReviewReady { .. }     => "annual_review_ready",
            SimEvent::AnnualDecisionApplied { .. } => "annual_decision_applied",
            SimEvent::AnnualDecisionSkipped { .. } => "annual_decision_skipped",
            SimEvent::Withdrawal { .. }            => "withdrawal",
            SimEvent::ParameterChanged { .. }      => "parameter_changed",
            SimEvent::FireAchieved { .. }          => "fire_achieved",
            SimEvent::Insolvent { .. }             => "insolvent",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            SimEvent::InflationApplied { .. } | SimEvent::Insolvent { .. } => Severity::Warning,
            SimEvent::BonusPaid { .. }
            | SimEvent::MarketShock { .. }
            | SimEvent::AnnualReviewReady { .. }
            | SimEvent::Withdrawal { .. }
            | SimEvent::FireAchieved { .. } => Severity::Milestone,
            _ => Severity::Info,
        }
    }

    /// Human-readable one-line description.
    pub fn describe(&self) -> String {
        match self {
            SimEvent::SessionStarted { start_age, .. } => {
                format!("Simulation started at age {start_age}")
            }
            SimEvent::Paused { .. } => "Time paused".to_string(),
            SimEvent::Resumed { .. } => "Time resumed".to_string(),
            SimEvent::InflationApplied { rate, new_basic_expense, .. } => format!(
                "Inflation: basic expense up {} to {}",
                format_percent(*rate),
                format_money(*new_basic_expense)
            ),
            SimEvent::SalaryRaised { rate, new_salary, .. } => format!(
                "Annual raise {} to {}",
                format_percent(*rate),
                format_money(*new_salary)
            ),
            SimEvent::BonusPaid { amount, .. } => {
                format!("Year-end bonus {}", format_money(*amount))
            }
            SimEvent::MonthClosed { invested, monthly_return, net_worth, .. } => format!(
                "Invested {}, return {}, net worth {}",
                format_money(*invested),
                format_percent(*monthly_return),
                format_money(*net_worth)
            ),
            SimEvent::MarketShock { name, description, impact, .. } => {
                let direction = if *impact >= 0.0 { "gain" } else { "loss" };
                format!(
                    "{name}: {description} Investment {direction} {}",
                    format_money(impact.abs())
                )
            }
            SimEvent::AnnualReviewReady { completed_age, compounded_return, net_worth_delta, .. } => {
                format!(
                    "Annual review for age {completed_age}: return {}, net worth change {}",
                    format_percent(*compounded_return),
                    format_money(*net_worth_delta)
                )
            }
            SimEvent::AnnualDecisionApplied {
                monthly_invest_target,
                monthly_basic_expense,
                withdrawn,
                ..
            } => format!(
                "Annual decision: invest {} / month, expense {} / month, withdrew {}",
                format_money(*monthly_invest_target),
                format_money(*monthly_basic_expense),
                format_money(*withdrawn)
            ),
            SimEvent::AnnualDecisionSkipped { .. } => {
                "Annual review skipped, strategy unchanged".to_string()
            }
            SimEvent::Withdrawal { withdrawn, .. } => {
                format!("Withdrew {} from investments", format_money(*withdrawn))
            }
            SimEvent::ParameterChanged { parameter, value, .. } => {
                format!("{} set to {}", parameter.label(), format_money(*value))
            }
            SimEvent::FireAchieved { age, net_worth, .. } => format!(
                "FIRE target reached at age {age}! Net worth {}",
                format_money(*net_worth)
            ),
            SimEvent::Insolvent { cash, .. } => format!(
                "Insolvent: cash {} with nothing invested. Adjust your strategy",
                format_money(*cash)
            ),
        }
    }
}

/// A notable event as stored in the session feed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EventLogEntry {
    /// Monotonic within a session, starting at 1.
    pub id: u64,
    pub tick: Tick,
    /// Calendar label at emission time, e.g. `26y1m`.
    pub label: String,
    pub severity: Severity,
    pub text: String,
    pub event: SimEvent,
}
