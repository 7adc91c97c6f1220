//! Annual review — aggregation over each completed 12-month block.
//!
//! Runs once per 12 ticks, right after the calendar rolls into a new
//! age-year. The engine then pauses until the collaborator applies or
//! skips an `AnnualDecision`.

use crate::{
    config::ReviewThresholds,
    state::{HistorySeries, PlayerState},
    types::{Money, Tick, MONTHS_PER_YEAR},
};
use serde::{Deserialize, Serialize};

/// `∏(1 + r) − 1` over the given monthly returns.
pub fn compounded_return(monthly_returns: &[f64]) -> f64 {
    monthly_returns.iter().fold(1.0, |acc, r| acc * (1.0 + r)) - 1.0
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AdvisoryTag {
    Underperformance,
    StrongPerformance,
    LowReserve,
    LargeDrawdown,
    Underinvested,
    Overconcentrated,
    ShouldInvest,
    OnTrack,
}

impl AdvisoryTag {
    pub fn message(&self) -> &'static str {
        match self {
            Self::Underperformance => "Net worth fell sharply this year; revisit your strategy",
            Self::StrongPerformance => "Strong year; consider locking in part of the gains",
            Self::LowReserve => "Cash reserve is thin; keep an emergency fund",
            Self::LargeDrawdown => "Investments are deep under water; avoid panic selling",
            Self::Underinvested => "Most of your net worth sits in cash; consider investing more",
            Self::Overconcentrated => "Almost everything is invested; keep some cash on hand",
            Self::ShouldInvest => "You have idle cash and no investments; start investing",
            Self::OnTrack => "On track; keep going",
        }
    }
}

/// Aggregated performance for one completed age-year.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnnualReviewSummary {
    pub tick: Tick,
    pub completed_age: u32,
    pub compounded_return: f64,
    pub net_worth_start: Money,
    pub net_worth_end: Money,
    pub net_worth_delta: Money,
    /// Delta over the starting net worth; 0 when that was not positive.
    pub net_worth_growth_rate: f64,
    pub cash: Money,
    pub invested_value: Money,
    pub invested_cost_basis: Money,
    pub invested_profit: Money,
    pub invested_profit_rate: f64,
    pub invested_ratio: f64,
    pub fire_progress_pct: f64,
    pub advisories: Vec<AdvisoryTag>,
}

impl AnnualReviewSummary {
    /// Build the summary from the state right after the year closed.
    pub fn compute(
        player: &PlayerState,
        history: &HistorySeries,
        thresholds: &ReviewThresholds,
    ) -> Self {
        let year = MONTHS_PER_YEAR as usize;
        let net_worth_end = player.net_worth();
        let net_worth_start = history.net_worth_months_ago(year).unwrap_or(net_worth_end);
        let net_worth_delta = net_worth_end - net_worth_start;
        let net_worth_growth_rate = if net_worth_start > 0.0 {
            net_worth_delta / net_worth_start
        } else {
            0.0
        };

        let mut summary = Self {
            tick: player.clock.total_months_elapsed,
            completed_age: player.clock.age_years.saturating_sub(1),
            compounded_return: compounded_return(history.trailing_returns(year)),
            net_worth_start,
            net_worth_end,
            net_worth_delta,
            net_worth_growth_rate,
            cash: player.cash,
            invested_value: player.invested_value,
            invested_cost_basis: player.invested_cost_basis,
            invested_profit: player.invested_profit(),
            invested_profit_rate: player.invested_profit_rate(),
            invested_ratio: player.invested_ratio(),
            fire_progress_pct: player.fire_progress() * 100.0,
            advisories: Vec::new(),
        };
        summary.advisories = derive_advisories(&summary, thresholds);
        summary
    }

    pub fn is_invested(&self) -> bool {
        self.invested_value > 0.0
    }
}

/// Advisory tags for a summary. Pure; any renderer may re-derive them.
pub fn derive_advisories(
    summary: &AnnualReviewSummary,
    thresholds: &ReviewThresholds,
) -> Vec<AdvisoryTag> {
    let mut tags = Vec::new();

    if summary.net_worth_growth_rate < thresholds.underperformance_growth_rate {
        tags.push(AdvisoryTag::Underperformance);
    } else if summary.net_worth_growth_rate > thresholds.strong_growth_rate {
        tags.push(AdvisoryTag::StrongPerformance);
    }

    if summary.cash < thresholds.low_reserve_cash {
        tags.push(AdvisoryTag::LowReserve);
    }

    if summary.is_invested() {
        if summary.invested_profit_rate < thresholds.large_drawdown_profit_rate {
            tags.push(AdvisoryTag::LargeDrawdown);
        }
        if summary.invested_ratio < thresholds.underinvested_ratio {
            tags.push(AdvisoryTag::Underinvested);
        } else if summary.invested_ratio > thresholds.overconcentrated_ratio {
            tags.push(AdvisoryTag::Overconcentrated);
        }
    } else if summary.cash > thresholds.idle_cash_threshold {
        tags.push(AdvisoryTag::ShouldInvest);
    }

    if tags.is_empty() {
        tags.push(AdvisoryTag::OnTrack);
    }
    tags
}

/// Strategy revision submitted in answer to an annual review.
/// `None` leaves the corresponding target unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AnnualDecision {
    #[serde(default)]
    pub new_monthly_invest_target: Option<Money>,
    #[serde(default)]
    pub new_basic_expense: Option<Money>,
    #[serde(default)]
    pub withdraw_amount: Money,
}

/// What an applied decision actually did.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct DecisionOutcome {
    pub withdrawn: Money,
    /// True when `withdraw_amount` was outside `[0, invested_value]`.
    pub withdraw_clamped: bool,
}
