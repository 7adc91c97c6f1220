//! Player financial position and the append-only history series.

use crate::{
    clock::{label_for_tick, SimClock},
    types::{Money, Tick},
};
use serde::{Deserialize, Serialize};

/// The mutable financial position of the simulated individual.
/// Mutated only by the engine and its subsystems.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlayerState {
    pub clock: SimClock,
    /// Liquid funds. May go negative; insolvency is checked every tick.
    pub cash: Money,
    pub invested_value: Money,
    /// Principal contributed, net of withdrawals. Never negative.
    pub invested_cost_basis: Money,
    /// Cumulative contributions, including any seed position.
    pub total_contributed: Money,
    pub total_withdrawn: Money,
    pub monthly_salary: Money,
    pub monthly_basic_expense: Money,
    pub monthly_invest_target: Money,
    pub retirement_age_years: u32,
    pub fire_target_net_worth: Money,
}

impl PlayerState {
    pub fn net_worth(&self) -> Money {
        self.cash + self.invested_value
    }

    pub fn invested_profit(&self) -> Money {
        self.invested_value - self.invested_cost_basis
    }

    /// Unrealised profit over cost basis; 0 when nothing is invested.
    pub fn invested_profit_rate(&self) -> f64 {
        if self.invested_cost_basis > 0.0 {
            self.invested_profit() / self.invested_cost_basis
        } else {
            0.0
        }
    }

    /// Planned monthly surplus after expenses and the invest target.
    pub fn monthly_cash_flow(&self) -> Money {
        self.monthly_salary - self.monthly_basic_expense - self.monthly_invest_target
    }

    /// Net worth as a fraction of the FIRE target.
    pub fn fire_progress(&self) -> f64 {
        if self.fire_target_net_worth > 0.0 {
            self.net_worth() / self.fire_target_net_worth
        } else {
            0.0
        }
    }

    pub fn years_to_retirement(&self) -> i64 {
        self.retirement_age_years as i64 - self.clock.age_years as i64
    }

    /// Share of net worth held in the investment position.
    pub fn invested_ratio(&self) -> f64 {
        let net_worth = self.net_worth();
        if net_worth > 0.0 {
            self.invested_value / net_worth
        } else {
            0.0
        }
    }

    pub fn is_insolvent(&self) -> bool {
        self.cash < 0.0 && self.invested_value <= 0.0
    }

    /// Principal still at work: contributions net of withdrawals, floored at 0.
    pub fn net_contributions(&self) -> Money {
        (self.total_contributed - self.total_withdrawn).max(0.0)
    }

    /// Book `amount` of new principal. After profits have been withdrawn,
    /// net contributions can sit below the new basis; the basis is capped
    /// there so it never exceeds what was put in net of what came out.
    pub(crate) fn add_principal(&mut self, amount: Money) {
        self.total_contributed += amount;
        self.invested_cost_basis =
            (self.invested_cost_basis + amount).min(self.net_contributions());
    }

    /// Move `amount` (already validated, `<= invested_value`) from the
    /// investment position to cash. Cost basis shrinks by the withdrawn
    /// share and never exceeds net contributions.
    pub(crate) fn liquidate(&mut self, amount: Money) {
        if amount <= 0.0 || self.invested_value <= 0.0 {
            return;
        }
        let share = (amount / self.invested_value).min(1.0);
        self.invested_value -= amount;
        self.cash += amount;
        self.total_withdrawn += amount;
        self.invested_cost_basis = (self.invested_cost_basis * (1.0 - share))
            .min(self.net_contributions())
            .max(0.0);
        if self.invested_value <= 0.0 {
            self.invested_value = 0.0;
            self.invested_cost_basis = 0.0;
        }
    }
}

/// Compounded return for one completed age-year.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct AnnualReturn {
    pub age_years: u32,
    pub compounded_return: f64,
}

/// Append-only time series: one seed entry at tick 0, then one per month.
/// Per-tick vectors are always equal length and index-aligned; the seed
/// entry's realised return is 0.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct HistorySeries {
    pub net_worth_by_tick: Vec<Money>,
    pub invested_value_by_tick: Vec<Money>,
    pub tick_index: Vec<Tick>,
    pub monthly_return_by_tick: Vec<f64>,
    pub annual_returns: Vec<AnnualReturn>,
}

impl HistorySeries {
    /// History seeded with the session-start position at tick 0.
    pub fn seeded(player: &PlayerState) -> Self {
        Self {
            net_worth_by_tick: vec![player.net_worth()],
            invested_value_by_tick: vec![player.invested_value],
            tick_index: vec![player.clock.total_months_elapsed],
            monthly_return_by_tick: vec![0.0],
            annual_returns: Vec::new(),
        }
    }

    pub(crate) fn record_month(&mut self, player: &PlayerState, realised_return: f64) {
        self.net_worth_by_tick.push(player.net_worth());
        self.invested_value_by_tick.push(player.invested_value);
        self.tick_index.push(player.clock.total_months_elapsed);
        self.monthly_return_by_tick.push(realised_return);
    }

    pub fn len(&self) -> usize {
        self.tick_index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tick_index.is_empty()
    }

    pub fn latest_net_worth(&self) -> Option<Money> {
        self.net_worth_by_tick.last().copied()
    }

    /// Net worth recorded `months` entries before the latest one, or the
    /// session-start value when the history is shorter than that.
    pub fn net_worth_months_ago(&self, months: usize) -> Option<Money> {
        let last = self.net_worth_by_tick.len().checked_sub(1)?;
        self.net_worth_by_tick.get(last.saturating_sub(months)).copied()
    }

    /// The trailing `n` realised monthly returns, excluding the seed entry.
    pub fn trailing_returns(&self, n: usize) -> &[f64] {
        let recorded = &self.monthly_return_by_tick[1.min(self.monthly_return_by_tick.len())..];
        &recorded[recorded.len().saturating_sub(n)..]
    }

    /// Chart-style labels for every recorded tick.
    pub fn tick_labels(&self, start_age: u32) -> Vec<String> {
        self.tick_index
            .iter()
            .map(|&tick| label_for_tick(start_age, tick))
            .collect()
    }
}
