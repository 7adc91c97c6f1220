//! Portfolio subsystem — monthly income, contribution, return and dividend.
//!
//! Reads the salary and expense as left by the payroll subsystem this tick.

use crate::{
    config::{ContributionTiming, EconomyPolicy},
    error::SimResult,
    event::SimEvent,
    market::HistoricalReturnTable,
    rng::RandomSource,
    state::PlayerState,
    subsystem::{MonthFlows, SimSubsystem},
    types::{Money, Tick},
};

pub struct PortfolioSubsystem {
    policy: EconomyPolicy,
    returns: HistoricalReturnTable,
}

impl PortfolioSubsystem {
    pub fn new(policy: EconomyPolicy, returns: HistoricalReturnTable) -> Self {
        Self { policy, returns }
    }

    /// Contribution actually made this month: the target, capped by what is
    /// affordable after income and fixed expense, never negative.
    pub fn affordable_contribution(player: &PlayerState) -> Money {
        let available = player.cash + player.monthly_salary - player.monthly_basic_expense;
        player.monthly_invest_target.min(available).max(0.0)
    }
}

impl SimSubsystem for PortfolioSubsystem {
    fn name(&self) -> &'static str { "portfolio" }

    fn update(
        &mut self,
        tick: Tick,
        player: &mut PlayerState,
        flows: &mut MonthFlows,
        rng: &mut dyn RandomSource,
    ) -> SimResult<Vec<SimEvent>> {
        let invest = Self::affordable_contribution(player);
        let monthly_return = self.returns.sample(rng);

        let earning_base = match self.policy.contribution_timing {
            ContributionTiming::StartOfMonth => player.invested_value + invest,
            ContributionTiming::EndOfMonth => player.invested_value,
        };
        let investment_return = (earning_base * monthly_return).floor();
        let dividends = (earning_base * self.policy.dividend_rate).floor();

        player.cash += player.monthly_salary - player.monthly_basic_expense - invest;
        player.invested_value =
            (player.invested_value + invest + investment_return + dividends).max(0.0);
        player.add_principal(invest);

        flows.invested = invest;
        flows.monthly_return = monthly_return;
        flows.realised_return = if earning_base > 0.0 { monthly_return } else { 0.0 };
        flows.investment_return = investment_return;
        flows.dividends = dividends;

        log::debug!(
            "tick={tick} portfolio: invest={invest} return={monthly_return:.4} gain={investment_return} div={dividends}"
        );

        // The month summary is emitted by the engine once the tick closes.
        Ok(Vec::new())
    }
}
