//! Payroll subsystem — inflation, raises and the year-end bonus.
//!
//! Fully deterministic; it never draws from its random source.

use crate::{
    config::EconomyPolicy,
    error::SimResult,
    event::SimEvent,
    rng::RandomSource,
    state::PlayerState,
    subsystem::{MonthFlows, SimSubsystem},
    types::Tick,
};

pub struct PayrollSubsystem {
    policy: EconomyPolicy,
}

impl PayrollSubsystem {
    pub fn new(policy: EconomyPolicy) -> Self {
        Self { policy }
    }
}

impl SimSubsystem for PayrollSubsystem {
    fn name(&self) -> &'static str { "payroll" }

    fn update(
        &mut self,
        tick: Tick,
        player: &mut PlayerState,
        flows: &mut MonthFlows,
        _rng: &mut dyn RandomSource,
    ) -> SimResult<Vec<SimEvent>> {
        let mut events = Vec::new();

        if player.clock.is_new_age_year() {
            player.monthly_basic_expense =
                (player.monthly_basic_expense * (1.0 + self.policy.inflation_rate)).floor();
            events.push(SimEvent::InflationApplied {
                tick,
                rate: self.policy.inflation_rate,
                new_basic_expense: player.monthly_basic_expense,
            });

            player.monthly_salary =
                (player.monthly_salary * (1.0 + self.policy.raise_rate)).floor();
            events.push(SimEvent::SalaryRaised {
                tick,
                rate: self.policy.raise_rate,
                new_salary: player.monthly_salary,
            });

            log::debug!(
                "tick={tick} payroll: expense={} salary={}",
                player.monthly_basic_expense,
                player.monthly_salary
            );
        }

        if player.clock.is_year_end() {
            let bonus = (player.monthly_salary * self.policy.bonus_multiple).floor();
            player.cash += bonus;
            flows.bonus = bonus;
            events.push(SimEvent::BonusPaid { tick, amount: bonus });
            log::debug!("tick={tick} payroll: bonus={bonus}");
        }

        Ok(events)
    }
}
