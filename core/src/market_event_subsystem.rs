//! Market event subsystem — discrete shocks to the invested position.
//!
//! Execution: every `market_event_interval` ticks (quarterly by default).
//! Each catalog entry is trialled independently, so several shocks can
//! land on the same tick. Probabilities are annualised; the trial uses
//! `probability / 12`.

use crate::{
    error::SimResult,
    event::SimEvent,
    market::MarketEventDefinition,
    rng::RandomSource,
    state::PlayerState,
    subsystem::{MonthFlows, SimSubsystem},
    types::{Tick, MONTHS_PER_YEAR},
};

pub struct MarketEventSubsystem {
    catalog: Vec<MarketEventDefinition>,
    interval: Tick,
}

impl MarketEventSubsystem {
    pub fn new(catalog: Vec<MarketEventDefinition>, interval: Tick) -> Self {
        Self { catalog, interval }
    }
}

impl SimSubsystem for MarketEventSubsystem {
    fn name(&self) -> &'static str { "market_events" }

    fn update(
        &mut self,
        tick: Tick,
        player: &mut PlayerState,
        flows: &mut MonthFlows,
        rng: &mut dyn RandomSource,
    ) -> SimResult<Vec<SimEvent>> {
        if tick % self.interval != 0 {
            return Ok(vec![]);
        }

        let mut events = Vec::new();
        for def in &self.catalog {
            if !rng.chance(def.monthly_probability / MONTHS_PER_YEAR as f64) {
                continue;
            }
            // Fires even with nothing invested; the impact is then zero.
            let impact = (player.invested_value * def.percent_impact).floor();
            player.invested_value = (player.invested_value + impact).max(0.0);
            flows.market_impact += impact;

            log::debug!("tick={tick} market: {:?} impact={impact}", def.kind);

            events.push(SimEvent::MarketShock {
                tick,
                kind: def.kind,
                name: def.name.clone(),
                description: def.description.clone(),
                percent_impact: def.percent_impact,
                impact,
            });
        }
        Ok(events)
    }
}
