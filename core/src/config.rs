use crate::{
    error::{SimError, SimResult},
    market::{default_market_events, HistoricalReturnTable, MarketEventDefinition},
    types::{Money, Tick},
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

/// Initial position of the player at session start.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlayerSeed {
    pub start_age: u32,
    pub cash: Money,
    #[serde(default)]
    pub invested_value: Money,
    #[serde(default)]
    pub invested_cost_basis: Money,
    pub monthly_salary: Money,
    pub monthly_basic_expense: Money,
    #[serde(default)]
    pub monthly_invest_target: Money,
    pub retirement_age_years: u32,
    pub fire_target_net_worth: Money,
}

impl Default for PlayerSeed {
    fn default() -> Self {
        Self {
            start_age: 25,
            cash: 200_000.0,
            invested_value: 0.0,
            invested_cost_basis: 0.0,
            monthly_salary: 30_000.0,
            monthly_basic_expense: 15_000.0,
            monthly_invest_target: 0.0,
            retirement_age_years: 65,
            fire_target_net_worth: 10_000_000.0,
        }
    }
}

/// When the month's contribution starts earning the sampled return.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ContributionTiming {
    /// Return and dividend apply to the opening position plus this
    /// month's contribution.
    #[default]
    StartOfMonth,
    /// Return and dividend apply to the opening position only.
    EndOfMonth,
}

/// Deterministic income, expense and portfolio policy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EconomyPolicy {
    /// Applied to the basic expense at each new age-year.
    pub inflation_rate: f64,
    /// Applied to the salary at each new age-year.
    pub raise_rate: f64,
    /// Year-end bonus as a fixed multiple of the monthly salary.
    pub bonus_multiple: f64,
    /// Monthly dividend yield on invested value.
    pub dividend_rate: f64,
    /// Market events are trialled on ticks divisible by this.
    pub market_event_interval: Tick,
    #[serde(default)]
    pub contribution_timing: ContributionTiming,
}

impl Default for EconomyPolicy {
    fn default() -> Self {
        Self {
            inflation_rate: 0.03,
            raise_rate: 0.03,
            bonus_multiple: 1.5,
            dividend_rate: 0.002,
            market_event_interval: 3,
            contribution_timing: ContributionTiming::StartOfMonth,
        }
    }
}

/// Thresholds for the annual review advisories.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReviewThresholds {
    /// Net-worth growth rate below which the year underperformed.
    pub underperformance_growth_rate: f64,
    /// Net-worth growth rate above which the year was strong.
    pub strong_growth_rate: f64,
    /// Cash below this is a thin reserve.
    pub low_reserve_cash: Money,
    /// Profit rate below this is a large drawdown.
    pub large_drawdown_profit_rate: f64,
    pub underinvested_ratio: f64,
    pub overconcentrated_ratio: f64,
    /// Uninvested cash above this should be put to work.
    pub idle_cash_threshold: Money,
}

impl Default for ReviewThresholds {
    fn default() -> Self {
        Self {
            underperformance_growth_rate: -0.10,
            strong_growth_rate: 0.20,
            low_reserve_cash: 50_000.0,
            large_drawdown_profit_rate: -0.15,
            underinvested_ratio: 0.30,
            overconcentrated_ratio: 0.80,
            idle_cash_threshold: 500_000.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct MarketEventsFile {
    events: Vec<MarketEventDefinition>,
}

#[derive(Debug, Clone, Deserialize)]
struct HistoricalReturnsFile {
    monthly_returns: Vec<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimConfig {
    pub player: PlayerSeed,
    pub economy: EconomyPolicy,
    pub historical_returns: HistoricalReturnTable,
    pub market_events: Vec<MarketEventDefinition>,
    pub review: ReviewThresholds,
}

impl Default for SimConfig {
    /// Built-in tables; identical to the shipped data/ directory.
    fn default() -> Self {
        Self {
            player: PlayerSeed::default(),
            economy: EconomyPolicy::default(),
            historical_returns: HistoricalReturnTable::default(),
            market_events: default_market_events(),
            review: ReviewThresholds::default(),
        }
    }
}

fn read_table<T: DeserializeOwned>(path: &str) -> anyhow::Result<T> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
    serde_json::from_str(&content).map_err(|e| anyhow::anyhow!("Cannot parse {path}: {e}"))
}

impl SimConfig {
    /// Load from the data/ directory.
    /// In tests, use SimConfig::default_test().
    pub fn load(data_dir: &str) -> anyhow::Result<Self> {
        let player: PlayerSeed = read_table(&format!("{data_dir}/player/initial_state.json"))?;
        let economy: EconomyPolicy = read_table(&format!("{data_dir}/economy/policy.json"))?;

        let returns_file: HistoricalReturnsFile =
            read_table(&format!("{data_dir}/market/historical_returns.json"))?;
        let events_file: MarketEventsFile =
            read_table(&format!("{data_dir}/market/market_events.json"))?;

        let review: ReviewThresholds = read_table(&format!("{data_dir}/review/thresholds.json"))?;

        let config = Self {
            player,
            economy,
            historical_returns: HistoricalReturnTable::new(returns_file.monthly_returns),
            market_events: events_file.events,
            review,
        };
        config.validate()?;
        log::info!(
            "Loaded config from {data_dir}: {} return samples, {} market events",
            config.historical_returns.len(),
            config.market_events.len()
        );
        Ok(config)
    }

    /// Config with hardcoded defaults for use in unit tests.
    /// A single 1% return sample and no market events, so every run is
    /// fully predictable.
    pub fn default_test() -> Self {
        Self {
            player: PlayerSeed::default(),
            economy: EconomyPolicy::default(),
            historical_returns: HistoricalReturnTable::new(vec![0.01]),
            market_events: Vec::new(),
            review: ReviewThresholds::default(),
        }
    }

    pub fn with_player(mut self, player: PlayerSeed) -> Self {
        self.player = player;
        self
    }

    pub fn with_returns(mut self, samples: Vec<f64>) -> Self {
        self.historical_returns = HistoricalReturnTable::new(samples);
        self
    }

    pub fn with_market_events(mut self, events: Vec<MarketEventDefinition>) -> Self {
        self.market_events = events;
        self
    }

    pub fn validate(&self) -> SimResult<()> {
        if self.historical_returns.is_empty() {
            return Err(SimError::InvalidConfig("historical return table is empty".into()));
        }
        if let Some(r) = self.historical_returns.samples().iter().find(|r| !r.is_finite() || **r <= -1.0) {
            return Err(SimError::InvalidConfig(format!("invalid monthly return sample {r}")));
        }
        for event in &self.market_events {
            if !(0.0..=1.0).contains(&event.monthly_probability) {
                return Err(SimError::InvalidConfig(format!(
                    "market event '{}' probability {} outside [0, 1]",
                    event.name, event.monthly_probability
                )));
            }
            if !event.percent_impact.is_finite() || event.percent_impact < -1.0 {
                return Err(SimError::InvalidConfig(format!(
                    "market event '{}' impact {} would wipe out more than the position",
                    event.name, event.percent_impact
                )));
            }
        }
        if self.economy.market_event_interval == 0 {
            return Err(SimError::InvalidConfig("market_event_interval must be > 0".into()));
        }
        let seed = &self.player;
        for (field, value) in [
            ("invested_value", seed.invested_value),
            ("invested_cost_basis", seed.invested_cost_basis),
            ("monthly_salary", seed.monthly_salary),
            ("monthly_basic_expense", seed.monthly_basic_expense),
            ("monthly_invest_target", seed.monthly_invest_target),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(SimError::InvalidConfig(format!("player.{field} must be >= 0, got {value}")));
            }
        }
        if !seed.cash.is_finite() {
            return Err(SimError::InvalidConfig("player.cash must be finite".into()));
        }
        Ok(())
    }
}
