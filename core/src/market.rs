//! Static market tables: the empirical return pool and the shock catalog.
//! Both are immutable for the lifetime of a session.

use crate::rng::RandomSource;
use serde::{Deserialize, Serialize};

/// Monthly return samples modelled on a global equity index fund.
pub const DEFAULT_HISTORICAL_RETURNS: [f64; 32] = [
    0.0312, -0.0189, 0.0245, -0.0078, 0.0156, -0.0234, 0.0189, 0.0067,
    -0.0145, 0.0298, 0.0087, -0.0056, 0.0223, -0.0112, 0.0345, -0.0423,
    0.0198, 0.0134, -0.0089, 0.0267, -0.0034, 0.0156, 0.0089, -0.0198,
    0.0412, -0.0567, 0.0234, 0.0178, -0.0023, 0.0145, 0.0089, -0.0134,
];

/// Resampling pool of monthly returns. Draws are uniform with replacement,
/// never a sequential walk.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct HistoricalReturnTable {
    samples: Vec<f64>,
}

impl HistoricalReturnTable {
    pub fn new(samples: Vec<f64>) -> Self {
        Self { samples }
    }

    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Draw one monthly return. The table must be non-empty (checked by
    /// `SimConfig::validate`).
    pub fn sample(&self, rng: &mut dyn RandomSource) -> f64 {
        self.samples[rng.next_index(self.samples.len())]
    }
}

impl Default for HistoricalReturnTable {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORICAL_RETURNS.to_vec())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MarketEventKind {
    Crash,
    Correction,
    Bull,
    BlackSwan,
}

/// One entry of the market shock catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MarketEventDefinition {
    /// Annualised probability; the per-tick trial uses `/ 12`.
    pub monthly_probability: f64,
    pub kind: MarketEventKind,
    pub name: String,
    /// Signed fraction of invested value, e.g. -0.30 for a 30% crash.
    pub percent_impact: f64,
    pub description: String,
}

pub fn default_market_events() -> Vec<MarketEventDefinition> {
    vec![
        MarketEventDefinition {
            monthly_probability: 0.05,
            kind: MarketEventKind::Crash,
            name: "Market crash".into(),
            percent_impact: -0.30,
            description: "Global financial crisis!".into(),
        },
        MarketEventDefinition {
            monthly_probability: 0.10,
            kind: MarketEventKind::Correction,
            name: "Market correction".into(),
            percent_impact: -0.15,
            description: "The market enters a correction".into(),
        },
        MarketEventDefinition {
            monthly_probability: 0.15,
            kind: MarketEventKind::Bull,
            name: "Bull market".into(),
            percent_impact: 0.20,
            description: "A bull market arrives! Investments surge".into(),
        },
        MarketEventDefinition {
            monthly_probability: 0.03,
            kind: MarketEventKind::BlackSwan,
            name: "Black swan".into(),
            percent_impact: -0.40,
            description: "A black swan event strikes!".into(),
        },
    ]
}
