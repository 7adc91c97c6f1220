//! Session snapshot — the read model handed to rendering collaborators.
//!
//! A snapshot is a point-in-time copy; it is never fed back into the
//! engine. Sessions are memory-resident only.

use crate::{
    engine::Lifecycle,
    event::EventLogEntry,
    review::AnnualReviewSummary,
    state::{HistorySeries, PlayerState},
    types::{Money, SessionId},
};
use serde::{Deserialize, Serialize};

/// Derived figures a status panel shows next to the raw state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionMetrics {
    pub net_worth: Money,
    pub invested_profit: Money,
    pub invested_profit_rate: f64,
    pub monthly_cash_flow: Money,
    pub fire_progress_pct: f64,
    pub years_to_retirement: i64,
}

impl SessionMetrics {
    pub fn from_player(player: &PlayerState) -> Self {
        Self {
            net_worth: player.net_worth(),
            invested_profit: player.invested_profit(),
            invested_profit_rate: player.invested_profit_rate(),
            monthly_cash_flow: player.monthly_cash_flow(),
            fire_progress_pct: player.fire_progress() * 100.0,
            years_to_retirement: player.years_to_retirement(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub session_id: SessionId,
    pub seed: Option<u64>,
    pub lifecycle: Lifecycle,
    pub clock_label: String,
    pub player: PlayerState,
    pub metrics: SessionMetrics,
    pub history: HistorySeries,
    /// One calendar label per history entry.
    pub tick_labels: Vec<String>,
    pub pending_review: Option<AnnualReviewSummary>,
    pub recent_events: Vec<EventLogEntry>,
}

impl SessionSnapshot {
    pub fn to_json(&self) -> crate::error::SimResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}
