//! fire-sim core: a month-by-month personal finance simulation for
//! experimenting with FIRE (financial independence, retire early) plans.
//!
//! The engine is a leaf: it owns the player's state and history, advances
//! one month per call, and reports what happened through an event feed.
//! Timers, rendering and input widgets live in the collaborator.

pub mod clock;
pub mod command;
pub mod config;
pub mod engine;
pub mod error;
pub mod event;
pub mod event_log;
pub mod format;
pub mod market;
pub mod market_event_subsystem;
pub mod payroll_subsystem;
pub mod portfolio_subsystem;
pub mod review;
pub mod rng;
pub mod snapshot;
pub mod state;
pub mod subsystem;
pub mod types;

pub use engine::{Lifecycle, Outcome, PauseReason, SimEngine, Withdrawal};
pub use error::{SimError, SimResult};
