//! Shared primitive types used across the entire simulation.

/// A simulation tick. One tick = one in-game month.
pub type Tick = u64;

/// A currency amount. Policy steps floor to whole currency units.
pub type Money = f64;

/// The canonical session identifier.
pub type SessionId = String;

/// Months in one age-year.
pub const MONTHS_PER_YEAR: Tick = 12;

/// Generate a fresh session identifier.
/// Identifiers never feed the simulation, so they may use platform entropy.
pub fn new_session_id() -> SessionId {
    format!("session-{}", uuid::Uuid::new_v4())
}
