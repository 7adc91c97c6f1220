//! Deterministic random number generation.
//!
//! RULE: Nothing in the simulation may call any platform RNG.
//! All randomness flows through a `RandomSource` handed to each
//! subsystem by the engine.
//!
//! By default each subsystem gets its own PCG stream, seeded from
//! (master_seed XOR slot_index * golden ratio). This means:
//!   - Adding a new subsystem never changes existing subsystems' streams.
//!   - Each subsystem's stream is fully reproducible in isolation.
//!
//! Tests inject `ScriptedRng` instead to force specific draws.

use rand::{RngCore, SeedableRng};
use rand_pcg::Pcg64Mcg;

/// The injection seam for every random draw the engine makes.
pub trait RandomSource: Send {
    /// Roll a float in [0.0, 1.0).
    fn next_f64(&mut self) -> f64;

    /// Uniform index in [0, len). `len` must be > 0.
    fn next_index(&mut self, len: usize) -> usize {
        assert!(len > 0, "len must be > 0");
        ((self.next_f64() * len as f64) as usize).min(len - 1)
    }

    /// Bernoulli trial: returns true with probability p.
    fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }
}

/// A deterministic RNG for a single subsystem.
pub struct SubsystemRng {
    inner: Pcg64Mcg,
}

impl SubsystemRng {
    /// Create a subsystem RNG from the master seed and a stable
    /// subsystem index. The index must never change once assigned.
    pub fn new(master_seed: u64, subsystem_index: u64) -> Self {
        let derived_seed = master_seed ^ (subsystem_index.wrapping_mul(0x9e37_79b9_7f4a_7c15));
        Self {
            inner: Pcg64Mcg::seed_from_u64(derived_seed),
        }
    }

    /// Draw a raw u64 (full range).
    pub fn next_u64(&mut self) -> u64 {
        self.inner.next_u64()
    }
}

impl RandomSource for SubsystemRng {
    fn next_f64(&mut self) -> f64 {
        let bits = self.inner.next_u64();
        (bits >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    fn next_index(&mut self, len: usize) -> usize {
        assert!(len > 0, "len must be > 0");
        (self.inner.next_u64() % len as u64) as usize
    }
}

/// Replays a fixed cycle of draws in [0, 1). For tests and replay tooling.
pub struct ScriptedRng {
    values: Vec<f64>,
    cursor: usize,
}

impl ScriptedRng {
    pub fn new(values: Vec<f64>) -> Self {
        assert!(!values.is_empty(), "ScriptedRng needs at least one value");
        Self { values, cursor: 0 }
    }

    /// A source that always returns the same draw.
    pub fn constant(value: f64) -> Self {
        Self::new(vec![value])
    }

    /// Number of draws taken so far.
    pub fn draws(&self) -> usize {
        self.cursor
    }
}

impl RandomSource for ScriptedRng {
    fn next_f64(&mut self) -> f64 {
        let v = self.values[self.cursor % self.values.len()];
        self.cursor += 1;
        v.clamp(0.0, 1.0 - f64::EPSILON)
    }
}

/// Seed-derived streams for a single session, indexed by stable slot.
pub struct RngBank {
    master_seed: u64,
}

impl RngBank {
    pub fn new(master_seed: u64) -> Self {
        Self { master_seed }
    }

    pub fn for_subsystem(&self, slot: SubsystemSlot) -> SubsystemRng {
        SubsystemRng::new(self.master_seed, slot as u64)
    }

    /// Boxed stream for engine registration.
    pub fn source(&self, slot: SubsystemSlot) -> Box<dyn RandomSource> {
        Box::new(self.for_subsystem(slot))
    }
}

/// Stable subsystem slot assignments.
/// NEVER reorder or remove entries — only append.
/// Reordering changes every subsystem's seed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u64)]
pub enum SubsystemSlot {
    Payroll = 0,
    Portfolio = 1,
    MarketEvents = 2,
    // Add new subsystems here — append only.
}

impl SubsystemSlot {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Payroll => "payroll",
            Self::Portfolio => "portfolio",
            Self::MarketEvents => "market_events",
        }
    }
}
