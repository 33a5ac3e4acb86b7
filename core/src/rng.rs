//! Deterministic random number generation.
//!
//! RULE: Nothing in the game core may call any platform RNG.
//! All randomness flows through a `RandomSource`, normally a
//! `StreamRng` derived from the single master seed of the session.
//!
//! Each consumer gets its own stream, seeded deterministically
//! from (master_seed XOR slot_index). This means:
//!   - Adding a new consumer never changes existing streams.
//!   - The market walk is reproducible independently of how many
//!     coin flips the scenario provider made.

use rand::SeedableRng;
use rand_pcg::Pcg64Mcg;

/// The randomness seam. Provider branching and the market walk only
/// ever see this trait, so tests can script every draw.
pub trait RandomSource {
    /// Roll a float in [0.0, 1.0).
    fn next_f64(&mut self) -> f64;

    /// Roll a u64 in [0, n).
    fn next_u64_below(&mut self, n: u64) -> u64 {
        assert!(n > 0, "n must be > 0");
        ((self.next_f64() * n as f64) as u64).min(n - 1)
    }

    /// Bernoulli trial: returns true with probability p.
    fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    /// Roll a float in [lo, hi).
    fn uniform(&mut self, lo: f64, hi: f64) -> f64 {
        lo + self.next_f64() * (hi - lo)
    }
}

/// A named, deterministic RNG stream for one consumer.
pub struct StreamRng {
    pub name: &'static str,
    inner: Pcg64Mcg,
}

impl StreamRng {
    /// Create a stream from the master seed and a stable slot index.
    /// The index must never change once assigned.
    pub fn new(master_seed: u64, slot_index: u64) -> Self {
        let derived_seed = master_seed ^ (slot_index.wrapping_mul(0x9e37_79b9_7f4a_7c15));
        Self {
            name: "unnamed",
            inner: Pcg64Mcg::seed_from_u64(derived_seed),
        }
    }

    pub fn with_name(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    /// Draw a raw u64 (full range).
    pub fn next_u64(&mut self) -> u64 {
        use rand::RngCore;
        self.inner.next_u64()
    }
}

impl RandomSource for StreamRng {
    fn next_f64(&mut self) -> f64 {
        use rand::RngCore;
        let bits = self.inner.next_u64();
        (bits >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    fn next_u64_below(&mut self, n: u64) -> u64 {
        use rand::RngCore;
        assert!(n > 0, "n must be > 0");
        self.inner.next_u64() % n
    }
}

/// All RNG streams for a single session, indexed by stable slot.
#[derive(Debug, Clone, Copy)]
pub struct RngBank {
    master_seed: u64,
}

impl RngBank {
    pub fn new(master_seed: u64) -> Self {
        Self { master_seed }
    }

    pub fn master_seed(&self) -> u64 {
        self.master_seed
    }

    pub fn stream(&self, slot: RngSlot) -> StreamRng {
        StreamRng::new(self.master_seed, slot as u64).with_name(slot.name())
    }
}

/// Stable stream slot assignments.
/// NEVER reorder or remove entries; only append.
/// Reordering changes every stream's seed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u64)]
pub enum RngSlot {
    Provider = 0,
    Market = 1,
    Autoplay = 2,
    // Add new slots here, append only.
}

impl RngSlot {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Provider => "provider",
            Self::Market => "market",
            Self::Autoplay => "autoplay",
        }
    }
}

/// Replays a fixed list of draws, cycling when exhausted.
/// Used to force specific provider branches and market moves.
#[derive(Debug, Clone)]
pub struct ScriptedRng {
    draws: Vec<f64>,
    cursor: usize,
}

impl ScriptedRng {
    pub fn new(draws: Vec<f64>) -> Self {
        assert!(!draws.is_empty(), "scripted rng needs at least one draw");
        Self { draws, cursor: 0 }
    }

    /// Every draw returns the same value.
    pub fn constant(value: f64) -> Self {
        Self::new(vec![value])
    }
}

impl RandomSource for ScriptedRng {
    fn next_f64(&mut self) -> f64 {
        let value = self.draws[self.cursor % self.draws.len()];
        self.cursor += 1;
        value
    }
}
