//! Deterministic random number generation.
//!
//! RULE: Nothing in the experiment may call a platform RNG. Every draw
//! flows through a `RandomSource`, and production draws come from
//! `DrawRng` streams derived from the single master seed.
//!
//! Each concern gets its own stream, seeded deterministically from
//! (master_seed XOR slot index), so adding a new slot never perturbs
//! existing streams and each stream replays in isolation.
//!
//! The trait seam exists so the settlement and voting barriers can take
//! any source — tests supply scripted sequences instead of a seed hunt.

use rand::SeedableRng;
use rand_pcg::Pcg64Mcg;

/// An injectable source of uniform draws.
pub trait RandomSource {
    /// Roll a float in [0.0, 1.0).
    fn next_f64(&mut self) -> f64;

    /// Bernoulli trial: true with probability p.
    fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    /// A fair coin.
    fn fair_coin(&mut self) -> bool {
        self.chance(0.5)
    }

    /// Roll an index in [0, n).
    fn next_below(&mut self, n: usize) -> usize {
        assert!(n > 0, "n must be > 0");
        let roll = (self.next_f64() * n as f64) as usize;
        roll.min(n - 1)
    }
}

/// A named, deterministic RNG stream for a single concern.
pub struct DrawRng {
    pub name: &'static str,
    inner: Pcg64Mcg,
}

impl DrawRng {
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
}

impl RandomSource for DrawRng {
    fn next_f64(&mut self) -> f64 {
        use rand::RngCore;
        let bits = self.inner.next_u64();
        (bits >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }
}

/// Factory for all draw streams of a single session.
pub struct RngBank {
    master_seed: u64,
}

impl RngBank {
    pub fn new(master_seed: u64) -> Self {
        Self { master_seed }
    }

    pub fn for_slot(&self, slot: DrawSlot) -> DrawRng {
        DrawRng::new(self.master_seed, slot as u64).with_name(slot.name())
    }
}

/// Stable slot assignments. NEVER reorder or remove entries — only
/// append. Reordering changes every stream's seed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u64)]
pub enum DrawSlot {
    /// Puzzle content generation.
    Task = 0,
    /// Per-player audit draws at settlement.
    Audit = 1,
    /// Computer-override coin flips at the vote round.
    Override = 2,
}

impl DrawSlot {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Task => "task",
            Self::Audit => "audit",
            Self::Override => "override",
        }
    }
}
