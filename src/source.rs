//! Proposal generation, kept behind a trait so the protocol never
//! depends on randomness.
//!
//! [`SeededSource`] reproduces a run from a single `u32` seed: each
//! submitter derives its own RNG stream, so generation is deterministic
//! per seed regardless of scheduling. [`ScriptedSource`] injects exact
//! scores with zero think time, for tests and demos.

use std::time::Duration;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::types::Proposal;

/// A pool of evening ideas a proposal's detail text is drawn from.
const EVENING_IDEAS: [&str; 8] = [
    "a walk around town and coffee",
    "cinema and pizza",
    "candlelit dinner",
    "ice rink and hot chocolate",
    "board games and tea",
    "a picnic, weather permitting",
    "museum visit and a stroll",
    "concert and a late supper",
];

/// Supplies each submitter's think time and proposal.
///
/// Implementations must be deterministic per submitter id for a given
/// source value; the protocol calls each method at most once per id.
pub trait ProposalSource: Send + Sync {
    /// How long submitter `id` deliberates before composing.
    fn think_time(&self, id: usize) -> Duration;

    /// Composes submitter `id`'s proposal.
    fn compose(&self, id: usize) -> Proposal;
}

/// Seed-driven source: uniform score in `[1, 100]`, an idea from the
/// pool, and a bounded think time.
#[derive(Debug, Clone)]
pub struct SeededSource {
    seed: u32,
    think: Duration,
}

impl SeededSource {
    /// Per-submitter stream separation constant (Knuth's multiplicative
    /// hash), matching how the per-thread seeds are derived.
    const STREAM: u64 = 2_654_435_761;

    /// Creates a source with the default 1–3 s think window.
    #[must_use]
    pub fn new(seed: u32) -> Self {
        Self {
            seed,
            think: Duration::from_secs(3),
        }
    }

    /// Overrides the upper bound of the think window. Tests compress it
    /// to milliseconds.
    #[must_use]
    pub fn with_max_think(mut self, think: Duration) -> Self {
        self.think = think;
        self
    }

    fn rng(&self, id: usize, stream: u64) -> SmallRng {
        let mix = u64::from(self.seed) ^ (id as u64).wrapping_mul(Self::STREAM);
        SmallRng::seed_from_u64(mix.wrapping_add(stream))
    }
}

impl ProposalSource for SeededSource {
    fn think_time(&self, id: usize) -> Duration {
        let mut rng = self.rng(id, 0);
        let max = self.think.as_millis().max(1) as u64;
        let lo = (max / 3).max(1);
        Duration::from_millis(rng.gen_range(lo..=max))
    }

    fn compose(&self, id: usize) -> Proposal {
        let mut rng = self.rng(id, 1);
        let score = rng.gen_range(1..=100);
        let idea = EVENING_IDEAS[rng.gen_range(0..EVENING_IDEAS.len())];
        Proposal::new(id, score, idea)
    }
}

/// Fixed-score source with zero think time.
#[derive(Debug, Clone)]
pub struct ScriptedSource {
    scores: Vec<i32>,
}

impl ScriptedSource {
    /// Creates a source that hands submitter `id` the score
    /// `scores[id]`.
    #[must_use]
    pub fn new(scores: Vec<i32>) -> Self {
        Self { scores }
    }
}

impl ProposalSource for ScriptedSource {
    fn think_time(&self, _id: usize) -> Duration {
        Duration::ZERO
    }

    fn compose(&self, id: usize) -> Proposal {
        Proposal::new(id, self.scores[id], "scripted")
    }
}
