//! Injectable random source for every probabilistic roll in the core.
//! This module exists so combat, decisions and spawning can run from a seeded RNG in play
//! and from a scripted sequence in tests. It does not own any game rules.

use std::collections::VecDeque;

use rand_chacha::ChaCha8Rng;
use rand_chacha::rand_core::{Rng, SeedableRng};

const UNIT_BITS: u32 = 24;

pub trait RollSource {
    fn next_u64(&mut self) -> u64;

    /// Uniform value in `[0, 1)`.
    fn unit(&mut self) -> f32 {
        (self.next_u64() >> (64 - UNIT_BITS)) as f32 / (1_u64 << UNIT_BITS) as f32
    }

    /// Bernoulli check; `p <= 0` never succeeds and `p >= 1` always does.
    fn chance(&mut self, p: f32) -> bool {
        self.unit() < p
    }

    /// Uniform integer in `[lo, hi]`.
    fn range_inclusive(&mut self, lo: i32, hi: i32) -> i32 {
        debug_assert!(lo <= hi);
        let span = (hi - lo + 1) as f32;
        let offset = (self.unit() * span) as i32;
        lo + offset.min(hi - lo)
    }

    /// Uniform multiplier in `[lo, hi]`.
    fn band(&mut self, lo: f32, hi: f32) -> f32 {
        lo + (hi - lo) * self.unit()
    }
}

impl RollSource for ChaCha8Rng {
    fn next_u64(&mut self) -> u64 {
        Rng::next_u64(self)
    }
}

/// The game's seeded stream. Draws are counted so a snapshot can resume at the same point.
#[derive(Clone, Debug)]
pub struct SessionRng {
    rng: ChaCha8Rng,
    seed: u64,
    draws: u64,
}

impl SessionRng {
    pub fn new(seed: u64) -> Self {
        Self { rng: ChaCha8Rng::seed_from_u64(seed), seed, draws: 0 }
    }

    /// Reseeds and fast-forwards past `draws` values.
    pub fn resume(seed: u64, draws: u64) -> Self {
        let mut rng = Self::new(seed);
        for _ in 0..draws {
            rng.next_u64();
        }
        rng
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn draws(&self) -> u64 {
        self.draws
    }
}

impl RollSource for SessionRng {
    fn next_u64(&mut self) -> u64 {
        self.draws += 1;
        Rng::next_u64(&mut self.rng)
    }
}

/// Replays a fixed list of unit rolls; the last value repeats once the list is exhausted.
#[derive(Clone, Debug)]
pub struct ScriptedRolls {
    queue: VecDeque<f32>,
    last: f32,
}

impl ScriptedRolls {
    pub fn new(rolls: impl IntoIterator<Item = f32>) -> Self {
        let queue: VecDeque<f32> = rolls.into_iter().map(|r| r.clamp(0.0, 0.999_999)).collect();
        let last = queue.back().copied().unwrap_or(0.0);
        Self { queue, last }
    }

    /// A source that always rolls `value`.
    pub fn constant(value: f32) -> Self {
        Self::new([value])
    }

    pub fn remaining(&self) -> usize {
        self.queue.len()
    }
}

impl RollSource for ScriptedRolls {
    fn next_u64(&mut self) -> u64 {
        ((self.unit() as f64) * (1_u64 << UNIT_BITS) as f64) as u64 * (1_u64 << (64 - UNIT_BITS))
    }

    fn unit(&mut self) -> f32 {
        if let Some(value) = self.queue.pop_front() {
            self.last = value;
        }
        self.last
    }
}
