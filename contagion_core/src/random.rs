//! Seedable randomness with per-cell sub-streams.
//!
//! All entropy in a run is derived from a single 64-bit seed:
//! - The root stream serves construction-time draws (random seed placement)
//! - Each tick, every acting cell gets its own stream derived from
//!   `(seed, tick, cell index)`
//!
//! Because a cell's draws never depend on which cells were evaluated before
//! it, sequential and parallel schedules produce identical runs.

use rand::seq::index;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Golden ratio constant used to spread the master seed.
const SEED_MIX: u64 = 0x9e37_79b9_7f4a_7c15;

/// Multiplier used to separate ticks.
const TICK_MIX: u64 = 0x517c_c1b7_2722_0a95;

/// Multiplier used to separate cells within a tick.
const CELL_MIX: u64 = 0x3c6e_f372_fe94_f82b;

/// A single deterministic stream of draws.
#[derive(Debug, Clone)]
pub struct Stream {
    rng: ChaCha8Rng,
}

impl Stream {
    /// Creates a stream from a derived seed.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Uniform draw in `[0, 1)`.
    pub fn uniform(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }

    /// Bernoulli trial: `true` with probability `p`.
    ///
    /// `p <= 0` never fires, `p >= 1` always fires.
    pub fn chance(&mut self, p: f64) -> bool {
        self.uniform() < p
    }

    /// Draws `min(amount, len)` distinct indices from `0..len`, uniformly
    /// without replacement.
    pub fn sample(&mut self, len: usize, amount: usize) -> Vec<usize> {
        let amount = amount.min(len);
        if amount == 0 {
            return Vec::new();
        }
        index::sample(&mut self.rng, len, amount).into_vec()
    }
}

/// The run-wide random source.
///
/// Holds the master seed and a root stream. Per-tick, per-cell streams are
/// handed out through [`StreamFactory`].
#[derive(Debug, Clone)]
pub struct RandomSource {
    seed: u64,
    root: Stream,
}

impl RandomSource {
    /// Creates a random source from a master seed.
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            root: Stream::from_seed(seed.wrapping_mul(SEED_MIX)),
        }
    }

    /// Returns the master seed.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Uniform draw from the root stream.
    pub fn uniform(&mut self) -> f64 {
        self.root.uniform()
    }

    /// Bernoulli trial on the root stream.
    pub fn chance(&mut self, p: f64) -> bool {
        self.root.chance(p)
    }

    /// Sampling without replacement on the root stream.
    pub fn sample(&mut self, len: usize, amount: usize) -> Vec<usize> {
        self.root.sample(len, amount)
    }

    /// Returns the stream factory for one tick.
    pub fn streams(&self, tick: u64) -> StreamFactory {
        StreamFactory {
            seed: self.seed,
            tick,
        }
    }
}

/// Derives per-cell streams for a single tick.
///
/// `Copy` and free of shared state, so it can be handed to worker threads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamFactory {
    seed: u64,
    tick: u64,
}

impl StreamFactory {
    /// Tick this factory serves.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Returns the stream owned by the cell at `index` for this tick.
    pub fn for_cell(&self, index: usize) -> Stream {
        let derived = self
            .seed
            .wrapping_mul(SEED_MIX)
            .wrapping_add(self.tick.wrapping_add(1).wrapping_mul(TICK_MIX))
            ^ (index as u64).wrapping_add(1).wrapping_mul(CELL_MIX);
        Stream::from_seed(derived)
    }
}
