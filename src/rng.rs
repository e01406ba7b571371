//! # RandomNumberGenerator
//!
//! The single pseudo-random stream of a search. It is seeded once from the
//! configured seed and reseeded with a deterministic increment before every
//! run, so the trials of a run are reproducible from the run's seed alone.
//!
//! ## Example
//!
//! ```rust
//! use lkrun::rng::RandomNumberGenerator;
//!
//! let mut rng = RandomNumberGenerator::from_seed(7);
//! let first = rng.gen_index(10);
//!
//! rng.reseed(7);
//! assert_eq!(rng.gen_index(10), first);
//! ```

use rand::{rngs::StdRng, Rng, SeedableRng};

/// A wrapper around the `rand` crate's `StdRng` with the draws the search needs.
#[derive(Clone, Debug)]
pub struct RandomNumberGenerator {
    pub rng: StdRng,
}

impl RandomNumberGenerator {
    /// Creates a new `RandomNumberGenerator` instance with a specific seed.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Restarts the stream from `seed`.
    pub fn reseed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }

    /// Returns a uniformly distributed index in `0..bound`.
    ///
    /// # Panics
    ///
    /// Panics if `bound` is zero.
    pub fn gen_index(&mut self, bound: usize) -> usize {
        self.rng.gen_range(0..bound)
    }

    /// Returns a uniformly distributed value in `[0, 1)`.
    pub fn gen_unit(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }

    /// Returns a random 64-bit key.
    pub fn gen_key(&mut self) -> u64 {
        self.rng.gen::<u64>()
    }
}
