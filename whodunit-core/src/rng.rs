//! Seedable randomness for game runs.
//!
//! Every stochastic choice in a game flows through one `GameRng`, so a
//! fixed seed reproduces the full transcript.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Random source owned by a game.
#[derive(Debug, Clone)]
pub struct GameRng {
    inner: ChaCha8Rng,
}

impl GameRng {
    /// Create an RNG from a fixed seed.
    pub fn seeded(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Create an RNG from OS entropy.
    pub fn from_entropy() -> Self {
        Self {
            inner: ChaCha8Rng::from_entropy(),
        }
    }

    /// Draw a uniform index in `0..len`. `len` must be nonzero.
    pub fn index(&mut self, len: usize) -> usize {
        self.inner.gen_range(0..len)
    }

    /// Pick one element uniformly. `items` must be non-empty.
    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[self.index(items.len())]
    }

    /// Pick an index with probability proportional to its weight.
    ///
    /// Walks the cumulative weight sum with a single draw. `weights` must
    /// be non-empty; an all-zero table falls back to a uniform pick.
    pub fn weighted_index(&mut self, weights: &[u32]) -> usize {
        let total: u32 = weights.iter().sum();
        if total == 0 {
            return self.index(weights.len());
        }

        let mut draw = self.inner.gen_range(0..total);
        for (index, &weight) in weights.iter().enumerate() {
            if draw < weight {
                return index;
            }
            draw -= weight;
        }
        weights.len() - 1
    }
}
