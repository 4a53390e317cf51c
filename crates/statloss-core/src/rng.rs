//! Splittable RNG keys for reproducible Monte-Carlo draws.
//!
//! A key is a plain `u64` seed. Splitting runs a ChaCha8 stream from the
//! seed and takes successive outputs as child seeds, in the style of
//! `jax.random.split`. Frequency samplers turn a key into a ChaCha8 stream
//! with [`RngKey::stream`], so two calls with equal keys draw equal values.

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// An RNG key for deterministic random number generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RngKey(pub u64);

impl RngKey {
    /// Create a new RNG key from a seed.
    pub const fn new(seed: u64) -> Self {
        RngKey(seed)
    }

    /// Create a key from OS entropy, for callers who want fresh draws each call.
    pub fn from_entropy() -> Self {
        RngKey(rand::random())
    }

    /// Split this key into `n` independent keys.
    ///
    /// `split(1)` returns the key itself, so a single-element loop consumes
    /// the same stream as using the key directly.
    pub fn split(self, n: usize) -> Vec<RngKey> {
        match n {
            0 => Vec::new(),
            1 => vec![self],
            _ => {
                let mut rng = self.stream();
                (0..n).map(|_| RngKey(rng.next_u64())).collect()
            }
        }
    }

    /// Split into exactly two keys.
    pub fn split_two(self) -> (RngKey, RngKey) {
        let keys = self.split(2);
        (keys[0], keys[1])
    }

    /// ChaCha8 stream seeded by this key.
    pub fn stream(self) -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(self.0)
    }

    pub fn seed(&self) -> u64 {
        self.0
    }
}

impl From<u64> for RngKey {
    fn from(seed: u64) -> Self {
        RngKey(seed)
    }
}
