//! Random number generation for dungeon graph generation
//!
//! Uses a seeded ChaCha RNG so that a seed (numeric or textual) always
//! produces the same level. Level recordings store only the seed.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Seeded random source handed to the generator
///
/// Wraps ChaCha8Rng for reproducible random number generation.
/// Note: RNG state is not serialized - a deserialized RNG restarts its stream from the seed.
#[derive(Debug, Clone)]
pub struct GameRng {
    rng: ChaCha8Rng,
    seed: u64,
}

// Custom serialization - only serialize seed, recreate RNG on deserialize
impl Serialize for GameRng {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.seed.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for GameRng {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let seed = u64::deserialize(deserializer)?;
        Ok(GameRng::new(seed))
    }
}

/// Derive a numeric seed from a textual one.
///
/// BLAKE3 keeps the mapping stable across platforms and releases, which a
/// `std::hash::Hasher` does not guarantee.
pub fn seed_from_str(seed: &str) -> u64 {
    let hash = blake3::hash(seed.as_bytes());
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&hash.as_bytes()[..8]);
    u64::from_le_bytes(bytes)
}

impl GameRng {
    /// Create a new RNG with the given seed
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    /// Create a new RNG from a textual seed such as `"hello"`
    pub fn from_seed_str(seed: &str) -> Self {
        Self::new(seed_from_str(seed))
    }

    /// Get the seed used to create this RNG
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Restart the stream from a new seed
    pub fn reseed(&mut self, seed: u64) {
        *self = Self::new(seed);
    }

    /// Restart the stream from a new textual seed
    pub fn reseed_str(&mut self, seed: &str) {
        self.reseed(seed_from_str(seed));
    }

    /// Returns 0..n-1
    ///
    /// Returns 0 if n is 0.
    pub fn rn2(&mut self, n: u32) -> u32 {
        if n == 0 {
            return 0;
        }
        self.rng.gen_range(0..n)
    }

    /// Choose a random element from a slice
    pub fn select_from<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            None
        } else {
            Some(&items[self.rn2(items.len() as u32) as usize])
        }
    }

    /// Choose `count` distinct elements in random order
    ///
    /// Picks at most `items.len()` elements.
    pub fn select_many<'a, T>(&mut self, items: &'a [T], count: usize) -> Vec<&'a T> {
        let mut picked: Vec<&T> = items.iter().collect();
        self.shuffle(&mut picked);
        picked.truncate(count);
        picked
    }

    /// Shuffle a slice in place
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = self.rn2(i as u32 + 1) as usize;
            items.swap(i, j);
        }
    }
}
