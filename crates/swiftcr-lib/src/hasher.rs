//! Deterministic hasher for deletion keys using ahash.
//!
//! This uses AHasher with explicit seeds so that keys are stable for the
//! whole run. Keys never leave memory, so any seed works; collisions are
//! tolerated because every candidate is re-verified on content.

use ahash::RandomState;
use std::hash::{BuildHasher, Hasher};

/// A deterministic hasher with a seeded state
#[derive(Clone)]
pub struct DeterministicHasher {
    seed: u64,
    state: RandomState,
}

impl DeterministicHasher {
    /// Create a new deterministic hasher with the given seed
    pub fn new(seed: u64) -> Self {
        let state = RandomState::with_seeds(seed, !seed, seed, !seed);
        Self { seed, state }
    }

    /// Hash the symbol content of `symbols`, optionally with one index removed.
    ///
    /// Symbols are fed one at a time, so hashing a view with index `i`
    /// skipped gives the same value as hashing the materialized string with
    /// that symbol deleted. Only content enters the hash, never the index.
    #[inline]
    pub fn hash_skipping(&self, symbols: &[u8], skip: Option<usize>) -> u64 {
        let mut hasher = self.state.build_hasher();
        let len = symbols.len() - usize::from(skip.is_some());
        hasher.write_usize(len);
        for (i, &symbol) in symbols.iter().enumerate() {
            if Some(i) != skip {
                hasher.write_u8(symbol);
            }
        }
        hasher.finish()
    }

    /// Hash a whole sequence
    #[inline]
    pub fn hash_symbols(&self, symbols: &[u8]) -> u64 {
        self.hash_skipping(symbols, None)
    }

    /// Get the seed value
    pub fn seed(&self) -> u64 {
        self.seed
    }
}
