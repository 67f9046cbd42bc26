//! Deletion key generation
//!
//! Every sequence of length `L` yields `L` deletion keys, one per deleted
//! index, and under the length-sensitive models one extra sentinel key for
//! the undeleted sequence. Keys are an intermediate representation: they are
//! generated, sorted, scanned into buckets and dropped within one run.
//!
//! ## Parallelism
//!
//! Key extraction is parallelized across sequences using rayon. Each sequence
//! is processed independently, producing a local batch that rayon's
//! `flat_map_iter` concatenates into one global buffer for the sort.

use std::cmp::Ordering;

use rayon::prelude::*;

use crate::constants::SENTINEL_POSITION;
use crate::hasher::DeterministicHasher;
use crate::model::DistanceModel;
use crate::sequence::{NodeId, SequenceSet};

/// A deletion-derived key
///
/// `hash` covers only the symbol content left after the deletion.
/// `position` is the deleted index, or [`SENTINEL_POSITION`] for the
/// whole-sequence key. `origin` is the node the key came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeletionKey {
    /// Hash of the remaining symbol content
    pub hash: u64,

    /// Deleted index, or -1 for the sentinel
    pub position: i32,

    /// Node the key was derived from
    pub origin: NodeId,
}

impl DeletionKey {
    /// Create a new key
    pub fn new(hash: u64, position: i32, origin: NodeId) -> Self {
        Self {
            hash,
            position,
            origin,
        }
    }

    /// True for the whole-sequence key
    #[inline]
    pub fn is_sentinel(&self) -> bool {
        self.position == SENTINEL_POSITION
    }

    /// Deleted index, `None` for the sentinel
    #[inline]
    pub fn deleted_index(&self) -> Option<usize> {
        usize::try_from(self.position).ok()
    }
}

impl PartialOrd for DeletionKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for DeletionKey {
    fn cmp(&self, other: &Self) -> Ordering {
        // Primary sort by hash, then position, then origin as a stable tiebreak
        self.hash
            .cmp(&other.hash)
            .then(self.position.cmp(&other.position))
            .then(self.origin.cmp(&other.origin))
    }
}

/// Number of keys a sequence of length `len` yields under `model`
#[inline]
pub fn keys_per_sequence(len: usize, model: DistanceModel) -> usize {
    len + usize::from(model.is_length_sensitive())
}

/// Generate the keys of a single sequence
pub fn keys_for_sequence(
    set: &SequenceSet,
    origin: NodeId,
    model: DistanceModel,
    hasher: &DeterministicHasher,
) -> Vec<DeletionKey> {
    let symbols = set.get(origin);
    let mut keys = Vec::with_capacity(keys_per_sequence(symbols.len(), model));

    if model.is_length_sensitive() {
        keys.push(DeletionKey::new(
            hasher.hash_symbols(symbols),
            SENTINEL_POSITION,
            origin,
        ));
    }
    // Lengths are capped at i32::MAX during intake
    for i in 0..symbols.len() {
        keys.push(DeletionKey::new(
            hasher.hash_skipping(symbols, Some(i)),
            i as i32,
            origin,
        ));
    }

    keys
}

/// Generate the keys of every sequence in the set (parallelized with rayon)
///
/// The returned buffer is unsorted; the bucketizer owns the global sort.
pub fn generate_keys(
    set: &SequenceSet,
    model: DistanceModel,
    hasher: &DeterministicHasher,
) -> Vec<DeletionKey> {
    let total: usize = set.ids().map(|id| keys_per_sequence(set.length(id), model)).sum();

    let mut keys = Vec::with_capacity(total);
    keys.par_extend(
        (0..set.len())
            .into_par_iter()
            .flat_map_iter(|id| keys_for_sequence(set, id as NodeId, model, hasher)),
    );

    debug_assert_eq!(keys.len(), total);
    keys
}

/// Estimate memory needed to hold the key buffer
///
/// Sorting in place needs no second copy, so this is one key per slot.
pub fn estimate_memory_bytes(num_keys: usize) -> usize {
    num_keys * std::mem::size_of::<DeletionKey>()
}
