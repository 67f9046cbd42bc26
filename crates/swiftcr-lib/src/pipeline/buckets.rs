//! Key sorting, bucket splitting and statistics
//!
//! The single global barrier of the pipeline: all keys are sorted in
//! parallel, then one linear scan splits the sorted buffer into runs that
//! share the grouping criterion of the model. Hamming groups by
//! `(hash, position)`, the length-sensitive models by `hash` alone.

use std::ops::Range;

use rayon::prelude::*;
use tracing::info;

use crate::model::DistanceModel;

use super::keys::DeletionKey;

/// Bucket size threshold between light and heavy buckets
pub const HEAVY_BUCKET_SIZE: usize = 64;

/// Statistics about bucket sizes and distribution
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BucketStatistics {
    /// Total number of keys sorted
    pub num_keys: u64,

    /// Number of groups found by the scan, before filtering
    pub num_groups: u64,

    /// Groups dropped because they hold a single key
    pub num_singleton_groups: u64,

    /// Groups dropped because all their keys come from one sequence
    pub num_single_origin_groups: u64,

    /// Buckets kept for classification
    pub num_buckets: u64,

    /// Kept buckets with more than [`HEAVY_BUCKET_SIZE`] keys
    pub num_heavy_buckets: u64,

    /// Keys in kept buckets
    pub num_keys_in_buckets: u64,

    /// Maximum observed bucket size
    pub max_bucket_size: usize,
}

impl BucketStatistics {
    /// Create a new statistics tracker
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a kept bucket
    pub fn add_bucket(&mut self, bucket: &[DeletionKey]) {
        self.num_buckets += 1;
        self.num_keys_in_buckets += bucket.len() as u64;
        if bucket.len() > HEAVY_BUCKET_SIZE {
            self.num_heavy_buckets += 1;
        }
        if bucket.len() > self.max_bucket_size {
            self.max_bucket_size = bucket.len();
        }
    }

    /// Log statistics summary via tracing
    pub fn print_summary(&self) {
        info!("Bucket Statistics:");
        info!("  Total keys: {}", self.num_keys);
        info!("  Key groups: {}", self.num_groups);
        info!(
            "  Singleton groups dropped: {} ({:.2}%)",
            self.num_singleton_groups,
            percent(self.num_singleton_groups, self.num_groups)
        );
        info!(
            "  Single-origin groups dropped: {} ({:.2}%)",
            self.num_single_origin_groups,
            percent(self.num_single_origin_groups, self.num_groups)
        );
        info!("  Candidate buckets: {}", self.num_buckets);
        info!(
            "  Heavy buckets (>{}): {}",
            HEAVY_BUCKET_SIZE, self.num_heavy_buckets
        );
        info!(
            "  Keys in candidate buckets: {} ({:.2}%)",
            self.num_keys_in_buckets,
            percent(self.num_keys_in_buckets, self.num_keys)
        );
        info!("  Max bucket size: {}", self.max_bucket_size);
    }
}

fn percent(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 * 100.0 / whole as f64
    }
}

/// Whether two adjacent sorted keys belong to the same group under `model`
#[inline]
pub fn same_group(a: &DeletionKey, b: &DeletionKey, model: DistanceModel) -> bool {
    if model.is_length_sensitive() {
        a.hash == b.hash
    } else {
        a.hash == b.hash && a.position == b.position
    }
}

/// Sort keys by `(hash, position, origin)` in parallel
pub fn sort_keys(keys: &mut [DeletionKey]) {
    keys.par_sort_unstable();
}

/// Split sorted keys into candidate buckets
///
/// Returns ranges into `keys`, one per kept bucket. A group is dropped when
/// it holds one key or when every key in it comes from the same sequence
/// (e.g. both deletions of `"AA"`), since neither can produce a pair.
///
/// # Arguments
/// * `keys` - Keys sorted by [`sort_keys`]
/// * `model` - Selects the grouping criterion
pub fn split_into_buckets(
    keys: &[DeletionKey],
    model: DistanceModel,
) -> (Vec<Range<usize>>, BucketStatistics) {
    let mut stats = BucketStatistics::new();
    stats.num_keys = keys.len() as u64;

    let mut buckets = Vec::new();
    let mut start = 0usize;
    while start < keys.len() {
        let mut end = start + 1;
        while end < keys.len() && same_group(&keys[start], &keys[end], model) {
            end += 1;
        }

        stats.num_groups += 1;
        let group = &keys[start..end];
        if group.len() == 1 {
            stats.num_singleton_groups += 1;
        } else if group.iter().all(|k| k.origin == group[0].origin) {
            stats.num_single_origin_groups += 1;
        } else {
            stats.add_bucket(group);
            buckets.push(start..end);
        }

        start = end;
    }

    (buckets, stats)
}

/// Sort keys and split them into buckets
pub fn bucketize(
    keys: &mut [DeletionKey],
    model: DistanceModel,
) -> (Vec<Range<usize>>, BucketStatistics) {
    sort_keys(keys);
    split_into_buckets(keys, model)
}
