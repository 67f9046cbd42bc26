//! Candidate validation and edit classification
//!
//! Buckets are independent once the global sort has finished, so they are
//! classified in parallel with rayon. For each bucket:
//! 1. split keys into content classes (guards against hash collisions)
//! 2. fold each class into one member per sequence
//! 3. classify every pair of members as substitution, insertion/deletion or
//!    transposition, or reject it
//!
//! Per-bucket edges are then merged so every unordered pair is reported once.

use std::cmp::Ordering;
use std::ops::Range;

use rayon::prelude::*;
use tracing::info;

use crate::edges::Edge;
use crate::model::{DistanceModel, EditKind};
use crate::sequence::SequenceSet;

use super::ambiguity::{collect_members, content_classes, merge_edges, position_groups, Member};
use super::keys::DeletionKey;

/// Counters collected during classification
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassificationStatistics {
    /// Content classes examined
    pub num_classes: u64,
    /// Extra classes caused by hash collisions
    pub num_collisions: u64,
    /// Member pairs examined
    pub num_pairs: u64,
    /// Pairs of equal content (occurrence mode duplicates)
    pub num_identical_pairs: u64,
    /// Pairs sharing a key but farther apart than one edit
    pub num_rejected_pairs: u64,
    /// Edges emitted before merging duplicates
    pub num_raw_edges: u64,
    /// Edges after merging
    pub num_edges: u64,
    /// Merged edges by kind
    pub num_substitutions: u64,
    /// Merged insertion/deletion edges
    pub num_indels: u64,
    /// Merged transposition edges
    pub num_transpositions: u64,
    /// Merged edges with more than one valid position
    pub num_ambiguous: u64,
}

impl ClassificationStatistics {
    fn merge(mut self, other: Self) -> Self {
        self.num_classes += other.num_classes;
        self.num_collisions += other.num_collisions;
        self.num_pairs += other.num_pairs;
        self.num_identical_pairs += other.num_identical_pairs;
        self.num_rejected_pairs += other.num_rejected_pairs;
        self.num_raw_edges += other.num_raw_edges;
        self
    }

    fn count_edges(&mut self, edges: &[Edge]) {
        self.num_edges = edges.len() as u64;
        for edge in edges {
            match edge.kind {
                EditKind::Substitution => self.num_substitutions += 1,
                EditKind::InsertionDeletion => self.num_indels += 1,
                EditKind::Transposition => self.num_transpositions += 1,
            }
            if edge.is_ambiguous() {
                self.num_ambiguous += 1;
            }
        }
    }

    /// Log statistics summary via tracing
    pub fn print_summary(&self) {
        info!("Classification Statistics:");
        info!("  Content classes: {}", self.num_classes);
        info!("  Hash collisions resolved: {}", self.num_collisions);
        info!("  Pairs examined: {}", self.num_pairs);
        info!("  Identical pairs skipped: {}", self.num_identical_pairs);
        info!("  Pairs rejected: {}", self.num_rejected_pairs);
        info!("  Edges: {} (from {} raw)", self.num_edges, self.num_raw_edges);
        info!("    substitution: {}", self.num_substitutions);
        info!("    indel: {}", self.num_indels);
        info!("    transposition: {}", self.num_transpositions);
        info!("    with ambiguous position: {}", self.num_ambiguous);
    }
}

/// Output of classifying a set of buckets
#[derive(Debug, Clone, Default)]
pub struct Classification {
    /// Merged edges in canonical order
    pub edges: Vec<Edge>,
    /// Candidate groups, filled only when requested
    pub groups: Vec<Vec<u32>>,
    /// Counters
    pub stats: ClassificationStatistics,
}

#[derive(Default)]
struct BucketOutcome {
    edges: Vec<Edge>,
    groups: Vec<Vec<u32>>,
    stats: ClassificationStatistics,
}

impl BucketOutcome {
    fn merge(mut self, mut other: Self) -> Self {
        if self.edges.len() < other.edges.len() {
            std::mem::swap(&mut self.edges, &mut other.edges);
        }
        self.edges.append(&mut other.edges);
        self.groups.append(&mut other.groups);
        self.stats = self.stats.merge(other.stats);
        self
    }
}

/// Classify one pair of members from the same content class
///
/// Returns `None` for identical content and for pairs that share a key but
/// are more than one edit apart under `model`.
pub fn classify_members(
    set: &SequenceSet,
    a: &Member,
    b: &Member,
    model: DistanceModel,
) -> Option<Edge> {
    match (a.sentinel, b.sentinel) {
        (true, true) => None,
        (true, false) => Some(Edge::new(
            set,
            a.origin,
            b.origin,
            EditKind::InsertionDeletion,
            b.positions.clone(),
        )),
        (false, true) => Some(Edge::new(
            set,
            a.origin,
            b.origin,
            EditKind::InsertionDeletion,
            a.positions.clone(),
        )),
        (false, false) => {
            if set.get(a.origin) == set.get(b.origin) {
                return None;
            }
            let common = intersect_sorted(&a.positions, &b.positions);
            if !common.is_empty() {
                return Some(Edge::new(set, a.origin, b.origin, EditKind::Substitution, common));
            }
            if model.allows_transposition() {
                return find_transposition(set, a, b);
            }
            None
        }
    }
}

/// Look for an adjacent swap between two equal-length members
///
/// A transposition at `(p, p + 1)` puts the pair in two buckets: one where
/// the first sequence deleted `p` and the second `p + 1`, and the mirror.
/// It is reported only from the bucket where the member holding `p` is the
/// canonically smaller sequence.
fn find_transposition(set: &SequenceSet, a: &Member, b: &Member) -> Option<Edge> {
    for &pa in &a.positions {
        for &pb in &b.positions {
            let (low, high) = match pa.cmp(&pb) {
                Ordering::Less if pa + 1 == pb => (a, b),
                Ordering::Greater if pb + 1 == pa => (b, a),
                _ => continue,
            };
            if set.canonical_cmp(low.origin, high.origin) != Ordering::Less {
                continue;
            }
            let p = pa.min(pb) as usize;
            let x = set.get(low.origin);
            let y = set.get(high.origin);
            if x[p] != x[p + 1] && x[p] == y[p + 1] && x[p + 1] == y[p] {
                return Some(Edge::new(
                    set,
                    low.origin,
                    high.origin,
                    EditKind::Transposition,
                    vec![p as u32, p as u32 + 1],
                ));
            }
        }
    }
    None
}

fn intersect_sorted(a: &[u32], b: &[u32]) -> Vec<u32> {
    let mut out = Vec::new();
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            Ordering::Less => i += 1,
            Ordering::Greater => j += 1,
            Ordering::Equal => {
                out.push(a[i]);
                i += 1;
                j += 1;
            }
        }
    }
    out
}

fn classify_bucket(
    set: &SequenceSet,
    bucket: &[DeletionKey],
    model: DistanceModel,
    collect_groups: bool,
) -> BucketOutcome {
    let mut outcome = BucketOutcome::default();
    let (classes, collisions) = content_classes(set, bucket);
    outcome.stats.num_collisions += collisions as u64;

    for mut class in classes {
        outcome.stats.num_classes += 1;
        let members = collect_members(&mut class);
        if members.len() < 2 {
            continue;
        }

        for (i, a) in members.iter().enumerate() {
            for b in &members[i + 1..] {
                outcome.stats.num_pairs += 1;
                match classify_members(set, a, b, model) {
                    Some(edge) => outcome.edges.push(edge),
                    None if set.get(a.origin) == set.get(b.origin) => {
                        outcome.stats.num_identical_pairs += 1
                    }
                    None => outcome.stats.num_rejected_pairs += 1,
                }
            }
        }

        if collect_groups {
            outcome.groups.extend(position_groups(&members));
        }
    }

    outcome.stats.num_raw_edges = outcome.edges.len() as u64;
    outcome
}

/// Classify all buckets (parallelized with rayon) and merge the edges
///
/// # Arguments
/// * `set` - The sequences the keys were generated from
/// * `keys` - Sorted key buffer
/// * `buckets` - Ranges into `keys` from the bucketizer
/// * `model` - Distance model
/// * `collect_groups` - Also return candidate groups
pub fn classify_buckets(
    set: &SequenceSet,
    keys: &[DeletionKey],
    buckets: &[Range<usize>],
    model: DistanceModel,
    collect_groups: bool,
) -> Classification {
    let outcome = buckets
        .par_iter()
        .map(|range| classify_bucket(set, &keys[range.clone()], model, collect_groups))
        .reduce(BucketOutcome::default, BucketOutcome::merge);

    let edges = merge_edges(set, outcome.edges);
    let mut stats = outcome.stats;
    stats.count_edges(&edges);

    let mut groups = outcome.groups;
    if collect_groups {
        for group in &mut groups {
            group.sort_unstable_by(|&a, &b| set.canonical_cmp(a, b));
        }
        groups.par_sort_unstable_by(|a, b| {
            a.iter()
                .zip(b.iter())
                .map(|(&x, &y)| set.canonical_cmp(x, y))
                .find(|o| o.is_ne())
                .unwrap_or_else(|| a.len().cmp(&b.len()))
        });
        groups.dedup();
    }

    Classification {
        edges,
        groups,
        stats,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::config::EngineConfig;
    use crate::pipeline::intake::intake;

    fn set_of(seqs: &[&str]) -> SequenceSet {
        intake(seqs.iter().copied(), &EngineConfig::default()).unwrap().0
    }

    fn member(origin: u32, positions: &[u32]) -> Member {
        Member { origin, sentinel: false, positions: positions.to_vec() }
    }

    fn sentinel(origin: u32) -> Member {
        Member { origin, sentinel: true, positions: Vec::new() }
    }

    #[test]
    fn test_intersect_sorted() {
        assert_eq!(intersect_sorted(&[0, 1, 4], &[1, 2, 4]), vec![1, 4]);
        assert!(intersect_sorted(&[0], &[1]).is_empty());
    }

    #[test]
    fn test_substitution() {
        let set = set_of(&["ABCD", "ABXD"]);
        let edge = classify_members(&set, &member(0, &[2]), &member(1, &[2]), DistanceModel::Hamming)
            .unwrap();
        assert_eq!(edge.kind, EditKind::Substitution);
        assert_eq!(edge.positions, vec![2]);
    }

    #[test]
    fn test_indel_reports_every_run_position() {
        // AAB (0) against AB (1)
        let set = set_of(&["AAB", "AB"]);
        let edge =
            classify_members(&set, &sentinel(1), &member(0, &[0, 1]), DistanceModel::Levenshtein)
                .unwrap();
        assert_eq!(edge.kind, EditKind::InsertionDeletion);
        assert_eq!(edge.pair(), (0, 1));
        assert_eq!(edge.positions, vec![0, 1]);
    }

    #[test]
    fn test_transposition_reported_from_one_side_only() {
        // AB (0), BA (1): bucket "B" holds AB@0 and BA@1, bucket "A" holds AB@1 and BA@0
        let set = set_of(&["AB", "BA"]);
        let in_b = classify_members(&set, &member(0, &[0]), &member(1, &[1]), DistanceModel::Damerau);
        let in_a = classify_members(&set, &member(0, &[1]), &member(1, &[0]), DistanceModel::Damerau);
        let edge = in_b.unwrap();
        assert_eq!(edge.kind, EditKind::Transposition);
        assert_eq!(edge.positions, vec![0, 1]);
        assert!(in_a.is_none());

        let lev = classify_members(&set, &member(0, &[0]), &member(1, &[1]), DistanceModel::Levenshtein);
        assert!(lev.is_none());
    }

    #[test]
    fn test_distance_two_shift_rejected() {
        // XAB without 0 == ABX without 2, but they are far apart
        let set = set_of(&["ABX", "XAB"]);
        assert!(classify_members(&set, &member(1, &[0]), &member(0, &[2]), DistanceModel::Damerau)
            .is_none());
    }

    #[test]
    fn test_identical_pair_skipped() {
        let config = EngineConfig {
            identity: crate::pipeline::config::IdentityMode::Occurrence,
            ..EngineConfig::default()
        };
        let (set, _) = intake(["ABC", "ABC"], &config).unwrap();
        assert!(classify_members(&set, &member(0, &[1]), &member(1, &[1]), DistanceModel::Hamming)
            .is_none());
        assert!(classify_members(&set, &sentinel(0), &sentinel(1), DistanceModel::Levenshtein)
            .is_none());
    }
}
