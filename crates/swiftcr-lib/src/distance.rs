//! Direct pairwise distance-one checks
//!
//! Classifies a single pair of sequences without any hashing. The engine
//! never calls this on its hot path; it is the reference the engine is
//! checked against, and [`brute_force_edges`] runs it over all pairs of a
//! (small) corpus.

use rayon::prelude::*;

use crate::edges::{canonical_edge_cmp, Edge};
use crate::model::{DistanceModel, EditKind};
use crate::sequence::{NodeId, SequenceSet};

/// Classify the relation between `a` and `b` under `model`
///
/// Returns the edit kind and its position(s) when the pair is exactly one
/// edit apart, `None` otherwise (including when `a == b`). Positions follow
/// [`Edge`]: indel positions index the longer sequence.
pub fn classify_pair(a: &[u8], b: &[u8], model: DistanceModel) -> Option<(EditKind, Vec<u32>)> {
    if a.len() == b.len() {
        return classify_same_length(a, b, model);
    }
    if !model.is_length_sensitive() || a.len().abs_diff(b.len()) != 1 {
        return None;
    }
    let (long, short) = if a.len() > b.len() { (a, b) } else { (b, a) };
    let positions = deletion_positions(long, short);
    if positions.is_empty() {
        None
    } else {
        Some((EditKind::InsertionDeletion, positions))
    }
}

fn classify_same_length(a: &[u8], b: &[u8], model: DistanceModel) -> Option<(EditKind, Vec<u32>)> {
    let mut diffs = a.iter().zip(b).enumerate().filter(|(_, (x, y))| x != y).map(|(i, _)| i);
    let first = diffs.next()?;
    let second = diffs.next();
    if diffs.next().is_some() {
        return None;
    }
    match second {
        None => Some((EditKind::Substitution, vec![first as u32])),
        Some(second)
            if model.allows_transposition()
                && second == first + 1
                && a[first] == b[second]
                && a[second] == b[first] =>
        {
            Some((EditKind::Transposition, vec![first as u32, second as u32]))
        }
        Some(_) => None,
    }
}

/// Every index of `long` whose deletion leaves `short`
///
/// `long` must be exactly one symbol longer than `short`. The valid indices
/// form a contiguous range (a run of equal symbols) bounded by the common
/// prefix and common suffix of the two.
pub fn deletion_positions(long: &[u8], short: &[u8]) -> Vec<u32> {
    debug_assert_eq!(long.len(), short.len() + 1);
    let prefix = long.iter().zip(short).take_while(|(x, y)| x == y).count();
    let suffix = long.iter().rev().zip(short.iter().rev()).take_while(|(x, y)| x == y).count();
    let lowest = long.len() - 1 - suffix.min(long.len() - 1);
    let highest = prefix.min(long.len() - 1);
    (lowest..=highest).map(|i| i as u32).collect()
}

/// True if `a` and `b` differ by exactly one substitution
pub fn is_hamming_one(a: &[u8], b: &[u8]) -> bool {
    classify_pair(a, b, DistanceModel::Hamming).is_some()
}

/// True if `a` and `b` are exactly one substitution, insertion or deletion apart
pub fn is_levenshtein_one(a: &[u8], b: &[u8]) -> bool {
    classify_pair(a, b, DistanceModel::Levenshtein).is_some()
}

/// True if `a` and `b` are one edit apart, adjacent transpositions included
pub fn is_damerau_one(a: &[u8], b: &[u8]) -> bool {
    classify_pair(a, b, DistanceModel::Damerau).is_some()
}

/// All distance-one edges of `set` by exhaustive pairwise comparison
///
/// Quadratic in the number of sequences; outer loop parallelized with rayon.
/// Output is in the same canonical order the engine produces.
pub fn brute_force_edges(set: &SequenceSet, model: DistanceModel) -> Vec<Edge> {
    let n = set.len() as NodeId;
    let mut edges: Vec<Edge> = (0..n)
        .into_par_iter()
        .flat_map_iter(|a| {
            ((a + 1)..n).filter_map(move |b| {
                classify_pair(set.get(a), set.get(b), model)
                    .map(|(kind, positions)| Edge::new(set, a, b, kind, positions))
            })
        })
        .collect();
    edges.par_sort_unstable_by(|x, y| canonical_edge_cmp(set, x, y));
    edges
}
