//! Resolution of ambiguous edit positions
//!
//! Inside a run of repeated symbols several deletion indices produce the same
//! subsequence, so one sequence can land in a bucket more than once. This
//! module folds the keys of a bucket into one [`Member`] per sequence carrying
//! every position it entered with, lets each shorter sequence join every
//! position group of its bucket, and finally merges the edge stream so each
//! unordered pair appears exactly once with the union of its positions.

use rayon::prelude::*;

use crate::edges::{canonical_edge_cmp, Edge};
use crate::sequence::{NodeId, SequenceSet};

use super::keys::DeletionKey;

/// All keys one sequence contributed to one content class
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    /// The sequence
    pub origin: NodeId,
    /// True when the sequence entered with its whole-sequence key
    pub sentinel: bool,
    /// Sorted deletion indices (empty for a sentinel)
    pub positions: Vec<u32>,
}

/// Split a bucket into classes of keys with identical remaining content
///
/// Keys share a bucket because their hashes matched; this re-checks the
/// actual symbols so that a hash collision between unrelated content never
/// reaches classification. Returns the classes and how many extra classes
/// (collisions) were found.
pub fn content_classes(set: &SequenceSet, bucket: &[DeletionKey]) -> (Vec<Vec<DeletionKey>>, usize) {
    let mut classes: Vec<Vec<DeletionKey>> = Vec::with_capacity(1);
    for key in bucket {
        let class = classes.iter_mut().find(|class| {
            let rep = &class[0];
            set.subsequence_eq(rep.origin, rep.deleted_index(), key.origin, key.deleted_index())
        });
        match class {
            Some(class) => class.push(*key),
            None => classes.push(vec![*key]),
        }
    }
    let collisions = classes.len().saturating_sub(1);
    (classes, collisions)
}

/// Fold the keys of one content class into one member per origin
pub fn collect_members(class: &mut [DeletionKey]) -> Vec<Member> {
    class.sort_unstable_by_key(|k| (k.origin, k.position));

    let mut members: Vec<Member> = Vec::new();
    for key in class.iter() {
        let is_new = members.last().map_or(true, |m| m.origin != key.origin);
        if is_new {
            members.push(Member {
                origin: key.origin,
                sentinel: false,
                positions: Vec::new(),
            });
        }
        if let Some(member) = members.last_mut() {
            match key.deleted_index() {
                Some(i) => member.positions.push(i as u32),
                None => member.sentinel = true,
            }
        }
    }
    members
}

/// Group members by deletion position, adding every sentinel to each group
///
/// Each returned group is a set of node ids (sorted, deduplicated, size of at
/// least two) whose members are pairwise within one edit: equal deletion
/// positions give substitutions, sentinel against deletion gives an indel.
pub fn position_groups(members: &[Member]) -> Vec<Vec<NodeId>> {
    let sentinels: Vec<NodeId> = members.iter().filter(|m| m.sentinel).map(|m| m.origin).collect();

    let mut by_position: Vec<(u32, NodeId)> = members
        .iter()
        .flat_map(|m| m.positions.iter().map(move |&p| (p, m.origin)))
        .collect();
    by_position.sort_unstable();

    let mut groups = Vec::new();
    let mut start = 0;
    while start < by_position.len() {
        let position = by_position[start].0;
        let mut end = start;
        let mut group = sentinels.clone();
        while end < by_position.len() && by_position[end].0 == position {
            group.push(by_position[end].1);
            end += 1;
        }
        group.sort_unstable();
        group.dedup();
        if group.len() > 1 {
            groups.push(group);
        }
        start = end;
    }
    if by_position.is_empty() && sentinels.len() > 1 {
        groups.push(sentinels);
    }

    groups.sort_unstable();
    groups.dedup();
    groups
}

/// Merge duplicate pairs into one edge each
///
/// Edges are sorted by canonical endpoints; runs of the same pair collapse
/// into their first edge with the union of all positions. The output is in
/// canonical order, independent of the order classification produced it.
pub fn merge_edges(set: &SequenceSet, mut edges: Vec<Edge>) -> Vec<Edge> {
    edges.par_sort_unstable_by(|a, b| {
        canonical_edge_cmp(set, a, b).then_with(|| a.positions.cmp(&b.positions))
    });

    let mut merged: Vec<Edge> = Vec::with_capacity(edges.len());
    for edge in edges {
        match merged.last_mut() {
            Some(last) if last.pair() == edge.pair() => {
                debug_assert_eq!(last.kind, edge.kind, "one pair, two edit kinds");
                last.positions.extend_from_slice(&edge.positions);
                last.positions.sort_unstable();
                last.positions.dedup();
            }
            _ => merged.push(edge),
        }
    }
    merged
}
