//! Packed storage for the input sequences of one run
//!
//! All accepted sequences live back to back in a single buffer, addressed by
//! an offsets vector, in the same spirit as a spectrum-preserving string set.
//! A node id (`u32`) indexes a sequence in this set; keys, edges and clusters
//! refer to sequences only through these ids.

use std::cmp::Ordering;

use crate::pipeline::config::IdentityMode;

/// Node id of a sequence inside a [`SequenceSet`]
pub type NodeId = u32;

/// Read-only set of validated sequences
///
/// In [`IdentityMode::Distinct`] ids follow the lexicographic order of the
/// content, so the node numbering does not depend on input order. In
/// [`IdentityMode::Occurrence`] ids follow input order.
#[derive(Debug, Clone, Default)]
pub struct SequenceSet {
    /// Concatenated symbols; ASCII only, so any offset is a char boundary
    data: String,
    /// `offsets[i]..offsets[i + 1]` is sequence `i`
    offsets: Vec<usize>,
    /// Number of input occurrences folded into each node
    multiplicity: Vec<u32>,
    /// Index in the caller's input of the first occurrence of each node
    source_index: Vec<usize>,
    identity: IdentityMode,
}

impl SequenceSet {
    /// Assemble a set from already validated parts
    pub(crate) fn from_parts(
        data: String,
        offsets: Vec<usize>,
        multiplicity: Vec<u32>,
        source_index: Vec<usize>,
        identity: IdentityMode,
    ) -> Self {
        debug_assert_eq!(offsets.len(), multiplicity.len() + 1);
        debug_assert_eq!(multiplicity.len(), source_index.len());
        Self {
            data,
            offsets,
            multiplicity,
            source_index,
            identity,
        }
    }

    /// Number of nodes
    #[inline]
    pub fn len(&self) -> usize {
        self.multiplicity.len()
    }

    /// True if no sequence was accepted
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.multiplicity.is_empty()
    }

    /// Identity mode the set was built with
    pub fn identity(&self) -> IdentityMode {
        self.identity
    }

    /// Symbols of a node
    #[inline]
    pub fn get(&self, id: NodeId) -> &[u8] {
        self.as_str(id).as_bytes()
    }

    /// Symbols of a node as a string slice
    #[inline]
    pub fn as_str(&self, id: NodeId) -> &str {
        let i = id as usize;
        &self.data[self.offsets[i]..self.offsets[i + 1]]
    }

    /// Length of a node's sequence
    #[inline]
    pub fn length(&self, id: NodeId) -> usize {
        let i = id as usize;
        self.offsets[i + 1] - self.offsets[i]
    }

    /// How many input strings were folded into this node (always 1 in occurrence mode)
    pub fn multiplicity(&self, id: NodeId) -> u32 {
        self.multiplicity[id as usize]
    }

    /// Input index of the first occurrence of this node
    pub fn source_index(&self, id: NodeId) -> usize {
        self.source_index[id as usize]
    }

    /// Total number of symbols stored
    pub fn total_symbols(&self) -> usize {
        self.data.len()
    }

    /// Iterate over all node ids
    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.len()).map(|i| i as NodeId)
    }

    /// Iterate over all sequences in id order
    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        self.ids().map(move |id| self.as_str(id))
    }

    /// Look up the node holding `sequence` (first occurrence in occurrence mode)
    pub fn find(&self, sequence: &str) -> Option<NodeId> {
        match self.identity {
            IdentityMode::Distinct => {
                let mut lo = 0usize;
                let mut hi = self.len();
                while lo < hi {
                    let mid = lo + (hi - lo) / 2;
                    match self.as_str(mid as NodeId).cmp(sequence) {
                        Ordering::Less => lo = mid + 1,
                        Ordering::Greater => hi = mid,
                        Ordering::Equal => return Some(mid as NodeId),
                    }
                }
                None
            }
            IdentityMode::Occurrence => self.ids().find(|&id| self.as_str(id) == sequence),
        }
    }

    /// Canonical order of nodes: by content, then by id
    ///
    /// Edge endpoints and cluster members are arranged in this order.
    #[inline]
    pub fn canonical_cmp(&self, a: NodeId, b: NodeId) -> Ordering {
        self.get(a).cmp(self.get(b)).then(a.cmp(&b))
    }

    /// Compare two deletion views symbol by symbol
    ///
    /// `skip_a`/`skip_b` name the index removed from each sequence, `None`
    /// meaning the whole sequence. This is the content check that backs up
    /// every hash match.
    pub fn subsequence_eq(
        &self,
        a: NodeId,
        skip_a: Option<usize>,
        b: NodeId,
        skip_b: Option<usize>,
    ) -> bool {
        let sa = self.get(a);
        let sb = self.get(b);
        let len_a = sa.len() - usize::from(skip_a.is_some());
        let len_b = sb.len() - usize::from(skip_b.is_some());
        if len_a != len_b {
            return false;
        }
        let view_a = sa.iter().enumerate().filter(|&(i, _)| Some(i) != skip_a).map(|(_, s)| s);
        let view_b = sb.iter().enumerate().filter(|&(i, _)| Some(i) != skip_b).map(|(_, s)| s);
        view_a.eq(view_b)
    }
}
