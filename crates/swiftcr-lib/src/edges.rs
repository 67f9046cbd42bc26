//! Verified distance-one edges

use std::cmp::Ordering;

use crate::constants::POSITION_SEPARATOR;
use crate::model::EditKind;
use crate::sequence::{NodeId, SequenceSet};

/// An undirected distance-one edge between two nodes
///
/// Endpoints are stored in canonical order (`left` before `right` under
/// [`SequenceSet::canonical_cmp`]). `positions` is sorted and holds:
/// - substitution: the single differing index
/// - insertion/deletion: every index of the longer sequence whose deletion
///   yields the shorter one (more than one inside a run of repeats)
/// - transposition: `[p, p + 1]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    /// Canonically smaller endpoint
    pub left: NodeId,
    /// Canonically larger endpoint
    pub right: NodeId,
    /// Edit separating the endpoints
    pub kind: EditKind,
    /// Edit position(s), see type docs
    pub positions: Vec<u32>,
}

impl Edge {
    /// Create an edge, putting the endpoints in canonical order
    pub fn new(
        set: &SequenceSet,
        a: NodeId,
        b: NodeId,
        kind: EditKind,
        positions: Vec<u32>,
    ) -> Self {
        let (left, right) = if set.canonical_cmp(a, b) == Ordering::Greater {
            (b, a)
        } else {
            (a, b)
        };
        Self {
            left,
            right,
            kind,
            positions,
        }
    }

    /// Endpoints as a pair
    #[inline]
    pub fn pair(&self) -> (NodeId, NodeId) {
        (self.left, self.right)
    }

    /// True if the edit position is not unique
    pub fn is_ambiguous(&self) -> bool {
        self.kind == EditKind::InsertionDeletion && self.positions.len() > 1
    }

    /// Positions rendered as text, e.g. `"3"` or `"1|2"`
    pub fn position_label(&self) -> String {
        render_positions(&self.positions)
    }

    /// Borrow the endpoint strings from the set the edge was built over
    pub fn view<'a>(&'a self, set: &'a SequenceSet) -> EdgeView<'a> {
        EdgeView {
            left: set.as_str(self.left),
            right: set.as_str(self.right),
            kind: self.kind,
            positions: &self.positions,
        }
    }
}

/// Compare edges by their canonical endpoints
pub fn canonical_edge_cmp(set: &SequenceSet, a: &Edge, b: &Edge) -> Ordering {
    set.canonical_cmp(a.left, b.left)
        .then_with(|| set.canonical_cmp(a.right, b.right))
}

/// Join positions with [`POSITION_SEPARATOR`]
pub fn render_positions(positions: &[u32]) -> String {
    positions
        .iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join(POSITION_SEPARATOR.to_string().as_str())
}

/// An edge with its endpoint strings resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeView<'a> {
    /// Canonically smaller sequence
    pub left: &'a str,
    /// Canonically larger sequence
    pub right: &'a str,
    /// Edit separating the two
    pub kind: EditKind,
    /// Edit position(s)
    pub positions: &'a [u32],
}
