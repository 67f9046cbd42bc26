//! Connected components over the edge set
//!
//! Clusters are built with a disjoint-set forest (union by rank, path
//! compression). Membership depends only on the edge set, not on the order
//! edges arrive in; cluster ids follow the canonical order of each cluster's
//! smallest member, so they are stable across runs as well.

use ahash::AHashMap;

use crate::edges::Edge;
use crate::sequence::{NodeId, SequenceSet};

/// Disjoint-set (union-find) with path compression.
#[derive(Debug)]
pub struct UnionFind {
    parent: Vec<u32>,
    rank: Vec<u8>,
}

impl UnionFind {
    /// Create `n` singleton sets
    pub fn new(n: usize) -> Self {
        Self {
            parent: (0..n as u32).collect(),
            rank: vec![0; n],
        }
    }

    /// Representative of the set containing `x`
    pub fn find(&mut self, x: u32) -> u32 {
        let mut root = x;
        while self.parent[root as usize] != root {
            root = self.parent[root as usize];
        }
        // Second pass points the whole path at the root
        let mut node = x;
        while self.parent[node as usize] != root {
            let next = self.parent[node as usize];
            self.parent[node as usize] = root;
            node = next;
        }
        root
    }

    /// Union by rank. Returns `true` if `a` and `b` were in different sets.
    pub fn union(&mut self, a: u32, b: u32) -> bool {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra == rb {
            return false;
        }
        let ra_idx = ra as usize;
        let rb_idx = rb as usize;
        if self.rank[ra_idx] < self.rank[rb_idx] {
            self.parent[ra_idx] = rb;
        } else if self.rank[ra_idx] > self.rank[rb_idx] {
            self.parent[rb_idx] = ra;
        } else {
            self.parent[rb_idx] = ra;
            self.rank[ra_idx] = self.rank[ra_idx].saturating_add(1);
        }
        true
    }
}

/// One connected component
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cluster {
    /// Cluster id, the index in [`Clustering::clusters`]
    pub id: usize,
    /// Members in canonical order; always at least two
    pub members: Vec<NodeId>,
}

impl Cluster {
    /// Number of members
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Never true for a built cluster; present for API symmetry
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Member sequences
    pub fn sequences<'a>(&'a self, set: &'a SequenceSet) -> impl Iterator<Item = &'a str> + 'a {
        self.members.iter().map(move |&id| set.as_str(id))
    }
}

/// Partition of all linked nodes into clusters
#[derive(Debug, Clone, Default)]
pub struct Clustering {
    clusters: Vec<Cluster>,
    /// Node id -> cluster id, `None` for isolated nodes
    assignment: Vec<Option<u32>>,
}

impl Clustering {
    /// All clusters, ordered by smallest member
    pub fn clusters(&self) -> &[Cluster] {
        &self.clusters
    }

    /// Number of clusters
    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    /// True when no edges were found
    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }

    /// Iterate over clusters
    pub fn iter(&self) -> std::slice::Iter<'_, Cluster> {
        self.clusters.iter()
    }

    /// Cluster holding `node`, `None` if the node has no edge
    pub fn cluster_of(&self, node: NodeId) -> Option<usize> {
        self.assignment.get(node as usize).copied().flatten().map(|c| c as usize)
    }

    /// Number of nodes covered by some cluster
    pub fn num_clustered(&self) -> usize {
        self.clusters.iter().map(Cluster::len).sum()
    }

    /// Size of the largest cluster
    pub fn max_cluster_size(&self) -> usize {
        self.clusters.iter().map(Cluster::len).max().unwrap_or(0)
    }

    /// Clusters as sets of strings
    pub fn to_strings(&self, set: &SequenceSet) -> Vec<Vec<String>> {
        self.clusters
            .iter()
            .map(|c| c.sequences(set).map(str::to_string).collect())
            .collect()
    }
}

/// Build clusters from an edge set
///
/// Nodes with no edge are left out; every other node of `set` belongs to
/// exactly one cluster.
pub fn build_clusters(set: &SequenceSet, edges: &[Edge]) -> Clustering {
    let n = set.len();
    let mut uf = UnionFind::new(n);
    let mut linked = vec![false; n];
    for edge in edges {
        uf.union(edge.left, edge.right);
        linked[edge.left as usize] = true;
        linked[edge.right as usize] = true;
    }

    let mut by_root: AHashMap<u32, Vec<NodeId>> = AHashMap::new();
    for id in set.ids().filter(|&id| linked[id as usize]) {
        by_root.entry(uf.find(id)).or_default().push(id);
    }

    let mut groups: Vec<Vec<NodeId>> = by_root.into_values().collect();
    for members in &mut groups {
        members.sort_unstable_by(|&a, &b| set.canonical_cmp(a, b));
    }
    groups.sort_unstable_by(|a, b| set.canonical_cmp(a[0], b[0]));

    let mut assignment = vec![None; n];
    let clusters = groups
        .into_iter()
        .enumerate()
        .map(|(id, members)| {
            for &m in &members {
                assignment[m as usize] = Some(id as u32);
            }
            Cluster { id, members }
        })
        .collect();

    Clustering {
        clusters,
        assignment,
    }
}
