// SwiftCR: all-pairs distance-one search over sequence collections
//
// Finds every pair of sequences one substitution, insertion/deletion or
// adjacent transposition apart using symmetric deletion keys, and groups
// linked sequences into clusters.

#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

pub mod constants;
pub mod error;
pub mod hasher;
pub mod model;
pub mod sequence;
pub mod edges;
pub mod cluster;
pub mod distance;
pub mod cancel;
pub mod pipeline;

// Re-export common types at crate root
pub use cancel::CancelToken;
pub use cluster::{build_clusters, Cluster, Clustering};
pub use edges::{Edge, EdgeView};
pub use error::{LinkError, Result, Stage};
pub use model::{DistanceModel, EditKind};
pub use sequence::{NodeId, SequenceSet};
pub use pipeline::{
    find_clusters, find_edges, EngineConfig, IdentityMode, InvalidInputPolicy, LinkEngine,
    LinkResult,
};

/// Version information
pub fn version() -> (u8, u8, u8) {
    constants::VERSION
}
