//! Batch pipeline finding distance-one pairs
//!
//! This module implements the multi-step linking pipeline:
//! 1. Validate input sequences and assign node ids
//! 2. Generate deletion keys for every sequence
//! 3. Sort keys globally and split them into candidate buckets
//! 4. Verify candidates and classify the edit separating each pair
//! 5. Merge duplicate reports into one edge per pair

pub mod config;
pub mod intake;
pub mod keys;
pub mod buckets;
pub mod ambiguity;
pub mod classify;
pub mod engine;

pub use config::{EngineConfig, IdentityMode, InvalidInputPolicy};
pub use intake::IntakeReport;
pub use keys::DeletionKey;
pub use engine::{find_clusters, find_edges, LinkEngine, LinkResult};
