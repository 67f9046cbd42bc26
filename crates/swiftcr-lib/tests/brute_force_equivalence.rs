//! Property tests: the engine agrees with exhaustive pairwise comparison.
//!
//! Verifies, on random corpora over small alphabets (where runs of repeated
//! symbols and near-duplicates are common):
//! 1. No missed pairs and no false pairs, for every model
//! 2. Edit kinds and positions match the direct classification
//! 3. Results do not depend on the thread count or hash seed
//! 4. Clusters partition exactly the linked sequences

use proptest::prelude::*;
use std::collections::HashSet;

use swiftcr_lib::distance::brute_force_edges;
use swiftcr_lib::{DistanceModel, EngineConfig, IdentityMode, LinkEngine};

// ============================================================================
// STRATEGIES
// ============================================================================

/// Short sequences over a two-letter alphabet.
fn binary_corpus() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(prop::string::string_regex("[AB]{2,6}").unwrap(), 0..40)
}

/// Sequences over a four-letter alphabet with mixed lengths.
fn dna_corpus() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(prop::string::string_regex("[ACGT]{2,7}").unwrap(), 0..60)
}

fn model_strategy() -> impl Strategy<Value = DistanceModel> {
    prop_oneof![
        Just(DistanceModel::Hamming),
        Just(DistanceModel::Levenshtein),
        Just(DistanceModel::Damerau),
    ]
}

// ============================================================================
// EQUIVALENCE PROPERTIES
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Property: engine edges equal brute-force edges on binary corpora.
    #[test]
    fn prop_matches_brute_force_binary(seqs in binary_corpus(), model in model_strategy()) {
        let result = LinkEngine::with_model(model).run(&seqs).unwrap();
        let expected = brute_force_edges(result.sequences(), model);
        prop_assert_eq!(result.edges(), expected.as_slice());
    }

    /// Property: engine edges equal brute-force edges on DNA-like corpora.
    #[test]
    fn prop_matches_brute_force_dna(seqs in dna_corpus(), model in model_strategy()) {
        let result = LinkEngine::with_model(model).run(&seqs).unwrap();
        let expected = brute_force_edges(result.sequences(), model);
        prop_assert_eq!(result.edges(), expected.as_slice());
    }

    /// Property: occurrence identity matches brute force too (duplicates
    /// are never linked to each other).
    #[test]
    fn prop_matches_brute_force_occurrences(seqs in binary_corpus(), model in model_strategy()) {
        let config = EngineConfig { identity: IdentityMode::Occurrence, ..EngineConfig::new(model) };
        let result = LinkEngine::new(config).unwrap().run(&seqs).unwrap();
        let expected = brute_force_edges(result.sequences(), model);
        prop_assert_eq!(result.edges(), expected.as_slice());
    }

    /// Property: thread count and seed do not change the output.
    #[test]
    fn prop_independent_of_threads_and_seed(
        seqs in binary_corpus(),
        model in model_strategy(),
        seed in any::<u64>(),
    ) {
        let reference = LinkEngine::with_model(model).run(&seqs).unwrap();
        let config = EngineConfig { num_threads: 1, seed, ..EngineConfig::new(model) };
        let other = LinkEngine::new(config).unwrap().run(&seqs).unwrap();
        prop_assert_eq!(reference.edges(), other.edges());
    }

    /// Property: one edge per unordered pair, endpoints in canonical order.
    #[test]
    fn prop_edges_unique_and_canonical(seqs in dna_corpus(), model in model_strategy()) {
        let result = LinkEngine::with_model(model).run(&seqs).unwrap();
        let set = result.sequences();
        let mut seen = HashSet::new();
        for edge in result.edges() {
            prop_assert!(set.canonical_cmp(edge.left, edge.right).is_lt());
            prop_assert!(seen.insert(edge.pair()), "duplicate pair {:?}", edge.pair());
            prop_assert!(!edge.positions.is_empty());
            prop_assert!(edge.positions.windows(2).all(|w| w[0] < w[1]));
        }
    }

    /// Property: clusters cover exactly the linked nodes, each once.
    #[test]
    fn prop_clusters_partition_linked_nodes(seqs in binary_corpus(), model in model_strategy()) {
        let result = LinkEngine::with_model(model).run(&seqs).unwrap();
        let clustering = result.clusters();

        let linked: HashSet<u32> = result.edges().iter().flat_map(|e| [e.left, e.right]).collect();
        let mut covered = HashSet::new();
        for cluster in clustering.iter() {
            prop_assert!(cluster.len() >= 2);
            for &m in &cluster.members {
                prop_assert!(covered.insert(m), "node {} in two clusters", m);
            }
        }
        prop_assert_eq!(covered, linked);

        for edge in result.edges() {
            prop_assert_eq!(clustering.cluster_of(edge.left), clustering.cluster_of(edge.right));
        }
    }
}
