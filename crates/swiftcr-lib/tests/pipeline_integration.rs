//! Integration tests for the linking pipeline
//!
//! These tests run the full engine from raw strings to edges and clusters.

use std::collections::HashSet;

use swiftcr_lib::pipeline::buckets::bucketize;
use swiftcr_lib::pipeline::intake::intake;
use swiftcr_lib::pipeline::keys::{generate_keys, keys_per_sequence};
use swiftcr_lib::hasher::DeterministicHasher;
use swiftcr_lib::{
    find_clusters, find_edges, CancelToken, DistanceModel, EditKind, EngineConfig, IdentityMode,
    InvalidInputPolicy, LinkEngine, LinkError, Stage,
};

const CORPUS: [&str; 5] = ["ABCD", "ABCE", "ABXD", "XBCD", "ABC"];

fn edge_strings(seqs: &[&str], model: DistanceModel) -> Vec<(String, String, EditKind, Vec<u32>)> {
    find_edges(seqs.iter().copied(), model).unwrap()
}

fn pairs(seqs: &[&str], model: DistanceModel) -> HashSet<(String, String)> {
    edge_strings(seqs, model).into_iter().map(|(a, b, _, _)| (a, b)).collect()
}

fn edge(a: &str, b: &str, kind: EditKind, positions: &[u32]) -> (String, String, EditKind, Vec<u32>) {
    (a.to_string(), b.to_string(), kind, positions.to_vec())
}

#[test]
fn test_hamming_corpus() {
    assert_eq!(
        edge_strings(&CORPUS, DistanceModel::Hamming),
        vec![
            edge("ABCD", "ABCE", EditKind::Substitution, &[3]),
            edge("ABCD", "ABXD", EditKind::Substitution, &[2]),
            edge("ABCD", "XBCD", EditKind::Substitution, &[0]),
        ]
    );
}

#[test]
fn test_levenshtein_corpus() {
    assert_eq!(
        edge_strings(&CORPUS, DistanceModel::Levenshtein),
        vec![
            edge("ABC", "ABCD", EditKind::InsertionDeletion, &[3]),
            edge("ABC", "ABCE", EditKind::InsertionDeletion, &[3]),
            edge("ABCD", "ABCE", EditKind::Substitution, &[3]),
            edge("ABCD", "ABXD", EditKind::Substitution, &[2]),
            edge("ABCD", "XBCD", EditKind::Substitution, &[0]),
        ]
    );
}

#[test]
fn test_damerau_transpositions() {
    assert_eq!(
        edge_strings(&["AB", "BA"], DistanceModel::Damerau),
        vec![edge("AB", "BA", EditKind::Transposition, &[0, 1])]
    );
    assert!(edge_strings(&["AB", "BA"], DistanceModel::Levenshtein).is_empty());
    assert!(edge_strings(&["AB", "BA"], DistanceModel::Hamming).is_empty());

    assert_eq!(
        edge_strings(&["CASSL", "CASLS"], DistanceModel::Damerau),
        vec![edge("CASLS", "CASSL", EditKind::Transposition, &[3, 4])]
    );

    assert_eq!(
        edge_strings(&["AAB", "ABA", "BAA"], DistanceModel::Damerau),
        vec![
            edge("AAB", "ABA", EditKind::Transposition, &[1, 2]),
            edge("ABA", "BAA", EditKind::Transposition, &[0, 1]),
        ]
    );
}

#[test]
fn test_indel_inside_run_lists_every_position() {
    assert_eq!(
        edge_strings(&["AAB", "AB"], DistanceModel::Levenshtein),
        vec![edge("AAB", "AB", EditKind::InsertionDeletion, &[0, 1])]
    );
    assert_eq!(
        edge_strings(&["CAAAT", "CAAT"], DistanceModel::Damerau),
        vec![edge("CAAAT", "CAAT", EditKind::InsertionDeletion, &[1, 2, 3])]
    );
}

#[test]
fn test_distance_two_pairs_are_not_linked() {
    // Share a deletion key but are two edits apart
    assert!(edge_strings(&["ABX", "XAB"], DistanceModel::Damerau).is_empty());
    assert!(edge_strings(&["ABC", "CBA"], DistanceModel::Damerau).is_empty());
    assert!(edge_strings(&["ABC", "ABCDE"], DistanceModel::Levenshtein).is_empty());
}

#[test]
fn test_input_order_does_not_matter() {
    let mut reversed = CORPUS;
    reversed.reverse();
    for model in DistanceModel::ALL {
        assert_eq!(edge_strings(&CORPUS, model), edge_strings(&reversed, model));
    }
}

#[test]
fn test_repeated_runs_are_identical() {
    let engine = LinkEngine::with_model(DistanceModel::Damerau);
    let first = engine.run(CORPUS).unwrap();
    let second = engine.run(CORPUS).unwrap();
    assert_eq!(first.edges(), second.edges());
}

#[test]
fn test_models_are_nested() {
    let seqs = ["ABCD", "ABDC", "ABC", "BACD", "ABCC", "AABCD", "XBCD"];
    let hamming = pairs(&seqs, DistanceModel::Hamming);
    let levenshtein = pairs(&seqs, DistanceModel::Levenshtein);
    let damerau = pairs(&seqs, DistanceModel::Damerau);
    assert!(hamming.is_subset(&levenshtein));
    assert!(levenshtein.is_subset(&damerau));
    assert!(damerau.contains(&("ABCD".to_string(), "ABDC".to_string())));
    assert!(!levenshtein.contains(&("ABCD".to_string(), "ABDC".to_string())));
}

#[test]
fn test_duplicates_fold_in_distinct_mode() {
    let result = LinkEngine::with_model(DistanceModel::Hamming)
        .run(["AB", "AC", "AB", "AB"])
        .unwrap();
    assert_eq!(result.sequences().len(), 2);
    assert_eq!(result.intake.num_duplicates, 2);
    let ab = result.sequences().find("AB").unwrap();
    assert_eq!(result.sequences().multiplicity(ab), 3);
    assert_eq!(result.edges().len(), 1);
}

#[test]
fn test_occurrence_mode_keeps_duplicates() {
    let config = EngineConfig {
        identity: IdentityMode::Occurrence,
        ..EngineConfig::new(DistanceModel::Levenshtein)
    };
    let result = LinkEngine::new(config).unwrap().run(["AB", "AC", "AB", "A"]).unwrap();
    // "A" is too short to take part
    assert_eq!(result.intake.num_skipped_length, 1);
    assert_eq!(result.sequences().len(), 3);
    assert_eq!(result.edges().len(), 2);
    assert!(result.classification.num_identical_pairs > 0);

    let clusters = result.clusters();
    assert_eq!(clusters.len(), 1);
    assert_eq!(clusters.clusters()[0].len(), 3);
}

#[test]
fn test_invalid_input_policies() {
    let inputs = ["ABC", "AB C", "ABD", "X"];
    let result = LinkEngine::with_model(DistanceModel::Hamming).run(inputs).unwrap();
    assert_eq!(result.intake.num_accepted, 2);
    assert_eq!(result.intake.num_skipped_symbols, 1);
    assert_eq!(result.intake.num_skipped_length, 1);
    assert_eq!(result.edges().len(), 1);

    let strict = EngineConfig {
        invalid_input: InvalidInputPolicy::Reject,
        ..EngineConfig::new(DistanceModel::Hamming)
    };
    let err = LinkEngine::new(strict).unwrap().run(inputs).unwrap_err();
    assert!(matches!(err, LinkError::InvalidSequence { index: 1, .. }));
}

#[test]
fn test_restricted_alphabet() {
    let config = EngineConfig {
        alphabet: Some(b"ACGT".to_vec()),
        ..EngineConfig::new(DistanceModel::Hamming)
    };
    let result = LinkEngine::new(config).unwrap().run(["ACGT", "ACGA", "ACGN"]).unwrap();
    assert_eq!(result.sequences().len(), 2);
    assert_eq!(result.edges().len(), 1);
}

#[test]
fn test_unknown_model_name() {
    assert!(matches!(
        EngineConfig::from_model_name("jaro"),
        Err(LinkError::UnknownModel(name)) if name == "jaro"
    ));
    assert_eq!(
        EngineConfig::from_model_name("damerau").unwrap().model,
        DistanceModel::Damerau
    );
}

#[test]
fn test_cancellation_discards_output() {
    let token = CancelToken::new();
    token.cancel();
    let err = LinkEngine::with_model(DistanceModel::Levenshtein)
        .run_with_cancel(CORPUS, &token)
        .unwrap_err();
    assert!(matches!(err, LinkError::Cancelled { stage: Stage::Intake }));

    let live = CancelToken::new();
    let (result, clusters) = LinkEngine::with_model(DistanceModel::Levenshtein)
        .cluster_with_cancel(CORPUS, &live)
        .unwrap();
    assert_eq!(result.edges().len(), 5);
    assert_eq!(clusters.len(), 1);
}

#[test]
fn test_clusters_partition_linked_sequences() {
    let seqs = ["AAAA", "AAAB", "AABB", "CCCC", "CCCD", "GGGG", "TTTT", "TTTA", "TTAA"];
    let result = LinkEngine::with_model(DistanceModel::Hamming).run(seqs).unwrap();
    let clustering = result.clusters();
    assert_eq!(
        clustering.to_strings(result.sequences()),
        vec![
            vec!["AAAA", "AAAB", "AABB"],
            vec!["CCCC", "CCCD"],
            vec!["TTAA", "TTTA", "TTTT"],
        ]
    );

    // Every edge stays inside one cluster
    for e in result.edges() {
        assert_eq!(clustering.cluster_of(e.left), clustering.cluster_of(e.right));
        assert!(clustering.cluster_of(e.left).is_some());
    }
    let gggg = result.sequences().find("GGGG").unwrap();
    assert_eq!(clustering.cluster_of(gggg), None);
    assert_eq!(clustering.num_clustered(), 8);
}

#[test]
fn test_find_clusters() {
    let clusters = find_clusters(["AB", "BA", "XY", "XZ", "QQ"], DistanceModel::Damerau).unwrap();
    assert_eq!(
        clusters,
        vec![
            vec!["AB".to_string(), "BA".to_string()],
            vec!["XY".to_string(), "XZ".to_string()],
        ]
    );
}

#[test]
fn test_candidate_groups() {
    let config = EngineConfig {
        collect_groups: true,
        ..EngineConfig::new(DistanceModel::Hamming)
    };
    let result = LinkEngine::new(config).unwrap().run(["ABCD", "ABCE", "ABCF"]).unwrap();
    assert_eq!(result.candidate_groups(), &[vec![0, 1, 2]]);
    assert_eq!(result.edges().len(), 3);

    let config = EngineConfig {
        collect_groups: true,
        ..EngineConfig::new(DistanceModel::Levenshtein)
    };
    let result = LinkEngine::new(config).unwrap().run(["AB", "ABC", "ABD"]).unwrap();
    assert_eq!(result.candidate_groups(), &[vec![0, 1, 2]]);

    // Not collected by default
    let result = LinkEngine::with_model(DistanceModel::Hamming).run(["ABCD", "ABCE"]).unwrap();
    assert!(result.candidate_groups().is_empty());
}

#[test]
fn test_key_and_bucket_stages() {
    let config = EngineConfig::new(DistanceModel::Levenshtein);
    let (set, _) = intake(CORPUS, &config).unwrap();
    let hasher = DeterministicHasher::new(config.seed);
    let mut keys = generate_keys(&set, config.model, &hasher);

    let expected: usize = set.iter().map(|s| keys_per_sequence(s.len(), config.model)).sum();
    assert_eq!(keys.len(), expected);

    let (buckets, stats) = bucketize(&mut keys, config.model);
    assert_eq!(stats.num_keys, expected as u64);
    assert_eq!(stats.num_buckets, buckets.len() as u64);
    // "ABC" (sentinel of ABC, ABCD and ABCE at 3), "ABD" and "BCD"
    assert_eq!(buckets.len(), 3);
    for range in &buckets {
        assert!(range.len() >= 2);
    }
}
