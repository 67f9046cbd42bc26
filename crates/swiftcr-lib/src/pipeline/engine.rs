//! Engine orchestration
//!
//! Coordinates the batch pipeline for one distance model:
//! 1. Validate and pack the input sequences
//! 2. Generate deletion keys
//! 3. Sort keys and split them into candidate buckets
//! 4. Verify and classify candidate pairs, merge duplicates
//! 5. (on request) Merge edges into clusters
//!
//! A [`CancelToken`] is checked between steps; a tripped check discards the
//! output of the step that just finished.

use tracing::info;

use crate::cancel::CancelToken;
use crate::cluster::{build_clusters, Clustering};
use crate::edges::{Edge, EdgeView};
use crate::error::{LinkError, Result, Stage};
use crate::hasher::DeterministicHasher;
use crate::model::DistanceModel;
use crate::sequence::{NodeId, SequenceSet};

use super::buckets::{bucketize, BucketStatistics};
use super::classify::{classify_buckets, ClassificationStatistics};
use super::config::EngineConfig;
use super::intake::{intake, IntakeReport};
use super::keys::{estimate_memory_bytes, generate_keys};

/// Result of one engine run
#[derive(Debug, Clone)]
pub struct LinkResult {
    sequences: SequenceSet,
    model: DistanceModel,
    edges: Vec<Edge>,
    groups: Vec<Vec<NodeId>>,
    /// Input counters
    pub intake: IntakeReport,
    /// Key and bucket counters
    pub buckets: BucketStatistics,
    /// Pair and edge counters
    pub classification: ClassificationStatistics,
}

impl LinkResult {
    /// The sequences the run was computed over
    pub fn sequences(&self) -> &SequenceSet {
        &self.sequences
    }

    /// Model the edges were computed under
    pub fn model(&self) -> DistanceModel {
        self.model
    }

    /// Edges in canonical order
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Edges with their endpoint strings resolved
    pub fn edge_views(&self) -> impl Iterator<Item = EdgeView<'_>> + '_ {
        self.edges.iter().map(move |e| e.view(&self.sequences))
    }

    /// Connected components of the edge set
    pub fn clusters(&self) -> Clustering {
        build_clusters(&self.sequences, &self.edges)
    }

    /// Candidate groups: sets of sequences sharing one deletion key
    ///
    /// Empty unless the run was configured with `collect_groups`.
    pub fn candidate_groups(&self) -> &[Vec<NodeId>] {
        &self.groups
    }

    /// Take the edges, dropping the rest of the result
    pub fn into_edges(self) -> (SequenceSet, Vec<Edge>) {
        (self.sequences, self.edges)
    }
}

/// Batch engine finding all distance-one pairs of a sequence collection
pub struct LinkEngine {
    config: EngineConfig,
}

impl LinkEngine {
    /// Create a new engine with the given configuration
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Engine with default settings for `model`
    pub fn with_model(model: DistanceModel) -> Self {
        Self {
            config: EngineConfig::new(model),
        }
    }

    /// The engine's configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Find all distance-one edges of `sequences`
    ///
    /// # Parallelism
    /// The number of threads is controlled by `config.num_threads`:
    /// - `0` — use all available CPU cores (rayon default)
    /// - `1` — single-threaded
    /// - `N` — use exactly N threads
    pub fn run<I, S>(&self, sequences: I) -> Result<LinkResult>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.run_with_cancel(sequences, &CancelToken::new())
    }

    /// Like [`run`](Self::run), checking `cancel` between stages
    pub fn run_with_cancel<I, S>(&self, sequences: I, cancel: &CancelToken) -> Result<LinkResult>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        // Intake is sequential over the caller's iterator; do it before the
        // pool so the iterator need not be Send.
        self.config.print();
        info!("Step 1: Validating input sequences...");
        let (set, report) = intake(sequences, &self.config)?;
        info!(
            "  Accepted {} of {} sequences ({} nodes)",
            report.num_accepted,
            report.num_inputs,
            set.len()
        );
        cancel.check(Stage::Intake)?;

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.num_threads)
            .build()
            .map_err(|e| LinkError::ThreadPool(e.to_string()))?;

        pool.install(|| self.run_inner(set, report, cancel))
    }

    /// Find edges and merge them into clusters
    pub fn cluster<I, S>(&self, sequences: I) -> Result<(LinkResult, Clustering)>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.cluster_with_cancel(sequences, &CancelToken::new())
    }

    /// Like [`cluster`](Self::cluster), checking `cancel` between stages
    pub fn cluster_with_cancel<I, S>(
        &self,
        sequences: I,
        cancel: &CancelToken,
    ) -> Result<(LinkResult, Clustering)>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let result = self.run_with_cancel(sequences, cancel)?;
        info!("Step 5: Building clusters...");
        let clustering = result.clusters();
        info!(
            "  {} clusters covering {} sequences (largest {})",
            clustering.len(),
            clustering.num_clustered(),
            clustering.max_cluster_size()
        );
        cancel.check(Stage::Clustering)?;
        Ok((result, clustering))
    }

    /// Pipeline steps 2-4, runs inside the rayon thread pool
    fn run_inner(
        &self,
        set: SequenceSet,
        report: IntakeReport,
        cancel: &CancelToken,
    ) -> Result<LinkResult> {
        let model = self.config.model;
        let hasher = DeterministicHasher::new(self.config.seed);

        info!("Step 2: Generating deletion keys...");
        let mut keys = generate_keys(&set, model, &hasher);
        info!(
            "  Generated {} keys ({:.2} MB)",
            keys.len(),
            estimate_memory_bytes(keys.len()) as f64 / (1024.0 * 1024.0)
        );
        cancel.check(Stage::KeyGeneration)?;

        info!("Step 3: Sorting keys into buckets...");
        let (buckets, bucket_stats) = bucketize(&mut keys, model);
        info!("  {} candidate buckets", buckets.len());
        if self.config.verbose {
            bucket_stats.print_summary();
        }
        cancel.check(Stage::Bucketing)?;

        info!("Step 4: Classifying candidate pairs...");
        let classification =
            classify_buckets(&set, &keys, &buckets, model, self.config.collect_groups);
        drop(keys);
        info!("  Found {} edges", classification.edges.len());
        if self.config.verbose {
            classification.stats.print_summary();
        }
        cancel.check(Stage::Classification)?;

        Ok(LinkResult {
            sequences: set,
            model,
            edges: classification.edges,
            groups: classification.groups,
            intake: report,
            buckets: bucket_stats,
            classification: classification.stats,
        })
    }
}

/// Find all distance-one edges under `model` with default settings
///
/// Returns `(left, right, kind, positions)` tuples in canonical order.
pub fn find_edges<I, S>(
    sequences: I,
    model: DistanceModel,
) -> Result<Vec<(String, String, crate::model::EditKind, Vec<u32>)>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let result = LinkEngine::with_model(model).run(sequences)?;
    Ok(result
        .edge_views()
        .map(|e| (e.left.to_string(), e.right.to_string(), e.kind, e.positions.to_vec()))
        .collect())
}

/// Find all clusters under `model` with default settings
pub fn find_clusters<I, S>(sequences: I, model: DistanceModel) -> Result<Vec<Vec<String>>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let (result, clustering) = LinkEngine::with_model(model).cluster(sequences)?;
    Ok(clustering.to_strings(result.sequences()))
}
