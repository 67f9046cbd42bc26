//! Run configuration for the linking engine
//!
//! Collects the distance model, identity and input policies, hashing seed
//! and resource limits for one batch run.

use crate::constants::DEFAULT_SEED;
use crate::error::{LinkError, Result};
use crate::model::DistanceModel;

/// How equal input strings map onto graph nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IdentityMode {
    /// Equal strings collapse into one node; multiplicity is recorded
    #[default]
    Distinct,
    /// Every input position is its own node, duplicates included
    Occurrence,
}

/// What to do with sequences that cannot take part in the run
///
/// Exactly one policy applies to a whole run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InvalidInputPolicy {
    /// Drop them and log how many were dropped
    #[default]
    Skip,
    /// Fail on the first one with [`LinkError::InvalidSequence`]
    Reject,
}

/// Configuration parameters for one engine run
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Distance model deciding which pairs are edges
    pub model: DistanceModel,

    /// Value or per-occurrence node identity
    pub identity: IdentityMode,

    /// Handling of too-short or malformed sequences
    pub invalid_input: InvalidInputPolicy,

    /// Allowed symbols; `None` accepts any printable ASCII symbol
    pub alphabet: Option<Vec<u8>>,

    /// Also collect candidate groups (sets sharing one deletion key)
    pub collect_groups: bool,

    /// Seed for the key hasher
    pub seed: u64,

    /// Number of threads for parallel stages (0 = all available cores)
    pub num_threads: usize,

    /// Verbose output during the run
    pub verbose: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            model: DistanceModel::Levenshtein,
            identity: IdentityMode::Distinct,
            invalid_input: InvalidInputPolicy::Skip,
            alphabet: None,
            collect_groups: false,
            seed: DEFAULT_SEED,
            num_threads: 0, // 0 = use all available cores
            verbose: false,
        }
    }
}

impl EngineConfig {
    /// Create a configuration for the given model with default settings
    pub fn new(model: DistanceModel) -> Self {
        Self {
            model,
            ..Self::default()
        }
    }

    /// Create a configuration from a textual model selector
    pub fn from_model_name(name: &str) -> Result<Self> {
        Ok(Self::new(name.parse()?))
    }

    /// Validate the configuration parameters
    pub fn validate(&self) -> Result<()> {
        if let Some(alphabet) = &self.alphabet {
            if alphabet.is_empty() {
                return Err(LinkError::InvalidConfig("alphabet must not be empty".into()));
            }
            if let Some(&bad) = alphabet.iter().find(|&&s| !crate::constants::is_valid_symbol(s)) {
                return Err(LinkError::InvalidConfig(format!(
                    "alphabet contains non-printable symbol 0x{bad:02x}"
                )));
            }
        }
        Ok(())
    }

    /// Whether `symbol` is allowed by the configured alphabet
    #[inline]
    pub fn accepts_symbol(&self, symbol: u8) -> bool {
        match &self.alphabet {
            Some(alphabet) => alphabet.contains(&symbol),
            None => crate::constants::is_valid_symbol(symbol),
        }
    }

    /// Log configuration parameters via tracing
    pub fn print(&self) {
        tracing::info!("Engine Configuration:");
        tracing::info!("  model = {}", self.model);
        tracing::info!("  identity = {:?}", self.identity);
        tracing::info!("  invalid_input = {:?}", self.invalid_input);
        if self.num_threads == 0 {
            tracing::info!("  num_threads = all available cores");
        } else {
            tracing::info!("  num_threads = {}", self.num_threads);
        }
        match &self.alphabet {
            Some(alphabet) => {
                tracing::debug!("  alphabet = {}", String::from_utf8_lossy(alphabet))
            }
            None => tracing::debug!("  alphabet = any printable ASCII"),
        }
        tracing::debug!("  collect_groups = {}", self.collect_groups);
        tracing::debug!("  seed = {}", self.seed);
        tracing::debug!("  verbose = {}", self.verbose);
    }
}
