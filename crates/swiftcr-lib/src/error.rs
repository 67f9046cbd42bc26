//! Error type for the linking engine

use thiserror::Error;

/// Pipeline stage, reported when a run is cancelled between phases
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Validating and storing the input sequences
    Intake,
    /// Generating deletion keys
    KeyGeneration,
    /// Sorting keys and splitting them into buckets
    Bucketing,
    /// Verifying and classifying candidate pairs
    Classification,
    /// Merging edges into connected components
    Clustering,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::Intake => "intake",
            Stage::KeyGeneration => "key generation",
            Stage::Bucketing => "bucketing",
            Stage::Classification => "classification",
            Stage::Clustering => "clustering",
        };
        f.write_str(name)
    }
}

/// Errors reported by the engine
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LinkError {
    /// An input sequence failed validation (only under the reject policy)
    #[error("invalid sequence at input index {index}: {reason}")]
    InvalidSequence {
        /// Position of the sequence in the caller's input
        index: usize,
        /// What was wrong with it
        reason: String,
    },
    /// The distance model selector is not recognised
    #[error("unknown distance model {0:?} (expected hamming, levenshtein or damerau)")]
    UnknownModel(String),
    /// A configuration parameter is out of range
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// The run was cancelled or its deadline passed
    #[error("run cancelled after {stage}")]
    Cancelled {
        /// Last stage that completed before the check tripped
        stage: Stage,
    },
    /// The worker pool could not be created
    #[error("failed to create thread pool: {0}")]
    ThreadPool(String),
}

/// Result alias used throughout the library
pub type Result<T> = std::result::Result<T, LinkError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = LinkError::UnknownModel("jaro".to_string());
        assert!(err.to_string().contains("\"jaro\""));

        let err = LinkError::Cancelled { stage: Stage::Bucketing };
        assert_eq!(err.to_string(), "run cancelled after bucketing");

        let err = LinkError::InvalidSequence { index: 3, reason: "too short".into() };
        assert_eq!(err.to_string(), "invalid sequence at input index 3: too short");
    }
}
