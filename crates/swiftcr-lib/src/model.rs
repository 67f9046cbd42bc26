//! Distance models and edit kinds
//!
//! The model selects only two things in the pipeline: whether the whole
//! sequence is keyed as a sentinel (length-sensitive models) and which
//! classification rules apply to a bucket.

use std::fmt;
use std::str::FromStr;

use crate::error::LinkError;

/// Which edit operations count towards distance one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DistanceModel {
    /// Substitutions only; both sequences must have the same length
    Hamming,
    /// Substitution or a single insertion/deletion
    Levenshtein,
    /// Levenshtein plus one adjacent transposition
    Damerau,
}

impl DistanceModel {
    /// All models, in order of increasing permissiveness
    pub const ALL: [DistanceModel; 3] = [
        DistanceModel::Hamming,
        DistanceModel::Levenshtein,
        DistanceModel::Damerau,
    ];

    /// Whether sequences of different lengths may be linked
    #[inline]
    pub fn is_length_sensitive(self) -> bool {
        !matches!(self, DistanceModel::Hamming)
    }

    /// Whether adjacent transpositions are edges
    #[inline]
    pub fn allows_transposition(self) -> bool {
        matches!(self, DistanceModel::Damerau)
    }

    /// Canonical lowercase name
    pub fn name(self) -> &'static str {
        match self {
            DistanceModel::Hamming => "hamming",
            DistanceModel::Levenshtein => "levenshtein",
            DistanceModel::Damerau => "damerau",
        }
    }
}

impl fmt::Display for DistanceModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DistanceModel {
    type Err = LinkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hamming" => Ok(DistanceModel::Hamming),
            "levenshtein" | "lev" => Ok(DistanceModel::Levenshtein),
            "damerau" | "damerau-levenshtein" | "dl" => Ok(DistanceModel::Damerau),
            _ => Err(LinkError::UnknownModel(s.to_string())),
        }
    }
}

/// The single edit that separates the two endpoints of an edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EditKind {
    /// One symbol replaced by another
    Substitution,
    /// One symbol inserted into the shorter / deleted from the longer sequence
    InsertionDeletion,
    /// Two adjacent symbols swapped
    Transposition,
}

impl EditKind {
    /// Short name used in tabular output
    pub fn name(self) -> &'static str {
        match self {
            EditKind::Substitution => "substitution",
            EditKind::InsertionDeletion => "indel",
            EditKind::Transposition => "transposition",
        }
    }
}

impl fmt::Display for EditKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_models() {
        assert_eq!("hamming".parse::<DistanceModel>().unwrap(), DistanceModel::Hamming);
        assert_eq!("Lev".parse::<DistanceModel>().unwrap(), DistanceModel::Levenshtein);
        assert_eq!("levenshtein".parse::<DistanceModel>().unwrap(), DistanceModel::Levenshtein);
        assert_eq!("DL".parse::<DistanceModel>().unwrap(), DistanceModel::Damerau);
        assert_eq!(
            "damerau-levenshtein".parse::<DistanceModel>().unwrap(),
            DistanceModel::Damerau
        );
    }

    #[test]
    fn test_unknown_model_is_rejected() {
        let err = "jaccard".parse::<DistanceModel>().unwrap_err();
        assert_eq!(err, LinkError::UnknownModel("jaccard".to_string()));
        assert!("".parse::<DistanceModel>().is_err());
    }

    #[test]
    fn test_display_round_trip() {
        for model in DistanceModel::ALL {
            assert_eq!(model.to_string().parse::<DistanceModel>().unwrap(), model);
        }
    }

    #[test]
    fn test_model_flags() {
        assert!(!DistanceModel::Hamming.is_length_sensitive());
        assert!(DistanceModel::Levenshtein.is_length_sensitive());
        assert!(DistanceModel::Damerau.is_length_sensitive());
        assert!(DistanceModel::Damerau.allows_transposition());
        assert!(!DistanceModel::Levenshtein.allows_transposition());
    }
}
