//! Input validation and packing
//!
//! Validates caller strings against the run's policy and packs the accepted
//! ones into a [`SequenceSet`]. In distinct mode equal strings are folded
//! into one node after a parallel sort by content.

use std::fmt;

use rayon::prelude::*;
use tracing::{debug, warn};

use crate::constants::{MAX_SEQUENCE_LENGTH, MIN_SEQUENCE_LENGTH};
use crate::error::{LinkError, Result};
use crate::sequence::{NodeId, SequenceSet};

use super::config::{EngineConfig, IdentityMode, InvalidInputPolicy};

/// Why an input string cannot take part in a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// Shorter than [`MIN_SEQUENCE_LENGTH`]
    TooShort(usize),
    /// Longer than [`MAX_SEQUENCE_LENGTH`]
    TooLong(usize),
    /// Contains a symbol outside the configured alphabet
    InvalidSymbol {
        /// The offending character
        symbol: char,
        /// Its character position in the input
        position: usize,
    },
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::TooShort(len) => write!(
                f,
                "sequence of length {len} is shorter than the minimum of {MIN_SEQUENCE_LENGTH}"
            ),
            Rejection::TooLong(len) => write!(f, "sequence of length {len} is too long"),
            Rejection::InvalidSymbol { symbol, position } => {
                write!(f, "invalid symbol {symbol:?} at position {position}")
            }
        }
    }
}

/// Check one input string against the configuration
pub fn check_sequence(sequence: &str, config: &EngineConfig) -> std::result::Result<(), Rejection> {
    for (position, symbol) in sequence.chars().enumerate() {
        if !symbol.is_ascii() || !config.accepts_symbol(symbol as u8) {
            return Err(Rejection::InvalidSymbol { symbol, position });
        }
    }
    let len = sequence.len();
    if len < MIN_SEQUENCE_LENGTH {
        return Err(Rejection::TooShort(len));
    }
    if len > MAX_SEQUENCE_LENGTH {
        return Err(Rejection::TooLong(len));
    }
    Ok(())
}

/// Counters collected while taking in the input
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IntakeReport {
    /// Strings offered by the caller
    pub num_inputs: usize,
    /// Strings accepted (before folding duplicates)
    pub num_accepted: usize,
    /// Strings dropped for being too short or too long
    pub num_skipped_length: usize,
    /// Strings dropped for invalid symbols
    pub num_skipped_symbols: usize,
    /// Accepted strings folded into an earlier equal node (distinct mode)
    pub num_duplicates: usize,
}

impl IntakeReport {
    /// Total number of dropped strings
    pub fn num_skipped(&self) -> usize {
        self.num_skipped_length + self.num_skipped_symbols
    }
}

/// Validate and pack input strings into a [`SequenceSet`]
///
/// # Errors
/// Under [`InvalidInputPolicy::Reject`], the first invalid string fails the
/// whole intake. More than `u32::MAX` nodes is a configuration error.
pub fn intake<I, S>(inputs: I, config: &EngineConfig) -> Result<(SequenceSet, IntakeReport)>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut report = IntakeReport::default();
    let mut data = String::new();
    let mut offsets = vec![0usize];
    let mut source_index = Vec::new();

    for (index, input) in inputs.into_iter().enumerate() {
        let sequence = input.as_ref();
        report.num_inputs += 1;
        match check_sequence(sequence, config) {
            Ok(()) => {
                data.push_str(sequence);
                offsets.push(data.len());
                source_index.push(index);
            }
            Err(rejection) => match config.invalid_input {
                InvalidInputPolicy::Reject => {
                    return Err(LinkError::InvalidSequence {
                        index,
                        reason: rejection.to_string(),
                    });
                }
                InvalidInputPolicy::Skip => {
                    debug!("Skipping input {}: {}", index, rejection);
                    match rejection {
                        Rejection::InvalidSymbol { .. } => report.num_skipped_symbols += 1,
                        _ => report.num_skipped_length += 1,
                    }
                }
            },
        }
    }
    report.num_accepted = source_index.len();

    if report.num_skipped() > 0 {
        warn!(
            "Skipped {} invalid sequences ({} by length, {} by symbol)",
            report.num_skipped(),
            report.num_skipped_length,
            report.num_skipped_symbols
        );
    }
    if source_index.len() > NodeId::MAX as usize {
        return Err(LinkError::InvalidConfig(format!(
            "{} sequences exceed the supported maximum of {}",
            source_index.len(),
            NodeId::MAX
        )));
    }

    let set = match config.identity {
        IdentityMode::Occurrence => {
            let multiplicity = vec![1; source_index.len()];
            SequenceSet::from_parts(data, offsets, multiplicity, source_index, IdentityMode::Occurrence)
        }
        IdentityMode::Distinct => fold_duplicates(&data, &offsets, &source_index, &mut report),
    };

    Ok((set, report))
}

/// Sort accepted sequences by content and fold equal runs into one node
fn fold_duplicates(
    data: &str,
    offsets: &[usize],
    source_index: &[usize],
    report: &mut IntakeReport,
) -> SequenceSet {
    let slice = |i: usize| &data[offsets[i]..offsets[i + 1]];

    // Ties broken by input position so the first occurrence leads each run
    let mut order: Vec<usize> = (0..source_index.len()).collect();
    order.par_sort_unstable_by(|&a, &b| slice(a).cmp(slice(b)).then(a.cmp(&b)));

    let mut packed = String::with_capacity(data.len());
    let mut packed_offsets = vec![0usize];
    let mut multiplicity: Vec<u32> = Vec::new();
    let mut first_index = Vec::new();

    let mut prev: Option<&str> = None;
    for &i in &order {
        let current = slice(i);
        if prev == Some(current) {
            if let Some(count) = multiplicity.last_mut() {
                *count = count.saturating_add(1);
            }
            report.num_duplicates += 1;
            continue;
        }
        packed.push_str(current);
        packed_offsets.push(packed.len());
        multiplicity.push(1);
        first_index.push(source_index[i]);
        prev = Some(current);
    }

    SequenceSet::from_parts(packed, packed_offsets, multiplicity, first_index, IdentityMode::Distinct)
}
