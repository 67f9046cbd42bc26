//! Constants shared across the pipeline
//!
//! Sentinel values, default parameters and version information.

/// Position recorded on the key that stands for the whole sequence
/// (no symbol deleted). Only emitted by the length-sensitive models.
pub const SENTINEL_POSITION: i32 = -1;

/// Default seed for the key hasher
pub const DEFAULT_SEED: u64 = 1;

/// Shortest sequence that can take part in a distance-one relation.
/// A single deletion from anything shorter leaves an empty key.
pub const MIN_SEQUENCE_LENGTH: usize = 2;

/// Longest sequence accepted. Positions are stored as `i32` on keys.
pub const MAX_SEQUENCE_LENGTH: usize = i32::MAX as usize;

/// The twenty standard amino acids, the usual alphabet for CDR3 repertoires
pub const AMINO_ACIDS: &[u8] = b"ACDEFGHIKLMNPQRSTVWY";

/// DNA nucleotides
pub const NUCLEOTIDES: &[u8] = b"ACGT";

/// Separator used when several edit positions are rendered as text
pub const POSITION_SEPARATOR: char = '|';

/// Version number
pub const VERSION: (u8, u8, u8) = (0, 1, 0);

/// Check whether a byte may appear in a sequence at all.
///
/// Symbols must be printable ASCII with no whitespace; anything else is
/// treated as invalid input regardless of the configured alphabet.
#[inline]
pub const fn is_valid_symbol(symbol: u8) -> bool {
    symbol.is_ascii_graphic()
}
