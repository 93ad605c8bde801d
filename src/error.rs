//! Error types for sequence parsing, querying and rename planning

use thiserror::Error;

/// Result alias used throughout the pure sequence API.
pub type Result<T> = std::result::Result<T, SequenceError>;

/// Errors raised by the sequence core.
///
/// None of these are fatal: a `NoMatch` is an ordinary answer to "is this a
/// sequence item?", and rename errors are reported before anything is planned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SequenceError {
    /// The string contains no numeric run.
    #[error("no numeric run found in {input:?}")]
    NoMatch { input: String },

    /// The numeric run (or a shifted rename value) does not fit in a `u64`.
    #[error("number out of range in {input:?}")]
    NumberTooLarge { input: String },

    /// An aggregate query was made on a group with no items.
    #[error("sequence has no items")]
    EmptySequence,

    /// A rename would produce duplicate names or overwrite an item outside the sequence.
    #[error("rename conflicts with existing or duplicate names: {}", .targets.join(", "))]
    Conflict { targets: Vec<String> },

    /// A renamed value cannot be rendered with the requested zero padding.
    #[error("value {value} does not fit a zero-padded width of {width}")]
    WidthOverflow { value: u64, width: usize },

    /// A fixed padding narrower than two digits cannot carry a leading zero.
    #[error("invalid fixed padding width {width} (must be at least 2)")]
    InvalidPadding { width: usize },

    /// A new prefix ending in a digit, or a new suffix containing one, would
    /// change which digit run is detected.
    #[error("affix {affix:?} would merge with or shadow the numeric field")]
    AmbiguousAffix { affix: String },

    /// The string has no recognizable placeholder, or its affixes contain digits.
    #[error("invalid sequence pattern {pattern:?}")]
    InvalidPattern { pattern: String },
}
