use thiserror::Error;

/// Errors reported before construction starts. Construction itself has no
/// recoverable failures; an inconsistency detected mid-build is a bug and
/// panics.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScoreError {
    /// The input is longer than the open-edge encoding supports.
    #[error("input length {len} exceeds the supported maximum {max}")]
    InputTooLong { len: usize, max: usize },

    /// A caller-supplied alphabet does not cover every byte of the input.
    #[error("input symbol {symbol:#04x} is not in the supplied alphabet")]
    UnknownSymbol { symbol: u8 },
}

pub type Result<T> = std::result::Result<T, ScoreError>;
