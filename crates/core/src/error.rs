use thiserror::Error;

/// Failure to parse a MARKED selection string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// Bit string length does not match the grid shape.
    #[error("selection length {found} does not match expected {expected}")]
    Length { expected: usize, found: usize },
    /// A bit position holds something other than '0' or '1'.
    #[error("invalid selection character '{ch}' at position {pos}")]
    InvalidChar { ch: char, pos: usize },
}

/// Errors reported by grid operations.
///
/// Operations on the matrix controller store the last one of these in a
/// single slot the caller can read back.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    /// The operation needs a selection and none exists.
    #[error("no selection")]
    NoSelection,
    /// A cell-mask selection is not a consistent rectangle.
    #[error("selection is not a consistent rectangle")]
    InvalidSelection,
    /// Malformed row interval or range text.
    #[error("invalid interval: {0}")]
    InvalidInterval(String),
    /// Text could not be parsed into a rectangular block of cells.
    #[error("invalid data: {0}")]
    InvalidData(String),
    /// A file could not be opened or read.
    #[error("cannot open file: {0}")]
    FileOpen(String),
    /// A file could not be written.
    #[error("cannot save file: {0}")]
    FileSave(String),
    /// Selection string could not be decoded.
    #[error(transparent)]
    Decode(#[from] DecodeError),
}

pub type Result<T> = std::result::Result<T, GridError>;
