//! Error types for tally-sheets-core

use thiserror::Error;

/// Result type alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Exceptional conditions surfaced to callers.
///
/// Domain errors inside formula values (`#REF!`, `#VALUE!`, `#DIV/0!`) are
/// [`crate::CellError`] values, not variants of this enum.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid cell position
    #[error("Invalid position: {0}")]
    InvalidPosition(String),

    /// Formula parse error
    #[error("Formula parse error: {0}")]
    FormulaParse(String),

    /// Circular reference detected
    #[error("Circular reference detected involving cell {0}")]
    CircularReference(String),

    /// Structural edit would grow the sheet past its limits
    #[error("Table too big: {0}")]
    TableTooBig(String),
}
