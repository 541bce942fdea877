//! LUT error types.

use thiserror::Error;

/// Result type for LUT operations.
pub type LutResult<T> = Result<T, LutError>;

/// Errors that can occur while building or inverting LUTs.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LutError {
    /// The flat sample array does not match the declared shape.
    #[error("LUT shape mismatch: expected {expected} values, found {actual}")]
    ShapeMismatch {
        /// Number of values the declared shape requires.
        expected: usize,
        /// Number of values actually supplied.
        actual: usize,
    },

    /// Invalid LUT size.
    #[error("invalid LUT size: {0}")]
    InvalidSize(String),

    /// The table cannot be inverted in its current configuration.
    #[error("LUT is not invertible: {0}")]
    NotInvertible(String),
}
