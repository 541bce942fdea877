//! Error types for op construction and rendering.

use chroma_lut::LutError;
use thiserror::Error;

/// Result type for op operations.
pub type OpResult<T> = Result<T, OpError>;

/// Errors raised while building, finalizing or rendering ops.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum OpError {
    /// Direction resolved to unknown, or an inverse was requested from data
    /// that has none.
    #[error("direction error: {0}")]
    Direction(String),

    /// A caller broke an op contract (combining without checking, mutating
    /// a finalized op, rendering before finalize, wrong cache entry kind).
    #[error("contract violation: {0}")]
    ContractViolation(String),

    /// Op data failed validation.
    #[error("{0}")]
    Validation(String),

    /// Pixel buffer does not match the declared layout.
    #[error("invalid pixel buffer: {0}")]
    Buffer(String),

    /// Underlying LUT error.
    #[error(transparent)]
    Lut(#[from] LutError),
}

impl OpError {
    /// Builds a contract violation and logs it at error level.
    pub fn contract(message: impl Into<String>) -> Self {
        let message = message.into();
        tracing::error!(%message, "op contract violation");
        OpError::ContractViolation(message)
    }
}
