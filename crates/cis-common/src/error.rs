//! Error types for CIS argument and metadata parsing.

use thiserror::Error;

/// Result type alias using CisError.
pub type CisResult<T> = Result<T, CisError>;

/// Primary error type for the shared CIS types.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CisError {
    // === Grid Errors ===
    #[error("Invalid grid specification for '{axis}': {message}")]
    InvalidGrid { axis: String, message: String },

    #[error("Invalid grid argument: {0}")]
    InvalidGridArgument(String),

    // === Time Errors ===
    #[error("Invalid time specification: {0}")]
    InvalidTime(String),

    #[error("Invalid time units: {0}")]
    InvalidTimeUnits(String),

    #[error("Invalid duration: {0}")]
    InvalidDuration(String),

    #[error("Date/time out of range: {0}")]
    DateOutOfRange(String),
}

impl CisError {
    /// Create an InvalidGrid error for the named axis.
    pub fn invalid_grid(axis: impl Into<String>, message: impl Into<String>) -> Self {
        CisError::InvalidGrid {
            axis: axis.into(),
            message: message.into(),
        }
    }
}
