//! Error types for aggregation.

use cis_common::CisError;
use gridded_data::CubeError;
use thiserror::Error;

/// Errors that abort an aggregation.
///
/// Range overshoot and bounds that cannot be rebuilt are not errors; they
/// are corrected locally and logged.
#[derive(Error, Debug)]
pub enum AggregationError {
    /// Input files could not be read or the variable does not exist.
    #[error("There was an error reading in data: \n{0}")]
    Read(String),

    /// Point-cloud input was given.
    #[error("Only gridded data is currently supported")]
    UngriddedNotSupported,

    /// The kernel name is not in the registry.
    #[error("Unknown aggregation kernel '{name}', available kernels are: {available}")]
    UnknownKernel { name: String, available: String },

    /// The grid cannot be applied to the coordinate.
    #[error("Invalid aggregation grid for '{coord}': {message}")]
    InvalidGrid { coord: String, message: String },

    /// No cells of the coordinate fall inside the aggregation range.
    #[error("No '{coord}' cells lie within the aggregation range {start} to {end}")]
    EmptyRange {
        coord: String,
        start: String,
        end: String,
    },

    /// Cube manipulation failed.
    #[error(transparent)]
    Cube(#[from] CubeError),

    /// Time conversion failed.
    #[error(transparent)]
    Time(#[from] CisError),
}

impl AggregationError {
    /// Wrap a reader failure, keeping the cause's message.
    pub fn read(cause: impl std::fmt::Display) -> Self {
        Self::Read(cause.to_string())
    }

    pub fn invalid_grid(coord: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidGrid {
            coord: coord.into(),
            message: message.into(),
        }
    }
}

/// Result type for aggregation operations.
pub type Result<T> = std::result::Result<T, AggregationError>;
