//! Error types for cube operations.

use cis_common::CisError;
use thiserror::Error;

/// Result type for cube operations.
pub type CubeResult<T> = Result<T, CubeError>;

/// Errors that can occur while manipulating cubes and coordinates.
#[derive(Error, Debug)]
pub enum CubeError {
    /// No coordinate with this name exists on the cube.
    #[error("coordinate not found: {0}")]
    CoordinateNotFound(String),

    /// A coordinate does not fit the dimension it is attached to.
    #[error("coordinate '{name}' has {actual} points but dimension {dim} has length {expected}")]
    LengthMismatch {
        name: String,
        dim: usize,
        expected: usize,
        actual: usize,
    },

    /// The number of dimension coordinates does not match the data.
    #[error("data has {ndim} dimensions but {coords} dimension coordinates were given")]
    DimensionMismatch { ndim: usize, coords: usize },

    /// Bounds cannot be inferred from the points.
    #[error("cannot guess bounds for coordinate '{name}': {reason}")]
    CannotGuessBounds { name: String, reason: String },

    /// A selection would leave no cells along a dimension.
    #[error("selection along '{0}' is empty")]
    EmptySelection(String),

    /// Index outside the coordinate.
    #[error("index {index} out of range for coordinate '{name}' of length {len}")]
    IndexOutOfRange {
        name: String,
        index: usize,
        len: usize,
    },

    /// The coordinate does not carry time units.
    #[error("coordinate '{0}' does not have time units")]
    NotATimeCoordinate(String),

    /// Cubes cannot be joined together.
    #[error("cannot concatenate cubes: {0}")]
    Concatenate(String),

    /// Array shape error from ndarray.
    #[error("array shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),

    /// Time conversion error.
    #[error(transparent)]
    Time(#[from] CisError),
}
