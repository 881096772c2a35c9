//! Error types for NetCDF reading and writing.

use std::path::PathBuf;

use gridded_data::CubeError;
use thiserror::Error;

/// Result type for NetCDF operations.
pub type NetCdfResult<T> = Result<T, NetCdfError>;

/// Error types for NetCDF reading and writing.
#[derive(Error, Debug)]
pub enum NetCdfError {
    /// File I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Input file does not exist
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// Error reported by the netcdf library
    #[error("NetCDF error in {}: {message}", path.display())]
    Library { path: PathBuf, message: String },

    /// Requested variable is not in the file
    #[error("Variable '{variable}' not found in {}", path.display())]
    VariableNotFound { variable: String, path: PathBuf },

    /// Missing required variable, dimension or attribute
    #[error("Missing required data: {0}")]
    MissingData(String),

    /// Invalid data format
    #[error("Invalid data format: {0}")]
    InvalidFormat(String),

    /// No product reader registered under the name
    #[error("Unknown product '{name}', available products are: {available}")]
    UnknownProduct { name: String, available: String },

    /// No input files were given
    #[error("No input files given")]
    NoFiles,

    /// The data read could not form a cube
    #[error(transparent)]
    Cube(#[from] CubeError),
}

impl NetCdfError {
    pub(crate) fn library(path: impl Into<PathBuf>, err: impl std::fmt::Display) -> Self {
        NetCdfError::Library {
            path: path.into(),
            message: err.to_string(),
        }
    }
}
