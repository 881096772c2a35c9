//! Aggregation request configuration.
//!
//! A request is assembled from the command line datagroup
//! (`VARIABLE:FILES[:product=P][:kernel=K]`), the grid argument, option
//! flags and an optional YAML file. Values given on the command line win
//! over the file.

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use cis_common::{parse_grid_arg, CisError, GridSpecs};
use serde::Deserialize;
use thiserror::Error;

/// Output written when no path is given anywhere.
pub const DEFAULT_OUTPUT: &str = "out.nc";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid datagroup '{value}': {message}")]
    InvalidDataGroup { value: String, message: String },

    #[error(transparent)]
    Grid(#[from] CisError),

    #[error("Failed to read config file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {}: {source}", .path.display())]
    Yaml {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    #[error("No aggregation grid given on the command line or in the config file")]
    MissingGrid,
}

/// The variable to aggregate and where to read it from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataGroup {
    pub variable: String,
    pub files: Vec<PathBuf>,
    pub product: Option<String>,
    pub kernel: Option<String>,
}

impl FromStr for DataGroup {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |message: &str| ConfigError::InvalidDataGroup {
            value: s.to_string(),
            message: message.to_string(),
        };

        let mut parts = s.split(':');
        let variable = parts.next().map(str::trim).unwrap_or_default();
        if variable.is_empty() {
            return Err(invalid("no variable given"));
        }
        let files: Vec<PathBuf> = parts
            .next()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .map(PathBuf::from)
            .collect();
        if files.is_empty() {
            return Err(invalid("no files given"));
        }

        let mut product = None;
        let mut kernel = None;
        for option in parts {
            match option.split_once('=') {
                Some(("product", value)) if !value.trim().is_empty() => {
                    product = Some(value.trim().to_string())
                }
                Some(("kernel", value)) if !value.trim().is_empty() => {
                    kernel = Some(value.trim().to_string())
                }
                _ => return Err(invalid(&format!("unrecognised option '{}'", option))),
            }
        }

        Ok(Self {
            variable: variable.to_string(),
            files,
            product,
            kernel,
        })
    }
}

/// Settings read from a YAML config file.
///
/// Grid entries use the same syntax as the command line, so bracketed
/// values must be quoted:
///
/// ```yaml
/// grid:
///   x: "[-180,180,10]"
///   t: "[2008-01,2009-01,P1M]"
///   y: collapse
/// kernel: max
/// output: monthly.nc
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub grid: Option<GridSpecs>,
    pub kernel: Option<String>,
    pub product: Option<String>,
    pub output: Option<PathBuf>,
}

impl FileConfig {
    pub fn from_yaml<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_yaml::from_str(&content).map_err(|source| ConfigError::Yaml {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Option flags given on the command line.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub grid: Option<String>,
    pub kernel: Option<String>,
    pub product: Option<String>,
    pub output: Option<PathBuf>,
}

/// Everything needed for one aggregation run.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateRequest {
    pub variable: String,
    pub files: Vec<PathBuf>,
    pub product: Option<String>,
    pub kernel: Option<String>,
    pub grid: GridSpecs,
    pub output: PathBuf,
}

impl AggregateRequest {
    /// Merge the datagroup, command line flags and file settings.
    ///
    /// Options in the datagroup take precedence over flags, which take
    /// precedence over the file. Grid axes given on the command line replace
    /// file axes with the same key and leave the others in place.
    pub fn resolve(
        datagroup: DataGroup,
        cli: CliOverrides,
        file: FileConfig,
    ) -> Result<Self, ConfigError> {
        let mut grid = file.grid.unwrap_or_default();
        if let Some(arg) = cli.grid.as_deref() {
            grid.extend(parse_grid_arg(arg)?);
        }
        if grid.is_empty() {
            return Err(ConfigError::MissingGrid);
        }

        let output = cli
            .output
            .or(file.output)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT));

        Ok(Self {
            variable: datagroup.variable,
            files: datagroup.files,
            product: datagroup.product.or(cli.product).or(file.product),
            kernel: datagroup.kernel.or(cli.kernel).or(file.kernel),
            grid,
            output: with_netcdf_extension(output),
        })
    }
}

/// Add `.nc` to an output path that has no extension.
fn with_netcdf_extension(path: PathBuf) -> PathBuf {
    if path.extension().is_some() {
        path
    } else {
        path.with_extension("nc")
    }
}
