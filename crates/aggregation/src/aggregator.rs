//! The aggregation driver.
//!
//! Every dimension coordinate of the input cube is matched against the
//! requested grid. Matched coordinates are either collapsed completely or
//! subset to the requested range, categorised onto the new grid points and
//! reduced group by group. The reduced coordinate is then rebuilt from the
//! categories and given fresh bounds.

use std::fmt::Display;

use cis_common::{GridSpecs, CIS_VERSION};
use gridded_data::{Coord, Cube, CubeError, Dataset, Reducer};
use tracing::{debug, info, warn};

use crate::categorise::categorise_coord_function;
use crate::error::{AggregationError, Result};
use crate::kernels::{KernelRegistry, DEFAULT_KERNEL};
use crate::range::{display_value, reconcile_range, subset_indices};
use crate::resolve::{resolve_grid, GridMatch};

/// Prefix of the temporary coordinate holding the category of each cell.
pub const AGGREGATION_COORD_PREFIX: &str = "aggregation_coord_for_";

/// Aggregates gridded data onto a coarser grid.
#[derive(Debug, Clone)]
pub struct Aggregator {
    grid: GridSpecs,
    kernels: KernelRegistry,
}

impl Aggregator {
    pub fn new(grid: GridSpecs) -> Self {
        Self {
            grid,
            kernels: KernelRegistry::standard(),
        }
    }

    pub fn with_kernels(mut self, kernels: KernelRegistry) -> Self {
        self.kernels = kernels;
        self
    }

    pub fn grid(&self) -> &GridSpecs {
        &self.grid
    }

    pub fn kernels(&self) -> &KernelRegistry {
        &self.kernels
    }

    /// Aggregate `data` with the named kernel, or the mean if none is given.
    ///
    /// Only gridded data is supported. Coordinates without a grid entry are
    /// passed through unchanged.
    pub fn aggregate(&self, data: Dataset, kernel: Option<&str>) -> Result<Cube> {
        let mut cube = match data {
            Dataset::Gridded(cube) => cube,
            Dataset::Ungridded(_) => return Err(AggregationError::UngriddedNotSupported),
        };
        let kernel = self.kernels.resolve(kernel)?;

        // Coordinates as they were before any aggregation
        let coords: Vec<Coord> = cube.dim_coords().to_vec();

        for coord in &coords {
            let Some(grid) = resolve_grid(&self.grid, coord) else {
                debug!(coord = %coord.name(), "No grid given, leaving coordinate unchanged");
                continue;
            };

            cube = if grid.spec.delta.is_collapse() {
                info!(
                    coord = %coord.name(),
                    kernel = %kernel.name(),
                    "Aggregating, collapsing completely"
                );
                cube.collapsed(&coord.var_name, kernel.as_ref())?
            } else {
                aggregate_coord(cube, coord, &grid, kernel.as_ref())?
            };
        }

        Ok(cube)
    }
}

fn aggregate_coord(cube: Cube, coord: &Coord, grid: &GridMatch<'_>, kernel: &dyn Reducer) -> Result<Cube> {
    let dim = cube
        .dim_coord_index(&coord.var_name)
        .ok_or_else(|| CubeError::CoordinateNotFound(coord.name().to_string()))?;
    let current = &cube.dim_coords()[dim];

    let range = reconcile_range(current, grid.spec)?;
    let indices = subset_indices(current, range.start, range.end)?;
    let categorise = categorise_coord_function(current, range.start, range.end, &grid.spec.delta)?;

    info!(
        coord = %current.name(),
        grid = %grid.key,
        start = %display_value(current, range.start),
        end = %display_value(current, range.end),
        delta = %grid.spec.delta,
        kernel = %kernel.name(),
        "Aggregating"
    );

    let mut subset = if indices.len() == current.len() {
        cube
    } else {
        debug!(coord = %current.name(), kept = indices.len(), of = current.len(), "Subsetting");
        cube.select_indices(dim, &indices)?
    };

    let aux_name = format!("{}{}", AGGREGATION_COORD_PREFIX, coord.name());
    subset.add_categorised_coord(&aux_name, &coord.var_name, categorise)?;

    let mut aggregated = subset.aggregated_by(&aux_name, kernel)?;
    let categories = aggregated.remove_aux_coord(&aux_name)?;

    let mut rebuilt = aggregated.dim_coords()[dim].clone();
    rebuilt.set_points(categories.coord.points().to_vec());
    if let Err(e) = rebuilt.guess_bounds() {
        warn!(
            coord = %rebuilt.name(),
            error = %e,
            "Only one cell left after aggregation, bounds will be missing for this coordinate"
        );
    }
    aggregated.replace_dim_coord(dim, rebuilt)?;

    Ok(aggregated)
}

/// Provenance text recorded in the history of an aggregated cube.
pub fn aggregation_history<F: Display>(
    variable: &str,
    files: &[F],
    grid: &GridSpecs,
    kernel: Option<&str>,
) -> String {
    let files: Vec<String> = files.iter().map(|f| f.to_string()).collect();
    format!(
        "Aggregated using CIS version {}\nvariable: {}\nfrom files: [{}]\nusing new grid: {}\nwith kernel: {}",
        CIS_VERSION,
        variable,
        files.join(", "),
        grid,
        kernel.unwrap_or(DEFAULT_KERNEL)
    )
}
