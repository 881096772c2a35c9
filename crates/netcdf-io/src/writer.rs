//! Writing cubes as CF NetCDF files.

use std::path::Path;

use gridded_data::{Coord, Cube};
use tracing::info;

use crate::error::{NetCdfError, NetCdfResult};

/// Written in place of missing (NaN) data values.
pub const FILL_VALUE: f64 = 9.969_209_968_386_869e36;

/// Name of the dimension holding the two ends of each cell.
const BOUNDS_DIM: &str = "bnds";

const CONVENTIONS: &str = "CF-1.6";

/// Write a cube to `path`, replacing any existing file.
///
/// Dimension coordinates become coordinate variables (with `<name>_bnds`
/// variables when bounded), auxiliary and scalar coordinates are listed in
/// the data variable's `coordinates` attribute, and the cube's attributes
/// become global attributes.
pub fn save_cube(cube: &Cube, path: &Path) -> NetCdfResult<()> {
    let lib = |e: netcdf::Error| NetCdfError::library(path, e);
    let mut file = netcdf::create(path).map_err(lib)?;

    let dim_names: Vec<&str> = cube.dim_coords().iter().map(|c| c.var_name.as_str()).collect();
    for coord in cube.dim_coords() {
        file.add_dimension(&coord.var_name, coord.len()).map_err(lib)?;
    }
    let any_bounds = cube.dim_coords().iter().any(Coord::has_bounds)
        || cube.aux_coords().iter().any(|a| a.coord.has_bounds());
    if any_bounds {
        file.add_dimension(BOUNDS_DIM, 2).map_err(lib)?;
    }

    for coord in cube.dim_coords() {
        write_coord(&mut file, coord, Some(&coord.var_name), path)?;
    }

    let mut listed = Vec::new();
    for aux in cube.aux_coords() {
        write_coord(&mut file, &aux.coord, Some(dim_names[aux.dim]), path)?;
        listed.push(aux.coord.var_name.as_str());
    }
    for scalar in cube.scalar_coords() {
        write_coord(&mut file, scalar, None, path)?;
        listed.push(scalar.var_name.as_str());
    }

    {
        let mut var = file.add_variable::<f64>(&cube.var_name, &dim_names).map_err(lib)?;
        var.put_attribute("_FillValue", FILL_VALUE).map_err(lib)?;
        var.put_attribute("units", cube.units.as_str()).map_err(lib)?;
        if let Some(name) = &cube.standard_name {
            var.put_attribute("standard_name", name.as_str()).map_err(lib)?;
        }
        if let Some(name) = &cube.long_name {
            var.put_attribute("long_name", name.as_str()).map_err(lib)?;
        }
        if !listed.is_empty() {
            var.put_attribute("coordinates", listed.join(" ").as_str()).map_err(lib)?;
        }

        let values: Vec<f64> = cube
            .data()
            .iter()
            .map(|&v| if v.is_nan() { FILL_VALUE } else { v })
            .collect();
        var.put_values(&values, ..).map_err(lib)?;
    }

    if cube.attribute("Conventions").is_none() {
        file.add_attribute("Conventions", CONVENTIONS).map_err(lib)?;
    }
    for (key, value) in cube.attributes() {
        file.add_attribute(key, value.as_str()).map_err(lib)?;
    }

    info!(
        path = %path.display(),
        variable = %cube.var_name,
        shape = ?cube.shape(),
        "Saved cube"
    );
    Ok(())
}

/// Write one coordinate variable, along `dim` or as a scalar.
fn write_coord(
    file: &mut netcdf::FileMut,
    coord: &Coord,
    dim: Option<&str>,
    path: &Path,
) -> NetCdfResult<()> {
    let lib = |e: netcdf::Error| NetCdfError::library(path, e);
    let dims: Vec<&str> = dim.into_iter().collect();
    let bounds_name = format!("{}_bnds", coord.var_name);
    let bounds = coord.bounds().filter(|_| dim.is_some());

    {
        let mut var = file.add_variable::<f64>(&coord.var_name, &dims).map_err(lib)?;
        var.put_attribute("units", coord.units.to_string().as_str())
            .map_err(lib)?;
        if let Some(name) = &coord.standard_name {
            var.put_attribute("standard_name", name.as_str()).map_err(lib)?;
        }
        if let Some(name) = &coord.long_name {
            var.put_attribute("long_name", name.as_str()).map_err(lib)?;
        }
        if let Some(axis) = &coord.axis {
            var.put_attribute("axis", axis.as_str()).map_err(lib)?;
        }
        if let Some(positive) = &coord.positive {
            var.put_attribute("positive", positive.as_str()).map_err(lib)?;
        }
        if bounds.is_some() {
            var.put_attribute("bounds", bounds_name.as_str()).map_err(lib)?;
        }
        var.put_values(coord.points(), ..).map_err(lib)?;
    }

    if let (Some(bounds), Some(dim)) = (bounds, dim) {
        let mut var = file
            .add_variable::<f64>(&bounds_name, &[dim, BOUNDS_DIM])
            .map_err(lib)?;
        let flat: Vec<f64> = bounds.iter().flat_map(|b| b.iter().copied()).collect();
        var.put_values(&flat, ..).map_err(lib)?;
    }

    Ok(())
}
