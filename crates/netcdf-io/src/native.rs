//! Reading CF NetCDF files with the native netcdf library.
//!
//! Variables of any numeric type are read as `f64`. Values equal to the
//! `_FillValue` (or `missing_value`) attribute become NaN, and packed data
//! is unpacked with `scale_factor` and `add_offset`.

use std::path::Path;
use std::sync::Once;

use gridded_data::{guess_coord_axis, AxisRole, Coord, Cube, UngriddedData};
use ndarray::{ArrayD, IxDyn};
use netcdf::types::{FloatType, IntType, NcVariableType};
use netcdf::AttributeValue;
use tracing::{debug, warn};

use crate::error::{NetCdfError, NetCdfResult};

/// Tolerance when deciding whether a longitude spans the whole globe.
const GLOBAL_TOLERANCE_DEGREES: f64 = 1e-3;

/// Silence HDF5's automatic error printing to stderr.
///
/// The HDF5 C library prints verbose error messages to stderr even when errors
/// are handled gracefully by the Rust code (e.g., when checking for optional
/// attributes that don't exist). This creates confusing log spam like:
///
/// ```text
/// HDF5-DIAG: Error detected in HDF5 (1.10.8) thread 3:
///   #003: ../../../src/H5Adense.c line 397 in H5A__dense_open(): can't locate attribute in name index
/// ```
///
/// It only needs to be called once per process, but is safe to call multiple times.
pub fn silence_hdf5_errors() {
    static INIT: Once = Once::new();

    INIT.call_once(|| {
        // SAFETY: H5Eset_auto2 is thread-safe and we're passing null pointers
        // to disable error output, which is a documented valid use.
        unsafe {
            hdf5_metno_sys::h5e::H5Eset_auto2(
                hdf5_metno_sys::h5e::H5E_DEFAULT,
                None,
                std::ptr::null_mut(),
            );
        }
    });
}

/// Read `variable` from a file as a cube.
///
/// Each dimension of the variable takes its coordinate from the variable of
/// the same name; dimensions without one are indexed from zero. Scalar
/// coordinates listed in the `coordinates` attribute and string-valued global
/// attributes are kept.
pub fn read_cube(path: &Path, variable: &str) -> NetCdfResult<Cube> {
    let file = open(path)?;
    let var = file
        .variable(variable)
        .ok_or_else(|| NetCdfError::VariableNotFound {
            variable: variable.to_string(),
            path: path.to_path_buf(),
        })?;

    let dims: Vec<(String, usize)> = var
        .dimensions()
        .iter()
        .map(|d| (d.name().to_string(), d.len()))
        .collect();
    let shape: Vec<usize> = dims.iter().map(|(_, len)| *len).collect();

    let values = read_values(&var, path)?;
    let data = ArrayD::from_shape_vec(IxDyn(&shape), values).map_err(|e| {
        NetCdfError::InvalidFormat(format!("variable '{}' does not match its shape: {}", variable, e))
    })?;

    let coords = dims
        .iter()
        .map(|(name, len)| read_dim_coord(&file, name, *len, path))
        .collect::<NetCdfResult<Vec<_>>>()?;

    let mut cube = Cube::new(variable, data, coords)?;
    cube.units = get_string_attr(&var, "units").unwrap_or_else(|| "1".to_string());
    cube.standard_name = get_string_attr(&var, "standard_name");
    cube.long_name = get_string_attr(&var, "long_name");

    if let Some(names) = get_string_attr(&var, "coordinates") {
        for name in names.split_whitespace() {
            if dims.iter().any(|(dim, _)| dim == name) {
                continue;
            }
            match file.variable(name) {
                Some(scalar) if scalar.dimensions().is_empty() => {
                    let points = read_values(&scalar, path)?;
                    cube.add_scalar_coord(coord_from_variable(&scalar, name, points));
                }
                Some(_) => debug!(coord = %name, "Skipping non-scalar auxiliary coordinate"),
                None => warn!(coord = %name, variable = %variable, "Listed coordinate not found in file"),
            }
        }
    }

    for attr in file.attributes() {
        if let Ok(AttributeValue::Str(value)) = attr.value() {
            cube.set_attribute(attr.name(), value);
        }
    }

    debug!(
        path = %path.display(),
        variable = %variable,
        shape = ?cube.shape(),
        "Read gridded variable"
    );
    Ok(cube)
}

/// Read `variable` as scattered points with the coordinates named in its
/// `coordinates` attribute.
pub fn read_ungridded(path: &Path, variable: &str) -> NetCdfResult<UngriddedData> {
    let file = open(path)?;
    let var = file
        .variable(variable)
        .ok_or_else(|| NetCdfError::VariableNotFound {
            variable: variable.to_string(),
            path: path.to_path_buf(),
        })?;
    let values = read_values(&var, path)?;

    let names = get_string_attr(&var, "coordinates").ok_or_else(|| {
        NetCdfError::MissingData(format!("'coordinates' attribute of variable '{}'", variable))
    })?;

    let mut coords = Vec::new();
    for name in names.split_whitespace() {
        let coord_var = file
            .variable(name)
            .ok_or_else(|| NetCdfError::MissingData(format!("coordinate variable '{}'", name)))?;
        let points = read_values(&coord_var, path)?;
        if points.len() != values.len() {
            return Err(NetCdfError::InvalidFormat(format!(
                "coordinate '{}' has {} points but '{}' has {} values",
                name,
                points.len(),
                variable,
                values.len()
            )));
        }
        coords.push(coord_from_variable(&coord_var, name, points));
    }

    let mut data = UngriddedData::new(variable, values, coords);
    if let Some(units) = get_string_attr(&var, "units") {
        data.units = units;
    }
    Ok(data)
}

fn open(path: &Path) -> NetCdfResult<netcdf::File> {
    if !path.exists() {
        return Err(NetCdfError::FileNotFound(path.to_path_buf()));
    }
    // Silence HDF5's verbose stderr output for missing attributes
    silence_hdf5_errors();
    netcdf::open(path).map_err(|e| NetCdfError::library(path, e))
}

fn read_dim_coord(file: &netcdf::File, name: &str, len: usize, path: &Path) -> NetCdfResult<Coord> {
    let Some(var) = file.variable(name) else {
        debug!(dimension = %name, "No coordinate variable, using indices");
        return Ok(Coord::new(name, (0..len).map(|i| i as f64).collect()));
    };

    let points = read_values(&var, path)?;
    if points.len() != len {
        return Err(NetCdfError::InvalidFormat(format!(
            "coordinate variable '{}' has {} values for a dimension of length {}",
            name,
            points.len(),
            len
        )));
    }
    let mut coord = coord_from_variable(&var, name, points);

    if let Some(bounds_name) = get_string_attr(&var, "bounds") {
        match file.variable(&bounds_name) {
            Some(bounds_var) => {
                let flat = read_values(&bounds_var, path)?;
                if flat.len() == 2 * len {
                    let bounds = flat.chunks_exact(2).map(|c| [c[0], c[1]]).collect();
                    coord = coord.with_bounds(bounds)?;
                } else {
                    warn!(coord = %name, bounds = %bounds_name, "Bounds variable is not (n, 2), ignoring");
                }
            }
            None => warn!(coord = %name, bounds = %bounds_name, "Bounds variable not found"),
        }
    }

    coord.circular = is_global_longitude(&coord);
    Ok(coord)
}

fn coord_from_variable(var: &netcdf::Variable<'_>, name: &str, points: Vec<f64>) -> Coord {
    let mut coord = Coord::new(name, points);
    if let Some(units) = get_string_attr(var, "units") {
        coord = coord.with_units(&units);
    }
    coord.standard_name = get_string_attr(var, "standard_name");
    coord.long_name = get_string_attr(var, "long_name");
    coord.axis = get_string_attr(var, "axis");
    coord.positive = get_string_attr(var, "positive");
    coord
}

/// Longitudes in degrees covering the full circle wrap around.
fn is_global_longitude(coord: &Coord) -> bool {
    if guess_coord_axis(coord) != Some(AxisRole::X) || !coord.units.is_degrees() {
        return false;
    }
    let Some((low, high)) = coord.extent() else {
        return false;
    };
    let span = if coord.has_bounds() {
        high - low
    } else {
        // Points only cover the centres; add one cell
        let n = coord.len() as f64;
        if n < 2.0 {
            return false;
        }
        (high - low) * n / (n - 1.0)
    };
    span >= 360.0 - GLOBAL_TOLERANCE_DEGREES
}

fn read_values(var: &netcdf::Variable<'_>, path: &Path) -> NetCdfResult<Vec<f64>> {
    macro_rules! read_as {
        ($t:ty) => {
            var.get_values::<$t, _>(..)
                .map(|v| v.into_iter().map(|x| x as f64).collect::<Vec<f64>>())
        };
    }

    let raw = match var.vartype() {
        NcVariableType::Float(FloatType::F64) => var.get_values::<f64, _>(..),
        NcVariableType::Float(FloatType::F32) => read_as!(f32),
        NcVariableType::Int(IntType::I64) => read_as!(i64),
        NcVariableType::Int(IntType::I32) => read_as!(i32),
        NcVariableType::Int(IntType::I16) => read_as!(i16),
        NcVariableType::Int(IntType::I8) => read_as!(i8),
        NcVariableType::Int(IntType::U64) => read_as!(u64),
        NcVariableType::Int(IntType::U32) => read_as!(u32),
        NcVariableType::Int(IntType::U16) => read_as!(u16),
        NcVariableType::Int(IntType::U8) => read_as!(u8),
        other => {
            return Err(NetCdfError::InvalidFormat(format!(
                "variable '{}' has non-numeric type {:?}",
                var.name(),
                other
            )))
        }
    }
    .map_err(|e| NetCdfError::library(path, e))?;

    let fill_value = get_f64_attr(var, "_FillValue").or_else(|| get_f64_attr(var, "missing_value"));
    let scale_factor = get_f64_attr(var, "scale_factor").unwrap_or(1.0);
    let add_offset = get_f64_attr(var, "add_offset").unwrap_or(0.0);

    Ok(raw
        .into_iter()
        .map(|v| {
            if fill_value == Some(v) {
                f64::NAN
            } else {
                v * scale_factor + add_offset
            }
        })
        .collect())
}

// =============================================================================
// Attribute helpers
// =============================================================================

/// Check if a variable has an attribute with the given name.
/// This avoids HDF5 error spam when checking for optional attributes.
fn has_attr(var: &netcdf::Variable<'_>, name: &str) -> bool {
    var.attributes().any(|attr| attr.name() == name)
}

fn get_string_attr(var: &netcdf::Variable<'_>, name: &str) -> Option<String> {
    if !has_attr(var, name) {
        return None;
    }
    match var.attribute_value(name)?.ok()? {
        AttributeValue::Str(s) => Some(s),
        AttributeValue::Strs(s) => Some(s.join(" ")),
        _ => None,
    }
}

fn get_f64_attr(var: &netcdf::Variable<'_>, name: &str) -> Option<f64> {
    if !has_attr(var, name) {
        return None;
    }
    match var.attribute_value(name)?.ok()? {
        AttributeValue::Double(v) => Some(v),
        AttributeValue::Float(v) => Some(v as f64),
        AttributeValue::Longlong(v) => Some(v as f64),
        AttributeValue::Ulonglong(v) => Some(v as f64),
        AttributeValue::Int(v) => Some(v as f64),
        AttributeValue::Uint(v) => Some(v as f64),
        AttributeValue::Short(v) => Some(v as f64),
        AttributeValue::Ushort(v) => Some(v as f64),
        AttributeValue::Schar(v) => Some(v as f64),
        AttributeValue::Uchar(v) => Some(v as f64),
        AttributeValue::Doubles(v) => v.first().copied(),
        AttributeValue::Floats(v) => v.first().map(|&x| x as f64),
        _ => None,
    }
}
