//! Test data generators for creating synthetic gridded cubes.
//!
//! These generators create predictable, verifiable values so that the
//! result of an aggregation can be checked by hand.

use gridded_data::{Coord, Cube};
use ndarray::{Array1, ArrayD, Dimension, IxDyn};

use crate::fixtures::{daily_time, global_latitude, global_longitude};

/// Creates a one dimensional cube over `coord` with the given values.
///
/// # Panics
///
/// If the number of values does not match the coordinate length.
pub fn create_1d_cube(coord: Coord, values: &[f64]) -> Cube {
    let data = Array1::from(values.to_vec()).into_dyn();
    Cube::new("test_var", data, vec![coord])
        .expect("values must match coordinate length")
        .with_units("K")
}

/// Creates a cube over the given coordinates where every cell holds the
/// sum of `index * 10^k` for each dimension `k` counted from the last.
///
/// For a 2D cube this gives `row * 10 + col`, making it easy to see which
/// source cells contributed to an aggregated value.
pub fn create_indexed_cube(coords: Vec<Coord>) -> Cube {
    let shape: Vec<usize> = coords.iter().map(Coord::len).collect();
    let data = ArrayD::from_shape_fn(IxDyn(&shape), |idx| {
        let ndim = idx.ndim();
        (0..ndim)
            .map(|k| idx[k] as f64 * 10f64.powi((ndim - 1 - k) as i32))
            .sum()
    });
    Cube::new("test_var", data, coords)
        .expect("shape built from coordinates")
        .with_units("K")
}

/// Creates a global lat/lon cube with temperature-like values in Kelvin.
///
/// Values vary smoothly from 250K at the poles to 300K at the equator.
pub fn create_temperature_cube(descending_latitude: bool) -> Cube {
    let lat = global_latitude(descending_latitude);
    let lon = global_longitude();
    let shape = [lat.len(), lon.len()];
    let lat_points = lat.points().to_vec();
    let data = ArrayD::from_shape_fn(IxDyn(&shape), |idx| {
        300.0 - 50.0 * (lat_points[idx[0]].abs() / 90.0)
    });
    let mut cube = Cube::new("tas", data, vec![lat, lon])
        .expect("shape built from coordinates")
        .with_units("K");
    cube.standard_name = Some("air_temperature".to_string());
    cube
}

/// Creates a daily time series cube where each value is the day number.
pub fn create_daily_cube(first_day: i64, days: usize) -> Cube {
    let values: Vec<f64> = (0..days).map(|d| (first_day + d as i64) as f64).collect();
    create_1d_cube(daily_time(first_day, days), &values)
}
