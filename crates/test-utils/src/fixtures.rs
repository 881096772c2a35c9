//! Common coordinate fixtures for CIS tests.
//!
//! These coordinates represent the axes found in typical model and
//! satellite-derived gridded products.

use gridded_data::Coord;

/// Units used by the time fixtures.
pub const DAYS_SINCE_1970: &str = "days since 1970-01-01 00:00:00";

/// Regularly spaced coordinate with bounds half a step either side.
pub fn bounded_coord(name: &str, points: &[f64], half_width: f64) -> Coord {
    let bounds = points
        .iter()
        .map(|p| [p - half_width, p + half_width])
        .collect();
    Coord::new(name, points.to_vec())
        .with_bounds(bounds)
        .expect("bounds match points")
}

/// Longitude cell centres `5, 15, ..., 355` covering the globe in 10 degree cells.
pub fn global_longitude() -> Coord {
    let points: Vec<f64> = (0..36).map(|i| 5.0 + 10.0 * i as f64).collect();
    bounded_coord("lon", &points, 5.0)
        .with_standard_name("longitude")
        .with_units("degrees_east")
        .with_circular(true)
}

/// Latitude cell centres `-85, -75, ..., 85`, or the reverse when `descending`.
pub fn global_latitude(descending: bool) -> Coord {
    let mut points: Vec<f64> = (0..18).map(|i| -85.0 + 10.0 * i as f64).collect();
    if descending {
        points.reverse();
    }
    bounded_coord("lat", &points, 5.0)
        .with_standard_name("latitude")
        .with_units("degrees_north")
}

/// Daily time coordinate starting at the given day offset from 1970-01-01,
/// each point at midday with bounds spanning the day.
pub fn daily_time(first_day: i64, days: usize) -> Coord {
    let points: Vec<f64> = (0..days).map(|d| (first_day + d as i64) as f64 + 0.5).collect();
    bounded_coord("time", &points, 0.5)
        .with_standard_name("time")
        .with_units(DAYS_SINCE_1970)
}

/// The five point axis `[0, 10, 20, 30, 40]` with bounds `[-5, 5] .. [35, 45]`.
pub fn five_point_axis() -> Coord {
    bounded_coord("x", &[0.0, 10.0, 20.0, 30.0, 40.0], 5.0)
}
