//! Guessing the semantic role of a coordinate from its CF metadata.

use std::fmt;
use std::str::FromStr;

use crate::coord::Coord;

/// Semantic axis of a coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AxisRole {
    X,
    Y,
    Z,
    T,
}

impl AxisRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            AxisRole::X => "X",
            AxisRole::Y => "Y",
            AxisRole::Z => "Z",
            AxisRole::T => "T",
        }
    }
}

impl fmt::Display for AxisRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AxisRole {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "X" => Ok(AxisRole::X),
            "Y" => Ok(AxisRole::Y),
            "Z" => Ok(AxisRole::Z),
            "T" => Ok(AxisRole::T),
            _ => Err(()),
        }
    }
}

const X_STANDARD_NAMES: &[&str] = &["longitude", "grid_longitude", "projection_x_coordinate"];
const Y_STANDARD_NAMES: &[&str] = &["latitude", "grid_latitude", "projection_y_coordinate"];
const Z_STANDARD_NAMES: &[&str] = &[
    "altitude",
    "height",
    "depth",
    "air_pressure",
    "atmosphere_hybrid_sigma_pressure_coordinate",
    "model_level_number",
];

/// Guess whether a coordinate is an X, Y, Z or T axis.
///
/// Checks, in order: standard name, pressure units or a `positive`
/// attribute (vertical), time units, the explicit `axis` attribute and
/// finally common variable names such as `lon` or `lat`.
pub fn guess_coord_axis(coord: &Coord) -> Option<AxisRole> {
    if let Some(standard_name) = coord.standard_name.as_deref() {
        if X_STANDARD_NAMES.contains(&standard_name) {
            return Some(AxisRole::X);
        }
        if Y_STANDARD_NAMES.contains(&standard_name) {
            return Some(AxisRole::Y);
        }
        if Z_STANDARD_NAMES.contains(&standard_name) {
            return Some(AxisRole::Z);
        }
        if standard_name == "time" {
            return Some(AxisRole::T);
        }
    }

    if coord.units.is_pressure()
        || matches!(coord.positive.as_deref(), Some("up") | Some("down"))
    {
        return Some(AxisRole::Z);
    }

    if coord.is_time() {
        return Some(AxisRole::T);
    }

    if let Some(role) = coord.axis.as_deref().and_then(|a| a.parse().ok()) {
        return Some(role);
    }

    match coord.var_name.to_lowercase().as_str() {
        "lon" | "long" | "longitude" => Some(AxisRole::X),
        "lat" | "latitude" => Some(AxisRole::Y),
        "alt" | "altitude" | "height" | "level" | "lev" | "pressure" => Some(AxisRole::Z),
        "time" => Some(AxisRole::T),
        _ => None,
    }
}
