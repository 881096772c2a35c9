//! Matching the coordinates of a cube to the requested grid.

use cis_common::{GridSpec, GridSpecs};
use gridded_data::{guess_coord_axis, AxisRole, Coord};

/// A grid entry selected for a coordinate.
#[derive(Debug, Clone, Copy)]
pub struct GridMatch<'a> {
    /// Key of the grid entry that matched.
    pub key: &'a str,
    pub spec: &'a GridSpec,
    /// Guessed role of the coordinate, if any.
    pub role: Option<AxisRole>,
}

/// Find the grid entry for `coord`.
///
/// The coordinate's name is tried first, then its variable name, then the
/// guessed axis role as `X`/`Y`/`Z`/`T` and finally in lower case. `None`
/// leaves the coordinate untouched.
pub fn resolve_grid<'a>(grid: &'a GridSpecs, coord: &Coord) -> Option<GridMatch<'a>> {
    let role = guess_coord_axis(coord);
    let lookup = |key: &str| {
        grid.get_key_value(key)
            .map(|(key, spec)| GridMatch { key, spec, role })
    };

    lookup(coord.name())
        .or_else(|| lookup(&coord.var_name))
        .or_else(|| {
            let role = role?;
            lookup(role.as_str()).or_else(|| lookup(&role.as_str().to_lowercase()))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use cis_common::parse_grid_arg;
    use test_utils::{global_latitude, global_longitude, DAYS_SINCE_1970};

    #[test]
    fn test_resolve_by_name() {
        let grid = parse_grid_arg("latitude=[-90,90,30],x=[0,360,90]").unwrap();
        let m = resolve_grid(&grid, &global_latitude(false)).unwrap();
        assert_eq!(m.key, "latitude");
        assert_eq!(m.role, Some(AxisRole::Y));
    }

    #[test]
    fn test_resolve_by_var_name() {
        let grid = parse_grid_arg("lat=[-90,90,30]").unwrap();
        let m = resolve_grid(&grid, &global_latitude(false)).unwrap();
        assert_eq!(m.key, "lat");
    }

    #[test]
    fn test_name_takes_priority_over_role() {
        let grid = parse_grid_arg("X=[0,360,30],longitude=[0,360,90]").unwrap();
        let m = resolve_grid(&grid, &global_longitude()).unwrap();
        assert_eq!(m.key, "longitude");
    }

    #[test]
    fn test_resolve_by_role_upper_then_lower_case() {
        let grid = parse_grid_arg("x=[0,360,90]").unwrap();
        let m = resolve_grid(&grid, &global_longitude()).unwrap();
        assert_eq!(m.key, "x");

        let grid = parse_grid_arg("X=[0,360,30],x=[0,360,90]").unwrap();
        let m = resolve_grid(&grid, &global_longitude()).unwrap();
        assert_eq!(m.key, "X");
    }

    #[test]
    fn test_unmatched_coordinate() {
        let grid = parse_grid_arg("y=[-90,90,30]").unwrap();
        assert!(resolve_grid(&grid, &global_longitude()).is_none());

        let band = Coord::new("band", vec![1.0, 2.0]);
        assert!(resolve_grid(&grid, &band).is_none());
    }

    #[test]
    fn test_time_axis_from_role() {
        let grid = parse_grid_arg("t=[0,10,2]").unwrap();
        let time = Coord::new("when", vec![0.0]).with_units(DAYS_SINCE_1970);
        let m = resolve_grid(&grid, &time).unwrap();
        assert_eq!(m.key, "t");
        assert_eq!(m.role, Some(AxisRole::T));
    }
}
