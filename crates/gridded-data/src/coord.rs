//! Coordinates: labelled, optionally bounded sequences of points.

use std::fmt;

use chrono::NaiveDateTime;
use cis_common::TimeUnit;

use crate::error::{CubeError, CubeResult};

/// Units of a coordinate.
#[derive(Debug, Clone, PartialEq)]
pub enum CoordUnits {
    /// CF time reference units, e.g. `days since 1970-01-01`.
    Time(TimeUnit),
    /// Any other unit string, kept verbatim.
    Other(String),
}

impl CoordUnits {
    /// Parse a unit string, recognising CF time units.
    pub fn parse(s: &str) -> Self {
        match TimeUnit::parse(s) {
            Ok(unit) => CoordUnits::Time(unit),
            Err(_) => CoordUnits::Other(s.trim().to_string()),
        }
    }

    pub fn time_unit(&self) -> Option<&TimeUnit> {
        match self {
            CoordUnits::Time(unit) => Some(unit),
            CoordUnits::Other(_) => None,
        }
    }

    /// Returns true for pressure units, which indicate a vertical axis.
    pub fn is_pressure(&self) -> bool {
        match self {
            CoordUnits::Other(u) => matches!(
                u.as_str(),
                "Pa" | "hPa" | "kPa" | "mbar" | "millibar" | "millibars" | "bar" | "atm"
            ),
            CoordUnits::Time(_) => false,
        }
    }

    /// Returns true for angular units used by longitude/latitude.
    pub fn is_degrees(&self) -> bool {
        match self {
            CoordUnits::Other(u) => u.starts_with("degree"),
            CoordUnits::Time(_) => false,
        }
    }
}

impl Default for CoordUnits {
    fn default() -> Self {
        CoordUnits::Other("1".to_string())
    }
}

impl fmt::Display for CoordUnits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoordUnits::Time(unit) => write!(f, "{}", unit),
            CoordUnits::Other(u) => write!(f, "{}", u),
        }
    }
}

/// A single cell of a coordinate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cell {
    pub point: f64,
    pub bound: Option<[f64; 2]>,
}

impl Cell {
    pub fn min_bound(&self) -> Option<f64> {
        self.bound.map(|[a, b]| a.min(b))
    }

    pub fn max_bound(&self) -> Option<f64> {
        self.bound.map(|[a, b]| a.max(b))
    }
}

/// A coordinate along one dimension of a cube.
#[derive(Debug, Clone, PartialEq)]
pub struct Coord {
    pub var_name: String,
    pub standard_name: Option<String>,
    pub long_name: Option<String>,
    pub units: CoordUnits,
    /// Value of the CF `axis` attribute, if present.
    pub axis: Option<String>,
    /// Value of the CF `positive` attribute, if present.
    pub positive: Option<String>,
    /// Whether the coordinate wraps around (longitude).
    pub circular: bool,
    points: Vec<f64>,
    bounds: Option<Vec<[f64; 2]>>,
}

/// Modulus of circular coordinates in degrees.
const CIRCULAR_MODULUS: f64 = 360.0;

impl Coord {
    pub fn new(var_name: impl Into<String>, points: Vec<f64>) -> Self {
        Self {
            var_name: var_name.into(),
            standard_name: None,
            long_name: None,
            units: CoordUnits::default(),
            axis: None,
            positive: None,
            circular: false,
            points,
            bounds: None,
        }
    }

    pub fn with_standard_name(mut self, name: impl Into<String>) -> Self {
        self.standard_name = Some(name.into());
        self
    }

    pub fn with_long_name(mut self, name: impl Into<String>) -> Self {
        self.long_name = Some(name.into());
        self
    }

    pub fn with_units(mut self, units: &str) -> Self {
        self.units = CoordUnits::parse(units);
        self
    }

    pub fn with_axis(mut self, axis: impl Into<String>) -> Self {
        self.axis = Some(axis.into());
        self
    }

    pub fn with_circular(mut self, circular: bool) -> Self {
        self.circular = circular;
        self
    }

    /// Attach bounds. The number of bound pairs must match the points.
    pub fn with_bounds(mut self, bounds: Vec<[f64; 2]>) -> CubeResult<Self> {
        self.set_bounds(Some(bounds))?;
        Ok(self)
    }

    /// Best available name: standard name, then long name, then variable name.
    pub fn name(&self) -> &str {
        self.standard_name
            .as_deref()
            .or(self.long_name.as_deref())
            .unwrap_or(&self.var_name)
    }

    /// Returns true if `name` matches any of this coordinate's names.
    pub fn matches_name(&self, name: &str) -> bool {
        self.var_name == name
            || self.standard_name.as_deref() == Some(name)
            || self.long_name.as_deref() == Some(name)
    }

    pub fn points(&self) -> &[f64] {
        &self.points
    }

    pub fn bounds(&self) -> Option<&[[f64; 2]]> {
        self.bounds.as_deref()
    }

    pub fn has_bounds(&self) -> bool {
        self.bounds.is_some()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn is_time(&self) -> bool {
        self.units.time_unit().is_some()
    }

    /// Replace the points. Existing bounds are dropped.
    pub fn set_points(&mut self, points: Vec<f64>) {
        self.points = points;
        self.bounds = None;
    }

    pub fn set_bounds(&mut self, bounds: Option<Vec<[f64; 2]>>) -> CubeResult<()> {
        if let Some(b) = &bounds {
            if b.len() != self.points.len() {
                return Err(CubeError::LengthMismatch {
                    name: self.name().to_string(),
                    dim: 0,
                    expected: self.points.len(),
                    actual: b.len(),
                });
            }
        }
        self.bounds = bounds;
        Ok(())
    }

    /// Points stored in increasing order. Single points count as ascending.
    pub fn is_ascending(&self) -> bool {
        match (self.points.first(), self.points.last()) {
            (Some(first), Some(last)) => first <= last,
            _ => true,
        }
    }

    pub fn modulus(&self) -> Option<f64> {
        self.circular.then_some(CIRCULAR_MODULUS)
    }

    pub fn cell(&self, index: usize) -> CubeResult<Cell> {
        let point = *self.points.get(index).ok_or_else(|| CubeError::IndexOutOfRange {
            name: self.name().to_string(),
            index,
            len: self.points.len(),
        })?;
        let bound = self.bounds.as_ref().map(|b| b[index]);
        Ok(Cell { point, bound })
    }

    /// Lowest and highest value covered by the coordinate.
    ///
    /// Uses the outer bounds of the first and last cells when bounds exist,
    /// otherwise the first and last points.
    pub fn extent(&self) -> Option<(f64, f64)> {
        if self.points.is_empty() {
            return None;
        }
        let last = self.points.len() - 1;
        let (low_cell, high_cell) = if self.is_ascending() {
            (0, last)
        } else {
            (last, 0)
        };
        match &self.bounds {
            Some(b) => {
                let [a0, a1] = b[low_cell];
                let [b0, b1] = b[high_cell];
                Some((a0.min(a1), b0.max(b1)))
            }
            None => Some((self.points[low_cell], self.points[high_cell])),
        }
    }

    /// Index of the cell containing `value`, or of the nearest point.
    ///
    /// Cells are searched by their bounds first (the first containing cell
    /// wins). Circular coordinates wrap `value` into the range of the data
    /// before searching.
    pub fn nearest_neighbour_index(&self, value: f64) -> Option<usize> {
        if self.points.is_empty() {
            return None;
        }

        if let Some(bounds) = &self.bounds {
            let value = match self.modulus() {
                Some(modulus) => {
                    let low = bounds
                        .iter()
                        .flat_map(|b| b.iter().copied())
                        .fold(f64::INFINITY, f64::min);
                    low + (value - low).rem_euclid(modulus)
                }
                None => value,
            };
            if let Some(index) = bounds
                .iter()
                .position(|[a, b]| a.min(*b) <= value && value <= a.max(*b))
            {
                return Some(index);
            }
        }

        let distance = |p: f64| match self.modulus() {
            Some(modulus) => {
                let d = (p - value).rem_euclid(modulus);
                d.min(modulus - d)
            }
            None => (p - value).abs(),
        };

        let mut best = 0;
        let mut best_distance = f64::INFINITY;
        for (i, &p) in self.points.iter().enumerate() {
            let d = distance(p);
            if d < best_distance {
                best = i;
                best_distance = d;
            }
        }
        Some(best)
    }

    /// Bounds inferred from the points: half way between neighbouring points,
    /// with the outer cells extended by half of the adjacent step.
    pub fn guess_bounds(&mut self) -> CubeResult<()> {
        if self.points.len() < 2 {
            return Err(CubeError::CannotGuessBounds {
                name: self.name().to_string(),
                reason: format!("need at least 2 points, found {}", self.points.len()),
            });
        }

        let p = &self.points;
        let n = p.len();
        let mut edges = Vec::with_capacity(n + 1);
        edges.push(p[0] - (p[1] - p[0]) / 2.0);
        for i in 0..n - 1 {
            edges.push((p[i] + p[i + 1]) / 2.0);
        }
        edges.push(p[n - 1] + (p[n - 1] - p[n - 2]) / 2.0);

        let bounds = edges.windows(2).map(|w| [w[0], w[1]]).collect();
        self.bounds = Some(bounds);
        Ok(())
    }

    /// A copy of this coordinate restricted to the given cell indices.
    pub fn select(&self, indices: &[usize]) -> CubeResult<Coord> {
        let mut points = Vec::with_capacity(indices.len());
        let mut bounds = self.bounds.as_ref().map(|_| Vec::with_capacity(indices.len()));
        for &i in indices {
            let cell = self.cell(i)?;
            points.push(cell.point);
            if let (Some(out), Some(b)) = (bounds.as_mut(), cell.bound) {
                out.push(b);
            }
        }
        Ok(Coord {
            points,
            bounds,
            ..self.clone()
        })
    }

    /// Convert a value in this coordinate's units to a datetime.
    pub fn units_to_datetime(&self, value: f64) -> CubeResult<NaiveDateTime> {
        let unit = self
            .units
            .time_unit()
            .ok_or_else(|| CubeError::NotATimeCoordinate(self.name().to_string()))?;
        Ok(unit.num_to_datetime(value)?)
    }

    /// Convert a datetime to a value in this coordinate's units.
    pub fn datetime_to_units(&self, dt: NaiveDateTime) -> CubeResult<f64> {
        let unit = self
            .units
            .time_unit()
            .ok_or_else(|| CubeError::NotATimeCoordinate(self.name().to_string()))?;
        Ok(unit.datetime_to_num(dt))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lon_coord() -> Coord {
        let points: Vec<f64> = (0..36).map(|i| 5.0 + 10.0 * i as f64).collect();
        let bounds = points.iter().map(|p| [p - 5.0, p + 5.0]).collect();
        Coord::new("lon", points)
            .with_standard_name("longitude")
            .with_units("degrees_east")
            .with_circular(true)
            .with_bounds(bounds)
            .unwrap()
    }

    #[test]
    fn test_name_priority() {
        let c = Coord::new("lat", vec![0.0]);
        assert_eq!(c.name(), "lat");
        let c = c.with_long_name("Latitude");
        assert_eq!(c.name(), "Latitude");
        let c = c.with_standard_name("latitude");
        assert_eq!(c.name(), "latitude");
        assert!(c.matches_name("lat"));
        assert!(c.matches_name("Latitude"));
    }

    #[test]
    fn test_units_parse() {
        let c = Coord::new("time", vec![0.0]).with_units("hours since 2000-01-01");
        assert!(c.is_time());
        let c = Coord::new("p", vec![0.0]).with_units("hPa");
        assert!(c.units.is_pressure());
    }

    #[test]
    fn test_extent_ascending_and_descending() {
        let c = Coord::new("x", vec![0.0, 10.0, 20.0])
            .with_bounds(vec![[-5.0, 5.0], [5.0, 15.0], [15.0, 25.0]])
            .unwrap();
        assert_eq!(c.extent(), Some((-5.0, 25.0)));

        let c = Coord::new("x", vec![20.0, 10.0, 0.0])
            .with_bounds(vec![[25.0, 15.0], [15.0, 5.0], [5.0, -5.0]])
            .unwrap();
        assert!(!c.is_ascending());
        assert_eq!(c.extent(), Some((-5.0, 25.0)));
    }

    #[test]
    fn test_nearest_neighbour_uses_bounds() {
        let c = Coord::new("x", vec![0.0, 10.0, 40.0])
            .with_bounds(vec![[-5.0, 5.0], [5.0, 30.0], [30.0, 50.0]])
            .unwrap();
        // 28 is closer to 40 but lies inside the second cell
        assert_eq!(c.nearest_neighbour_index(28.0), Some(1));
        assert_eq!(c.nearest_neighbour_index(100.0), Some(2));
    }

    #[test]
    fn test_nearest_neighbour_circular() {
        let c = lon_coord();
        assert_eq!(c.nearest_neighbour_index(360.0), Some(0));
        assert_eq!(c.nearest_neighbour_index(-5.0), Some(35));
        assert_eq!(c.nearest_neighbour_index(725.0), Some(0));
    }

    #[test]
    fn test_nearest_neighbour_points_only() {
        let c = Coord::new("x", vec![30.0, 20.0, 10.0]);
        assert_eq!(c.nearest_neighbour_index(12.0), Some(2));
        assert_eq!(Coord::new("x", vec![]).nearest_neighbour_index(1.0), None);
    }

    #[test]
    fn test_guess_bounds() {
        let mut c = Coord::new("x", vec![10.0, 30.0, 50.0]);
        c.guess_bounds().unwrap();
        assert_eq!(
            c.bounds().unwrap(),
            &[[0.0, 20.0], [20.0, 40.0], [40.0, 60.0]]
        );
    }

    #[test]
    fn test_guess_bounds_single_point_fails() {
        let mut c = Coord::new("x", vec![10.0]);
        assert!(matches!(
            c.guess_bounds(),
            Err(CubeError::CannotGuessBounds { .. })
        ));
        assert!(!c.has_bounds());
    }

    #[test]
    fn test_select_keeps_bounds() {
        let c = lon_coord();
        let s = c.select(&[35, 0]).unwrap();
        assert_eq!(s.points(), &[355.0, 5.0]);
        assert_eq!(s.bounds().unwrap(), &[[350.0, 360.0], [0.0, 10.0]]);
        assert!(c.select(&[36]).is_err());
    }
}
