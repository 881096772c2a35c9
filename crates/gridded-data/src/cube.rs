//! N-dimensional gridded data with labelled coordinates.

use std::collections::BTreeMap;
use std::fmt::Debug;

use chrono::Utc;
use ndarray::{ArrayD, ArrayViewD, Axis};
use tracing::debug;

use crate::coord::Coord;
use crate::error::{CubeError, CubeResult};

/// A reduction over the non-missing values of one group of cells.
///
/// Implementations receive only finite (non-NaN) values; an empty slice
/// means every value in the group was missing.
pub trait Reducer: Debug + Send + Sync {
    fn name(&self) -> &str;

    fn reduce(&self, values: &[f64]) -> f64;
}

/// A coordinate attached to one dimension alongside the dimension coordinate.
#[derive(Debug, Clone, PartialEq)]
pub struct AuxCoord {
    pub coord: Coord,
    pub dim: usize,
}

/// A gridded variable: data plus one dimension coordinate per axis.
#[derive(Debug, Clone)]
pub struct Cube {
    pub var_name: String,
    pub standard_name: Option<String>,
    pub long_name: Option<String>,
    pub units: String,
    data: ArrayD<f64>,
    dim_coords: Vec<Coord>,
    aux_coords: Vec<AuxCoord>,
    scalar_coords: Vec<Coord>,
    attributes: BTreeMap<String, String>,
}

impl Cube {
    /// Create a cube, checking that each coordinate matches its dimension.
    pub fn new(
        var_name: impl Into<String>,
        data: ArrayD<f64>,
        dim_coords: Vec<Coord>,
    ) -> CubeResult<Self> {
        if data.ndim() != dim_coords.len() {
            return Err(CubeError::DimensionMismatch {
                ndim: data.ndim(),
                coords: dim_coords.len(),
            });
        }
        for (dim, coord) in dim_coords.iter().enumerate() {
            check_length(coord, dim, data.shape()[dim])?;
        }
        Ok(Self {
            var_name: var_name.into(),
            standard_name: None,
            long_name: None,
            units: "1".to_string(),
            data,
            dim_coords,
            aux_coords: Vec::new(),
            scalar_coords: Vec::new(),
            attributes: BTreeMap::new(),
        })
    }

    pub fn with_units(mut self, units: impl Into<String>) -> Self {
        self.units = units.into();
        self
    }

    pub fn name(&self) -> &str {
        self.standard_name
            .as_deref()
            .or(self.long_name.as_deref())
            .unwrap_or(&self.var_name)
    }

    pub fn data(&self) -> &ArrayD<f64> {
        &self.data
    }

    pub fn shape(&self) -> &[usize] {
        self.data.shape()
    }

    pub fn ndim(&self) -> usize {
        self.data.ndim()
    }

    pub fn dim_coords(&self) -> &[Coord] {
        &self.dim_coords
    }

    pub fn aux_coords(&self) -> &[AuxCoord] {
        &self.aux_coords
    }

    pub fn scalar_coords(&self) -> &[Coord] {
        &self.scalar_coords
    }

    pub fn attributes(&self) -> &BTreeMap<String, String> {
        &self.attributes
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    pub fn set_attribute(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.attributes.insert(key.into(), value.into());
    }

    pub fn add_scalar_coord(&mut self, coord: Coord) {
        self.scalar_coords.push(coord);
    }

    /// Look up a coordinate by any of its names: dimension coordinates first,
    /// then auxiliary, then scalar coordinates.
    pub fn coord(&self, name: &str) -> CubeResult<&Coord> {
        self.dim_coords
            .iter()
            .chain(self.aux_coords.iter().map(|a| &a.coord))
            .chain(self.scalar_coords.iter())
            .find(|c| c.matches_name(name))
            .ok_or_else(|| CubeError::CoordinateNotFound(name.to_string()))
    }

    /// Dimension index of a dimension coordinate.
    pub fn dim_coord_index(&self, name: &str) -> Option<usize> {
        self.dim_coords.iter().position(|c| c.matches_name(name))
    }

    /// Dimension spanned by a dimension or auxiliary coordinate.
    pub fn coord_dim(&self, name: &str) -> Option<usize> {
        self.dim_coord_index(name).or_else(|| {
            self.aux_coords
                .iter()
                .find(|a| a.coord.matches_name(name))
                .map(|a| a.dim)
        })
    }

    /// Replace the dimension coordinate of `dim`.
    pub fn replace_dim_coord(&mut self, dim: usize, coord: Coord) -> CubeResult<()> {
        self.check_dim(dim)?;
        check_length(&coord, dim, self.data.shape()[dim])?;
        self.dim_coords[dim] = coord;
        Ok(())
    }

    pub fn add_aux_coord(&mut self, coord: Coord, dim: usize) -> CubeResult<()> {
        self.check_dim(dim)?;
        check_length(&coord, dim, self.data.shape()[dim])?;
        self.aux_coords.push(AuxCoord { coord, dim });
        Ok(())
    }

    pub fn remove_aux_coord(&mut self, name: &str) -> CubeResult<AuxCoord> {
        let index = self
            .aux_coords
            .iter()
            .position(|a| a.coord.matches_name(name))
            .ok_or_else(|| CubeError::CoordinateNotFound(name.to_string()))?;
        Ok(self.aux_coords.remove(index))
    }

    /// Attach an auxiliary coordinate derived point by point from the
    /// dimension coordinate `from`. The new coordinate shares its units.
    pub fn add_categorised_coord<F>(&mut self, name: &str, from: &str, category: F) -> CubeResult<()>
    where
        F: Fn(&Coord, f64) -> f64,
    {
        let dim = self
            .dim_coord_index(from)
            .ok_or_else(|| CubeError::CoordinateNotFound(from.to_string()))?;
        let source = &self.dim_coords[dim];
        let points = source.points().iter().map(|&v| category(source, v)).collect();
        let mut coord = Coord::new(name, points);
        coord.units = source.units.clone();
        self.add_aux_coord(coord, dim)
    }

    /// A new cube keeping only the given cells along `dim`, in the given order.
    pub fn select_indices(&self, dim: usize, indices: &[usize]) -> CubeResult<Cube> {
        self.check_dim(dim)?;
        if indices.is_empty() {
            return Err(CubeError::EmptySelection(self.dim_coords[dim].name().to_string()));
        }

        let mut dim_coords = self.dim_coords.clone();
        dim_coords[dim] = self.dim_coords[dim].select(indices)?;

        let aux_coords = self
            .aux_coords
            .iter()
            .map(|a| {
                if a.dim == dim {
                    Ok(AuxCoord {
                        coord: a.coord.select(indices)?,
                        dim,
                    })
                } else {
                    Ok(a.clone())
                }
            })
            .collect::<CubeResult<Vec<_>>>()?;

        Ok(Cube {
            data: self.data.select(Axis(dim), indices),
            dim_coords,
            aux_coords,
            ..self.clone()
        })
    }

    /// Reduce groups of cells sharing the same value of an auxiliary
    /// coordinate. Groups are ordered by ascending value; the grouping
    /// coordinate takes the group values and other coordinates on the
    /// dimension span their group.
    pub fn aggregated_by(&self, aux_name: &str, reducer: &dyn Reducer) -> CubeResult<Cube> {
        let grouping = self
            .aux_coords
            .iter()
            .find(|a| a.coord.matches_name(aux_name))
            .ok_or_else(|| CubeError::CoordinateNotFound(aux_name.to_string()))?;
        let dim = grouping.dim;
        let values = grouping.coord.points();

        let mut keys: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
        keys.sort_by(f64::total_cmp);
        keys.dedup();
        if keys.is_empty() {
            return Err(CubeError::EmptySelection(aux_name.to_string()));
        }

        let groups: Vec<Vec<usize>> = keys
            .iter()
            .map(|key| {
                values
                    .iter()
                    .enumerate()
                    .filter(|(_, v)| *v == key)
                    .map(|(i, _)| i)
                    .collect()
            })
            .collect();

        debug!(
            coord = %aux_name,
            groups = groups.len(),
            reducer = %reducer.name(),
            "Aggregating groups"
        );

        let slabs: Vec<ArrayD<f64>> = groups
            .iter()
            .map(|group| {
                self.data
                    .select(Axis(dim), group)
                    .map_axis(Axis(dim), |lane| reduce_lane(reducer, lane.iter()))
                    .insert_axis(Axis(dim))
            })
            .collect();
        let views: Vec<ArrayViewD<f64>> = slabs.iter().map(|s| s.view()).collect();
        let data = ndarray::concatenate(Axis(dim), &views)?;

        let mut dim_coords = self.dim_coords.clone();
        dim_coords[dim] = group_coord(&self.dim_coords[dim], &groups)?;

        let mut aux_coords = Vec::with_capacity(self.aux_coords.len());
        for aux in &self.aux_coords {
            let coord = if aux.dim != dim {
                aux.coord.clone()
            } else if aux.coord.matches_name(aux_name) {
                let mut c = aux.coord.clone();
                c.set_points(keys.clone());
                c
            } else {
                group_coord(&aux.coord, &groups)?
            };
            aux_coords.push(AuxCoord {
                coord,
                dim: aux.dim,
            });
        }

        Ok(Cube {
            data,
            dim_coords,
            aux_coords,
            ..self.clone()
        })
    }

    /// Reduce a whole dimension. The dimension is removed and its coordinate
    /// kept as a scalar coordinate (the midpoint of its extent, no bounds).
    pub fn collapsed(&self, name: &str, reducer: &dyn Reducer) -> CubeResult<Cube> {
        let dim = self
            .dim_coord_index(name)
            .ok_or_else(|| CubeError::CoordinateNotFound(name.to_string()))?;

        let data = self
            .data
            .map_axis(Axis(dim), |lane| reduce_lane(reducer, lane.iter()));

        let mut dim_coords = self.dim_coords.clone();
        let mut scalar = dim_coords.remove(dim);
        let midpoint = scalar
            .extent()
            .map(|(low, high)| (low + high) / 2.0)
            .unwrap_or(f64::NAN);
        scalar.set_points(vec![midpoint]);

        let aux_coords = self
            .aux_coords
            .iter()
            .filter(|a| a.dim != dim)
            .map(|a| AuxCoord {
                coord: a.coord.clone(),
                dim: if a.dim > dim { a.dim - 1 } else { a.dim },
            })
            .collect();

        let mut scalar_coords = self.scalar_coords.clone();
        scalar_coords.push(scalar);

        Ok(Cube {
            data,
            dim_coords,
            aux_coords,
            scalar_coords,
            ..self.clone()
        })
    }

    /// Append a timestamped line to the `history` attribute.
    pub fn add_history(&mut self, text: &str) {
        let entry = format!("{} {}", Utc::now().format("%Y-%m-%dT%H:%M:%S"), text);
        match self.attributes.get_mut("history") {
            Some(history) if !history.is_empty() => {
                history.push('\n');
                history.push_str(&entry);
            }
            _ => {
                self.attributes.insert("history".to_string(), entry);
            }
        }
    }

    /// Join cubes of the same variable along their first dimension.
    ///
    /// All other dimensions must have identical coordinates. Leading time
    /// points are converted to the first cube's reference date, cubes are
    /// put in coordinate order and overlapping points are an error.
    pub fn concatenate(cubes: Vec<Cube>) -> CubeResult<Cube> {
        let mut iter = cubes.into_iter();
        let first = iter
            .next()
            .ok_or_else(|| CubeError::Concatenate("no cubes given".to_string()))?;
        let rest: Vec<Cube> = iter.collect();
        if rest.is_empty() {
            return Ok(first);
        }
        if first.ndim() == 0 {
            return Err(CubeError::Concatenate("cannot join scalar cubes".to_string()));
        }

        for other in &rest {
            if other.var_name != first.var_name {
                return Err(CubeError::Concatenate(format!(
                    "variable '{}' does not match '{}'",
                    other.var_name, first.var_name
                )));
            }
            if other.ndim() != first.ndim() || other.shape()[1..] != first.shape()[1..] {
                return Err(CubeError::Concatenate(format!(
                    "shape {:?} does not match {:?}",
                    other.shape(),
                    first.shape()
                )));
            }
            for (a, b) in first.dim_coords[1..].iter().zip(&other.dim_coords[1..]) {
                if a.name() != b.name() || a.points() != b.points() {
                    return Err(CubeError::Concatenate(format!(
                        "coordinate '{}' differs between cubes",
                        a.name()
                    )));
                }
            }
        }

        let mut cubes = Vec::with_capacity(rest.len() + 1);
        cubes.push(first);
        cubes.extend(rest);

        // Leading values of every cube, in the first cube's units
        let unit_coord = cubes[0].dim_coords[0].clone();
        let leading = cubes
            .iter()
            .map(|c| leading_values(&unit_coord, &c.dim_coords[0]))
            .collect::<CubeResult<Vec<_>>>()?;

        let ascending = unit_coord.is_ascending();
        let mut order: Vec<usize> = (0..cubes.len()).collect();
        order.sort_by(|&a, &b| {
            let start = |i: usize| leading[i].0.first().copied().unwrap_or(f64::NAN);
            let ordering = start(a).total_cmp(&start(b));
            if ascending {
                ordering
            } else {
                ordering.reverse()
            }
        });

        let points: Vec<f64> = order
            .iter()
            .flat_map(|&i| leading[i].0.iter().copied())
            .collect();
        let monotonic = points
            .windows(2)
            .all(|w| if ascending { w[0] < w[1] } else { w[0] > w[1] });
        if !monotonic {
            return Err(CubeError::Concatenate(format!(
                "'{}' points overlap between cubes",
                unit_coord.name()
            )));
        }
        let bounds: Option<Vec<[f64; 2]>> = order
            .iter()
            .map(|&i| leading[i].1.clone())
            .collect::<Option<Vec<_>>>()
            .map(|b| b.concat());

        let data = {
            let views: Vec<ArrayViewD<f64>> = order.iter().map(|&i| cubes[i].data.view()).collect();
            ndarray::concatenate(Axis(0), &views)?
        };

        let first = cubes.swap_remove(0);
        let mut joined = unit_coord;
        joined.set_points(points);
        joined.set_bounds(bounds)?;

        let mut dim_coords = first.dim_coords.clone();
        dim_coords[0] = joined;

        let aux_coords = first
            .aux_coords
            .iter()
            .filter(|a| a.dim != 0)
            .cloned()
            .collect();

        Ok(Cube {
            data,
            dim_coords,
            aux_coords,
            ..first
        })
    }

    fn check_dim(&self, dim: usize) -> CubeResult<()> {
        if dim >= self.ndim() {
            return Err(CubeError::IndexOutOfRange {
                name: self.name().to_string(),
                index: dim,
                len: self.ndim(),
            });
        }
        Ok(())
    }
}

fn check_length(coord: &Coord, dim: usize, expected: usize) -> CubeResult<()> {
    if coord.len() != expected {
        return Err(CubeError::LengthMismatch {
            name: coord.name().to_string(),
            dim,
            expected,
            actual: coord.len(),
        });
    }
    Ok(())
}

/// Points and bounds of `coord` expressed in the units of `target`.
///
/// Time coordinates with different reference dates are converted; any other
/// unit mismatch is an error.
fn leading_values(
    target: &Coord,
    coord: &Coord,
) -> CubeResult<(Vec<f64>, Option<Vec<[f64; 2]>>)> {
    if coord.units == target.units {
        return Ok((coord.points().to_vec(), coord.bounds().map(|b| b.to_vec())));
    }
    if !(coord.is_time() && target.is_time()) {
        return Err(CubeError::Concatenate(format!(
            "'{}' units '{}' do not match '{}'",
            coord.name(),
            coord.units,
            target.units
        )));
    }
    let convert = |value: f64| -> CubeResult<f64> {
        target.datetime_to_units(coord.units_to_datetime(value)?)
    };
    let points = coord
        .points()
        .iter()
        .map(|&p| convert(p))
        .collect::<CubeResult<Vec<_>>>()?;
    let bounds = coord
        .bounds()
        .map(|bounds| {
            bounds
                .iter()
                .map(|&[low, high]| Ok([convert(low)?, convert(high)?]))
                .collect::<CubeResult<Vec<_>>>()
        })
        .transpose()?;
    Ok((points, bounds))
}

fn reduce_lane<'a>(reducer: &dyn Reducer, lane: impl Iterator<Item = &'a f64>) -> f64 {
    let values: Vec<f64> = lane.copied().filter(|v| !v.is_nan()).collect();
    reducer.reduce(&values)
}

/// Collapse each group of cells into one cell spanning the group.
fn group_coord(coord: &Coord, groups: &[Vec<usize>]) -> CubeResult<Coord> {
    let mut points = Vec::with_capacity(groups.len());
    let mut bounds = Vec::with_capacity(groups.len());
    for group in groups {
        let mut low = f64::INFINITY;
        let mut high = f64::NEG_INFINITY;
        for &i in group {
            let cell = coord.cell(i)?;
            low = low.min(cell.min_bound().unwrap_or(cell.point));
            high = high.max(cell.max_bound().unwrap_or(cell.point));
        }
        points.push((low + high) / 2.0);
        bounds.push([low, high]);
    }
    let mut grouped = coord.clone();
    grouped.set_points(points);
    grouped.set_bounds(Some(bounds))?;
    Ok(grouped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::CoordUnits;
    use ndarray::{arr1, Array1, Array2, IxDyn};

    #[derive(Debug)]
    struct Sum;

    impl Reducer for Sum {
        fn name(&self) -> &str {
            "sum"
        }

        fn reduce(&self, values: &[f64]) -> f64 {
            values.iter().sum()
        }
    }

    fn cube_2d() -> Cube {
        // 3 x 4, value = row * 10 + col
        let data = Array2::from_shape_fn((3, 4), |(r, c)| (r * 10 + c) as f64).into_dyn();
        Cube::new(
            "var",
            data,
            vec![
                Coord::new("y", vec![0.0, 1.0, 2.0]),
                Coord::new("x", vec![0.0, 10.0, 20.0, 30.0]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_new_checks_lengths() {
        let data = arr1(&[1.0, 2.0]).into_dyn();
        let err = Cube::new("v", data.clone(), vec![Coord::new("x", vec![0.0])]).unwrap_err();
        assert!(matches!(err, CubeError::LengthMismatch { .. }));
        let err = Cube::new("v", data, vec![]).unwrap_err();
        assert!(matches!(err, CubeError::DimensionMismatch { .. }));
    }

    #[test]
    fn test_select_indices() {
        let cube = cube_2d();
        let sub = cube.select_indices(1, &[1, 2]).unwrap();
        assert_eq!(sub.shape(), &[3, 2]);
        assert_eq!(sub.dim_coords()[1].points(), &[10.0, 20.0]);
        assert_eq!(sub.data()[IxDyn(&[2, 0])], 21.0);
        assert!(cube.select_indices(1, &[]).is_err());
        assert!(cube.select_indices(5, &[0]).is_err());
    }

    #[test]
    fn test_aggregated_by_groups_ascending() {
        let mut cube = cube_2d();
        cube.add_categorised_coord("cat", "x", |_, v| if v < 15.0 { 100.0 } else { 50.0 })
            .unwrap();
        let agg = cube.aggregated_by("cat", &Sum).unwrap();
        assert_eq!(agg.shape(), &[3, 2]);
        assert_eq!(agg.coord("cat").unwrap().points(), &[50.0, 100.0]);
        // Row 1: group 50 -> cols 2,3 -> 12 + 13, group 100 -> cols 0,1 -> 10 + 11
        assert_eq!(agg.data()[IxDyn(&[1, 0])], 25.0);
        assert_eq!(agg.data()[IxDyn(&[1, 1])], 21.0);
        assert_eq!(agg.dim_coords()[1].bounds().unwrap(), &[[20.0, 30.0], [0.0, 10.0]]);
    }

    #[test]
    fn test_collapsed_removes_dimension() {
        let cube = cube_2d();
        let collapsed = cube.collapsed("y", &Sum).unwrap();
        assert_eq!(collapsed.shape(), &[4]);
        assert_eq!(collapsed.data()[IxDyn(&[1])], 1.0 + 11.0 + 21.0);
        let scalar = collapsed.coord("y").unwrap();
        assert_eq!(scalar.points(), &[1.0]);
        assert!(!scalar.has_bounds());
        assert_eq!(collapsed.dim_coord_index("y"), None);
    }

    #[test]
    fn test_missing_values_are_skipped() {
        let data = arr1(&[1.0, f64::NAN, 3.0]).into_dyn();
        let cube = Cube::new("v", data, vec![Coord::new("x", vec![0.0, 1.0, 2.0])]).unwrap();
        let collapsed = cube.collapsed("x", &Sum).unwrap();
        assert_eq!(collapsed.data()[IxDyn(&[])], 4.0);
    }

    #[test]
    fn test_add_history_appends() {
        let mut cube = cube_2d();
        cube.add_history("first");
        cube.add_history("second");
        let history = cube.attribute("history").unwrap();
        let lines: Vec<&str> = history.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("first"));
        assert!(lines[1].ends_with("second"));
    }

    #[test]
    fn test_concatenate_along_first_dim() {
        let a = cube_2d();
        let mut b = cube_2d();
        let mut y = b.dim_coords()[0].clone();
        y.set_points(vec![3.0, 4.0, 5.0]);
        b.replace_dim_coord(0, y).unwrap();

        let joined = Cube::concatenate(vec![a, b]).unwrap();
        assert_eq!(joined.shape(), &[6, 4]);
        assert_eq!(joined.dim_coords()[0].points(), &[0.0, 1.0, 2.0, 3.0, 4.0, 5.0]);

        let mismatched = cube_2d().select_indices(1, &[0, 1]).unwrap();
        assert!(Cube::concatenate(vec![cube_2d(), mismatched]).is_err());
    }

    fn daily(units: &str, days: &[f64], values: &[f64]) -> Cube {
        let time = Coord::new("time", days.to_vec())
            .with_units(units)
            .with_bounds(days.iter().map(|d| [d - 0.5, d + 0.5]).collect())
            .unwrap();
        Cube::new("var", arr1(values).into_dyn(), vec![time]).unwrap()
    }

    #[test]
    fn test_concatenate_converts_time_references() {
        let joined = Cube::concatenate(vec![
            daily("days since 2008-01-01", &[0.5, 1.5], &[1.0, 2.0]),
            daily("days since 2009-01-01", &[0.5, 1.5], &[3.0, 4.0]),
        ])
        .unwrap();
        let time = joined.coord("time").unwrap();
        assert_eq!(time.units, CoordUnits::parse("days since 2008-01-01"));
        // 2008 is a leap year
        assert_eq!(time.points(), &[0.5, 1.5, 366.5, 367.5]);
        assert_eq!(time.bounds().unwrap()[2], [366.0, 367.0]);
        let third = time.units_to_datetime(time.points()[2]).unwrap();
        assert_eq!(third.format("%Y-%m-%d %H:%M").to_string(), "2009-01-01 12:00");
        assert_eq!(joined.data()[IxDyn(&[2])], 3.0);
    }

    #[test]
    fn test_concatenate_orders_cubes_by_coordinate() {
        let joined = Cube::concatenate(vec![
            daily("days since 2009-01-01", &[0.5, 1.5], &[3.0, 4.0]),
            daily("days since 2008-01-01", &[0.5, 1.5], &[1.0, 2.0]),
        ])
        .unwrap();
        let time = joined.coord("time").unwrap();
        assert_eq!(time.points(), &[-365.5, -364.5, 0.5, 1.5]);
        let values: Vec<f64> = joined.data().iter().copied().collect();
        assert_eq!(values, vec![1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_concatenate_rejects_overlap_and_unit_mismatch() {
        let err = Cube::concatenate(vec![
            daily("days since 2008-01-01", &[0.5, 1.5], &[1.0, 2.0]),
            daily("hours since 2008-01-01", &[12.0, 36.0], &[1.0, 2.0]),
        ])
        .unwrap_err();
        assert!(matches!(err, CubeError::Concatenate(_)));

        let metres = |points: Vec<f64>| {
            let n = points.len();
            let z = Coord::new("z", points).with_units("m");
            Cube::new("var", Array1::zeros(n).into_dyn(), vec![z]).unwrap()
        };
        let km = Cube::new(
            "var",
            Array1::zeros(1).into_dyn(),
            vec![Coord::new("z", vec![5.0]).with_units("km")],
        )
        .unwrap();
        assert!(matches!(
            Cube::concatenate(vec![metres(vec![0.0, 1.0]), km]),
            Err(CubeError::Concatenate(_))
        ));
    }
}
