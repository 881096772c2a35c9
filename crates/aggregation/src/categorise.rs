//! Mapping coordinate values onto the points of a target grid.

use cis_common::{CalendarDelta, GridDelta};
use gridded_data::Coord;

use crate::calendar::{advance_period, half_period_start};
use crate::error::{AggregationError, Result};

/// Points of a newly generated target grid, in generation order.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryGrid {
    points: Vec<f64>,
}

impl CategoryGrid {
    /// Cell centres `start + step/2 + k*step` strictly below `end + step/2`.
    pub fn numeric(start: f64, end: f64, step: f64) -> Result<Self> {
        if !step.is_finite() || step <= 0.0 {
            return Err(AggregationError::invalid_grid(
                "",
                format!("step must be positive, got {}", step),
            ));
        }
        let first = start + step / 2.0;
        let stop = end + step / 2.0;
        let count = ((stop - first) / step).ceil();
        let count = if count.is_finite() && count > 0.0 {
            count as usize
        } else {
            0
        };
        let points: Vec<f64> = (0..count).map(|k| first + k as f64 * step).collect();
        Self::from_points(points)
    }

    /// Calendar grid between two values in the units of a time coordinate.
    ///
    /// Starts at the middle of the first period and advances one period at
    /// a time while before `end`.
    pub fn calendar(coord: &Coord, start: f64, end: f64, delta: &CalendarDelta) -> Result<Self> {
        let end_dt = coord.units_to_datetime(end)?;
        let mut current = half_period_start(coord.units_to_datetime(start)?, delta)?;

        let mut points = Vec::new();
        while current < end_dt {
            points.push(coord.datetime_to_units(current)?);
            let next = advance_period(current, delta)?;
            if next <= current {
                break;
            }
            current = next;
        }
        Self::from_points(points)
    }

    /// Build the grid for a coordinate from a numeric step or calendar period.
    pub fn for_coord(coord: &Coord, start: f64, end: f64, delta: &GridDelta) -> Result<Self> {
        let grid = match delta {
            GridDelta::Step(step) => Self::numeric(start, end, *step),
            GridDelta::Calendar(period) => {
                if !coord.is_time() {
                    return Err(AggregationError::invalid_grid(
                        coord.name(),
                        format!("calendar step {} given for a coordinate without time units", period),
                    ));
                }
                Self::calendar(coord, start, end, period)
            }
            GridDelta::Collapse => Err(AggregationError::invalid_grid(
                coord.name(),
                "a collapsed axis has no grid points",
            )),
        };
        grid.map_err(|err| match err {
            AggregationError::InvalidGrid { coord: c, message } if c.is_empty() => {
                AggregationError::invalid_grid(coord.name(), message)
            }
            other => other,
        })
    }

    fn from_points(points: Vec<f64>) -> Result<Self> {
        if points.is_empty() {
            return Err(AggregationError::invalid_grid("", "the grid has no points"));
        }
        Ok(Self { points })
    }

    pub fn points(&self) -> &[f64] {
        &self.points
    }

    /// The grid point closest to `value`; the earliest point wins a tie.
    pub fn nearest(&self, value: f64) -> f64 {
        let mut best = self.points[0];
        let mut best_distance = (best - value).abs();
        for &p in &self.points[1..] {
            let d = (p - value).abs();
            if d < best_distance {
                best = p;
                best_distance = d;
            }
        }
        best
    }
}

/// A categorisation function closing over the target grid for `coord`.
///
/// The returned closure maps any value of the coordinate to the centre of
/// the target cell it belongs to.
pub fn categorise_coord_function(
    coord: &Coord,
    start: f64,
    end: f64,
    delta: &GridDelta,
) -> Result<impl Fn(&Coord, f64) -> f64> {
    let grid = CategoryGrid::for_coord(coord, start, end, delta)?;
    Ok(move |_: &Coord, value: f64| grid.nearest(value))
}
