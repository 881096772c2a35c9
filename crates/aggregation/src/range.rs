//! Reconciling requested aggregation ranges with the extent of the data.

use cis_common::{GridSpec, GridValue};
use gridded_data::Coord;
use tracing::warn;

use crate::error::{AggregationError, Result};

/// Start and end of an aggregation in the units of the coordinate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AggregationRange {
    pub start: f64,
    pub end: f64,
    /// The requested start lay before the data and was moved.
    pub start_clamped: bool,
    /// The requested end lay after the data and was moved.
    pub end_clamped: bool,
}

/// Convert the requested range of `spec` into the units of `coord` and clamp
/// it to the extent of the data.
///
/// Time values cover `[lower, upper)` of their finest given component, so
/// `2008` to `2008` is the whole of 2008. Missing ends default to the data
/// extent. Overshoot is corrected with a warning.
pub fn reconcile_range(coord: &Coord, spec: &GridSpec) -> Result<AggregationRange> {
    let (data_start, data_end) = coord.extent().ok_or_else(|| {
        AggregationError::invalid_grid(coord.name(), "the coordinate has no points")
    })?;

    let mut start = match spec.start {
        Some(value) => to_coord_units(coord, value, false)?,
        None => data_start,
    };
    let mut end = match spec.end {
        Some(value) => to_coord_units(coord, value, true)?,
        None => data_end,
    };

    let numeric_limits = !matches!(spec.start, Some(GridValue::Time(_)))
        && !matches!(spec.end, Some(GridValue::Time(_)));
    if numeric_limits && start > end {
        match coord.modulus() {
            Some(modulus) => end += modulus,
            None => std::mem::swap(&mut start, &mut end),
        }
    }

    let mut range = AggregationRange {
        start,
        end,
        start_clamped: false,
        end_clamped: false,
    };

    if range.start < data_start {
        warn!(
            coord = %coord.name(),
            requested = %display_value(coord, range.start),
            clamped = %display_value(coord, data_start),
            "Aggregation grid starts before the data, starting at the first cell instead"
        );
        range.start = data_start;
        range.start_clamped = true;
    }
    if range.end > data_end {
        warn!(
            coord = %coord.name(),
            requested = %display_value(coord, range.end),
            clamped = %display_value(coord, data_end),
            "Aggregation grid ends after the data, ending at the last cell instead"
        );
        range.end = data_end;
        range.end_clamped = true;
    }

    if range.start >= range.end {
        return Err(AggregationError::EmptyRange {
            coord: coord.name().to_string(),
            start: display_value(coord, range.start),
            end: display_value(coord, range.end),
        });
    }

    Ok(range)
}

/// A value of `coord` formatted for people: datetimes for time axes.
pub fn display_value(coord: &Coord, value: f64) -> String {
    if coord.is_time() {
        if let Ok(dt) = coord.units_to_datetime(value) {
            return dt.format("%Y-%m-%d %H:%M:%S").to_string();
        }
    }
    format!("{}", value)
}

fn to_coord_units(coord: &Coord, value: GridValue, is_end: bool) -> Result<f64> {
    match value {
        // Only grids already marked as time turn bare years into datetimes,
        // so plain numbers on a time axis are offsets in the coordinate's
        // own units even when the axis role is T.
        GridValue::Number(n) => Ok(n),
        GridValue::Time(t) => {
            if !coord.is_time() {
                return Err(AggregationError::invalid_grid(
                    coord.name(),
                    format!("time limit {} given for a coordinate without time units", t),
                ));
            }
            let dt = if is_end {
                t.upper_exclusive()?
            } else {
                t.lower()?
            };
            Ok(coord.datetime_to_units(dt)?)
        }
    }
}

/// Indices of the cells whose points lie within `[start, end]`.
///
/// Starts from the cells containing each limit and walks inwards until the
/// point is inside the range, so cells whose bounds straddle a limit but
/// whose point lies outside it are dropped. On a circular coordinate an end
/// limit that wraps onto the first cell steps back across the seam to the
/// last one. Indices are returned in storage order.
pub fn subset_indices(coord: &Coord, start: f64, end: f64) -> Result<Vec<usize>> {
    let empty = || AggregationError::EmptyRange {
        coord: coord.name().to_string(),
        start: display_value(coord, start),
        end: display_value(coord, end),
    };

    let n = coord.len();
    let points = coord.points();
    // Walk in ascending value order so descending axes behave the same
    let ascending = coord.is_ascending();
    let index_at = |rank: usize| if ascending { rank } else { n - 1 - rank };
    let rank_of = index_at;

    let mut first = rank_of(coord.nearest_neighbour_index(start).ok_or_else(empty)?);
    while points[index_at(first)] < start {
        first += 1;
        if first == n {
            return Err(empty());
        }
    }

    let mut last = rank_of(coord.nearest_neighbour_index(end).ok_or_else(empty)?);
    while points[index_at(last)] > end {
        if last == 0 {
            return Err(empty());
        }
        last -= 1;
    }

    if coord.circular && last <= first && wraps_around(coord, end) {
        last = (last + n - 1) % n;
    }

    if first > last {
        return Err(empty());
    }

    let mut indices: Vec<usize> = (first..=last).map(index_at).collect();
    indices.sort_unstable();
    Ok(indices)
}

/// Whether looking up `value` on a circular coordinate wraps it around.
fn wraps_around(coord: &Coord, value: f64) -> bool {
    let Some(modulus) = coord.modulus() else {
        return false;
    };
    let low = match coord.bounds() {
        Some(bounds) => bounds
            .iter()
            .flat_map(|b| b.iter().copied())
            .fold(f64::INFINITY, f64::min),
        None => coord.points().iter().copied().fold(f64::INFINITY, f64::min),
    };
    low + (value - low).rem_euclid(modulus) != value
}
