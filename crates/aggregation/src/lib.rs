//! Aggregation of gridded data onto coarser grids.
//!
//! A grid is given per coordinate as a start, an end and a step, either a
//! number in the coordinate's own units or a calendar period for time
//! coordinates. Each value of a coordinate is mapped to the nearest point of
//! the new grid and the data is reduced over the cells sharing a point with
//! a named kernel such as `mean` or `max`.
//!
//! ```ignore
//! use aggregation::Aggregator;
//! use cis_common::parse_grid_arg;
//!
//! let grid = parse_grid_arg("x=[-180,180,10],t=[2008-01,2008-12,P1M]")?;
//! let result = Aggregator::new(grid).aggregate(dataset, Some("max"))?;
//! ```

pub mod aggregator;
pub mod calendar;
pub mod categorise;
pub mod error;
pub mod kernels;
pub mod range;
pub mod resolve;

pub use aggregator::{aggregation_history, Aggregator, AGGREGATION_COORD_PREFIX};
pub use calendar::{add_year_midpoint, advance_period, half_period_start};
pub use categorise::{categorise_coord_function, CategoryGrid};
pub use error::{AggregationError, Result};
pub use kernels::{KernelRegistry, DEFAULT_KERNEL};
pub use range::{reconcile_range, subset_indices, AggregationRange};
pub use resolve::{resolve_grid, GridMatch};
