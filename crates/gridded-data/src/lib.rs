//! Gridded data model for CIS.
//!
//! A [`Cube`] is an N-dimensional array of values with one dimension
//! coordinate per axis. Coordinates carry points, optional cell bounds and
//! units; time coordinates store numbers in CF time units. The aggregation
//! engine only relies on the operations defined here:
//!
//! - subsetting along a dimension by index
//! - attaching a derived (categorised) coordinate
//! - reducing groups of equal categorised values (`aggregated_by`)
//! - reducing a whole dimension (`collapsed`)
//! - rebuilding coordinate bounds from points
//!
//! Missing values are represented as NaN and skipped by all reductions.

pub mod axis;
pub mod coord;
pub mod cube;
pub mod error;
pub mod ungridded;

pub use axis::{guess_coord_axis, AxisRole};
pub use coord::{Cell, Coord, CoordUnits};
pub use cube::{AuxCoord, Cube, Reducer};
pub use error::{CubeError, CubeResult};
pub use ungridded::{Dataset, UngriddedData};
