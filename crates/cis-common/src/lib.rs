//! Common types and utilities shared across the CIS crates.

pub mod error;
pub mod grid;
pub mod time;

pub use error::{CisError, CisResult};
pub use grid::{parse_grid_arg, GridDelta, GridSpec, GridSpecs, GridValue};
pub use time::{CalendarDelta, PartialDateTime, TimeStep, TimeUnit};

/// Version string recorded in provenance history.
pub const CIS_VERSION: &str = env!("CARGO_PKG_VERSION");
