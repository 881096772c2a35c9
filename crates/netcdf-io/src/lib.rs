//! NetCDF input and output for CIS.
//!
//! Input files are read through named product readers: `NetCDF_Gridded`
//! (the default) produces a cube, `NetCDF_Ungridded` a point cloud. Cubes
//! are written back with [`save_cube`].
//!
//! # Implementation Notes
//!
//! Reading uses the native netcdf library, which wraps libnetcdf and HDF5.
//! System requirements: libhdf5-dev libnetcdf-dev.

pub mod error;
pub mod native;
pub mod products;
pub mod writer;

pub use error::{NetCdfError, NetCdfResult};
pub use native::{read_cube, read_ungridded, silence_hdf5_errors};
pub use products::{read_data, NetCdfGridded, NetCdfUngridded, Product, ProductRegistry, DEFAULT_PRODUCT};
pub use writer::{save_cube, FILL_VALUE};
