//! Product readers, selected by name.

use std::collections::BTreeMap;
use std::fmt::Debug;
use std::path::PathBuf;
use std::sync::Arc;

use gridded_data::{Cube, Dataset, UngriddedData};
use tracing::info;

use crate::error::{NetCdfError, NetCdfResult};
use crate::native::{read_cube, read_ungridded};

/// Product used when none is named.
pub const DEFAULT_PRODUCT: &str = "NetCDF_Gridded";

/// A reader for one kind of data product.
pub trait Product: Debug + Send + Sync {
    fn name(&self) -> &str;

    /// Read `variable` from all of `files` as a single dataset.
    fn create_data(&self, files: &[PathBuf], variable: &str) -> NetCdfResult<Dataset>;
}

/// Gridded CF NetCDF; multiple files are joined along the first dimension.
#[derive(Debug, Clone, Copy, Default)]
pub struct NetCdfGridded;

impl Product for NetCdfGridded {
    fn name(&self) -> &str {
        "NetCDF_Gridded"
    }

    fn create_data(&self, files: &[PathBuf], variable: &str) -> NetCdfResult<Dataset> {
        if files.is_empty() {
            return Err(NetCdfError::NoFiles);
        }
        let cubes = files
            .iter()
            .map(|path| read_cube(path, variable))
            .collect::<NetCdfResult<Vec<_>>>()?;
        let cube = Cube::concatenate(cubes)?;
        info!(
            variable = %variable,
            files = files.len(),
            shape = ?cube.shape(),
            "Read gridded data"
        );
        Ok(Dataset::Gridded(cube))
    }
}

/// Point data in NetCDF, located by the variable's `coordinates` attribute.
#[derive(Debug, Clone, Copy, Default)]
pub struct NetCdfUngridded;

impl Product for NetCdfUngridded {
    fn name(&self) -> &str {
        "NetCDF_Ungridded"
    }

    fn create_data(&self, files: &[PathBuf], variable: &str) -> NetCdfResult<Dataset> {
        let mut parts = files.iter().map(|path| read_ungridded(path, variable));
        let mut data = parts.next().ok_or(NetCdfError::NoFiles)??;
        for part in parts {
            append_points(&mut data, part?)?;
        }
        info!(variable = %variable, points = data.len(), "Read ungridded data");
        Ok(Dataset::Ungridded(data))
    }
}

fn append_points(data: &mut UngriddedData, other: UngriddedData) -> NetCdfResult<()> {
    if other.coords.len() != data.coords.len() {
        return Err(NetCdfError::InvalidFormat(format!(
            "files give {} and {} coordinates for '{}'",
            data.coords.len(),
            other.coords.len(),
            data.var_name
        )));
    }
    for (coord, extra) in data.coords.iter_mut().zip(&other.coords) {
        let mut points = coord.points().to_vec();
        points.extend_from_slice(extra.points());
        coord.set_points(points);
    }
    data.values.extend(other.values);
    Ok(())
}

/// Product readers available by name.
///
/// Built once at startup; lookups are by exact name.
#[derive(Debug, Clone)]
pub struct ProductRegistry {
    products: BTreeMap<String, Arc<dyn Product>>,
}

impl ProductRegistry {
    /// Registry with the NetCDF gridded and ungridded readers.
    pub fn standard() -> Self {
        let products: [Arc<dyn Product>; 2] = [Arc::new(NetCdfGridded), Arc::new(NetCdfUngridded)];
        Self::from_products(products)
    }

    pub fn from_products(products: impl IntoIterator<Item = Arc<dyn Product>>) -> Self {
        let products = products
            .into_iter()
            .map(|p| (p.name().to_string(), p))
            .collect();
        Self { products }
    }

    pub fn get(&self, name: &str) -> NetCdfResult<Arc<dyn Product>> {
        self.products
            .get(name)
            .cloned()
            .ok_or_else(|| NetCdfError::UnknownProduct {
                name: name.to_string(),
                available: self.names().join(", "),
            })
    }

    /// Look up a product, using the default when none is named.
    pub fn resolve(&self, name: Option<&str>) -> NetCdfResult<Arc<dyn Product>> {
        self.get(name.unwrap_or(DEFAULT_PRODUCT))
    }

    pub fn names(&self) -> Vec<&str> {
        self.products.keys().map(String::as_str).collect()
    }
}

impl Default for ProductRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

/// Read `variable` from `files` with the named product reader.
pub fn read_data(files: &[PathBuf], variable: &str, product: Option<&str>) -> NetCdfResult<Dataset> {
    ProductRegistry::standard()
        .resolve(product)?
        .create_data(files, variable)
}
