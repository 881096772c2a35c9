//! Point-cloud data and the dataset type returned by product readers.

use crate::coord::Coord;
use crate::cube::Cube;

/// Values at scattered points, each with its own coordinates.
///
/// Every coordinate has one point per value.
#[derive(Debug, Clone)]
pub struct UngriddedData {
    pub var_name: String,
    pub units: String,
    pub values: Vec<f64>,
    pub coords: Vec<Coord>,
}

impl UngriddedData {
    pub fn new(var_name: impl Into<String>, values: Vec<f64>, coords: Vec<Coord>) -> Self {
        Self {
            var_name: var_name.into(),
            units: "1".to_string(),
            values,
            coords,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Data read by a product reader.
#[derive(Debug, Clone)]
pub enum Dataset {
    Gridded(Cube),
    Ungridded(UngriddedData),
}

impl Dataset {
    pub fn is_gridded(&self) -> bool {
        matches!(self, Dataset::Gridded(_))
    }

    pub fn name(&self) -> &str {
        match self {
            Dataset::Gridded(cube) => cube.name(),
            Dataset::Ungridded(data) => &data.var_name,
        }
    }
}

impl From<Cube> for Dataset {
    fn from(cube: Cube) -> Self {
        Dataset::Gridded(cube)
    }
}

impl From<UngriddedData> for Dataset {
    fn from(data: UngriddedData) -> Self {
        Dataset::Ungridded(data)
    }
}
