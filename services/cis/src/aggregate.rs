//! Read, aggregate and save pipeline.

use aggregation::{aggregation_history, AggregationError, Aggregator, KernelRegistry};
use anyhow::{Context, Result};
use gridded_data::Cube;
use netcdf_io::{save_cube, ProductRegistry};
use tracing::info;

use crate::config::AggregateRequest;

/// Runs aggregation requests against a fixed set of product readers and
/// kernels.
#[derive(Debug, Clone, Default)]
pub struct AggregatePipeline {
    products: ProductRegistry,
    kernels: KernelRegistry,
}

impl AggregatePipeline {
    pub fn new(products: ProductRegistry, kernels: KernelRegistry) -> Self {
        Self { products, kernels }
    }

    /// Aggregate the requested variable and write it to the output path.
    ///
    /// Nothing is written if reading or aggregation fails.
    pub fn run(&self, request: &AggregateRequest) -> Result<Cube> {
        info!(
            variable = %request.variable,
            files = request.files.len(),
            product = request.product.as_deref().unwrap_or("default"),
            "Reading data"
        );
        let data = self
            .products
            .resolve(request.product.as_deref())
            .and_then(|product| product.create_data(&request.files, &request.variable))
            .map_err(AggregationError::read)?;

        let aggregator = Aggregator::new(request.grid.clone()).with_kernels(self.kernels.clone());
        let mut cube = aggregator.aggregate(data, request.kernel.as_deref())?;

        let files: Vec<_> = request.files.iter().map(|f| f.display()).collect();
        cube.add_history(&aggregation_history(
            &request.variable,
            &files,
            &request.grid,
            request.kernel.as_deref(),
        ));

        save_cube(&cube, &request.output)
            .with_context(|| format!("Failed to save {}", request.output.display()))?;
        info!(output = %request.output.display(), shape = ?cube.shape(), "Aggregation complete");

        Ok(cube)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cis_common::parse_grid_arg;
    use ndarray::IxDyn;
    use netcdf_io::read_cube;
    use std::path::{Path, PathBuf};
    use test_utils::{
        create_1d_cube, create_daily_cube, five_point_axis, temp_test_dir, temp_test_dir_with_prefix,
    };

    fn request(files: Vec<PathBuf>, grid: &str, kernel: Option<&str>, output: &Path) -> AggregateRequest {
        AggregateRequest {
            variable: "test_var".to_string(),
            files,
            product: None,
            kernel: kernel.map(str::to_string),
            grid: parse_grid_arg(grid).unwrap(),
            output: output.to_path_buf(),
        }
    }

    #[test]
    fn test_aggregate_file_to_file() {
        let dir = temp_test_dir_with_prefix("cis_aggregate_");
        let input = dir.path().join("input.nc");
        let output = dir.path().join("output.nc");
        save_cube(
            &create_1d_cube(five_point_axis(), &[1.0, 2.0, 3.0, 4.0, 5.0]),
            &input,
        )
        .unwrap();

        let pipeline = AggregatePipeline::default();
        pipeline
            .run(&request(vec![input.clone()], "x=[0,40,20]", None, &output))
            .unwrap();

        let saved = read_cube(&output, "test_var").unwrap();
        let values: Vec<f64> = saved.data().iter().copied().collect();
        assert_eq!(values, vec![2.0, 4.5]);
        let x = saved.coord("x").unwrap();
        assert_eq!(x.points(), &[10.0, 30.0]);
        assert_eq!(x.bounds().unwrap(), &[[0.0, 20.0], [20.0, 40.0]]);

        let history = saved.attribute("history").unwrap();
        assert!(history.contains("Aggregated using CIS version"));
        assert!(history.contains("variable: test_var"));
        assert!(history.contains(&format!("from files: [{}]", input.display())));
        assert!(history.contains("using new grid: {x=[0,40,20]}"));
        assert!(history.contains("with kernel: mean"));
    }

    #[test]
    fn test_multiple_files_and_kernel() {
        let dir = temp_test_dir();
        let first = dir.path().join("first.nc");
        let second = dir.path().join("second.nc");
        let output = dir.path().join("output.nc");
        save_cube(&create_daily_cube(0, 4), &first).unwrap();
        save_cube(&create_daily_cube(4, 4), &second).unwrap();

        let cube = AggregatePipeline::default()
            .run(&request(vec![first, second], "t", Some("sum"), &output))
            .unwrap();
        assert_eq!(cube.data()[IxDyn(&[])], 28.0);

        let saved = read_cube(&output, "test_var").unwrap();
        assert_eq!(saved.ndim(), 0);
        assert!(saved.attribute("history").unwrap().contains("with kernel: sum"));
    }

    #[test]
    fn test_read_failure_writes_nothing() {
        let dir = temp_test_dir();
        let output = dir.path().join("output.nc");
        let err = AggregatePipeline::default()
            .run(&request(
                vec![dir.path().join("missing.nc")],
                "x=[0,40,20]",
                None,
                &output,
            ))
            .unwrap_err();

        let err = err.downcast_ref::<AggregationError>().unwrap();
        assert!(matches!(err, AggregationError::Read(_)));
        assert!(err.to_string().starts_with("There was an error reading in data"));
        assert!(!output.exists());
    }

    #[test]
    fn test_unknown_kernel_writes_nothing() {
        let dir = temp_test_dir();
        let input = dir.path().join("input.nc");
        let output = dir.path().join("output.nc");
        save_cube(
            &create_1d_cube(five_point_axis(), &[1.0, 2.0, 3.0, 4.0, 5.0]),
            &input,
        )
        .unwrap();

        let err = AggregatePipeline::default()
            .run(&request(vec![input], "x=[0,40,20]", Some("mode"), &output))
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<AggregationError>(),
            Some(AggregationError::UnknownKernel { .. })
        ));
        assert!(!output.exists());
    }
}
