use std::io;
use std::sync::{Arc, Mutex};

use aggregation::{AggregationError, Aggregator};
use cis_common::parse_grid_arg;
use gridded_data::{Coord, Cube, Dataset, UngriddedData};
use ndarray::IxDyn;
use test_utils::{
    assert_approx_eq, create_1d_cube, create_daily_cube, create_indexed_cube, five_point_axis,
    global_latitude, global_longitude,
};
use tracing_subscriber::fmt::MakeWriter;

/// Log output collected from a test subscriber.
#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedLogs {
    type Writer = CapturedLogs;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

fn with_captured_logs<T>(f: impl FnOnce() -> T) -> (T, String) {
    let logs = CapturedLogs::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(logs.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::WARN)
        .finish();
    let result = tracing::subscriber::with_default(subscriber, f);
    (result, logs.contents())
}

fn aggregate(cube: Cube, grid: &str, kernel: Option<&str>) -> Cube {
    let grid = parse_grid_arg(grid).unwrap();
    Aggregator::new(grid).aggregate(cube.into(), kernel).unwrap()
}

fn values(cube: &Cube) -> Vec<f64> {
    cube.data().iter().copied().collect()
}

fn five_point_cube() -> Cube {
    create_1d_cube(five_point_axis(), &[1.0, 2.0, 3.0, 4.0, 5.0])
}

#[test]
fn test_five_points_onto_two_cells() {
    let result = aggregate(five_point_cube(), "x=[0,40,20]", None);

    let x = result.coord("x").unwrap();
    assert_eq!(x.points(), &[10.0, 30.0]);
    assert_eq!(x.bounds().unwrap(), &[[0.0, 20.0], [20.0, 40.0]]);
    // 20 is equally far from both centres and goes to the first
    assert_eq!(values(&result), vec![2.0, 4.5]);
}

#[test]
fn test_named_kernel() {
    let result = aggregate(five_point_cube(), "x=[0,40,20]", Some("max"));
    assert_eq!(values(&result), vec![3.0, 5.0]);

    let result = aggregate(five_point_cube(), "x=[0,40,20]", Some("count"));
    assert_eq!(values(&result), vec![3.0, 2.0]);
}

#[test]
fn test_start_before_data_is_clamped_with_warning() {
    let (result, logs) = with_captured_logs(|| aggregate(five_point_cube(), "x=[-100,40,20]", None));

    assert!(logs.contains("starts before the data"), "logs were: {}", logs);
    assert!(logs.contains("-100"));

    // Grid restarts from the first cell bound at -5
    let x = result.coord("x").unwrap();
    assert_eq!(x.points(), &[5.0, 25.0, 45.0]);
    assert_eq!(values(&result), vec![1.5, 3.5, 5.0]);
    let (low, high) = x.extent().unwrap();
    assert!(low <= 0.0 && high >= 40.0);
}

#[test]
fn test_in_range_grid_logs_no_warning() {
    let (_, logs) = with_captured_logs(|| aggregate(five_point_cube(), "x=[-5,45,10]", None));
    assert!(logs.is_empty(), "unexpected warnings: {}", logs);
}

#[test]
fn test_collapse_removes_dimension() {
    let result = aggregate(five_point_cube(), "x", Some("sum"));

    assert_eq!(result.ndim(), 0);
    assert_eq!(result.data()[IxDyn(&[])], 15.0);
    let x = result.coord("x").unwrap();
    assert_eq!(x.points(), &[20.0]);
    assert!(!x.has_bounds());
}

#[test]
fn test_descending_axis_comes_out_ascending() {
    let lat = global_latitude(true);
    let points = lat.points().to_vec();
    let result = aggregate(create_1d_cube(lat, &points), "y=[-90,90,60]", None);

    let y = result.coord("latitude").unwrap();
    assert_eq!(y.points(), &[-60.0, 0.0, 60.0]);
    let means = values(&result);
    assert_approx_eq!(means[0], -60.0, 1e-9);
    assert_approx_eq!(means[1], 0.0, 1e-9);
    assert_approx_eq!(means[2], 60.0, 1e-9);
}

#[test]
fn test_circular_axis_keeps_every_cell() {
    let lon = global_longitude();
    let points = lon.points().to_vec();
    let result = aggregate(create_1d_cube(lon, &points), "x=[0,360,90]", None);

    let x = result.coord("longitude").unwrap();
    assert_eq!(x.points(), &[45.0, 135.0, 225.0, 315.0]);
    assert_eq!(values(&result), vec![45.0, 135.0, 225.0, 315.0]);
}

#[test]
fn test_two_axes_and_single_cell_bounds() {
    let cube = create_indexed_cube(vec![global_latitude(false), global_longitude()]);
    let (result, logs) = with_captured_logs(|| aggregate(cube, "x=[0,360,180],y=[-90,90,180]", None));

    assert_eq!(result.shape(), &[1, 2]);
    let y = result.coord("latitude").unwrap();
    assert_eq!(y.points(), &[0.0]);
    assert!(!y.has_bounds());
    assert!(logs.contains("bounds will be missing"));

    let x = result.coord("longitude").unwrap();
    assert_eq!(x.points(), &[90.0, 270.0]);
    assert!(x.has_bounds());

    // Mean row index 8.5, mean column 8.5 and 26.5
    assert_approx_eq!(result.data()[IxDyn(&[0, 0])], 93.5, 1e-9);
    assert_approx_eq!(result.data()[IxDyn(&[0, 1])], 111.5, 1e-9);
}

#[test]
fn test_unmatched_axis_passes_through() {
    let cube = create_indexed_cube(vec![global_latitude(false), global_longitude()]);
    let result = aggregate(cube, "x=[0,360,180]", None);

    assert_eq!(result.shape(), &[18, 2]);
    assert_eq!(result.coord("latitude").unwrap(), &global_latitude(false));
    assert!(result.aux_coords().is_empty());
}

#[test]
fn test_monthly_means_of_daily_data() {
    // 1 January to 31 March 2008, each value the day number
    let cube = create_daily_cube(13879, 91);
    let result = aggregate(cube, "t=[2008-01,2008-03,P1M]", None);

    let t = result.coord("time").unwrap();
    assert!(t.is_time());
    // Midday on the 14th of each month
    assert_eq!(t.points(), &[13892.5, 13923.5, 13952.5]);
    assert_eq!(t.bounds().unwrap()[1], [13908.0, 13938.0]);

    // Days are grouped by the nearest month centre
    assert_eq!(values(&result), vec![13893.0, 13922.5, 13953.5]);
}

#[test]
fn test_time_collapse() {
    let cube = create_daily_cube(0, 10);
    let result = aggregate(cube, "t", Some("mean"));
    assert_eq!(result.ndim(), 0);
    assert_eq!(result.data()[IxDyn(&[])], 4.5);
    assert_eq!(result.coord("time").unwrap().points(), &[5.0]);
}

#[test]
fn test_missing_values_are_ignored() {
    let cube = create_1d_cube(five_point_axis(), &[1.0, f64::NAN, 3.0, f64::NAN, f64::NAN]);
    let result = aggregate(cube, "x=[0,40,20]", None);
    let means = values(&result);
    assert_eq!(means[0], 2.0);
    assert!(means[1].is_nan());
}

#[test]
fn test_unknown_kernel_is_an_error() {
    let grid = parse_grid_arg("x=[0,40,20]").unwrap();
    let err = Aggregator::new(grid)
        .aggregate(five_point_cube().into(), Some("mode"))
        .unwrap_err();
    assert!(matches!(err, AggregationError::UnknownKernel { .. }));
}

#[test]
fn test_ungridded_data_is_rejected() {
    let grid = parse_grid_arg("x=[0,40,20]").unwrap();
    let points = UngriddedData::new("aod", vec![0.1, 0.2], vec![Coord::new("lat", vec![0.0, 1.0])]);
    let err = Aggregator::new(grid)
        .aggregate(Dataset::Ungridded(points), None)
        .unwrap_err();
    assert!(matches!(err, AggregationError::UngriddedNotSupported));
    assert_eq!(err.to_string(), "Only gridded data is currently supported");
}

#[test]
fn test_range_without_points_is_an_error() {
    let grid = parse_grid_arg("x=[12,18,2]").unwrap();
    let err = Aggregator::new(grid)
        .aggregate(five_point_cube().into(), None)
        .unwrap_err();
    assert!(matches!(err, AggregationError::EmptyRange { .. }));
}
