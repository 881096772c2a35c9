//! Named aggregation kernels.
//!
//! Kernels only ever see the non-missing values of a group. A group with no
//! values reduces to NaN, except for `count` which reduces to zero.

use std::collections::BTreeMap;
use std::sync::Arc;

use gridded_data::Reducer;

use crate::error::{AggregationError, Result};

/// Kernel used when none is requested.
pub const DEFAULT_KERNEL: &str = "mean";

#[derive(Debug, Clone, Copy, Default)]
pub struct Mean;

impl Reducer for Mean {
    fn name(&self) -> &str {
        "mean"
    }

    fn reduce(&self, values: &[f64]) -> f64 {
        if values.is_empty() {
            return f64::NAN;
        }
        values.iter().sum::<f64>() / values.len() as f64
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Sum;

impl Reducer for Sum {
    fn name(&self) -> &str {
        "sum"
    }

    fn reduce(&self, values: &[f64]) -> f64 {
        if values.is_empty() {
            return f64::NAN;
        }
        values.iter().sum()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Min;

impl Reducer for Min {
    fn name(&self) -> &str {
        "min"
    }

    fn reduce(&self, values: &[f64]) -> f64 {
        values.iter().copied().reduce(f64::min).unwrap_or(f64::NAN)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Max;

impl Reducer for Max {
    fn name(&self) -> &str {
        "max"
    }

    fn reduce(&self, values: &[f64]) -> f64 {
        values.iter().copied().reduce(f64::max).unwrap_or(f64::NAN)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Median;

impl Reducer for Median {
    fn name(&self) -> &str {
        "median"
    }

    fn reduce(&self, values: &[f64]) -> f64 {
        if values.is_empty() {
            return f64::NAN;
        }
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);
        let mid = sorted.len() / 2;
        if sorted.len() % 2 == 0 {
            (sorted[mid - 1] + sorted[mid]) / 2.0
        } else {
            sorted[mid]
        }
    }
}

/// Sample standard deviation. Fewer than two values give NaN.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdDev;

impl Reducer for StdDev {
    fn name(&self) -> &str {
        "stddev"
    }

    fn reduce(&self, values: &[f64]) -> f64 {
        if values.len() < 2 {
            return f64::NAN;
        }
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let sum_sq: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
        (sum_sq / (n - 1.0)).sqrt()
    }
}

/// Number of non-missing values.
#[derive(Debug, Clone, Copy, Default)]
pub struct Count;

impl Reducer for Count {
    fn name(&self) -> &str {
        "count"
    }

    fn reduce(&self, values: &[f64]) -> f64 {
        values.len() as f64
    }
}

/// Kernels available by name.
///
/// Built once and never modified afterwards.
#[derive(Debug, Clone)]
pub struct KernelRegistry {
    kernels: BTreeMap<String, Arc<dyn Reducer>>,
}

impl KernelRegistry {
    /// Registry with the standard kernels.
    pub fn standard() -> Self {
        let kernels: [Arc<dyn Reducer>; 7] = [
            Arc::new(Mean),
            Arc::new(Sum),
            Arc::new(Min),
            Arc::new(Max),
            Arc::new(Median),
            Arc::new(StdDev),
            Arc::new(Count),
        ];
        Self::from_kernels(kernels)
    }

    /// Registry with exactly the given kernels, keyed by their names.
    pub fn from_kernels(kernels: impl IntoIterator<Item = Arc<dyn Reducer>>) -> Self {
        let kernels = kernels
            .into_iter()
            .map(|k| (k.name().to_string(), k))
            .collect();
        Self { kernels }
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Reducer>> {
        self.kernels.get(name).cloned()
    }

    /// Look up a kernel. `None` selects the default; an unknown name is an error.
    pub fn resolve(&self, name: Option<&str>) -> Result<Arc<dyn Reducer>> {
        let name = name.unwrap_or(DEFAULT_KERNEL);
        self.get(name).ok_or_else(|| AggregationError::UnknownKernel {
            name: name.to_string(),
            available: self.names().join(", "),
        })
    }

    pub fn names(&self) -> Vec<&str> {
        self.kernels.keys().map(String::as_str).collect()
    }
}

impl Default for KernelRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::assert_approx_eq;

    const VALUES: [f64; 5] = [4.0, 1.0, 3.0, 2.0, 5.0];

    #[test]
    fn test_basic_kernels() {
        assert_eq!(Mean.reduce(&VALUES), 3.0);
        assert_eq!(Sum.reduce(&VALUES), 15.0);
        assert_eq!(Min.reduce(&VALUES), 1.0);
        assert_eq!(Max.reduce(&VALUES), 5.0);
        assert_eq!(Median.reduce(&VALUES), 3.0);
        assert_eq!(Median.reduce(&[1.0, 4.0, 2.0, 3.0]), 2.5);
        assert_eq!(Count.reduce(&VALUES), 5.0);
    }

    #[test]
    fn test_stddev_is_sample() {
        // Sum of squared deviations 10 over n - 1 = 4
        assert_approx_eq!(StdDev.reduce(&VALUES), 2.5f64.sqrt(), 1e-12);
        assert!(StdDev.reduce(&[1.0]).is_nan());
    }

    #[test]
    fn test_empty_groups() {
        assert!(Mean.reduce(&[]).is_nan());
        assert!(Sum.reduce(&[]).is_nan());
        assert!(Min.reduce(&[]).is_nan());
        assert!(Max.reduce(&[]).is_nan());
        assert!(Median.reduce(&[]).is_nan());
        assert_eq!(Count.reduce(&[]), 0.0);
    }

    #[test]
    fn test_registry_default_is_mean() {
        let registry = KernelRegistry::standard();
        assert_eq!(registry.resolve(None).unwrap().name(), "mean");
        assert_eq!(registry.resolve(Some("max")).unwrap().name(), "max");
    }

    #[test]
    fn test_registry_unknown_kernel() {
        let registry = KernelRegistry::standard();
        match registry.resolve(Some("mode")) {
            Err(AggregationError::UnknownKernel { name, available }) => {
                assert_eq!(name, "mode");
                assert!(available.contains("mean"));
                assert!(available.contains("stddev"));
            }
            other => panic!("unexpected result {:?}", other.map(|k| k.name().to_string())),
        }
    }

    #[test]
    fn test_registry_names_sorted() {
        let registry = KernelRegistry::standard();
        assert_eq!(
            registry.names(),
            vec!["count", "max", "mean", "median", "min", "stddev", "sum"]
        );
    }
}
