//! Linear regression by ordinary least squares
//!
//! - [`OlsModel`]: formula and captured data, fitted on demand
//! - [`OlsEstimator`]: the numerical least-squares step
//! - [`RegressionResult`]: immutable fit snapshot
//! - [`diagnostics`]: residual checks computed at fit time

pub mod diagnostics;
pub mod estimator;
pub mod ols;
mod qr;
pub mod result;

#[cfg(test)]
mod tests;

// Re-exports
pub use diagnostics::Diagnostics;
pub use estimator::{DEFAULT_TOLERANCE, OlsEstimator};
pub use ols::OlsModel;
pub use result::RegressionResult;

use ndarray::{Array1, Array2};
use regula_core::data::Record;

use crate::base::Result;

/// Dense vector of `f64`
pub type Vector = Array1<f64>;
/// Dense matrix of `f64`
pub type Matrix = Array2<f64>;

/// Convenience function for OLS regression: parse, build and fit in one call
pub fn ols<'a, R, I>(formula: &str, records: I) -> Result<RegressionResult>
where
    R: Record + 'a,
    I: IntoIterator<Item = &'a R>,
{
    OlsModel::new(formula, records)?.fit()
}
