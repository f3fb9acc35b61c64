//! Ordinary least squares estimation
//!
//! [`OlsEstimator`] is the purely numerical step: design matrix in,
//! [`RegressionResult`] out.

use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, FisherSnedecor, StudentsT};
use std::f64::consts::PI;

use regula_core::data::DesignMatrix;

use crate::base::{ModelError, ModelStatistics, Result};
use crate::lm::diagnostics::Diagnostics;
use crate::lm::qr::LeastSquaresQr;
use crate::lm::result::{Inference, RegressionResult};
use crate::lm::Vector;

/// Default relative tolerance for rank detection
pub const DEFAULT_TOLERANCE: f64 = 1e-10;

/// OLS estimator configuration
///
/// A design column whose component orthogonal to the preceding columns is
/// no larger than `tolerance` times its norm is treated as linearly
/// dependent and rejected.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OlsEstimator {
    /// Relative rank tolerance
    pub tolerance: f64,
}

impl Default for OlsEstimator {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
        }
    }
}

impl OlsEstimator {
    /// Estimator with the default tolerance
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the relative rank tolerance
    pub const fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Fit the design matrix by least squares and derive all inference
    pub fn estimate(&self, design: &DesignMatrix) -> Result<RegressionResult> {
        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err(ModelError::invalid_config(format!(
                "rank tolerance must be a finite non-negative number, got {}",
                self.tolerance
            )));
        }

        let n = design.nobs();
        let k = design.ncols();
        if design.df_resid() <= 0 {
            return Err(ModelError::InsufficientData {
                n_samples: n,
                n_predictors: k,
            });
        }

        let x = design.predictors();
        let y = design.response();
        if x.iter().chain(y.iter()).any(|v| !v.is_finite()) {
            return Err(ModelError::numerical(
                "design matrix contains non-finite values",
                "estimate",
            ));
        }

        let _span = tracing::debug_span!(
            "ols.fit",
            response = design.response_name(),
            nobs = n,
            columns = k
        )
        .entered();

        let qr = LeastSquaresQr::factor(x, self.tolerance).map_err(|deficiency| {
            ModelError::SingularMatrix {
                column: design
                    .column_names()
                    .get(deficiency.column)
                    .cloned()
                    .unwrap_or_else(|| format!("column {}", deficiency.column)),
            }
        })?;

        let params = qr.solve(y);
        let fitted_values = x.dot(&params);
        let residuals = y - &fitted_values;

        let df_model = design.df_model();
        let df_resid = n - k;
        let statistics = fit_statistics(design, y, &residuals, df_model, df_resid);

        let cov_params = qr.xtx_inverse() * statistics.mse_resid;
        let bse = cov_params.diag().mapv(f64::sqrt);
        let tvalues = &params / &bse;
        let pvalues = t_test_p_values(&tvalues, df_resid)?;
        let (f_statistic, f_p_value) = f_test(statistics.mse_model, statistics.mse_resid, df_model, df_resid)?;

        let statistics = ModelStatistics {
            f_statistic,
            f_p_value,
            ..statistics
        };
        let residual_statistics = Diagnostics::run_all(&residuals)?;

        tracing::debug!(
            r_squared = statistics.r_squared,
            f_statistic = statistics.f_statistic,
            df_resid,
            "ols fit complete"
        );

        Ok(RegressionResult::new(
            design,
            Inference {
                params,
                bse,
                tvalues,
                pvalues,
                cov_params,
            },
            fitted_values,
            residuals,
            statistics,
            residual_statistics,
        ))
    }
}

/// Sums of squares, mean squares, R² and likelihood criteria
///
/// The F-test fields are left NaN and filled in by the caller.
fn fit_statistics(
    design: &DesignMatrix,
    y: &Vector,
    residuals: &Vector,
    df_model: usize,
    df_resid: usize,
) -> ModelStatistics {
    let n = y.len() as f64;
    let k = design.ncols() as f64;
    let df_model_f = df_model as f64;
    let df_resid_f = df_resid as f64;

    let tss = if design.has_intercept() {
        let mean = y.mean().unwrap_or(0.0);
        y.iter().map(|&v| (v - mean).powi(2)).sum()
    } else {
        y.dot(y)
    };
    let rss = residuals.dot(residuals);
    let ess = tss - rss;

    let r_squared = 1.0 - rss / tss;
    let adj_r_squared = 1.0 - (n - 1.0) / df_resid_f * (1.0 - r_squared);

    let mse_resid = rss / df_resid_f;
    let mse_model = if df_model == 0 {
        f64::NAN
    } else {
        ess / df_model_f
    };

    let log_likelihood = -n / 2.0 * (2.0 * PI).ln() - n / 2.0 * (rss / n).ln() - n / 2.0;

    ModelStatistics {
        r_squared,
        adj_r_squared,
        f_statistic: f64::NAN,
        f_p_value: f64::NAN,
        rss,
        ess,
        tss,
        mse_model,
        mse_resid,
        mse_total: tss / (df_model_f + df_resid_f),
        residual_std_error: mse_resid.sqrt(),
        log_likelihood,
        aic: -2.0 * log_likelihood + 2.0 * k,
        bic: -2.0 * log_likelihood + n.ln() * k,
    }
}

/// Two-sided p-values from the Student-t distribution
fn t_test_p_values(tvalues: &Vector, df_resid: usize) -> Result<Vector> {
    let dist = StudentsT::new(0.0, 1.0, df_resid as f64)
        .map_err(|e| ModelError::numerical(e.to_string(), "t_test"))?;

    Ok(tvalues.mapv(|t| {
        if t.is_nan() {
            f64::NAN
        } else {
            2.0 * dist.sf(t.abs())
        }
    }))
}

/// Joint F-test of all non-intercept coefficients, NaN without regressors
fn f_test(mse_model: f64, mse_resid: f64, df_model: usize, df_resid: usize) -> Result<(f64, f64)> {
    if df_model == 0 {
        return Ok((f64::NAN, f64::NAN));
    }

    let f_statistic = mse_model / mse_resid;
    if f_statistic.is_nan() {
        return Ok((f64::NAN, f64::NAN));
    }

    let dist = FisherSnedecor::new(df_model as f64, df_resid as f64)
        .map_err(|e| ModelError::numerical(e.to_string(), "f_test"))?;
    Ok((f_statistic, dist.sf(f_statistic)))
}
