//! Linear regression result structure
//!
//! A [`RegressionResult`] is the immutable snapshot produced by a fit. Every
//! statistic is derived once by the estimator; accessors only read.

use indexmap::IndexMap;
use statrs::distribution::{ContinuousCDF, StudentsT};
use std::fmt;

use regula_core::data::{DataError, DesignMatrix, Record};
use regula_core::formula::Formula;

use crate::base::summary::{self, SummaryOptions};
use crate::base::{Coefficient, ModelError, ModelStatistics, ResidualStatistics, Result};
use crate::lm::{Matrix, Vector};

/// Per-coefficient inference, aligned with the design columns
#[derive(Debug, Clone)]
pub(crate) struct Inference {
    pub(crate) params: Vector,
    pub(crate) bse: Vector,
    pub(crate) tvalues: Vector,
    pub(crate) pvalues: Vector,
    pub(crate) cov_params: Matrix,
}

/// OLS linear regression result
#[derive(Debug, Clone, PartialEq)]
pub struct RegressionResult {
    response_name: String,
    column_names: Vec<String>,
    has_intercept: bool,
    nobs: usize,
    df_model: usize,
    df_resid: usize,
    params: Vector,
    bse: Vector,
    tvalues: Vector,
    pvalues: Vector,
    cov_params: Matrix,
    fitted_values: Vector,
    residuals: Vector,
    statistics: ModelStatistics,
    residual_statistics: ResidualStatistics,
    formula: Option<Formula>,
}

impl RegressionResult {
    pub(crate) fn new(
        design: &DesignMatrix,
        inference: Inference,
        fitted_values: Vector,
        residuals: Vector,
        statistics: ModelStatistics,
        residual_statistics: ResidualStatistics,
    ) -> Self {
        Self {
            response_name: design.response_name().to_string(),
            column_names: design.column_names().to_vec(),
            has_intercept: design.has_intercept(),
            nobs: design.nobs(),
            df_model: design.df_model(),
            df_resid: design.nobs() - design.ncols(),
            params: inference.params,
            bse: inference.bse,
            tvalues: inference.tvalues,
            pvalues: inference.pvalues,
            cov_params: inference.cov_params,
            fitted_values,
            residuals,
            statistics,
            residual_statistics,
            formula: None,
        }
    }

    /// Attach the formula the design was built from, enabling [`Self::predict`]
    pub(crate) fn with_formula(mut self, formula: Formula) -> Self {
        self.formula = Some(formula);
        self
    }

    // ==================== Model Metadata ====================

    /// Name of the response variable
    pub fn response_name(&self) -> &str {
        &self.response_name
    }

    /// Design column names, intercept first when present
    pub fn column_names(&self) -> &[String] {
        &self.column_names
    }

    /// Whether the model has an intercept
    pub const fn has_intercept(&self) -> bool {
        self.has_intercept
    }

    /// Formula the model was fitted from, if any
    pub const fn formula(&self) -> Option<&Formula> {
        self.formula.as_ref()
    }

    /// Number of observations
    pub const fn nobs(&self) -> usize {
        self.nobs
    }

    /// Model degrees of freedom (regressors excluding the intercept)
    pub const fn df_model(&self) -> usize {
        self.df_model
    }

    /// Residual degrees of freedom
    pub const fn df_resid(&self) -> usize {
        self.df_resid
    }

    // ==================== Coefficients ====================

    /// Coefficient estimates, aligned with [`Self::column_names`]
    pub const fn coefficients(&self) -> &Vector {
        &self.params
    }

    /// Standard errors of the coefficients
    pub const fn standard_errors(&self) -> &Vector {
        &self.bse
    }

    /// t-statistics of the coefficients
    pub const fn t_statistics(&self) -> &Vector {
        &self.tvalues
    }

    /// Two-sided p-values of the coefficients
    pub const fn p_values(&self) -> &Vector {
        &self.pvalues
    }

    /// Coefficient estimates keyed by column name
    pub fn params(&self) -> IndexMap<String, f64> {
        self.column_names
            .iter()
            .cloned()
            .zip(self.params.iter().copied())
            .collect()
    }

    /// Covariance matrix of the estimates, `sigma^2 (X'X)^-1`
    pub const fn cov_params(&self) -> &Matrix {
        &self.cov_params
    }

    /// Two-sided Student-t critical value at `df_resid` for level `alpha`
    pub fn critical_value(&self, alpha: f64) -> Result<f64> {
        if !(alpha > 0.0 && alpha < 1.0) {
            return Err(ModelError::invalid_config(format!(
                "significance level must lie strictly between 0 and 1, got {alpha}"
            )));
        }

        let dist = StudentsT::new(0.0, 1.0, self.df_resid as f64)
            .map_err(|e| ModelError::numerical(e.to_string(), "critical_value"))?;
        Ok(dist.inverse_cdf(1.0 - alpha / 2.0))
    }

    /// Confidence intervals at level `1 - alpha`, one `[lower, upper]` row per coefficient
    pub fn conf_int(&self, alpha: f64) -> Result<Matrix> {
        let t = self.critical_value(alpha)?;
        let mut intervals = Matrix::zeros((self.params.len(), 2));
        for (i, (&coef, &se)) in self.params.iter().zip(self.bse.iter()).enumerate() {
            intervals[(i, 0)] = coef - t * se;
            intervals[(i, 1)] = coef + t * se;
        }
        Ok(intervals)
    }

    /// Full coefficient table with confidence intervals at level `1 - alpha`
    pub fn coefficient_table(&self, alpha: f64) -> Result<Vec<Coefficient>> {
        let intervals = self.conf_int(alpha)?;

        Ok((0..self.params.len())
            .map(|i| {
                let coefficient = Coefficient::new(self.column_names[i].clone(), self.params[i])
                    .with_std_error(self.bse[i])
                    .with_t_stat(self.tvalues[i])
                    .with_p_value(self.pvalues[i])
                    .with_ci(intervals[(i, 0)], intervals[(i, 1)]);

                if self.has_intercept && i == 0 {
                    coefficient.as_intercept()
                } else {
                    coefficient
                }
            })
            .collect())
    }

    /// Coefficient row for one column, 95% interval
    pub fn coefficient(&self, name: &str) -> Option<Coefficient> {
        let index = self.column_names.iter().position(|c| c == name)?;
        self.coefficient_table(0.05).ok()?.into_iter().nth(index)
    }

    // ==================== Fit Statistics ====================

    /// All goodness-of-fit statistics
    pub const fn statistics(&self) -> &ModelStatistics {
        &self.statistics
    }

    /// Residual distribution diagnostics
    pub const fn residual_statistics(&self) -> &ResidualStatistics {
        &self.residual_statistics
    }

    /// R-squared
    pub const fn r_squared(&self) -> f64 {
        self.statistics.r_squared
    }

    /// Adjusted R-squared
    pub const fn r_squared_adj(&self) -> f64 {
        self.statistics.adj_r_squared
    }

    /// F-statistic, NaN when the model has no regressors
    pub const fn f_statistic(&self) -> f64 {
        self.statistics.f_statistic
    }

    /// p-value of the F-statistic
    pub const fn f_p_value(&self) -> f64 {
        self.statistics.f_p_value
    }

    /// Residual sum of squares
    pub const fn residual_sum_of_squares(&self) -> f64 {
        self.statistics.rss
    }

    /// Explained sum of squares
    pub const fn explained_sum_of_squares(&self) -> f64 {
        self.statistics.ess
    }

    /// Total sum of squares
    pub const fn total_sum_of_squares(&self) -> f64 {
        self.statistics.tss
    }

    /// Mean squared error of the model
    pub const fn model_mean_squared_error(&self) -> f64 {
        self.statistics.mse_model
    }

    /// Mean squared error of the residuals
    pub const fn residual_mean_squared_error(&self) -> f64 {
        self.statistics.mse_resid
    }

    /// Total mean squared error
    pub const fn total_mean_squared_error(&self) -> f64 {
        self.statistics.mse_total
    }

    /// Residual standard error
    pub const fn residual_std_error(&self) -> f64 {
        self.statistics.residual_std_error
    }

    /// Gaussian log-likelihood
    pub const fn log_likelihood(&self) -> f64 {
        self.statistics.log_likelihood
    }

    /// Akaike information criterion
    pub const fn aic(&self) -> f64 {
        self.statistics.aic
    }

    /// Bayesian information criterion
    pub const fn bic(&self) -> f64 {
        self.statistics.bic
    }

    // ==================== Observations ====================

    /// Fitted values, in input row order
    pub const fn fitted_values(&self) -> &Vector {
        &self.fitted_values
    }

    /// Residuals, in input row order
    pub const fn residuals(&self) -> &Vector {
        &self.residuals
    }

    /// Predict the response for new records
    pub fn predict<'a, R, I>(&self, records: I) -> Result<Vector>
    where
        R: Record + 'a,
        I: IntoIterator<Item = &'a R>,
    {
        let formula = self.formula.as_ref().ok_or_else(|| {
            ModelError::invalid_config(
                "result was estimated from raw arrays; use predict_matrix instead",
            )
        })?;

        let x = DesignMatrix::build_predictors(formula, records)?;
        self.predict_matrix(&x)
    }

    /// Predict the response for an already materialised predictor matrix
    pub fn predict_matrix(&self, x: &Matrix) -> Result<Vector> {
        if x.ncols() != self.params.len() {
            return Err(DataError::DimensionMismatch {
                expected: format!("{} predictor columns", self.params.len()),
                actual: format!("{} columns", x.ncols()),
            }
            .into());
        }
        Ok(x.dot(&self.params))
    }

    // ==================== Reporting ====================

    /// Render the text summary
    pub fn summary(&self, options: &SummaryOptions) -> Result<String> {
        summary::render(self, options)
    }
}

impl fmt::Display for RegressionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = self.summary(&SummaryOptions::default()).map_err(|_| fmt::Error)?;
        f.write_str(&text)
    }
}
