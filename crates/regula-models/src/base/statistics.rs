//! Statistical structures for model results

use serde::{Deserialize, Serialize};

/// Goodness-of-fit statistics of an OLS fit
///
/// Statistics that are undefined for a particular fit (e.g. the F-test of a
/// model with no regressors besides the intercept) are NaN.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelStatistics {
    /// R-squared
    pub r_squared: f64,
    /// Adjusted R-squared
    pub adj_r_squared: f64,
    /// F-statistic of the joint test on all non-intercept coefficients
    pub f_statistic: f64,
    /// F-statistic p-value
    pub f_p_value: f64,
    /// Residual sum of squares
    pub rss: f64,
    /// Explained sum of squares
    pub ess: f64,
    /// Total sum of squares, centred when the model has an intercept
    pub tss: f64,
    /// Mean squared error of the model, ess / df_model
    pub mse_model: f64,
    /// Mean squared error of the residuals, rss / df_resid
    pub mse_resid: f64,
    /// Total mean squared error, tss / (df_model + df_resid)
    pub mse_total: f64,
    /// Residual standard error
    pub residual_std_error: f64,
    /// Gaussian log-likelihood
    pub log_likelihood: f64,
    /// Akaike information criterion
    pub aic: f64,
    /// Bayesian information criterion
    pub bic: f64,
}

/// Distribution of the residuals
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResidualStatistics {
    /// Minimum residual
    pub min: f64,
    /// First quartile
    pub q1: f64,
    /// Median
    pub median: f64,
    /// Third quartile
    pub q3: f64,
    /// Maximum residual
    pub max: f64,
    /// Skewness
    pub skewness: f64,
    /// Kurtosis (3.0 for a normal distribution)
    pub kurtosis: f64,
    /// Durbin-Watson statistic
    pub durbin_watson: f64,
    /// Jarque-Bera statistic
    pub jarque_bera: f64,
    /// Jarque-Bera p-value
    pub jarque_bera_p_value: f64,
}
