//! Linear model diagnostics
//!
//! Residual-based checks computed once at fit time: normality (skewness,
//! kurtosis, Jarque-Bera), serial correlation (Durbin-Watson) and the
//! residual five-number summary.

use statrs::distribution::{ChiSquared, ContinuousCDF};

use crate::base::{ModelError, ResidualStatistics, Result};
use crate::lm::Vector;

/// Diagnostic analyzer
#[derive(Debug, Clone, Copy)]
pub struct Diagnostics;

impl Diagnostics {
    /// Durbin-Watson statistic, `sum((e_t - e_{t-1})^2) / sum(e_t^2)`
    ///
    /// Values near 2 indicate no first-order autocorrelation.
    pub fn durbin_watson(residuals: &Vector) -> f64 {
        let sum_sq_diff: f64 = residuals
            .iter()
            .zip(residuals.iter().skip(1))
            .map(|(prev, next)| (next - prev).powi(2))
            .sum();
        let sum_sq = residuals.dot(residuals);

        sum_sq_diff / sum_sq
    }

    /// Sample skewness using population moments
    pub fn skewness(residuals: &Vector) -> f64 {
        let (m2, m3, _) = central_moments(residuals);
        m3 / m2.powf(1.5)
    }

    /// Sample kurtosis using population moments, 3.0 under normality
    pub fn kurtosis(residuals: &Vector) -> f64 {
        let (m2, _, m4) = central_moments(residuals);
        m4 / (m2 * m2)
    }

    /// Jarque-Bera normality test, returning the statistic and its χ²(2) p-value
    pub fn jarque_bera(residuals: &Vector) -> Result<(f64, f64)> {
        let n = residuals.len() as f64;
        let skew = Self::skewness(residuals);
        let kurtosis = Self::kurtosis(residuals);
        let statistic = n / 6.0 * (skew.powi(2) + (kurtosis - 3.0).powi(2) / 4.0);

        let chi2 = ChiSquared::new(2.0)
            .map_err(|e| ModelError::numerical(e.to_string(), "jarque_bera"))?;
        let p_value = if statistic.is_nan() {
            f64::NAN
        } else {
            chi2.sf(statistic)
        };

        Ok((statistic, p_value))
    }

    /// Quantile of an ascending slice by linear interpolation between order statistics
    pub fn quantile(sorted: &[f64], q: f64) -> f64 {
        match sorted.len() {
            0 => f64::NAN,
            1 => sorted[0],
            len => {
                let position = q.clamp(0.0, 1.0) * (len - 1) as f64;
                let lower = position.floor() as usize;
                let upper = (lower + 1).min(len - 1);
                let fraction = position - lower as f64;
                sorted[lower] + fraction * (sorted[upper] - sorted[lower])
            }
        }
    }

    /// Run all residual diagnostics
    pub fn run_all(residuals: &Vector) -> Result<ResidualStatistics> {
        let mut sorted = residuals.to_vec();
        sorted.sort_by(f64::total_cmp);

        let (jarque_bera, jarque_bera_p_value) = Self::jarque_bera(residuals)?;

        Ok(ResidualStatistics {
            min: Self::quantile(&sorted, 0.0),
            q1: Self::quantile(&sorted, 0.25),
            median: Self::quantile(&sorted, 0.5),
            q3: Self::quantile(&sorted, 0.75),
            max: Self::quantile(&sorted, 1.0),
            skewness: Self::skewness(residuals),
            kurtosis: Self::kurtosis(residuals),
            durbin_watson: Self::durbin_watson(residuals),
            jarque_bera,
            jarque_bera_p_value,
        })
    }
}

/// Second, third and fourth central moments
fn central_moments(values: &Vector) -> (f64, f64, f64) {
    let mean = values.mean().unwrap_or(0.0);
    let n = values.len() as f64;

    let (m2, m3, m4) = values.iter().fold((0.0, 0.0, 0.0), |(m2, m3, m4), &v| {
        let d = v - mean;
        let d2 = d * d;
        (m2 + d2, m3 + d2 * d, m4 + d2 * d2)
    });

    (m2 / n, m3 / n, m4 / n)
}
