//! Formula-bound OLS model
//!
//! An [`OlsModel`] parses its formula and materialises the design matrix when
//! it is constructed; fitting afterwards only reads that captured state.

use regula_core::data::{DataError, DesignMatrix, Record};
use regula_core::formula::Formula;

use crate::base::Result;
use crate::lm::{OlsEstimator, RegressionResult};

/// Ordinary least squares model bound to a formula and a dataset
#[derive(Debug, Clone)]
pub struct OlsModel {
    formula_text: String,
    formula: Formula,
    design: DesignMatrix,
    estimator: OlsEstimator,
}

impl OlsModel {
    /// Parse `formula` and capture `records` into a design matrix
    pub fn new<'a, R, I>(formula: &str, records: I) -> Result<Self>
    where
        R: Record + 'a,
        I: IntoIterator<Item = &'a R>,
    {
        let parsed = Formula::parse(formula)?;
        let design = DesignMatrix::build(&parsed, records)?;

        Ok(Self {
            formula_text: formula.to_string(),
            formula: parsed,
            design,
            estimator: OlsEstimator::default(),
        })
    }

    /// Bind an already parsed formula to a design matrix built from it
    pub fn from_design(formula: Formula, design: DesignMatrix) -> Result<Self> {
        let expected = formula.column_names();
        if design.column_names() != expected.as_slice()
            || design.response_name() != formula.response
        {
            return Err(DataError::DimensionMismatch {
                expected: format!("{} ~ [{}]", formula.response, expected.join(", ")),
                actual: format!(
                    "{} ~ [{}]",
                    design.response_name(),
                    design.column_names().join(", ")
                ),
            }
            .into());
        }

        Ok(Self {
            formula_text: formula.original.clone(),
            formula,
            design,
            estimator: OlsEstimator::default(),
        })
    }

    /// Use a custom estimator configuration
    pub const fn with_estimator(mut self, estimator: OlsEstimator) -> Self {
        self.estimator = estimator;
        self
    }

    /// Formula text as supplied
    pub fn formula_text(&self) -> &str {
        &self.formula_text
    }

    /// Parsed formula
    pub const fn formula(&self) -> &Formula {
        &self.formula
    }

    /// Captured design matrix
    pub const fn design(&self) -> &DesignMatrix {
        &self.design
    }

    /// Estimator configuration
    pub const fn estimator(&self) -> &OlsEstimator {
        &self.estimator
    }

    /// Name of the endogenous (response) variable
    pub fn endog_name(&self) -> &str {
        self.design.response_name()
    }

    /// Names of the exogenous design columns, intercept first when present
    pub fn exog_names(&self) -> &[String] {
        self.design.column_names()
    }

    /// Number of observations
    pub fn nobs(&self) -> usize {
        self.design.nobs()
    }

    /// Number of constant columns (0 or 1)
    pub const fn k_constant(&self) -> usize {
        self.design.k_constant()
    }

    /// Model degrees of freedom
    pub fn df_model(&self) -> usize {
        self.design.df_model()
    }

    /// Residual degrees of freedom, non-positive when the model cannot be fitted
    pub fn df_resid(&self) -> isize {
        self.design.df_resid()
    }

    /// Fit the model
    ///
    /// Pure function of the captured data: repeated calls return equal results.
    pub fn fit(&self) -> Result<RegressionResult> {
        tracing::debug!(formula = %self.formula, nobs = self.nobs(), "fitting OLS model");

        self.estimator
            .estimate(&self.design)
            .map(|result| result.with_formula(self.formula.clone()))
    }
}
