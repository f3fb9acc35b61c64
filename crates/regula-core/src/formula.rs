//! Formula parsing
//!
//! A formula names the response on the left of `~` and the predictors on the
//! right, e.g. `"Lottery ~ Literacy + LogPopulation"`. Appending `- 1`
//! removes the intercept.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub mod error;
mod parser;


pub use error::{FormulaError, FormulaResult};
pub use parser::FormulaParser;

/// Name given to the constant column of the design matrix
pub const INTERCEPT_NAME: &str = "Intercept";

/// A parsed formula specifying a linear model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Formula {
    /// Response variable (left-hand side)
    pub response: String,

    /// Predictors in order of first appearance, without duplicates
    pub predictors: Vec<String>,

    /// Whether to include an intercept
    pub has_intercept: bool,

    /// Original formula string
    pub original: String,
}

impl Formula {
    /// Parse a formula from a string
    pub fn parse(formula: &str) -> FormulaResult<Self> {
        FormulaParser::parse(formula)
    }

    /// Number of constant columns the formula adds (0 or 1)
    pub const fn k_constant(&self) -> usize {
        if self.has_intercept { 1 } else { 0 }
    }

    /// Names of the design matrix columns, intercept first
    pub fn column_names(&self) -> Vec<String> {
        let mut names = Vec::with_capacity(self.predictors.len() + self.k_constant());
        if self.has_intercept {
            names.push(INTERCEPT_NAME.to_string());
        }
        names.extend(self.predictors.iter().cloned());
        names
    }

    /// All variable names mentioned in the formula, response first
    pub fn variables(&self) -> Vec<&str> {
        std::iter::once(self.response.as_str())
            .chain(self.predictors.iter().map(String::as_str))
            .collect()
    }

    /// Whether two formulas describe the same model, ignoring source text
    pub fn same_model(&self, other: &Self) -> bool {
        self.response == other.response
            && self.predictors == other.predictors
            && self.has_intercept == other.has_intercept
    }
}

impl FromStr for Formula {
    type Err = FormulaError;

    fn from_str(s: &str) -> FormulaResult<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ~", self.response)?;

        for (i, predictor) in self.predictors.iter().enumerate() {
            if i == 0 {
                write!(f, " {}", predictor)?;
            } else {
                write!(f, " + {}", predictor)?;
            }
        }

        if !self.has_intercept {
            write!(f, " - 1")?;
        }

        Ok(())
    }
}
