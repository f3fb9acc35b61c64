//! Ordinary least squares estimation for regula
//!
//! [`lm::OlsModel`] binds a formula to a set of records and fits it into an
//! immutable [`lm::RegressionResult`], which renders the text summary through
//! [`base::summary`].
//!
//! ```
//! use std::collections::HashMap;
//! use regula_models::lm;
//!
//! let rows: Vec<HashMap<String, f64>> = [(1.0, 3.1), (2.0, 4.9), (3.0, 7.2), (4.0, 8.8)]
//!     .into_iter()
//!     .map(|(x, y)| HashMap::from([("x".to_string(), x), ("y".to_string(), y)]))
//!     .collect();
//!
//! let result = lm::ols("y ~ x", &rows).unwrap();
//! assert!(result.r_squared() > 0.99);
//! ```

pub mod base;
pub mod error;
pub mod lm;

pub use base::summary::SummaryOptions;
pub use error::ModelError;
pub use lm::{OlsEstimator, OlsModel, RegressionResult};
