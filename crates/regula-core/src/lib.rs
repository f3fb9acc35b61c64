//! Core building blocks for regula
//!
//! - [`formula`]: parsing of `response ~ predictors` formulas
//! - [`data`]: the [`Record`](data::Record) capability and design matrices

pub mod data;
pub mod formula;

pub use data::{DataError, DesignMatrix, Record};
pub use formula::{Formula, FormulaError};
