//! Observation access and design matrix construction
//!
//! Observations are any type implementing [`Record`]. Field names coming from
//! a formula are resolved to accessors once, then every observation is read
//! into a dense [`DesignMatrix`].

mod design;
mod record;


// Re-exports
pub use design::DesignMatrix;
pub use record::{AsFieldValue, FieldValue, Record};

// Type aliases for common use cases
/// Dense vector of observations
pub type FloatArray = ndarray::Array1<f64>;
/// Dense row-major matrix
pub type Matrix = ndarray::Array2<f64>;

/// Error types specific to data operations
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum DataError {
    /// The record type has no field with this name, or a map row lacks the key
    #[error("formula '{formula}' references field '{field}' which the records do not provide")]
    FieldNotFound {
        /// Formula text
        formula: String,
        /// Field name
        field: String,
    },

    /// The field exists but does not hold a number
    #[error("field '{field}' in row {row} is not numeric (value: {value:?})")]
    NonNumericField {
        /// Field name
        field: String,
        /// Zero-based row index
        row: usize,
        /// Raw value as found
        value: String,
    },

    /// The field holds NaN
    #[error("field '{field}' in row {row} has no value (NaN)")]
    MissingValue {
        /// Field name
        field: String,
        /// Zero-based row index
        row: usize,
    },

    /// Array shapes or names disagree
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected shape
        expected: String,
        /// Shape found
        actual: String,
    },
}

/// Result type for data operations
pub type DataResult<T> = std::result::Result<T, DataError>;
