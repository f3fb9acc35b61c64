//! Shared result types for fitted models
//!
//! Coefficient rows, fit statistics and the text summary renderer.

pub use coefficient::Coefficient;
pub use statistics::{ModelStatistics, ResidualStatistics};
pub use summary::SummaryOptions;

pub use crate::error::ModelError;

pub mod coefficient;
pub mod statistics;
pub mod summary;

/// Result type for model operations
pub type Result<T> = std::result::Result<T, ModelError>;
