//! Formula-specific error types
//!
//! Every variant carries the formula text it was raised for, so the message
//! can be surfaced verbatim without access to the parser state.

use thiserror::Error;

/// Errors that can occur while parsing a formula
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormulaError {
    /// No `identifier ~` prefix could be found
    #[error("no response variable found in formula '{formula}' (expected 'response ~ terms')")]
    MissingResponse {
        /// Formula text as supplied
        formula: String,
    },

    /// A character the grammar does not recognise
    #[error("unrecognized character '{character}' at position {position} in formula '{formula}'")]
    UnexpectedCharacter {
        /// Offending character
        character: char,
        /// Character offset into the formula
        position: usize,
        /// Formula text as supplied
        formula: String,
    },

    /// A `-` that is not followed by the literal `1`
    #[error(
        "expected '1' after '-' at position {position} in formula '{formula}' (only the intercept can be removed)"
    )]
    InvalidInterceptRemoval {
        /// Character offset of the `-`
        position: usize,
        /// Formula text as supplied
        formula: String,
    },

    /// The response variable is also listed as a predictor
    #[error("variable '{name}' is used as both response and predictor in formula '{formula}'")]
    ResponseInPredictors {
        /// Variable name
        name: String,
        /// Formula text as supplied
        formula: String,
    },
}

/// Result type alias for formula operations
pub type FormulaResult<T> = std::result::Result<T, FormulaError>;

impl FormulaError {
    /// Create an unexpected character error
    pub fn unexpected(character: char, position: usize, formula: &str) -> Self {
        Self::UnexpectedCharacter {
            character,
            position,
            formula: formula.to_string(),
        }
    }

    /// Name of the variable or character the error points at, if any
    pub fn offending(&self) -> Option<String> {
        match self {
            Self::UnexpectedCharacter { character, .. } => Some(character.to_string()),
            Self::ResponseInPredictors { name, .. } => Some(name.clone()),
            Self::MissingResponse { .. } | Self::InvalidInterceptRemoval { .. } => None,
        }
    }
}
