//! Formula parser for `response ~ terms` formulas
//!
//! The grammar is deliberately small:
//!
//! ```text
//! formula      := response '~' term (('+' term) | no-intercept)*
//! response     := identifier
//! term         := identifier
//! no-intercept := '-' whitespace* ('1' | '1.0' | '1.')
//! ```
//!
//! Identifiers are runs of alphanumeric characters. Whitespace is ignored
//! between tokens. Repeated predictors keep their first position.

use indexmap::IndexSet;
use std::iter::Peekable;
use std::str::Chars;

use crate::formula::Formula;
use crate::formula::error::{FormulaError, FormulaResult};

/// Formula parser
///
/// A single-pass state machine: the response is read first, then the
/// right-hand side is scanned while predictors and the intercept flag
/// accumulate.
#[derive(Debug)]
pub struct FormulaParser<'a> {
    chars: Peekable<Chars<'a>>,
    original: &'a str,
    position: usize,
    predictors: IndexSet<String>,
    has_intercept: bool,
}

impl<'a> FormulaParser<'a> {
    /// Create a new parser
    pub fn new(input: &'a str) -> Self {
        Self {
            chars: input.chars().peekable(),
            original: input,
            position: 0,
            predictors: IndexSet::new(),
            has_intercept: true,
        }
    }

    /// Parse a formula
    pub fn parse(formula: &str) -> FormulaResult<Formula> {
        FormulaParser::new(formula).parse_formula()
    }

    /// Parse the entire formula
    fn parse_formula(mut self) -> FormulaResult<Formula> {
        let response = self.parse_response()?;
        self.parse_rhs(&response)?;

        tracing::trace!(
            formula = self.original,
            response = %response,
            predictors = self.predictors.len(),
            has_intercept = self.has_intercept,
            "parsed formula"
        );

        Ok(Formula {
            response,
            predictors: self.predictors.into_iter().collect(),
            has_intercept: self.has_intercept,
            original: self.original.to_string(),
        })
    }

    /// Parse the response variable and the `~` that follows it
    fn parse_response(&mut self) -> FormulaResult<String> {
        self.skip_whitespace();

        let response = match self.peek_char() {
            Some(c) if c.is_alphanumeric() => self.parse_identifier(),
            _ => return Err(self.missing_response()),
        };

        self.skip_whitespace();
        match self.next_char() {
            Some('~') => Ok(response),
            _ => Err(self.missing_response()),
        }
    }

    /// Scan the right-hand side until the input is exhausted
    fn parse_rhs(&mut self, response: &str) -> FormulaResult<()> {
        loop {
            self.skip_whitespace();

            match self.peek_char() {
                None => return Ok(()),
                Some('+') => {
                    self.next_char();
                }
                Some('-') => self.parse_intercept_removal()?,
                Some(c) if c.is_alphanumeric() => {
                    let name = self.parse_identifier();
                    if name == response {
                        return Err(FormulaError::ResponseInPredictors {
                            name,
                            formula: self.original.to_string(),
                        });
                    }
                    self.predictors.insert(name);
                }
                Some(c) => {
                    return Err(FormulaError::unexpected(c, self.position, self.original));
                }
            }
        }
    }

    /// Parse `- 1`, `- 1.` or `- 1.0`
    fn parse_intercept_removal(&mut self) -> FormulaResult<()> {
        let start = self.position;
        self.next_char(); // Skip '-'
        self.skip_whitespace();

        if self.peek_char() != Some('1') {
            return Err(FormulaError::InvalidInterceptRemoval {
                position: start,
                formula: self.original.to_string(),
            });
        }
        self.next_char();

        if self.peek_char() == Some('.') {
            self.next_char();
            if self.peek_char() == Some('0') {
                self.next_char();
            }
        }

        self.has_intercept = false;
        Ok(())
    }

    /// Parse a run of alphanumeric characters
    fn parse_identifier(&mut self) -> String {
        let mut ident = String::new();

        while let Some(c) = self.peek_char() {
            if c.is_alphanumeric() {
                ident.push(c);
                self.next_char();
            } else {
                break;
            }
        }

        ident
    }

    fn missing_response(&self) -> FormulaError {
        FormulaError::MissingResponse {
            formula: self.original.to_string(),
        }
    }

    /// Skip whitespace
    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek_char() {
            if c.is_whitespace() {
                self.next_char();
            } else {
                break;
            }
        }
    }

    /// Peek at next character
    fn peek_char(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    /// Consume the next character, tracking the position
    fn next_char(&mut self) -> Option<char> {
        let c = self.chars.next();
        if c.is_some() {
            self.position += 1;
        }
        c
    }
}
