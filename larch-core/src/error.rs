// larch-core - Error types for the Larch evaluator
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Error types for Larch evaluation.
//!
//! These report failures of the evaluator itself. Object-model operations
//! do not use them for malformed input; they record a diagnostic and return
//! `nil` or an error value instead (see [`crate::registry`]).

use std::fmt;

use larch_parser::{ParseError, Symbol};
use thiserror::Error;

/// Result type for Larch evaluation.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during evaluation.
#[derive(Debug, Clone, Error)]
pub enum Error {
    #[error("Unable to resolve symbol: {0}")]
    UndefinedSymbol(Symbol),

    #[error(
        "Wrong number of arguments{}: expected {expected}, got {got}",
        .name.as_ref().map(|n| format!(" to '{}'", n)).unwrap_or_default()
    )]
    ArityError {
        expected: AritySpec,
        got: usize,
        name: Option<String>,
    },

    #[error(
        "{}: expected {expected}, got {got}",
        .context.as_deref().unwrap_or("Type error")
    )]
    TypeError {
        expected: &'static str,
        got: &'static str,
        context: Option<String>,
    },

    #[error("Cannot call value: {0}")]
    NotCallable(String),

    #[error("Invalid '{form}' syntax: {message}")]
    InvalidSyntax { form: &'static str, message: String },

    #[error("{0}")]
    EvalError(String),

    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Invariant violation inside the runtime
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Specification for expected arity.
#[derive(Debug, Clone)]
pub enum AritySpec {
    Exact(usize),
    AtLeast(usize),
    Range(usize, usize),
}

impl fmt::Display for AritySpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AritySpec::Exact(n) => write!(f, "{}", n),
            AritySpec::AtLeast(n) => write!(f, "at least {}", n),
            AritySpec::Range(min, max) => write!(f, "{} to {}", min, max),
        }
    }
}

impl Error {
    /// Create an arity error for exact arity.
    pub fn arity(expected: usize, got: usize) -> Self {
        Error::ArityError {
            expected: AritySpec::Exact(expected),
            got,
            name: None,
        }
    }

    /// Create an arity error for exact arity with function name.
    pub fn arity_named(name: impl Into<String>, expected: usize, got: usize) -> Self {
        Error::ArityError {
            expected: AritySpec::Exact(expected),
            got,
            name: Some(name.into()),
        }
    }

    pub fn arity_at_least(name: impl Into<String>, expected: usize, got: usize) -> Self {
        Error::ArityError {
            expected: AritySpec::AtLeast(expected),
            got,
            name: Some(name.into()),
        }
    }

    pub fn arity_range(name: impl Into<String>, min: usize, max: usize, got: usize) -> Self {
        Error::ArityError {
            expected: AritySpec::Range(min, max),
            got,
            name: Some(name.into()),
        }
    }

    /// Create a type error.
    pub fn type_error(expected: &'static str, got: &'static str) -> Self {
        Error::TypeError {
            expected,
            got,
            context: None,
        }
    }

    /// Create a type error with context.
    pub fn type_error_in(
        context: impl Into<String>,
        expected: &'static str,
        got: &'static str,
    ) -> Self {
        Error::TypeError {
            expected,
            got,
            context: Some(context.into()),
        }
    }

    /// Create an invalid syntax error.
    pub fn syntax(form: &'static str, message: impl Into<String>) -> Self {
        Error::InvalidSyntax {
            form,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(
            Error::arity_named("inc", 1, 2).to_string(),
            "Wrong number of arguments to 'inc': expected 1, got 2"
        );
        assert_eq!(
            Error::arity(0, 1).to_string(),
            "Wrong number of arguments: expected 0, got 1"
        );
        assert_eq!(
            Error::type_error_in("inc", "number", "string").to_string(),
            "inc: expected number, got string"
        );
        assert_eq!(
            Error::type_error("number", "nil").to_string(),
            "Type error: expected number, got nil"
        );
        assert_eq!(
            Error::UndefinedSymbol(Symbol::new("nope")).to_string(),
            "Unable to resolve symbol: nope"
        );
    }
}
