// larch-core - Common test utilities
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Shared test helpers for Larch integration tests.
//!
//! # Usage
//!
//! In your test file, add:
//! ```ignore
//! mod common;
//! use common::*;
//! ```
//!
//! # Macros
//!
//! - [`assert_eval!`] - Assert that code evaluates to an expected value
//! - [`assert_eval_with_env!`] - Assert evaluation with a shared environment

pub use larch_core::builtins::register_builtins;
pub use larch_core::env::Env;
pub use larch_core::eval::eval;
#[allow(unused_imports)]
pub use larch_parser::{Keyword, LarchVal, Parser, Symbol};

/// Evaluate a Larch source string in a fresh environment, returning the value
/// of the last form.
#[must_use]
#[allow(dead_code)]
pub fn eval_str(s: &str) -> Result<LarchVal, String> {
    eval_all(s, &new_env())
}

/// Evaluate every form in `s`, returning the last result.
#[must_use]
pub fn eval_all(s: &str, env: &Env) -> Result<LarchVal, String> {
    let mut parser = Parser::new(s).map_err(|e| e.to_string())?;
    let mut result = LarchVal::Nil;

    while let Some(expr) = parser.parse().map_err(|e| e.to_string())? {
        result = eval(&expr, env).map_err(|e| e.to_string())?;
    }

    Ok(result)
}

/// Create a new environment with builtins registered.
#[must_use]
pub fn new_env() -> Env {
    let env = Env::new();
    register_builtins(&env);
    env
}

/// Diagnostics recorded so far, drained from the environment's registry.
#[must_use]
#[allow(dead_code)]
pub fn take_messages(env: &Env) -> Vec<String> {
    env.registry()
        .diagnostics()
        .take()
        .into_iter()
        .map(|d| d.message)
        .collect()
}

#[allow(dead_code)]
pub fn kw(name: &str) -> LarchVal {
    LarchVal::Keyword(Keyword::new(name))
}

#[allow(dead_code)]
pub fn sym(name: &str) -> LarchVal {
    LarchVal::Symbol(Symbol::new(name))
}

/// Assert that evaluating `input` produces the expected value.
///
/// # Example
///
/// ```ignore
/// assert_eval!("(+ 1 2)", LarchVal::int(3));
/// ```
#[macro_export]
macro_rules! assert_eval {
    ($input:expr, $expected:expr) => {
        let result = $crate::common::eval_str($input);
        assert!(
            result.is_ok(),
            "Failed to evaluate '{}': {:?}",
            $input,
            result.err()
        );
        assert_eq!(
            result.unwrap(),
            $expected,
            "Evaluation of '{}' did not match expected",
            $input
        );
    };
}

/// Assert that evaluating `input` in the given environment produces the
/// expected value.
#[macro_export]
macro_rules! assert_eval_with_env {
    ($input:expr, $expected:expr, $env:expr) => {
        let result = $crate::common::eval_all($input, $env);
        assert!(
            result.is_ok(),
            "Failed to evaluate '{}': {:?}",
            $input,
            result.err()
        );
        assert_eq!(
            result.unwrap(),
            $expected,
            "Evaluation of '{}' did not match expected",
            $input
        );
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eval_str_basic() {
        assert_eq!(eval_str("42").unwrap(), LarchVal::int(42));
        assert_eq!(eval_str("(+ 1 2)").unwrap(), LarchVal::int(3));
    }

    #[test]
    fn test_eval_all() {
        let env = new_env();
        let result = eval_all("(def x 1) (def y 2) (+ x y)", &env).unwrap();
        assert_eq!(result, LarchVal::int(3));
    }
}
