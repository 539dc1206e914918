// larch-core - Runtime and evaluator for the Larch language
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! # larch-core
//!
//! Runtime and evaluator for the Larch language: an AST-walking interpreter
//! for `LarchVal` expressions, hosting protocols with open type-based
//! dispatch, records, structs and atoms.
//!
//! ```
//! use larch_core::{Env, eval, register_builtins};
//! use larch_parser::{LarchVal, Parser};
//!
//! let env = Env::new();
//! register_builtins(&env);
//!
//! let mut parser = Parser::new(
//!     "(defprotocol Greet (greet [this]))
//!      (extend-protocol Greet String (greet [s] (str \"hello \" s)))
//!      (greet \"world\")",
//! )
//! .unwrap();
//! let mut result = LarchVal::Nil;
//! while let Some(form) = parser.parse().unwrap() {
//!     result = eval(&form, &env).unwrap();
//! }
//! assert_eq!(result, LarchVal::string("hello world"));
//! ```

pub mod builtins;
pub mod env;
pub mod error;
pub mod eval;
pub mod registry;

pub use builtins::{EnvExt, register_builtins};
pub use env::Env;
pub use error::{AritySpec, Error, Result};
pub use eval::{
    NativeFnImpl, apply, eval, get_eval_depth, get_max_eval_depth, make_native_fn,
    set_max_eval_depth,
};
pub use registry::{Diagnostic, Diagnostics, Registry, Severity};

// Re-export parser types for convenience
pub use larch_parser::{Keyword, LarchVal, Symbol};

/// Read and evaluate every form in `source`, returning the last result.
///
/// # Errors
///
/// Returns the first read or evaluation error.
pub fn eval_str(source: &str, env: &Env) -> Result<LarchVal> {
    let mut parser = larch_parser::Parser::new(source)?;
    let mut result = LarchVal::Nil;
    while let Some(form) = parser.parse()? {
        result = eval(&form, env)?;
    }
    Ok(result)
}
