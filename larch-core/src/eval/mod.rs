// larch-core - AST-walking evaluator
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! AST-walking evaluator for Larch expressions.
//!
//! Special forms are recognised by the head symbol of a list. The object-model
//! forms live in their own submodules: protocols, records and structs.

pub mod apply;
mod protocols;
mod records;
mod structs;

pub use apply::{NativeFnImpl, apply, make_native_fn};
pub(crate) use apply::is_callable;
pub(crate) use protocols::protocol_entry;

use std::any::Any;
use std::cell::Cell;
use std::sync::Arc;

use larch_parser::{FnArity, LarchFn, LarchVal, Symbol};

use crate::env::Env;
use crate::error::{Error, Result};

use protocols::{eval_defprotocol, eval_extend, eval_extend_protocol, eval_extend_type};
use records::eval_defrecord;
use structs::{eval_accessor, eval_defstruct, eval_struct, eval_struct_map};

// ============================================================================
// Stack Overflow Protection
// ============================================================================

/// Maximum recursion depth for eval. Can be configured via `set_max_eval_depth`.
const DEFAULT_MAX_EVAL_DEPTH: usize = 10_000;

thread_local! {
    static EVAL_DEPTH: Cell<usize> = const { Cell::new(0) };
    static MAX_EVAL_DEPTH: Cell<usize> = const { Cell::new(DEFAULT_MAX_EVAL_DEPTH) };
}

/// Set the maximum eval recursion depth for the current thread. Returns the
/// previous value.
#[inline]
#[must_use]
pub fn set_max_eval_depth(depth: usize) -> usize {
    MAX_EVAL_DEPTH.with(|d| d.replace(depth))
}

/// Get the current maximum eval recursion depth.
#[inline]
#[must_use]
pub fn get_max_eval_depth() -> usize {
    MAX_EVAL_DEPTH.with(|d| d.get())
}

/// Get the current eval recursion depth.
#[inline]
#[must_use]
pub fn get_eval_depth() -> usize {
    EVAL_DEPTH.with(|d| d.get())
}

struct EvalDepthGuard;

impl EvalDepthGuard {
    fn new() -> Result<Self> {
        let (current, max) = EVAL_DEPTH.with(|d| {
            let current = d.get();
            d.set(current + 1);
            (current + 1, MAX_EVAL_DEPTH.with(|m| m.get()))
        });
        if current > max {
            EVAL_DEPTH.with(|d| d.set(d.get().saturating_sub(1)));
            Err(Error::EvalError(format!(
                "Stack overflow: maximum recursion depth ({}) exceeded",
                max
            )))
        } else {
            Ok(EvalDepthGuard)
        }
    }
}

impl Drop for EvalDepthGuard {
    fn drop(&mut self) {
        EVAL_DEPTH.with(|d| d.set(d.get().saturating_sub(1)));
    }
}

// ============================================================================
// Evaluation
// ============================================================================

/// Evaluate a Larch expression in the given environment.
///
/// # Examples
///
/// ```
/// use larch_core::{Env, eval, register_builtins};
/// use larch_parser::{LarchVal, Parser};
///
/// let env = Env::new();
/// register_builtins(&env);
///
/// let mut parser = Parser::new("(* 6 7)").unwrap();
/// let expr = parser.parse().unwrap().unwrap();
/// assert_eq!(eval(&expr, &env).unwrap(), LarchVal::int(42));
///
/// // Object-model failures are values, not errors
/// let mut parser = Parser::new("(defprotocol 42)").unwrap();
/// let expr = parser.parse().unwrap().unwrap();
/// assert_eq!(eval(&expr, &env).unwrap(), LarchVal::Nil);
/// ```
///
/// # Errors
///
/// Returns an error if:
/// - A symbol cannot be resolved
/// - A function is called with wrong arity
/// - A builtin receives an argument of the wrong type
/// - Stack overflow occurs (configurable via [`set_max_eval_depth`])
#[must_use = "eval returns a value that should be used"]
pub fn eval(expr: &LarchVal, env: &Env) -> Result<LarchVal> {
    let _guard = EvalDepthGuard::new()?;

    match expr {
        LarchVal::Nil
        | LarchVal::Bool(_)
        | LarchVal::Int(_)
        | LarchVal::Float(_)
        | LarchVal::String(_)
        | LarchVal::Keyword(_)
        | LarchVal::LazySeq(_)
        | LarchVal::Fn(_)
        | LarchVal::NativeFn(_)
        | LarchVal::Atom(_)
        | LarchVal::Protocol(_)
        | LarchVal::Record(_)
        | LarchVal::Error(_) => Ok(expr.clone()),

        LarchVal::Symbol(sym) => env.lookup(sym),

        LarchVal::List(items) => {
            let items_vec: Vec<_> = items.iter().cloned().collect();
            eval_list(&items_vec, env)
        }

        LarchVal::Vector(items) => {
            let evaluated: Result<Vec<_>> = items.iter().map(|e| eval(e, env)).collect();
            Ok(LarchVal::vector(evaluated?))
        }

        LarchVal::Map(map) => {
            let mut result = Vec::with_capacity(map.len());
            for (k, v) in map.iter() {
                result.push((eval(k, env)?, eval(v, env)?));
            }
            Ok(LarchVal::map(result))
        }

        LarchVal::Set(items) => {
            let evaluated: Result<Vec<_>> = items.iter().map(|e| eval(e, env)).collect();
            Ok(LarchVal::set(evaluated?))
        }
    }
}

/// Evaluate a list form (special form or function call).
fn eval_list(items: &[LarchVal], env: &Env) -> Result<LarchVal> {
    if items.is_empty() {
        return Ok(LarchVal::list(Vec::new()));
    }

    if let LarchVal::Symbol(sym) = &items[0] {
        if !sym.has_namespace() {
            match sym.name() {
                "quote" => return eval_quote(&items[1..]),
                "if" => return eval_if(&items[1..], env),
                "do" => return eval_do(&items[1..], env),
                "let" => return eval_let(&items[1..], env),
                "def" => return eval_def(&items[1..], env),
                "fn" => return eval_fn(&items[1..], env),
                "lazy-seq" => return eval_lazy_seq(&items[1..], env),
                "defprotocol" => return eval_defprotocol(&items[1..], env),
                "extend-protocol" => return eval_extend_protocol(&items[1..], env),
                "extend-type" => return eval_extend_type(&items[1..], env),
                "extend" => return eval_extend(&items[1..], env),
                "defrecord" => return eval_defrecord(&items[1..], env),
                "defstruct" => return eval_defstruct(&items[1..], env),
                "struct" => return eval_struct(&items[1..], env),
                "struct-map" => return eval_struct_map(&items[1..], env),
                "accessor" => return eval_accessor(&items[1..], env),
                _ => {}
            }
        }
    }

    let func = eval(&items[0], env)?;
    let args: Result<Vec<_>> = items[1..].iter().map(|e| eval(e, env)).collect();
    apply(&func, &args?)
}

/// Evaluate every form of `body` in order, returning the last result.
pub(crate) fn eval_body(body: &[LarchVal], env: &Env) -> Result<LarchVal> {
    let mut result = LarchVal::Nil;
    for expr in body {
        result = eval(expr, env)?;
    }
    Ok(result)
}

// ============================================================================
// Special Forms
// ============================================================================

/// (quote form)
fn eval_quote(args: &[LarchVal]) -> Result<LarchVal> {
    if args.len() != 1 {
        return Err(Error::syntax("quote", "requires exactly 1 argument"));
    }
    Ok(args[0].clone())
}

/// (if test then else?) - conditional evaluation
fn eval_if(args: &[LarchVal], env: &Env) -> Result<LarchVal> {
    if args.len() < 2 || args.len() > 3 {
        return Err(Error::syntax("if", "requires 2 or 3 arguments"));
    }

    let test = eval(&args[0], env)?;

    if test.is_truthy() {
        eval(&args[1], env)
    } else if args.len() == 3 {
        eval(&args[2], env)
    } else {
        Ok(LarchVal::Nil)
    }
}

/// (do exprs*) - evaluate expressions in sequence, return last
fn eval_do(args: &[LarchVal], env: &Env) -> Result<LarchVal> {
    eval_body(args, env)
}

/// (let [bindings] body...) - local bindings with sequential evaluation
fn eval_let(args: &[LarchVal], env: &Env) -> Result<LarchVal> {
    let bindings: Vec<LarchVal> = match args.first() {
        Some(LarchVal::Vector(v)) => v.iter().cloned().collect(),
        _ => {
            return Err(Error::syntax("let", "first argument must be a binding vector"));
        }
    };

    if bindings.len() % 2 != 0 {
        return Err(Error::syntax(
            "let",
            "binding vector must have even number of forms",
        ));
    }

    let let_env = env.child();
    for pair in bindings.chunks(2) {
        let sym = match &pair[0] {
            LarchVal::Symbol(s) => s.clone(),
            other => {
                return Err(Error::syntax(
                    "let",
                    format!("binding name must be a symbol, got {}", other.type_name()),
                ));
            }
        };
        let val = eval(&pair[1], &let_env)?;
        let_env.define(sym, val);
    }

    eval_body(&args[1..], &let_env)
}

/// (def name value?) - define a global binding
fn eval_def(args: &[LarchVal], env: &Env) -> Result<LarchVal> {
    if args.is_empty() || args.len() > 2 {
        return Err(Error::syntax("def", "requires a name and an optional value"));
    }
    let name = match &args[0] {
        LarchVal::Symbol(s) => s.clone(),
        other => {
            return Err(Error::syntax(
                "def",
                format!("first argument must be a symbol, got {}", other.type_name()),
            ));
        }
    };
    let value = match args.get(1) {
        Some(form) => eval(form, env)?,
        None => LarchVal::Nil,
    };
    env.define_global(name, value.clone());
    Ok(value)
}

/// (fn name? [params] body...) or (fn name? ([params] body...)+)
fn eval_fn(args: &[LarchVal], env: &Env) -> Result<LarchVal> {
    let (fn_name, args) = match args.first() {
        Some(LarchVal::Symbol(sym)) => (Some(sym.clone()), &args[1..]),
        _ => (None, args),
    };

    if args.is_empty() {
        return Err(Error::syntax("fn", "requires a parameter vector"));
    }

    let arities = if matches!(&args[0], LarchVal::List(_)) {
        // Multi-arity: (fn ([x] x) ([x y] (+ x y)))
        let mut arities = Vec::with_capacity(args.len());
        for arity_form in args {
            let arity_list: Vec<LarchVal> = match arity_form {
                LarchVal::List(items) => items.iter().cloned().collect(),
                _ => {
                    return Err(Error::syntax(
                        "fn",
                        "each arity must be a list like ([params] body...)",
                    ));
                }
            };
            if arity_list.is_empty() {
                return Err(Error::syntax("fn", "arity requires a parameter vector"));
            }
            arities.push(parse_fn_arity(&arity_list[0], &arity_list[1..])?);
        }
        arities
    } else {
        vec![parse_fn_arity(&args[0], &args[1..])?]
    };

    Ok(LarchVal::Fn(make_fn(fn_name, arities, env)))
}

/// Build a closure over `env`.
pub(crate) fn make_fn(name: Option<Symbol>, arities: Vec<FnArity>, env: &Env) -> LarchFn {
    let env_any: Arc<dyn Any + Send + Sync> = Arc::new(env.clone());
    LarchFn::new(name, arities, env_any)
}

/// Parse `[a b & rest]` and a body into an arity.
fn parse_fn_arity(params_form: &LarchVal, body: &[LarchVal]) -> Result<FnArity> {
    let params_vec = match params_form {
        LarchVal::Vector(v) => v,
        other => {
            return Err(Error::syntax(
                "fn",
                format!("parameters must be a vector, got {}", other.type_name()),
            ));
        }
    };

    let mut params = Vec::with_capacity(params_vec.len());
    let mut rest_param = None;
    let mut iter = params_vec.iter();
    while let Some(param) = iter.next() {
        match param {
            LarchVal::Symbol(s) if s.name() == "&" && !s.has_namespace() => {
                match (iter.next(), iter.next()) {
                    (Some(LarchVal::Symbol(rest)), None) => rest_param = Some(rest.clone()),
                    _ => {
                        return Err(Error::syntax(
                            "fn",
                            "& must be followed by exactly one symbol",
                        ));
                    }
                }
            }
            LarchVal::Symbol(s) => params.push(s.clone()),
            other => {
                return Err(Error::syntax(
                    "fn",
                    format!("parameter must be a symbol, got {}", other.type_name()),
                ));
            }
        }
    }

    Ok(FnArity::new(params, rest_param, body.to_vec()))
}

/// (lazy-seq body...) - defer evaluation of body until the sequence is used
fn eval_lazy_seq(args: &[LarchVal], env: &Env) -> Result<LarchVal> {
    let thunk = make_fn(None, vec![FnArity::new(Vec::new(), None, args.to_vec())], env);
    Ok(LarchVal::lazy_seq(thunk))
}
