// larch-core - Function application
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Function application for Larch.

use std::any::Any;
use std::sync::Arc;

use larch_parser::{LarchFn, LarchNativeFn, LarchVal};

use super::eval_body;
use crate::builtins::lookup;
use crate::env::Env;
use crate::error::{Error, Result};

/// Type alias for native function signature.
pub type NativeFnImpl = dyn Fn(&[LarchVal]) -> Result<LarchVal> + Send + Sync;

/// Apply a function to arguments.
///
/// Besides functions, keywords, maps, sets and vectors are callable:
/// `(:k m)`, `(m :k)`, `(s x)` and `(v 0)`.
pub fn apply(func: &LarchVal, args: &[LarchVal]) -> Result<LarchVal> {
    match func {
        LarchVal::Fn(f) => apply_fn(f, args),
        LarchVal::NativeFn(f) => apply_native(f, args),
        LarchVal::Keyword(kw) => {
            // (:key coll default?) works on maps, records and protocols alike
            if args.len() != 1 && args.len() != 2 {
                return Err(Error::arity_range(kw.to_string(), 1, 2, args.len()));
            }
            let key = LarchVal::Keyword(kw.clone());
            Ok(lookup(&args[0], &key).unwrap_or_else(|| default_arg(args)))
        }
        LarchVal::Map(map) => {
            if args.len() != 1 && args.len() != 2 {
                return Err(Error::arity_range("map", 1, 2, args.len()));
            }
            Ok(map.get(&args[0]).cloned().unwrap_or_else(|| default_arg(args)))
        }
        LarchVal::Set(set) => {
            if args.len() != 1 && args.len() != 2 {
                return Err(Error::arity_range("set", 1, 2, args.len()));
            }
            if set.contains(&args[0]) {
                Ok(args[0].clone())
            } else {
                Ok(default_arg(args))
            }
        }
        LarchVal::Vector(vec) => {
            if args.len() != 1 && args.len() != 2 {
                return Err(Error::arity_range("vector", 1, 2, args.len()));
            }
            match &args[0] {
                LarchVal::Int(i) if *i >= 0 && (*i as usize) < vec.len() => {
                    Ok(vec[*i as usize].clone())
                }
                LarchVal::Int(i) if args.len() == 1 => Err(Error::EvalError(format!(
                    "Index {} out of bounds for vector of length {}",
                    i,
                    vec.len()
                ))),
                LarchVal::Int(_) => Ok(args[1].clone()),
                other => Err(Error::type_error_in(
                    "vector lookup",
                    "integer",
                    other.type_name(),
                )),
            }
        }
        other => Err(Error::NotCallable(format!("{}", other))),
    }
}

/// True for every value `apply` accepts in function position.
pub(crate) fn is_callable(val: &LarchVal) -> bool {
    matches!(
        val,
        LarchVal::Fn(_)
            | LarchVal::NativeFn(_)
            | LarchVal::Keyword(_)
            | LarchVal::Map(_)
            | LarchVal::Set(_)
            | LarchVal::Vector(_)
    )
}

fn default_arg(args: &[LarchVal]) -> LarchVal {
    args.get(1).cloned().unwrap_or(LarchVal::Nil)
}

/// Apply a user-defined function.
pub(crate) fn apply_fn(func: &LarchFn, args: &[LarchVal]) -> Result<LarchVal> {
    let arity = func.find_arity(args.len()).ok_or_else(|| {
        let arity_strs: Vec<String> = func
            .arities
            .iter()
            .map(|a| {
                if a.rest_param.is_some() {
                    format!("{}+", a.params.len())
                } else {
                    a.params.len().to_string()
                }
            })
            .collect();
        Error::EvalError(format!(
            "Wrong number of args ({}) passed to {}; expected {}",
            args.len(),
            func.name
                .as_ref()
                .map(|n| n.to_string())
                .unwrap_or_else(|| "fn".to_string()),
            arity_strs.join(" or ")
        ))
    })?;

    let captured_env = func
        .env
        .downcast_ref::<Env>()
        .ok_or_else(|| Error::Internal("Function environment has invalid type".into()))?;

    let fn_env = captured_env.child();

    // Bind function name for self-recursion if present
    if let Some(name) = &func.name {
        fn_env.define(name.clone(), LarchVal::Fn(func.clone()));
    }

    for (param, arg) in arity.params.iter().zip(args.iter()) {
        fn_env.define(param.clone(), arg.clone());
    }

    if let Some(rest) = &arity.rest_param {
        let rest_args: Vec<LarchVal> = args[arity.params.len()..].to_vec();
        fn_env.define(rest.clone(), LarchVal::list(rest_args));
    }

    eval_body(&arity.body, &fn_env)
}

/// Apply a native function.
pub(crate) fn apply_native(func: &LarchNativeFn, args: &[LarchVal]) -> Result<LarchVal> {
    let f = func
        .func()
        .downcast_ref::<Arc<NativeFnImpl>>()
        .ok_or_else(|| Error::Internal("Native function has invalid type".into()))?;
    f(args)
}

/// Create a native function value.
pub fn make_native_fn(
    name: impl Into<Arc<str>>,
    func: impl Fn(&[LarchVal]) -> Result<LarchVal> + Send + Sync + 'static,
) -> LarchNativeFn {
    let func_arc: Arc<NativeFnImpl> = Arc::new(func);
    let func_any: Arc<dyn Any + Send + Sync> = Arc::new(func_arc);
    LarchNativeFn::new(name, func_any)
}
