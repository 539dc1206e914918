// larch-core - Arithmetic built-in functions
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Arithmetic operations: +, -, *, inc, dec
//!
//! Integer arithmetic is checked and returns an error on overflow. Any float
//! argument makes the whole operation floating point.

use larch_parser::LarchVal;

use crate::error::{Error, Result};

#[derive(Clone, Copy)]
enum Num {
    Int(i64),
    Float(f64),
}

fn to_num(context: &str, val: &LarchVal) -> Result<Num> {
    match val {
        LarchVal::Int(n) => Ok(Num::Int(*n)),
        LarchVal::Float(n) => Ok(Num::Float(*n)),
        other => Err(Error::type_error_in(context, "number", other.type_name())),
    }
}

fn as_float(n: Num) -> f64 {
    match n {
        Num::Int(i) => i as f64,
        Num::Float(f) => f,
    }
}

fn combine(
    name: &str,
    acc: Num,
    next: Num,
    int_op: fn(i64, i64) -> Option<i64>,
    float_op: fn(f64, f64) -> f64,
) -> Result<Num> {
    match (acc, next) {
        (Num::Int(a), Num::Int(b)) => int_op(a, b)
            .map(Num::Int)
            .ok_or_else(|| Error::EvalError(format!("Integer overflow in {}", name))),
        (a, b) => Ok(Num::Float(float_op(as_float(a), as_float(b)))),
    }
}

fn fold(
    name: &str,
    init: Num,
    args: &[LarchVal],
    int_op: fn(i64, i64) -> Option<i64>,
    float_op: fn(f64, f64) -> f64,
) -> Result<LarchVal> {
    let mut acc = init;
    for arg in args {
        acc = combine(name, acc, to_num(name, arg)?, int_op, float_op)?;
    }
    Ok(from_num(acc))
}

fn from_num(n: Num) -> LarchVal {
    match n {
        Num::Int(i) => LarchVal::Int(i),
        Num::Float(f) => LarchVal::Float(f),
    }
}

/// (+ x y ...) - sum, 0 for no arguments
pub(crate) fn builtin_add(args: &[LarchVal]) -> Result<LarchVal> {
    fold("+", Num::Int(0), args, i64::checked_add, |a, b| a + b)
}

/// (* x y ...) - product, 1 for no arguments
pub(crate) fn builtin_mul(args: &[LarchVal]) -> Result<LarchVal> {
    fold("*", Num::Int(1), args, i64::checked_mul, |a, b| a * b)
}

/// (- x) negates; (- x y ...) subtracts from x
pub(crate) fn builtin_sub(args: &[LarchVal]) -> Result<LarchVal> {
    match args {
        [] => Err(Error::arity_at_least("-", 1, 0)),
        [x] => fold("-", Num::Int(0), std::slice::from_ref(x), i64::checked_sub, |a, b| a - b),
        [first, rest @ ..] => {
            let init = to_num("-", first)?;
            fold("-", init, rest, i64::checked_sub, |a, b| a - b)
        }
    }
}

/// (inc x)
pub(crate) fn builtin_inc(args: &[LarchVal]) -> Result<LarchVal> {
    if args.len() != 1 {
        return Err(Error::arity_named("inc", 1, args.len()));
    }
    fold("inc", Num::Int(1), args, i64::checked_add, |a, b| a + b)
}

/// (dec x)
pub(crate) fn builtin_dec(args: &[LarchVal]) -> Result<LarchVal> {
    if args.len() != 1 {
        return Err(Error::arity_named("dec", 1, args.len()));
    }
    let x = to_num("dec", &args[0])?;
    combine("dec", x, Num::Int(1), i64::checked_sub, |a, b| a - b).map(from_num)
}
