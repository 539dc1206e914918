// larch-core - Type predicate built-in functions
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Type predicates: nil?, fn?, map?, vector?, keyword?, symbol?, string?,
//! record?, and `not`.

use larch_parser::LarchVal;

use crate::error::{Error, Result};

fn single<'a>(name: &str, args: &'a [LarchVal]) -> Result<&'a LarchVal> {
    match args {
        [x] => Ok(x),
        _ => Err(Error::arity_named(name, 1, args.len())),
    }
}

pub(crate) fn builtin_nil_p(args: &[LarchVal]) -> Result<LarchVal> {
    let x = single("nil?", args)?;
    Ok(LarchVal::bool(x.is_nil()))
}

pub(crate) fn builtin_fn_p(args: &[LarchVal]) -> Result<LarchVal> {
    let x = single("fn?", args)?;
    Ok(LarchVal::bool(matches!(
        x,
        LarchVal::Fn(_) | LarchVal::NativeFn(_)
    )))
}

/// Records are maps too.
pub(crate) fn builtin_map_p(args: &[LarchVal]) -> Result<LarchVal> {
    let x = single("map?", args)?;
    Ok(LarchVal::bool(matches!(
        x,
        LarchVal::Map(_) | LarchVal::Record(_)
    )))
}

pub(crate) fn builtin_vector_p(args: &[LarchVal]) -> Result<LarchVal> {
    let x = single("vector?", args)?;
    Ok(LarchVal::bool(matches!(x, LarchVal::Vector(_))))
}

pub(crate) fn builtin_keyword_p(args: &[LarchVal]) -> Result<LarchVal> {
    let x = single("keyword?", args)?;
    Ok(LarchVal::bool(matches!(x, LarchVal::Keyword(_))))
}

pub(crate) fn builtin_symbol_p(args: &[LarchVal]) -> Result<LarchVal> {
    let x = single("symbol?", args)?;
    Ok(LarchVal::bool(matches!(x, LarchVal::Symbol(_))))
}

pub(crate) fn builtin_string_p(args: &[LarchVal]) -> Result<LarchVal> {
    let x = single("string?", args)?;
    Ok(LarchVal::bool(matches!(x, LarchVal::String(_))))
}

pub(crate) fn builtin_record_p(args: &[LarchVal]) -> Result<LarchVal> {
    let x = single("record?", args)?;
    Ok(LarchVal::bool(matches!(x, LarchVal::Record(_))))
}

pub(crate) fn builtin_not(args: &[LarchVal]) -> Result<LarchVal> {
    let x = single("not", args)?;
    Ok(LarchVal::bool(!x.is_truthy()))
}
