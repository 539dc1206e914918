// larch-core - String built-in functions
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! String operations: str, name

use larch_parser::LarchVal;

use crate::error::{Error, Result};

/// (str & args) - concatenate the printed forms of args, strings unquoted
pub(crate) fn builtin_str(args: &[LarchVal]) -> Result<LarchVal> {
    let mut result = String::new();
    for arg in args {
        match arg {
            LarchVal::String(s) => result.push_str(s),
            LarchVal::Nil => {} // nil contributes nothing
            other => result.push_str(&other.to_string()),
        }
    }
    Ok(LarchVal::string(result))
}

/// (name x) - the name part of a keyword or symbol
pub(crate) fn builtin_name(args: &[LarchVal]) -> Result<LarchVal> {
    if args.len() != 1 {
        return Err(Error::arity_named("name", 1, args.len()));
    }
    match &args[0] {
        LarchVal::Keyword(kw) => Ok(LarchVal::string(kw.name())),
        LarchVal::Symbol(sym) => Ok(LarchVal::string(sym.name())),
        LarchVal::String(s) => Ok(LarchVal::String(s.clone())),
        other => Err(Error::type_error_in(
            "name",
            "keyword, symbol, or string",
            other.type_name(),
        )),
    }
}
