// larch-core - Sequence built-in functions
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Sequence operations: first, rest, seq, nth

use larch_parser::LarchVal;

use crate::error::{Error, Result};

use super::to_seq;

pub(crate) fn builtin_first(args: &[LarchVal]) -> Result<LarchVal> {
    if args.len() != 1 {
        return Err(Error::arity_named("first", 1, args.len()));
    }
    Ok(to_seq(&args[0])?.into_iter().next().unwrap_or(LarchVal::Nil))
}

/// (rest coll) - always a list, possibly empty
pub(crate) fn builtin_rest(args: &[LarchVal]) -> Result<LarchVal> {
    if args.len() != 1 {
        return Err(Error::arity_named("rest", 1, args.len()));
    }
    Ok(LarchVal::list(to_seq(&args[0])?.into_iter().skip(1).collect()))
}

/// (seq coll) - nil when empty
pub(crate) fn builtin_seq(args: &[LarchVal]) -> Result<LarchVal> {
    if args.len() != 1 {
        return Err(Error::arity_named("seq", 1, args.len()));
    }
    let items = to_seq(&args[0])?;
    if items.is_empty() {
        Ok(LarchVal::Nil)
    } else {
        Ok(LarchVal::list(items))
    }
}

/// (nth coll index not-found?)
pub(crate) fn builtin_nth(args: &[LarchVal]) -> Result<LarchVal> {
    if args.len() < 2 || args.len() > 3 {
        return Err(Error::arity_range("nth", 2, 3, args.len()));
    }
    let index = match &args[1] {
        LarchVal::Int(i) => *i,
        other => return Err(Error::type_error_in("nth", "integer", other.type_name())),
    };
    let items = to_seq(&args[0])?;
    let found = usize::try_from(index).ok().and_then(|i| items.get(i).cloned());
    match (found, args.get(2)) {
        (Some(v), _) => Ok(v),
        (None, Some(not_found)) => Ok(not_found.clone()),
        (None, None) => Err(Error::EvalError(format!(
            "Index {} out of bounds for length {}",
            index,
            items.len()
        ))),
    }
}
