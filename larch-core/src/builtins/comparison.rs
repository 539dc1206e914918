// larch-core - Comparison built-in functions
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Comparison operations: =, <, >
//!
//! `=` is value equality and never equates an integer with a float; `<` and
//! `>` compare numerically across both.

use std::cmp::Ordering;

use larch_parser::LarchVal;

use crate::error::Result;

use super::compare_numbers;

// ============================================================================
// Equality
// ============================================================================

pub(crate) fn builtin_eq(args: &[LarchVal]) -> Result<LarchVal> {
    Ok(LarchVal::bool(args.windows(2).all(|w| w[0] == w[1])))
}

// ============================================================================
// Ordering
// ============================================================================

fn monotonic(args: &[LarchVal], expected: Ordering) -> Result<LarchVal> {
    for i in 1..args.len() {
        if compare_numbers(&args[i - 1], &args[i])? != expected {
            return Ok(LarchVal::bool(false));
        }
    }
    Ok(LarchVal::bool(true))
}

pub(crate) fn builtin_lt(args: &[LarchVal]) -> Result<LarchVal> {
    monotonic(args, Ordering::Less)
}

pub(crate) fn builtin_gt(args: &[LarchVal]) -> Result<LarchVal> {
    monotonic(args, Ordering::Greater)
}
