// larch-core - Type checking built-in functions
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Type operations: type, satisfies?, extends?, protocol?

use std::sync::Arc;

use larch_parser::{Keyword, LarchVal, Protocol, form_to_type_tag};

use crate::error::{Error, Result};
use crate::registry::Registry;

use super::lookup;

// ============================================================================
// Type Checks
// ============================================================================

/// (type x) - the dispatch tag of x, as a symbol
pub(crate) fn builtin_type(args: &[LarchVal]) -> Result<LarchVal> {
    if args.len() != 1 {
        return Err(Error::arity_named("type", 1, args.len()));
    }
    Ok(LarchVal::Symbol(args[0].type_tag().to_symbol()))
}

/// (protocol? x) - true if the `:type` entry of x is `:protocol`
///
/// Protocol values answer `:protocol` for `:type`, so they qualify along with
/// any map or record carrying that entry.
pub(crate) fn builtin_protocol_p(args: &[LarchVal]) -> Result<LarchVal> {
    if args.len() != 1 {
        return Err(Error::arity_named("protocol?", 1, args.len()));
    }
    let type_key = LarchVal::keyword(Keyword::new("type"));
    let marker = LarchVal::keyword(Keyword::new("protocol"));
    Ok(LarchVal::bool(
        lookup(&args[0], &type_key).as_ref() == Some(&marker),
    ))
}

/// A protocol value, or a quoted symbol naming a registered protocol.
fn as_protocol(registry: &Registry, val: &LarchVal) -> Option<Arc<Protocol>> {
    match val {
        LarchVal::Protocol(p) => Some(Arc::clone(p.protocol())),
        LarchVal::Symbol(sym) => registry.protocol(sym),
        _ => None,
    }
}

/// (satisfies? protocol value) - true if any implementation is registered
/// for the tag of value
pub(crate) fn builtin_satisfies_p(registry: &Registry, args: &[LarchVal]) -> Result<LarchVal> {
    if args.len() != 2 {
        return Ok(registry.soft_fail(format!(
            "satisfies?: expected 2 arguments, got {}",
            args.len()
        )));
    }
    match as_protocol(registry, &args[0]) {
        Some(protocol) => Ok(LarchVal::bool(protocol.extends(&args[1].type_tag()))),
        None => Ok(registry.soft_fail(format!("satisfies?: {} is not a protocol", args[0]))),
    }
}

/// (extends? protocol type) - type is a symbol such as `String` or a record
/// name, usually quoted or obtained from `type`
pub(crate) fn builtin_extends_p(registry: &Registry, args: &[LarchVal]) -> Result<LarchVal> {
    if args.len() != 2 {
        return Ok(registry.soft_fail(format!(
            "extends?: expected 2 arguments, got {}",
            args.len()
        )));
    }
    let Some(protocol) = as_protocol(registry, &args[0]) else {
        return Ok(registry.soft_fail(format!("extends?: {} is not a protocol", args[0])));
    };
    match form_to_type_tag(&args[1]) {
        Some(tag) => Ok(LarchVal::bool(protocol.extends(&tag))),
        None => Ok(registry.soft_fail(format!("extends?: {} does not name a type", args[1]))),
    }
}
