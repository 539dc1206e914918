// larch-core - Built-in functions
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Built-in functions for Larch.
//!
//! Most builtins are plain `fn(&[LarchVal]) -> Result<LarchVal>`. The
//! object-model builtins also take the [`Registry`], so that they can report
//! a soft failure or rejection instead of raising an error.

mod arithmetic;
mod atoms;
mod collections;
mod comparison;
mod predicates;
mod sequences;
mod strings;
mod type_checks;

use larch_parser::{LarchLazySeq, LarchVal, Symbol};

use crate::env::Env;
use crate::error::{Error, Result};
use crate::eval::{apply, make_native_fn, protocol_entry};
use crate::registry::Registry;

use arithmetic::{builtin_add, builtin_dec, builtin_inc, builtin_mul, builtin_sub};
use atoms::{
    builtin_atom, builtin_atom_p, builtin_compare_and_set, builtin_deref, builtin_get_validator,
    builtin_meta, builtin_reset, builtin_reset_vals, builtin_swap, builtin_swap_vals,
};
use collections::{
    builtin_assoc, builtin_contains_p, builtin_count, builtin_dissoc, builtin_get,
    builtin_hash_map, builtin_hash_set, builtin_keys, builtin_list, builtin_vals, builtin_vector,
};
use comparison::{builtin_eq, builtin_gt, builtin_lt};
use predicates::{
    builtin_fn_p, builtin_keyword_p, builtin_map_p, builtin_nil_p, builtin_not, builtin_record_p,
    builtin_string_p, builtin_symbol_p, builtin_vector_p,
};
use sequences::{builtin_first, builtin_nth, builtin_rest, builtin_seq};
use strings::{builtin_name, builtin_str};
use type_checks::{builtin_extends_p, builtin_protocol_p, builtin_satisfies_p, builtin_type};

/// Register all built-in functions in the given environment.
pub fn register_builtins(env: &Env) {
    // Arithmetic
    env.define_native("+", builtin_add);
    env.define_native("-", builtin_sub);
    env.define_native("*", builtin_mul);
    env.define_native("inc", builtin_inc);
    env.define_native("dec", builtin_dec);

    // Comparison and logic
    env.define_native("=", builtin_eq);
    env.define_native("<", builtin_lt);
    env.define_native(">", builtin_gt);
    env.define_native("not", builtin_not);

    // Type predicates
    env.define_native("nil?", builtin_nil_p);
    env.define_native("fn?", builtin_fn_p);
    env.define_native("map?", builtin_map_p);
    env.define_native("vector?", builtin_vector_p);
    env.define_native("keyword?", builtin_keyword_p);
    env.define_native("symbol?", builtin_symbol_p);
    env.define_native("string?", builtin_string_p);
    env.define_native("record?", builtin_record_p);

    // Strings
    env.define_native("str", builtin_str);
    env.define_native("name", builtin_name);

    // Collections
    env.define_native("list", builtin_list);
    env.define_native("vector", builtin_vector);
    env.define_native("hash-map", builtin_hash_map);
    env.define_native("hash-set", builtin_hash_set);
    env.define_native("get", builtin_get);
    env.define_native("assoc", builtin_assoc);
    env.define_native("dissoc", builtin_dissoc);
    env.define_native("contains?", builtin_contains_p);
    env.define_native("count", builtin_count);
    env.define_native("keys", builtin_keys);
    env.define_native("vals", builtin_vals);

    // Sequences
    env.define_native("first", builtin_first);
    env.define_native("rest", builtin_rest);
    env.define_native("seq", builtin_seq);
    env.define_native("nth", builtin_nth);

    // Types and protocols
    env.define_native("type", builtin_type);
    env.define_native("protocol?", builtin_protocol_p);
    env.define_registry_native("satisfies?", builtin_satisfies_p);
    env.define_registry_native("extends?", builtin_extends_p);

    // Atoms
    env.define_registry_native("atom", builtin_atom);
    env.define_registry_native("atom?", builtin_atom_p);
    env.define_registry_native("deref", builtin_deref);
    env.define_registry_native("reset!", builtin_reset);
    env.define_registry_native("swap!", builtin_swap);
    env.define_registry_native("compare-and-set!", builtin_compare_and_set);
    env.define_registry_native("swap-vals!", builtin_swap_vals);
    env.define_registry_native("reset-vals!", builtin_reset_vals);
    env.define_registry_native("get-validator", builtin_get_validator);
    env.define_registry_native("meta", builtin_meta);
}

/// Helper trait to define native functions more easily.
pub trait EnvExt {
    fn define_native(&self, name: &'static str, func: fn(&[LarchVal]) -> Result<LarchVal>);

    /// Define a native function that reports through this environment's
    /// registry.
    fn define_registry_native(
        &self,
        name: &'static str,
        func: fn(&Registry, &[LarchVal]) -> Result<LarchVal>,
    );
}

impl EnvExt for Env {
    fn define_native(&self, name: &'static str, func: fn(&[LarchVal]) -> Result<LarchVal>) {
        let native = make_native_fn(name, func);
        self.define(Symbol::new(name), LarchVal::NativeFn(native));
    }

    fn define_registry_native(
        &self,
        name: &'static str,
        func: fn(&Registry, &[LarchVal]) -> Result<LarchVal>,
    ) {
        let registry = self.registry().clone();
        let native = make_native_fn(name, move |args: &[LarchVal]| func(&registry, args));
        self.define(Symbol::new(name), LarchVal::NativeFn(native));
    }
}

// ============================================================================
// Shared Helpers
// ============================================================================

pub(crate) fn compare_numbers(a: &LarchVal, b: &LarchVal) -> Result<std::cmp::Ordering> {
    match (a, b) {
        (LarchVal::Int(x), LarchVal::Int(y)) => Ok(x.cmp(y)),
        (LarchVal::Float(x), LarchVal::Float(y)) => x
            .partial_cmp(y)
            .ok_or_else(|| Error::EvalError("Cannot compare NaN".into())),
        (LarchVal::Int(x), LarchVal::Float(y)) => (*x as f64)
            .partial_cmp(y)
            .ok_or_else(|| Error::EvalError("Cannot compare NaN".into())),
        (LarchVal::Float(x), LarchVal::Int(y)) => x
            .partial_cmp(&(*y as f64))
            .ok_or_else(|| Error::EvalError("Cannot compare NaN".into())),
        (a, b) => Err(Error::type_error_in(
            "comparison",
            "number",
            if !matches!(a, LarchVal::Int(_) | LarchVal::Float(_)) {
                a.type_name()
            } else {
                b.type_name()
            },
        )),
    }
}

/// Look `key` up in anything that answers keyed lookups.
///
/// Maps, records and protocols look the key up; vectors take an index; sets
/// answer the key itself if present.
pub(crate) fn lookup(coll: &LarchVal, key: &LarchVal) -> Option<LarchVal> {
    match coll {
        LarchVal::Map(map) => map.get(key).cloned(),
        LarchVal::Record(r) => r.get(key).cloned(),
        LarchVal::Protocol(p) => protocol_entry(p.protocol(), key),
        LarchVal::Vector(items) => match key {
            LarchVal::Int(i) if *i >= 0 => items.get(*i as usize).cloned(),
            _ => None,
        },
        LarchVal::Set(set) if set.contains(key) => Some(key.clone()),
        _ => None,
    }
}

// ============================================================================
// Sequences
// ============================================================================

/// Force a lazy sequence, returning the realized sequence (`nil` or a list).
/// If already realized, returns the cached result.
pub(crate) fn force_lazy_seq(ls: &LarchLazySeq) -> Result<LarchVal> {
    if let Some(result) = ls.realized() {
        return Ok(result);
    }

    let Some(thunk) = ls.pending_thunk() else {
        // Realized by another thread in the meantime
        return ls
            .realized()
            .ok_or_else(|| Error::Internal("lazy-seq in invalid state".into()));
    };

    // The lock is not held while the body runs
    let val = apply(&LarchVal::Fn(thunk), &[])?;
    let result = match val {
        LarchVal::Nil => LarchVal::Nil,
        LarchVal::List(items) | LarchVal::Vector(items) => LarchVal::List(items),
        LarchVal::LazySeq(inner) => force_lazy_seq(&inner)?,
        other => {
            return Err(Error::type_error_in(
                "lazy-seq body",
                "nil or sequence",
                other.type_name(),
            ));
        }
    };

    Ok(ls.set_realized(result))
}

/// Helper to convert a value to a sequence of values.
pub(crate) fn to_seq(val: &LarchVal) -> Result<Vec<LarchVal>> {
    match val {
        LarchVal::Nil => Ok(Vec::new()),
        LarchVal::List(items) | LarchVal::Vector(items) => Ok(items.iter().cloned().collect()),
        LarchVal::Set(items) => Ok(items.iter().cloned().collect()),
        LarchVal::Map(map) => Ok(map
            .iter()
            .map(|(k, v)| LarchVal::vector(vec![k.clone(), v.clone()]))
            .collect()),
        LarchVal::Record(r) => Ok(r
            .ordered_entries()
            .into_iter()
            .map(|(k, v)| LarchVal::vector(vec![k, v]))
            .collect()),
        LarchVal::String(s) => Ok(s.chars().map(|c| LarchVal::string(c.to_string())).collect()),
        LarchVal::LazySeq(ls) => to_seq(&force_lazy_seq(ls)?),
        other => Err(Error::type_error_in("seq", "seqable", other.type_name())),
    }
}
