// larch-core - Atom built-in functions
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Atom operations: atom, deref, reset!, swap!, compare-and-set!,
//! swap-vals!, reset-vals!, plus atom?, get-validator and meta.
//!
//! `:meta` and `:validator` are stored and can be read back, but mutation
//! never consults them.

use larch_parser::{LarchAtom, LarchVal};

use crate::error::Result;
use crate::eval::{apply, is_callable};
use crate::registry::Registry;

use super::force_lazy_seq;

// ============================================================================
// Atom Creation and Predicate
// ============================================================================

/// (atom x & options) - Create an atom with initial value x
pub(crate) fn builtin_atom(registry: &Registry, args: &[LarchVal]) -> Result<LarchVal> {
    let Some((init, options)) = args.split_first() else {
        return Ok(registry.reject("atom: requires an initial value"));
    };

    let mut meta = None;
    let mut validator = None;
    for pair in options.chunks(2) {
        let [key, value] = pair else {
            return Ok(registry.reject(format!("atom: option {} has no value", pair[0])));
        };
        match key {
            LarchVal::Keyword(kw) if kw.namespace().is_none() && kw.name() == "meta" => {
                meta = Some(value.clone());
            }
            LarchVal::Keyword(kw) if kw.namespace().is_none() && kw.name() == "validator" => {
                validator = Some(value.clone());
            }
            other => {
                return Ok(registry.reject(format!("atom: unknown option {}", other)));
            }
        }
    }

    Ok(LarchVal::Atom(LarchAtom::with_options(
        init.clone(),
        meta,
        validator,
    )))
}

/// (atom? x) - Returns true if x is an atom
pub(crate) fn builtin_atom_p(registry: &Registry, args: &[LarchVal]) -> Result<LarchVal> {
    if args.len() != 1 {
        return Ok(registry.reject(format!(
            "atom?: expected 1 argument, got {}",
            args.len()
        )));
    }
    Ok(LarchVal::bool(matches!(args[0], LarchVal::Atom(_))))
}

/// The atom in first position, or the soft-failure result to return instead.
fn expect_atom<'a>(
    registry: &Registry,
    name: &str,
    arity: usize,
    args: &'a [LarchVal],
) -> std::result::Result<&'a LarchAtom, LarchVal> {
    if args.len() < arity {
        return Err(registry.reject(format!(
            "{}: expected at least {} arguments, got {}",
            name,
            arity,
            args.len()
        )));
    }
    match &args[0] {
        LarchVal::Atom(a) => Ok(a),
        other => Err(registry.soft_fail(format!(
            "{}: expected an atom, got {}",
            name,
            other.type_name()
        ))),
    }
}

// ============================================================================
// Basic Operations
// ============================================================================

/// (deref ref) / @ref - current value of an atom, or the realized lazy seq
pub(crate) fn builtin_deref(registry: &Registry, args: &[LarchVal]) -> Result<LarchVal> {
    if let Some(LarchVal::LazySeq(ls)) = args.first() {
        return force_lazy_seq(ls);
    }
    match expect_atom(registry, "deref", 1, args) {
        Ok(atom) => Ok(atom.deref()),
        Err(failure) => Ok(failure),
    }
}

/// (reset! atom newval) - Set atom value, returns newval
pub(crate) fn builtin_reset(registry: &Registry, args: &[LarchVal]) -> Result<LarchVal> {
    match expect_atom(registry, "reset!", 2, args) {
        Ok(atom) => Ok(atom.reset(args[1].clone()).1),
        Err(failure) => Ok(failure),
    }
}

/// (reset-vals! atom newval) - Set atom value, returns [old new]
pub(crate) fn builtin_reset_vals(registry: &Registry, args: &[LarchVal]) -> Result<LarchVal> {
    match expect_atom(registry, "reset-vals!", 2, args) {
        Ok(atom) => {
            let (old, new) = atom.reset(args[1].clone());
            Ok(LarchVal::vector(vec![old, new]))
        }
        Err(failure) => Ok(failure),
    }
}

/// (compare-and-set! atom oldval newval) - CAS, returns true if successful
pub(crate) fn builtin_compare_and_set(registry: &Registry, args: &[LarchVal]) -> Result<LarchVal> {
    match expect_atom(registry, "compare-and-set!", 3, args) {
        Ok(atom) => Ok(LarchVal::bool(
            atom.compare_and_set(&args[1], args[2].clone()),
        )),
        Err(failure) => Ok(failure),
    }
}

/// Run `(f old extra...)` through the atom's update loop.
fn swap_with(atom: &LarchAtom, f: &LarchVal, extra: &[LarchVal]) -> Result<(LarchVal, LarchVal)> {
    atom.update(|old| {
        let mut call_args = Vec::with_capacity(extra.len() + 1);
        call_args.push(old.clone());
        call_args.extend_from_slice(extra);
        apply(f, &call_args)
    })
}

/// The atom and update function of a swap, or the failure result to return.
fn swap_target<'a>(
    registry: &Registry,
    name: &str,
    args: &'a [LarchVal],
) -> std::result::Result<&'a LarchAtom, LarchVal> {
    let atom = expect_atom(registry, name, 2, args)?;
    if !is_callable(&args[1]) {
        return Err(registry.reject(format!(
            "{}: cannot call {} ({})",
            name,
            args[1],
            args[1].type_name()
        )));
    }
    Ok(atom)
}

/// (swap! atom f & args) - atomically set to (f old args...), returns new
pub(crate) fn builtin_swap(registry: &Registry, args: &[LarchVal]) -> Result<LarchVal> {
    match swap_target(registry, "swap!", args) {
        Ok(atom) => Ok(swap_with(atom, &args[1], &args[2..])?.1),
        Err(failure) => Ok(failure),
    }
}

/// (swap-vals! atom f & args) - like swap!, returns [old new]
pub(crate) fn builtin_swap_vals(registry: &Registry, args: &[LarchVal]) -> Result<LarchVal> {
    match swap_target(registry, "swap-vals!", args) {
        Ok(atom) => {
            let (old, new) = swap_with(atom, &args[1], &args[2..])?;
            Ok(LarchVal::vector(vec![old, new]))
        }
        Err(failure) => Ok(failure),
    }
}

// ============================================================================
// Options
// ============================================================================

/// (get-validator atom)
pub(crate) fn builtin_get_validator(registry: &Registry, args: &[LarchVal]) -> Result<LarchVal> {
    match expect_atom(registry, "get-validator", 1, args) {
        Ok(atom) => Ok(atom.validator().cloned().unwrap_or(LarchVal::Nil)),
        Err(failure) => Ok(failure),
    }
}

/// (meta x) - metadata given at atom creation; nil for everything else
pub(crate) fn builtin_meta(registry: &Registry, args: &[LarchVal]) -> Result<LarchVal> {
    if args.len() != 1 {
        return Ok(registry.reject(format!(
            "meta: expected 1 argument, got {}",
            args.len()
        )));
    }
    match &args[0] {
        LarchVal::Atom(a) => Ok(a.meta().cloned().unwrap_or(LarchVal::Nil)),
        _ => Ok(LarchVal::Nil),
    }
}
