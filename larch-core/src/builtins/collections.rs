// larch-core - Collection built-in functions
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Collection operations: list, vector, hash-map, hash-set, get, assoc,
//! dissoc, contains?, count, keys, vals
//!
//! Records behave as maps throughout. `assoc` keeps a record a record;
//! `dissoc` of a declared field turns it into a plain map.

use larch_parser::LarchVal;

use crate::error::{Error, Result};

use super::{lookup, to_seq};

// ============================================================================
// Constructors
// ============================================================================

pub(crate) fn builtin_list(args: &[LarchVal]) -> Result<LarchVal> {
    Ok(LarchVal::list(args.to_vec()))
}

pub(crate) fn builtin_vector(args: &[LarchVal]) -> Result<LarchVal> {
    Ok(LarchVal::vector(args.to_vec()))
}

pub(crate) fn builtin_hash_map(args: &[LarchVal]) -> Result<LarchVal> {
    if args.len() % 2 != 0 {
        return Err(Error::EvalError(
            "hash-map requires an even number of arguments".into(),
        ));
    }
    Ok(LarchVal::map(
        args.chunks(2)
            .map(|pair| (pair[0].clone(), pair[1].clone()))
            .collect(),
    ))
}

pub(crate) fn builtin_hash_set(args: &[LarchVal]) -> Result<LarchVal> {
    Ok(LarchVal::set(args.to_vec()))
}

// ============================================================================
// Keyed access
// ============================================================================

/// (get coll key not-found?)
pub(crate) fn builtin_get(args: &[LarchVal]) -> Result<LarchVal> {
    if args.len() < 2 || args.len() > 3 {
        return Err(Error::arity_range("get", 2, 3, args.len()));
    }
    let not_found = args.get(2).cloned().unwrap_or(LarchVal::Nil);
    Ok(lookup(&args[0], &args[1]).unwrap_or(not_found))
}

/// (assoc coll key val & kvs)
pub(crate) fn builtin_assoc(args: &[LarchVal]) -> Result<LarchVal> {
    if args.len() < 3 || (args.len() - 1) % 2 != 0 {
        return Err(Error::syntax("assoc", "requires coll and key-value pairs"));
    }

    let pairs = args[1..].chunks(2);
    match &args[0] {
        LarchVal::Nil => Ok(LarchVal::map(
            pairs.map(|p| (p[0].clone(), p[1].clone())).collect(),
        )),
        LarchVal::Map(map) => {
            let mut new_map = map.clone();
            for pair in pairs {
                new_map.insert(pair[0].clone(), pair[1].clone());
            }
            Ok(LarchVal::Map(new_map))
        }
        LarchVal::Record(r) => {
            let mut record = (**r).clone();
            for pair in pairs {
                record = record.assoc(&pair[0], pair[1].clone());
            }
            Ok(LarchVal::record(record))
        }
        LarchVal::Vector(items) => {
            let mut new_vec = items.clone();
            for pair in pairs {
                match &pair[0] {
                    LarchVal::Int(i) if *i >= 0 && (*i as usize) < new_vec.len() => {
                        new_vec.set(*i as usize, pair[1].clone());
                    }
                    LarchVal::Int(i) if *i >= 0 && (*i as usize) == new_vec.len() => {
                        new_vec.push_back(pair[1].clone());
                    }
                    LarchVal::Int(i) => {
                        return Err(Error::EvalError(format!(
                            "Index {} out of bounds for vector of length {}",
                            i,
                            new_vec.len()
                        )));
                    }
                    other => {
                        return Err(Error::type_error_in("assoc", "integer", other.type_name()));
                    }
                }
            }
            Ok(LarchVal::Vector(new_vec))
        }
        other => Err(Error::type_error_in("assoc", "map or vector", other.type_name())),
    }
}

/// (dissoc map & keys)
pub(crate) fn builtin_dissoc(args: &[LarchVal]) -> Result<LarchVal> {
    if args.is_empty() {
        return Err(Error::arity_at_least("dissoc", 1, 0));
    }

    let mut current = args[0].clone();
    for key in &args[1..] {
        current = match &current {
            LarchVal::Nil => LarchVal::Nil,
            LarchVal::Map(map) => LarchVal::Map(map.without(key)),
            LarchVal::Record(r) => r.dissoc(key),
            other => {
                return Err(Error::type_error_in("dissoc", "map", other.type_name()));
            }
        };
    }
    Ok(current)
}

/// (contains? coll key)
pub(crate) fn builtin_contains_p(args: &[LarchVal]) -> Result<LarchVal> {
    if args.len() != 2 {
        return Err(Error::arity_named("contains?", 2, args.len()));
    }
    let key = &args[1];
    let found = match &args[0] {
        LarchVal::Nil => false,
        LarchVal::Map(map) => map.contains_key(key),
        LarchVal::Record(r) => r.contains_key(key),
        LarchVal::Set(set) => set.contains(key),
        LarchVal::Vector(items) => {
            matches!(key, LarchVal::Int(i) if *i >= 0 && (*i as usize) < items.len())
        }
        LarchVal::Protocol(_) => lookup(&args[0], key).is_some(),
        other => {
            return Err(Error::type_error_in(
                "contains?",
                "collection",
                other.type_name(),
            ));
        }
    };
    Ok(LarchVal::bool(found))
}

/// (count coll)
pub(crate) fn builtin_count(args: &[LarchVal]) -> Result<LarchVal> {
    if args.len() != 1 {
        return Err(Error::arity_named("count", 1, args.len()));
    }
    let n = match &args[0] {
        LarchVal::Nil => 0,
        LarchVal::List(items) | LarchVal::Vector(items) => items.len(),
        LarchVal::Map(map) => map.len(),
        LarchVal::Set(set) => set.len(),
        LarchVal::Record(r) => r.len(),
        LarchVal::String(s) => s.chars().count(),
        other @ LarchVal::LazySeq(_) => to_seq(other)?.len(),
        other => {
            return Err(Error::type_error_in("count", "collection", other.type_name()));
        }
    };
    Ok(LarchVal::int(n as i64))
}

fn map_entries(name: &str, coll: &LarchVal) -> Result<Vec<(LarchVal, LarchVal)>> {
    match coll {
        LarchVal::Nil => Ok(Vec::new()),
        LarchVal::Map(map) => Ok(map.iter().map(|(k, v)| (k.clone(), v.clone())).collect()),
        LarchVal::Record(r) => Ok(r.ordered_entries()),
        other => Err(Error::type_error_in(name, "map", other.type_name())),
    }
}

fn seq_or_nil(items: Vec<LarchVal>) -> LarchVal {
    if items.is_empty() {
        LarchVal::Nil
    } else {
        LarchVal::list(items)
    }
}

/// (keys map) - record keys come declared fields first
pub(crate) fn builtin_keys(args: &[LarchVal]) -> Result<LarchVal> {
    if args.len() != 1 {
        return Err(Error::arity_named("keys", 1, args.len()));
    }
    let entries = map_entries("keys", &args[0])?;
    Ok(seq_or_nil(entries.into_iter().map(|(k, _)| k).collect()))
}

/// (vals map)
pub(crate) fn builtin_vals(args: &[LarchVal]) -> Result<LarchVal> {
    if args.len() != 1 {
        return Err(Error::arity_named("vals", 1, args.len()));
    }
    let entries = map_entries("vals", &args[0])?;
    Ok(seq_or_nil(entries.into_iter().map(|(_, v)| v).collect()))
}
