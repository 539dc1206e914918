// larch-core - Record special forms
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Record special forms: defrecord

use std::sync::Arc;

use larch_parser::{Keyword, LarchVal, RecordDef, RecordInstance, Symbol, TypeTag};
use tracing::debug;

use crate::env::Env;
use crate::error::Result;
use crate::registry::Registry;

use super::make_native_fn;
use super::protocols::extend_type_blocks;

// ============================================================================
// Record Special Forms
// ============================================================================

/// (defrecord RecordName [field1 field2 ...]
///   ProtocolName
///   (method-name [this arg] body)
///   ...)
///
/// Binds `RecordName`, `RecordName.`, `->RecordName`, `map->RecordName`,
/// `RecordName?` and one `.-field` accessor per field.
pub(crate) fn eval_defrecord(args: &[LarchVal], env: &Env) -> Result<LarchVal> {
    let registry = env.registry();

    let name = match args.first() {
        Some(LarchVal::Symbol(s)) => s.clone(),
        Some(other) => {
            return Ok(registry.reject(format!(
                "defrecord: name must be a symbol, got {}",
                other.type_name()
            )));
        }
        None => return Ok(registry.reject("defrecord: requires a name")),
    };

    let fields: Vec<Symbol> = match args.get(1) {
        Some(LarchVal::Vector(items)) => {
            let mut fields = Vec::with_capacity(items.len());
            for item in items.iter() {
                match item {
                    LarchVal::Symbol(s) => fields.push(s.clone()),
                    other => {
                        return Ok(registry.reject(format!(
                            "defrecord {}: field must be a symbol, got {}",
                            name,
                            other.type_name()
                        )));
                    }
                }
            }
            fields
        }
        Some(other) => {
            return Ok(registry.reject(format!(
                "defrecord {}: fields must be a vector, got {}",
                name,
                other.type_name()
            )));
        }
        None => {
            return Ok(registry.reject(format!("defrecord {}: requires a field vector", name)));
        }
    };

    let def = registry.define_record(RecordDef::new(name.clone(), fields));

    let constructor = positional_constructor(&def, registry.clone());
    env.define_global(name.clone(), constructor.clone());
    env.define_global(Symbol::new(&format!("{}.", name)), constructor);
    env.define_global(
        Symbol::new(&format!("->{}", name)),
        strict_constructor(&def, registry.clone()),
    );
    env.define_global(
        Symbol::new(&format!("map->{}", name)),
        map_constructor(&def, registry.clone()),
    );
    env.define_global(Symbol::new(&format!("{}?", name)), predicate(&def));

    for field in &def.fields {
        env.define_global(
            Symbol::new(&format!(".-{}", field)),
            dot_accessor(field, registry.clone()),
        );
    }

    // Inline protocol implementations
    extend_type_blocks(&TypeTag::Record(name.clone()), &args[2..], env)?;

    debug!(target: "larch", record = %name, fields = def.arity(), "defined record");
    Ok(LarchVal::Symbol(name))
}

// ============================================================================
// Generated functions
// ============================================================================

/// `Name` and `Name.`: missing trailing fields are `nil`.
fn positional_constructor(def: &Arc<RecordDef>, registry: Registry) -> LarchVal {
    let def = Arc::clone(def);
    let name = def.name.to_string();
    LarchVal::NativeFn(make_native_fn(name, move |args: &[LarchVal]| {
        if args.len() > def.arity() {
            return Ok(registry.soft_fail(format!(
                "{}: expected at most {} arguments, got {}",
                def.name,
                def.arity(),
                args.len()
            )));
        }
        Ok(LarchVal::record(RecordInstance::positional(
            Arc::clone(&def),
            args.to_vec(),
        )))
    }))
}

/// `->Name`: exactly one argument per field.
fn strict_constructor(def: &Arc<RecordDef>, registry: Registry) -> LarchVal {
    let def = Arc::clone(def);
    let name = format!("->{}", def.name);
    LarchVal::NativeFn(make_native_fn(name, move |args: &[LarchVal]| {
        if args.len() != def.arity() {
            return Ok(registry.soft_fail(format!(
                "->{}: expected {} arguments, got {}",
                def.name,
                def.arity(),
                args.len()
            )));
        }
        Ok(LarchVal::record(RecordInstance::positional(
            Arc::clone(&def),
            args.to_vec(),
        )))
    }))
}

/// `map->Name`: keeps every source entry and fills absent fields with `nil`.
fn map_constructor(def: &Arc<RecordDef>, registry: Registry) -> LarchVal {
    let def = Arc::clone(def);
    let name = format!("map->{}", def.name);
    LarchVal::NativeFn(make_native_fn(name, move |args: &[LarchVal]| {
        if args.len() != 1 {
            return Ok(registry.soft_fail(format!(
                "map->{}: expected 1 argument, got {}",
                def.name,
                args.len()
            )));
        }
        let entries = match &args[0] {
            LarchVal::Map(m) => m.clone(),
            LarchVal::Record(r) => r.to_map(),
            LarchVal::Nil => Default::default(),
            other => {
                return Ok(registry.soft_fail(format!(
                    "map->{}: expected a map, got {}",
                    def.name,
                    other.type_name()
                )));
            }
        };
        Ok(LarchVal::record(RecordInstance::from_entries(
            Arc::clone(&def),
            entries,
        )))
    }))
}

/// `Name?`: compares the instance's own type identity, ignoring any `:type`
/// entry.
fn predicate(def: &Arc<RecordDef>) -> LarchVal {
    let name = def.name.clone();
    LarchVal::NativeFn(make_native_fn(
        format!("{}?", name),
        move |args: &[LarchVal]| {
            Ok(LarchVal::bool(matches!(
                args.first(),
                Some(LarchVal::Record(r)) if *r.record_type() == name
            )))
        },
    ))
}

/// `.-field`: `(.-field x default?)` on a record or a plain map.
fn dot_accessor(field: &Symbol, registry: Registry) -> LarchVal {
    let keyword = LarchVal::Keyword(Keyword::from(field));
    let symbol = LarchVal::Symbol(field.clone());
    let name = format!(".-{}", field);
    LarchVal::NativeFn(make_native_fn(name.clone(), move |args: &[LarchVal]| {
        if args.is_empty() || args.len() > 2 {
            return Ok(registry.soft_fail(format!(
                "{}: expected 1 or 2 arguments, got {}",
                name,
                args.len()
            )));
        }
        let found = match &args[0] {
            LarchVal::Record(r) => r.get(&keyword).cloned(),
            LarchVal::Map(m) => m.get(&keyword).or_else(|| m.get(&symbol)).cloned(),
            other => {
                return Ok(registry.soft_fail(format!(
                    "{}: expected a record or map, got {}",
                    name,
                    other.type_name()
                )));
            }
        };
        Ok(found.unwrap_or_else(|| args.get(1).cloned().unwrap_or(LarchVal::Nil)))
    }))
}
