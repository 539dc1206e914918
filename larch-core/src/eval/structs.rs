// larch-core - Struct special forms
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Struct special forms: defstruct, struct, struct-map, accessor
//!
//! Struct instances are plain maps. The registry keeps only each struct's
//! field order.

use std::sync::Arc;

use larch_parser::{LarchVal, StructDef, Symbol, normalize_key};
use tracing::debug;

use crate::env::Env;
use crate::error::Result;
use crate::registry::Registry;

use super::{apply, eval, make_native_fn};

/// (defstruct Name field...)
pub(crate) fn eval_defstruct(args: &[LarchVal], env: &Env) -> Result<LarchVal> {
    let registry = env.registry();

    let name = match args.first() {
        Some(LarchVal::Symbol(s)) => s.clone(),
        Some(other) => {
            return Ok(registry.reject(format!(
                "defstruct: name must be a symbol, got {}",
                other.type_name()
            )));
        }
        None => return Ok(registry.reject("defstruct: requires a name")),
    };

    let mut fields = Vec::with_capacity(args.len() - 1);
    for field in &args[1..] {
        match field {
            LarchVal::Symbol(_) | LarchVal::Keyword(_) => fields.push(field.clone()),
            other => {
                return Ok(registry.reject(format!(
                    "defstruct {}: field must be a symbol or keyword, got {}",
                    name,
                    other.type_name()
                )));
            }
        }
    }

    let def = registry.define_struct(StructDef::new(name.clone(), fields));
    env.define_global(name.clone(), struct_constructor(&def, registry.clone()));

    debug!(target: "larch", name = %name, fields = def.fields.len(), "defined struct");
    Ok(LarchVal::Symbol(name))
}

/// Positional constructor bound under the struct's name.
fn struct_constructor(def: &Arc<StructDef>, registry: Registry) -> LarchVal {
    let def = Arc::clone(def);
    let name = def.name.to_string();
    LarchVal::NativeFn(make_native_fn(name, move |args: &[LarchVal]| {
        if args.len() > def.fields.len() {
            return Ok(registry.soft_fail(format!(
                "{}: expected at most {} arguments, got {}",
                def.name,
                def.fields.len(),
                args.len()
            )));
        }
        Ok(def.instantiate(args))
    }))
}

/// (struct Name value...)
pub(crate) fn eval_struct(args: &[LarchVal], env: &Env) -> Result<LarchVal> {
    let registry = env.registry();

    let Some(target) = args.first() else {
        return Ok(registry.reject("struct: requires a struct name"));
    };

    let constructor = match target {
        LarchVal::Symbol(sym) => env.try_lookup(sym),
        form => match eval(form, env)? {
            LarchVal::Symbol(sym) => env.try_lookup(&sym),
            other => Some(other),
        },
    };

    let constructor = match constructor {
        Some(f @ (LarchVal::Fn(_) | LarchVal::NativeFn(_))) => f,
        Some(other) => {
            return Ok(registry.reject(format!("struct: {} is not callable", other)));
        }
        None => {
            return Ok(registry.reject(format!("struct: unable to resolve {}", target)));
        }
    };

    let values: Result<Vec<_>> = args[1..].iter().map(|e| eval(e, env)).collect();
    apply(&constructor, &values?)
}

/// (struct-map Name key value...)
///
/// Pairs may come in any order; the result equals the positional constructor
/// called with the values in declared order.
pub(crate) fn eval_struct_map(args: &[LarchVal], env: &Env) -> Result<LarchVal> {
    let registry = env.registry();

    let Some(target) = args.first() else {
        return Ok(registry.reject("struct-map: requires a struct name"));
    };
    let pairs = &args[1..];
    if pairs.len() % 2 != 0 {
        return Ok(registry.reject(format!(
            "struct-map {}: requires an even number of key/value forms",
            target
        )));
    }
    let Some(def) = resolve_struct(target, env)? else {
        return Ok(registry.reject(format!("struct-map: no struct named {}", target)));
    };

    let mut values = vec![LarchVal::Nil; def.fields.len()];
    for pair in pairs.chunks(2) {
        let key = eval(&pair[0], env)?;
        let value = eval(&pair[1], env)?;
        match def.position(&key) {
            Some(i) => values[i] = value,
            None => registry.diagnostics().warn(format!(
                "struct-map {}: {} is not a field, dropped",
                def.name, key
            )),
        }
    }

    Ok(def.instantiate(&values))
}

/// (accessor Name key)
pub(crate) fn eval_accessor(args: &[LarchVal], env: &Env) -> Result<LarchVal> {
    let registry = env.registry();

    if args.len() != 2 {
        return Ok(registry.reject(format!(
            "accessor: expected a struct name and a key, got {} arguments",
            args.len()
        )));
    }
    let Some(def) = resolve_struct(&args[0], env)? else {
        return Ok(registry.reject(format!("accessor: no struct named {}", args[0])));
    };

    let key = normalize_key(&eval(&args[1], env)?);
    if def.position(&key).is_none() {
        return Ok(registry.reject(format!(
            "accessor: {} is not a field of struct {}",
            key, def.name
        )));
    }

    let registry = registry.clone();
    let name = format!("accessor {}", key);
    Ok(LarchVal::NativeFn(make_native_fn(
        name.clone(),
        move |args: &[LarchVal]| {
            if args.len() != 1 {
                return Ok(registry.soft_fail(format!(
                    "{}: expected 1 argument, got {}",
                    name,
                    args.len()
                )));
            }
            match &args[0] {
                LarchVal::Map(m) => Ok(m.get(&key).cloned().unwrap_or(LarchVal::Nil)),
                LarchVal::Record(r) => Ok(r.get(&key).cloned().unwrap_or(LarchVal::Nil)),
                LarchVal::Nil => Ok(LarchVal::Nil),
                other => Ok(registry.soft_fail(format!(
                    "{}: expected a map, got {}",
                    name,
                    other.type_name()
                ))),
            }
        },
    )))
}

/// Find a struct definition from a name symbol, or from a form evaluating to
/// a name or to the struct's constructor.
fn resolve_struct(form: &LarchVal, env: &Env) -> Result<Option<Arc<StructDef>>> {
    let registry = env.registry();
    let name = match form {
        LarchVal::Symbol(sym) => sym.clone(),
        other => match eval(other, env)? {
            LarchVal::Symbol(sym) => sym,
            LarchVal::Keyword(kw) => Symbol::from(&kw),
            LarchVal::NativeFn(f) => Symbol::parse(f.name()),
            _ => return Ok(None),
        },
    };
    Ok(registry.struct_def(&name))
}
