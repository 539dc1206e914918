// larch-core - Protocol special forms
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Protocol special forms: defprotocol, extend-protocol, extend-type, extend
//!
//! Malformed input never aborts evaluation here. It is reported through the
//! registry's diagnostics and answered with `nil` (a soft failure) or an
//! error value (a hard rejection).

use std::sync::Arc;

use larch_parser::{
    Keyword, LarchProtocol, LarchVal, MethodSignature, Protocol, Symbol, TypeTag,
    form_to_type_tag,
};
use tracing::{debug, trace};

use crate::env::Env;
use crate::error::Result;
use crate::registry::Registry;

use super::{apply, eval, make_native_fn};

// ============================================================================
// defprotocol
// ============================================================================

/// (defprotocol Name
///   "Optional docstring"
///   (method-name [this arg1 arg2] "Method docstring")
///   (other-method [this] [this x] "Multiple arities"))
pub(crate) fn eval_defprotocol(args: &[LarchVal], env: &Env) -> Result<LarchVal> {
    let registry = env.registry();

    let name = match args.first() {
        Some(LarchVal::Symbol(s)) => s.clone(),
        Some(other) => {
            return Ok(registry.soft_fail(format!(
                "defprotocol: name must be a symbol, got {}",
                other.type_name()
            )));
        }
        None => return Ok(registry.soft_fail("defprotocol: requires a name")),
    };

    let mut specs = &args[1..];
    let doc = match specs.first() {
        Some(LarchVal::String(s)) => {
            specs = &specs[1..];
            Some(s.to_string())
        }
        _ => None,
    };

    let mut signatures = Vec::with_capacity(specs.len());
    for spec in specs {
        match parse_method_signature(&name, spec) {
            Ok(sig) => signatures.push(sig),
            Err(message) => return Ok(registry.soft_fail(message)),
        }
    }

    let protocol = Arc::new(Protocol::new(name.clone(), doc, signatures));
    registry.register_protocol(Arc::clone(&protocol));

    for sig in protocol.methods() {
        let dispatcher = make_dispatcher(&protocol, sig.name.clone(), registry.clone());
        env.define_global(sig.name.clone(), dispatcher);
    }
    env.define_global(
        name.clone(),
        LarchVal::Protocol(LarchProtocol(Arc::clone(&protocol))),
    );

    debug!(
        target: "larch",
        protocol = %name,
        methods = protocol.methods().count(),
        "defined protocol"
    );
    Ok(LarchVal::Symbol(name))
}

/// Parse `(method-name [this ...]+ "doc"?)`.
fn parse_method_signature(
    protocol: &Symbol,
    spec: &LarchVal,
) -> std::result::Result<MethodSignature, String> {
    let items: Vec<LarchVal> = match spec {
        LarchVal::List(items) => items.iter().cloned().collect(),
        other => {
            return Err(format!(
                "defprotocol {}: method signature must be a list, got {}",
                protocol,
                other.type_name()
            ));
        }
    };

    let method_name = match items.first() {
        Some(LarchVal::Symbol(s)) => s.clone(),
        Some(other) => {
            return Err(format!(
                "defprotocol {}: method name must be a symbol, got {}",
                protocol,
                other.type_name()
            ));
        }
        None => {
            return Err(format!(
                "defprotocol {}: method signature cannot be empty",
                protocol
            ));
        }
    };

    let mut arglists = Vec::new();
    let mut doc = None;
    for item in &items[1..] {
        match item {
            LarchVal::Vector(params) => {
                if params.is_empty() {
                    return Err(format!(
                        "defprotocol {}: method {} needs a receiver parameter",
                        protocol, method_name
                    ));
                }
                let mut arglist = Vec::with_capacity(params.len());
                for param in params.iter() {
                    match param {
                        LarchVal::Symbol(s) => arglist.push(s.clone()),
                        other => {
                            return Err(format!(
                                "defprotocol {}: parameters of {} must be symbols, got {}",
                                protocol,
                                method_name,
                                other.type_name()
                            ));
                        }
                    }
                }
                arglists.push(arglist);
            }
            LarchVal::String(s) => doc = Some(s.to_string()),
            _ => {}
        }
    }

    if arglists.is_empty() {
        return Err(format!(
            "defprotocol {}: method {} requires an argument vector",
            protocol, method_name
        ));
    }

    Ok(MethodSignature {
        name: method_name,
        arglists,
        doc,
    })
}

/// Create the dispatcher bound under a protocol method's name.
///
/// The dispatcher holds the protocol itself, not a snapshot of its
/// implementation tables.
fn make_dispatcher(protocol: &Arc<Protocol>, method: Symbol, registry: Registry) -> LarchVal {
    let proto = Arc::clone(protocol);
    let name = method.clone();

    let dispatch_fn = move |args: &[LarchVal]| -> Result<LarchVal> {
        let Some(receiver) = args.first() else {
            return Ok(registry.soft_fail(format!(
                "Protocol method {} of {} called with no arguments",
                name, proto.name
            )));
        };

        let tag = receiver.type_tag();
        trace!(target: "larch", protocol = %proto.name, method = %name, tag = %tag, "dispatch");

        let Some(table) = proto.impls_for(&tag) else {
            return Ok(registry.soft_fail(format!(
                "No implementation of protocol {} for type {}",
                proto.name, tag
            )));
        };
        let Some(method_fn) = table.get(&name) else {
            return Ok(registry.soft_fail(format!(
                "No implementation of method {} for type {} in protocol {}",
                name, tag, proto.name
            )));
        };

        apply(method_fn, args)
    };

    LarchVal::NativeFn(make_native_fn(method.to_string(), dispatch_fn))
}

// ============================================================================
// Extension
// ============================================================================

/// Resolve a protocol argument: a symbol naming a protocol, or any form that
/// evaluates to one.
fn resolve_protocol(form: &LarchVal, env: &Env) -> Result<Option<Arc<Protocol>>> {
    let value = match form {
        LarchVal::Symbol(sym) => match env.try_lookup(sym) {
            Some(value) => value,
            None => return Ok(env.registry().protocol(sym)),
        },
        other => eval(other, env)?,
    };
    Ok(match value {
        LarchVal::Protocol(p) => Some(Arc::clone(p.protocol())),
        LarchVal::Symbol(sym) => env.registry().protocol(&sym),
        _ => None,
    })
}

/// True for `(name [params] body...)`.
fn is_method_impl(form: &LarchVal) -> bool {
    match form {
        LarchVal::List(items) => matches!(items.front(), Some(LarchVal::Symbol(_))),
        _ => false,
    }
}

/// Split `head impl... head impl...` into groups. A head is any form that is
/// not a method implementation.
fn group_by_head(args: &[LarchVal]) -> Vec<(&LarchVal, &[LarchVal])> {
    let mut groups = Vec::new();
    let mut i = 0;
    while i < args.len() {
        let head = &args[i];
        let start = i + 1;
        let mut end = start;
        while end < args.len() && is_method_impl(&args[end]) {
            end += 1;
        }
        groups.push((head, &args[start..end]));
        i = end;
    }
    groups
}

/// Turn `(method [params] body...)` into `(method, fn)`, or warn and skip.
fn build_method(protocol: &Protocol, form: &LarchVal, env: &Env) -> Result<Option<(Symbol, LarchVal)>> {
    let registry = env.registry();
    let items: Vec<LarchVal> = match form {
        LarchVal::List(items) => items.iter().cloned().collect(),
        _ => return Ok(None),
    };
    let method = match items.first() {
        Some(LarchVal::Symbol(s)) => s.clone(),
        _ => return Ok(None),
    };

    if !protocol.has_method(&method) {
        registry.diagnostics().warn(format!(
            "Method {} is not part of protocol {}",
            method, protocol.name
        ));
        return Ok(None);
    }

    if !matches!(items.get(1), Some(LarchVal::Vector(_))) {
        registry.diagnostics().warn(format!(
            "Implementation of {} in protocol {} needs a parameter vector",
            method, protocol.name
        ));
        return Ok(None);
    }

    let fn_form = LarchVal::list(
        std::iter::once(LarchVal::Symbol(Symbol::new("fn")))
            .chain(items[1..].iter().cloned())
            .collect(),
    );
    let method_fn = eval(&fn_form, env)?;
    Ok(Some((method, method_fn)))
}

/// Merge the given method implementations into `protocol` for `tag`.
fn install_impls(protocol: &Protocol, tag: TypeTag, impls: &[LarchVal], env: &Env) -> Result<()> {
    let mut additions = Vec::with_capacity(impls.len());
    for form in impls {
        if let Some(pair) = build_method(protocol, form, env)? {
            additions.push(pair);
        }
    }

    let count = additions.len();
    let rejected = protocol.extend(tag.clone(), additions);
    for name in rejected {
        env.registry().diagnostics().warn(format!(
            "Method {} is not part of protocol {}",
            name, protocol.name
        ));
    }

    debug!(target: "larch", protocol = %protocol.name, tag = %tag, methods = count, "extended protocol");
    Ok(())
}

/// (extend-protocol Protocol
///   TypeA
///   (method [this] ...)
///   TypeB
///   (method [this] ...))
pub(crate) fn eval_extend_protocol(args: &[LarchVal], env: &Env) -> Result<LarchVal> {
    let registry = env.registry();

    let Some(proto_form) = args.first() else {
        return Ok(registry.reject("extend-protocol: requires a protocol"));
    };
    let Some(protocol) = resolve_protocol(proto_form, env)? else {
        return Ok(registry.reject(format!(
            "extend-protocol: {} is not a protocol",
            proto_form
        )));
    };

    for (type_spec, impls) in group_by_head(&args[1..]) {
        match form_to_type_tag(type_spec) {
            Some(tag) => install_impls(&protocol, tag, impls, env)?,
            None => registry.diagnostics().warn(format!(
                "extend-protocol {}: expected a type, got {}",
                protocol.name, type_spec
            )),
        }
    }

    Ok(LarchVal::Protocol(LarchProtocol(protocol)))
}

/// (extend-type Type
///   ProtocolA
///   (method [this] ...)
///   ProtocolB
///   (method [this] ...))
pub(crate) fn eval_extend_type(args: &[LarchVal], env: &Env) -> Result<LarchVal> {
    let registry = env.registry();

    let Some(type_spec) = args.first() else {
        return Ok(registry.reject("extend-type: requires a type"));
    };
    let Some(tag) = form_to_type_tag(type_spec) else {
        return Ok(registry.reject(format!(
            "extend-type: expected a type, got {}",
            type_spec
        )));
    };

    extend_type_blocks(&tag, &args[1..], env)?;
    Ok(type_spec.clone())
}

/// Install `Protocol impl...` blocks for a single tag. Blocks whose head is
/// not a protocol are warned about and skipped.
pub(crate) fn extend_type_blocks(tag: &TypeTag, blocks: &[LarchVal], env: &Env) -> Result<()> {
    for (proto_form, impls) in group_by_head(blocks) {
        match resolve_protocol(proto_form, env)? {
            Some(protocol) => install_impls(&protocol, tag.clone(), impls, env)?,
            None => env.registry().diagnostics().warn(format!(
                "extend-type {}: {} is not a protocol",
                tag, proto_form
            )),
        }
    }
    Ok(())
}

/// (extend Type
///   Protocol {:method-name fn, ...}
///   Protocol2 {:method-name fn, ...})
///
/// Map-based extension with already-built functions.
pub(crate) fn eval_extend(args: &[LarchVal], env: &Env) -> Result<LarchVal> {
    let registry = env.registry();

    let Some(type_spec) = args.first() else {
        return Ok(registry.reject("extend: requires a type"));
    };
    let Some(tag) = form_to_type_tag(type_spec) else {
        return Ok(registry.reject(format!("extend: expected a type, got {}", type_spec)));
    };

    let pairs = &args[1..];
    if pairs.len() % 2 != 0 {
        return Ok(registry.reject("extend: each protocol must be followed by a method map"));
    }

    for pair in pairs.chunks(2) {
        let Some(protocol) = resolve_protocol(&pair[0], env)? else {
            return Ok(registry.reject(format!("extend: {} is not a protocol", pair[0])));
        };

        let methods = match eval(&pair[1], env)? {
            LarchVal::Map(m) => m,
            other => {
                registry.diagnostics().warn(format!(
                    "extend {}: expected a method map, got {}",
                    protocol.name,
                    other.type_name()
                ));
                continue;
            }
        };

        let mut additions = Vec::with_capacity(methods.len());
        for (key, val) in methods.iter() {
            let method = match key {
                LarchVal::Keyword(k) => Symbol::from(k),
                LarchVal::Symbol(s) => s.clone(),
                LarchVal::String(s) => Symbol::parse(s),
                other => {
                    registry.diagnostics().warn(format!(
                        "extend {}: method key must be a keyword, symbol or string, got {}",
                        protocol.name, other
                    ));
                    continue;
                }
            };
            if !matches!(val, LarchVal::Fn(_) | LarchVal::NativeFn(_)) {
                registry.diagnostics().warn(format!(
                    "extend {}: implementation of {} must be a function, got {}",
                    protocol.name,
                    method,
                    val.type_name()
                ));
                continue;
            }
            additions.push((method, val.clone()));
        }

        for name in protocol.extend(tag.clone(), additions) {
            registry.diagnostics().warn(format!(
                "Method {} is not part of protocol {}",
                name, protocol.name
            ));
        }
        debug!(target: "larch", protocol = %protocol.name, tag = %tag, "extended protocol from map");
    }

    Ok(LarchVal::Nil)
}

// ============================================================================
// Protocols as lookup targets
// ============================================================================

/// Map-style view of a protocol: `:name`, `:doc`, `:methods` and `:type`.
pub(crate) fn protocol_entry(protocol: &Protocol, key: &LarchVal) -> Option<LarchVal> {
    let LarchVal::Keyword(kw) = key else {
        return None;
    };
    if kw.namespace().is_some() {
        return None;
    }
    match kw.name() {
        "name" => Some(LarchVal::Symbol(protocol.name.clone())),
        "doc" => Some(
            protocol
                .doc
                .as_deref()
                .map(LarchVal::string)
                .unwrap_or(LarchVal::Nil),
        ),
        "methods" => Some(LarchVal::vector(
            protocol
                .methods()
                .map(|sig| LarchVal::Symbol(sig.name.clone()))
                .collect(),
        )),
        "type" => Some(LarchVal::Keyword(Keyword::new("protocol"))),
        _ => None,
    }
}
