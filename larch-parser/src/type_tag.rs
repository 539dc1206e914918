// larch-parser - Type tags for protocol dispatch
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Type tags classify runtime values for protocol dispatch.
//!
//! Dispatch is a single exact-match lookup on the tag of the first argument:
//! there is no hierarchy and no default fallback.

use std::fmt;

use crate::keyword::Keyword;
use crate::symbol::Symbol;
use crate::value::LarchVal;

/// Dispatch key for a runtime value.
///
/// Coarser than `LarchVal` itself: native and user functions share `Fn`,
/// every instance of a record type shares `Record(name)`.
#[derive(Clone, Debug, Hash, Eq, PartialEq)]
pub enum TypeTag {
    Nil,
    Bool,
    Int,
    Float,
    String,
    Symbol,
    Keyword,
    List,
    LazySeq,
    Vector,
    Map,
    Set,
    Fn,
    Atom,
    /// A user-defined record type, by name.
    Record(Symbol),
    /// Anything without a dedicated tag, by its runtime type name.
    Other(&'static str),
}

impl TypeTag {
    /// The tag as a symbol, as returned by `(type x)`.
    pub fn to_symbol(&self) -> Symbol {
        match self {
            TypeTag::Record(name) => name.clone(),
            other => Symbol::new(&other.to_string()),
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TypeTag::Nil => "nil",
            TypeTag::Bool => "Boolean",
            TypeTag::Int => "Long",
            TypeTag::Float => "Double",
            TypeTag::String => "String",
            TypeTag::Symbol => "Symbol",
            TypeTag::Keyword => "Keyword",
            TypeTag::List => "List",
            TypeTag::LazySeq => "LazySeq",
            TypeTag::Vector => "Vector",
            TypeTag::Map => "Map",
            TypeTag::Set => "Set",
            TypeTag::Fn => "Fn",
            TypeTag::Atom => "Atom",
            TypeTag::Record(name) => return write!(f, "{}", name),
            TypeTag::Other(name) => name,
        };
        f.write_str(name)
    }
}

impl LarchVal {
    /// Resolve the dispatch tag of this value. Pure.
    pub fn type_tag(&self) -> TypeTag {
        match self {
            LarchVal::Nil => TypeTag::Nil,
            LarchVal::Bool(_) => TypeTag::Bool,
            LarchVal::Int(_) => TypeTag::Int,
            LarchVal::Float(_) => TypeTag::Float,
            LarchVal::String(_) => TypeTag::String,
            LarchVal::Symbol(_) => TypeTag::Symbol,
            LarchVal::Keyword(_) => TypeTag::Keyword,
            LarchVal::List(_) => TypeTag::List,
            LarchVal::LazySeq(_) => TypeTag::LazySeq,
            LarchVal::Vector(_) => TypeTag::Vector,
            LarchVal::Map(_) => TypeTag::Map,
            LarchVal::Set(_) => TypeTag::Set,
            LarchVal::Fn(_) | LarchVal::NativeFn(_) => TypeTag::Fn,
            LarchVal::Atom(_) => TypeTag::Atom,
            LarchVal::Record(r) => {
                TypeTag::Record(r.type_override().unwrap_or_else(|| r.record_type().clone()))
            }
            other => TypeTag::Other(other.type_name()),
        }
    }
}

/// Map a type-spec symbol from `extend-protocol`/`extend-type` to its tag.
///
/// Unrecognised names are taken to be record types.
pub fn symbol_to_type_tag(sym: &Symbol) -> TypeTag {
    if sym.has_namespace() {
        return TypeTag::Record(sym.clone());
    }
    match sym.name() {
        "nil" => TypeTag::Nil,
        "Boolean" | "Bool" => TypeTag::Bool,
        "Integer" | "Long" | "Int" => TypeTag::Int,
        "Float" | "Double" => TypeTag::Float,
        "String" => TypeTag::String,
        "Symbol" => TypeTag::Symbol,
        "Keyword" => TypeTag::Keyword,
        "List" | "PersistentList" => TypeTag::List,
        "LazySeq" => TypeTag::LazySeq,
        "Vector" | "PersistentVector" => TypeTag::Vector,
        "Map" | "HashMap" | "PersistentHashMap" | "PersistentArrayMap" => TypeTag::Map,
        "Set" | "HashSet" | "PersistentHashSet" => TypeTag::Set,
        "Fn" | "Function" | "IFn" => TypeTag::Fn,
        "Atom" => TypeTag::Atom,
        _ => TypeTag::Record(sym.clone()),
    }
}

/// Map any type-spec form to a tag: the `nil` literal, a symbol, or a
/// keyword naming a record type.
pub fn form_to_type_tag(form: &LarchVal) -> Option<TypeTag> {
    match form {
        LarchVal::Nil => Some(TypeTag::Nil),
        LarchVal::Symbol(sym) => Some(symbol_to_type_tag(sym)),
        LarchVal::Keyword(kw) => Some(symbol_to_type_tag(&Symbol::from(kw))),
        _ => None,
    }
}

/// Read a type name out of a `:type` entry.
pub(crate) fn type_name_to_symbol(value: &LarchVal) -> Option<Symbol> {
    match value {
        LarchVal::Symbol(sym) => Some(sym.clone()),
        LarchVal::Keyword(kw) => Some(Symbol::from(kw)),
        LarchVal::String(s) => Some(Symbol::parse(s)),
        _ => None,
    }
}

/// The reserved `:type` key consulted by [`LarchVal::type_tag`].
pub(crate) fn type_key() -> LarchVal {
    LarchVal::Keyword(Keyword::new("type"))
}
