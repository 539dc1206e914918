// larch-parser - Protocol values
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Protocols: named method sets with per-type implementation tables.
//!
//! A protocol's method signatures are fixed at definition. Its implementation
//! tables only grow. Dispatchers hold an `Arc<Protocol>`, so an extension made
//! after a dispatcher was bound is visible through it.

use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use im::OrdMap;
use indexmap::IndexMap;
use parking_lot::RwLock;

use crate::symbol::Symbol;
use crate::type_tag::TypeTag;
use crate::value::LarchVal;

/// Method name to implementation, for one type.
pub type MethodTable = OrdMap<Symbol, LarchVal>;

/// A method signature in a protocol.
#[derive(Clone, Debug)]
pub struct MethodSignature {
    pub name: Symbol,
    /// One entry per arity. The first parameter is the dispatch receiver.
    pub arglists: Vec<Vec<Symbol>>,
    pub doc: Option<String>,
}

/// A protocol defining a set of methods that can be extended to types.
pub struct Protocol {
    pub name: Symbol,
    pub doc: Option<String>,
    methods: IndexMap<Symbol, MethodSignature>,
    impls: RwLock<HashMap<TypeTag, MethodTable>>,
}

impl Protocol {
    /// Create a protocol. A repeated method name replaces the earlier
    /// signature in place.
    pub fn new(name: Symbol, doc: Option<String>, signatures: Vec<MethodSignature>) -> Self {
        let mut methods = IndexMap::with_capacity(signatures.len());
        for sig in signatures {
            methods.insert(sig.name.clone(), sig);
        }
        Protocol {
            name,
            doc,
            methods,
            impls: RwLock::new(HashMap::new()),
        }
    }

    /// Method signatures in declaration order.
    pub fn methods(&self) -> impl Iterator<Item = &MethodSignature> {
        self.methods.values()
    }

    pub fn method(&self, name: &Symbol) -> Option<&MethodSignature> {
        self.methods.get(name)
    }

    pub fn has_method(&self, name: &Symbol) -> bool {
        self.methods.contains_key(name)
    }

    /// Snapshot of the implementation table for a tag.
    pub fn impls_for(&self, tag: &TypeTag) -> Option<MethodTable> {
        self.impls.read().get(tag).cloned()
    }

    /// Look up one method implementation for a tag.
    pub fn find_impl(&self, tag: &TypeTag, method: &Symbol) -> Option<LarchVal> {
        self.impls
            .read()
            .get(tag)
            .and_then(|table| table.get(method).cloned())
    }

    /// True if any implementation table exists for `tag`, however partial.
    pub fn extends(&self, tag: &TypeTag) -> bool {
        self.impls.read().contains_key(tag)
    }

    /// Tags with an implementation table.
    pub fn extended_tags(&self) -> Vec<TypeTag> {
        self.impls.read().keys().cloned().collect()
    }

    /// Merge `additions` into the table for `tag`.
    ///
    /// The existing table is copied, the additions merged in, and the copy
    /// installed, so methods not mentioned keep their implementation. Names
    /// that are not methods of this protocol are not stored and are returned
    /// to the caller. The tag is registered even if nothing was accepted.
    pub fn extend<I>(&self, tag: TypeTag, additions: I) -> Vec<Symbol>
    where
        I: IntoIterator<Item = (Symbol, LarchVal)>,
    {
        let mut rejected = Vec::new();
        let mut impls = self.impls.write();
        let mut table = impls.get(&tag).cloned().unwrap_or_default();
        for (name, implementation) in additions {
            if self.has_method(&name) {
                table.insert(name, implementation);
            } else {
                rejected.push(name);
            }
        }
        impls.insert(tag, table);
        rejected
    }
}

impl fmt::Debug for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#<Protocol {}>", self.name)
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#<Protocol {}>", self.name)
    }
}

/// Wrapper for protocol in LarchVal. Compared by identity.
#[derive(Clone)]
pub struct LarchProtocol(pub Arc<Protocol>);

impl LarchProtocol {
    pub fn new(protocol: Protocol) -> Self {
        LarchProtocol(Arc::new(protocol))
    }

    pub fn protocol(&self) -> &Arc<Protocol> {
        &self.0
    }

    fn addr(&self) -> usize {
        Arc::as_ptr(&self.0) as usize
    }
}

impl fmt::Debug for LarchProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.0)
    }
}

impl fmt::Display for LarchProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl PartialEq for LarchProtocol {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for LarchProtocol {}

impl PartialOrd for LarchProtocol {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for LarchProtocol {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0
            .name
            .cmp(&other.0.name)
            .then_with(|| self.addr().cmp(&other.addr()))
    }
}

impl Hash for LarchProtocol {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.addr().hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sig(name: &str) -> MethodSignature {
        MethodSignature {
            name: Symbol::new(name),
            arglists: vec![vec![Symbol::new("this")]],
            doc: None,
        }
    }

    fn shape() -> Protocol {
        Protocol::new(
            Symbol::new("Shape"),
            Some("Plane figures".to_string()),
            vec![sig("area"), sig("perimeter")],
        )
    }

    #[test]
    fn test_declaration_order() {
        let p = shape();
        let names: Vec<_> = p.methods().map(|m| m.name.name().to_string()).collect();
        assert_eq!(names, vec!["area", "perimeter"]);
    }

    #[test]
    fn test_extend_merges() {
        let p = shape();
        let area = Symbol::new("area");
        let perimeter = Symbol::new("perimeter");

        p.extend(TypeTag::Int, vec![(area.clone(), LarchVal::Int(1))]);
        p.extend(TypeTag::Int, vec![(perimeter.clone(), LarchVal::Int(2))]);

        let table = p.impls_for(&TypeTag::Int).unwrap();
        assert_eq!(table.get(&area), Some(&LarchVal::Int(1)));
        assert_eq!(table.get(&perimeter), Some(&LarchVal::Int(2)));
    }

    #[test]
    fn test_extend_rejects_unknown_methods() {
        let p = shape();
        let rejected = p.extend(TypeTag::String, vec![(Symbol::new("volume"), LarchVal::Nil)]);
        assert_eq!(rejected, vec![Symbol::new("volume")]);
        assert!(p.extends(&TypeTag::String));
        assert!(p.find_impl(&TypeTag::String, &Symbol::new("volume")).is_none());
    }

    #[test]
    fn test_identity_equality() {
        let a = LarchProtocol::new(shape());
        let b = LarchProtocol::new(shape());
        assert_eq!(a, a.clone());
        assert_ne!(a, b);
    }
}
