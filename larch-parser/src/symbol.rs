// larch-parser - Symbol type with interning
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Symbols are identifiers that may be optionally namespaced.
//!
//! Symbols are interned: two symbols with the same namespace and name share
//! storage, so comparison and hashing are pointer operations. Interned
//! symbols live until the process exits.
//!
//! Symbols name bindings, protocol methods and record fields. Record and
//! struct storage normalises symbol keys to keywords (see
//! [`Keyword::from`](crate::Keyword)), so the two spellings of a field never
//! drift apart.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::intern::{split_qualified, InternTable, QualifiedName};
use crate::keyword::Keyword;

static SYMBOLS: InternTable = InternTable::new();

/// A symbol with optional namespace.
#[derive(Clone)]
pub struct Symbol {
    inner: Arc<QualifiedName>,
}

impl Symbol {
    /// Create a new symbol with no namespace.
    pub fn new(name: &str) -> Self {
        Symbol {
            inner: SYMBOLS.intern(None, name),
        }
    }

    /// Create a new symbol with a namespace.
    pub fn with_namespace(namespace: &str, name: &str) -> Self {
        Symbol {
            inner: SYMBOLS.intern(Some(namespace), name),
        }
    }

    /// Parse a symbol from a string like "foo" or "ns/foo".
    pub fn parse(s: &str) -> Self {
        match split_qualified(s) {
            (Some(ns), name) => Symbol::with_namespace(ns, name),
            (None, name) => Symbol::new(name),
        }
    }

    #[must_use]
    pub fn namespace(&self) -> Option<&str> {
        self.inner.namespace.as_deref()
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    #[must_use]
    pub fn has_namespace(&self) -> bool {
        self.inner.namespace.is_some()
    }
}

impl From<&Keyword> for Symbol {
    fn from(kw: &Keyword) -> Self {
        match kw.namespace() {
            Some(ns) => Symbol::with_namespace(ns, kw.name()),
            None => Symbol::new(kw.name()),
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.inner.namespace {
            Some(ns) => write!(f, "{}/{}", ns, self.inner.name),
            None => write!(f, "{}", self.inner.name),
        }
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({})", self)
    }
}

impl PartialEq for Symbol {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Symbol {}

impl PartialOrd for Symbol {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Symbol {
    fn cmp(&self, other: &Self) -> Ordering {
        // Unqualified names sort before qualified ones
        self.inner
            .namespace
            .cmp(&other.inner.namespace)
            .then_with(|| self.inner.name.cmp(&other.inner.name))
    }
}

impl Hash for Symbol {
    fn hash<H: Hasher>(&self, state: &mut H) {
        Arc::as_ptr(&self.inner).hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_symbol() {
        let sym = Symbol::new("foo");
        assert_eq!(sym.name(), "foo");
        assert!(sym.namespace().is_none());
        assert_eq!(sym.to_string(), "foo");
    }

    #[test]
    fn test_parse_namespaced() {
        let sym = Symbol::parse("user/foo");
        assert_eq!(sym.name(), "foo");
        assert_eq!(sym.namespace(), Some("user"));
        assert_eq!(sym.to_string(), "user/foo");
    }

    #[test]
    fn test_parse_slash_symbol() {
        let sym = Symbol::parse("/");
        assert_eq!(sym.name(), "/");
        assert!(!sym.has_namespace());
    }

    #[test]
    fn test_interning() {
        let a = Symbol::new("foo");
        let b = Symbol::new("foo");
        assert_eq!(a, b);
        assert!(Arc::ptr_eq(&a.inner, &b.inner));
        assert_ne!(a, Symbol::new("bar"));
    }

    #[test]
    fn test_ordering() {
        let a = Symbol::new("a");
        let b = Symbol::new("b");
        let ns_a = Symbol::with_namespace("ns", "a");
        assert!(a < b);
        assert!(b < ns_a);
    }

    #[test]
    fn test_from_keyword() {
        let kw = Keyword::parse("geo/x");
        assert_eq!(Symbol::from(&kw), Symbol::with_namespace("geo", "x"));
    }
}
