// larch-parser - Keyword type with interning
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Keywords are self-evaluating identifiers that may be optionally namespaced.
//! They share the interning scheme used by symbols but live in their own table.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::intern::{split_qualified, InternTable, QualifiedName};
use crate::symbol::Symbol;

static KEYWORDS: InternTable = InternTable::new();

/// A keyword with optional namespace. Printed with a leading `:`.
#[derive(Clone)]
pub struct Keyword {
    inner: Arc<QualifiedName>,
}

impl Keyword {
    /// Create a new keyword with no namespace.
    pub fn new(name: &str) -> Self {
        Keyword {
            inner: KEYWORDS.intern(None, name),
        }
    }

    /// Create a new keyword with a namespace.
    pub fn with_namespace(namespace: &str, name: &str) -> Self {
        Keyword {
            inner: KEYWORDS.intern(Some(namespace), name),
        }
    }

    /// Parse a keyword body (without the leading colon), e.g. "a" or "ns/a".
    pub fn parse(s: &str) -> Self {
        match split_qualified(s) {
            (Some(ns), name) => Keyword::with_namespace(ns, name),
            (None, name) => Keyword::new(name),
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
}

/// The keyword spelling of a symbol. Record and struct keys are stored in
/// this form.
impl From<&Symbol> for Keyword {
    fn from(sym: &Symbol) -> Self {
        match sym.namespace() {
            Some(ns) => Keyword::with_namespace(ns, sym.name()),
            None => Keyword::new(sym.name()),
        }
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.inner.namespace {
            Some(ns) => write!(f, ":{}/{}", ns, self.inner.name),
            None => write!(f, ":{}", self.inner.name),
        }
    }
}

impl fmt::Debug for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Keyword({})", self)
    }
}

impl PartialEq for Keyword {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Keyword {}

impl PartialOrd for Keyword {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Keyword {
    fn cmp(&self, other: &Self) -> Ordering {
        self.inner
            .namespace
            .cmp(&other.inner.namespace)
            .then_with(|| self.inner.name.cmp(&other.inner.name))
    }
}

impl Hash for Keyword {
    fn hash<H: Hasher>(&self, state: &mut H) {
        Arc::as_ptr(&self.inner).hash(state);
    }
}
