// larch-core - Environment for lexical scoping
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Environment for variable bindings with lexical scoping.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use larch_parser::{LarchVal, Symbol};
use parking_lot::RwLock;

use crate::error::{Error, Result};
use crate::registry::Registry;

/// A lexical environment for variable bindings.
///
/// Environments form a chain through parent references. The root of the
/// chain holds the global bindings; every environment in a chain shares the
/// root's [`Registry`]. Environments are `Send + Sync` and may be used from
/// several threads at once.
///
/// # Examples
///
/// ```
/// use larch_core::Env;
/// use larch_parser::{LarchVal, Symbol};
///
/// let env = Env::new();
/// env.define(Symbol::new("x"), LarchVal::int(42));
///
/// let child = env.child();
/// child.define(Symbol::new("x"), LarchVal::int(100));
/// assert_eq!(child.lookup(&Symbol::new("x")).unwrap(), LarchVal::int(100));
/// assert_eq!(env.lookup(&Symbol::new("x")).unwrap(), LarchVal::int(42));
/// ```
#[derive(Clone)]
pub struct Env {
    inner: Arc<EnvInner>,
}

struct EnvInner {
    bindings: RwLock<HashMap<Symbol, LarchVal>>,
    parent: Option<Env>,
    registry: Registry,
}

impl Env {
    /// Create a new root environment with an empty registry.
    pub fn new() -> Self {
        Env {
            inner: Arc::new(EnvInner {
                bindings: RwLock::new(HashMap::new()),
                parent: None,
                registry: Registry::new(),
            }),
        }
    }

    /// Create a child environment with this environment as parent.
    #[must_use]
    pub fn child(&self) -> Self {
        Env {
            inner: Arc::new(EnvInner {
                bindings: RwLock::new(HashMap::new()),
                parent: Some(self.clone()),
                registry: self.inner.registry.clone(),
            }),
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.inner.registry
    }

    /// The outermost environment of this chain.
    pub fn root(&self) -> Env {
        let mut current = self.clone();
        while let Some(parent) = current.inner.parent.clone() {
            current = parent;
        }
        current
    }

    /// Define a binding in this environment (not parent).
    pub fn define(&self, sym: Symbol, val: LarchVal) {
        self.inner.bindings.write().insert(sym, val);
    }

    /// Define a binding in the root environment.
    pub fn define_global(&self, sym: Symbol, val: LarchVal) {
        self.root().define(sym, val);
    }

    /// Look up a symbol in this environment or parent chain.
    pub fn lookup(&self, sym: &Symbol) -> Result<LarchVal> {
        self.try_lookup(sym)
            .ok_or_else(|| Error::UndefinedSymbol(sym.clone()))
    }

    pub fn try_lookup(&self, sym: &Symbol) -> Option<LarchVal> {
        let mut current = self.clone();
        loop {
            if let Some(val) = current.inner.bindings.read().get(sym) {
                return Some(val.clone());
            }
            let parent = current.inner.parent.clone()?;
            current = parent;
        }
    }

    #[must_use]
    pub fn is_defined(&self, sym: &Symbol) -> bool {
        self.try_lookup(sym).is_some()
    }
}

impl Default for Env {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Env {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Env")
            .field("bindings", &self.inner.bindings.read().len())
            .field("root", &self.inner.parent.is_none())
            .finish()
    }
}
