// larch-parser - Shared name interning
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Interning tables shared by [`Symbol`](crate::Symbol) and
//! [`Keyword`](crate::Keyword).
//!
//! Each table hands out one `Arc<QualifiedName>` per distinct
//! `(namespace, name)` pair, so equality and hashing on the wrapping types can
//! use the pointer alone. Entries are never evicted.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use parking_lot::Mutex;

/// An optionally namespaced name, shared by every handle that interned it.
#[derive(Debug)]
pub(crate) struct QualifiedName {
    pub(crate) namespace: Option<Arc<str>>,
    pub(crate) name: Arc<str>,
}

type Key = (Option<String>, String);

/// A process-wide interning table.
pub(crate) struct InternTable {
    entries: OnceLock<Mutex<HashMap<Key, Arc<QualifiedName>>>>,
}

impl InternTable {
    pub(crate) const fn new() -> Self {
        InternTable {
            entries: OnceLock::new(),
        }
    }

    pub(crate) fn intern(&self, namespace: Option<&str>, name: &str) -> Arc<QualifiedName> {
        let mut entries = self
            .entries
            .get_or_init(|| Mutex::new(HashMap::new()))
            .lock();
        let key = (namespace.map(str::to_owned), name.to_owned());
        Arc::clone(entries.entry(key).or_insert_with(|| {
            Arc::new(QualifiedName {
                namespace: namespace.map(Arc::from),
                name: Arc::from(name),
            })
        }))
    }
}

/// Split `ns/name` into its parts. A lone `/` is a plain name.
pub(crate) fn split_qualified(s: &str) -> (Option<&str>, &str) {
    if s == "/" {
        return (None, s);
    }
    match s.find('/') {
        Some(pos) if pos > 0 && pos + 1 < s.len() => (Some(&s[..pos]), &s[pos + 1..]),
        _ => (None, s),
    }
}
