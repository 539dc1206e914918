// larch-parser - Record and struct types
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Record and struct definitions, and record instances.
//!
//! Field keys are stored once, as keywords. Any path that looks a field up
//! with an unqualified symbol goes through [`normalize_key`] first, so `x`
//! and `:x` always name the same entry.

use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use im::OrdMap;

use crate::keyword::Keyword;
use crate::symbol::Symbol;
use crate::type_tag::{type_key, type_name_to_symbol};
use crate::value::LarchVal;

/// Normalize a map key for record or struct storage.
pub fn normalize_key(key: &LarchVal) -> LarchVal {
    match key {
        LarchVal::Symbol(sym) if !sym.has_namespace() => LarchVal::Keyword(Keyword::from(sym)),
        other => other.clone(),
    }
}

// ============================================================================
// Record definitions
// ============================================================================

/// Definition of a record type (created by defrecord).
#[derive(Clone, Debug)]
pub struct RecordDef {
    pub name: Symbol,
    /// Declared fields, in order.
    pub fields: Vec<Symbol>,
    positions: HashMap<Keyword, usize>,
}

impl RecordDef {
    pub fn new(name: Symbol, fields: Vec<Symbol>) -> Self {
        let positions = fields
            .iter()
            .enumerate()
            .map(|(i, f)| (Keyword::from(f), i))
            .collect();
        RecordDef {
            name,
            fields,
            positions,
        }
    }

    /// Zero-based position of a declared field, by symbol or keyword.
    pub fn position(&self, key: &LarchVal) -> Option<usize> {
        match normalize_key(key) {
            LarchVal::Keyword(kw) => self.positions.get(&kw).copied(),
            _ => None,
        }
    }

    /// Storage keys of the declared fields, in order.
    pub fn field_keys(&self) -> impl Iterator<Item = LarchVal> + '_ {
        self.fields
            .iter()
            .map(|f| LarchVal::Keyword(Keyword::from(f)))
    }

    pub fn arity(&self) -> usize {
        self.fields.len()
    }
}

// ============================================================================
// Record instances
// ============================================================================

/// An instance of a record type.
///
/// Every declared field is present (missing ones hold `nil`); extra keys
/// may be added with `assoc` or carried over by `map->Name`.
#[derive(Clone, Debug)]
pub struct RecordInstance {
    def: Arc<RecordDef>,
    entries: OrdMap<LarchVal, LarchVal>,
}

impl RecordInstance {
    /// Build from positional values. Values beyond the declared fields are
    /// ignored; the caller checks arity.
    pub fn positional(def: Arc<RecordDef>, values: Vec<LarchVal>) -> Self {
        let mut values = values.into_iter();
        let entries = def
            .field_keys()
            .map(|k| (k, values.next().unwrap_or(LarchVal::Nil)))
            .collect();
        RecordInstance { def, entries }
    }

    /// Build from arbitrary entries, keeping every one of them and filling
    /// declared fields that are absent with `nil`.
    pub fn from_entries<I>(def: Arc<RecordDef>, entries: I) -> Self
    where
        I: IntoIterator<Item = (LarchVal, LarchVal)>,
    {
        let mut map: OrdMap<LarchVal, LarchVal> = entries
            .into_iter()
            .map(|(k, v)| (normalize_key(&k), v))
            .collect();
        for key in def.field_keys() {
            if !map.contains_key(&key) {
                map.insert(key, LarchVal::Nil);
            }
        }
        RecordInstance { def, entries: map }
    }

    pub fn def(&self) -> &Arc<RecordDef> {
        &self.def
    }

    pub fn record_type(&self) -> &Symbol {
        &self.def.name
    }

    /// The type named by an explicit `:type` entry, if it is a symbol,
    /// keyword or string.
    pub fn type_override(&self) -> Option<Symbol> {
        self.entries.get(&type_key()).and_then(type_name_to_symbol)
    }

    pub fn get(&self, key: &LarchVal) -> Option<&LarchVal> {
        self.entries.get(&normalize_key(key))
    }

    pub fn contains_key(&self, key: &LarchVal) -> bool {
        self.entries.contains_key(&normalize_key(key))
    }

    pub fn is_declared_field(&self, key: &LarchVal) -> bool {
        self.def.position(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Create a new record with an added or updated entry.
    pub fn assoc(&self, key: &LarchVal, value: LarchVal) -> Self {
        RecordInstance {
            def: Arc::clone(&self.def),
            entries: self.entries.update(normalize_key(key), value),
        }
    }

    /// Remove an entry. Removing a declared field yields a plain map, since
    /// the result no longer has every field of its type.
    pub fn dissoc(&self, key: &LarchVal) -> LarchVal {
        let key = normalize_key(key);
        let entries = self.entries.without(&key);
        if self.is_declared_field(&key) {
            LarchVal::Map(entries)
        } else {
            LarchVal::record(RecordInstance {
                def: Arc::clone(&self.def),
                entries,
            })
        }
    }

    /// Entries in print order: declared fields first, then the rest.
    pub fn ordered_entries(&self) -> Vec<(LarchVal, LarchVal)> {
        let mut out: Vec<_> = self
            .def
            .field_keys()
            .filter_map(|k| self.entries.get(&k).map(|v| (k.clone(), v.clone())))
            .collect();
        out.extend(
            self.entries
                .iter()
                .filter(|(k, _)| !self.is_declared_field(k))
                .map(|(k, v)| (k.clone(), v.clone())),
        );
        out
    }

    /// All entries as a plain map.
    pub fn to_map(&self) -> OrdMap<LarchVal, LarchVal> {
        self.entries.clone()
    }
}

impl fmt::Display for RecordInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}{{", self.def.name)?;
        for (i, (k, v)) in self.ordered_entries().iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{} {}", k, v)?;
        }
        write!(f, "}}")
    }
}

impl PartialEq for RecordInstance {
    fn eq(&self, other: &Self) -> bool {
        self.def.name == other.def.name && self.entries == other.entries
    }
}

impl Eq for RecordInstance {}

impl PartialOrd for RecordInstance {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for RecordInstance {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.def
            .name
            .cmp(&other.def.name)
            .then_with(|| self.entries.iter().cmp(other.entries.iter()))
    }
}

impl Hash for RecordInstance {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.def.name.hash(state);
        for (k, v) in self.entries.iter() {
            k.hash(state);
            v.hash(state);
        }
    }
}

// ============================================================================
// Struct definitions
// ============================================================================

/// A struct type: just a name and an ordered list of field keys.
///
/// Struct instances are plain maps and carry no type identity.
#[derive(Clone, Debug)]
pub struct StructDef {
    pub name: Symbol,
    pub fields: Vec<LarchVal>,
}

impl StructDef {
    /// Field symbols are normalized to keywords.
    pub fn new(name: Symbol, fields: Vec<LarchVal>) -> Self {
        StructDef {
            name,
            fields: fields.iter().map(normalize_key).collect(),
        }
    }

    pub fn position(&self, key: &LarchVal) -> Option<usize> {
        let key = normalize_key(key);
        self.fields.iter().position(|f| *f == key)
    }

    /// Build an instance from positional values; missing trailing fields
    /// are `nil`.
    pub fn instantiate(&self, values: &[LarchVal]) -> LarchVal {
        let entries = self
            .fields
            .iter()
            .enumerate()
            .map(|(i, k)| (k.clone(), values.get(i).cloned().unwrap_or(LarchVal::Nil)))
            .collect();
        LarchVal::Map(entries)
    }
}
