// larch-core - Type registry and diagnostics
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! The global registry of user-defined types, and the diagnostics sink.
//!
//! One `Registry` is created with each root environment and shared by every
//! child environment. It holds record and struct definitions by name, the
//! protocols defined so far, and the diagnostics that object-model operations
//! emit in place of raising errors.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use larch_parser::{LarchVal, Protocol, RecordDef, StructDef, Symbol};
use parking_lot::{Mutex, RwLock};
use tracing::{error, warn};

// ============================================================================
// Diagnostics
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Error,
}

/// A non-fatal problem reported during evaluation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.severity {
            Severity::Warning => write!(f, "warning: {}", self.message),
            Severity::Error => write!(f, "error: {}", self.message),
        }
    }
}

/// Collects diagnostics and forwards each one to `tracing`.
#[derive(Default)]
pub struct Diagnostics {
    entries: Mutex<Vec<Diagnostic>>,
}

impl Diagnostics {
    pub fn warn(&self, message: impl Into<String>) {
        let message = message.into();
        warn!(target: "larch", "{}", message);
        self.push(Severity::Warning, message);
    }

    pub fn error(&self, message: impl Into<String>) {
        let message = message.into();
        error!(target: "larch", "{}", message);
        self.push(Severity::Error, message);
    }

    fn push(&self, severity: Severity, message: String) {
        self.entries.lock().push(Diagnostic { severity, message });
    }

    /// All diagnostics recorded so far.
    pub fn entries(&self) -> Vec<Diagnostic> {
        self.entries.lock().clone()
    }

    /// Messages of all diagnostics recorded so far.
    pub fn messages(&self) -> Vec<String> {
        self.entries.lock().iter().map(|d| d.message.clone()).collect()
    }

    /// Drain the recorded diagnostics.
    pub fn take(&self) -> Vec<Diagnostic> {
        std::mem::take(&mut *self.entries.lock())
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

// ============================================================================
// Registry
// ============================================================================

#[derive(Default)]
struct RegistryInner {
    records: RwLock<HashMap<Symbol, Arc<RecordDef>>>,
    structs: RwLock<HashMap<Symbol, Arc<StructDef>>>,
    protocols: RwLock<HashMap<Symbol, Arc<Protocol>>>,
    diagnostics: Diagnostics,
}

/// Shared registry of record definitions, struct definitions and protocols.
#[derive(Clone, Default)]
pub struct Registry {
    inner: Arc<RegistryInner>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a record definition, replacing any earlier one of that name.
    pub fn define_record(&self, def: RecordDef) -> Arc<RecordDef> {
        let def = Arc::new(def);
        self.inner
            .records
            .write()
            .insert(def.name.clone(), Arc::clone(&def));
        def
    }

    pub fn record_def(&self, name: &Symbol) -> Option<Arc<RecordDef>> {
        self.inner.records.read().get(name).cloned()
    }

    /// Store a struct definition, replacing any earlier one of that name.
    pub fn define_struct(&self, def: StructDef) -> Arc<StructDef> {
        let def = Arc::new(def);
        self.inner
            .structs
            .write()
            .insert(def.name.clone(), Arc::clone(&def));
        def
    }

    pub fn struct_def(&self, name: &Symbol) -> Option<Arc<StructDef>> {
        self.inner.structs.read().get(name).cloned()
    }

    pub fn register_protocol(&self, protocol: Arc<Protocol>) {
        self.inner
            .protocols
            .write()
            .insert(protocol.name.clone(), protocol);
    }

    pub fn protocol(&self, name: &Symbol) -> Option<Arc<Protocol>> {
        self.inner.protocols.read().get(name).cloned()
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.inner.diagnostics
    }

    /// Record a warning and produce the `nil` result of a soft failure.
    pub fn soft_fail(&self, message: impl Into<String>) -> LarchVal {
        self.inner.diagnostics.warn(message);
        LarchVal::Nil
    }

    /// Record an error and produce the error value of a hard rejection.
    pub fn reject(&self, message: impl Into<String>) -> LarchVal {
        let message = message.into();
        self.inner.diagnostics.error(message.clone());
        LarchVal::error(message)
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("records", &self.inner.records.read().len())
            .field("structs", &self.inner.structs.read().len())
            .field("protocols", &self.inner.protocols.read().len())
            .field("diagnostics", &self.inner.diagnostics.len())
            .finish()
    }
}
