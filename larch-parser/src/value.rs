// larch-parser - Core value type for Larch
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! The `LarchVal` enum: every runtime value and every AST node.
//!
//! Values are immutable (atoms and lazy sequences aside) and `Send + Sync`,
//! so an environment and everything bound in it can be shared across
//! threads.

use std::any::Any;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use im::{OrdMap, OrdSet, Vector};
use parking_lot::Mutex;

use crate::atom::LarchAtom;
use crate::keyword::Keyword;
use crate::protocol::{LarchProtocol, Protocol};
use crate::record::RecordInstance;
use crate::symbol::Symbol;

/// The core value type for Larch.
#[derive(Clone)]
pub enum LarchVal {
    /// The absence value
    Nil,
    Bool(bool),
    /// 64-bit signed integer
    Int(i64),
    /// 64-bit floating point number
    Float(f64),
    String(Arc<str>),
    Symbol(Symbol),
    /// Keyword (optionally namespaced, self-evaluating)
    Keyword(Keyword),
    List(Vector<LarchVal>),
    Vector(Vector<LarchVal>),
    Map(OrdMap<LarchVal, LarchVal>),
    Set(OrdSet<LarchVal>),
    /// Deferred sequence, realized at most once
    LazySeq(LarchLazySeq),
    /// User-defined function (closure)
    Fn(LarchFn),
    /// Native (Rust) function
    NativeFn(LarchNativeFn),
    Atom(LarchAtom),
    Protocol(LarchProtocol),
    /// Record instance (named type with declared fields)
    Record(Arc<RecordInstance>),
    /// Error value returned by object-model operations that reject their
    /// input without aborting evaluation.
    Error(Arc<str>),
}

// ============================================================================
// Function Types
// ============================================================================

/// A single arity definition for a function.
#[derive(Clone)]
pub struct FnArity {
    pub params: Vec<Symbol>,
    pub rest_param: Option<Symbol>,
    pub body: Vec<LarchVal>,
}

impl FnArity {
    pub fn new(params: Vec<Symbol>, rest_param: Option<Symbol>, body: Vec<LarchVal>) -> Self {
        FnArity {
            params,
            rest_param,
            body,
        }
    }

    /// Check if this arity can accept the given number of arguments.
    pub fn matches(&self, arg_count: usize) -> bool {
        if self.rest_param.is_some() {
            arg_count >= self.params.len()
        } else {
            arg_count == self.params.len()
        }
    }
}

/// A user-defined function (closure).
///
/// The captured environment is type-erased; its concrete type lives in
/// larch-core.
#[derive(Clone)]
pub struct LarchFn {
    pub name: Option<Symbol>,
    pub arities: Arc<[FnArity]>,
    pub env: Arc<dyn Any + Send + Sync>,
}

impl LarchFn {
    pub fn new(name: Option<Symbol>, arities: Vec<FnArity>, env: Arc<dyn Any + Send + Sync>) -> Self {
        LarchFn {
            name,
            arities: arities.into(),
            env,
        }
    }

    /// Find the arity that matches the given argument count, preferring a
    /// fixed arity over a variadic one.
    pub fn find_arity(&self, arg_count: usize) -> Option<&FnArity> {
        self.arities
            .iter()
            .find(|arity| arity.rest_param.is_none() && arity.params.len() == arg_count)
            .or_else(|| self.arities.iter().find(|arity| arity.matches(arg_count)))
    }

    fn addr(&self) -> usize {
        Arc::as_ptr(&self.arities) as *const () as usize
    }
}

impl fmt::Debug for LarchFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "#<fn {}>", name),
            None => write!(f, "#<fn>"),
        }
    }
}

/// A native (Rust) function.
#[derive(Clone)]
pub struct LarchNativeFn {
    pub name: Arc<str>,
    /// The actual function (type-erased; larch-core knows the concrete type)
    func: Arc<dyn Any + Send + Sync>,
}

impl LarchNativeFn {
    pub fn new(name: impl Into<Arc<str>>, func: Arc<dyn Any + Send + Sync>) -> Self {
        LarchNativeFn {
            name: name.into(),
            func,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn func(&self) -> &Arc<dyn Any + Send + Sync> {
        &self.func
    }

    fn addr(&self) -> usize {
        Arc::as_ptr(&self.func) as *const () as usize
    }
}

impl fmt::Debug for LarchNativeFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#<native-fn {}>", self.name)
    }
}

// ============================================================================
// Lazy Sequences
// ============================================================================

/// Internal state of a lazy sequence.
#[derive(Clone)]
pub enum LazySeqState {
    /// Not yet evaluated: a zero-arg function producing the sequence
    Pending(LarchFn),
    /// The sequence the thunk produced (`nil` when empty)
    Realized(LarchVal),
}

/// A lazy sequence. Forcing happens in larch-core, which owns evaluation;
/// the lock is never held while the thunk runs.
#[derive(Clone)]
pub struct LarchLazySeq {
    state: Arc<Mutex<LazySeqState>>,
}

impl LarchLazySeq {
    pub fn new(thunk: LarchFn) -> Self {
        LarchLazySeq {
            state: Arc::new(Mutex::new(LazySeqState::Pending(thunk))),
        }
    }

    /// The thunk, if not yet realized.
    pub fn pending_thunk(&self) -> Option<LarchFn> {
        match &*self.state.lock() {
            LazySeqState::Pending(thunk) => Some(thunk.clone()),
            LazySeqState::Realized(_) => None,
        }
    }

    /// The realized sequence, if any.
    pub fn realized(&self) -> Option<LarchVal> {
        match &*self.state.lock() {
            LazySeqState::Pending(_) => None,
            LazySeqState::Realized(v) => Some(v.clone()),
        }
    }

    /// Record the result of forcing. The first result wins.
    pub fn set_realized(&self, value: LarchVal) -> LarchVal {
        let mut state = self.state.lock();
        match &*state {
            LazySeqState::Realized(existing) => existing.clone(),
            LazySeqState::Pending(_) => {
                *state = LazySeqState::Realized(value.clone());
                value
            }
        }
    }

    fn addr(&self) -> usize {
        Arc::as_ptr(&self.state) as usize
    }
}

impl fmt::Display for LarchLazySeq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.realized() {
            None => write!(f, "(...)"),
            Some(LarchVal::Nil) => write!(f, "()"),
            Some(LarchVal::List(items)) | Some(LarchVal::Vector(items)) => {
                write_seq(f, "(", &items, ")")
            }
            Some(other) => write!(f, "{}", other),
        }
    }
}

// ============================================================================
// Constructors and accessors
// ============================================================================

impl LarchVal {
    pub fn nil() -> Self {
        LarchVal::Nil
    }

    pub fn bool(b: bool) -> Self {
        LarchVal::Bool(b)
    }

    pub fn int(n: i64) -> Self {
        LarchVal::Int(n)
    }

    pub fn float(n: f64) -> Self {
        LarchVal::Float(n)
    }

    pub fn string(s: impl Into<Arc<str>>) -> Self {
        LarchVal::String(s.into())
    }

    pub fn symbol(sym: Symbol) -> Self {
        LarchVal::Symbol(sym)
    }

    pub fn keyword(kw: Keyword) -> Self {
        LarchVal::Keyword(kw)
    }

    pub fn list(elements: Vec<LarchVal>) -> Self {
        LarchVal::List(elements.into_iter().collect())
    }

    pub fn vector(elements: Vec<LarchVal>) -> Self {
        LarchVal::Vector(elements.into_iter().collect())
    }

    pub fn map(pairs: Vec<(LarchVal, LarchVal)>) -> Self {
        LarchVal::Map(pairs.into_iter().collect())
    }

    pub fn set(elements: Vec<LarchVal>) -> Self {
        LarchVal::Set(elements.into_iter().collect())
    }

    pub fn atom(value: LarchVal) -> Self {
        LarchVal::Atom(LarchAtom::new(value))
    }

    pub fn protocol(protocol: Protocol) -> Self {
        LarchVal::Protocol(LarchProtocol::new(protocol))
    }

    pub fn record(instance: RecordInstance) -> Self {
        LarchVal::Record(Arc::new(instance))
    }

    pub fn lazy_seq(thunk: LarchFn) -> Self {
        LarchVal::LazySeq(LarchLazySeq::new(thunk))
    }

    /// Create an error value.
    pub fn error(message: impl Into<Arc<str>>) -> Self {
        LarchVal::Error(message.into())
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, LarchVal::Nil)
    }

    /// Everything except `nil` and `false` is truthy.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, LarchVal::Nil | LarchVal::Bool(false))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, LarchVal::Error(_))
    }

    pub fn as_symbol(&self) -> Option<&Symbol> {
        match self {
            LarchVal::Symbol(sym) => Some(sym),
            _ => None,
        }
    }

    /// Runtime type name, used in error messages and as the fallback tag.
    pub fn type_name(&self) -> &'static str {
        match self {
            LarchVal::Nil => "nil",
            LarchVal::Bool(_) => "boolean",
            LarchVal::Int(_) => "integer",
            LarchVal::Float(_) => "float",
            LarchVal::String(_) => "string",
            LarchVal::Symbol(_) => "symbol",
            LarchVal::Keyword(_) => "keyword",
            LarchVal::List(_) => "list",
            LarchVal::LazySeq(_) => "lazy-seq",
            LarchVal::Vector(_) => "vector",
            LarchVal::Map(_) => "map",
            LarchVal::Set(_) => "set",
            LarchVal::Fn(_) | LarchVal::NativeFn(_) => "fn",
            LarchVal::Atom(_) => "atom",
            LarchVal::Protocol(_) => "protocol",
            LarchVal::Record(_) => "record",
            LarchVal::Error(_) => "error",
        }
    }
}

// ============================================================================
// Display implementation
// ============================================================================

fn write_seq(
    f: &mut fmt::Formatter<'_>,
    open: &str,
    items: &Vector<LarchVal>,
    close: &str,
) -> fmt::Result {
    write!(f, "{}", open)?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, " ")?;
        }
        write!(f, "{}", item)?;
    }
    write!(f, "{}", close)
}

impl fmt::Display for LarchVal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LarchVal::Nil => write!(f, "nil"),
            LarchVal::Bool(b) => write!(f, "{}", b),
            LarchVal::Int(n) => write!(f, "{}", n),
            LarchVal::Float(n) => {
                if n.is_nan() {
                    write!(f, "##NaN")
                } else if n.is_infinite() {
                    if *n > 0.0 {
                        write!(f, "##Inf")
                    } else {
                        write!(f, "##-Inf")
                    }
                } else if n.fract() == 0.0 {
                    write!(f, "{}.0", n)
                } else {
                    write!(f, "{}", n)
                }
            }
            LarchVal::String(s) => write!(f, "\"{}\"", escape_string(s)),
            LarchVal::Symbol(sym) => write!(f, "{}", sym),
            LarchVal::Keyword(kw) => write!(f, "{}", kw),
            LarchVal::List(items) => write_seq(f, "(", items, ")"),
            LarchVal::Vector(items) => write_seq(f, "[", items, "]"),
            LarchVal::Map(map) => {
                write!(f, "{{")?;
                for (i, (k, v)) in map.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{} {}", k, v)?;
                }
                write!(f, "}}")
            }
            LarchVal::Set(set) => {
                write!(f, "#{{")?;
                for (i, item) in set.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "}}")
            }
            LarchVal::LazySeq(ls) => write!(f, "{}", ls),
            LarchVal::Fn(func) => write!(f, "{:?}", func),
            LarchVal::NativeFn(nf) => write!(f, "{:?}", nf),
            LarchVal::Atom(a) => write!(f, "{}", a),
            LarchVal::Protocol(p) => write!(f, "{}", p),
            LarchVal::Record(r) => write!(f, "{}", r),
            LarchVal::Error(msg) => write!(f, "#<error {}>", msg),
        }
    }
}

impl fmt::Debug for LarchVal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}

fn escape_string(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\n' => result.push_str("\\n"),
            '\t' => result.push_str("\\t"),
            '\r' => result.push_str("\\r"),
            '\\' => result.push_str("\\\\"),
            '"' => result.push_str("\\\""),
            _ => result.push(c),
        }
    }
    result
}

// ============================================================================
// Equality and ordering (for use as map keys and set elements)
// ============================================================================

// Integers and floats are distinct values: `(= 1 1.0)` is false, which keeps
// equality, ordering and hashing consistent for map keys.
impl PartialEq for LarchVal {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (LarchVal::Nil, LarchVal::Nil) => true,
            (LarchVal::Bool(a), LarchVal::Bool(b)) => a == b,
            (LarchVal::Int(a), LarchVal::Int(b)) => a == b,
            (LarchVal::Float(a), LarchVal::Float(b)) => a.to_bits() == b.to_bits(),
            (LarchVal::String(a), LarchVal::String(b)) => a == b,
            (LarchVal::Symbol(a), LarchVal::Symbol(b)) => a == b,
            (LarchVal::Keyword(a), LarchVal::Keyword(b)) => a == b,
            (LarchVal::List(a), LarchVal::List(b)) => a == b,
            (LarchVal::Vector(a), LarchVal::Vector(b)) => a == b,
            (LarchVal::Map(a), LarchVal::Map(b)) => a == b,
            (LarchVal::Set(a), LarchVal::Set(b)) => a == b,
            (LarchVal::LazySeq(a), LarchVal::LazySeq(b)) => a.addr() == b.addr(),
            (LarchVal::Fn(a), LarchVal::Fn(b)) => a.addr() == b.addr(),
            (LarchVal::NativeFn(a), LarchVal::NativeFn(b)) => a.addr() == b.addr(),
            (LarchVal::Atom(a), LarchVal::Atom(b)) => a == b,
            (LarchVal::Protocol(a), LarchVal::Protocol(b)) => a == b,
            (LarchVal::Record(a), LarchVal::Record(b)) => a == b,
            (LarchVal::Error(a), LarchVal::Error(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for LarchVal {}

impl PartialOrd for LarchVal {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for LarchVal {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use std::cmp::Ordering;

        fn type_order(v: &LarchVal) -> u8 {
            match v {
                LarchVal::Nil => 0,
                LarchVal::Bool(_) => 1,
                LarchVal::Int(_) => 2,
                LarchVal::Float(_) => 3,
                LarchVal::String(_) => 4,
                LarchVal::Symbol(_) => 5,
                LarchVal::Keyword(_) => 6,
                LarchVal::List(_) => 7,
                LarchVal::Vector(_) => 8,
                LarchVal::Map(_) => 9,
                LarchVal::Set(_) => 10,
                LarchVal::LazySeq(_) => 11,
                LarchVal::Fn(_) => 12,
                LarchVal::NativeFn(_) => 13,
                LarchVal::Atom(_) => 14,
                LarchVal::Protocol(_) => 15,
                LarchVal::Record(_) => 16,
                LarchVal::Error(_) => 17,
            }
        }

        let ta = type_order(self);
        let tb = type_order(other);
        if ta != tb {
            return ta.cmp(&tb);
        }

        match (self, other) {
            (LarchVal::Bool(a), LarchVal::Bool(b)) => a.cmp(b),
            (LarchVal::Int(a), LarchVal::Int(b)) => a.cmp(b),
            (LarchVal::Float(a), LarchVal::Float(b)) => a.total_cmp(b),
            (LarchVal::String(a), LarchVal::String(b)) => a.cmp(b),
            (LarchVal::Symbol(a), LarchVal::Symbol(b)) => a.cmp(b),
            (LarchVal::Keyword(a), LarchVal::Keyword(b)) => a.cmp(b),
            (LarchVal::List(a), LarchVal::List(b)) => a.cmp(b),
            (LarchVal::Vector(a), LarchVal::Vector(b)) => a.cmp(b),
            (LarchVal::Map(a), LarchVal::Map(b)) => a.iter().cmp(b.iter()),
            (LarchVal::Set(a), LarchVal::Set(b)) => a.iter().cmp(b.iter()),
            (LarchVal::LazySeq(a), LarchVal::LazySeq(b)) => a.addr().cmp(&b.addr()),
            (LarchVal::Fn(a), LarchVal::Fn(b)) => a.addr().cmp(&b.addr()),
            (LarchVal::NativeFn(a), LarchVal::NativeFn(b)) => {
                a.name.cmp(&b.name).then_with(|| a.addr().cmp(&b.addr()))
            }
            (LarchVal::Atom(a), LarchVal::Atom(b)) => a.cmp(b),
            (LarchVal::Protocol(a), LarchVal::Protocol(b)) => a.cmp(b),
            (LarchVal::Record(a), LarchVal::Record(b)) => a.cmp(b),
            (LarchVal::Error(a), LarchVal::Error(b)) => a.cmp(b),
            _ => Ordering::Equal,
        }
    }
}

impl Hash for LarchVal {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            LarchVal::Nil => {}
            LarchVal::Bool(b) => b.hash(state),
            LarchVal::Int(n) => n.hash(state),
            LarchVal::Float(n) => n.to_bits().hash(state),
            LarchVal::String(s) => s.hash(state),
            LarchVal::Symbol(sym) => sym.hash(state),
            LarchVal::Keyword(kw) => kw.hash(state),
            LarchVal::List(items) | LarchVal::Vector(items) => items.hash(state),
            LarchVal::Map(map) => {
                for (k, v) in map.iter() {
                    k.hash(state);
                    v.hash(state);
                }
            }
            LarchVal::Set(set) => {
                for item in set.iter() {
                    item.hash(state);
                }
            }
            LarchVal::LazySeq(ls) => ls.addr().hash(state),
            LarchVal::Fn(func) => func.addr().hash(state),
            LarchVal::NativeFn(nf) => nf.addr().hash(state),
            LarchVal::Atom(a) => a.hash(state),
            LarchVal::Protocol(p) => p.hash(state),
            LarchVal::Record(r) => r.hash(state),
            LarchVal::Error(msg) => msg.hash(state),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_values_are_thread_safe() {
        assert_send_sync::<LarchVal>();
    }

    #[test]
    fn test_truthiness() {
        assert!(!LarchVal::Nil.is_truthy());
        assert!(!LarchVal::Bool(false).is_truthy());
        assert!(LarchVal::Int(0).is_truthy());
        assert!(LarchVal::string("").is_truthy());
    }

    #[test]
    fn test_float_display() {
        assert_eq!(LarchVal::Float(42.0).to_string(), "42.0");
        assert_eq!(LarchVal::Float(2.5).to_string(), "2.5");
        assert_eq!(LarchVal::Float(f64::NEG_INFINITY).to_string(), "##-Inf");
    }

    #[test]
    fn test_collection_display() {
        let v = LarchVal::vector(vec![LarchVal::Int(1), LarchVal::string("a\"b")]);
        assert_eq!(v.to_string(), "[1 \"a\\\"b\"]");
        let m = LarchVal::map(vec![(LarchVal::Keyword(Keyword::new("a")), LarchVal::Nil)]);
        assert_eq!(m.to_string(), "{:a nil}");
        assert_eq!(LarchVal::error("bad").to_string(), "#<error bad>");
    }

    #[test]
    fn test_int_and_float_are_distinct() {
        assert_ne!(LarchVal::Int(1), LarchVal::Float(1.0));
        assert!(LarchVal::Int(100) < LarchVal::Float(0.5));
    }

    #[test]
    fn test_type_name() {
        assert_eq!(LarchVal::Nil.type_name(), "nil");
        assert_eq!(LarchVal::Bool(true).type_name(), "boolean");
        assert_eq!(LarchVal::Int(1).type_name(), "integer");
        assert_eq!(LarchVal::atom(LarchVal::Nil).type_name(), "atom");
    }

    #[test]
    fn test_find_arity_prefers_fixed() {
        let env: Arc<dyn Any + Send + Sync> = Arc::new(());
        let x = Symbol::new("x");
        let f = LarchFn::new(
            None,
            vec![
                FnArity::new(vec![], Some(Symbol::new("more")), vec![]),
                FnArity::new(vec![x.clone()], None, vec![]),
            ],
            env,
        );
        assert_eq!(f.find_arity(1).map(|a| a.params.len()), Some(1));
        assert!(f.find_arity(3).is_some_and(|a| a.rest_param.is_some()));
    }

    #[test]
    fn test_function_identity() {
        let env: Arc<dyn Any + Send + Sync> = Arc::new(());
        let f = LarchVal::Fn(LarchFn::new(None, vec![], env.clone()));
        let g = LarchVal::Fn(LarchFn::new(None, vec![], env));
        assert_eq!(f, f.clone());
        assert_ne!(f, g);
    }
}
