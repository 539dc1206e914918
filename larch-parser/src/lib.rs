// larch-parser - Values, lexer and parser for the Larch language
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! # larch-parser
//!
//! The Larch value model and reader. Defines `LarchVal` together with the
//! object-model value types (protocols, records, atoms) and the type tags
//! used for protocol dispatch, and parses source strings into `LarchVal`
//! forms.

mod intern;

pub mod atom;
pub mod keyword;
pub mod lexer;
pub mod parser;
pub mod protocol;
pub mod record;
pub mod symbol;
pub mod type_tag;
pub mod value;

pub use atom::LarchAtom;
pub use im::{OrdMap, OrdSet, Vector};
pub use keyword::Keyword;
pub use lexer::{Lexer, LexerError};
pub use parser::{ParseError, Parser, read, read_all};
pub use protocol::{LarchProtocol, MethodSignature, MethodTable, Protocol};
pub use record::{RecordDef, RecordInstance, StructDef, normalize_key};
pub use symbol::Symbol;
pub use type_tag::{TypeTag, form_to_type_tag, symbol_to_type_tag};
pub use value::{FnArity, LarchFn, LarchLazySeq, LarchNativeFn, LarchVal, LazySeqState};
