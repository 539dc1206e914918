// larch-parser - Parser for Larch
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Recursive descent parser for Larch source code.
//!
//! Converts tokens into `LarchVal` AST nodes.

use thiserror::Error;

use crate::keyword::Keyword;
use crate::lexer::{Lexer, LexerError, Token};
use crate::symbol::Symbol;
use crate::value::LarchVal;

/// Parser error with position information.
#[derive(Debug, Clone, Error)]
#[error("Parse error at {line}:{column}: {message}")]
pub struct ParseError {
    pub message: String,
    pub line: usize,
    pub column: usize,
}

impl From<LexerError> for ParseError {
    fn from(e: LexerError) -> Self {
        ParseError {
            message: e.message,
            line: e.line,
            column: e.column,
        }
    }
}

/// The parser converts tokens into `LarchVal` AST nodes.
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    current: Token,
    line: usize,
    column: usize,
}

impl<'a> Parser<'a> {
    /// Create a new parser for the given source code.
    pub fn new(source: &'a str) -> Result<Self, ParseError> {
        let mut lexer = Lexer::new(source);
        let line = lexer.line();
        let column = lexer.column();
        let current = lexer.next_token()?;
        Ok(Parser {
            lexer,
            current,
            line,
            column,
        })
    }

    /// Parse a single form from the source.
    /// Returns None if at end of input.
    pub fn parse(&mut self) -> Result<Option<LarchVal>, ParseError> {
        self.skip_discards()?;
        if matches!(self.current, Token::Eof) {
            return Ok(None);
        }
        self.parse_form().map(Some)
    }

    /// Parse all forms from the source.
    pub fn parse_all(&mut self) -> Result<Vec<LarchVal>, ParseError> {
        let mut forms = Vec::new();
        while let Some(form) = self.parse()? {
            forms.push(form);
        }
        Ok(forms)
    }

    // ========================================================================
    // Internal parsing methods
    // ========================================================================

    fn advance(&mut self) -> Result<Token, ParseError> {
        let prev = std::mem::replace(&mut self.current, Token::Eof);
        // Position of the next token, before fetching it
        self.line = self.lexer.line();
        self.column = self.lexer.column();
        self.current = self.lexer.next_token()?;
        Ok(prev)
    }

    fn error(&self, message: String) -> ParseError {
        ParseError {
            message,
            line: self.line,
            column: self.column,
        }
    }

    fn expect(&mut self, expected: &Token) -> Result<(), ParseError> {
        if &self.current == expected {
            self.advance()?;
            Ok(())
        } else {
            Err(self.error(format!("Expected '{}', found '{}'", expected, self.current)))
        }
    }

    /// `#_form` drops the next form. Handled before every form position so a
    /// discard right before a closing delimiter is legal.
    fn skip_discards(&mut self) -> Result<(), ParseError> {
        while matches!(self.current, Token::Discard) {
            self.advance()?;
            self.skip_discards()?;
            if matches!(self.current, Token::Eof) {
                return Err(self.error("Expected form after #_".to_string()));
            }
            self.parse_form()?;
        }
        Ok(())
    }

    fn parse_form(&mut self) -> Result<LarchVal, ParseError> {
        self.skip_discards()?;
        let token = self.current.clone();
        match token {
            Token::LParen => return self.parse_list(),
            Token::LBracket => return self.parse_vector(),
            Token::LBrace => return self.parse_map(),
            Token::Set => return self.parse_set(),
            Token::Quote => return self.parse_wrapped("quote"),
            Token::Deref => return self.parse_wrapped("deref"),
            Token::RParen | Token::RBracket | Token::RBrace => {
                return Err(self.error(format!("Unexpected '{}'", token)));
            }
            Token::Eof => return Err(self.error("Unexpected end of input".to_string())),
            _ => {}
        }

        self.advance()?;
        Ok(match token {
            Token::Nil => LarchVal::Nil,
            Token::True => LarchVal::Bool(true),
            Token::False => LarchVal::Bool(false),
            Token::Int(n) => LarchVal::Int(n),
            Token::Float(n) => LarchVal::Float(n),
            Token::String(s) => LarchVal::string(s),
            Token::Symbol(s) => LarchVal::Symbol(Symbol::parse(&s)),
            Token::Keyword(s) => LarchVal::Keyword(Keyword::parse(&s)),
            other => return Err(self.error(format!("Unexpected token '{}'", other))),
        })
    }

    /// Parse forms until `close`, consuming it.
    fn parse_until(&mut self, close: &Token) -> Result<Vec<LarchVal>, ParseError> {
        self.advance()?; // opening delimiter
        let mut elements = Vec::new();
        loop {
            self.skip_discards()?;
            if &self.current == close || matches!(self.current, Token::Eof) {
                break;
            }
            elements.push(self.parse_form()?);
        }
        self.expect(close)?;
        Ok(elements)
    }

    fn parse_list(&mut self) -> Result<LarchVal, ParseError> {
        self.parse_until(&Token::RParen).map(LarchVal::list)
    }

    fn parse_vector(&mut self) -> Result<LarchVal, ParseError> {
        self.parse_until(&Token::RBracket).map(LarchVal::vector)
    }

    fn parse_map(&mut self) -> Result<LarchVal, ParseError> {
        let forms = self.parse_until(&Token::RBrace)?;
        if forms.len() % 2 != 0 {
            return Err(self.error("Map literal must contain an even number of forms".to_string()));
        }
        let mut pairs = Vec::with_capacity(forms.len() / 2);
        let mut iter = forms.into_iter();
        while let (Some(k), Some(v)) = (iter.next(), iter.next()) {
            pairs.push((k, v));
        }
        Ok(LarchVal::map(pairs))
    }

    fn parse_set(&mut self) -> Result<LarchVal, ParseError> {
        self.parse_until(&Token::RBrace).map(LarchVal::set)
    }

    fn parse_wrapped(&mut self, name: &str) -> Result<LarchVal, ParseError> {
        self.advance()?; // reader macro token
        let form = self.parse_form()?;
        Ok(LarchVal::list(vec![LarchVal::Symbol(Symbol::new(name)), form]))
    }
}

// ============================================================================
// Convenience functions
// ============================================================================

/// Parse a string and return the first form.
pub fn read(source: &str) -> Result<Option<LarchVal>, ParseError> {
    Parser::new(source)?.parse()
}

/// Parse a string and return all forms.
pub fn read_all(source: &str) -> Result<Vec<LarchVal>, ParseError> {
    Parser::new(source)?.parse_all()
}

// ============================================================================
// Tests
// ============================================================================
