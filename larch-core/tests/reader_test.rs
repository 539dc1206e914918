// larch-core - Reader integration tests
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Integration tests for reading and evaluating Larch source.

mod common;

use common::{LarchVal, Parser, eval_all, kw, new_env, sym};

fn read_one(s: &str) -> LarchVal {
    Parser::new(s).unwrap().parse().unwrap().unwrap()
}

// =============================================================================
// Literals
// =============================================================================

#[test]
fn test_numbers() {
    assert_eval!("42", LarchVal::int(42));
    assert_eval!("-7", LarchVal::int(-7));
    assert_eval!("2.5", LarchVal::float(2.5));
}

#[test]
fn test_strings_with_escapes() {
    assert_eval!(r#""a\"b""#, LarchVal::string("a\"b"));
    assert_eval!(r#""line\nbreak""#, LarchVal::string("line\nbreak"));
}

#[test]
fn test_collections_evaluate_elements() {
    let env = new_env();
    eval_all("(def x 2)", &env).unwrap();
    assert_eval_with_env!(
        "[1 x (+ x 1)]",
        LarchVal::vector(vec![LarchVal::int(1), LarchVal::int(2), LarchVal::int(3)]),
        &env
    );
    assert_eval_with_env!(
        "{:k x}",
        LarchVal::map(vec![(kw("k"), LarchVal::int(2))]),
        &env
    );
    assert_eval_with_env!("#{x}", LarchVal::set(vec![LarchVal::int(2)]), &env);
}

// =============================================================================
// Reader macros
// =============================================================================

#[test]
fn test_quote_and_deref_expand() {
    assert_eq!(
        read_one("'a"),
        LarchVal::list(vec![sym("quote"), sym("a")])
    );
    assert_eq!(
        read_one("@a"),
        LarchVal::list(vec![sym("deref"), sym("a")])
    );
}

#[test]
fn test_comments_are_skipped() {
    assert_eval!("; a comment\n(+ 1 2) ; trailing", LarchVal::int(3));
}

// =============================================================================
// Object-model names
// =============================================================================

#[test]
fn test_generated_names_read_as_symbols() {
    for name in ["->Point", "map->Point", "Point.", "Point?", ".-x"] {
        assert_eq!(read_one(name), sym(name), "{}", name);
    }
}

#[test]
fn test_bang_names_read_as_symbols() {
    for name in ["swap!", "reset-vals!", "compare-and-set!"] {
        assert_eq!(read_one(name), sym(name), "{}", name);
    }
}

#[test]
fn test_unterminated_form_is_error() {
    assert!(Parser::new("(defrecord P [x]").and_then(|mut p| p.parse()).is_err());
    assert!(eval_all("(+ 1", &new_env()).is_err());
}
