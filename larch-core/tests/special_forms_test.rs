// larch-core - Special form integration tests
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Tests for: quote, if, do, let, def, fn, lazy-seq, collection invocation
//! and evaluation errors

mod common;

use common::{LarchVal, eval_all, eval_str, kw, new_env, sym};
use larch_core::{get_max_eval_depth, set_max_eval_depth};

// =============================================================================
// Core forms
// =============================================================================

#[test]
fn test_self_evaluating() {
    assert_eval!("nil", LarchVal::Nil);
    assert_eval!("true", LarchVal::Bool(true));
    assert_eval!("1.5", LarchVal::float(1.5));
    assert_eval!("\"s\"", LarchVal::string("s"));
    assert_eval!(":k", kw("k"));
    assert_eval!("()", LarchVal::list(vec![]));
}

#[test]
fn test_quote() {
    assert_eval!("'x", sym("x"));
    assert_eval!("(quote (a b))", LarchVal::list(vec![sym("a"), sym("b")]));
}

#[test]
fn test_if() {
    assert_eval!("(if true 1 2)", LarchVal::int(1));
    assert_eval!("(if nil 1 2)", LarchVal::int(2));
    assert_eval!("(if false 1)", LarchVal::Nil);
    // Only nil and false are falsey
    assert_eval!("(if 0 :yes :no)", kw("yes"));
}

#[test]
fn test_do_and_let() {
    assert_eval!("(do 1 2 3)", LarchVal::int(3));
    assert_eval!("(do)", LarchVal::Nil);
    assert_eval!("(let [x 1 y (+ x 1)] (* x y 10))", LarchVal::int(20));
}

#[test]
fn test_def_returns_value() {
    let env = new_env();
    assert_eval_with_env!("(def x 10)", LarchVal::int(10), &env);
    assert_eval_with_env!("x", LarchVal::int(10), &env);
}

#[test]
fn test_def_inside_let_is_global() {
    let env = new_env();
    eval_all("(let [v 5] (def from-let v))", &env).unwrap();
    assert_eval_with_env!("from-let", LarchVal::int(5), &env);
}

#[test]
fn test_fn_arities_and_rest() {
    let env = new_env();
    eval_all(
        "(def f (fn
                  ([] :zero)
                  ([a] a)
                  ([a & more] (count more))))",
        &env,
    )
    .unwrap();

    assert_eval_with_env!("(f)", kw("zero"), &env);
    assert_eval_with_env!("(f 1)", LarchVal::int(1), &env);
    assert_eval_with_env!("(f 1 2 3)", LarchVal::int(2), &env);
}

#[test]
fn test_named_fn_recursion() {
    assert_eval!(
        "((fn fact [n] (if (< n 2) 1 (* n (fact (dec n))))) 5)",
        LarchVal::int(120)
    );
}

#[test]
fn test_closures_capture_environment() {
    assert_eval!(
        "(def make-adder (fn [n] (fn [x] (+ x n))))
         ((make-adder 3) 4)",
        LarchVal::int(7)
    );
}

// =============================================================================
// Invocation of non-functions
// =============================================================================

#[test]
fn test_collections_as_functions() {
    assert_eval!("({:a 1} :a)", LarchVal::int(1));
    assert_eval!("({:a 1} :b :none)", kw("none"));
    assert_eval!("([10 20] 1)", LarchVal::int(20));
    assert_eval!("(#{:a} :a)", kw("a"));
    assert_eval!("(:a {:a 2})", LarchVal::int(2));
}

#[test]
fn test_calling_non_function_is_error() {
    let err = eval_str("(1 2)").unwrap_err();
    assert!(err.contains("Cannot call"), "{}", err);
}

#[test]
fn test_undefined_symbol_is_error() {
    let err = eval_str("nope").unwrap_err();
    assert!(err.contains("nope"), "{}", err);
}

#[test]
fn test_wrong_arity_is_error() {
    assert!(eval_str("((fn [x] x))").is_err());
}

// =============================================================================
// Lazy sequences
// =============================================================================

#[test]
fn test_lazy_seq_realizes_on_first_use() {
    let env = new_env();
    eval_all(
        "(def calls (atom 0))
         (def s (lazy-seq (swap! calls inc) (list 1 2 3)))",
        &env,
    )
    .unwrap();

    assert_eval_with_env!("@calls", LarchVal::int(0), &env);
    assert_eval_with_env!("(first s)", LarchVal::int(1), &env);
    assert_eval_with_env!("(count s)", LarchVal::int(3), &env);
    assert_eval_with_env!("@calls", LarchVal::int(1), &env);
}

#[test]
fn test_lazy_seq_type_tag() {
    assert_eval!("(type (lazy-seq nil))", sym("LazySeq"));
    assert_eval!("(seq (lazy-seq nil))", LarchVal::Nil);
}

#[test]
fn test_protocol_dispatch_on_lazy_seq() {
    assert_eval!(
        "(defprotocol Size (size [x]))
         (extend-protocol Size LazySeq (size [s] (count s)))
         (size (lazy-seq (list 1 2)))",
        LarchVal::int(2)
    );
}

// =============================================================================
// Depth limit
// =============================================================================

#[test]
fn test_runaway_recursion_is_an_error() {
    let previous = get_max_eval_depth();
    set_max_eval_depth(200);

    let result = eval_str("(def loop-forever (fn [n] (loop-forever n))) (loop-forever 1)");
    set_max_eval_depth(previous);

    assert!(result.is_err());
}
