// larch-core - Protocol integration tests
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Integration tests for Larch protocols.
//!
//! Tests for: defprotocol, extend-protocol, extend-type, extend, satisfies?,
//! extends?, protocol?, protocol dispatch

mod common;

use std::thread;

use common::{LarchVal, eval_all, kw, new_env, sym, take_messages};
use larch_core::Severity;

// =============================================================================
// Basic defprotocol
// =============================================================================

#[test]
fn test_defprotocol_returns_name() {
    assert_eval!("(defprotocol Greetable (greet [x]))", sym("Greetable"));
}

#[test]
fn test_defprotocol_binds_protocol_value() {
    assert_eval!(
        "(defprotocol Greetable (greet [x])) (protocol? Greetable)",
        LarchVal::Bool(true)
    );
}

#[test]
fn test_defprotocol_creates_method_dispatchers() {
    assert_eval!(
        "(defprotocol Describable
           (describe [x])
           (summarize [x n]))
         (= true (fn? describe) (fn? summarize))",
        LarchVal::Bool(true)
    );
}

#[test]
fn test_defprotocol_with_docstrings() {
    let env = new_env();
    eval_all(
        r#"(defprotocol Shape
             "Things with an area."
             (area [s] "The area of s")
             (scale [s] [s factor]))"#,
        &env,
    )
    .unwrap();

    assert_eval_with_env!("(:doc Shape)", LarchVal::string("Things with an area."), &env);
    assert_eval_with_env!("(:name Shape)", sym("Shape"), &env);
    assert_eval_with_env!("(count (:methods Shape))", LarchVal::int(2), &env);
    assert_eval_with_env!("(get Shape :type)", kw("protocol"), &env);
    assert!(take_messages(&env).is_empty());
}

#[test]
fn test_malformed_defprotocol_is_soft() {
    let env = new_env();
    assert_eval_with_env!("(defprotocol 42)", LarchVal::Nil, &env);
    assert_eval_with_env!("(defprotocol Bad (m))", LarchVal::Nil, &env);
    assert_eval_with_env!("(defprotocol Bad [x])", LarchVal::Nil, &env);

    let diagnostics = env.registry().diagnostics().take();
    assert_eq!(diagnostics.len(), 3);
    assert!(diagnostics.iter().all(|d| d.severity == Severity::Warning));
    assert!(!env.is_defined(&larch_parser::Symbol::new("Bad")));
}

// =============================================================================
// Dispatch
// =============================================================================

#[test]
fn test_dispatch_on_builtin_types() {
    let env = new_env();
    eval_all(
        r#"(defprotocol Describe (describe [x]))
           (extend-protocol Describe
             String (describe [s] (str "string " s))
             Long   (describe [n] (str "long " n))
             nil    (describe [_] "nothing"))"#,
        &env,
    )
    .unwrap();

    assert_eval_with_env!(r#"(describe "a")"#, LarchVal::string("string a"), &env);
    assert_eval_with_env!("(describe 7)", LarchVal::string("long 7"), &env);
    assert_eval_with_env!("(describe nil)", LarchVal::string("nothing"), &env);
}

#[test]
fn test_dispatch_passes_all_arguments() {
    assert_eval!(
        "(defprotocol Adder (add-to [x y z]))
         (extend-protocol Adder Long (add-to [x y z] (+ x y z)))
         (add-to 1 2 3)",
        LarchVal::int(6)
    );
}

#[test]
fn test_unimplemented_type_returns_nil_with_diagnostic() {
    let env = new_env();
    eval_all(
        "(defprotocol Describe (describe [x]))
         (extend-protocol Describe Long (describe [n] n))",
        &env,
    )
    .unwrap();

    assert_eval_with_env!(r#"(describe "not a number")"#, LarchVal::Nil, &env);
    let messages = take_messages(&env);
    assert_eq!(messages.len(), 1);
    assert!(messages[0].contains("Describe"), "{}", messages[0]);
    assert!(messages[0].contains("String"), "{}", messages[0]);
}

#[test]
fn test_missing_method_for_partially_extended_type() {
    let env = new_env();
    eval_all(
        "(defprotocol Pair (left [x]) (right [x]))
         (extend-protocol Pair Vector (left [v] (first v)))",
        &env,
    )
    .unwrap();

    assert_eval_with_env!("(left [1 2])", LarchVal::int(1), &env);
    assert_eval_with_env!("(right [1 2])", LarchVal::Nil, &env);
    let messages = take_messages(&env);
    assert_eq!(messages.len(), 1);
    assert!(messages[0].contains("right"), "{}", messages[0]);
}

#[test]
fn test_dispatch_with_no_arguments() {
    let env = new_env();
    eval_all("(defprotocol Describe (describe [x]))", &env).unwrap();
    assert_eval_with_env!("(describe)", LarchVal::Nil, &env);
    assert_eq!(take_messages(&env).len(), 1);
}

#[test]
fn test_dispatcher_sees_later_extensions() {
    let env = new_env();
    eval_all(
        "(defprotocol Describe (describe [x]))
         (def f describe)",
        &env,
    )
    .unwrap();
    eval_all("(extend-protocol Describe Keyword (describe [k] (name k)))", &env).unwrap();

    assert_eval_with_env!("(f :later)", LarchVal::string("later"), &env);
}

#[test]
fn test_extension_on_one_thread_is_seen_by_others() {
    let env = new_env();
    eval_all(
        "(defprotocol Describe (describe [x]))
         (def f describe)",
        &env,
    )
    .unwrap();

    thread::scope(|s| {
        s.spawn(|| {
            eval_all(
                "(extend-protocol Describe Long (describe [n] (* n 10)))",
                &env,
            )
            .unwrap();
        })
        .join()
        .unwrap();

        let handles: Vec<_> = (0..4)
            .map(|i| {
                let env = &env;
                s.spawn(move || {
                    let source = format!("(list (describe {}) (f {}))", i, i);
                    eval_all(&source, env).unwrap()
                })
            })
            .collect();

        for (i, handle) in handles.into_iter().enumerate() {
            let expected = LarchVal::list(vec![
                LarchVal::int(i as i64 * 10),
                LarchVal::int(i as i64 * 10),
            ]);
            assert_eq!(handle.join().unwrap(), expected);
        }
    });

    assert!(take_messages(&env).is_empty());
}

// =============================================================================
// Merge law
// =============================================================================

#[test]
fn test_extend_merges_methods_for_same_type() {
    let env = new_env();
    eval_all(
        "(defprotocol Pair (left [x]) (right [x]))
         (extend-protocol Pair Vector (left [v] (first v)))
         (extend-protocol Pair Vector (right [v] (nth v 1)))",
        &env,
    )
    .unwrap();

    assert_eval_with_env!("(left [1 2])", LarchVal::int(1), &env);
    assert_eval_with_env!("(right [1 2])", LarchVal::int(2), &env);
}

#[test]
fn test_re_extending_method_replaces_only_that_method() {
    let env = new_env();
    eval_all(
        r#"(defprotocol Pair (left [x]) (right [x]))
           (extend-type Vector Pair
             (left [v] :old-left)
             (right [v] :old-right))
           (extend-type Vector Pair
             (left [v] :new-left))"#,
        &env,
    )
    .unwrap();

    assert_eval_with_env!("(left [])", kw("new-left"), &env);
    assert_eval_with_env!("(right [])", kw("old-right"), &env);
}

#[test]
fn test_unknown_method_is_warned_and_skipped() {
    let env = new_env();
    eval_all(
        "(defprotocol Describe (describe [x]))
         (extend-protocol Describe Long
           (describe [n] :ok)
           (bogus [n] :bad))",
        &env,
    )
    .unwrap();

    assert_eval_with_env!("(describe 1)", kw("ok"), &env);
    let messages = take_messages(&env);
    assert_eq!(messages.len(), 1);
    assert!(messages[0].contains("bogus"), "{}", messages[0]);
    assert!(!env.is_defined(&larch_parser::Symbol::new("bogus")));
}

// =============================================================================
// extend-protocol / extend-type / extend return values and rejections
// =============================================================================

#[test]
fn test_extend_protocol_returns_protocol() {
    assert_eval!(
        "(defprotocol Describe (describe [x]))
         (protocol? (extend-protocol Describe Long (describe [n] n)))",
        LarchVal::Bool(true)
    );
}

#[test]
fn test_extend_protocol_accepts_quoted_name() {
    assert_eval!(
        "(defprotocol Describe (describe [x]))
         (extend-protocol 'Describe Long (describe [n] (inc n)))
         (describe 1)",
        LarchVal::int(2)
    );
}

#[test]
fn test_extend_protocol_rejects_non_protocol() {
    let env = new_env();
    let result = eval_all("(def not-a-protocol 1) (extend-protocol not-a-protocol Long (f [x] x))", &env)
        .unwrap();
    assert!(result.is_error());

    let diagnostics = env.registry().diagnostics().take();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].severity, Severity::Error);
}

#[test]
fn test_extend_type_returns_type_spec() {
    assert_eval!(
        "(defprotocol Describe (describe [x]))
         (extend-type String Describe (describe [s] s))",
        sym("String")
    );
}

#[test]
fn test_extend_type_multiple_protocols() {
    let env = new_env();
    eval_all(
        r#"(defprotocol Loud (shout [x]))
           (defprotocol Quiet (whisper [x]))
           (extend-type String
             Loud (shout [s] (str s "!"))
             Quiet (whisper [s] (str "(" s ")")))"#,
        &env,
    )
    .unwrap();

    assert_eval_with_env!(r#"(shout "hi")"#, LarchVal::string("hi!"), &env);
    assert_eval_with_env!(r#"(whisper "hi")"#, LarchVal::string("(hi)"), &env);
}

#[test]
fn test_extend_type_skips_non_protocol_block() {
    let env = new_env();
    eval_all(
        "(defprotocol Loud (shout [x]))
         (def plain 5)
         (extend-type Long
           plain (shout [n] :skipped)
           Loud (shout [n] :loud))",
        &env,
    )
    .unwrap();

    assert_eval_with_env!("(shout 1)", kw("loud"), &env);
    let messages = take_messages(&env);
    assert_eq!(messages.len(), 1);
    assert!(messages[0].contains("plain"), "{}", messages[0]);
}

#[test]
fn test_extend_with_method_map() {
    let env = new_env();
    let result = eval_all(
        "(defprotocol Pair (left [x]) (right [x]))
         (extend Vector Pair {:left (fn [v] (first v))
                              :right (fn [v] (nth v 1))})",
        &env,
    )
    .unwrap();

    assert_eq!(result, LarchVal::Nil);
    assert_eval_with_env!("(right [:a :b])", kw("b"), &env);
    assert!(take_messages(&env).is_empty());
}

#[test]
fn test_extend_skips_non_function_implementations() {
    let env = new_env();
    eval_all(
        "(defprotocol Pair (left [x]) (right [x]))
         (extend Vector Pair {:left (fn [v] (first v)) :right 42})",
        &env,
    )
    .unwrap();

    assert_eval_with_env!("(left [:a :b])", kw("a"), &env);
    assert_eval_with_env!("(right [:a :b])", LarchVal::Nil, &env);
    assert_eq!(take_messages(&env).len(), 2);
}

// =============================================================================
// satisfies? / extends?
// =============================================================================

#[test]
fn test_satisfies_after_partial_extension() {
    let env = new_env();
    eval_all(
        "(defprotocol Pair (left [x]) (right [x]))
         (extend-protocol Pair Vector (left [v] (first v)))",
        &env,
    )
    .unwrap();

    assert_eval_with_env!("(satisfies? Pair [1 2])", LarchVal::Bool(true), &env);
    assert_eval_with_env!("(satisfies? Pair '(1 2))", LarchVal::Bool(false), &env);
    assert_eval_with_env!("(satisfies? 'Pair [1 2])", LarchVal::Bool(true), &env);
}

#[test]
fn test_satisfies_with_empty_extension() {
    assert_eval!(
        "(defprotocol Marker (mark [x]))
         (extend Long Marker {})
         (satisfies? Marker 1)",
        LarchVal::Bool(true)
    );
}

#[test]
fn test_satisfies_after_extension_with_only_unknown_methods() {
    let env = new_env();
    eval_all(
        "(defprotocol Describe (describe [x]))
         (extend-protocol Describe String (zzz [this] 1))",
        &env,
    )
    .unwrap();

    assert_eq!(take_messages(&env).len(), 1);
    assert_eval_with_env!("(satisfies? Describe \"x\")", LarchVal::Bool(true), &env);
    assert_eval_with_env!("(describe \"x\")", LarchVal::Nil, &env);
    assert_eq!(take_messages(&env).len(), 1);
}

#[test]
fn test_extends_with_type_symbol() {
    let env = new_env();
    eval_all(
        "(defprotocol Describe (describe [x]))
         (extend-protocol Describe String (describe [s] s))",
        &env,
    )
    .unwrap();

    assert_eval_with_env!("(extends? Describe 'String)", LarchVal::Bool(true), &env);
    assert_eval_with_env!("(extends? Describe (type \"x\"))", LarchVal::Bool(true), &env);
    assert_eval_with_env!("(extends? Describe 'Long)", LarchVal::Bool(false), &env);
}

#[test]
fn test_satisfies_with_non_protocol_is_soft() {
    let env = new_env();
    assert_eval_with_env!("(satisfies? 42 1)", LarchVal::Nil, &env);
    assert_eq!(take_messages(&env).len(), 1);
}

#[test]
fn test_protocol_predicate() {
    let env = new_env();
    eval_all("(defprotocol P (m [x]))", &env).unwrap();
    assert_eval_with_env!("(protocol? P)", LarchVal::Bool(true), &env);
    assert_eval_with_env!("(protocol? m)", LarchVal::Bool(false), &env);
    assert_eval_with_env!("(protocol? nil)", LarchVal::Bool(false), &env);
}

#[test]
fn test_protocol_predicate_reads_type_entry() {
    let env = new_env();
    eval_all("(defrecord Marker [type])", &env).unwrap();
    assert_eval_with_env!("(protocol? {:type :protocol})", LarchVal::Bool(true), &env);
    assert_eval_with_env!("(protocol? {:type :protocol :name 'Fake})", LarchVal::Bool(true), &env);
    assert_eval_with_env!("(protocol? (->Marker :protocol))", LarchVal::Bool(true), &env);
    assert_eval_with_env!("(protocol? {:type 'protocol})", LarchVal::Bool(false), &env);
    assert_eval_with_env!("(protocol? {:type \"protocol\"})", LarchVal::Bool(false), &env);
    assert_eval_with_env!("(protocol? {:kind :protocol})", LarchVal::Bool(false), &env);
    assert_eval_with_env!("(protocol? [:type :protocol])", LarchVal::Bool(false), &env);
    assert!(take_messages(&env).is_empty());
}

// =============================================================================
// Records as dispatch targets
// =============================================================================

#[test]
fn test_dispatch_on_record_type() {
    let env = new_env();
    eval_all(
        "(defprotocol Area (area [s]))
         (defrecord Rect [w h])
         (defrecord Square [side])
         (extend-protocol Area
           Rect (area [r] (* (:w r) (:h r)))
           Square (area [s] (* (:side s) (:side s))))",
        &env,
    )
    .unwrap();

    assert_eval_with_env!("(area (->Rect 2 3))", LarchVal::int(6), &env);
    assert_eval_with_env!("(area (Square 4))", LarchVal::int(16), &env);
    assert_eval_with_env!("(satisfies? Area {:w 1 :h 1})", LarchVal::Bool(false), &env);
}

#[test]
fn test_type_override_changes_dispatch() {
    let env = new_env();
    eval_all(
        "(defprotocol Describe (describe [x]))
         (defrecord Cat [name])
         (defrecord Dog [name])
         (extend-protocol Describe
           Cat (describe [c] :meow)
           Dog (describe [d] :woof))",
        &env,
    )
    .unwrap();

    assert_eval_with_env!("(describe (->Cat \"tom\"))", kw("meow"), &env);
    assert_eval_with_env!("(describe (assoc (->Cat \"tom\") :type 'Dog))", kw("woof"), &env);
    assert_eval_with_env!("(type (assoc (->Cat \"tom\") :type :Dog))", sym("Dog"), &env);
    // A non-name :type is ignored
    assert_eval_with_env!("(type (assoc (->Cat \"tom\") :type 3))", sym("Cat"), &env);
}

#[test]
fn test_type_of_builtins() {
    let env = new_env();
    assert_eval_with_env!("(type nil)", sym("nil"), &env);
    assert_eval_with_env!("(type 1)", sym("Long"), &env);
    assert_eval_with_env!("(type 1.5)", sym("Double"), &env);
    assert_eval_with_env!("(type \"s\")", sym("String"), &env);
    assert_eval_with_env!("(type :k)", sym("Keyword"), &env);
    assert_eval_with_env!("(type 's)", sym("Symbol"), &env);
    assert_eval_with_env!("(type [])", sym("Vector"), &env);
    assert_eval_with_env!("(type {})", sym("Map"), &env);
    assert_eval_with_env!("(type '(1))", sym("List"), &env);
    assert_eval_with_env!("(type (atom 1))", sym("Atom"), &env);
}
