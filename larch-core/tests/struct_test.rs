// larch-core - Struct integration tests
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Integration tests for Larch structs.
//!
//! Tests for: defstruct, struct, struct-map, accessor

mod common;

use common::{LarchVal, eval_all, kw, new_env, sym, take_messages};
use larch_core::Severity;

fn person_env() -> common::Env {
    let env = new_env();
    eval_all("(defstruct person :name :age)", &env).unwrap();
    env
}

#[test]
fn test_defstruct_returns_name() {
    assert_eval!("(defstruct person :name :age)", sym("person"));
}

#[test]
fn test_struct_positional() {
    let env = person_env();
    assert_eval_with_env!(
        r#"(struct person "Ann" 30)"#,
        eval_all(r#"{:name "Ann" :age 30}"#, &env).unwrap(),
        &env
    );
}

#[test]
fn test_struct_missing_values_are_nil() {
    let env = person_env();
    assert_eval_with_env!(r#"(:age (struct person "Ann"))"#, LarchVal::Nil, &env);
    assert_eval_with_env!(r#"(contains? (struct person "Ann") :age)"#, LarchVal::Bool(true), &env);
}

#[test]
fn test_struct_instances_are_plain_maps() {
    let env = person_env();
    assert_eval_with_env!(r#"(type (struct person "Ann" 30))"#, sym("Map"), &env);
    assert_eval_with_env!(r#"(record? (struct person "Ann" 30))"#, LarchVal::Bool(false), &env);
}

#[test]
fn test_symbol_fields_normalize_to_keywords() {
    assert_eval!(
        "(defstruct point x y) (:y (struct point 1 2))",
        LarchVal::int(2)
    );
}

#[test]
fn test_struct_map_matches_positional() {
    let env = person_env();
    assert_eval_with_env!(
        r#"(= (struct-map person :age 30 :name "Ann") (struct person "Ann" 30))"#,
        LarchVal::Bool(true),
        &env
    );
    assert_eval_with_env!(r#"(:age (struct-map person :name "Ann"))"#, LarchVal::Nil, &env);
}

#[test]
fn test_struct_map_drops_unknown_keys() {
    let env = person_env();
    assert_eval_with_env!(
        r#"(struct-map person :name "Ann" :email "a@b")"#,
        eval_all(r#"{:name "Ann" :age nil}"#, &env).unwrap(),
        &env
    );
    let messages = take_messages(&env);
    assert_eq!(messages.len(), 1);
    assert!(messages[0].contains(":email"), "{}", messages[0]);
}

#[test]
fn test_struct_map_odd_arguments_rejected() {
    let env = person_env();
    let result = eval_all("(struct-map person :name)", &env).unwrap();
    assert!(result.is_error());
    assert_eq!(env.registry().diagnostics().take()[0].severity, Severity::Error);
}

#[test]
fn test_accessor_reads_field() {
    let env = person_env();
    eval_all(
        r#"(def get-age (accessor person :age))
           (def ann (struct person "Ann" 30))"#,
        &env,
    )
    .unwrap();

    assert_eval_with_env!("(get-age ann)", LarchVal::int(30), &env);
    assert_eval_with_env!("(get-age {:age 5})", LarchVal::int(5), &env);
    assert_eval_with_env!("(get-age nil)", LarchVal::Nil, &env);
}

#[test]
fn test_accessor_uses_key_not_position() {
    let env = person_env();
    eval_all("(def get-age (accessor person :age))", &env).unwrap();
    assert_eval_with_env!("(get-age {:name 1 :zzz 2 :age 3})", LarchVal::int(3), &env);
}

#[test]
fn test_accessor_for_unknown_field_rejected() {
    let env = person_env();
    let result = eval_all("(accessor person :email)", &env).unwrap();
    assert!(result.is_error());
}

#[test]
fn test_unknown_struct_rejected() {
    let env = new_env();
    assert!(eval_all("(struct nobody 1)", &env).unwrap().is_error());
    assert!(eval_all("(struct-map nobody :a 1)", &env).unwrap().is_error());
    assert!(eval_all("(accessor nobody :a)", &env).unwrap().is_error());
    assert_eq!(env.registry().diagnostics().len(), 3);
}

#[test]
fn test_malformed_defstruct_rejected() {
    let env = new_env();
    assert!(eval_all("(defstruct 1 :a)", &env).unwrap().is_error());
    assert!(eval_all("(defstruct s :a 2)", &env).unwrap().is_error());
    assert!(!env.is_defined(&larch_parser::Symbol::new("s")));
}

#[test]
fn test_struct_constructor_surplus_is_soft() {
    let env = person_env();
    assert_eval_with_env!("(struct person 1 2 3)", LarchVal::Nil, &env);
    assert_eq!(take_messages(&env).len(), 1);
}

#[test]
fn test_accessor_on_non_map_is_soft() {
    let env = person_env();
    eval_all("(def get-name (accessor person :name))", &env).unwrap();
    assert_eval_with_env!("(get-name 42)", LarchVal::Nil, &env);
    assert_eq!(take_messages(&env).len(), 1);
    assert_eval_with_env!("(get-name {:name :ok})", kw("ok"), &env);
}
