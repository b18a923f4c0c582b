//! Acceptance tests for block lifetime of bindings

use crate::error::RuntimeError;
use crate::test_harness::{InterpreterSession, TestHarnessError};
use crate::value::Value;

#[test]
fn test_name_declared_in_block_is_gone_after_exit() {
    let mut session = InterpreterSession::new();

    session.execute("{ inner = 1 }").unwrap();
    match session.expect_runtime_error("inner").unwrap() {
        RuntimeError::UndefinedSymbol { name, .. } => assert_eq!(name, "inner"),
        other => panic!("Expected undefined symbol, got: {:?}", other),
    }
}

#[test]
fn test_reassignment_in_block_mutates_outer_binding() {
    let mut session = InterpreterSession::new();
    session.execute("x = 1").unwrap();

    session.execute("{ x = 2 { x = 3 } y = x }").unwrap();
    assert_eq!(session.get_variable("x").unwrap(), Value::Integer(3));
    assert!(matches!(
        session.get_variable("y"),
        Err(TestHarnessError::Runtime {
            source: RuntimeError::UndefinedSymbol { .. }
        })
    ));
}

#[test]
fn test_inner_names_visible_to_nested_blocks() {
    let mut session = InterpreterSession::new();

    session
        .assert_output("{ a = 1 { print_value(a) a = 2 } print_value(a) }", "12")
        .unwrap();
    assert!(!session.is_bound("a"));
}

#[test]
fn test_name_first_declared_in_nested_block_dies_with_it() {
    let mut session = InterpreterSession::new();

    let error = session
        .expect_runtime_error("{ { deep = 1 } print_value(deep) }")
        .unwrap();
    assert!(matches!(error, RuntimeError::UndefinedSymbol { .. }));
}

#[test]
fn test_loop_body_reclaims_names_each_iteration() {
    let mut session = InterpreterSession::new();

    session
        .execute("i = 0; while i < 3 { temp = i * 2; i++ }")
        .unwrap();
    assert!(!session.is_bound("temp"));
    session.assert_evaluates_to_integer("i", 3).unwrap();
}

#[test]
fn test_fault_inside_blocks_restores_root_depth() {
    let mut session = InterpreterSession::new();
    session.execute("keep = 1").unwrap();

    let error = session
        .expect_runtime_error("{ a = 1 { b = 2 while true { c = b / 0 } } }")
        .unwrap();
    assert!(matches!(error, RuntimeError::DivisionByZero { .. }));

    assert_eq!(session.depth(), 0);
    assert!(!session.is_bound("a"));
    assert!(!session.is_bound("b"));
    assert!(!session.is_bound("c"));
    session.assert_evaluates_to_integer("keep", 1).unwrap();
}

#[test]
fn test_mutation_before_fault_persists() {
    let mut session = InterpreterSession::new();
    session.execute("x = 1").unwrap();

    session
        .expect_runtime_error("{ x = 5; missing }")
        .unwrap();
    session.assert_evaluates_to_integer("x", 5).unwrap();
}

#[test]
fn test_session_continues_after_failure() {
    let mut session = InterpreterSession::new();

    session.expect_runtime_error("{ y = 1; y / 0 }").unwrap();
    session.assert_evaluates_to_integer("y = 2", 2).unwrap();
    session.assert_evaluates_to_integer("y", 2).unwrap();
}
