//! Acceptance tests for the BlueJay interpreter
//!
//! These tests drive whole snippets through the parser → interpreter pipeline
//! using `InterpreterSession`.

pub mod test_scope_lifetime;
