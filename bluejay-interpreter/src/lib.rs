//! BlueJay Interpreter - tree-walking evaluator for BlueJay programs
//!
//! Takes the syntax tree produced by `bluejay-parser` and executes it:
//! - `value`: the dynamically typed runtime value and its operator rules
//! - `environment`: the flat binding map with block-lifetime declarations
//! - `evaluator`: expression reduction
//! - `interpreter`: statement and control-flow execution
//! - `scope_guard`: RAII block scopes so faults never leave blocks open
//! - `output`: the sink `print_value` and `print_line` write to

// Allow clippy lints for development
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::result_large_err)]

pub mod environment;
pub mod error;
pub mod evaluator;
pub mod interpreter;
pub mod output;
pub mod scope_guard;
pub mod test_harness;
pub mod value;

// Include tests directory with all test modules
#[cfg(test)]
#[path = "tests/mod.rs"]
pub mod tests;

// Re-export public API
pub use environment::Environment;
pub use error::{InterpreterError, Result, RuntimeError};
pub use evaluator::ExpressionEvaluator;
pub use interpreter::Interpreter;
pub use output::Output;
pub use scope_guard::BlockScope;
pub use test_harness::{InterpreterSession, TestHarnessError};
pub use value::{FLOAT_EPSILON, Value, ValueKind};

use bluejay_parser::{Expression, Program};

/// Evaluate a single expression against an environment
pub fn evaluate_expression(
    expression: &Expression,
    environment: &mut Environment,
) -> Result<Value> {
    let evaluator = ExpressionEvaluator::new();
    evaluator.evaluate(expression, environment)
}

/// Run a whole program with a fresh interpreter, returning the output sink
pub fn run_program<O: Output>(program: &Program, output: O) -> Result<O> {
    let mut interpreter = Interpreter::new(output);
    interpreter.run(program)?;
    Ok(interpreter.into_output())
}

/// Parse and run source text, returning everything it printed
///
/// This is mainly useful for testing and embedding.
pub fn run_source(source: &str) -> std::result::Result<String, InterpreterError> {
    let program = bluejay_parser::parse_program(source)?;
    let output = run_program(&program, Vec::<u8>::new())?;
    Ok(String::from_utf8_lossy(&output).into_owned())
}
