//! Interpreter session for the BlueJay interpreter
//!
//! This module provides an interpreter session that allows:
//! - Execute BlueJay snippets against one persistent interpreter
//! - Capture everything printed, for assertions on program output
//! - Assert on the evaluated results with kind checking
//! - Set up variables before running a scenario

use crate::error::RuntimeError;
use crate::interpreter::Interpreter;
use crate::value::{Value, ValueKind};
use bluejay_parser::{ParseError, parse_program};
use miette::Diagnostic;
use thiserror::Error;

/// Errors that can occur during session operations
#[derive(Debug, Error, Diagnostic)]
pub enum TestHarnessError {
    #[error("Parse error: {source}")]
    Parse {
        #[from]
        source: ParseError,
    },

    #[error("Runtime error: {source}")]
    Runtime {
        #[from]
        source: RuntimeError,
    },

    #[error("Assertion failed: expected {expected}, but got {actual}")]
    AssertionFailed { expected: String, actual: String },

    #[error("Type error: expected {expected_type}, got {actual_type}")]
    TypeError {
        expected_type: String,
        actual_type: String,
    },

    #[error("No value: the last statement of `{code}` does not produce one")]
    NoValue { code: String },

    #[error("Expected a runtime error, but `{code}` succeeded")]
    UnexpectedSuccess { code: String },
}

/// Interpreter session for running BlueJay snippets
///
/// Bindings and captured output persist between calls, like a REPL.
pub struct InterpreterSession {
    interpreter: Interpreter<Vec<u8>>,
}

impl InterpreterSession {
    /// Create a new interpreter session
    pub fn new() -> Self {
        Self {
            interpreter: Interpreter::new(Vec::new()),
        }
    }

    /// Execute every statement of `code`, returning what the last one produced
    pub fn execute(&mut self, code: &str) -> Result<Option<Value>, TestHarnessError> {
        let program = parse_program(code)?;

        let mut last = None;
        for statement in &program.statements {
            last = self.interpreter.execute(statement)?;
        }
        Ok(last)
    }

    /// Execute `code` and return the value of its last statement
    pub fn evaluate(&mut self, code: &str) -> Result<Value, TestHarnessError> {
        self.execute(code)?.ok_or_else(|| TestHarnessError::NoValue {
            code: code.to_string(),
        })
    }

    /// Drain everything printed so far
    pub fn take_output(&mut self) -> String {
        let bytes = std::mem::take(self.interpreter.output_mut());
        String::from_utf8_lossy(&bytes).into_owned()
    }

    /// Execute code and assert it evaluates to a specific integer value
    pub fn assert_evaluates_to_integer(
        &mut self,
        code: &str,
        expected: i64,
    ) -> Result<(), TestHarnessError> {
        let result = self.evaluate(code)?;

        match result {
            Value::Integer(value) if value == expected => Ok(()),
            Value::Integer(value) => Err(TestHarnessError::AssertionFailed {
                expected: expected.to_string(),
                actual: value.to_string(),
            }),
            _ => Err(Self::kind_mismatch(ValueKind::Integer, &result)),
        }
    }

    /// Execute code and assert it evaluates to a floating value equal to `expected`
    /// under the language's float equality
    pub fn assert_evaluates_to_float(
        &mut self,
        code: &str,
        expected: f64,
    ) -> Result<(), TestHarnessError> {
        let result = self.evaluate(code)?;

        match result {
            Value::Floating(_) if result.equals(&Value::Floating(expected)) => Ok(()),
            Value::Floating(value) => Err(TestHarnessError::AssertionFailed {
                expected: expected.to_string(),
                actual: value.to_string(),
            }),
            _ => Err(Self::kind_mismatch(ValueKind::Floating, &result)),
        }
    }

    /// Execute code and assert it evaluates to a specific boolean value
    pub fn assert_evaluates_to_boolean(
        &mut self,
        code: &str,
        expected: bool,
    ) -> Result<(), TestHarnessError> {
        let result = self.evaluate(code)?;

        match result {
            Value::Boolean(value) if value == expected => Ok(()),
            Value::Boolean(value) => Err(TestHarnessError::AssertionFailed {
                expected: expected.to_string(),
                actual: value.to_string(),
            }),
            _ => Err(Self::kind_mismatch(ValueKind::Boolean, &result)),
        }
    }

    /// Execute code and assert it evaluates to a specific text value
    pub fn assert_evaluates_to_text(
        &mut self,
        code: &str,
        expected: &str,
    ) -> Result<(), TestHarnessError> {
        let result = self.evaluate(code)?;

        match &result {
            Value::Text(value) if value == expected => Ok(()),
            Value::Text(value) => Err(TestHarnessError::AssertionFailed {
                expected: format!("{:?}", expected),
                actual: format!("{:?}", value),
            }),
            _ => Err(Self::kind_mismatch(ValueKind::Text, &result)),
        }
    }

    /// Execute code and assert it evaluates to nil
    pub fn assert_evaluates_to_nil(&mut self, code: &str) -> Result<(), TestHarnessError> {
        let result = self.evaluate(code)?;

        match result {
            Value::Nil => Ok(()),
            _ => Err(Self::kind_mismatch(ValueKind::Nil, &result)),
        }
    }

    /// Execute code and assert it evaluates to exactly `expected`
    pub fn assert_evaluates_to_value(
        &mut self,
        code: &str,
        expected: Value,
    ) -> Result<(), TestHarnessError> {
        let result = self.evaluate(code)?;

        if result == expected {
            Ok(())
        } else {
            Err(TestHarnessError::AssertionFailed {
                expected: format!("{:?}", expected),
                actual: format!("{:?}", result),
            })
        }
    }

    /// Execute code and assert on exactly what it printed
    pub fn assert_output(&mut self, code: &str, expected: &str) -> Result<(), TestHarnessError> {
        self.take_output();
        self.execute(code)?;
        let actual = self.take_output();

        if actual == expected {
            Ok(())
        } else {
            Err(TestHarnessError::AssertionFailed {
                expected: format!("{:?}", expected),
                actual: format!("{:?}", actual),
            })
        }
    }

    /// Execute code that must fail at runtime, returning the failure
    pub fn expect_runtime_error(&mut self, code: &str) -> Result<RuntimeError, TestHarnessError> {
        match self.execute(code) {
            Err(TestHarnessError::Runtime { source }) => Ok(source),
            Err(other) => Err(other),
            Ok(_) => Err(TestHarnessError::UnexpectedSuccess {
                code: code.to_string(),
            }),
        }
    }

    /// Bind a variable in the current scope before running code
    pub fn define_variable(&mut self, name: &str, value: Value) {
        self.interpreter
            .environment_mut()
            .declare_or_assign(name, value);
    }

    /// Get a variable value from the session
    pub fn get_variable(&self, name: &str) -> Result<Value, TestHarnessError> {
        Ok(self.interpreter.environment().lookup(name)?)
    }

    pub fn is_bound(&self, name: &str) -> bool {
        self.interpreter.environment().is_bound(name)
    }

    /// Current block depth (0 unless a guard leaked)
    pub fn depth(&self) -> usize {
        self.interpreter.environment().depth()
    }

    /// Drop all bindings and captured output
    pub fn reset(&mut self) {
        self.interpreter.environment_mut().reset();
        self.take_output();
    }

    pub fn interpreter(&self) -> &Interpreter<Vec<u8>> {
        &self.interpreter
    }

    pub fn interpreter_mut(&mut self) -> &mut Interpreter<Vec<u8>> {
        &mut self.interpreter
    }

    fn kind_mismatch(expected: ValueKind, actual: &Value) -> TestHarnessError {
        TestHarnessError::TypeError {
            expected_type: expected.to_string(),
            actual_type: actual.kind().to_string(),
        }
    }
}

impl Default for InterpreterSession {
    fn default() -> Self {
        Self::new()
    }
}
