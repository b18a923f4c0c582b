//! Runtime error types for the BlueJay interpreter.
//!
//! Every runtime fault is fatal to the running program. Errors carry an
//! optional source span which the evaluator fills in with the innermost
//! failing node, so miette can highlight the offending region.

use bluejay_parser::{ParseError, Span};
use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

/// Runtime errors that can occur during interpretation
#[derive(Error, Diagnostic, Debug, Clone, PartialEq)]
pub enum RuntimeError {
    #[error("Undefined symbol: {name}")]
    #[diagnostic(
        code(bluejay::runtime::undefined_symbol),
        help("Assign a value to `{name}` before using it")
    )]
    UndefinedSymbol {
        name: String,
        #[label("not bound here")]
        span: Option<SourceSpan>,
    },

    #[error("Invalid operand type: {operation} cannot be applied to [{operand_types}]")]
    #[diagnostic(
        code(bluejay::runtime::invalid_operand_type),
        help("Check that the operation is supported for these value kinds")
    )]
    InvalidOperandType {
        operation: String,
        operand_types: String, // Join kinds with ", " when creating the error
        #[label("invalid operand")]
        span: Option<SourceSpan>,
    },

    #[error("Division by zero")]
    #[diagnostic(
        code(bluejay::runtime::division_by_zero),
        help("Integer division and modulo need a non-zero divisor")
    )]
    DivisionByZero {
        #[label("division by zero here")]
        span: Option<SourceSpan>,
    },

    #[error("Unknown operator: {operator}")]
    #[diagnostic(
        code(bluejay::runtime::unknown_operator),
        help("The parser produced an operator the evaluator does not handle here")
    )]
    UnknownOperator {
        operator: String,
        #[label("unknown operator")]
        span: Option<SourceSpan>,
    },

    #[error("Output error: {message}")]
    #[diagnostic(code(bluejay::runtime::output))]
    Output { message: String },
}

impl RuntimeError {
    /// Create an undefined symbol error
    pub fn undefined_symbol(name: &str) -> Self {
        Self::UndefinedSymbol {
            name: name.to_string(),
            span: None,
        }
    }

    /// Create an undefined symbol error with span
    pub fn undefined_symbol_with_span(name: &str, span: Span) -> Self {
        Self::UndefinedSymbol {
            name: name.to_string(),
            span: Some(span_to_source_span(span)),
        }
    }

    /// Create an invalid operand type error
    pub fn invalid_operand_type(operation: &str, operand_types: Vec<String>) -> Self {
        Self::InvalidOperandType {
            operation: operation.to_string(),
            operand_types: operand_types.join(", "),
            span: None,
        }
    }

    /// Create an invalid operand type error with span
    pub fn invalid_operand_type_with_span(
        operation: &str,
        operand_types: Vec<String>,
        span: Span,
    ) -> Self {
        Self::InvalidOperandType {
            operation: operation.to_string(),
            operand_types: operand_types.join(", "),
            span: Some(span_to_source_span(span)),
        }
    }

    /// Create a division by zero error
    pub fn division_by_zero() -> Self {
        Self::DivisionByZero { span: None }
    }

    /// Create a division by zero error with span
    pub fn division_by_zero_with_span(span: Span) -> Self {
        Self::DivisionByZero {
            span: Some(span_to_source_span(span)),
        }
    }

    /// Create an unknown operator error
    pub fn unknown_operator(operator: &str) -> Self {
        Self::UnknownOperator {
            operator: operator.to_string(),
            span: None,
        }
    }

    /// Create an unknown operator error with span
    pub fn unknown_operator_with_span(operator: &str, span: Span) -> Self {
        Self::UnknownOperator {
            operator: operator.to_string(),
            span: Some(span_to_source_span(span)),
        }
    }

    /// Create an output error from a failing stream
    pub fn output(error: std::io::Error) -> Self {
        Self::Output {
            message: error.to_string(),
        }
    }

    /// Attach a span unless the error already points somewhere more specific
    pub fn with_span(mut self, span: Span) -> Self {
        if let Some(slot) = self.span_slot() {
            if slot.is_none() {
                *slot = Some(span_to_source_span(span));
            }
        }
        self
    }

    /// The labelled source region, if any
    pub fn span(&self) -> Option<SourceSpan> {
        match self {
            Self::UndefinedSymbol { span, .. }
            | Self::InvalidOperandType { span, .. }
            | Self::DivisionByZero { span }
            | Self::UnknownOperator { span, .. } => *span,
            Self::Output { .. } => None,
        }
    }

    fn span_slot(&mut self) -> Option<&mut Option<SourceSpan>> {
        match self {
            Self::UndefinedSymbol { span, .. }
            | Self::InvalidOperandType { span, .. }
            | Self::DivisionByZero { span }
            | Self::UnknownOperator { span, .. } => Some(span),
            Self::Output { .. } => None,
        }
    }
}

/// Errors from the parse-then-run entry points
#[derive(Error, Diagnostic, Debug)]
pub enum InterpreterError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Runtime(#[from] RuntimeError),
}

/// Convert parser Span to miette SourceSpan
fn span_to_source_span(span: Span) -> SourceSpan {
    SourceSpan::new(span.start.into(), span.len())
}

/// Type alias for interpreter results
pub type Result<T> = std::result::Result<T, RuntimeError>;
