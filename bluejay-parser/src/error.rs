// BlueJay Parser Error Handling
// Error reporting with miette integration

use crate::parser::Rule;
use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

/// Main parse error type with miette integration
#[derive(Error, Diagnostic, Debug)]
pub enum ParseError {
    #[error("Parse error: {message}")]
    #[diagnostic(
        code(bluejay::parse::pest_error),
        help("Check the syntax near the highlighted location")
    )]
    PestError {
        #[source_code]
        src: String,
        #[label("error occurred here")]
        span: SourceSpan,
        message: String,
    },

    #[error("Invalid integer literal")]
    #[diagnostic(
        code(bluejay::parse::invalid_integer),
        help("Integer literals must be decimal numbers that fit in 64 bits (-9223372036854775808 to 9223372036854775807)")
    )]
    InvalidInteger {
        #[source_code]
        src: String,
        #[label("invalid integer")]
        span: SourceSpan,
        found: String,
    },

    #[error("Invalid float literal")]
    #[diagnostic(
        code(bluejay::parse::invalid_float),
        help("Float literals must be decimal numbers with a decimal point or exponent (e.g., 3.14, .5, 1e-4)")
    )]
    InvalidFloat {
        #[source_code]
        src: String,
        #[label("invalid float")]
        span: SourceSpan,
        found: String,
    },

    #[error("Unexpected grammar rule")]
    #[diagnostic(
        code(bluejay::parse::unexpected_rule),
        help("Expected rule: {expected}")
    )]
    UnexpectedRule {
        expected: String,
        found: Rule,
        #[label("unexpected rule here")]
        span: SourceSpan,
    },
}

impl ParseError {
    /// Create a parse error from a Pest parsing error
    pub fn from_pest_error(error: pest::error::Error<Rule>, src: String) -> Self {
        let span = match error.location {
            pest::error::InputLocation::Pos(pos) => SourceSpan::new(pos.into(), 0),
            pest::error::InputLocation::Span((start, end)) => {
                SourceSpan::new(start.into(), end - start)
            }
        };

        let message = match &error.variant {
            pest::error::ErrorVariant::ParsingError { positives, .. } if !positives.is_empty() => {
                let expected: Vec<String> = positives
                    .iter()
                    .map(rule_to_user_friendly_description)
                    .collect();
                format!("expected {}", expected.join(", or "))
            }
            pest::error::ErrorVariant::ParsingError { .. } => "unexpected input".to_string(),
            pest::error::ErrorVariant::CustomError { message } => message.clone(),
        };

        ParseError::PestError { src, span, message }
    }

    /// Create an invalid integer error
    pub fn invalid_integer(src: String, span: SourceSpan, found: String) -> Self {
        ParseError::InvalidInteger { src, span, found }
    }

    /// Create an invalid float error
    pub fn invalid_float(src: String, span: SourceSpan, found: String) -> Self {
        ParseError::InvalidFloat { src, span, found }
    }

    /// Create an unexpected rule error
    pub fn unexpected_rule(expected: &str, found: Rule, span: SourceSpan) -> Self {
        ParseError::UnexpectedRule {
            expected: expected.to_string(),
            found,
            span,
        }
    }
}

/// Result type for parsing operations
pub type ParseResult<T> = Result<T, ParseError>;

/// Convert a parser rule to a user-friendly description
fn rule_to_user_friendly_description(rule: &Rule) -> String {
    match rule {
        // Literals
        Rule::integer => "a number (like 42)".to_string(),
        Rule::float => "a decimal number (like 3.14)".to_string(),
        Rule::string => "a string (like \"hello\")".to_string(),
        Rule::boolean => "a boolean (true or false)".to_string(),
        Rule::nil => "nil".to_string(),

        // Identifiers
        Rule::identifier => "an identifier (like variable_name)".to_string(),

        // Expressions
        Rule::expression => "an expression".to_string(),
        Rule::parenthesized => "a parenthesized expression (like (x + y))".to_string(),
        Rule::compound_assignment => "a compound assignment (like x += 1)".to_string(),
        Rule::pre_increment | Rule::post_increment => "an increment (++)".to_string(),
        Rule::pre_decrement | Rule::post_decrement => "a decrement (--)".to_string(),

        // Statements
        Rule::assignment => "an assignment (name = value)".to_string(),
        Rule::block => "a block ({ ... })".to_string(),
        Rule::if_statement => "an if statement".to_string(),
        Rule::elif_clause => "an elif clause".to_string(),
        Rule::else_clause => "an else clause".to_string(),
        Rule::while_statement => "a while loop".to_string(),
        Rule::for_statement => "a for loop".to_string(),
        Rule::print_statement => "print_value(...) or print_line(...)".to_string(),
        Rule::EOI => "end of input".to_string(),

        // Operators
        Rule::op_or => "a logical OR operator (or, ||)".to_string(),
        Rule::op_and => "a logical AND operator (and, &&)".to_string(),
        Rule::op_not => "a logical NOT operator (not, !)".to_string(),
        Rule::op_equal => "an equality operator (==)".to_string(),
        Rule::op_not_equal => "a not-equal operator (!=)".to_string(),
        Rule::op_less => "a less-than operator (<)".to_string(),
        Rule::op_less_equal => "a less-than-or-equal operator (<=)".to_string(),
        Rule::op_greater => "a greater-than operator (>)".to_string(),
        Rule::op_greater_equal => "a greater-than-or-equal operator (>=)".to_string(),
        Rule::op_add => "an addition operator (+)".to_string(),
        Rule::op_subtract => "a subtraction operator (-)".to_string(),
        Rule::op_multiply => "a multiplication operator (*)".to_string(),
        Rule::op_divide => "a division operator (/)".to_string(),
        Rule::op_modulo => "a modulo operator (%)".to_string(),
        Rule::op_negate => "a unary minus (-)".to_string(),

        // Fallback for everything else
        _ => format!("{:?}", rule).replace('_', " "),
    }
}
