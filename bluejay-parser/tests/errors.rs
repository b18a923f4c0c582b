// Parse error reporting tests

use bluejay_parser::*;
use miette::Diagnostic;

#[test]
fn test_missing_closing_brace() {
    let error = parse_program("if true { x = 1").unwrap_err();
    match error {
        ParseError::PestError { message, .. } => assert!(!message.is_empty()),
        other => panic!("Expected pest error, got: {:?}", other),
    }
}

#[test]
fn test_keyword_cannot_be_assigned() {
    assert!(parse_program("while = 3").is_err());
    assert!(parse_program("true = 1").is_err());
}

#[test]
fn test_assignment_is_not_an_expression() {
    assert!(parse_expression("x = 1").is_err());
}

#[test]
fn test_trailing_operator() {
    assert!(parse_expression("1 +").is_err());
}

#[test]
fn test_elif_requires_if() {
    assert!(parse_program("elif true { }").is_err());
}

#[test]
fn test_error_carries_diagnostic_code() {
    let error = parse_program("x = (1 + 2").unwrap_err();
    let code = error.code().map(|code| code.to_string());
    assert_eq!(code.as_deref(), Some("bluejay::parse::pest_error"));
}

#[test]
fn test_invalid_integer_reports_literal() {
    match parse_program("x = 99999999999999999999").unwrap_err() {
        ParseError::InvalidInteger { found, .. } => assert_eq!(found, "99999999999999999999"),
        other => panic!("Expected invalid integer, got: {:?}", other),
    }
}
