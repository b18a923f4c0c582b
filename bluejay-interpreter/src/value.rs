//! Runtime value representation for the BlueJay interpreter.
//!
//! This module defines the Value enum that represents all possible
//! runtime values in BlueJay, along with numeric promotion, arithmetic,
//! comparisons, equality and conversions.

use crate::error::{Result, RuntimeError};
use bluejay_parser::BinaryOperator;
use std::fmt;

/// Absolute tolerance used when comparing two floating values for equality
pub const FLOAT_EPSILON: f64 = 1e-11;

/// Runtime values in the BlueJay interpreter
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// 64-bit signed integer
    Integer(i64),
    /// 64-bit floating point number
    Floating(f64),
    /// UTF-8 text
    Text(String),
    /// Boolean value
    Boolean(bool),
    /// Absence of a value
    Nil,
}

/// The kind tag of a value, used in error messages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Integer,
    Floating,
    Text,
    Boolean,
    Nil,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::Integer => "Integer",
            ValueKind::Floating => "Floating",
            ValueKind::Text => "Text",
            ValueKind::Boolean => "Boolean",
            ValueKind::Nil => "Nil",
        };
        write!(f, "{}", name)
    }
}

/// Both operands of a numeric operator after promotion
enum NumericOperands {
    Integers(i64, i64),
    Floats(f64, f64),
}

impl Value {
    /// Build a text value from a raw string token, stripping the surrounding
    /// quotes and collapsing each doubled quote into one
    pub fn from_string_literal(raw: &str) -> Self {
        let inner = raw
            .strip_prefix('"')
            .and_then(|rest| rest.strip_suffix('"'))
            .unwrap_or(raw);
        Value::Text(inner.replace("\"\"", "\""))
    }

    /// Get the kind of this value
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Integer(_) => ValueKind::Integer,
            Value::Floating(_) => ValueKind::Floating,
            Value::Text(_) => ValueKind::Text,
            Value::Boolean(_) => ValueKind::Boolean,
            Value::Nil => ValueKind::Nil,
        }
    }

    /// Convert to a boolean; only Boolean values convert
    pub fn as_boolean(&self) -> Result<bool> {
        match self {
            Value::Boolean(b) => Ok(*b),
            other => Err(other.conversion_error("boolean conversion")),
        }
    }

    /// Convert to text; only Text values convert
    pub fn as_text(&self) -> Result<&str> {
        match self {
            Value::Text(s) => Ok(s),
            other => Err(other.conversion_error("text conversion")),
        }
    }

    /// Convert to floating point, widening integers
    pub fn as_floating(&self) -> Result<f64> {
        match self {
            Value::Integer(n) => Ok(*n as f64),
            Value::Floating(f) => Ok(*f),
            other => Err(other.conversion_error("floating conversion")),
        }
    }

    /// Convert to an integer; floating values are not narrowed
    pub fn as_integer(&self) -> Result<i64> {
        match self {
            Value::Integer(n) => Ok(*n),
            other => Err(other.conversion_error("integer conversion")),
        }
    }

    /// `+`: numeric addition, or concatenation when both sides are text
    pub fn add(&self, other: &Value) -> Result<Value> {
        match self.numeric_operands(other) {
            Some(NumericOperands::Integers(a, b)) => Ok(Value::Integer(a.wrapping_add(b))),
            Some(NumericOperands::Floats(a, b)) => Ok(Value::Floating(a + b)),
            None => match (self, other) {
                (Value::Text(a), Value::Text(b)) => Ok(Value::Text(format!("{}{}", a, b))),
                _ => Err(self.operand_error("+", other)),
            },
        }
    }

    pub fn subtract(&self, other: &Value) -> Result<Value> {
        match self.numeric_operands(other) {
            Some(NumericOperands::Integers(a, b)) => Ok(Value::Integer(a.wrapping_sub(b))),
            Some(NumericOperands::Floats(a, b)) => Ok(Value::Floating(a - b)),
            None => Err(self.operand_error("-", other)),
        }
    }

    pub fn multiply(&self, other: &Value) -> Result<Value> {
        match self.numeric_operands(other) {
            Some(NumericOperands::Integers(a, b)) => Ok(Value::Integer(a.wrapping_mul(b))),
            Some(NumericOperands::Floats(a, b)) => Ok(Value::Floating(a * b)),
            None => Err(self.operand_error("*", other)),
        }
    }

    /// `/`: integer division truncates toward zero; float division follows IEEE 754
    pub fn divide(&self, other: &Value) -> Result<Value> {
        match self.numeric_operands(other) {
            Some(NumericOperands::Integers(_, 0)) => Err(RuntimeError::division_by_zero()),
            Some(NumericOperands::Integers(a, b)) => Ok(Value::Integer(a.wrapping_div(b))),
            Some(NumericOperands::Floats(a, b)) => Ok(Value::Floating(a / b)),
            None => Err(self.operand_error("/", other)),
        }
    }

    /// `%`: remainder of truncating division, sign follows the dividend
    pub fn modulo(&self, other: &Value) -> Result<Value> {
        match self.numeric_operands(other) {
            Some(NumericOperands::Integers(_, 0)) => Err(RuntimeError::division_by_zero()),
            Some(NumericOperands::Integers(a, b)) => Ok(Value::Integer(a.wrapping_rem(b))),
            Some(NumericOperands::Floats(a, b)) => Ok(Value::Floating(a % b)),
            None => Err(self.operand_error("%", other)),
        }
    }

    /// Dispatch an arithmetic operator
    pub fn apply_arithmetic(&self, operator: BinaryOperator, other: &Value) -> Result<Value> {
        match operator {
            BinaryOperator::Add => self.add(other),
            BinaryOperator::Subtract => self.subtract(other),
            BinaryOperator::Multiply => self.multiply(other),
            BinaryOperator::Divide => self.divide(other),
            BinaryOperator::Modulo => self.modulo(other),
            other_operator => Err(RuntimeError::unknown_operator(&other_operator.to_string())),
        }
    }

    /// Unary minus, preserving the integer/floating kind
    pub fn negate(&self) -> Result<Value> {
        match self {
            Value::Integer(n) => Ok(Value::Integer(n.wrapping_neg())),
            Value::Floating(f) => Ok(Value::Floating(-f)),
            other => Err(other.conversion_error("-")),
        }
    }

    /// Boolean negation
    pub fn not(&self) -> Result<Value> {
        match self {
            Value::Boolean(b) => Ok(Value::Boolean(!b)),
            other => Err(other.conversion_error("not")),
        }
    }

    /// Logical `and`; both operands are already evaluated
    pub fn and(&self, other: &Value) -> Result<Value> {
        match (self, other) {
            (Value::Boolean(a), Value::Boolean(b)) => Ok(Value::Boolean(*a && *b)),
            _ => Err(self.operand_error("and", other)),
        }
    }

    /// Logical `or`; both operands are already evaluated
    pub fn or(&self, other: &Value) -> Result<Value> {
        match (self, other) {
            (Value::Boolean(a), Value::Boolean(b)) => Ok(Value::Boolean(*a || *b)),
            _ => Err(self.operand_error("or", other)),
        }
    }

    /// Relational comparison; both operands are compared as floating point
    pub fn compare(&self, operator: BinaryOperator, other: &Value) -> Result<Value> {
        let (a, b) = match (self.as_floating(), other.as_floating()) {
            (Ok(a), Ok(b)) => (a, b),
            _ => return Err(self.operand_error(&operator.to_string(), other)),
        };

        let result = match operator {
            BinaryOperator::Less => a < b,
            BinaryOperator::LessEqual => a <= b,
            BinaryOperator::Greater => a > b,
            BinaryOperator::GreaterEqual => a >= b,
            other_operator => {
                return Err(RuntimeError::unknown_operator(&other_operator.to_string()));
            }
        };

        Ok(Value::Boolean(result))
    }

    /// Language equality (`==`)
    ///
    /// Integers compare exactly, mixed integer/floating pairs widen and compare
    /// exactly, two floating values are equal within [`FLOAT_EPSILON`], and
    /// everything else compares structurally.
    pub fn equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Integer(a), Value::Floating(b)) => (*a as f64) == *b,
            (Value::Floating(a), Value::Integer(b)) => *a == (*b as f64),
            (Value::Floating(a), Value::Floating(b)) => (a - b).abs() < FLOAT_EPSILON,
            _ => self == other,
        }
    }

    /// Add `delta` for increment/decrement, preserving the integer/floating kind
    pub fn step(&self, delta: i64) -> Result<Value> {
        match self {
            Value::Integer(n) => Ok(Value::Integer(n.wrapping_add(delta))),
            Value::Floating(f) => Ok(Value::Floating(f + delta as f64)),
            other => {
                let operation = if delta < 0 { "--" } else { "++" };
                Err(other.conversion_error(operation))
            }
        }
    }

    fn numeric_operands(&self, other: &Value) -> Option<NumericOperands> {
        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) => Some(NumericOperands::Integers(*a, *b)),
            (Value::Integer(a), Value::Floating(b)) => Some(NumericOperands::Floats(*a as f64, *b)),
            (Value::Floating(a), Value::Integer(b)) => Some(NumericOperands::Floats(*a, *b as f64)),
            (Value::Floating(a), Value::Floating(b)) => Some(NumericOperands::Floats(*a, *b)),
            _ => None,
        }
    }

    fn conversion_error(&self, operation: &str) -> RuntimeError {
        RuntimeError::invalid_operand_type(operation, vec![self.kind().to_string()])
    }

    fn operand_error(&self, operation: &str, other: &Value) -> RuntimeError {
        RuntimeError::invalid_operand_type(
            operation,
            vec![self.kind().to_string(), other.kind().to_string()],
        )
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(n) => write!(f, "{}", n),
            Value::Floating(x) => {
                if x.is_finite() && x.fract() == 0.0 {
                    write!(f, "{:.1}", x) // Show 2.0 instead of 2
                } else {
                    write!(f, "{}", x)
                }
            }
            Value::Text(s) => write!(f, "{}", s),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Nil => write!(f, "nil"),
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Floating(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_string_literal_unquoting() {
        assert_eq!(Value::from_string_literal("\"hello\""), Value::from("hello"));
        assert_eq!(Value::from_string_literal("\"\""), Value::from(""));
        assert_eq!(
            Value::from_string_literal("\"say \"\"hi\"\"\""),
            Value::from("say \"hi\"")
        );
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(Value::Integer(1).kind().to_string(), "Integer");
        assert_eq!(Value::Floating(1.0).kind().to_string(), "Floating");
        assert_eq!(Value::from("x").kind().to_string(), "Text");
        assert_eq!(Value::Boolean(true).kind().to_string(), "Boolean");
        assert_eq!(Value::Nil.kind().to_string(), "Nil");
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::Integer(-7).to_string(), "-7");
        assert_eq!(Value::Floating(2.0).to_string(), "2.0");
        assert_eq!(Value::Floating(2.5).to_string(), "2.5");
        assert_eq!(Value::Floating(f64::INFINITY).to_string(), "inf");
        assert_eq!(Value::Boolean(false).to_string(), "false");
        assert_eq!(Value::Nil.to_string(), "nil");
        assert_eq!(Value::from("raw text").to_string(), "raw text");
    }

    #[test]
    fn test_conversions() {
        assert_eq!(Value::Integer(3).as_floating(), Ok(3.0));
        assert_eq!(Value::Boolean(true).as_boolean(), Ok(true));
        assert_eq!(Value::from("t").as_text(), Ok("t"));
        assert_eq!(Value::Integer(9).as_integer(), Ok(9));

        assert!(Value::from("1.5").as_floating().is_err());
        assert!(Value::Integer(1).as_boolean().is_err());
        assert!(Value::Floating(1.5).as_integer().is_err());
        assert!(Value::Nil.as_text().is_err());
    }

    #[test]
    fn test_integer_arithmetic() {
        let seven = Value::Integer(7);
        let two = Value::Integer(2);

        assert_eq!(seven.add(&two), Ok(Value::Integer(9)));
        assert_eq!(seven.subtract(&two), Ok(Value::Integer(5)));
        assert_eq!(seven.multiply(&two), Ok(Value::Integer(14)));
        assert_eq!(seven.divide(&two), Ok(Value::Integer(3)));
        assert_eq!(seven.modulo(&two), Ok(Value::Integer(1)));
        assert_eq!(Value::Integer(-7).divide(&two), Ok(Value::Integer(-3)));
        assert_eq!(Value::Integer(-7).modulo(&two), Ok(Value::Integer(-1)));
    }

    #[test]
    fn test_integer_overflow_wraps() {
        assert_eq!(
            Value::Integer(i64::MAX).add(&Value::Integer(1)),
            Ok(Value::Integer(i64::MIN))
        );
        assert_eq!(
            Value::Integer(i64::MIN).divide(&Value::Integer(-1)),
            Ok(Value::Integer(i64::MIN))
        );
        assert_eq!(
            Value::Integer(i64::MIN).modulo(&Value::Integer(-1)),
            Ok(Value::Integer(0))
        );
        assert_eq!(Value::Integer(i64::MIN).negate(), Ok(Value::Integer(i64::MIN)));
    }

    #[test]
    fn test_integer_division_by_zero() {
        let zero = Value::Integer(0);
        assert_eq!(
            Value::Integer(1).divide(&zero),
            Err(RuntimeError::division_by_zero())
        );
        assert_eq!(
            Value::Integer(1).modulo(&zero),
            Err(RuntimeError::division_by_zero())
        );
    }

    #[test]
    fn test_float_division_by_zero_is_ieee() {
        assert_eq!(
            Value::Floating(1.0).divide(&Value::Integer(0)),
            Ok(Value::Floating(f64::INFINITY))
        );
        match Value::Integer(1).modulo(&Value::Floating(0.0)) {
            Ok(Value::Floating(result)) => assert!(result.is_nan()),
            other => panic!("Expected NaN, got: {:?}", other),
        }
    }

    #[test]
    fn test_numeric_promotion() {
        assert_eq!(
            Value::Integer(1).add(&Value::Floating(0.5)),
            Ok(Value::Floating(1.5))
        );
        assert_eq!(
            Value::Floating(7.0).divide(&Value::Integer(2)),
            Ok(Value::Floating(3.5))
        );
    }

    #[test]
    fn test_concatenation_only_for_text_pairs() {
        assert_eq!(
            Value::from("a").add(&Value::from("b")),
            Ok(Value::from("ab"))
        );
        assert!(matches!(
            Value::Integer(1).add(&Value::from("x")),
            Err(RuntimeError::InvalidOperandType { .. })
        ));
        assert!(matches!(
            Value::from("x").add(&Value::Boolean(true)),
            Err(RuntimeError::InvalidOperandType { .. })
        ));
        assert!(matches!(
            Value::from("x").multiply(&Value::Integer(2)),
            Err(RuntimeError::InvalidOperandType { .. })
        ));
    }

    #[test]
    fn test_apply_arithmetic_rejects_non_arithmetic_operator() {
        assert_eq!(
            Value::Integer(1).apply_arithmetic(BinaryOperator::Less, &Value::Integer(2)),
            Err(RuntimeError::unknown_operator("<"))
        );
    }

    #[test]
    fn test_negate_and_not() {
        assert_eq!(Value::Integer(3).negate(), Ok(Value::Integer(-3)));
        assert_eq!(Value::Floating(1.5).negate(), Ok(Value::Floating(-1.5)));
        assert_eq!(Value::Boolean(true).not(), Ok(Value::Boolean(false)));
        assert!(Value::Integer(0).not().is_err());
        assert!(Value::from("x").negate().is_err());
    }

    #[test]
    fn test_logical_operators_require_booleans() {
        let t = Value::Boolean(true);
        let f = Value::Boolean(false);

        assert_eq!(t.and(&f), Ok(Value::Boolean(false)));
        assert_eq!(t.and(&t), Ok(Value::Boolean(true)));
        assert_eq!(f.or(&t), Ok(Value::Boolean(true)));
        assert_eq!(f.or(&f), Ok(Value::Boolean(false)));
        assert!(t.and(&Value::Integer(1)).is_err());
    }

    #[test]
    fn test_compare_widens_to_floating() {
        assert_eq!(
            Value::Integer(1).compare(BinaryOperator::Less, &Value::Floating(1.5)),
            Ok(Value::Boolean(true))
        );
        assert_eq!(
            Value::Integer(2).compare(BinaryOperator::GreaterEqual, &Value::Integer(2)),
            Ok(Value::Boolean(true))
        );
        assert!(matches!(
            Value::from("a").compare(BinaryOperator::Less, &Value::from("b")),
            Err(RuntimeError::InvalidOperandType { .. })
        ));
    }

    #[test]
    fn test_equality_rules() {
        assert!(Value::Integer(2).equals(&Value::Floating(2.0)));
        assert!(Value::Floating(2.0).equals(&Value::Integer(2)));
        assert!(Value::Floating(0.1 + 0.2).equals(&Value::Floating(0.3)));
        assert!(!Value::Floating(1.0).equals(&Value::Floating(1.0 + 1e-10)));
        assert!(Value::Nil.equals(&Value::Nil));
        assert!(Value::from("a").equals(&Value::from("a")));
        assert!(!Value::from("1").equals(&Value::Integer(1)));
        assert!(!Value::Boolean(true).equals(&Value::Integer(1)));
    }

    #[test]
    fn test_step_preserves_kind() {
        assert_eq!(Value::Integer(1).step(1), Ok(Value::Integer(2)));
        assert_eq!(Value::Floating(1.5).step(-1), Ok(Value::Floating(0.5)));
        assert!(Value::Boolean(true).step(1).is_err());
    }
}
