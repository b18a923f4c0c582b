//! Expression evaluator
//!
//! Reduces a parser `Expression` to a runtime `Value`. Evaluation performs no
//! I/O; the only side effects are binding updates made by increments,
//! decrements and compound assignments.

use crate::environment::Environment;
use crate::error::{Result, RuntimeError};
use crate::value::Value;
use bluejay_parser::{
    BinaryOperation, BinaryOperator, CompoundAssignment, Expression, ExpressionKind, Fixity,
    Identifier, IncrementKind, IncrementOperation, UnaryOperation, UnaryOperator,
};

/// Recursive expression evaluator
#[derive(Debug, Default, Clone, Copy)]
pub struct ExpressionEvaluator;

impl ExpressionEvaluator {
    pub fn new() -> Self {
        Self
    }

    /// Evaluate an expression against the given environment
    ///
    /// Errors raised without a location are attributed to this expression.
    pub fn evaluate(&self, expression: &Expression, environment: &mut Environment) -> Result<Value> {
        self.evaluate_kind(expression, environment)
            .map_err(|error| error.with_span(expression.span))
    }

    fn evaluate_kind(&self, expression: &Expression, environment: &mut Environment) -> Result<Value> {
        match &expression.kind {
            // Literals
            ExpressionKind::Integer(value) => Ok(Value::Integer(*value)),
            ExpressionKind::Float(value) => Ok(Value::Floating(*value)),
            ExpressionKind::String(raw) => Ok(Value::from_string_literal(raw)),
            ExpressionKind::Boolean(value) => Ok(Value::Boolean(*value)),
            ExpressionKind::Nil => Ok(Value::Nil),

            ExpressionKind::Identifier(identifier) => lookup(identifier, environment),
            ExpressionKind::Parenthesized(inner) => self.evaluate(inner, environment),

            ExpressionKind::UnaryOp(operation) => self.evaluate_unary(operation, environment),
            ExpressionKind::BinaryOp(operation) => self.evaluate_binary(operation, environment),
            ExpressionKind::Increment(operation) => self.evaluate_increment(operation, environment),
            ExpressionKind::CompoundAssignment(assignment) => {
                self.evaluate_compound_assignment(assignment, environment)
            }
        }
    }

    fn evaluate_unary(
        &self,
        operation: &UnaryOperation,
        environment: &mut Environment,
    ) -> Result<Value> {
        let operand = self.evaluate(&operation.operand, environment)?;

        match operation.operator {
            UnaryOperator::Not => operand.not(),
            UnaryOperator::Negate => operand.negate(),
        }
    }

    /// Both operands are always evaluated, left first, including for `and`/`or`
    fn evaluate_binary(
        &self,
        operation: &BinaryOperation,
        environment: &mut Environment,
    ) -> Result<Value> {
        let left = self.evaluate(&operation.left, environment)?;
        let right = self.evaluate(&operation.right, environment)?;

        match operation.operator {
            BinaryOperator::Or => left.or(&right),
            BinaryOperator::And => left.and(&right),
            BinaryOperator::Equal => Ok(Value::Boolean(left.equals(&right))),
            BinaryOperator::NotEqual => Ok(Value::Boolean(!left.equals(&right))),
            operator if operator.is_relational() => left.compare(operator, &right),
            operator if operator.is_arithmetic() => left.apply_arithmetic(operator, &right),
            operator => Err(RuntimeError::unknown_operator_with_span(
                &operator.to_string(),
                operation.span,
            )),
        }
    }

    fn evaluate_increment(
        &self,
        operation: &IncrementOperation,
        environment: &mut Environment,
    ) -> Result<Value> {
        let name = &operation.target.name;
        let current = lookup(&operation.target, environment)?;

        let delta = match operation.kind {
            IncrementKind::Increment => 1,
            IncrementKind::Decrement => -1,
        };
        let updated = current.step(delta)?;
        environment.declare_or_assign(name, updated.clone());

        Ok(match operation.fixity {
            Fixity::Prefix => updated,
            Fixity::Postfix => current,
        })
    }

    /// The right-hand side is evaluated before the target is read
    fn evaluate_compound_assignment(
        &self,
        assignment: &CompoundAssignment,
        environment: &mut Environment,
    ) -> Result<Value> {
        let rhs = self.evaluate(&assignment.value, environment)?;
        let name = &assignment.target.name;
        let current = lookup(&assignment.target, environment)?;

        let result = current.apply_arithmetic(assignment.operator.binary_operator(), &rhs)?;
        environment.declare_or_assign(name, result.clone());
        Ok(result)
    }
}

/// Read a binding, pointing a failure at the identifier itself
fn lookup(identifier: &Identifier, environment: &Environment) -> Result<Value> {
    environment
        .lookup(&identifier.name)
        .map_err(|_| RuntimeError::undefined_symbol_with_span(&identifier.name, identifier.span))
}

#[cfg(test)]
mod tests {
    use super::*;
    use bluejay_parser::parse_expression;
    use pretty_assertions::assert_eq;

    fn eval(source: &str, environment: &mut Environment) -> Result<Value> {
        let expression = parse_expression(source).unwrap();
        ExpressionEvaluator::new().evaluate(&expression, environment)
    }

    #[test]
    fn test_literals() {
        let mut env = Environment::new();
        assert_eq!(eval("42", &mut env), Ok(Value::Integer(42)));
        assert_eq!(eval("1.5", &mut env), Ok(Value::Floating(1.5)));
        assert_eq!(eval("\"a\"\"b\"", &mut env), Ok(Value::from("a\"b")));
        assert_eq!(eval("true", &mut env), Ok(Value::Boolean(true)));
        assert_eq!(eval("nil", &mut env), Ok(Value::Nil));
    }

    #[test]
    fn test_undefined_identifier_carries_span() {
        let mut env = Environment::new();
        match eval("1 + missing", &mut env) {
            Err(RuntimeError::UndefinedSymbol { name, span }) => {
                assert_eq!(name, "missing");
                assert_eq!(span, Some(miette::SourceSpan::new(4.into(), 7)));
            }
            other => panic!("Expected undefined symbol, got: {:?}", other),
        }
    }

    #[test]
    fn test_undefined_assignment_target_points_at_name() {
        let mut env = Environment::new();
        for (source, start) in [("total += 1", 0), ("(count++)", 1), ("--depth", 2)] {
            match eval(source, &mut env) {
                Err(RuntimeError::UndefinedSymbol { span, .. }) => {
                    let span = span.unwrap();
                    assert_eq!(span.offset(), start, "{}", source);
                }
                other => panic!("Expected undefined symbol for {}, got: {:?}", source, other),
            }
        }
    }

    #[test]
    fn test_division_by_zero_points_at_division() {
        let mut env = Environment::new();
        match eval("1 + 4 / 0", &mut env) {
            Err(RuntimeError::DivisionByZero { span }) => {
                assert_eq!(span, Some(miette::SourceSpan::new(4.into(), 5)));
            }
            other => panic!("Expected division by zero, got: {:?}", other),
        }
    }

    #[test]
    fn test_increment_fixity() {
        let mut env = Environment::new();
        env.declare_or_assign("x", Value::Integer(5));

        assert_eq!(eval("x++", &mut env), Ok(Value::Integer(5)));
        assert_eq!(env.lookup("x"), Ok(Value::Integer(6)));
        assert_eq!(eval("++x", &mut env), Ok(Value::Integer(7)));
        assert_eq!(eval("x--", &mut env), Ok(Value::Integer(7)));
        assert_eq!(eval("--x", &mut env), Ok(Value::Integer(5)));
    }

    #[test]
    fn test_increment_requires_binding() {
        let mut env = Environment::new();
        assert!(matches!(
            eval("++ghost", &mut env),
            Err(RuntimeError::UndefinedSymbol { .. })
        ));
        assert!(!env.is_bound("ghost"));
    }

    #[test]
    fn test_compound_assignment_evaluates_rhs_first() {
        let mut env = Environment::new();
        env.declare_or_assign("x", Value::Integer(1));

        // The right-hand side bumps x to 2 before x is read
        assert_eq!(eval("x += x++", &mut env), Ok(Value::Integer(3)));
        assert_eq!(env.lookup("x"), Ok(Value::Integer(3)));
    }

    #[test]
    fn test_logical_operators_evaluate_both_sides() {
        let mut env = Environment::new();
        env.declare_or_assign("hits", Value::Integer(0));

        assert_eq!(
            eval("false and ++hits > 0", &mut env),
            Ok(Value::Boolean(false))
        );
        assert_eq!(eval("true or ++hits > 0", &mut env), Ok(Value::Boolean(true)));
        assert_eq!(env.lookup("hits"), Ok(Value::Integer(2)));
    }
}
