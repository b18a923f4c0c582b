// Expression parsing module
// Handles operator precedence, unary/binary operations and primary expressions

use pest::iterators::{Pair, Pairs};
use pest::pratt_parser::{Assoc, Op, PrattParser};

use crate::ast::*;
use crate::error::*;
use crate::parser::{BlueJayParser, Rule};

const MINIMUM_INTEGER_DIGITS: &str = "9223372036854775808";

impl BlueJayParser {
    /// Operator precedence parser
    /// Precedence levels from lowest to highest
    pub(crate) fn pratt_parser() -> PrattParser<Rule> {
        PrattParser::new()
            // Level 1: Logical OR (lowest precedence)
            .op(Op::infix(Rule::op_or, Assoc::Left))
            // Level 2: Logical AND
            .op(Op::infix(Rule::op_and, Assoc::Left))
            // Level 3: Equality
            .op(Op::infix(Rule::op_equal, Assoc::Left) | Op::infix(Rule::op_not_equal, Assoc::Left))
            // Level 4: Relational
            .op(Op::infix(Rule::op_less, Assoc::Left)
                | Op::infix(Rule::op_less_equal, Assoc::Left)
                | Op::infix(Rule::op_greater, Assoc::Left)
                | Op::infix(Rule::op_greater_equal, Assoc::Left))
            // Level 5: Additive
            .op(Op::infix(Rule::op_add, Assoc::Left) | Op::infix(Rule::op_subtract, Assoc::Left))
            // Level 6: Multiplicative
            .op(Op::infix(Rule::op_multiply, Assoc::Left)
                | Op::infix(Rule::op_divide, Assoc::Left)
                | Op::infix(Rule::op_modulo, Assoc::Left))
            // Level 7: Prefix operators (highest precedence)
            .op(Op::prefix(Rule::op_not) | Op::prefix(Rule::op_negate))
    }

    /// Parse expression using precedence climbing
    pub(crate) fn parse_expression_with_precedence(
        pairs: Pairs<Rule>,
    ) -> ParseResult<Expression> {
        let parser = Self::pratt_parser();

        parser
            .map_primary(Self::parse_primary)
            .map_prefix(|op: Pair<Rule>, operand: ParseResult<Expression>| {
                if let Some(literal) = Self::fold_minimum_integer(&op, &operand) {
                    return Ok(literal);
                }
                let operand = operand?;

                let operator = match op.as_rule() {
                    Rule::op_not => UnaryOperator::Not,
                    Rule::op_negate => UnaryOperator::Negate,
                    _ => return Err(Self::unexpected_pair("prefix operator", &op)),
                };

                let span = Self::span_from_range(op.as_span().start(), operand.span.end);

                Ok(Expression {
                    kind: ExpressionKind::UnaryOp(UnaryOperation {
                        operator,
                        operand: Box::new(operand),
                        span,
                    }),
                    span,
                })
            })
            .map_infix(
                |left: ParseResult<Expression>,
                 op: Pair<Rule>,
                 right: ParseResult<Expression>| {
                    let left = left?;
                    let right = right?;

                    let operator = match op.as_rule() {
                        // Logical operators
                        Rule::op_or => BinaryOperator::Or,
                        Rule::op_and => BinaryOperator::And,
                        // Equality operators
                        Rule::op_equal => BinaryOperator::Equal,
                        Rule::op_not_equal => BinaryOperator::NotEqual,
                        // Relational operators
                        Rule::op_less => BinaryOperator::Less,
                        Rule::op_less_equal => BinaryOperator::LessEqual,
                        Rule::op_greater => BinaryOperator::Greater,
                        Rule::op_greater_equal => BinaryOperator::GreaterEqual,
                        // Arithmetic operators
                        Rule::op_add => BinaryOperator::Add,
                        Rule::op_subtract => BinaryOperator::Subtract,
                        Rule::op_multiply => BinaryOperator::Multiply,
                        Rule::op_divide => BinaryOperator::Divide,
                        Rule::op_modulo => BinaryOperator::Modulo,
                        _ => return Err(Self::unexpected_pair("binary operator", &op)),
                    };

                    let span = Self::span_from_range(left.span.start, right.span.end);

                    Ok(Expression {
                        kind: ExpressionKind::BinaryOp(BinaryOperation {
                            left: Box::new(left),
                            operator,
                            right: Box::new(right),
                            span,
                        }),
                        span,
                    })
                },
            )
            .parse(pairs)
    }

    /// `-9223372036854775808` is the one literal whose digits alone overflow
    fn fold_minimum_integer(
        op: &Pair<Rule>,
        operand: &ParseResult<Expression>,
    ) -> Option<Expression> {
        let Err(ParseError::InvalidInteger { span, found, .. }) = operand else {
            return None;
        };
        let negate = op.as_span();
        let adjacent = span.offset() == negate.end();
        if op.as_rule() != Rule::op_negate || !adjacent || found != MINIMUM_INTEGER_DIGITS {
            return None;
        }

        Some(Expression {
            kind: ExpressionKind::Integer(i64::MIN),
            span: Self::span_from_range(negate.start(), span.offset() + span.len()),
        })
    }

    /// Parse an `expression` pair (full precedence support)
    pub(crate) fn parse_expression_from_pair(pair: Pair<Rule>) -> ParseResult<Expression> {
        match pair.as_rule() {
            Rule::expression => Self::parse_expression_with_precedence(pair.into_inner()),
            _ => Self::parse_primary(pair),
        }
    }

    /// Parse a primary expression: literal, identifier, parentheses or an update form
    pub(crate) fn parse_primary(pair: Pair<Rule>) -> ParseResult<Expression> {
        let span = Self::span_from_pair(&pair);

        let kind = match pair.as_rule() {
            Rule::integer => ExpressionKind::Integer(Self::parse_integer(pair)?),
            Rule::float => ExpressionKind::Float(Self::parse_float(pair)?),
            Rule::string => ExpressionKind::String(Self::parse_string(pair)),
            Rule::boolean => ExpressionKind::Boolean(Self::parse_boolean(pair)?),
            Rule::nil => ExpressionKind::Nil,
            Rule::identifier => ExpressionKind::Identifier(Self::parse_identifier(pair)?),
            Rule::parenthesized => {
                let inner = Self::expect_next(&mut pair.into_inner(), "expression", span)?;
                ExpressionKind::Parenthesized(Box::new(Self::parse_expression_from_pair(inner)?))
            }
            Rule::compound_assignment => {
                ExpressionKind::CompoundAssignment(Self::parse_compound_assignment(pair)?)
            }
            Rule::pre_increment | Rule::pre_decrement | Rule::post_increment | Rule::post_decrement => {
                ExpressionKind::Increment(Self::parse_increment(pair)?)
            }
            _ => return Err(Self::unexpected_pair("expression", &pair)),
        };

        Ok(Expression { kind, span })
    }

    /// Parse `name op= expression`
    fn parse_compound_assignment(pair: Pair<Rule>) -> ParseResult<CompoundAssignment> {
        let span = Self::span_from_pair(&pair);
        let mut inner = pair.into_inner();

        let target = Self::parse_identifier(Self::expect_next(&mut inner, "identifier", span)?)?;

        let op_pair = Self::expect_next(&mut inner, "compound assignment operator", span)?;
        let operator = match op_pair.as_rule() {
            Rule::op_add_assign => CompoundOperator::AddAssign,
            Rule::op_subtract_assign => CompoundOperator::SubtractAssign,
            Rule::op_multiply_assign => CompoundOperator::MultiplyAssign,
            Rule::op_divide_assign => CompoundOperator::DivideAssign,
            Rule::op_modulo_assign => CompoundOperator::ModuloAssign,
            _ => return Err(Self::unexpected_pair("compound assignment operator", &op_pair)),
        };

        let value_pair = Self::expect_next(&mut inner, "expression", span)?;
        let value = Self::parse_expression_from_pair(value_pair)?;

        Ok(CompoundAssignment {
            target,
            operator,
            value: Box::new(value),
            span,
        })
    }

    /// Parse `++x`, `--x`, `x++` or `x--`
    fn parse_increment(pair: Pair<Rule>) -> ParseResult<IncrementOperation> {
        let span = Self::span_from_pair(&pair);

        let (kind, fixity) = match pair.as_rule() {
            Rule::pre_increment => (IncrementKind::Increment, Fixity::Prefix),
            Rule::pre_decrement => (IncrementKind::Decrement, Fixity::Prefix),
            Rule::post_increment => (IncrementKind::Increment, Fixity::Postfix),
            Rule::post_decrement => (IncrementKind::Decrement, Fixity::Postfix),
            _ => return Err(Self::unexpected_pair("increment or decrement", &pair)),
        };

        let target = Self::parse_identifier(Self::expect_next(
            &mut pair.into_inner(),
            "identifier",
            span,
        )?)?;

        Ok(IncrementOperation {
            target,
            kind,
            fixity,
            span,
        })
    }
}
