// Statement and control flow parsing module
// Handles assignments, print statements, blocks, if/elif/else chains and loops

use pest::iterators::Pair;

use crate::ast::*;
use crate::error::*;
use crate::parser::{BlueJayParser, Rule};

impl BlueJayParser {
    /// Parse any statement pair
    pub(crate) fn parse_statement(pair: Pair<Rule>) -> ParseResult<Statement> {
        let span = Self::span_from_pair(&pair);

        let kind = match pair.as_rule() {
            Rule::assignment => StatementKind::Assignment(Self::parse_assignment(pair)?),
            Rule::print_statement => StatementKind::Print(Self::parse_print_statement(pair)?),
            Rule::block => StatementKind::Block(Self::parse_block(pair)?),
            Rule::if_statement => StatementKind::If(Self::parse_if_statement(pair)?),
            Rule::while_statement => StatementKind::While(Self::parse_while_statement(pair)?),
            Rule::for_statement => StatementKind::For(Self::parse_for_statement(pair)?),
            Rule::expression_statement => {
                let inner = Self::expect_next(&mut pair.into_inner(), "expression", span)?;
                StatementKind::Expression(Self::parse_expression_from_pair(inner)?)
            }
            _ => return Err(Self::unexpected_pair("statement", &pair)),
        };

        Ok(Statement { kind, span })
    }

    /// Parse `name = expression`
    pub(crate) fn parse_assignment(pair: Pair<Rule>) -> ParseResult<Assignment> {
        let span = Self::span_from_pair(&pair);
        let mut inner = pair.into_inner();

        let target = Self::parse_identifier(Self::expect_next(&mut inner, "identifier", span)?)?;
        let value = Self::parse_expression_from_pair(Self::expect_next(
            &mut inner,
            "expression",
            span,
        )?)?;

        Ok(Assignment {
            target,
            value,
            span,
        })
    }

    /// Parse `print_value(expr)` or `print_line(expr)`
    pub(crate) fn parse_print_statement(pair: Pair<Rule>) -> ParseResult<PrintStatement> {
        let span = Self::span_from_pair(&pair);
        let mut inner = pair.into_inner();

        let keyword = Self::expect_next(&mut inner, "print_value or print_line", span)?;
        let mode = match keyword.as_rule() {
            Rule::keyword_print_value => PrintMode::Value,
            Rule::keyword_print_line => PrintMode::Line,
            _ => return Err(Self::unexpected_pair("print_value or print_line", &keyword)),
        };

        let expression = Self::parse_expression_from_pair(Self::expect_next(
            &mut inner,
            "expression",
            span,
        )?)?;

        Ok(PrintStatement {
            mode,
            expression,
            span,
        })
    }

    /// Parse a braced block of statements
    pub(crate) fn parse_block(pair: Pair<Rule>) -> ParseResult<Block> {
        if pair.as_rule() != Rule::block {
            return Err(Self::unexpected_pair("block", &pair));
        }

        let span = Self::span_from_pair(&pair);
        let statements = pair
            .into_inner()
            .map(Self::parse_statement)
            .collect::<ParseResult<Vec<_>>>()?;

        Ok(Block { statements, span })
    }

    /// Parse an if statement with its elif arms and optional else block
    pub(crate) fn parse_if_statement(pair: Pair<Rule>) -> ParseResult<IfStatement> {
        let span = Self::span_from_pair(&pair);
        let mut branches = Vec::new();
        let mut else_block = None;

        for clause in pair.into_inner() {
            match clause.as_rule() {
                Rule::if_clause | Rule::elif_clause => {
                    branches.push(Self::parse_conditional_branch(clause)?);
                }
                Rule::else_clause => {
                    let clause_span = Self::span_from_pair(&clause);
                    let block_pair = clause
                        .into_inner()
                        .find(|inner| inner.as_rule() == Rule::block);
                    let block_pair = match block_pair {
                        Some(block_pair) => block_pair,
                        None => {
                            return Err(ParseError::unexpected_rule(
                                "block",
                                Rule::else_clause,
                                miette::SourceSpan::new(
                                    clause_span.start.into(),
                                    clause_span.len(),
                                ),
                            ))
                        }
                    };
                    else_block = Some(Self::parse_block(block_pair)?);
                }
                _ => return Err(Self::unexpected_pair("if, elif or else clause", &clause)),
            }
        }

        Ok(IfStatement {
            branches,
            else_block,
            span,
        })
    }

    /// Parse an `if`/`elif`/`else if` arm, skipping its keywords
    fn parse_conditional_branch(pair: Pair<Rule>) -> ParseResult<ConditionalBranch> {
        let span = Self::span_from_pair(&pair);
        let mut inner = pair.into_inner().filter(|inner| {
            !matches!(
                inner.as_rule(),
                Rule::keyword_if | Rule::keyword_elif | Rule::keyword_else
            )
        });

        let condition_pair = inner.next();
        let body_pair = inner.next();

        match (condition_pair, body_pair) {
            (Some(condition_pair), Some(body_pair)) => Ok(ConditionalBranch {
                condition: Self::parse_expression_from_pair(condition_pair)?,
                body: Self::parse_block(body_pair)?,
                span,
            }),
            _ => Err(ParseError::unexpected_rule(
                "condition and block",
                Rule::if_clause,
                miette::SourceSpan::new(span.start.into(), span.len()),
            )),
        }
    }

    /// Parse `while condition { body }`
    pub(crate) fn parse_while_statement(pair: Pair<Rule>) -> ParseResult<WhileStatement> {
        let span = Self::span_from_pair(&pair);
        let mut inner = pair.into_inner();

        // First pair should be the "while" keyword, skip it
        let _while_keyword = Self::expect_next(&mut inner, "while", span)?;

        let condition =
            Self::parse_expression_from_pair(Self::expect_next(&mut inner, "condition", span)?)?;
        let body = Self::parse_block(Self::expect_next(&mut inner, "block", span)?)?;

        Ok(WhileStatement {
            condition,
            body,
            span,
        })
    }

    /// Parse `for (init?; condition; update) { body }`
    pub(crate) fn parse_for_statement(pair: Pair<Rule>) -> ParseResult<ForStatement> {
        let span = Self::span_from_pair(&pair);
        let mut inner = pair.into_inner().peekable();

        // First pair should be the "for" keyword, skip it
        let _for_keyword = inner.next();

        let initializer = if inner.peek().map(|next| next.as_rule()) == Some(Rule::assignment) {
            inner.next().map(Self::parse_assignment).transpose()?
        } else {
            None
        };

        let mut expect = |expected: &str| {
            inner.next().ok_or_else(|| {
                ParseError::unexpected_rule(
                    expected,
                    Rule::EOI,
                    miette::SourceSpan::new(span.start.into(), span.len()),
                )
            })
        };

        let condition = Self::parse_expression_from_pair(expect("condition")?)?;
        let update = Self::parse_expression_from_pair(expect("update expression")?)?;
        let body = Self::parse_block(expect("block")?)?;

        Ok(ForStatement {
            initializer,
            condition,
            update,
            body,
            span,
        })
    }
}
