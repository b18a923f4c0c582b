// BlueJay parser entry points
// Pest-derived parser plus the span and pair helpers shared by the submodules

use pest::iterators::{Pair, Pairs};
use pest::Parser;
use pest_derive::Parser;

use crate::ast::*;
use crate::error::*;

mod control_flow;
mod expressions;
mod literals;

#[derive(Parser)]
#[grammar = "grammar.pest"]
pub struct BlueJayParser;

impl BlueJayParser {
    /// Parse a complete program
    pub fn parse_program(input: &str) -> ParseResult<Program> {
        Self::parse_program_with_source(input, None)
    }

    /// Parse a complete program, remembering which file it came from
    pub fn parse_program_with_source(
        input: &str,
        source_file: Option<String>,
    ) -> ParseResult<Program> {
        let mut pairs = Self::parse(Rule::program, input)
            .map_err(|error| ParseError::from_pest_error(error, input.to_string()))?;
        let program_pair = Self::expect_next(&mut pairs, "program", Span::new(0, input.len()))?;
        let span = Self::span_from_pair(&program_pair);

        let mut statements = Vec::new();
        for pair in program_pair.into_inner() {
            match pair.as_rule() {
                Rule::EOI => break,
                _ => statements.push(Self::parse_statement(pair)?),
            }
        }

        Ok(Program {
            statements,
            source_file,
            span,
        })
    }

    /// Parse a single expression (no statements)
    pub fn parse_expression(input: &str) -> ParseResult<Expression> {
        let mut pairs = Self::parse(Rule::expression_input, input)
            .map_err(|error| ParseError::from_pest_error(error, input.to_string()))?;
        let input_pair = Self::expect_next(&mut pairs, "expression", Span::new(0, input.len()))?;
        let span = Self::span_from_pair(&input_pair);

        let mut inner = input_pair.into_inner();
        let expression_pair = Self::expect_next(&mut inner, "expression", span)?;
        Self::parse_expression_from_pair(expression_pair)
    }

    /// Extract a span (with line/column information) from a Pest pair
    pub(crate) fn span_from_pair(pair: &Pair<Rule>) -> Span {
        let pest_span = pair.as_span();
        Span::with_line_col(
            pest_span.start(),
            pest_span.end(),
            pest_span.start_pos().line_col(),
            pest_span.end_pos().line_col(),
        )
    }

    /// Create a span covering a byte range
    pub(crate) fn span_from_range(start: usize, end: usize) -> Span {
        Span::new(start, end)
    }

    /// Take the next pair the grammar guarantees, or report what was missing
    pub(crate) fn expect_next<'i>(
        pairs: &mut Pairs<'i, Rule>,
        expected: &str,
        span: Span,
    ) -> ParseResult<Pair<'i, Rule>> {
        pairs.next().ok_or_else(|| {
            ParseError::unexpected_rule(
                expected,
                Rule::EOI,
                miette::SourceSpan::new(span.start.into(), span.len()),
            )
        })
    }

    /// Build an error for a pair whose rule is not valid at this position
    pub(crate) fn unexpected_pair(expected: &str, pair: &Pair<Rule>) -> ParseError {
        let pest_span = pair.as_span();
        ParseError::unexpected_rule(
            expected,
            pair.as_rule(),
            miette::SourceSpan::new(
                pest_span.start().into(),
                pest_span.end() - pest_span.start(),
            ),
        )
    }
}
