// Literal parsing functions for the BlueJay parser
// Handles boolean, integer, float, string, nil and identifier tokens

use pest::iterators::Pair;

use super::{BlueJayParser, Rule};
use crate::ast::*;
use crate::error::*;

impl BlueJayParser {
    /// Parse a boolean literal from a Pest pair
    pub(super) fn parse_boolean(pair: Pair<Rule>) -> ParseResult<bool> {
        let span = Self::span_from_pair(&pair);
        let inner = Self::expect_next(&mut pair.into_inner(), "true or false", span)?;

        match inner.as_rule() {
            Rule::boolean_true => Ok(true),
            Rule::boolean_false => Ok(false),
            _ => Err(Self::unexpected_pair("true or false", &inner)),
        }
    }

    /// Parse a decimal integer literal; values outside i64 are rejected
    pub(super) fn parse_integer(pair: Pair<Rule>) -> ParseResult<i64> {
        let text = pair.as_str();
        text.parse::<i64>()
            .map_err(|_| Self::literal_error(&pair, ParseError::invalid_integer))
    }

    /// Parse a float literal (`1.5`, `1.`, `.5`, `1e-3`)
    pub(super) fn parse_float(pair: Pair<Rule>) -> ParseResult<f64> {
        let text = pair.as_str();
        text.parse::<f64>()
            .map_err(|_| Self::literal_error(&pair, ParseError::invalid_float))
    }

    /// Keep the raw quoted token; unquoting happens when the value is built
    pub(super) fn parse_string(pair: Pair<Rule>) -> String {
        pair.as_str().to_string()
    }

    /// Parse an identifier from a Pest pair
    pub(super) fn parse_identifier(pair: Pair<Rule>) -> ParseResult<Identifier> {
        if pair.as_rule() != Rule::identifier {
            return Err(Self::unexpected_pair("identifier", &pair));
        }

        Ok(Identifier {
            name: pair.as_str().to_string(),
            span: Self::span_from_pair(&pair),
        })
    }

    fn literal_error(
        pair: &Pair<Rule>,
        constructor: fn(String, miette::SourceSpan, String) -> ParseError,
    ) -> ParseError {
        let pest_span = pair.as_span();
        constructor(
            pair.get_input().to_string(),
            miette::SourceSpan::new(
                pest_span.start().into(),
                pest_span.end() - pest_span.start(),
            ),
            pair.as_str().to_string(),
        )
    }
}
