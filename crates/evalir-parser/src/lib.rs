/*! Parse Eval source text into expression trees.
 *
 * Programs are sequences of S-expressions: integers, double-quoted strings, symbols and
 * parenthesized lists. The parser does not interpret escapes inside strings; that is left to the
 * lowering stage.
 */

use pest::iterators::Pair;
use pest::Parser;
use pest_derive::Parser;

pub mod ast;
pub mod error;

pub use ast::{ExprKind, Expression, Span};
pub use error::ParseError;

#[derive(Parser)]
#[grammar = "grammar.pest"]
pub struct EvalParser;

pub type ParseResult<T> = Result<T, ParseError>;

/// Parse a whole program. The top-level forms are wrapped in a single `(begin ...)`.
pub fn parse(input: &str) -> ParseResult<Expression> {
    let program = EvalParser::parse(Rule::program, input)?
        .next()
        .ok_or_else(|| ParseError::new(1, 1, "empty parse tree"))?;
    let span = span_of(&program);

    let mut forms = vec![Expression::new(
        ExprKind::Symbol("begin".to_string()),
        Span {
            end: span.start,
            ..span
        },
    )];
    for pair in program.into_inner() {
        if pair.as_rule() == Rule::EOI {
            break;
        }
        forms.push(build_expression(pair)?);
    }

    Ok(Expression::new(ExprKind::List(forms), span))
}

/// Parse exactly one form.
pub fn parse_expression(input: &str) -> ParseResult<Expression> {
    let pair = EvalParser::parse(Rule::single, input)?
        .next()
        .and_then(|single| single.into_inner().next())
        .ok_or_else(|| ParseError::new(1, 1, "expected an expression"))?;
    build_expression(pair)
}

pub fn check(input: &str) -> bool {
    parse(input).is_ok()
}

fn span_of(pair: &Pair<'_, Rule>) -> Span {
    let (line, column) = pair.line_col();
    let span = pair.as_span();
    Span {
        start: span.start(),
        end: span.end(),
        line,
        column,
    }
}

fn build_expression(pair: Pair<'_, Rule>) -> ParseResult<Expression> {
    let span = span_of(&pair);
    let kind = match pair.as_rule() {
        Rule::number => {
            let value = pair.as_str().parse::<i64>().map_err(|_| {
                ParseError::new(
                    span.line,
                    span.column,
                    format!("integer literal {} does not fit in 64 bits", pair.as_str()),
                )
            })?;
            ExprKind::Number(value)
        }
        Rule::string => {
            let body = pair
                .into_inner()
                .next()
                .map(|p| p.as_str().to_string())
                .unwrap_or_default();
            ExprKind::String(body)
        }
        Rule::symbol => ExprKind::Symbol(pair.as_str().to_string()),
        Rule::list => ExprKind::List(
            pair.into_inner()
                .map(build_expression)
                .collect::<ParseResult<Vec<_>>>()?,
        ),
        other => {
            return Err(ParseError::new(
                span.line,
                span.column,
                format!("unexpected {:?}", other),
            ))
        }
    };
    Ok(Expression::new(kind, span))
}
