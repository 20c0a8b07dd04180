//! Parser implementation using chumsky

use chumsky::input::{Stream, ValueInput};
use chumsky::prelude::*;

use crate::error::ParseError;
use crate::parser::ast::*;
use crate::parser::lexer::Token;
use crate::parser::scanner::{self, Chunk};

/// Parse a message into a template
///
/// Literal text is kept as-is; each `${ ... }` body is tokenized and parsed
/// as a pipeline. All spans are byte offsets into `input`.
pub fn parse(input: &str) -> Result<Template, Vec<ParseError>> {
    let chunks = scanner::split(input).map_err(|e| vec![e])?;

    let mut segments = Vec::with_capacity(chunks.len());
    let mut errors = Vec::new();
    for chunk in chunks {
        match chunk {
            Chunk::Text { text, span } => {
                segments.push(Spanned::new(Segment::Text(text.to_string()), span));
            }
            Chunk::Action {
                body,
                body_start,
                span,
            } => {
                if scanner::is_comment(body) {
                    segments.push(Spanned::new(Segment::Comment, span));
                    continue;
                }
                match parse_action(body, body_start) {
                    Ok(pipeline) => segments.push(Spanned::new(Segment::Action(pipeline), span)),
                    Err(errs) => errors.extend(errs),
                }
            }
        }
    }

    if errors.is_empty() {
        Ok(Template { segments })
    } else {
        Err(errors)
    }
}

/// Parse one action body; `offset` is where the body starts in the message
fn parse_action(body: &str, offset: usize) -> Result<Pipeline, Vec<ParseError>> {
    let mut tokens = Vec::new();
    for (tok, span) in crate::parser::lexer::lex(body) {
        match tok {
            Ok(tok) => tokens.push((tok, SimpleSpan::from(span.start + offset..span.end + offset))),
            Err(()) => {
                return Err(vec![ParseError::Syntax {
                    message: format!("unexpected {:?}", &body[span.clone()]),
                    span: span.start + offset..span.end + offset,
                    expected: Vec::new(),
                }])
            }
        }
    }

    let eoi = offset + body.len();

    // Turn the token list into a stream that chumsky can use
    let token_stream = Stream::from_iter(tokens.into_iter())
        // Split (Token, SimpleSpan) into token and span parts
        .map((eoi..eoi).into(), |(t, s): (_, _)| (t, s));

    pipeline_parser()
        .then_ignore(end())
        .parse(token_stream)
        .into_result()
        .map_err(|errs| errs.into_iter().map(|e| e.into()).collect())
}

/// Helper to extract span range from chumsky's MapExtra
fn span_range(e: &impl chumsky::span::Span<Offset = usize>) -> std::ops::Range<usize> {
    e.start()..e.end()
}

fn pipeline_parser<'a, I>() -> impl Parser<'a, I, Pipeline, extra::Err<Rich<'a, Token>>> + Clone
where
    I: ValueInput<'a, Token = Token, Span = SimpleSpan>,
{
    recursive(|pipeline| {
        let identifier = select! {
            Token::Ident(s) => Identifier::new(s),
        }
        .map_with(|id, e| Spanned::new(id, span_range(&e.span())));

        let literal = select! {
            Token::String(s) => Value::Str(s),
            Token::RawString(s) => Value::Str(s),
            Token::Int(n) => Value::Int(n),
            Token::True => Value::Bool(true),
            Token::False => Value::Bool(false),
        };

        let operand = choice((
            identifier.map(Operand::Identifier),
            literal.map(Operand::Literal),
            just(Token::Dot).to(Operand::Dot),
            select! { Token::Field(f) => Operand::Field(f) },
            pipeline
                .delimited_by(just(Token::ParenOpen), just(Token::ParenClose))
                .map(|p| Operand::Pipeline(Box::new(p))),
        ))
        .map_with(|op, e| Spanned::new(op, span_range(&e.span())))
        .labelled("operand");

        // A command is a function name followed by its arguments, or a single
        // value; which one is decided when the template runs
        let command = operand
            .repeated()
            .at_least(1)
            .collect::<Vec<_>>()
            .map_with(|operands, e| Spanned::new(Command { operands }, span_range(&e.span())));

        command
            .separated_by(just(Token::Pipe))
            .at_least(1)
            .collect::<Vec<_>>()
            .map(|commands| Pipeline { commands })
    })
}
