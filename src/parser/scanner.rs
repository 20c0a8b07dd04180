//! Splits a message into literal text and `${ ... }` action bodies

use crate::error::ParseError;

use super::ast::Span;

/// Opening delimiter of an action
pub const OPEN_DELIM: &str = "${";
/// Closing delimiter of an action
pub const CLOSE_DELIM: char = '}';

/// A piece of the message before tokenizing
#[derive(Debug, Clone, PartialEq)]
pub enum Chunk<'a> {
    Text { text: &'a str, span: Span },
    /// `body` starts at byte `body_start` of the message; `span` covers the
    /// delimiters too
    Action {
        body: &'a str,
        body_start: usize,
        span: Span,
    },
}

#[derive(Clone, Copy, PartialEq)]
enum State {
    Code,
    Quoted { escaped: bool },
    Raw,
    Comment,
}

/// Byte offset (relative to `body`) of the delimiter closing the action
///
/// A `}` inside a quoted string, raw string or block comment does not close
/// the action.
fn find_close(body: &str) -> Option<usize> {
    let bytes = body.as_bytes();
    let mut state = State::Code;
    let mut i = 0;
    while i < bytes.len() {
        let c = bytes[i];
        state = match state {
            State::Code => match c {
                b'}' => return Some(i),
                b'"' => State::Quoted { escaped: false },
                b'`' => State::Raw,
                b'/' if bytes.get(i + 1) == Some(&b'*') => {
                    i += 1;
                    State::Comment
                }
                _ => State::Code,
            },
            State::Quoted { escaped: true } => State::Quoted { escaped: false },
            State::Quoted { escaped: false } => match c {
                b'\\' => State::Quoted { escaped: true },
                b'"' => State::Code,
                _ => state,
            },
            State::Raw if c == b'`' => State::Code,
            State::Comment if c == b'*' && bytes.get(i + 1) == Some(&b'/') => {
                i += 1;
                State::Code
            }
            State::Raw | State::Comment => state,
        };
        i += 1;
    }
    None
}

/// Split `input` into text and action chunks
pub fn split(input: &str) -> Result<Vec<Chunk<'_>>, ParseError> {
    let mut chunks = Vec::new();
    let mut pos = 0;

    while let Some(found) = input[pos..].find(OPEN_DELIM) {
        let open = pos + found;
        if open > pos {
            chunks.push(Chunk::Text {
                text: &input[pos..open],
                span: pos..open,
            });
        }

        let body_start = open + OPEN_DELIM.len();
        let close = find_close(&input[body_start..]).ok_or_else(|| ParseError::Syntax {
            span: open..input.len(),
            message: "unclosed action".to_string(),
            expected: vec![format!("'{}'", CLOSE_DELIM)],
        })?;
        let body_end = body_start + close;
        chunks.push(Chunk::Action {
            body: &input[body_start..body_end],
            body_start,
            span: open..body_end + 1,
        });
        pos = body_end + 1;
    }

    if pos < input.len() {
        chunks.push(Chunk::Text {
            text: &input[pos..],
            span: pos..input.len(),
        });
    }
    Ok(chunks)
}

/// True when an action body holds nothing but one block comment
pub fn is_comment(body: &str) -> bool {
    let trimmed = body.trim();
    trimmed.len() >= 4
        && trimmed.starts_with("/*")
        && trimmed.ends_with("*/")
        && !trimmed[2..trimmed.len() - 2].contains("*/")
}
