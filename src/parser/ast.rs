//! Syntax tree for message templates

use std::fmt;

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

/// AST node with source location
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned<T> {
    pub node: T,
    pub span: Span,
}

impl<T> Spanned<T> {
    pub fn new(node: T, span: Span) -> Self {
        Self { node, span }
    }
}

/// Function name (alphanumeric + underscore, starts with letter/_)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identifier(pub String);

impl Identifier {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Runtime value of an operand or function result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Str(String),
    Int(i64),
    Bool(bool),
}

impl Value {
    /// Type name used in error messages
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Str(_) => "string",
            Value::Int(_) => "int",
            Value::Bool(_) => "bool",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Str(s) => f.write_str(s),
            Value::Int(n) => write!(f, "{}", n),
            Value::Bool(b) => write!(f, "{}", b),
        }
    }
}

/// A parsed message: literal text interleaved with actions
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Template {
    pub segments: Vec<Spanned<Segment>>,
}

impl Template {
    /// True when the message has no actions at all
    pub fn is_plain_text(&self) -> bool {
        self.segments
            .iter()
            .all(|s| matches!(s.node, Segment::Text(_)))
    }

    /// Every function name referenced anywhere in the template
    pub fn identifiers(&self) -> Vec<&Spanned<Identifier>> {
        let mut out = Vec::new();
        for segment in &self.segments {
            if let Segment::Action(pipeline) = &segment.node {
                pipeline.collect_identifiers(&mut out);
            }
        }
        out
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    /// Text copied to the output unchanged
    Text(String),
    /// `${ pipeline }`
    Action(Pipeline),
    /// `${/* ... */}`, produces no output
    Comment,
}

/// Commands chained with `|`; each result is passed as the last argument of
/// the next command
#[derive(Debug, Clone, PartialEq)]
pub struct Pipeline {
    pub commands: Vec<Spanned<Command>>,
}

impl Pipeline {
    fn collect_identifiers<'a>(&'a self, out: &mut Vec<&'a Spanned<Identifier>>) {
        for command in &self.commands {
            for operand in &command.node.operands {
                match &operand.node {
                    Operand::Identifier(id) => out.push(id),
                    Operand::Pipeline(inner) => inner.collect_identifiers(out),
                    _ => {}
                }
            }
        }
    }
}

/// A function call `name arg...`, or a single non-function operand
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    pub operands: Vec<Spanned<Operand>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// Function name; called with no arguments when used as an argument
    Identifier(Spanned<Identifier>),
    /// String, integer or boolean constant
    Literal(Value),
    /// `.`, the (empty) data passed to the template
    Dot,
    /// `.name`, a field of the data
    Field(String),
    /// `( pipeline )`
    Pipeline(Box<Pipeline>),
}
