//! Parser for `${ ... }` message templates

pub mod ast;
mod grammar;
pub mod lexer;
pub mod scanner;

pub use ast::*;
pub use grammar::parse;
