//! GraphGif parser: converts a token stream into an AST.

mod parse_attr;
mod parse_decl;
mod parse_stmt;
mod parser;

pub use parser::{ParseResult, Parser};
