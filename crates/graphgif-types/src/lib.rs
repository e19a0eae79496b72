//! Shared types for GraphGif.
//!
//! This crate defines the AST node types, source spans, diagnostics,
//! and the scalar attribute values used by the lexer, parser and engine.

mod error;
mod span;
pub mod ast;

pub use error::{Diagnostic, Diagnostics, ErrorCategory, ErrorCode, Severity, MAX_ERRORS};
pub use span::{SourceFile, Span};

/// Result type used by the front-end stages.
pub type Result<T> = std::result::Result<T, Diagnostic>;
