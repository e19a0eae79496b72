//! Evaluation error types.
//!
//! Every error aborts the whole evaluation. Variants carry the offending
//! name, path or graph id and the source span so a host can render a
//! precise [`Diagnostic`].

use graphgif_types::ast::{Direction, EdgeOp};
use graphgif_types::{Diagnostic, ErrorCode, SourceFile, Span};
use thiserror::Error;

/// Failure raised by a command handler. Passed through unmodified.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum EvalError {
    /// A name was declared twice in one scope.
    #[error("'{name}' is already declared in this scope")]
    Redeclaration {
        name: String,
        span: Span,
        previous: Span,
    },

    /// A variable reference did not resolve in any active scope.
    #[error("'{name}' is not bound to a variable")]
    UnboundName { name: String, span: Span },

    /// Two graphs share an id.
    #[error("graph '{graph}' is already declared")]
    DuplicateGraph {
        graph: String,
        span: Span,
        previous: Span,
    },

    /// One attribute list names the same key twice.
    #[error("attribute '{key}' appears more than once in the same list")]
    AttributeKeyConflict { key: String, span: Span },

    /// Edge operator incompatible with the graph's direction.
    #[error("edge operator '{op}' is not allowed in {direction} graph '{graph}'")]
    DirectednessMismatch {
        graph: String,
        direction: Direction,
        op: EdgeOp,
        span: Span,
    },

    /// A value of the wrong kind was bound or used.
    #[error("'{name}' expected {expected}, found {found}")]
    TypeMismatch {
        name: String,
        expected: String,
        found: String,
        span: Span,
    },

    /// A dotted path could not be narrowed at `failing_segment`.
    #[error("cannot resolve '{failing_segment}' in path '{}'", .path.join("."))]
    PathResolution {
        path: Vec<String>,
        failing_segment: String,
        span: Span,
    },

    /// No handler is registered for a command.
    #[error("no handler registered for command '{command}'")]
    UnknownCommand { command: String, span: Span },

    /// A handler reported a failure.
    #[error("command '{command}' failed: {source}")]
    Handler {
        command: String,
        span: Span,
        #[source]
        source: HandlerError,
    },
}

/// Result alias for engine operations.
pub type EvalResult<T> = Result<T, EvalError>;

impl EvalError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Redeclaration { .. } => ErrorCode::REDECLARATION,
            Self::UnboundName { .. } => ErrorCode::UNBOUND_NAME,
            Self::DuplicateGraph { .. } => ErrorCode::DUPLICATE_GRAPH,
            Self::AttributeKeyConflict { .. } => ErrorCode::ATTRIBUTE_KEY_CONFLICT,
            Self::DirectednessMismatch { .. } => ErrorCode::DIRECTEDNESS_MISMATCH,
            Self::TypeMismatch { .. } => ErrorCode::TYPE_MISMATCH,
            Self::PathResolution { .. } => ErrorCode::PATH_RESOLUTION,
            Self::UnknownCommand { .. } => ErrorCode::UNKNOWN_COMMAND,
            Self::Handler { .. } => ErrorCode::HANDLER_FAILED,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            Self::Redeclaration { span, .. }
            | Self::UnboundName { span, .. }
            | Self::DuplicateGraph { span, .. }
            | Self::AttributeKeyConflict { span, .. }
            | Self::DirectednessMismatch { span, .. }
            | Self::TypeMismatch { span, .. }
            | Self::PathResolution { span, .. }
            | Self::UnknownCommand { span, .. }
            | Self::Handler { span, .. } => *span,
        }
    }

    fn suggestion(&self) -> Option<String> {
        match self {
            Self::Redeclaration { previous, .. } => {
                Some(format!("first declared at {previous}; choose another name"))
            }
            Self::DuplicateGraph { previous, .. } => {
                Some(format!("first declared at {previous}; rename one of the graphs"))
            }
            Self::DirectednessMismatch { direction, .. } => Some(match direction {
                Direction::Directed => "use '->' or '<-' in a directed graph".to_string(),
                Direction::Undirected => "use '--' in an undirected graph".to_string(),
            }),
            Self::UnknownCommand { .. } => {
                Some("register a handler for this command before evaluating".to_string())
            }
            _ => None,
        }
    }

    /// Render as a structured diagnostic against `source`.
    pub fn to_diagnostic(&self, source: &SourceFile) -> Diagnostic {
        let diagnostic = Diagnostic::at(source, self.code(), self.to_string(), self.span());
        match self.suggestion() {
            Some(s) => diagnostic.with_suggestion(s),
            None => diagnostic,
        }
    }
}
