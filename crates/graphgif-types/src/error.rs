use crate::{SourceFile, Span};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum number of diagnostics stored before a stage stops reporting.
pub const MAX_ERRORS: usize = 20;

/// Diagnostic severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// Diagnostic category, determined by error code range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorCategory {
    Syntax,
    Scope,
    Structure,
    Type,
    Resolution,
    Command,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Syntax => "syntax",
            Self::Scope => "scope",
            Self::Structure => "structure",
            Self::Type => "type",
            Self::Resolution => "resolution",
            Self::Command => "command",
        };
        f.write_str(name)
    }
}

/// Numeric error code (E100–E699).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ErrorCode(pub u16);

impl ErrorCode {
    // ── Syntax (E100–E199) ──
    pub const UNEXPECTED_TOKEN: Self = Self(100);
    pub const UNCLOSED_DELIMITER: Self = Self(101);
    pub const UNTERMINATED_STRING: Self = Self(102);
    pub const DECLARATION_ORDER: Self = Self(103);
    pub const INVALID_CHARACTER: Self = Self(104);
    pub const INVALID_NUMBER: Self = Self(105);

    // ── Scope (E200–E299) ──
    pub const REDECLARATION: Self = Self(200);
    pub const UNBOUND_NAME: Self = Self(201);

    // ── Structure (E300–E399) ──
    pub const DUPLICATE_GRAPH: Self = Self(300);
    pub const ATTRIBUTE_KEY_CONFLICT: Self = Self(301);
    pub const DIRECTEDNESS_MISMATCH: Self = Self(302);

    // ── Type (E400–E499) ──
    pub const TYPE_MISMATCH: Self = Self(400);

    // ── Resolution (E500–E599) ──
    pub const PATH_RESOLUTION: Self = Self(500);

    // ── Command (E600–E699) ──
    pub const UNKNOWN_COMMAND: Self = Self(600);
    pub const HANDLER_FAILED: Self = Self(601);

    pub fn category(self) -> ErrorCategory {
        match self.0 {
            200..=299 => ErrorCategory::Scope,
            300..=399 => ErrorCategory::Structure,
            400..=499 => ErrorCategory::Type,
            500..=599 => ErrorCategory::Resolution,
            600..=699 => ErrorCategory::Command,
            _ => ErrorCategory::Syntax,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{}", self.0)
    }
}

/// A structured diagnostic produced by any stage (lexer, parser, engine).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Source file name.
    pub file: String,
    pub code: ErrorCode,
    pub severity: Severity,
    /// Derived from `code`.
    pub category: ErrorCategory,
    pub message: String,
    #[serde(flatten)]
    pub span: Span,
    /// The offending source line, verbatim.
    pub source_line: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub suggestion: Option<String>,
}

impl Diagnostic {
    pub fn new(
        file: impl Into<String>,
        code: ErrorCode,
        message: impl Into<String>,
        span: Span,
        source_line: impl Into<String>,
    ) -> Self {
        Self {
            file: file.into(),
            code,
            severity: Severity::Error,
            category: code.category(),
            message: message.into(),
            span,
            source_line: source_line.into(),
            suggestion: None,
        }
    }

    /// Build a diagnostic whose file name and source line come from `source`.
    pub fn at(source: &SourceFile, code: ErrorCode, message: impl Into<String>, span: Span) -> Self {
        let line = source.line(span.start_line).unwrap_or_default();
        Self::new(source.name.clone(), code, message, span, line)
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    pub fn warning(mut self) -> Self {
        self.severity = Severity::Warning;
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}: {} [{}] {}",
            self.file, self.span, self.code, self.category, self.message
        )
    }
}

impl std::error::Error for Diagnostic {}

/// Collected diagnostics of one stage, capped at [`MAX_ERRORS`] stored errors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Diagnostics {
    pub errors: Vec<Diagnostic>,
    pub warnings: Vec<Diagnostic>,
    pub total_errors: usize,
    pub total_warnings: usize,
}

impl Diagnostics {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn has_errors(&self) -> bool {
        self.total_errors > 0
    }

    /// True once the stored error list is full.
    pub fn is_full(&self) -> bool {
        self.errors.len() >= MAX_ERRORS
    }

    /// Add a diagnostic. Errors past the limit are counted but not stored.
    pub fn push(&mut self, diagnostic: Diagnostic) {
        match diagnostic.severity {
            Severity::Error => {
                if self.errors.len() < MAX_ERRORS {
                    self.errors.push(diagnostic);
                }
                self.total_errors += 1;
            }
            Severity::Warning => {
                self.warnings.push(diagnostic);
                self.total_warnings += 1;
            }
        }
    }

    /// Append everything from another stage.
    pub fn extend(&mut self, other: Diagnostics) {
        let hidden = other.total_errors - other.errors.len();
        for d in other.errors.into_iter().chain(other.warnings) {
            self.push(d);
        }
        self.total_errors += hidden;
    }

    pub fn first(&self) -> Option<&Diagnostic> {
        self.errors.first()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(code: ErrorCode) -> Diagnostic {
        Diagnostic::new(
            "test.gg",
            code,
            "edge operator '--' is not allowed in directed graph 'g'",
            Span::new(3, 5, 3, 11),
            "    a -- b;",
        )
    }

    #[test]
    fn code_categories() {
        assert_eq!(ErrorCode::UNEXPECTED_TOKEN.category(), ErrorCategory::Syntax);
        assert_eq!(ErrorCode::DECLARATION_ORDER.category(), ErrorCategory::Syntax);
        assert_eq!(ErrorCode::REDECLARATION.category(), ErrorCategory::Scope);
        assert_eq!(ErrorCode::UNBOUND_NAME.category(), ErrorCategory::Scope);
        assert_eq!(ErrorCode::DUPLICATE_GRAPH.category(), ErrorCategory::Structure);
        assert_eq!(
            ErrorCode::DIRECTEDNESS_MISMATCH.category(),
            ErrorCategory::Structure
        );
        assert_eq!(ErrorCode::TYPE_MISMATCH.category(), ErrorCategory::Type);
        assert_eq!(
            ErrorCode::PATH_RESOLUTION.category(),
            ErrorCategory::Resolution
        );
        assert_eq!(ErrorCode::UNKNOWN_COMMAND.category(), ErrorCategory::Command);
        assert_eq!(ErrorCode::HANDLER_FAILED.category(), ErrorCategory::Command);
    }

    #[test]
    fn code_display() {
        assert_eq!(ErrorCode::DIRECTEDNESS_MISMATCH.to_string(), "E302");
        assert_eq!(ErrorCode::UNEXPECTED_TOKEN.to_string(), "E100");
    }

    #[test]
    fn diagnostic_display() {
        let d = sample(ErrorCode::DIRECTEDNESS_MISMATCH);
        assert_eq!(
            d.to_string(),
            "test.gg:3:5: E302 [structure] edge operator '--' is not allowed in directed graph 'g'"
        );
    }

    #[test]
    fn diagnostic_from_source_file() {
        let src = SourceFile::new("prog.gg", "var node a = $x;\nrun draw with (g=q);");
        let d = Diagnostic::at(
            &src,
            ErrorCode::PATH_RESOLUTION,
            "cannot resolve 'q'",
            Span::new(2, 18, 2, 19),
        )
        .with_suggestion("declare graph 'q' first");
        assert_eq!(d.file, "prog.gg");
        assert_eq!(d.source_line, "run draw with (g=q);");
        assert_eq!(d.category, ErrorCategory::Resolution);
        assert_eq!(d.suggestion.as_deref(), Some("declare graph 'q' first"));
    }

    #[test]
    fn diagnostic_json_shape() {
        let d = sample(ErrorCode::DIRECTEDNESS_MISMATCH).with_suggestion("use '->'");
        let json = serde_json::to_value(&d).unwrap();
        assert_eq!(json["code"], 302);
        assert_eq!(json["severity"], "error");
        assert_eq!(json["category"], "structure");
        assert_eq!(json["line"], 3);
        assert_eq!(json["column"], 5);
        assert_eq!(json["end_line"], 3);
        assert_eq!(json["end_column"], 11);
        assert_eq!(json["suggestion"], "use '->'");

        let back: Diagnostic = serde_json::from_value(json).unwrap();
        assert_eq!(back, d);
    }

    #[test]
    fn suggestion_omitted_when_absent() {
        let json = serde_json::to_string(&sample(ErrorCode::TYPE_MISMATCH)).unwrap();
        assert!(!json.contains("suggestion"));
    }

    #[test]
    fn diagnostics_cap() {
        let mut diags = Diagnostics::empty();
        for i in 0..25u32 {
            diags.push(Diagnostic::new(
                "test.gg",
                ErrorCode::UNEXPECTED_TOKEN,
                format!("error {i}"),
                Span::point(i + 1, 1),
                "",
            ));
        }
        assert_eq!(diags.errors.len(), MAX_ERRORS);
        assert_eq!(diags.total_errors, 25);
        assert!(diags.is_full());
        assert!(diags.has_errors());
    }

    #[test]
    fn warnings_are_separate() {
        let mut diags = Diagnostics::empty();
        diags.push(sample(ErrorCode::TYPE_MISMATCH).warning());
        assert!(!diags.has_errors());
        assert_eq!(diags.total_warnings, 1);
    }

    #[test]
    fn extend_keeps_hidden_count() {
        let mut a = Diagnostics::empty();
        let mut b = Diagnostics::empty();
        for _ in 0..22 {
            b.push(sample(ErrorCode::UNEXPECTED_TOKEN));
        }
        a.push(sample(ErrorCode::TYPE_MISMATCH));
        a.extend(b);
        assert_eq!(a.errors.len(), MAX_ERRORS);
        assert_eq!(a.total_errors, 23);
        assert_eq!(a.first().map(|d| d.code), Some(ErrorCode::TYPE_MISMATCH));
    }

    #[test]
    fn serialization_is_deterministic() {
        let first = serde_json::to_string(&sample(ErrorCode::UNBOUND_NAME)).unwrap();
        for i in 0..100 {
            let json = serde_json::to_string(&sample(ErrorCode::UNBOUND_NAME)).unwrap();
            assert_eq!(first, json, "determinism failure at iteration {i}");
        }
    }
}
