//! Core parser infrastructure: token cursor, error reporting, helpers.

use graphgif_lexer::token::{Token, TokenKind};
use graphgif_types::ast::{Ident, Program};
use graphgif_types::{Diagnostic, Diagnostics, ErrorCode, SourceFile, Span, MAX_ERRORS};

/// The GraphGif parser.
///
/// Consumes a token stream produced by the lexer and builds an AST.
/// Collects errors and recovers at statement boundaries.
pub struct Parser<'src> {
    tokens: Vec<Token>,
    /// Current index into `tokens`.
    pos: usize,
    source_file: &'src SourceFile,
    errors: Diagnostics,
}

/// Result of parsing.
pub struct ParseResult {
    pub program: Option<Program>,
    pub errors: Diagnostics,
}

impl ParseResult {
    /// The program, if parsing produced one without errors.
    pub fn ok(self) -> Result<Program, Diagnostics> {
        match self.program {
            Some(program) if !self.errors.has_errors() => Ok(program),
            _ => Err(self.errors),
        }
    }
}

impl<'src> Parser<'src> {
    pub fn new(tokens: Vec<Token>, source_file: &'src SourceFile) -> Self {
        let mut tokens = tokens;
        if tokens.last().is_none_or(|t| t.kind != TokenKind::Eof) {
            let span = tokens.last().map(|t| t.span).unwrap_or_default();
            tokens.push(Token::new(TokenKind::Eof, span));
        }
        Self {
            tokens,
            pos: 0,
            source_file,
            errors: Diagnostics::empty(),
        }
    }

    // ── Token Cursor ──────────────────────────────────────────────────────────

    /// Returns the current token without advancing.
    pub(crate) fn peek(&self) -> &Token {
        let last = self.tokens.len() - 1;
        &self.tokens[self.pos.min(last)]
    }

    pub(crate) fn peek_kind(&self) -> &TokenKind {
        &self.peek().kind
    }

    /// Advance the cursor by one and return the consumed token.
    pub(crate) fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    pub(crate) fn previous_span(&self) -> Span {
        match self.pos.checked_sub(1).and_then(|i| self.tokens.get(i)) {
            Some(token) => token.span,
            None => Span::point(1, 1),
        }
    }

    pub(crate) fn current_span(&self) -> Span {
        self.peek().span
    }

    pub(crate) fn at_end(&self) -> bool {
        matches!(self.peek_kind(), TokenKind::Eof)
    }

    pub(crate) fn check_exact(&self, kind: &TokenKind) -> bool {
        self.peek_kind() == kind
    }

    /// If the current token matches, advance and return `true`.
    pub(crate) fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.check_exact(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Look ahead by `n` tokens from current position.
    pub(crate) fn look_ahead(&self, n: usize) -> &TokenKind {
        self.tokens
            .get(self.pos + n)
            .map(|t| &t.kind)
            .unwrap_or(&TokenKind::Eof)
    }

    // ── Expect Helpers ────────────────────────────────────────────────────────

    /// Expect a specific token kind. Returns the token if matched, or emits an error.
    pub(crate) fn expect(&mut self, expected: &TokenKind) -> Option<Token> {
        if self.check_exact(expected) {
            Some(self.advance())
        } else {
            self.error_at_current(
                ErrorCode::UNEXPECTED_TOKEN,
                format!("expected '{}', got '{}'", expected, self.peek_kind()),
            );
            None
        }
    }

    /// Expect the closing delimiter of a construct opened at `open`.
    pub(crate) fn expect_closing(&mut self, expected: &TokenKind, open: Span) -> Option<Token> {
        if self.check_exact(expected) {
            return Some(self.advance());
        }
        let code = if self.at_end() {
            ErrorCode::UNCLOSED_DELIMITER
        } else {
            ErrorCode::UNEXPECTED_TOKEN
        };
        let message = format!(
            "expected '{}' to close the group opened at {}, got '{}'",
            expected,
            open,
            self.peek_kind()
        );
        self.error_at_current(code, message);
        None
    }

    pub(crate) fn expect_identifier(&mut self) -> Option<Ident> {
        match self.peek_kind().clone() {
            TokenKind::Identifier(name) => {
                let span = self.advance().span;
                Some(Ident::new(name, span))
            }
            other => {
                let message = if other.is_keyword() {
                    format!("'{other}' is a reserved word and cannot be used as a name")
                } else {
                    format!("expected identifier, got '{other}'")
                };
                self.error_at_current(ErrorCode::UNEXPECTED_TOKEN, message);
                None
            }
        }
    }

    /// Expect an identifier OR a keyword used as a key.
    ///
    /// Keywords are contextually valid as attribute keys (`[node = x]`),
    /// argument keys (`graph = g`) and path segments after `.`.
    pub(crate) fn expect_name(&mut self) -> Option<Ident> {
        let kind = self.peek_kind().clone();
        match &kind {
            TokenKind::Identifier(name) => {
                let name = name.clone();
                let span = self.advance().span;
                Some(Ident::new(name, span))
            }
            _ if kind.is_keyword() => {
                let name = kind.to_string();
                let span = self.advance().span;
                Some(Ident::new(name, span))
            }
            _ => {
                self.error_at_current(
                    ErrorCode::UNEXPECTED_TOKEN,
                    format!("expected name, got '{}'", self.peek_kind()),
                );
                None
            }
        }
    }

    /// Expect the `;` that terminates an item. Reports but does not consume
    /// anything else when it is missing.
    pub(crate) fn expect_semicolon(&mut self, what: &str) {
        if !self.eat(&TokenKind::Semicolon) {
            self.error_at_current(
                ErrorCode::UNEXPECTED_TOKEN,
                format!("expected ';' after {what}, got '{}'", self.peek_kind()),
            );
        }
    }

    // ── Error Reporting ───────────────────────────────────────────────────────

    pub(crate) fn error_at_current(&mut self, code: ErrorCode, message: impl Into<String>) {
        let span = self.current_span();
        self.error_at(code, message, span);
    }

    pub(crate) fn error_at(&mut self, code: ErrorCode, message: impl Into<String>, span: Span) {
        let error = Diagnostic::at(self.source_file, code, message, span);
        self.errors.push(error);
    }

    pub(crate) fn error_with_suggestion(
        &mut self,
        code: ErrorCode,
        message: impl Into<String>,
        span: Span,
        suggestion: impl Into<String>,
    ) {
        let error = Diagnostic::at(self.source_file, code, message, span).with_suggestion(suggestion);
        self.errors.push(error);
    }

    /// Returns `true` if we've hit the error limit and should stop.
    pub(crate) fn too_many_errors(&self) -> bool {
        self.errors.total_errors >= MAX_ERRORS
    }

    // ── Synchronization ───────────────────────────────────────────────────────

    /// Skip tokens until a synchronization point.
    ///
    /// Consumes through the next `;`, or stops before a `}` or a token that
    /// starts a top-level item.
    pub(crate) fn synchronize(&mut self) {
        while !self.at_end() {
            match self.peek_kind() {
                TokenKind::Semicolon => {
                    self.advance();
                    return;
                }
                TokenKind::RBrace => return,
                kind if kind.starts_item() => return,
                _ => {
                    self.advance();
                }
            }
        }
    }

    // ── Public API ────────────────────────────────────────────────────────────

    /// Parse the token stream into a `Program` AST.
    pub fn parse(mut self) -> ParseResult {
        let program = self.parse_program();
        ParseResult {
            program,
            errors: self.errors,
        }
    }
}
