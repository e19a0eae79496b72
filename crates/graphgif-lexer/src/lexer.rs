//! Core GraphGif lexer: converts source text to a token stream.
//!
//! Features:
//! - Keywords, identifiers, numbers (optionally negative, optionally decimal)
//! - Strings in double or single quotes with `\\ \" \' \n \t` escapes
//! - Edge operators `--`, `->`, `<-`
//! - `//` line comments and `/* */` block comments are skipped
//! - Error recovery: collects up to 20 errors instead of stopping at the first

use graphgif_types::{Diagnostic, Diagnostics, ErrorCode, SourceFile, Span, MAX_ERRORS};

use crate::token::{Token, TokenKind};

/// The GraphGif lexer.
///
/// Converts source text into a vector of [`Token`]s, collecting up to
/// [`MAX_ERRORS`] errors along the way.
pub struct Lexer<'src> {
    source: &'src [u8],
    source_file: &'src SourceFile,
    /// Current byte offset into `source`.
    pos: usize,
    line: u32,
    col: u32,
    errors: Diagnostics,
}

/// Result of lexing: tokens + any errors collected.
pub struct LexResult {
    /// The token stream (always ends with [`TokenKind::Eof`]).
    pub tokens: Vec<Token>,
    pub errors: Diagnostics,
}

impl<'src> Lexer<'src> {
    pub fn new(source_file: &'src SourceFile) -> Self {
        Self {
            source: source_file.source.as_bytes(),
            source_file,
            pos: 0,
            line: 1,
            col: 1,
            errors: Diagnostics::empty(),
        }
    }

    /// Lex the entire source file into a token stream.
    pub fn lex(mut self) -> LexResult {
        let mut tokens = Vec::new();

        loop {
            if self.errors.total_errors >= MAX_ERRORS {
                break;
            }
            let token = self.scan_token();
            let is_eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if is_eof {
                break;
            }
        }

        if tokens.last().is_none_or(|t| t.kind != TokenKind::Eof) {
            tokens.push(Token::new(TokenKind::Eof, self.current_span()));
        }

        LexResult {
            tokens,
            errors: self.errors,
        }
    }

    // ─────────────────────────────────────────────────────────────
    // Character-level helpers
    // ─────────────────────────────────────────────────────────────

    fn peek(&self) -> Option<u8> {
        self.source.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.source.get(self.pos + offset).copied()
    }

    fn advance(&mut self) -> Option<u8> {
        let ch = self.source.get(self.pos).copied()?;
        self.pos += 1;
        if ch == b'\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(ch)
    }

    fn current_span(&self) -> Span {
        Span::point(self.line, self.col)
    }

    fn span_from(&self, start_line: u32, start_col: u32) -> Span {
        Span::new(
            start_line,
            start_col,
            self.line,
            self.col.saturating_sub(1).max(1),
        )
    }

    fn text_from(&self, start: usize) -> &'src str {
        let source: &'src [u8] = self.source;
        std::str::from_utf8(&source[start..self.pos]).unwrap_or("")
    }

    fn emit_error(&mut self, code: ErrorCode, message: impl Into<String>, span: Span) {
        let err = Diagnostic::at(self.source_file, code, message, span);
        self.errors.push(err);
    }

    fn emit_error_with_suggestion(
        &mut self,
        code: ErrorCode,
        message: impl Into<String>,
        span: Span,
        suggestion: impl Into<String>,
    ) {
        let err = Diagnostic::at(self.source_file, code, message, span).with_suggestion(suggestion);
        self.errors.push(err);
    }

    // ─────────────────────────────────────────────────────────────
    // Whitespace & comments
    // ─────────────────────────────────────────────────────────────

    /// Skip whitespace and comments. Newlines are insignificant.
    fn skip_trivia(&mut self) {
        loop {
            match (self.peek(), self.peek_at(1)) {
                (Some(b' ' | b'\t' | b'\r' | b'\n'), _) => {
                    self.advance();
                }
                (Some(b'/'), Some(b'/')) => {
                    while let Some(ch) = self.peek() {
                        if ch == b'\n' {
                            break;
                        }
                        self.advance();
                    }
                }
                (Some(b'/'), Some(b'*')) => self.skip_block_comment(),
                _ => break,
            }
        }
    }

    fn skip_block_comment(&mut self) {
        let start_line = self.line;
        let start_col = self.col;
        self.advance();
        self.advance();
        loop {
            match self.peek() {
                None => {
                    let span = self.span_from(start_line, start_col);
                    self.emit_error_with_suggestion(
                        ErrorCode::UNCLOSED_DELIMITER,
                        "Unterminated block comment",
                        span,
                        "Close the comment with */",
                    );
                    return;
                }
                Some(b'*') if self.peek_at(1) == Some(b'/') => {
                    self.advance();
                    self.advance();
                    return;
                }
                _ => {
                    self.advance();
                }
            }
        }
    }

    // ─────────────────────────────────────────────────────────────
    // Token scanning
    // ─────────────────────────────────────────────────────────────

    /// Scan one token, skipping (and reporting) any invalid characters.
    fn scan_token(&mut self) -> Token {
        loop {
            self.skip_trivia();

            if self.errors.total_errors >= MAX_ERRORS {
                return Token::new(TokenKind::Eof, self.current_span());
            }

            let start = self.pos;
            let start_line = self.line;
            let start_col = self.col;
            let Some(ch) = self.advance() else {
                return Token::new(TokenKind::Eof, self.current_span());
            };

            let kind = match ch {
                b'"' | b'\'' => self.scan_string(ch, start_line, start_col),
                b'0'..=b'9' => self.scan_number(start),
                b'a'..=b'z' | b'A'..=b'Z' | b'_' => self.scan_identifier(start),

                b'-' => match self.peek() {
                    Some(b'-') => {
                        self.advance();
                        TokenKind::DashDash
                    }
                    Some(b'>') => {
                        self.advance();
                        TokenKind::Arrow
                    }
                    Some(b'0'..=b'9') => self.scan_number(start),
                    _ => {
                        let span = self.span_from(start_line, start_col);
                        self.emit_error_with_suggestion(
                            ErrorCode::INVALID_CHARACTER,
                            "Unexpected character '-'",
                            span,
                            "Edge operators are '--', '->' and '<-'",
                        );
                        continue;
                    }
                },

                b'<' => {
                    if self.peek() == Some(b'-') {
                        self.advance();
                        TokenKind::BackArrow
                    } else {
                        let span = self.span_from(start_line, start_col);
                        self.emit_error_with_suggestion(
                            ErrorCode::INVALID_CHARACTER,
                            "Unexpected character '<'",
                            span,
                            "Did you mean the edge operator '<-'?",
                        );
                        continue;
                    }
                }

                b';' => TokenKind::Semicolon,
                b'=' => TokenKind::Eq,
                b':' => TokenKind::Colon,
                b',' => TokenKind::Comma,
                b'.' => TokenKind::Dot,
                b'$' => TokenKind::Dollar,
                b'[' => TokenKind::LBracket,
                b']' => TokenKind::RBracket,
                b'{' => TokenKind::LBrace,
                b'}' => TokenKind::RBrace,
                b'(' => TokenKind::LParen,
                b')' => TokenKind::RParen,

                _ => {
                    // Swallow the rest of a multi-byte character so it is
                    // reported once.
                    while matches!(self.peek(), Some(b) if b & 0xC0 == 0x80) {
                        self.advance();
                    }
                    let span = self.span_from(start_line, start_col);
                    let text = self.text_from(start).to_string();
                    self.emit_error(
                        ErrorCode::INVALID_CHARACTER,
                        format!("Unexpected character '{text}'"),
                        span,
                    );
                    continue;
                }
            };

            return Token::new(kind, self.span_from(start_line, start_col));
        }
    }

    /// Scan a number; the first character (digit or `-`) is consumed.
    fn scan_number(&mut self, start: usize) -> TokenKind {
        while let Some(b'0'..=b'9') = self.peek() {
            self.advance();
        }
        if self.peek() == Some(b'.') && matches!(self.peek_at(1), Some(b'0'..=b'9')) {
            self.advance();
            while let Some(b'0'..=b'9') = self.peek() {
                self.advance();
            }
        }

        let text = self.text_from(start);
        match text.parse::<f64>() {
            Ok(value) => TokenKind::Number(value),
            Err(_) => {
                // Only reachable for malformed input the scanner above never
                // produces; keep the token so parsing can continue.
                let span = Span::point(self.line, self.col);
                self.emit_error(
                    ErrorCode::INVALID_NUMBER,
                    format!("Invalid number literal '{text}'"),
                    span,
                );
                TokenKind::Number(0.0)
            }
        }
    }

    fn scan_identifier(&mut self, start: usize) -> TokenKind {
        while let Some(ch) = self.peek() {
            if ch.is_ascii_alphanumeric() || ch == b'_' {
                self.advance();
            } else {
                break;
            }
        }
        let text = self.text_from(start);
        TokenKind::from_keyword(text).unwrap_or_else(|| TokenKind::Identifier(text.to_string()))
    }

    /// Scan a string literal; the opening `quote` is consumed.
    fn scan_string(&mut self, quote: u8, start_line: u32, start_col: u32) -> TokenKind {
        let mut buf = Vec::new();

        loop {
            match self.peek() {
                None | Some(b'\n') => {
                    let span = self.span_from(start_line, start_col);
                    self.emit_error_with_suggestion(
                        ErrorCode::UNTERMINATED_STRING,
                        "Unterminated string literal",
                        span,
                        format!("Close the string with {}", quote as char),
                    );
                    break;
                }
                Some(ch) if ch == quote => {
                    self.advance();
                    break;
                }
                Some(b'\\') => {
                    if let Some(escaped) = self.scan_escape_sequence() {
                        buf.push(escaped);
                    }
                }
                Some(ch) => {
                    self.advance();
                    buf.push(ch);
                }
            }
        }

        TokenKind::Str(String::from_utf8_lossy(&buf).into_owned())
    }

    /// Scan an escape sequence starting at the `\`.
    fn scan_escape_sequence(&mut self) -> Option<u8> {
        let start_line = self.line;
        let start_col = self.col;
        self.advance();

        match self.peek() {
            Some(b'\n') | None => None,
            Some(ch) => {
                self.advance();
                match ch {
                    b'"' | b'\'' | b'\\' => Some(ch),
                    b'n' => Some(b'\n'),
                    b't' => Some(b'\t'),
                    _ => {
                        let span = self.span_from(start_line, start_col);
                        self.emit_error(
                            ErrorCode::UNEXPECTED_TOKEN,
                            format!("Invalid escape sequence '\\{}'", ch as char),
                            span,
                        );
                        Some(ch)
                    }
                }
            }
        }
    }
}
