//! Token types for the GraphGif lexer.
//!
//! Defines [`TokenKind`] covering every lexeme of the language and
//! [`Token`], which pairs a kind with a source [`Span`].

use graphgif_types::Span;
use std::fmt;

/// The reserved words of the language.
///
/// Keywords are lexed as dedicated tokens. The parser still accepts them in
/// key positions (`[node = x]`, `graph = g`), where no ambiguity exists.
pub const ALL_KEYWORDS: &[&str] = &[
    "var",
    "node",
    "edge",
    "attributes",
    "directed",
    "undirected",
    "graph",
    "run",
    "with",
];

// ─────────────────────────────────────────────────────────────────────
// Token
// ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }

    pub fn is_keyword(&self) -> bool {
        self.kind.is_keyword()
    }
}

// ─────────────────────────────────────────────────────────────────────
// TokenKind
// ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // ── Literals ──
    /// `42`, `-3.5`
    Number(f64),
    /// `"text"` or `'text'`, quotes stripped and escapes applied.
    Str(String),
    /// `node_1`, `color`
    Identifier(String),

    // ── Keywords ──
    Var,
    Node,
    Edge,
    Attributes,
    Directed,
    Undirected,
    Graph,
    Run,
    With,

    // ── Edge operators ──
    /// `--`
    DashDash,
    /// `->`
    Arrow,
    /// `<-`
    BackArrow,

    // ── Punctuation ──
    Semicolon,
    Eq,
    Colon,
    Comma,
    Dot,
    Dollar,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    LParen,
    RParen,

    Eof,
}

impl TokenKind {
    pub fn from_keyword(s: &str) -> Option<TokenKind> {
        let kind = match s {
            "var" => TokenKind::Var,
            "node" => TokenKind::Node,
            "edge" => TokenKind::Edge,
            "attributes" => TokenKind::Attributes,
            "directed" => TokenKind::Directed,
            "undirected" => TokenKind::Undirected,
            "graph" => TokenKind::Graph,
            "run" => TokenKind::Run,
            "with" => TokenKind::With,
            _ => return None,
        };
        Some(kind)
    }

    pub fn is_keyword(&self) -> bool {
        self.keyword_text().is_some()
    }

    /// Source text of a keyword token.
    pub fn keyword_text(&self) -> Option<&'static str> {
        let text = match self {
            TokenKind::Var => "var",
            TokenKind::Node => "node",
            TokenKind::Edge => "edge",
            TokenKind::Attributes => "attributes",
            TokenKind::Directed => "directed",
            TokenKind::Undirected => "undirected",
            TokenKind::Graph => "graph",
            TokenKind::Run => "run",
            TokenKind::With => "with",
            _ => return None,
        };
        Some(text)
    }

    /// True for tokens that can only start a top-level item.
    pub fn starts_item(&self) -> bool {
        matches!(
            self,
            TokenKind::Var | TokenKind::Directed | TokenKind::Undirected | TokenKind::Run
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(kw) = self.keyword_text() {
            return f.write_str(kw);
        }
        match self {
            TokenKind::Number(n) => write!(f, "{n}"),
            TokenKind::Str(s) => write!(f, "{s:?}"),
            TokenKind::Identifier(name) => f.write_str(name),
            TokenKind::DashDash => f.write_str("--"),
            TokenKind::Arrow => f.write_str("->"),
            TokenKind::BackArrow => f.write_str("<-"),
            TokenKind::Semicolon => f.write_str(";"),
            TokenKind::Eq => f.write_str("="),
            TokenKind::Colon => f.write_str(":"),
            TokenKind::Comma => f.write_str(","),
            TokenKind::Dot => f.write_str("."),
            TokenKind::Dollar => f.write_str("$"),
            TokenKind::LBracket => f.write_str("["),
            TokenKind::RBracket => f.write_str("]"),
            TokenKind::LBrace => f.write_str("{"),
            TokenKind::RBrace => f.write_str("}"),
            TokenKind::LParen => f.write_str("("),
            TokenKind::RParen => f.write_str(")"),
            TokenKind::Eof => f.write_str("end of file"),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keywords_round_trip() {
        for kw in ALL_KEYWORDS {
            let kind = TokenKind::from_keyword(kw).unwrap();
            assert!(kind.is_keyword());
            assert_eq!(kind.to_string(), *kw);
        }
    }

    #[test]
    fn identifiers_are_not_keywords() {
        for word in ["Graph", "nodes", "edges", "weight", "runner", "v"] {
            assert_eq!(TokenKind::from_keyword(word), None, "{word}");
        }
        assert!(!TokenKind::Identifier("graph".into()).is_keyword());
    }

    #[test]
    fn display_operators() {
        assert_eq!(TokenKind::DashDash.to_string(), "--");
        assert_eq!(TokenKind::Arrow.to_string(), "->");
        assert_eq!(TokenKind::BackArrow.to_string(), "<-");
        assert_eq!(TokenKind::Eof.to_string(), "end of file");
    }

    #[test]
    fn display_literals() {
        assert_eq!(TokenKind::Number(3.0).to_string(), "3");
        assert_eq!(TokenKind::Str("hi".into()).to_string(), "\"hi\"");
        assert_eq!(TokenKind::Identifier("g".into()).to_string(), "g");
    }

    #[test]
    fn item_starters() {
        assert!(TokenKind::Var.starts_item());
        assert!(TokenKind::Run.starts_item());
        assert!(!TokenKind::Graph.starts_item());
        assert!(!TokenKind::Semicolon.starts_item());
    }
}
