//! Lexer tests: keywords, operators, literals, comments, spans, error
//! recovery, and the 100-iteration determinism test.

use graphgif_lexer::{Lexer, TokenKind};
use graphgif_types::{ErrorCode, SourceFile, Span, MAX_ERRORS};

// ─────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────

/// Lex source text and return just the token kinds (excluding final Eof).
fn kinds(source: &str) -> Vec<TokenKind> {
    let sf = SourceFile::new("test.gg", source);
    Lexer::new(&sf)
        .lex()
        .tokens
        .into_iter()
        .filter(|t| t.kind != TokenKind::Eof)
        .map(|t| t.kind)
        .collect()
}

fn error_count(source: &str) -> usize {
    let sf = SourceFile::new("test.gg", source);
    Lexer::new(&sf).lex().errors.total_errors
}

fn first_error_code(source: &str) -> Option<ErrorCode> {
    let sf = SourceFile::new("test.gg", source);
    Lexer::new(&sf).lex().errors.first().map(|e| e.code)
}

fn ident(name: &str) -> TokenKind {
    TokenKind::Identifier(name.to_string())
}

// ─────────────────────────────────────────────────────────────────────
// Keywords & identifiers
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_all_keywords() {
    let pairs = [
        ("var", TokenKind::Var),
        ("node", TokenKind::Node),
        ("edge", TokenKind::Edge),
        ("attributes", TokenKind::Attributes),
        ("directed", TokenKind::Directed),
        ("undirected", TokenKind::Undirected),
        ("graph", TokenKind::Graph),
        ("run", TokenKind::Run),
        ("with", TokenKind::With),
    ];
    for (src, expected) in &pairs {
        assert_eq!(kinds(src), vec![expected.clone()], "keyword '{src}'");
    }
}

#[test]
fn test_identifiers() {
    assert_eq!(
        kinds("a node_1 _tmp Graph nodes"),
        vec![
            ident("a"),
            ident("node_1"),
            ident("_tmp"),
            ident("Graph"),
            ident("nodes")
        ]
    );
}

// ─────────────────────────────────────────────────────────────────────
// Operators & punctuation
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_edge_operators() {
    assert_eq!(
        kinds("a -- b -> c <- d"),
        vec![
            ident("a"),
            TokenKind::DashDash,
            ident("b"),
            TokenKind::Arrow,
            ident("c"),
            TokenKind::BackArrow,
            ident("d"),
        ]
    );
}

#[test]
fn test_edge_operators_without_spaces() {
    assert_eq!(
        kinds("a->b"),
        vec![ident("a"), TokenKind::Arrow, ident("b")]
    );
    assert_eq!(
        kinds("a<-b"),
        vec![ident("a"), TokenKind::BackArrow, ident("b")]
    );
}

#[test]
fn test_punctuation() {
    assert_eq!(
        kinds("; = : , . $ [ ] { } ( )"),
        vec![
            TokenKind::Semicolon,
            TokenKind::Eq,
            TokenKind::Colon,
            TokenKind::Comma,
            TokenKind::Dot,
            TokenKind::Dollar,
            TokenKind::LBracket,
            TokenKind::RBracket,
            TokenKind::LBrace,
            TokenKind::RBrace,
            TokenKind::LParen,
            TokenKind::RParen,
        ]
    );
}

// ─────────────────────────────────────────────────────────────────────
// Literals
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_numbers() {
    assert_eq!(
        kinds("0 42 3.25 -7 -0.5"),
        vec![
            TokenKind::Number(0.0),
            TokenKind::Number(42.0),
            TokenKind::Number(3.25),
            TokenKind::Number(-7.0),
            TokenKind::Number(-0.5),
        ]
    );
}

#[test]
fn test_double_and_single_quoted_strings() {
    assert_eq!(
        kinds(r#""hello world" 'out.gif'"#),
        vec![
            TokenKind::Str("hello world".into()),
            TokenKind::Str("out.gif".into())
        ]
    );
}

#[test]
fn test_string_escapes() {
    assert_eq!(
        kinds(r#""a\"b\\c\nd\te" 'it\'s'"#),
        vec![
            TokenKind::Str("a\"b\\c\nd\te".into()),
            TokenKind::Str("it's".into())
        ]
    );
}

#[test]
fn test_other_quote_inside_string() {
    assert_eq!(
        kinds(r#""it's" '"q"'"#),
        vec![TokenKind::Str("it's".into()), TokenKind::Str("\"q\"".into())]
    );
}

#[test]
fn test_unicode_in_string() {
    assert_eq!(kinds("\"héllo ✓\""), vec![TokenKind::Str("héllo ✓".into())]);
}

// ─────────────────────────────────────────────────────────────────────
// Comments & whitespace
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_line_comment_skipped() {
    assert_eq!(
        kinds("a; // trailing comment\nb;"),
        vec![ident("a"), TokenKind::Semicolon, ident("b"), TokenKind::Semicolon]
    );
}

#[test]
fn test_block_comment_skipped() {
    assert_eq!(
        kinds("a /* one\n two */ -> b"),
        vec![ident("a"), TokenKind::Arrow, ident("b")]
    );
    assert_eq!(error_count("a /* c */ b"), 0);
}

#[test]
fn test_unterminated_block_comment() {
    assert_eq!(
        first_error_code("a /* never closed"),
        Some(ErrorCode::UNCLOSED_DELIMITER)
    );
}

#[test]
fn test_newlines_are_insignificant() {
    assert_eq!(
        kinds("a\n->\r\n\tb"),
        vec![ident("a"), TokenKind::Arrow, ident("b")]
    );
}

// ─────────────────────────────────────────────────────────────────────
// Full statements
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_variable_declaration() {
    assert_eq!(
        kinds("var node x = $a;"),
        vec![
            TokenKind::Var,
            TokenKind::Node,
            ident("x"),
            TokenKind::Eq,
            TokenKind::Dollar,
            ident("a"),
            TokenKind::Semicolon,
        ]
    );
}

#[test]
fn test_edge_with_attributes() {
    assert_eq!(
        kinds("x -> b[weight=3, label: \"w\"];"),
        vec![
            ident("x"),
            TokenKind::Arrow,
            ident("b"),
            TokenKind::LBracket,
            ident("weight"),
            TokenKind::Eq,
            TokenKind::Number(3.0),
            TokenKind::Comma,
            ident("label"),
            TokenKind::Colon,
            TokenKind::Str("w".into()),
            TokenKind::RBracket,
            TokenKind::Semicolon,
        ]
    );
}

#[test]
fn test_command() {
    assert_eq!(
        kinds("run draw with (target=g.a);"),
        vec![
            TokenKind::Run,
            ident("draw"),
            TokenKind::With,
            TokenKind::LParen,
            ident("target"),
            TokenKind::Eq,
            ident("g"),
            TokenKind::Dot,
            ident("a"),
            TokenKind::RParen,
            TokenKind::Semicolon,
        ]
    );
}

// ─────────────────────────────────────────────────────────────────────
// Spans
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_token_spans() {
    let sf = SourceFile::new("test.gg", "var node\n  x -> yy;");
    let tokens = Lexer::new(&sf).lex().tokens;
    assert_eq!(tokens[0].span, Span::new(1, 1, 1, 3));
    assert_eq!(tokens[1].span, Span::new(1, 5, 1, 8));
    assert_eq!(tokens[2].span, Span::new(2, 3, 2, 3));
    assert_eq!(tokens[3].span, Span::new(2, 5, 2, 6));
    assert_eq!(tokens[4].span, Span::new(2, 8, 2, 9));
    assert_eq!(tokens[5].span, Span::new(2, 10, 2, 10));
}

#[test]
fn test_stream_ends_with_eof() {
    for src in ["", "   ", "// only a comment", "a;"] {
        let sf = SourceFile::new("test.gg", src);
        let tokens = Lexer::new(&sf).lex().tokens;
        assert_eq!(tokens.last().map(|t| &t.kind), Some(&TokenKind::Eof), "{src:?}");
    }
}

// ─────────────────────────────────────────────────────────────────────
// Errors & recovery
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_unterminated_string() {
    assert_eq!(
        first_error_code("\"abc\nnext;"),
        Some(ErrorCode::UNTERMINATED_STRING)
    );
    // Lexing resumes on the next line.
    assert_eq!(
        kinds("'abc\nnext;"),
        vec![
            TokenKind::Str("abc".into()),
            ident("next"),
            TokenKind::Semicolon
        ]
    );
}

#[test]
fn test_invalid_character_recovery() {
    assert_eq!(kinds("a # b"), vec![ident("a"), ident("b")]);
    assert_eq!(error_count("a # b"), 1);
    assert_eq!(first_error_code("a # b"), Some(ErrorCode::INVALID_CHARACTER));
}

#[test]
fn test_lone_operator_characters() {
    assert_eq!(error_count("a - b"), 1);
    assert_eq!(error_count("a < b"), 1);
    assert_eq!(error_count("a > b"), 1);
}

#[test]
fn test_error_details() {
    let sf = SourceFile::new("prog.gg", "var node x = $a;\nx @ y;");
    let result = Lexer::new(&sf).lex();
    let err = result.errors.first().unwrap();
    assert_eq!(err.file, "prog.gg");
    assert_eq!(err.span.start_line, 2);
    assert_eq!(err.span.start_col, 3);
    assert_eq!(err.source_line, "x @ y;");
    assert!(err.message.contains('@'));
}

#[test]
fn test_error_limit() {
    let src = "#".repeat(50);
    let sf = SourceFile::new("test.gg", src);
    let result = Lexer::new(&sf).lex();
    assert_eq!(result.errors.total_errors, MAX_ERRORS);
    assert_eq!(result.tokens.last().map(|t| &t.kind), Some(&TokenKind::Eof));
}

// ─────────────────────────────────────────────────────────────────────
// Determinism
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_determinism_100_iterations() {
    let src = r#"
        var attributes hot = [color = red, weight: 2.5];
        directed graph g {
            attributes [rankdir = LR];
            a, b $hot;
            a -> b [label = "x"];
        };
        run bfs with (start = g.a, output = 'out.gif');
    "#;
    let first = kinds(src);
    for i in 0..100 {
        assert_eq!(kinds(src), first, "determinism failure at iteration {i}");
    }
}
