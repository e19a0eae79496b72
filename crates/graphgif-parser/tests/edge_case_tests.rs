//! Parser error and recovery tests.
//!
//! Covers:
//! 1. Declaration ordering (E103) at program and graph-body level
//! 2. Missing terminators and delimiters
//! 3. Recovery: later items are still parsed after a bad one
//! 4. The stored-error cap

use graphgif_lexer::Lexer;
use graphgif_parser::{ParseResult, Parser};
use graphgif_types::{ErrorCode, SourceFile, MAX_ERRORS};

// ─────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────

fn parse(source: &str) -> ParseResult {
    let sf = SourceFile::new("test.gg", source);
    let lex = Lexer::new(&sf).lex();
    Parser::new(lex.tokens, &sf).parse()
}

fn error_count(source: &str) -> usize {
    parse(source).errors.total_errors
}

fn codes(source: &str) -> Vec<ErrorCode> {
    parse(source).errors.errors.iter().map(|e| e.code).collect()
}

// ─────────────────────────────────────────────────────────────────────
// Declaration order
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_var_after_graph() {
    let result = parse("directed graph g { a; } var node x = a;");
    let err = result.errors.first().unwrap();
    assert_eq!(err.code, ErrorCode::DECLARATION_ORDER);
    assert!(err.message.contains("variable declaration"));
    assert!(err.suggestion.is_some());
    // The declaration is still kept in the AST.
    assert_eq!(result.program.unwrap().vars.len(), 1);
}

#[test]
fn test_graph_after_command() {
    assert_eq!(
        codes("run a with (); directed graph g { }"),
        vec![ErrorCode::DECLARATION_ORDER]
    );
}

#[test]
fn test_var_after_command() {
    assert_eq!(
        codes("run a with (); var node x = a;"),
        vec![ErrorCode::DECLARATION_ORDER]
    );
}

#[test]
fn test_order_is_monotonic_after_violation() {
    // One violation for the var, none for the command that follows.
    assert_eq!(
        codes("directed graph g { } var node x = a; run r with ();"),
        vec![ErrorCode::DECLARATION_ORDER]
    );
}

#[test]
fn test_global_after_statement() {
    let result = parse("directed graph g { a -> b; node [color = red]; }");
    assert_eq!(
        result.errors.errors.iter().map(|e| e.code).collect::<Vec<_>>(),
        vec![ErrorCode::DECLARATION_ORDER]
    );
    let program = result.program.unwrap();
    assert_eq!(program.graphs[0].globals.len(), 1);
}

#[test]
fn test_var_between_globals_is_allowed() {
    assert_eq!(
        error_count("directed graph g { var attributes s = [k = v]; attributes $s; a; }"),
        0
    );
}

// ─────────────────────────────────────────────────────────────────────
// Malformed items
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_missing_semicolon_after_var() {
    assert_eq!(
        codes("var node x = a directed graph g { }"),
        vec![ErrorCode::UNEXPECTED_TOKEN]
    );
}

#[test]
fn test_missing_semicolon_in_body() {
    assert_eq!(codes("directed graph g { a -> b }"), vec![ErrorCode::UNEXPECTED_TOKEN]);
}

#[test]
fn test_unclosed_graph_body() {
    assert_eq!(
        codes("directed graph g { a -> b;"),
        vec![ErrorCode::UNCLOSED_DELIMITER]
    );
}

#[test]
fn test_unclosed_graph_before_command() {
    let result = parse("directed graph g { a -> b; run draw with ();");
    assert_eq!(result.errors.total_errors, 1);
    assert_eq!(result.program.unwrap().commands.len(), 1);
}

#[test]
fn test_bad_var_type() {
    let result = parse("var graph x = a;");
    let err = result.errors.first().unwrap();
    assert!(err.message.contains("expected 'node', 'edge' or 'attributes'"));
}

#[test]
fn test_keyword_as_variable_name() {
    let result = parse("var node edge = a;");
    let err = result.errors.first().unwrap();
    assert!(err.message.contains("reserved word"));
}

#[test]
fn test_empty_attribute_list() {
    assert_eq!(error_count("var attributes s = [];"), 1);
}

#[test]
fn test_missing_attribute_operator() {
    let result = parse("var attributes s = [color red];");
    assert!(result.errors.first().unwrap().message.contains("'=' or ':'"));
}

#[test]
fn test_missing_value() {
    assert_eq!(error_count("var attributes s = [color = ];"), 1);
}

#[test]
fn test_path_must_start_with_identifier() {
    // A literal is fine, but a dangling dot is not.
    assert_eq!(error_count("run a with (x = 1);"), 0);
    assert_eq!(error_count("run a with (x = g.);"), 1);
}

#[test]
fn test_unclosed_argument_list() {
    assert_eq!(codes("run a with (x = g"), vec![ErrorCode::UNCLOSED_DELIMITER]);
}

#[test]
fn test_stray_token_at_top_level() {
    let result = parse("} var node x = a;");
    assert_eq!(result.errors.total_errors, 1);
    assert_eq!(result.program.unwrap().vars.len(), 1);
}

// ─────────────────────────────────────────────────────────────────────
// Recovery
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_recovery_continues_after_bad_var() {
    let result = parse("var node = a; var node y = b; run r with ();");
    assert_eq!(result.errors.total_errors, 1);
    let program = result.program.unwrap();
    assert_eq!(program.vars.len(), 1);
    assert_eq!(program.vars[0].name.name, "y");
    assert_eq!(program.commands.len(), 1);
}

#[test]
fn test_recovery_inside_graph_body() {
    let result = parse("directed graph g { a -> ; b -> c; 42; d; }");
    assert_eq!(result.errors.total_errors, 2);
    let program = result.program.unwrap();
    assert_eq!(program.graphs[0].body.len(), 2);
}

#[test]
fn test_error_cap() {
    let src = "var node = a;\n".repeat(30);
    let result = parse(&src);
    assert!(result.errors.errors.len() <= MAX_ERRORS);
    assert_eq!(result.errors.total_errors, MAX_ERRORS);
}

#[test]
fn test_error_location() {
    let result = parse("var node x = a;\nrun draw with (target = );");
    let err = result.errors.first().unwrap();
    assert_eq!(err.span.start_line, 2);
    assert_eq!(err.source_line, "run draw with (target = );");
    assert_eq!(err.file, "test.gg");
}

#[test]
fn test_ok_reports_errors() {
    assert!(parse("var node x = ;").ok().is_err());
    assert!(parse("var node x = a;").ok().is_ok());
}
