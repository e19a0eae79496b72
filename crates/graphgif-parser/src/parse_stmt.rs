//! Graph body parsing: global attribute declarations, graph-local
//! variables, node statements and edge statements.

use crate::parse_decl::is_edge_op;
use crate::parser::Parser;
use graphgif_lexer::token::TokenKind;
use graphgif_types::ast::*;
use graphgif_types::ErrorCode;

impl<'src> Parser<'src> {
    /// Parse the items between `{` and `}` of a graph declaration.
    ///
    /// Global attribute declarations must precede the first node or edge
    /// statement; violations are reported but the declaration is kept.
    pub(crate) fn parse_graph_body(&mut self) -> (Vec<GlobalAttrDecl>, Vec<Stmt>) {
        let mut globals = Vec::new();
        let mut body = Vec::new();
        let mut seen_statement = false;

        while !self.check_exact(&TokenKind::RBrace) && !self.at_end() {
            if self.too_many_errors() {
                break;
            }

            match self.peek_kind() {
                TokenKind::Graph | TokenKind::Attributes | TokenKind::Node | TokenKind::Edge => {
                    if seen_statement {
                        let span = self.current_span();
                        self.error_with_suggestion(
                            ErrorCode::DECLARATION_ORDER,
                            format!(
                                "global '{}' attributes must come before node and edge statements",
                                self.peek_kind()
                            ),
                            span,
                            "move global attribute declarations to the top of the graph body",
                        );
                    }
                    match self.parse_global_attr_decl() {
                        Some(decl) => {
                            globals.push(decl);
                            self.expect_semicolon("global attribute declaration");
                        }
                        None => self.synchronize(),
                    }
                }
                TokenKind::Var => match self.parse_var_decl() {
                    Some(decl) => {
                        body.push(Stmt::Var(decl));
                        self.expect_semicolon("variable declaration");
                    }
                    None => self.synchronize(),
                },
                TokenKind::Dollar | TokenKind::Identifier(_) => {
                    seen_statement = true;
                    match self.parse_statement() {
                        Some(stmt) => {
                            body.push(stmt);
                            self.expect_semicolon("statement");
                        }
                        None => self.synchronize(),
                    }
                }
                // A new top-level item: the closing brace is missing.
                TokenKind::Directed | TokenKind::Undirected | TokenKind::Run => break,
                other => {
                    self.error_at_current(
                        ErrorCode::UNEXPECTED_TOKEN,
                        format!("expected node, edge or attribute declaration, got '{other}'"),
                    );
                    self.advance();
                    self.synchronize();
                }
            }
        }

        (globals, body)
    }

    /// `graph [..]`, `attributes $x`, `node [..]`, `edge [..]`
    fn parse_global_attr_decl(&mut self) -> Option<GlobalAttrDecl> {
        let start = self.current_span();
        let target = match self.advance().kind {
            TokenKind::Node => GlobalTarget::Node,
            TokenKind::Edge => GlobalTarget::Edge,
            _ => GlobalTarget::Graph,
        };
        let source = match self.parse_optional_attr_source()? {
            Some(source) => source,
            None => {
                self.error_at_current(
                    ErrorCode::UNEXPECTED_TOKEN,
                    format!(
                        "expected an attribute list or '$name', got '{}'",
                        self.peek_kind()
                    ),
                );
                return None;
            }
        };
        let span = start.merge(self.previous_span());
        Some(GlobalAttrDecl {
            target,
            source,
            span,
        })
    }

    /// A node statement or an edge statement.
    fn parse_statement(&mut self) -> Option<Stmt> {
        let start = self.current_span();
        if self.check_exact(&TokenKind::Dollar) {
            let target = NodeTarget::Ref(self.parse_var_ref()?);
            let attrs = self.parse_optional_attr_source()?;
            let span = start.merge(self.previous_span());
            return Some(Stmt::Node(NodeStmt {
                target,
                attrs,
                span,
            }));
        }

        if is_edge_op(self.look_ahead(1)) {
            return self.parse_edge_decl().map(Stmt::Edge);
        }

        let target = NodeTarget::List(self.parse_node_list()?);
        let attrs = self.parse_optional_attr_source()?;
        let span = start.merge(self.previous_span());
        Some(Stmt::Node(NodeStmt {
            target,
            attrs,
            span,
        }))
    }

    /// `from op to [attrs]?`
    pub(crate) fn parse_edge_decl(&mut self) -> Option<EdgeDecl> {
        let start = self.current_span();
        let from = self.expect_identifier()?;
        let op = match self.peek_kind() {
            TokenKind::DashDash => EdgeOp::Undirected,
            TokenKind::Arrow => EdgeOp::Forward,
            TokenKind::BackArrow => EdgeOp::Backward,
            other => {
                let message = format!("expected edge operator '--', '->' or '<-', got '{other}'");
                self.error_at_current(ErrorCode::UNEXPECTED_TOKEN, message);
                return None;
            }
        };
        self.advance();
        let to = self.expect_identifier()?;
        let attrs = self.parse_optional_attr_source()?;
        let span = start.merge(self.previous_span());
        Some(EdgeDecl {
            from,
            op,
            to,
            attrs,
            span,
        })
    }

    /// `a, b, c`
    pub(crate) fn parse_node_list(&mut self) -> Option<Vec<Ident>> {
        let mut nodes = vec![self.expect_identifier()?];
        while self.eat(&TokenKind::Comma) {
            nodes.push(self.expect_identifier()?);
        }
        Some(nodes)
    }
}
