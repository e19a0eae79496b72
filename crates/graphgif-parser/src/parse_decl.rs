//! Top-level and declaration parsing.
//!
//! Handles the program item sequence (variables, graphs, commands) with
//! ordering enforcement, plus variable declarations, graph headers and
//! `run` commands.

use graphgif_lexer::token::TokenKind;
use graphgif_types::ast::*;
use graphgif_types::ErrorCode;

use crate::parser::Parser;

/// Top-level item ordering index for E103 enforcement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum ItemOrder {
    Var = 0,
    Graph = 1,
    Command = 2,
}

impl ItemOrder {
    fn label(self) -> &'static str {
        match self {
            ItemOrder::Var => "variable declaration",
            ItemOrder::Graph => "graph declaration",
            ItemOrder::Command => "command",
        }
    }
}

impl<'src> Parser<'src> {
    // ══════════════════════════════════════════════════════════════════════════
    // Program
    // ══════════════════════════════════════════════════════════════════════════

    /// Parse a complete program: `varDecl* graphDecl* command*`.
    pub(crate) fn parse_program(&mut self) -> Option<Program> {
        let start = self.current_span();
        let mut last_order: Option<ItemOrder> = None;

        let mut vars = Vec::new();
        let mut graphs = Vec::new();
        let mut commands = Vec::new();

        while !self.at_end() {
            if self.too_many_errors() {
                break;
            }

            let current_order = match self.peek_kind() {
                TokenKind::Var => ItemOrder::Var,
                TokenKind::Directed | TokenKind::Undirected => ItemOrder::Graph,
                TokenKind::Run => ItemOrder::Command,
                other => {
                    self.error_at_current(
                        ErrorCode::UNEXPECTED_TOKEN,
                        format!(
                            "expected 'var', 'directed', 'undirected' or 'run', got '{other}'"
                        ),
                    );
                    self.advance();
                    self.synchronize();
                    continue;
                }
            };

            if let Some(prev) = last_order {
                if current_order < prev {
                    let span = self.current_span();
                    self.error_with_suggestion(
                        ErrorCode::DECLARATION_ORDER,
                        format!(
                            "{} cannot follow a {}",
                            current_order.label(),
                            prev.label()
                        ),
                        span,
                        "declare variables first, then graphs, then commands",
                    );
                }
            }
            last_order = Some(last_order.map_or(current_order, |prev| prev.max(current_order)));

            match current_order {
                ItemOrder::Var => match self.parse_var_decl() {
                    Some(decl) => {
                        vars.push(decl);
                        self.expect_semicolon("variable declaration");
                    }
                    None => self.synchronize(),
                },
                ItemOrder::Graph => match self.parse_graph_decl() {
                    Some(graph) => {
                        graphs.push(graph);
                        self.eat(&TokenKind::Semicolon);
                    }
                    None => self.synchronize(),
                },
                ItemOrder::Command => match self.parse_command() {
                    Some(command) => {
                        commands.push(command);
                        self.expect_semicolon("command");
                    }
                    None => self.synchronize(),
                },
            }
        }

        let span = start.merge(self.previous_span());
        Some(Program {
            vars,
            graphs,
            commands,
            span,
        })
    }

    // ══════════════════════════════════════════════════════════════════════════
    // Variables
    // ══════════════════════════════════════════════════════════════════════════

    /// Parse `var <type> name = value` (without the trailing `;`).
    pub(crate) fn parse_var_decl(&mut self) -> Option<VarDecl> {
        let start = self.current_span();
        self.expect(&TokenKind::Var)?;
        let var_type = match self.peek_kind() {
            TokenKind::Node => VarType::Node,
            TokenKind::Edge => VarType::Edge,
            TokenKind::Attributes => VarType::Attributes,
            other => {
                let message = format!("expected 'node', 'edge' or 'attributes', got '{other}'");
                self.error_at_current(ErrorCode::UNEXPECTED_TOKEN, message);
                return None;
            }
        };
        self.advance();
        let name = self.expect_identifier()?;
        self.expect(&TokenKind::Eq)?;
        let value = self.parse_var_value()?;
        let span = start.merge(self.previous_span());
        Some(VarDecl {
            var_type,
            name,
            value,
            span,
        })
    }

    /// `$name` | `[attrs]` | `a -> b, ...` | `a, b, ...`
    fn parse_var_value(&mut self) -> Option<VarValue> {
        match self.peek_kind() {
            TokenKind::Dollar => self.parse_var_ref().map(VarValue::Ref),
            TokenKind::LBracket => self.parse_attr_list().map(VarValue::Attrs),
            TokenKind::Identifier(_) if is_edge_op(self.look_ahead(1)) => {
                let mut edges = vec![self.parse_edge_decl()?];
                while self.eat(&TokenKind::Comma) {
                    edges.push(self.parse_edge_decl()?);
                }
                Some(VarValue::Edges(edges))
            }
            TokenKind::Identifier(_) => self.parse_node_list().map(VarValue::Nodes),
            other => {
                let message = format!(
                    "expected '$name', an attribute list, an edge list or a node list, got '{other}'"
                );
                self.error_at_current(ErrorCode::UNEXPECTED_TOKEN, message);
                None
            }
        }
    }

    // ══════════════════════════════════════════════════════════════════════════
    // Graphs
    // ══════════════════════════════════════════════════════════════════════════

    /// Parse `(directed|undirected) graph name { body }`.
    fn parse_graph_decl(&mut self) -> Option<GraphDecl> {
        let start = self.current_span();
        let direction = match self.advance().kind {
            TokenKind::Directed => Direction::Directed,
            _ => Direction::Undirected,
        };
        self.expect(&TokenKind::Graph)?;
        let name = self.expect_identifier()?;
        let open = self.expect(&TokenKind::LBrace)?.span;
        let (globals, body) = self.parse_graph_body();
        self.expect_closing(&TokenKind::RBrace, open)?;
        let span = start.merge(self.previous_span());
        Some(GraphDecl {
            direction,
            name,
            globals,
            body,
            span,
        })
    }

    // ══════════════════════════════════════════════════════════════════════════
    // Commands
    // ══════════════════════════════════════════════════════════════════════════

    /// Parse `run name with (args)` (without the trailing `;`).
    fn parse_command(&mut self) -> Option<Command> {
        let start = self.current_span();
        self.expect(&TokenKind::Run)?;
        let name = self.expect_identifier()?;
        self.expect(&TokenKind::With)?;
        let open = self.expect(&TokenKind::LParen)?.span;

        let mut args = Vec::new();
        if !self.check_exact(&TokenKind::RParen) {
            args.push(self.parse_argument()?);
            while self.eat(&TokenKind::Comma) {
                args.push(self.parse_argument()?);
            }
        }
        self.expect_closing(&TokenKind::RParen, open)?;

        let span = start.merge(self.previous_span());
        Some(Command { name, args, span })
    }
}

pub(crate) fn is_edge_op(kind: &TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::DashDash | TokenKind::Arrow | TokenKind::BackArrow
    )
}
