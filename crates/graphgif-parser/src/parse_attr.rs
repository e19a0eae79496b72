//! Attribute lists, scalar values, variable references, command
//! arguments and dotted paths.

use crate::parser::Parser;
use graphgif_lexer::token::TokenKind;
use graphgif_types::ast::*;
use graphgif_types::ErrorCode;

impl<'src> Parser<'src> {
    /// `$name`. The returned ident spans the `$` too.
    pub(crate) fn parse_var_ref(&mut self) -> Option<Ident> {
        let dollar = self.expect(&TokenKind::Dollar)?.span;
        let name = self.expect_identifier()?;
        Some(Ident::new(name.name, dollar.merge(name.span)))
    }

    /// An optional `[..]` or `$name`. The outer `None` means a parse error
    /// was reported.
    pub(crate) fn parse_optional_attr_source(&mut self) -> Option<Option<AttrSource>> {
        match self.peek_kind() {
            TokenKind::LBracket => self.parse_attr_list().map(|l| Some(AttrSource::List(l))),
            TokenKind::Dollar => self.parse_var_ref().map(|r| Some(AttrSource::Ref(r))),
            _ => Some(None),
        }
    }

    /// `[ key (=|:) value (, key (=|:) value)* ,? ]`
    pub(crate) fn parse_attr_list(&mut self) -> Option<AttrList> {
        let open = self.expect(&TokenKind::LBracket)?.span;
        if self.check_exact(&TokenKind::RBracket) {
            self.error_at_current(
                ErrorCode::UNEXPECTED_TOKEN,
                "attribute list must contain at least one attribute",
            );
            self.advance();
            return None;
        }

        let mut attrs = vec![self.parse_attribute()?];
        while self.eat(&TokenKind::Comma) {
            if self.check_exact(&TokenKind::RBracket) {
                break;
            }
            attrs.push(self.parse_attribute()?);
        }
        self.expect_closing(&TokenKind::RBracket, open)?;

        let span = open.merge(self.previous_span());
        Some(AttrList { attrs, span })
    }

    fn parse_attribute(&mut self) -> Option<Attribute> {
        let key = self.expect_name()?;
        let op = self.parse_attr_op()?;
        let value = self.parse_value()?;
        let span = key.span.merge(self.previous_span());
        Some(Attribute {
            key,
            op,
            value,
            span,
        })
    }

    fn parse_attr_op(&mut self) -> Option<AttrOp> {
        let op = match self.peek_kind() {
            TokenKind::Eq => AttrOp::Assign,
            TokenKind::Colon => AttrOp::Typed,
            other => {
                let message = format!("expected '=' or ':', got '{other}'");
                self.error_at_current(ErrorCode::UNEXPECTED_TOKEN, message);
                return None;
            }
        };
        self.advance();
        Some(op)
    }

    /// `ID | NUMBER | STRING`. Keywords are accepted as identifier values.
    fn parse_value(&mut self) -> Option<AttrValue> {
        let kind = self.peek_kind().clone();
        let value = match kind {
            TokenKind::Identifier(name) => AttrValue::Identifier(name),
            TokenKind::Number(n) => AttrValue::Number(n),
            TokenKind::Str(s) => AttrValue::String(s),
            ref kw if kw.is_keyword() => AttrValue::Identifier(kw.to_string()),
            other => {
                self.error_at_current(
                    ErrorCode::UNEXPECTED_TOKEN,
                    format!("expected identifier, number or string, got '{other}'"),
                );
                return None;
            }
        };
        self.advance();
        Some(value)
    }

    // ══════════════════════════════════════════════════════════════════════════
    // Command arguments
    // ══════════════════════════════════════════════════════════════════════════

    /// `key (=|:) path` or `key (=|:) literal`
    pub(crate) fn parse_argument(&mut self) -> Option<Argument> {
        let key = self.expect_name()?;
        let op = self.parse_attr_op()?;
        let value = match self.peek_kind() {
            TokenKind::Identifier(_) => ArgValue::Path(self.parse_path()?),
            _ => ArgValue::Literal(self.parse_value()?),
        };
        let span = key.span.merge(self.previous_span());
        Some(Argument {
            key,
            op,
            value,
            span,
        })
    }

    /// `ID ('.' ID)*`
    fn parse_path(&mut self) -> Option<Path> {
        let first = self.expect_identifier()?;
        let start = first.span;
        let mut segments = vec![first];
        while self.eat(&TokenKind::Dot) {
            segments.push(self.expect_name()?);
        }
        let span = start.merge(self.previous_span());
        Some(Path { segments, span })
    }
}
