//! Recursive-descent parser producing the lossless tree in [`crate::ast`].
//!
//! There is no separate tokenizer: every sub-parser reads the source
//! through a shared [`ParserContext`] and never fails. Malformed input is
//! recorded as a diagnostic and parsing carries on with the best node it
//! can build.

mod code;
mod raw;
mod tag;

use crate::{
    ParseResult,
    ast::*,
    config::ParseOptions,
    ctx::ParserContext,
    error::{DiagnosticCode, UnsupportedLanguageError},
    helpers::{self, is_unquoted_attr_value_char},
    source::Span,
    state::State,
};
use std::{fmt, str::FromStr};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Language {
    /// HTML with void elements and `<script>`/`<style>` raw text.
    Html,
    /// XML-like markup: every element needs an end tag or `/>`.
    Xml,
}

impl FromStr for Language {
    type Err = UnsupportedLanguageError;

    fn from_str(key: &str) -> Result<Self, Self::Err> {
        match key.to_ascii_lowercase().as_str() {
            "html" | "htm" | "cshtml" => Ok(Language::Html),
            "xml" | "svg" => Ok(Language::Xml),
            _ => Err(UnsupportedLanguageError { key: key.into() }),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Language::Html => "html",
            Language::Xml => "xml",
        })
    }
}

pub struct Parser<'s> {
    ctx: ParserContext<'s>,
}

impl<'s> Parser<'s> {
    pub fn new(source: &'s str, language: Language, options: ParseOptions) -> Self {
        Self {
            ctx: ParserContext::new(source, language, options),
        }
    }

    /// Parse the whole input. The last child is always [`Node::Eof`].
    pub fn parse_root(mut self) -> ParseResult<'s> {
        let mut children = vec![];
        while !self.ctx.is_eof() {
            children.push(self.parse_node());
        }
        debug_assert_eq!(self.ctx.state(), State::Markup);
        children.push(Node::Eof(Span::empty(self.ctx.source().len())));

        ParseResult {
            root: Root { children },
            diagnostics: self.ctx.into_diagnostics(),
        }
    }

    /// Dispatch on the current char. Always consumes at least one char.
    fn parse_node(&mut self) -> Node<'s> {
        let c = self.ctx.peek();
        tracing::trace!(offset = self.ctx.offset(), ?c, "parse node");
        match c {
            '@' if self.ctx.peek_at(1) == '@' => self.parse_literal(),
            '@' => self.parse_code(),
            '<' => self.parse_angle(),
            '/' if self.ctx.options.line_comments
                && matches!(self.ctx.peek_at(1), '/' | '*') =>
            {
                Node::Comment(self.parse_slash_comment())
            }
            _ => self.parse_literal(),
        }
    }

    fn parse_angle(&mut self) -> Node<'s> {
        let next = self.ctx.peek_at(1);
        if self.ctx.starts_with("<!--") {
            Node::Comment(self.parse_html_comment())
        } else if self.ctx.starts_with_ignore_case(raw::CDATA_START) {
            Node::CData(self.parse_cdata())
        } else if next == '/' {
            let tag_end = self.parse_tag_end();
            self.ctx.report(
                DiagnosticCode::UnexpectedEndTag,
                &[tag_end.name.text],
                tag_end.span(),
            );
            Node::EndTag(tag_end)
        } else if next == '!' || (next == '?' && self.ctx.language == Language::Xml) {
            Node::Declaration(self.parse_declaration())
        } else if helpers::is_tag_name_start(next) {
            Node::Tag(self.parse_tag())
        } else {
            self.parse_literal()
        }
    }

    /// Parse nodes until end of input or an end tag.
    fn parse_body(&mut self) -> Vec<Node<'s>> {
        let mut children = vec![];
        while !self.ctx.is_eof() && !self.ctx.starts_with("</") {
            children.push(self.parse_node());
        }
        children
    }

    /// Text up to the next `<`, unescaped `@`, or the end of the
    /// enclosing attribute value. `@@` stays part of the literal.
    fn parse_literal(&mut self) -> Node<'s> {
        let start = self.ctx.offset();
        if self.ctx.starts_with("@@") {
            self.ctx.move_next_n(2);
        } else {
            self.ctx.move_next();
        }

        loop {
            let rest = self.ctx.rest();
            let stop = match self.ctx.state() {
                State::AttributeValue(Some(quote)) => rest.find(['@', quote]),
                State::AttributeValue(None) => {
                    rest.find(|c| c == '@' || !is_unquoted_attr_value_char(c))
                }
                State::Markup => memchr::memchr2(b'<', b'@', rest.as_bytes()),
            };
            self.ctx.seek(self.ctx.offset() + stop.unwrap_or(rest.len()));
            if self.ctx.starts_with("@@") {
                self.ctx.move_next_n(2);
            } else {
                break;
            }
        }

        Node::Literal(Literal {
            kind: LiteralKind::Text,
            token: self.ctx.token_from(TokenKind::Text, start),
        })
    }
}
