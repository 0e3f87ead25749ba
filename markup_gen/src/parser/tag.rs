use super::Parser;
use crate::{
    ast::*,
    error::DiagnosticCode,
    helpers::{
        is_name_stop, is_tag_name_char, is_unquoted_attr_value_char, is_void_element,
        raw_text_element,
    },
    source::Span,
    state::State,
};

impl<'s> Parser<'s> {
    /// Parse an element starting at `<name`, including its body and end tag.
    pub(super) fn parse_tag(&mut self) -> Tag<'s> {
        let start = self.parse_tag_start();
        let name = start.name.text;
        let dialect = self.ctx.language;
        let raw_text = raw_text_element(name, dialect).is_some();
        let kind = if raw_text {
            TagKind::RawText
        } else if is_void_element(name, dialect) {
            TagKind::Void
        } else {
            TagKind::Element
        };

        if start.close.is_none() || start.is_self_closing() || kind == TagKind::Void {
            return Tag {
                dialect,
                kind,
                start,
                children: vec![],
                end: None,
            };
        }

        let children = if raw_text {
            self.parse_raw_text(name).into_iter().collect()
        } else {
            self.parse_body()
        };

        let end = if self.ctx.is_eof() {
            if !raw_text {
                self.ctx.report(
                    DiagnosticCode::UnexpectedEndOfInput,
                    &[format!("'</{name}>'").as_str()],
                    start.span(),
                );
            }
            None
        } else {
            let end = self.parse_tag_end();
            if !end.name.text.eq_ignore_ascii_case(name) {
                self.ctx.report(
                    DiagnosticCode::MismatchedEndTag,
                    &[name, end.name.text],
                    end.span(),
                );
            }
            Some(end)
        };

        Tag {
            dialect,
            kind,
            start,
            children,
            end,
        }
    }

    fn parse_tag_start(&mut self) -> TagStart<'s> {
        let open = self.ctx.eat(TokenKind::Bracket, 1);
        let name = self.parse_tag_name();

        let mut attributes = vec![];
        let close = loop {
            let whitespace = self.ctx.peek_while(char::is_whitespace);
            let rest = &self.ctx.rest()[whitespace.len()..];
            if rest.is_empty() || rest.starts_with('<') {
                self.ctx.report(
                    DiagnosticCode::UnterminatedTag,
                    &[name.text],
                    open.span.to(name.span),
                );
                break None;
            }

            let leading_trivia = self.ctx.trivia();
            let close_len = if rest.starts_with('>') {
                1
            } else if rest.starts_with("/>") {
                2
            } else {
                attributes.push(self.parse_attribute(leading_trivia));
                continue;
            };
            let mut close = self.ctx.eat(TokenKind::Bracket, close_len);
            close.leading_trivia = leading_trivia;
            break Some(close);
        };

        TagStart {
            open,
            name,
            attributes,
            close,
        }
    }

    fn parse_tag_name(&mut self) -> Token<'s> {
        self.ctx.reset();
        let start = self.ctx.offset();
        let text = self.ctx.advance_while(|c| !is_name_stop(c) && c != '<');
        if text.is_empty() || !text.chars().all(is_tag_name_char) {
            self.ctx
                .add_error_diagnostic(DiagnosticCode::InvalidTagName, &[text]);
        }
        self.ctx.token_from(TokenKind::Name, start)
    }

    /// Parse `</name>`, with the `</` at the cursor.
    pub(super) fn parse_tag_end(&mut self) -> TagEnd<'s> {
        let open = self.ctx.eat(TokenKind::Bracket, 2);
        let mut name = self.parse_tag_name();
        name.trailing_trivia = self.ctx.trivia();
        let close = if self.ctx.peek() == '>' {
            Some(self.ctx.eat(TokenKind::Bracket, 1))
        } else {
            // leave the whitespace to whatever follows
            if let Some(trivia) = name.trailing_trivia.take() {
                self.ctx.move_back(trivia.text.chars().count());
            }
            self.ctx.report(
                DiagnosticCode::ExpectedBracket,
                &[">"],
                open.span.to(name.full_span()),
            );
            None
        };
        TagEnd { open, name, close }
    }

    fn parse_attribute(&mut self, leading_trivia: Option<Trivia<'s>>) -> Attribute<'s> {
        self.ctx.reset();
        let first = self.ctx.peek();
        let mut name = if is_name_stop(first) {
            // A stray quote takes the whole quoted run so the tag can continue.
            let len = match first {
                '"' | '\'' => self.ctx.rest()[1..]
                    .find([first, '>'])
                    .filter(|&i| self.ctx.rest()[1 + i..].starts_with(first))
                    .map_or(1, |i| i + 2),
                _ => first.len_utf8(),
            };
            let token = self.ctx.eat(TokenKind::Invalid, len);
            self.ctx
                .report(DiagnosticCode::InvalidName, &[token.text], token.span);
            token
        } else {
            let text = self.ctx.peek_until(|c| is_name_stop(c) || c == '<');
            self.ctx.eat(TokenKind::Name, text.len())
        };
        name.leading_trivia = leading_trivia;
        if name.kind == TokenKind::Invalid {
            return Attribute {
                name,
                equals: None,
                value: None,
            };
        }

        let whitespace = self.ctx.peek_while(char::is_whitespace);
        if self.ctx.rest()[whitespace.len()..].starts_with('=') {
            name.trailing_trivia = self.ctx.trivia();
        }

        match self.ctx.peek() {
            '=' => {
                let mut equals = self.ctx.eat(TokenKind::Equals, 1);
                let whitespace = self.ctx.peek_while(char::is_whitespace);
                let next = self.ctx.rest()[whitespace.len()..].chars().next();
                if matches!(next, None | Some('>')) {
                    self.ctx
                        .add_info_diagnostic(DiagnosticCode::EmptyAttributeValue, &[name.text]);
                    return Attribute {
                        name,
                        equals: Some(equals),
                        value: None,
                    };
                }
                equals.trailing_trivia = self.ctx.trivia();

                let value = match self.ctx.peek() {
                    quote @ ('"' | '\'') => self.parse_attribute_value(Some(quote)),
                    c @ ('`' | '=' | '<') => {
                        let offset = self.ctx.offset();
                        self.ctx.report(
                            DiagnosticCode::InvalidAttributeValue,
                            &[c.to_string().as_str()],
                            Span::new(offset, offset + c.len_utf8()),
                        );
                        self.parse_attribute_value(None)
                    }
                    _ => self.parse_attribute_value(None),
                };
                Attribute {
                    name,
                    equals: Some(equals),
                    value: Some(value),
                }
            }
            quote @ ('"' | '\'') => {
                self.ctx
                    .report(DiagnosticCode::MissingEquals, &[name.text], name.span);
                Attribute {
                    name,
                    equals: None,
                    value: Some(self.parse_attribute_value(Some(quote))),
                }
            }
            _ => Attribute {
                name,
                equals: None,
                value: None,
            },
        }
    }

    /// Quoted or unquoted value whose parts may embed code expressions.
    fn parse_attribute_value(&mut self, quote: Option<char>) -> AttributeValue<'s> {
        let open_quote = quote.map(|_| self.ctx.eat(TokenKind::Quote, 1));
        self.ctx.push_state(State::AttributeValue(quote));

        let mut parts = vec![];
        while !self.ctx.is_eof() {
            let c = self.ctx.peek();
            let ends_value = match quote {
                Some(quote) => c == quote,
                None => !parts.is_empty() && c != '@' && !is_unquoted_attr_value_char(c),
            };
            if ends_value {
                break;
            }
            parts.push(if c == '@' && self.ctx.peek_at(1) != '@' {
                self.parse_code()
            } else {
                self.parse_literal()
            });
        }
        self.ctx.pop_state();

        let close_quote = match quote {
            Some(quote) if self.ctx.peek() == quote => Some(self.ctx.eat(TokenKind::Quote, 1)),
            Some(quote) => {
                let start = open_quote.as_ref().map_or(self.ctx.offset(), |q| q.span.start);
                self.ctx.report(
                    DiagnosticCode::UnterminatedAttributeValue,
                    &[quote.to_string().as_str()],
                    Span::new(start, self.ctx.offset()),
                );
                None
            }
            None => None,
        };

        AttributeValue {
            open_quote,
            parts,
            close_quote,
        }
    }
}
