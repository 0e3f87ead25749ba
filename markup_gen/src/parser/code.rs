use super::Parser;
use crate::{
    ast::*,
    error::DiagnosticCode,
    helpers::{QuoteState, is_identifier_char, is_identifier_start, is_markup_start, line_len},
};

impl<'s> Parser<'s> {
    /// Parse whatever follows `@`: a block, an explicit or an inline expression.
    pub(super) fn parse_code(&mut self) -> Node<'s> {
        match self.ctx.peek_at(1) {
            '{' => Node::CodeBlock(self.parse_code_block()),
            '(' => Node::CodeExpression(self.parse_explicit_expression()),
            _ => Node::CodeExpression(self.parse_inline_expression()),
        }
    }

    fn parse_transition(&mut self) -> Token<'s> {
        debug_assert_eq!(self.ctx.peek(), '@');
        self.ctx.reset();
        self.ctx.eat(TokenKind::Transition, 1)
    }

    /// `@name`, `@user.name`, `@items[0].title()`
    fn parse_inline_expression(&mut self) -> CodeExpression<'s> {
        let transition = self.parse_transition();
        let len = inline_expression_len(self.ctx.rest(), self.ctx.options.inline_invocations);
        let value = self.ctx.eat(TokenKind::Code, len);
        if value.text.is_empty() {
            self.ctx.report(
                DiagnosticCode::ExpectedExpression,
                &[],
                transition.span.to(value.span),
            );
        }

        CodeExpression {
            transition,
            open_paren: None,
            value,
            close_paren: None,
        }
    }

    /// `@( expr )`
    fn parse_explicit_expression(&mut self) -> CodeExpression<'s> {
        let transition = self.parse_transition();
        let rest = self.ctx.rest();
        let Some(len) = balanced_len(rest) else {
            let open_paren = self.ctx.eat(TokenKind::Paren, 1);
            let value = self.ctx.eat(TokenKind::Code, self.ctx.rest().len());
            self.ctx.report(
                DiagnosticCode::UnterminatedExpression,
                &[],
                transition.span.to(value.span),
            );
            return CodeExpression {
                transition,
                open_paren: Some(open_paren),
                value,
                close_paren: None,
            };
        };

        let open_paren = self.ctx.eat(TokenKind::Paren, 1);
        let value = self.ctx.eat(TokenKind::Code, len - 2);
        let close_paren = self.ctx.eat(TokenKind::Paren, 1);
        if value.text.trim().is_empty() {
            self.ctx.report(
                DiagnosticCode::ExpectedExpression,
                &[],
                transition.span.to(close_paren.span),
            );
        }
        CodeExpression {
            transition,
            open_paren: Some(open_paren),
            value,
            close_paren: Some(close_paren),
        }
    }

    /// `@{ ... }` with markup allowed wherever a tag can start.
    fn parse_code_block(&mut self) -> CodeBlock<'s> {
        let transition = self.parse_transition();
        let open_brace = self.ctx.eat(TokenKind::Brace, 1);
        if self.ctx.options.warn_missing_whitespace_after_transition
            && !self.ctx.peek().is_whitespace()
            && self.ctx.peek() != '}'
        {
            self.ctx.add_warning_diagnostic(
                DiagnosticCode::MissingWhitespaceAfterTransition,
                &["@{"],
            );
        }

        let mut children = vec![];
        let mut segment_start = self.ctx.offset();
        let mut quote = QuoteState::None;
        let mut depth = 0usize;
        let close_brace = loop {
            let c = self.ctx.peek();
            if self.ctx.is_eof() {
                break None;
            }
            match c {
                '\\' => self.ctx.move_next_n(2),
                '\'' | '"' | '`' => {
                    quote.step(c);
                    self.ctx.move_next();
                }
                _ if quote.is_quoted() => self.ctx.move_next(),
                '/' if self.ctx.peek_at(1) == '/' => {
                    let end = self.ctx.offset() + line_len(self.ctx.rest());
                    self.ctx.seek(end);
                }
                '/' if self.ctx.peek_at(1) == '*' => {
                    let end = self
                        .ctx
                        .find("*/")
                        .map_or(self.ctx.source().len(), |i| i + 2);
                    self.ctx.seek(end);
                }
                '{' => {
                    depth += 1;
                    self.ctx.move_next();
                }
                '}' if depth > 0 => {
                    depth -= 1;
                    self.ctx.move_next();
                }
                '}' => {
                    self.flush_code(&mut children, segment_start);
                    break Some(self.ctx.eat(TokenKind::Brace, 1));
                }
                '<' if is_markup_start(self.ctx.rest()) => {
                    self.flush_code(&mut children, segment_start);
                    children.push(CodeChild::Tag(self.parse_tag()));
                    segment_start = self.ctx.offset();
                }
                _ => self.ctx.move_next(),
            }
        };

        if close_brace.is_none() {
            self.flush_code(&mut children, segment_start);
            let span = transition.span.to(open_brace.span);
            if quote.is_quoted() {
                self.ctx.report(
                    DiagnosticCode::MalformedCodeBlock,
                    &["unterminated string literal"],
                    span,
                );
            } else {
                self.ctx
                    .report(DiagnosticCode::UnexpectedEndOfInput, &["'}'"], span);
            }
        }

        CodeBlock {
            transition,
            open_brace,
            children,
            close_brace,
        }
    }

    fn flush_code(&mut self, children: &mut Vec<CodeChild<'s>>, start: usize) {
        if self.ctx.offset() > start {
            children.push(CodeChild::Code(self.ctx.token_from(TokenKind::Code, start)));
        }
    }
}

/// Byte length of an identifier chain at the start of `text`.
///
/// With `invocations`, balanced `(...)` and `[...]` suffixes are included.
fn inline_expression_len(text: &str, invocations: bool) -> usize {
    let mut end = 0;
    loop {
        let rest = &text[end..];
        let ident = if end == 0 {
            identifier_len(rest)
        } else if let Some(member) = rest.strip_prefix('.') {
            identifier_len(member).map(|len| len + 1)
        } else if invocations && rest.starts_with(['(', '[']) {
            balanced_len(rest)
        } else {
            None
        };
        match ident {
            Some(len) if len > 0 => end += len,
            _ => return end,
        }
    }
}

fn identifier_len(text: &str) -> Option<usize> {
    if !text.starts_with(is_identifier_start) {
        return None;
    }
    Some(
        text.find(|c: char| !is_identifier_char(c))
            .unwrap_or(text.len()),
    )
}

/// Length of the bracketed group opening at the start of `text`,
/// including both delimiters. Quotes and backslash escapes are honored.
pub(crate) fn balanced_len(text: &str) -> Option<usize> {
    let mut stack = vec![];
    let mut quote = QuoteState::None;
    let mut chars = text.char_indices();
    while let Some((i, c)) = chars.next() {
        if quote.is_quoted() {
            if c == '\\' {
                chars.next();
            } else {
                quote.step(c);
            }
            continue;
        }
        match c {
            '(' => stack.push(')'),
            '[' => stack.push(']'),
            '{' => stack.push('}'),
            ')' | ']' | '}' => {
                if stack.pop() != Some(c) {
                    return None;
                }
                if stack.is_empty() {
                    return Some(i + 1);
                }
            }
            _ if stack.is_empty() => return None,
            _ => {
                quote.step(c);
            }
        }
    }
    None
}
