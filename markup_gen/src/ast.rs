//! Lossless syntax tree.
//!
//! Every byte of the input belongs to exactly one token or trivia,
//! so writing the tree back with [`SourceText`] reproduces the input.

use crate::{Language, source::Span};
use std::borrow::Cow;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// Whitespace that the grammar skips but the tree keeps.
pub struct Trivia<'s> {
    pub text: &'s str,
    pub span: Span,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenKind {
    /// `<`, `</`, `>`, `/>`
    Bracket,
    Name,
    Equals,
    Quote,
    /// `@`
    Transition,
    Brace,
    Paren,
    Code,
    Text,
    /// Characters kept only so the tree stays lossless.
    Invalid,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token<'s> {
    pub kind: TokenKind,
    pub text: &'s str,
    pub span: Span,
    pub leading_trivia: Option<Trivia<'s>>,
    pub trailing_trivia: Option<Trivia<'s>>,
}

impl<'s> Token<'s> {
    pub fn new(kind: TokenKind, text: &'s str, span: Span) -> Self {
        Self {
            kind,
            text,
            span,
            leading_trivia: None,
            trailing_trivia: None,
        }
    }

    /// Span including the attached trivia.
    pub fn full_span(&self) -> Span {
        let start = self.leading_trivia.map_or(self.span, |trivia| trivia.span);
        let end = self.trailing_trivia.map_or(self.span, |trivia| trivia.span);
        start.to(end)
    }
}

pub trait HasTrivia<'s> {
    fn leading_trivia(&self) -> Option<&Trivia<'s>>;
    fn trailing_trivia(&self) -> Option<&Trivia<'s>>;
}

impl<'s> HasTrivia<'s> for Token<'s> {
    fn leading_trivia(&self) -> Option<&Trivia<'s>> {
        self.leading_trivia.as_ref()
    }

    fn trailing_trivia(&self) -> Option<&Trivia<'s>> {
        self.trailing_trivia.as_ref()
    }
}

impl<'s> HasTrivia<'s> for Attribute<'s> {
    fn leading_trivia(&self) -> Option<&Trivia<'s>> {
        self.name.leading_trivia.as_ref()
    }

    fn trailing_trivia(&self) -> Option<&Trivia<'s>> {
        match (&self.equals, &self.value) {
            (_, Some(AttributeValue { close_quote: Some(quote), .. })) => {
                quote.trailing_trivia.as_ref()
            }
            (Some(equals), None) => equals.trailing_trivia.as_ref(),
            _ => self.name.trailing_trivia.as_ref(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LiteralKind {
    /// Markup text; `@@` stands for a single `@`.
    Text,
    /// Body of `<script>`/`<style>`, taken verbatim.
    RawText,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Literal<'s> {
    pub kind: LiteralKind,
    pub token: Token<'s>,
}

impl<'s> Literal<'s> {
    /// Text with `@@` escapes decoded.
    pub fn value(&self) -> Cow<'s, str> {
        match self.kind {
            LiteralKind::Text if self.token.text.contains("@@") => {
                Cow::from(self.token.text.replace("@@", "@"))
            }
            _ => Cow::from(self.token.text),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CommentKind {
    /// `// ...` up to and including the line break
    Line,
    /// `/* ... */`
    Block,
    /// `<!-- ... -->`
    Html,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Comment<'s> {
    pub kind: CommentKind,
    /// Whole comment including delimiters.
    pub token: Token<'s>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CData<'s> {
    /// `<![CDATA[`
    pub start: Token<'s>,
    pub content: Token<'s>,
    /// `]]>`; missing when the section runs to end of input.
    pub end: Option<Token<'s>>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
/// `<!DOCTYPE ...>`, `<!...>` or `<?...?>`, kept verbatim.
pub struct Declaration<'s> {
    pub token: Token<'s>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TagKind {
    Element,
    /// Never has a body or end tag.
    Void,
    /// Body is a single raw-text literal.
    RawText,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tag<'s> {
    pub dialect: Language,
    pub kind: TagKind,
    pub start: TagStart<'s>,
    pub children: Vec<Node<'s>>,
    pub end: Option<TagEnd<'s>>,
}

impl<'s> Tag<'s> {
    pub fn name(&self) -> &'s str {
        self.start.name.text
    }

    pub fn is_self_closing(&self) -> bool {
        self.start.is_self_closing()
    }

    pub fn span(&self) -> Span {
        let start = self.start.open.span;
        let end = match (&self.end, self.children.last()) {
            (Some(end), _) => end.span(),
            (None, Some(child)) => child.span(),
            (None, None) => self.start.span(),
        };
        start.to(end)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TagStart<'s> {
    /// `<`
    pub open: Token<'s>,
    pub name: Token<'s>,
    pub attributes: Vec<Attribute<'s>>,
    /// `>` or `/>`, with any whitespace before it as leading trivia.
    pub close: Option<Token<'s>>,
}

impl TagStart<'_> {
    pub fn is_self_closing(&self) -> bool {
        self.close.as_ref().is_some_and(|close| close.text == "/>")
    }

    pub fn span(&self) -> Span {
        let end = self
            .close
            .as_ref()
            .map(Token::full_span)
            .or_else(|| self.attributes.last().map(Attribute::span))
            .unwrap_or_else(|| self.name.full_span());
        self.open.span.to(end)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TagEnd<'s> {
    /// `</`
    pub open: Token<'s>,
    /// May be empty; whitespace after it is trailing trivia.
    pub name: Token<'s>,
    /// `>`
    pub close: Option<Token<'s>>,
}

impl TagEnd<'_> {
    pub fn span(&self) -> Span {
        let end = self
            .close
            .as_ref()
            .map_or_else(|| self.name.full_span(), Token::full_span);
        self.open.span.to(end)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attribute<'s> {
    /// Whitespace separating it from the previous item is leading trivia.
    pub name: Token<'s>,
    pub equals: Option<Token<'s>>,
    pub value: Option<AttributeValue<'s>>,
}

impl<'s> Attribute<'s> {
    /// Whether the attribute is written without `=`, like `disabled`.
    pub fn is_boolean(&self) -> bool {
        self.equals.is_none() && self.value.is_none()
    }

    pub fn span(&self) -> Span {
        let end = match (&self.equals, &self.value) {
            (_, Some(value)) => value.span(),
            (Some(equals), None) => equals.full_span(),
            (None, None) => self.name.full_span(),
        };
        self.name.full_span().to(end)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttributeValue<'s> {
    pub open_quote: Option<Token<'s>>,
    /// [`Node::Literal`] and [`Node::CodeExpression`] segments.
    pub parts: Vec<Node<'s>>,
    pub close_quote: Option<Token<'s>>,
}

impl AttributeValue<'_> {
    pub fn quote(&self) -> Option<char> {
        self.open_quote
            .as_ref()
            .and_then(|quote| quote.text.chars().next())
    }

    pub fn span(&self) -> Span {
        let spans = self
            .open_quote
            .iter()
            .map(Token::full_span)
            .chain(self.parts.iter().map(Node::span))
            .chain(self.close_quote.iter().map(Token::full_span));
        spans
            .reduce(Span::to)
            .unwrap_or_else(|| Span::empty(0))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CodeBlock<'s> {
    /// `@`
    pub transition: Token<'s>,
    /// `{`
    pub open_brace: Token<'s>,
    pub children: Vec<CodeChild<'s>>,
    /// `}`; missing when the block runs to end of input.
    pub close_brace: Option<Token<'s>>,
}

impl CodeBlock<'_> {
    pub fn span(&self) -> Span {
        let end = self
            .close_brace
            .as_ref()
            .map(|brace| brace.span)
            .or_else(|| self.children.last().map(CodeChild::span))
            .unwrap_or(self.open_brace.span);
        self.transition.span.to(end)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CodeChild<'s> {
    /// Raw code, kept as written.
    Code(Token<'s>),
    /// Markup found while scanning code.
    Tag(Tag<'s>),
}

impl CodeChild<'_> {
    pub fn span(&self) -> Span {
        match self {
            CodeChild::Code(token) => token.span,
            CodeChild::Tag(tag) => tag.span(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
/// `@name.chain` or `@( expr )`.
pub struct CodeExpression<'s> {
    pub transition: Token<'s>,
    pub open_paren: Option<Token<'s>>,
    /// May be empty if nothing usable followed `@`.
    pub value: Token<'s>,
    pub close_paren: Option<Token<'s>>,
}

impl<'s> CodeExpression<'s> {
    pub fn is_explicit(&self) -> bool {
        self.open_paren.is_some()
    }

    /// Expression text without surrounding whitespace.
    pub fn expr(&self) -> &'s str {
        self.value.text.trim()
    }

    pub fn span(&self) -> Span {
        let end = self
            .close_paren
            .as_ref()
            .map_or(self.value.span, |paren| paren.span);
        self.transition.span.to(end)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Node<'s> {
    Literal(Literal<'s>),
    Comment(Comment<'s>),
    CData(CData<'s>),
    Declaration(Declaration<'s>),
    Tag(Tag<'s>),
    /// End tag with no open element to close.
    EndTag(TagEnd<'s>),
    CodeBlock(CodeBlock<'s>),
    CodeExpression(CodeExpression<'s>),
    Eof(Span),
}

impl Node<'_> {
    pub fn span(&self) -> Span {
        match self {
            Node::Literal(literal) => literal.token.span,
            Node::Comment(comment) => comment.token.span,
            Node::CData(cdata) => {
                let end = cdata.end.as_ref().unwrap_or(&cdata.content);
                cdata.start.span.to(end.span)
            }
            Node::Declaration(declaration) => declaration.token.span,
            Node::Tag(tag) => tag.span(),
            Node::EndTag(tag_end) => tag_end.span(),
            Node::CodeBlock(block) => block.span(),
            Node::CodeExpression(expr) => expr.span(),
            Node::Eof(span) => *span,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Root<'s> {
    /// Always ends with [`Node::Eof`].
    pub children: Vec<Node<'s>>,
}

/// Writes a node back as the exact text it was parsed from.
pub trait SourceText {
    fn write_source(&self, out: &mut String);

    fn source_text(&self) -> String {
        let mut out = String::new();
        self.write_source(&mut out);
        out
    }
}

impl SourceText for Trivia<'_> {
    fn write_source(&self, out: &mut String) {
        out.push_str(self.text);
    }
}

impl SourceText for Token<'_> {
    fn write_source(&self, out: &mut String) {
        self.leading_trivia.write_source(out);
        out.push_str(self.text);
        self.trailing_trivia.write_source(out);
    }
}

impl<T: SourceText> SourceText for Option<T> {
    fn write_source(&self, out: &mut String) {
        if let Some(inner) = self {
            inner.write_source(out);
        }
    }
}

impl<T: SourceText> SourceText for [T] {
    fn write_source(&self, out: &mut String) {
        self.iter().for_each(|item| item.write_source(out));
    }
}

impl SourceText for Attribute<'_> {
    fn write_source(&self, out: &mut String) {
        self.name.write_source(out);
        self.equals.write_source(out);
        self.value.write_source(out);
    }
}

impl SourceText for AttributeValue<'_> {
    fn write_source(&self, out: &mut String) {
        self.open_quote.write_source(out);
        self.parts.write_source(out);
        self.close_quote.write_source(out);
    }
}

impl SourceText for TagStart<'_> {
    fn write_source(&self, out: &mut String) {
        self.open.write_source(out);
        self.name.write_source(out);
        self.attributes.write_source(out);
        self.close.write_source(out);
    }
}

impl SourceText for TagEnd<'_> {
    fn write_source(&self, out: &mut String) {
        self.open.write_source(out);
        self.name.write_source(out);
        self.close.write_source(out);
    }
}

impl SourceText for Tag<'_> {
    fn write_source(&self, out: &mut String) {
        self.start.write_source(out);
        self.children.write_source(out);
        self.end.write_source(out);
    }
}

impl SourceText for CodeChild<'_> {
    fn write_source(&self, out: &mut String) {
        match self {
            CodeChild::Code(token) => token.write_source(out),
            CodeChild::Tag(tag) => tag.write_source(out),
        }
    }
}

impl SourceText for CodeBlock<'_> {
    fn write_source(&self, out: &mut String) {
        self.transition.write_source(out);
        self.open_brace.write_source(out);
        self.children.write_source(out);
        self.close_brace.write_source(out);
    }
}

impl SourceText for CodeExpression<'_> {
    fn write_source(&self, out: &mut String) {
        self.transition.write_source(out);
        self.open_paren.write_source(out);
        self.value.write_source(out);
        self.close_paren.write_source(out);
    }
}

impl SourceText for CData<'_> {
    fn write_source(&self, out: &mut String) {
        self.start.write_source(out);
        self.content.write_source(out);
        self.end.write_source(out);
    }
}

impl SourceText for Node<'_> {
    fn write_source(&self, out: &mut String) {
        match self {
            Node::Literal(literal) => literal.token.write_source(out),
            Node::Comment(comment) => comment.token.write_source(out),
            Node::CData(cdata) => cdata.write_source(out),
            Node::Declaration(declaration) => declaration.token.write_source(out),
            Node::Tag(tag) => tag.write_source(out),
            Node::EndTag(tag_end) => tag_end.write_source(out),
            Node::CodeBlock(block) => block.write_source(out),
            Node::CodeExpression(expr) => expr.write_source(out),
            Node::Eof(_) => {}
        }
    }
}

impl SourceText for Root<'_> {
    fn write_source(&self, out: &mut String) {
        self.children.write_source(out);
    }
}
