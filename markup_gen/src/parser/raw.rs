use super::Parser;
use crate::{ast::*, error::DiagnosticCode, helpers::line_len, source::Span};
use memchr::memmem;

pub(super) const CDATA_START: &str = "<![CDATA[";

impl<'s> Parser<'s> {
    /// Body of a raw-text element up to its end tag, taken verbatim.
    pub(super) fn parse_raw_text(&mut self, name: &str) -> Option<Node<'s>> {
        let start = self.ctx.offset();
        match find_raw_text_end(self.ctx.rest(), name) {
            Some(len) => self.ctx.seek(start + len),
            None => {
                self.ctx.seek(self.ctx.source().len());
                self.ctx.report(
                    DiagnosticCode::MissingRawTextEndTag,
                    &[name],
                    Span::new(start, self.ctx.offset()),
                );
            }
        }
        (self.ctx.offset() > start).then(|| {
            Node::Literal(Literal {
                kind: LiteralKind::RawText,
                token: self.ctx.token_from(TokenKind::Text, start),
            })
        })
    }

    pub(super) fn parse_html_comment(&mut self) -> Comment<'s> {
        let start = self.ctx.offset();
        if let Some(malformed) = ["<!-->", "<!--->"]
            .into_iter()
            .find(|malformed| self.ctx.starts_with(malformed))
        {
            self.ctx.move_next_n(malformed.len());
            let token = self.ctx.token_from(TokenKind::Text, start);
            self.ctx
                .report(DiagnosticCode::MalformedComment, &[malformed], token.span);
            return Comment {
                kind: CommentKind::Html,
                token,
            };
        }

        self.ctx.move_next_n(4);
        self.consume_comment_until("-->", start);
        Comment {
            kind: CommentKind::Html,
            token: self.ctx.token_from(TokenKind::Text, start),
        }
    }

    /// `// ...` or `/* ... */`, with the `/` at the cursor.
    pub(super) fn parse_slash_comment(&mut self) -> Comment<'s> {
        let start = self.ctx.offset();
        if self.ctx.starts_with("//") {
            self.ctx.seek(start + line_len(self.ctx.rest()));
            Comment {
                kind: CommentKind::Line,
                token: self.ctx.token_from(TokenKind::Text, start),
            }
        } else {
            self.ctx.move_next_n(2);
            self.consume_comment_until("*/", start);
            Comment {
                kind: CommentKind::Block,
                token: self.ctx.token_from(TokenKind::Text, start),
            }
        }
    }

    /// Unterminated comments run to the end of input and are only
    /// reported with `strict_comments`.
    fn consume_comment_until(&mut self, terminator: &str, start: usize) {
        match self.ctx.find(terminator) {
            Some(end) => self.ctx.seek(end + terminator.len()),
            None => {
                self.ctx.seek(self.ctx.source().len());
                if self.ctx.options.strict_comments {
                    self.ctx.report(
                        DiagnosticCode::UnterminatedComment,
                        &[terminator],
                        Span::new(start, self.ctx.offset()),
                    );
                }
            }
        }
    }

    pub(super) fn parse_cdata(&mut self) -> CData<'s> {
        let start = self.ctx.eat(TokenKind::Bracket, CDATA_START.len());
        let content_start = self.ctx.offset();
        let end = self.ctx.find("]]>");
        let source_len = self.ctx.source().len();
        self.ctx.seek(end.unwrap_or(source_len));
        let content = self.ctx.token_from(TokenKind::Text, content_start);
        let end = match end {
            Some(_) => Some(self.ctx.eat(TokenKind::Bracket, 3)),
            None => {
                self.ctx.report(
                    DiagnosticCode::UnterminatedCData,
                    &[],
                    start.span.to(content.span),
                );
                None
            }
        };
        CData {
            start,
            content,
            end,
        }
    }

    /// `<!DOCTYPE html>`, `<!ENTITY ...>` or `<?xml ...?>`
    pub(super) fn parse_declaration(&mut self) -> Declaration<'s> {
        let start = self.ctx.offset();
        let terminator = if self.ctx.starts_with("<?") { "?>" } else { ">" };
        match self.ctx.find(terminator) {
            Some(end) => self.ctx.seek(end + terminator.len()),
            None => {
                self.ctx.seek(self.ctx.source().len());
                self.ctx.report(
                    DiagnosticCode::InvalidTagFormat,
                    &["unterminated declaration"],
                    Span::new(start, self.ctx.offset()),
                );
            }
        }
        Declaration {
            token: self.ctx.token_from(TokenKind::Text, start),
        }
    }
}

/// Offset of the first `</name` followed by whitespace, `>`, `/` or the end.
fn find_raw_text_end(text: &str, name: &str) -> Option<usize> {
    let bytes = text.as_bytes();
    memmem::find_iter(bytes, b"</").find(|&i| {
        let after = &bytes[i + 2..];
        after
            .get(..name.len())
            .is_some_and(|candidate| candidate.eq_ignore_ascii_case(name.as_bytes()))
            && after
                .get(name.len())
                .is_none_or(|&b| b.is_ascii_whitespace() || b == b'>' || b == b'/')
    })
}
