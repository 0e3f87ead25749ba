use crate::{
    Language,
    ast::{Token, TokenKind, Trivia},
    config::ParseOptions,
    error::{Diagnostic, DiagnosticCode, Severity},
    source::{Location, Source, Span},
    state::State,
};

/// Returned by [`ParserContext::peek`] outside the text.
pub(crate) const EOF_CHAR: char = '\0';

/// Cursor over a [`Source`] shared by every sub-parser.
pub(crate) struct ParserContext<'s> {
    source: Source<'s>,
    pub(crate) language: Language,
    pub(crate) options: ParseOptions,
    pos: usize,
    token_start: usize,
    states: Vec<State>,
    diagnostics: Vec<Diagnostic<'s>>,
}

impl<'s> ParserContext<'s> {
    pub(crate) fn new(text: &'s str, language: Language, options: ParseOptions) -> Self {
        Self {
            source: Source::new(text),
            language,
            options,
            pos: 0,
            token_start: 0,
            states: vec![State::Markup],
            diagnostics: vec![],
        }
    }

    pub(crate) fn source(&self) -> &Source<'s> {
        &self.source
    }

    pub(crate) fn offset(&self) -> usize {
        self.pos
    }

    pub(crate) fn is_eof(&self) -> bool {
        self.pos >= self.source.len()
    }

    /// Unconsumed text.
    pub(crate) fn rest(&self) -> &'s str {
        &self.source.text()[self.pos..]
    }

    pub(crate) fn slice(&self, start: usize, end: usize) -> &'s str {
        &self.source.text()[start..end]
    }

    pub(crate) fn peek(&self) -> char {
        self.peek_at(0)
    }

    /// Char `n` positions ahead, or [`EOF_CHAR`] past the end.
    pub(crate) fn peek_at(&self, n: usize) -> char {
        self.rest().chars().nth(n).unwrap_or(EOF_CHAR)
    }

    /// Up to `n` chars from the cursor; shorter near the end.
    pub(crate) fn peek_multiple(&self, n: usize) -> &'s str {
        let rest = self.rest();
        let end = rest
            .char_indices()
            .nth(n)
            .map_or(rest.len(), |(i, _)| i);
        &rest[..end]
    }

    pub(crate) fn starts_with(&self, pattern: &str) -> bool {
        self.rest().starts_with(pattern)
    }

    pub(crate) fn starts_with_ignore_case(&self, pattern: &str) -> bool {
        self.rest()
            .as_bytes()
            .get(..pattern.len())
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(pattern.as_bytes()))
    }

    /// Byte offset of the next occurrence of `needle` at or after the cursor.
    pub(crate) fn find(&self, needle: &str) -> Option<usize> {
        memchr::memmem::find(self.rest().as_bytes(), needle.as_bytes()).map(|i| self.pos + i)
    }

    pub(crate) fn move_next(&mut self) {
        self.move_next_n(1);
    }

    /// Move forward `n` chars, stopping at the end.
    pub(crate) fn move_next_n(&mut self, n: usize) {
        let len = self.peek_multiple(n).len();
        self.pos += len;
    }

    /// Move backward `n` chars, stopping at the start.
    pub(crate) fn move_back(&mut self, n: usize) {
        if n == 0 {
            return;
        }
        self.pos = self.source.text()[..self.pos]
            .char_indices()
            .rev()
            .nth(n - 1)
            .map_or(0, |(i, _)| i);
    }

    /// Jump to a byte offset previously produced by this context.
    pub(crate) fn seek(&mut self, offset: usize) {
        self.pos = offset.min(self.source.len());
    }

    /// Mark the cursor as the start of the next token.
    pub(crate) fn reset(&mut self) {
        self.token_start = self.pos;
    }

    /// Location from the token start (or `start`) to the cursor.
    pub(crate) fn location(&self, start: Option<usize>) -> Location<'s> {
        self.source
            .location(start.unwrap_or(self.token_start), self.pos)
    }

    /// Consume chars while `predicate` holds and return them.
    pub(crate) fn advance_while(&mut self, predicate: impl Fn(char) -> bool) -> &'s str {
        let text = self.peek_while(predicate);
        self.pos += text.len();
        text
    }

    pub(crate) fn peek_while(&self, predicate: impl Fn(char) -> bool) -> &'s str {
        let rest = self.rest();
        let end = rest.find(|c| !predicate(c)).unwrap_or(rest.len());
        &rest[..end]
    }

    pub(crate) fn peek_until(&self, predicate: impl Fn(char) -> bool) -> &'s str {
        self.peek_while(|c| !predicate(c))
    }

    /// Consume `len` bytes as a token of `kind`.
    pub(crate) fn eat(&mut self, kind: TokenKind, len: usize) -> Token<'s> {
        let start = self.pos;
        self.pos = (start + len).min(self.source.len());
        self.token_from(kind, start)
    }

    /// Token from `start` to the cursor.
    pub(crate) fn token_from(&self, kind: TokenKind, start: usize) -> Token<'s> {
        Token::new(kind, self.slice(start, self.pos), Span::new(start, self.pos))
    }

    /// Consume whitespace as trivia.
    pub(crate) fn trivia(&mut self) -> Option<Trivia<'s>> {
        let start = self.pos;
        let text = self.advance_while(char::is_whitespace);
        (!text.is_empty()).then(|| Trivia {
            text,
            span: Span::new(start, self.pos),
        })
    }

    pub(crate) fn push_state(&mut self, state: State) {
        self.states.push(state);
    }

    pub(crate) fn pop_state(&mut self) {
        debug_assert!(self.states.len() > 1, "popped the root parser state");
        if self.states.len() > 1 {
            self.states.pop();
        }
    }

    pub(crate) fn state(&self) -> State {
        self.states.last().copied().unwrap_or(State::Markup)
    }

    pub(crate) fn add_info_diagnostic(&mut self, code: DiagnosticCode, args: &[&str]) {
        self.add_diagnostic(Severity::Info, code, args, None);
    }

    pub(crate) fn add_warning_diagnostic(&mut self, code: DiagnosticCode, args: &[&str]) {
        self.add_diagnostic(Severity::Warning, code, args, None);
    }

    pub(crate) fn add_error_diagnostic(&mut self, code: DiagnosticCode, args: &[&str]) {
        self.add_diagnostic(Severity::Error, code, args, None);
    }

    /// Record `code` at its default severity over `span`.
    pub(crate) fn report(&mut self, code: DiagnosticCode, args: &[&str], span: Span) {
        self.add_diagnostic(code.default_severity(), code, args, Some(span));
    }

    fn add_diagnostic(
        &mut self,
        severity: Severity,
        code: DiagnosticCode,
        args: &[&str],
        span: Option<Span>,
    ) {
        let location = match span {
            Some(span) => self.source.location_of(span),
            None => self.location(None),
        };
        tracing::trace!(%code, start = location.start_offset, "diagnostic");
        self.diagnostics.push(Diagnostic {
            severity,
            message: code.message(),
            args: args.iter().map(|arg| (*arg).to_owned()).collect(),
            location: Some(location),
        });
    }

    pub(crate) fn into_diagnostics(self) -> Vec<Diagnostic<'s>> {
        self.diagnostics
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(text: &str) -> ParserContext<'_> {
        ParserContext::new(text, Language::Html, ParseOptions::default())
    }

    #[test]
    fn peek_outside_bounds_is_eof() {
        let mut ctx = ctx("ab");
        assert_eq!(ctx.peek_at(1), 'b');
        assert_eq!(ctx.peek_at(2), EOF_CHAR);
        ctx.move_next_n(5);
        assert!(ctx.is_eof());
        assert_eq!(ctx.peek(), EOF_CHAR);
    }

    #[test]
    fn peek_multiple_may_be_short() {
        let ctx = ctx("é<");
        assert_eq!(ctx.peek_multiple(1), "é");
        assert_eq!(ctx.peek_multiple(9), "é<");
    }

    #[test]
    fn move_back_clamps_at_start() {
        let mut ctx = ctx("aéb");
        ctx.move_next_n(3);
        ctx.move_back(1);
        assert_eq!(ctx.peek(), 'b');
        ctx.move_back(1);
        assert_eq!(ctx.peek(), 'é');
        ctx.move_back(10);
        assert_eq!(ctx.offset(), 0);
    }

    #[test]
    fn scanning_primitives() {
        let mut ctx = ctx("div class");
        assert_eq!(ctx.peek_while(char::is_alphabetic), "div");
        assert_eq!(ctx.offset(), 0);
        assert_eq!(ctx.peek_until(|c| c == 'c'), "div ");
        ctx.reset();
        assert_eq!(ctx.advance_while(char::is_alphabetic), "div");
        assert_eq!(ctx.location(None).text, "div");
        assert_eq!(ctx.trivia().map(|trivia| trivia.text), Some(" "));
        assert_eq!(ctx.trivia(), None);
    }

    #[test]
    fn diagnostics_use_token_span() {
        let mut ctx = ctx("<div");
        ctx.move_next();
        ctx.reset();
        ctx.move_next_n(3);
        ctx.add_warning_diagnostic(DiagnosticCode::InvalidTagName, &["div"]);
        let diagnostics = ctx.into_diagnostics();
        assert_eq!(diagnostics[0].severity, Severity::Warning);
        assert_eq!(diagnostics[0].location.as_ref().map(|l| l.text), Some("div"));
        assert_eq!(diagnostics[0].text(), "'div' is not a valid tag name");
    }

    #[test]
    fn state_stack_keeps_root() {
        let mut ctx = ctx("");
        ctx.push_state(State::AttributeValue(None));
        ctx.push_state(State::AttributeValue(Some('"')));
        assert_eq!(ctx.state(), State::AttributeValue(Some('"')));
        ctx.pop_state();
        assert_eq!(ctx.state(), State::AttributeValue(None));
        ctx.pop_state();
        assert_eq!(ctx.state(), State::Markup);
    }
}
