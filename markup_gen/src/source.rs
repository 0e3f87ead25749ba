//! Source text with a precomputed line index.

use std::ops::Range;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
/// Half-open byte range `[start, end)` in the source text.
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end);
        Self { start, end }
    }

    pub fn empty(at: usize) -> Self {
        Self { start: at, end: at }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Smallest span covering both.
    pub fn to(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

impl From<Range<usize>> for Span {
    fn from(range: Range<usize>) -> Self {
        Span::new(range.start, range.end)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// One line of the source, including its terminator.
pub struct Line<'s> {
    /// Zero-based line number.
    pub index: usize,
    pub start: usize,
    pub end: usize,
    pub text: &'s str,
}

impl<'s> Line<'s> {
    /// Line text without its terminator.
    pub fn content(&self) -> &'s str {
        self.text
            .strip_suffix("\r\n")
            .or_else(|| self.text.strip_suffix(['\n', '\r', '\u{85}', '\u{2028}', '\u{2029}']))
            .unwrap_or(self.text)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
/// Zero-based line and character coordinate.
pub struct Position {
    pub line: usize,
    /// Counted in chars from the start of the line.
    pub character: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Location<'s> {
    pub start: Position,
    pub end: Position,
    pub start_offset: usize,
    pub end_offset: usize,
    /// Exact source slice covered by this location.
    pub text: &'s str,
    /// Every line touched by the location, in order.
    pub lines: Vec<Line<'s>>,
}

impl Location<'_> {
    pub fn span(&self) -> Span {
        Span::new(self.start_offset, self.end_offset)
    }
}

#[derive(Clone, Debug)]
pub struct Source<'s> {
    text: &'s str,
    lines: Vec<Line<'s>>,
}

impl<'s> Source<'s> {
    pub fn new(text: &'s str) -> Self {
        let mut lines = vec![];
        let mut start = 0;
        let mut chars = text.char_indices().peekable();

        while let Some((i, c)) = chars.next() {
            let end = match c {
                '\r' => {
                    if chars.next_if(|(_, c)| *c == '\n').is_some() {
                        i + 2
                    } else {
                        i + 1
                    }
                }
                '\n' | '\u{85}' | '\u{2028}' | '\u{2029}' => i + c.len_utf8(),
                _ => continue,
            };
            lines.push(Line {
                index: lines.len(),
                start,
                end,
                text: &text[start..end],
            });
            start = end;
        }
        lines.push(Line {
            index: lines.len(),
            start,
            end: text.len(),
            text: &text[start..],
        });

        Self { text, lines }
    }

    pub fn text(&self) -> &'s str {
        self.text
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn lines(&self) -> &[Line<'s>] {
        &self.lines
    }

    /// Index of the line containing `offset`.
    ///
    /// # Panics
    ///
    /// Panics if `offset` is past the end of the text.
    pub fn line_index(&self, offset: usize) -> usize {
        assert!(
            offset <= self.text.len(),
            "offset {offset} is out of range for source of length {}",
            self.text.len()
        );
        let index = self.lines.partition_point(|line| line.end <= offset);
        index.min(self.lines.len() - 1)
    }

    pub fn position(&self, offset: usize) -> Position {
        let line = &self.lines[self.line_index(offset)];
        Position {
            line: line.index,
            character: self.text[line.start..offset].chars().count(),
        }
    }

    /// Map two absolute offsets to a [`Location`].
    ///
    /// # Panics
    ///
    /// Panics if either offset is out of range or `start > end`.
    pub fn location(&self, start: usize, end: usize) -> Location<'s> {
        assert!(start <= end, "location start {start} is after end {end}");
        let first = self.line_index(start);
        let last = self.line_index(end);
        Location {
            start: self.position(start),
            end: self.position(end),
            start_offset: start,
            end_offset: end,
            text: &self.text[start..end],
            lines: self.lines[first..=last].to_vec(),
        }
    }

    pub fn location_of(&self, span: Span) -> Location<'s> {
        self.location(span.start, span.end)
    }
}
