use crate::Language;
use aho_corasick::AhoCorasick;
use std::{borrow::Cow, sync::LazyLock};

static VOID_ELEMENTS: [&str; 14] = [
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

pub(crate) fn is_void_element(name: &str, language: Language) -> bool {
    match language {
        Language::Html => VOID_ELEMENTS
            .iter()
            .any(|tag| tag.eq_ignore_ascii_case(name)),
        Language::Xml => false,
    }
}

static RAW_TEXT_ELEMENTS: [&str; 2] = ["script", "style"];

/// Returns the canonical name if `name` is a raw-text element.
pub(crate) fn raw_text_element(name: &str, language: Language) -> Option<&'static str> {
    match language {
        Language::Html => RAW_TEXT_ELEMENTS
            .iter()
            .find(|tag| tag.eq_ignore_ascii_case(name))
            .copied(),
        Language::Xml => None,
    }
}

pub(crate) fn is_tag_name_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || !c.is_ascii()
}

pub(crate) fn is_tag_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric()
        || c == '-'
        || c == '_'
        || c == '.'
        || c == ':'
        || !c.is_ascii()
        || c == '\\'
}

/// Characters ending a tag or attribute name.
pub(crate) fn is_name_stop(c: char) -> bool {
    matches!(c, '=' | '/' | '>' | '"' | '\'' | '`') || c.is_whitespace()
}

pub(crate) fn is_unquoted_attr_value_char(c: char) -> bool {
    !c.is_whitespace() && !matches!(c, '"' | '\'' | '=' | '<' | '>' | '`')
}

pub(crate) fn is_identifier_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

pub(crate) fn is_identifier_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

/// Decide whether `text`, which starts with `<`, opens markup inside code.
///
/// The name must start with a letter or `_`, continue with name characters,
/// and the tag must close with `>` or `/>` before anything that only appears
/// in code (`;`, braces, `<`, `|`, `&`) outside quotes.
/// `<!...>` and `</...>` never count.
pub(crate) fn is_markup_start(text: &str) -> bool {
    let Some(rest) = text.strip_prefix('<') else {
        return false;
    };
    if !rest
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
    {
        return false;
    }

    let name_end = rest
        .find(|c: char| !is_tag_name_char(c))
        .unwrap_or(rest.len());
    let after = &rest[name_end..];
    match after.chars().next() {
        Some('>') => true,
        Some('/') => after[1..].starts_with('>'),
        Some(c) if c.is_whitespace() => closes_like_tag(after),
        _ => false,
    }
}

fn closes_like_tag(text: &str) -> bool {
    let mut quote = None;
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '>') => return true,
            (None, '/') if chars.peek() == Some(&'>') => return true,
            (None, ';' | '{' | '}' | '<' | '|' | '&') => return false,
            (None, _) => {}
        }
    }
    false
}

/// Byte length of the line starting `text`, including its terminator.
/// `\r\n`, `\n`, `\r`, NEL, LS and PS all end a line.
pub(crate) fn line_len(text: &str) -> usize {
    match text.find(['\n', '\r', '\u{85}', '\u{2028}', '\u{2029}']) {
        Some(i) if text[i..].starts_with("\r\n") => i + 2,
        Some(i) => i + text[i..].chars().next().map_or(1, char::len_utf8),
        None => text.len(),
    }
}

/// String-literal state while scanning embedded code.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) enum QuoteState {
    #[default]
    None,
    Single,
    Double,
    Backtick,
}

impl QuoteState {
    pub(crate) fn opened_by(c: char) -> Option<Self> {
        match c {
            '\'' => Some(QuoteState::Single),
            '"' => Some(QuoteState::Double),
            '`' => Some(QuoteState::Backtick),
            _ => None,
        }
    }

    pub(crate) fn closing_char(self) -> Option<char> {
        match self {
            QuoteState::None => None,
            QuoteState::Single => Some('\''),
            QuoteState::Double => Some('"'),
            QuoteState::Backtick => Some('`'),
        }
    }

    pub(crate) fn is_quoted(self) -> bool {
        self != QuoteState::None
    }

    /// Advance the state over `c`, returning whether `c` was a quote boundary.
    pub(crate) fn step(&mut self, c: char) -> bool {
        match self.closing_char() {
            Some(close) if close == c => {
                *self = QuoteState::None;
                true
            }
            Some(_) => false,
            None => match QuoteState::opened_by(c) {
                Some(state) => {
                    *self = state;
                    true
                }
                None => false,
            },
        }
    }
}

static ESCAPING_AC: LazyLock<AhoCorasick> =
    LazyLock::new(|| AhoCorasick::new(["\\", "\"", "\n", "\t", "\r"]).unwrap());

/// Escape text for a double-quoted string literal in generated code.
pub fn escape_literal(text: &str) -> Cow<'_, str> {
    if ESCAPING_AC.is_match(text) {
        Cow::from(ESCAPING_AC.replace_all(text, &["\\\\", "\\\"", "\\n", "\\t", "\\r"]))
    } else {
        Cow::from(text)
    }
}

/// Inverse of [`escape_literal`].
pub fn unescape_literal(text: &str) -> Cow<'_, str> {
    if !text.contains('\\') {
        return Cow::from(text);
    }
    let mut unescaped = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            unescaped.push(c);
            continue;
        }
        unescaped.push(match chars.next() {
            Some('n') => '\n',
            Some('t') => '\t',
            Some('r') => '\r',
            Some(other) => other,
            None => '\\',
        });
    }
    Cow::from(unescaped)
}

/// `admin/user-list.html` → `UserList`
pub(crate) fn pascal_case(stem: &str) -> String {
    let name = stem
        .split(|c: char| !c.is_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            chars
                .next()
                .map(|first| first.to_uppercase().chain(chars).collect::<String>())
                .unwrap_or_default()
        })
        .collect::<String>();
    if name.starts_with(|c: char| c.is_ascii_digit()) {
        format!("_{name}")
    } else {
        name
    }
}
