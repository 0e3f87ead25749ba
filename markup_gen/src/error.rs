use crate::source::Location;
use std::{error::Error, fmt};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DiagnosticCode {
    MalformedComment,
    UnterminatedComment,
    InvalidName,
    UnterminatedAttributeValue,
    InvalidAttributeValue,
    MissingEquals,
    InvalidTagFormat,
    InvalidTagName,
    UnterminatedTag,
    MismatchedEndTag,
    EmptyAttributeValue,
    MissingRawTextEndTag,
    UnterminatedCData,
    ExpectedTransitionMarker,
    ExpectedBracket,
    ExpectedBrace,
    MissingWhitespaceAfterTransition,
    MalformedCodeBlock,
    UnexpectedEndOfInput,
    ExpectedExpression,
    UnexpectedEndTag,
    UnterminatedExpression,
}

impl DiagnosticCode {
    pub fn number(self) -> u16 {
        match self {
            DiagnosticCode::MalformedComment => 1001,
            DiagnosticCode::UnterminatedComment => 1002,
            DiagnosticCode::InvalidName => 1003,
            DiagnosticCode::UnterminatedAttributeValue => 1004,
            DiagnosticCode::InvalidAttributeValue => 1005,
            DiagnosticCode::MissingEquals => 1006,
            DiagnosticCode::InvalidTagFormat => 1007,
            DiagnosticCode::InvalidTagName => 1008,
            DiagnosticCode::UnterminatedTag => 1009,
            DiagnosticCode::MismatchedEndTag => 1010,
            DiagnosticCode::EmptyAttributeValue => 1011,
            DiagnosticCode::MissingRawTextEndTag => 1012,
            DiagnosticCode::UnterminatedCData => 1013,
            DiagnosticCode::ExpectedTransitionMarker => 1014,
            DiagnosticCode::ExpectedBracket => 1015,
            DiagnosticCode::ExpectedBrace => 1016,
            DiagnosticCode::MissingWhitespaceAfterTransition => 1017,
            DiagnosticCode::MalformedCodeBlock => 1018,
            DiagnosticCode::UnexpectedEndOfInput => 1019,
            DiagnosticCode::ExpectedExpression => 1020,
            DiagnosticCode::UnexpectedEndTag => 1021,
            DiagnosticCode::UnterminatedExpression => 1022,
        }
    }

    /// Severity used when the parser reports this code.
    pub fn default_severity(self) -> Severity {
        match self {
            DiagnosticCode::EmptyAttributeValue => Severity::Info,
            DiagnosticCode::MalformedComment | DiagnosticCode::MissingWhitespaceAfterTransition => {
                Severity::Warning
            }
            _ => Severity::Error,
        }
    }

    pub fn message(self) -> DiagnosticMessage {
        let template = match self {
            DiagnosticCode::MalformedComment => "malformed comment '{0}'",
            DiagnosticCode::UnterminatedComment => {
                "comment is not terminated, expected '{0}' before end of input"
            }
            DiagnosticCode::InvalidName => "'{0}' is not a valid attribute name",
            DiagnosticCode::UnterminatedAttributeValue => {
                "attribute value is missing its closing quote {0}"
            }
            DiagnosticCode::InvalidAttributeValue => {
                "unquoted attribute value cannot start with '{0}'"
            }
            DiagnosticCode::MissingEquals => {
                "expected '=' between attribute '{0}' and its value"
            }
            DiagnosticCode::InvalidTagFormat => "invalid tag format: {0}",
            DiagnosticCode::InvalidTagName => "'{0}' is not a valid tag name",
            DiagnosticCode::UnterminatedTag => "start tag '<{0}' is not terminated",
            DiagnosticCode::MismatchedEndTag => {
                "end tag '</{1}>' does not match start tag '<{0}>'"
            }
            DiagnosticCode::EmptyAttributeValue => "attribute '{0}' has an empty value",
            DiagnosticCode::MissingRawTextEndTag => "missing end tag '</{0}>'",
            DiagnosticCode::UnterminatedCData => "CDATA section is not terminated, expected ']]>'",
            DiagnosticCode::ExpectedTransitionMarker => "expected transition marker '@'",
            DiagnosticCode::ExpectedBracket => "expected '{0}'",
            DiagnosticCode::ExpectedBrace => "expected '{0}'",
            DiagnosticCode::MissingWhitespaceAfterTransition => "expected whitespace after '{0}'",
            DiagnosticCode::MalformedCodeBlock => "malformed code block: {0}",
            DiagnosticCode::UnexpectedEndOfInput => "unexpected end of input, expected {0}",
            DiagnosticCode::ExpectedExpression => {
                "expected an expression or code block after '@'"
            }
            DiagnosticCode::UnexpectedEndTag => "end tag '</{0}>' has no matching start tag",
            DiagnosticCode::UnterminatedExpression => {
                "explicit expression is not terminated, expected ')'"
            }
        };
        DiagnosticMessage {
            code: self,
            template,
        }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MG{}", self.number())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// A diagnostic code paired with its message template.
///
/// Templates refer to arguments positionally as `{0}`, `{1}`, ...
pub struct DiagnosticMessage {
    pub code: DiagnosticCode,
    pub template: &'static str,
}

impl DiagnosticMessage {
    pub fn format(&self, args: &[String]) -> String {
        args.iter()
            .enumerate()
            .fold(self.template.to_owned(), |text, (i, arg)| {
                text.replace(&format!("{{{i}}}"), arg)
            })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic<'s> {
    pub severity: Severity,
    pub message: DiagnosticMessage,
    pub args: Vec<String>,
    pub location: Option<Location<'s>>,
}

impl Diagnostic<'_> {
    pub fn code(&self) -> DiagnosticCode {
        self.message.code
    }

    pub fn text(&self) -> String {
        self.message.format(&self.args)
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Diagnostic<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]: {}", self.severity, self.code(), self.text())?;
        if let Some(location) = &self.location {
            write!(
                f,
                " at {}:{}",
                location.start.line + 1,
                location.start.character + 1
            )?;
        }
        Ok(())
    }
}

/// Render diagnostics as `severity[code] file:line:col message`, one per line.
pub fn render_diagnostics(file: &str, diagnostics: &[Diagnostic]) -> String {
    diagnostics
        .iter()
        .map(|diagnostic| {
            let position = diagnostic
                .location
                .as_ref()
                .map(|location| {
                    format!(
                        "{}:{}",
                        location.start.line + 1,
                        location.start.character + 1
                    )
                })
                .unwrap_or_else(|| "?:?".into());
            format!(
                "{}[{}] {file}:{position} {}",
                diagnostic.severity,
                diagnostic.code(),
                diagnostic.text()
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[derive(Clone, Debug, PartialEq, Eq)]
/// Requested a template language this crate has no grammar for.
///
/// Unlike [`Diagnostic`]s this is a caller mistake and aborts compilation.
pub struct UnsupportedLanguageError {
    pub key: String,
}

impl fmt::Display for UnsupportedLanguageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unsupported template language '{}'", self.key)
    }
}

impl Error for UnsupportedLanguageError {}
