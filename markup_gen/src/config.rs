//! Types about configuration.

#[cfg(feature = "config_serde")]
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "config_serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config_serde", serde(rename_all = "camelCase", default))]
/// The whole configuration of a compilation.
pub struct CompileOptions {
    pub parse: ParseOptions,
    pub generate: GenerateOptions,
    #[cfg_attr(feature = "config_serde", serde(flatten))]
    pub layout: LayoutOptions,
}

#[derive(Clone, Debug)]
#[cfg_attr(feature = "config_serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config_serde", serde(rename_all = "camelCase", default))]
/// Configuration of the grammar.
pub struct ParseOptions {
    /// Report `<!--` and `/*` comments that run to end of input.
    ///
    /// Off by default: such comments silently extend to the end.
    pub strict_comments: bool,

    /// Warn when a code block's `{` is immediately followed by code, like `@{x}`.
    pub warn_missing_whitespace_after_transition: bool,

    /// Let `@expr` continue through balanced `(...)` and `[...]`,
    /// as in `@user.name()` or `@items[0]`.
    /// When disabled only dotted identifier chains are taken.
    pub inline_invocations: bool,

    /// Recognize `//` and `/* */` comments in markup.
    pub line_comments: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            strict_comments: false,
            warn_missing_whitespace_after_transition: false,
            inline_invocations: true,
            line_comments: true,
        }
    }
}

#[derive(Clone, Debug)]
#[cfg_attr(feature = "config_serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config_serde", serde(rename_all = "camelCase", default))]
/// Configuration of the generated render routine.
pub struct GenerateOptions {
    pub target: Target,
    /// Overrides the class name derived from the file identifier.
    pub class_name: Option<String>,
    /// Superclass of the generated class.
    pub base_class: String,
    /// Class instantiated as the local writer of a function target.
    pub writer_class: String,
    pub render_method: String,
    pub model_param: String,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            target: Target::Class,
            class_name: None,
            base_class: "Template".into(),
            writer_class: "Writer".into(),
            render_method: "render".into(),
            model_param: "model".into(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "config_serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config_serde", serde(rename_all = "camelCase"))]
pub enum Target {
    /// A class whose render method writes through `this`, for server rendering.
    #[default]
    Class,
    /// A standalone function writing through a local writer.
    Function,
}

#[derive(Clone, Debug)]
#[cfg_attr(feature = "config_serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config_serde", serde(rename_all = "camelCase", default))]
/// Configuration related to layout of the generated code.
pub struct LayoutOptions {
    pub use_tabs: bool,
    pub indent_width: usize,
    pub line_break: LineBreak,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            use_tabs: false,
            indent_width: 2,
            line_break: LineBreak::Lf,
        }
    }
}

#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "config_serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config_serde", serde(rename_all = "camelCase"))]
pub enum LineBreak {
    #[default]
    Lf,
    Crlf,
}

impl From<LineBreak> for tiny_pretty::LineBreak {
    fn from(value: LineBreak) -> Self {
        match value {
            LineBreak::Lf => tiny_pretty::LineBreak::Lf,
            LineBreak::Crlf => tiny_pretty::LineBreak::Crlf,
        }
    }
}
