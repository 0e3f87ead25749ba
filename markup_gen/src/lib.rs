#![doc = include_str!("../README.md")]

pub mod ast;
pub mod config;
mod ctx;
mod error;
mod generator;
mod helpers;
mod parser;
mod printer;
mod source;
mod state;

use crate::{
    ast::Root,
    config::{CompileOptions, ParseOptions},
    generator::{Generate, Generator},
    parser::Parser,
};
pub use crate::{
    error::*,
    generator::Instruction,
    helpers::{escape_literal, unescape_literal},
    parser::Language,
    source::{Line, Location, Position, Source, Span},
};
use std::{num::NonZeroUsize, path::Path, thread};
use tiny_pretty::{IndentKind, PrintOptions};

#[derive(Clone, Debug)]
/// Syntax tree of one template together with everything found wrong in it.
pub struct ParseResult<'s> {
    pub root: Root<'s>,
    pub diagnostics: Vec<Diagnostic<'s>>,
}

impl ParseResult<'_> {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }
}

/// Parse a template into a lossless syntax tree.
///
/// Parsing never fails: malformed input is reported through
/// [`ParseResult::diagnostics`] and the tree always ends with
/// [`ast::Node::Eof`].
///
/// ```
/// use markup_gen::{ast::Node, config::ParseOptions, parse, Language};
///
/// let result = parse("<p>@@home</p>", Language::Html, &ParseOptions::default());
/// assert!(result.diagnostics.is_empty());
/// assert!(matches!(result.root.children.last(), Some(Node::Eof(_))));
/// ```
pub fn parse<'s>(code: &'s str, language: Language, options: &ParseOptions) -> ParseResult<'s> {
    tracing::debug!(%language, len = code.len(), "parsing template");
    let result = Parser::new(code, language, options.clone()).parse_root();
    tracing::debug!(
        nodes = result.root.children.len(),
        diagnostics = result.diagnostics.len(),
        "parsed template"
    );
    result
}

/// Lower a syntax tree into render instructions in document order.
pub fn generate<'s>(root: &Root<'s>) -> Vec<Instruction<'s>> {
    let mut generator = Generator::new();
    root.generate(&mut generator);
    generator.finish()
}

#[derive(Clone, Debug)]
/// Result of compiling one template.
pub struct Compilation<'s> {
    /// Name of the generated class.
    pub class_name: String,
    /// Generated render routine.
    pub code: String,
    pub instructions: Vec<Instruction<'s>>,
    pub diagnostics: Vec<Diagnostic<'s>>,
}

impl Compilation<'_> {
    /// Whether any diagnostic should make the host reject the template.
    ///
    /// Info and warning diagnostics don't block code generation.
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }
}

/// Parse a template and generate its render routine.
///
/// `file` is only used to name the generated class
/// when [`config::GenerateOptions::class_name`] isn't set.
///
/// ```
/// use markup_gen::{compile, Language};
///
/// let compilation = compile(
///     "<div>@model.name</div>",
///     Some("views/user-card.html"),
///     Language::Html,
///     &Default::default(),
/// );
/// assert_eq!(compilation.class_name, "UserCard");
/// assert!(compilation.code.contains("this.write(model.name);"));
/// ```
pub fn compile<'s>(
    code: &'s str,
    file: Option<&str>,
    language: Language,
    options: &CompileOptions,
) -> Compilation<'s> {
    tracing::debug!(file = file.unwrap_or("<anonymous>"), "compiling template");
    let ParseResult { root, diagnostics } = parse(code, language, &options.parse);
    let instructions = generate(&root);

    let class_name = options
        .generate
        .class_name
        .clone()
        .unwrap_or_else(|| file.map_or_else(|| DEFAULT_CLASS_NAME.into(), class_name_from_path));
    let ctx = printer::Ctx {
        options: &options.generate,
        indent_width: options.layout.indent_width,
    };
    let doc = printer::routine(&instructions, &class_name, &ctx);
    let code = tiny_pretty::print(
        &doc,
        &PrintOptions {
            indent_kind: if options.layout.use_tabs {
                IndentKind::Tab
            } else {
                IndentKind::Space
            },
            line_break: options.layout.line_break.clone().into(),
            width: 80,
            tab_size: options.layout.indent_width,
        },
    );

    Compilation {
        class_name,
        code,
        instructions,
        diagnostics,
    }
}

/// Like [`compile`], selecting the grammar by a key such as `"html"` or `"xml"`.
pub fn compile_with_language_key<'s>(
    code: &'s str,
    file: Option<&str>,
    key: &str,
    options: &CompileOptions,
) -> Result<Compilation<'s>, UnsupportedLanguageError> {
    let language = key.parse()?;
    Ok(compile(code, file, language, options))
}

#[derive(Clone, Copy, Debug)]
/// In-memory template handed to [`compile_many`].
pub struct TemplateFile<'s> {
    pub id: &'s str,
    pub text: &'s str,
}

/// Compile independent templates on scoped worker threads.
///
/// Results are in the same order as `files`.
pub fn compile_many<'s>(
    files: &[TemplateFile<'s>],
    language: Language,
    options: &CompileOptions,
) -> Vec<Compilation<'s>> {
    let workers = thread::available_parallelism().map_or(1, NonZeroUsize::get);
    let chunk_size = files.len().div_ceil(workers).max(1);
    tracing::debug!(files = files.len(), workers, "compiling templates");

    thread::scope(|scope| {
        let handles = files
            .chunks(chunk_size)
            .map(|chunk| {
                scope.spawn(move || {
                    chunk
                        .iter()
                        .map(|file| compile(file.text, Some(file.id), language, options))
                        .collect::<Vec<_>>()
                })
            })
            .collect::<Vec<_>>();
        handles
            .into_iter()
            .flat_map(|handle| {
                handle
                    .join()
                    .unwrap_or_else(|panic| std::panic::resume_unwind(panic))
            })
            .collect()
    })
}

/// Detect language from file extension.
pub fn detect_language(path: impl AsRef<Path>) -> Option<Language> {
    path.as_ref()
        .extension()
        .and_then(|ext| ext.to_str())
        .and_then(|ext| ext.parse().ok())
}

const DEFAULT_CLASS_NAME: &str = "Page";

/// `views/user-card.html` → `UserCard`
pub fn class_name_from_path(path: &str) -> String {
    let name = Path::new(path)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .map(helpers::pascal_case)
        .unwrap_or_default();
    if name.is_empty() {
        DEFAULT_CLASS_NAME.into()
    } else {
        name
    }
}
