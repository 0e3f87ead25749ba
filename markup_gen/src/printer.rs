use crate::{
    config::{GenerateOptions, Target},
    generator::Instruction,
    helpers::escape_literal,
    source::{Line, Source},
};
use tiny_pretty::Doc;

pub(crate) struct Ctx<'o> {
    pub(crate) options: &'o GenerateOptions,
    pub(crate) indent_width: usize,
}

impl Ctx<'_> {
    /// Object the render routine writes through.
    fn receiver(&self) -> &'static str {
        match self.options.target {
            Target::Class => "this",
            Target::Function => "__writer",
        }
    }
}

pub(crate) trait DocGen<'s> {
    fn doc(&self, ctx: &Ctx) -> Doc<'s>;
}

impl<'s> DocGen<'s> for Instruction<'s> {
    fn doc(&self, ctx: &Ctx) -> Doc<'s> {
        let receiver = ctx.receiver();
        match self {
            Instruction::WriteLiteral(text) => Doc::text(format!(
                "{receiver}.writeLiteral(\"{}\");",
                escape_literal(text)
            )),
            Instruction::Write(expr) => Doc::text(format!("{receiver}.write({expr});")),
            Instruction::Statement(code) => Doc::list(
                itertools::intersperse(
                    statement_lines(*code).into_iter().map(Doc::text),
                    Doc::hard_line(),
                )
                .collect(),
            ),
        }
    }
}

/// Lines of a statement with blank lines dropped and the common
/// indentation of the continuation lines removed. Indentation is counted
/// in chars and every line terminator splits.
fn statement_lines(code: &str) -> Vec<&str> {
    let source = Source::new(code);
    let mut lines = source.lines().iter().map(Line::content);
    let first = lines
        .next()
        .map(str::trim_end)
        .filter(|line| !line.is_empty());
    let rest = lines
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>();
    let indent = rest
        .iter()
        .map(|line| line.chars().take_while(|c| c.is_whitespace()).count())
        .min()
        .unwrap_or(0);

    first
        .into_iter()
        .chain(rest.into_iter().map(|line| {
            line.char_indices()
                .nth(indent)
                .map_or("", |(i, _)| &line[i..])
                .trim_end()
        }))
        .collect()
}

/// Wrap the instructions into the class or function skeleton.
pub(crate) fn routine<'s>(
    instructions: &[Instruction<'s>],
    class_name: &str,
    ctx: &Ctx,
) -> Doc<'s> {
    let options = ctx.options;
    let receiver = ctx.receiver();
    let mut body = vec![];
    if options.target == Target::Function {
        body.push(Doc::text(format!(
            "const {receiver} = new {}();",
            options.writer_class
        )));
    }
    body.extend(instructions.iter().map(|instruction| instruction.doc(ctx)));
    body.push(Doc::text(format!("return {receiver}.output;")));

    let method = Doc::text(format!(
        "{}({}) {{",
        options.render_method, options.model_param
    ))
    .append(
        Doc::hard_line()
            .concat(itertools::intersperse(body.into_iter(), Doc::hard_line()))
            .nest(ctx.indent_width),
    )
    .append(Doc::hard_line())
    .append(Doc::text("}"));

    match options.target {
        Target::Class => Doc::text(format!(
            "export class {class_name} extends {} {{",
            options.base_class
        ))
        .append(
            Doc::hard_line()
                .append(method)
                .nest(ctx.indent_width),
        )
        .append(Doc::hard_line())
        .append(Doc::text("}"))
        .append(Doc::hard_line()),
        Target::Function => Doc::text("export function ")
            .append(method)
            .append(Doc::hard_line()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statement_lines_keep_relative_indent() {
        let code = "if (a) {\n      b();\n\n        c();\n      }";
        assert_eq!(statement_lines(code), vec!["if (a) {", "b();", "  c();", "}"]);
    }

    #[test]
    fn statement_indent_is_measured_in_chars() {
        assert_eq!(
            statement_lines("a();\n b();\n\u{a0}c();"),
            vec!["a();", "b();", "c();"]
        );
        assert_eq!(
            statement_lines("f();\n\u{3000}g();\n\t \u{a0}h();"),
            vec!["f();", "g();", " \u{a0}h();"]
        );
    }

    #[test]
    fn statements_split_on_every_line_break() {
        assert_eq!(
            statement_lines("// note\rx();\r\n  y();\u{2028}  z();"),
            vec!["// note", "x();", "  y();", "  z();"]
        );
    }
}
