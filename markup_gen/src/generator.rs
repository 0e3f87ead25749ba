//! Lowering of the syntax tree into render instructions.

use crate::ast::*;
use std::mem;

#[derive(Clone, Debug, PartialEq, Eq)]
/// One step of a render routine.
pub enum Instruction<'s> {
    /// Write text as is. Holds the decoded text, not the escaped form.
    WriteLiteral(String),
    /// Write the runtime value of an expression.
    Write(&'s str),
    /// Run a piece of code from a code block.
    Statement(&'s str),
}

/// Collects instructions, merging adjacent literal text into one write.
pub(crate) struct Generator<'s> {
    pending: String,
    instructions: Vec<Instruction<'s>>,
}

impl<'s> Generator<'s> {
    pub(crate) fn new() -> Self {
        Self {
            pending: String::new(),
            instructions: vec![],
        }
    }

    fn literal(&mut self, text: &str) {
        self.pending.push_str(text);
    }

    fn source(&mut self, node: &impl SourceText) {
        node.write_source(&mut self.pending);
    }

    fn flush(&mut self) {
        if !self.pending.is_empty() {
            self.instructions
                .push(Instruction::WriteLiteral(mem::take(&mut self.pending)));
        }
    }

    fn write(&mut self, expr: &'s str) {
        self.flush();
        self.instructions.push(Instruction::Write(expr));
    }

    fn statement(&mut self, code: &'s str) {
        self.flush();
        let code = code.trim();
        if !code.is_empty() {
            self.instructions.push(Instruction::Statement(code));
        }
    }

    pub(crate) fn finish(mut self) -> Vec<Instruction<'s>> {
        self.flush();
        self.instructions
    }
}

pub(crate) trait Generate<'s> {
    fn generate(&self, generator: &mut Generator<'s>);
}

impl<'s> Generate<'s> for Root<'s> {
    fn generate(&self, generator: &mut Generator<'s>) {
        self.children
            .iter()
            .for_each(|child| child.generate(generator));
    }
}

impl<'s> Generate<'s> for Node<'s> {
    fn generate(&self, generator: &mut Generator<'s>) {
        match self {
            Node::Literal(literal) => generator.literal(&literal.value()),
            Node::Tag(tag) => tag.generate(generator),
            Node::CodeBlock(block) => block.generate(generator),
            Node::CodeExpression(expr) => expr.generate(generator),
            Node::Comment(_) | Node::CData(_) | Node::Declaration(_) | Node::EndTag(_) => {
                generator.source(self)
            }
            Node::Eof(_) => {}
        }
    }
}

impl<'s> Generate<'s> for Tag<'s> {
    fn generate(&self, generator: &mut Generator<'s>) {
        let start = &self.start;
        generator.source(&start.open);
        generator.source(&start.name);
        start
            .attributes
            .iter()
            .for_each(|attribute| attribute.generate(generator));
        generator.source(&start.close);
        self.children
            .iter()
            .for_each(|child| child.generate(generator));
        generator.source(&self.end);
    }
}

impl<'s> Generate<'s> for Attribute<'s> {
    fn generate(&self, generator: &mut Generator<'s>) {
        generator.source(&self.name);
        generator.source(&self.equals);
        if let Some(value) = &self.value {
            generator.source(&value.open_quote);
            value
                .parts
                .iter()
                .for_each(|part| part.generate(generator));
            generator.source(&value.close_quote);
        }
    }
}

impl<'s> Generate<'s> for CodeBlock<'s> {
    fn generate(&self, generator: &mut Generator<'s>) {
        for child in &self.children {
            match child {
                CodeChild::Code(code) => generator.statement(code.text),
                CodeChild::Tag(tag) => tag.generate(generator),
            }
        }
    }
}

impl<'s> Generate<'s> for CodeExpression<'s> {
    fn generate(&self, generator: &mut Generator<'s>) {
        match self.expr() {
            "" => generator.source(self),
            expr => generator.write(expr),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Language, config::ParseOptions, parser::Parser};

    fn instructions(code: &str) -> Vec<Instruction<'_>> {
        let result = Parser::new(code, Language::Html, ParseOptions::default()).parse_root();
        let mut generator = Generator::new();
        result.root.generate(&mut generator);
        generator.finish()
    }

    #[test]
    fn adjacent_literals_merge() {
        assert_eq!(
            instructions("a<!-- b --><br>c"),
            vec![Instruction::WriteLiteral("a<!-- b --><br>c".into())]
        );
    }

    #[test]
    fn dangling_transition_is_written_back() {
        assert_eq!(
            instructions("mail @ home"),
            vec![Instruction::WriteLiteral("mail @ home".into())]
        );
    }

    #[test]
    fn blank_code_segments_are_dropped() {
        assert_eq!(
            instructions("@{ <p>x</p> }"),
            vec![Instruction::WriteLiteral("<p>x</p>".into())]
        );
    }
}
