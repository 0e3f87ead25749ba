use markup_gen::{
    DiagnosticCode, Language, ParseResult, Position, Severity,
    ast::*,
    compile_with_language_key,
    config::ParseOptions,
    parse,
};
use similar_asserts::assert_eq;

fn parse_html(code: &str) -> ParseResult<'_> {
    parse(code, Language::Html, &ParseOptions::default())
}

fn codes(result: &ParseResult) -> Vec<DiagnosticCode> {
    result
        .diagnostics
        .iter()
        .map(|diagnostic| diagnostic.code())
        .collect()
}

// Text opening with `//` or `/*` is a comment while `line_comments` is on.
#[test]
fn plain_text_is_one_literal() {
    for code in [
        "Hello, World!",
        "a > b & c",
        "multi\nline\r\ntext\u{2028}end",
        "price: 5€ / kg",
    ] {
        let result = parse_html(code);
        assert!(result.diagnostics.is_empty(), "{code:?}");
        match result.root.children.as_slice() {
            [Node::Literal(literal), Node::Eof(span)] => {
                assert_eq!(literal.value(), code);
                assert_eq!(span.start, code.len());
            }
            children => panic!("unexpected nodes for {code:?}: {children:?}"),
        }
    }
}

#[test]
fn malformed_input_still_ends_with_eof() {
    for code in [
        "",
        "<",
        "<div",
        "<div class=\"x",
        "<div\n<span>",
        "@{ if (x) {",
        "@{ \"unterminated }",
        "@(a",
        "@",
        "</>",
        "<!--",
        "<![CDATA[x",
        "<!DOCTYPE",
        "<script>x",
        "<a =b 'c' d=>",
        "<a href=x@y>",
        "/* open",
    ] {
        let result = parse_html(code);
        assert!(
            matches!(result.root.children.last(), Some(Node::Eof(_))),
            "{code:?}"
        );
        assert_eq!(result.root.source_text(), code);
    }
}

#[test]
fn escaped_transition() {
    let result = parse_html("a@@b");
    assert!(result.diagnostics.is_empty());
    let [Node::Literal(literal), Node::Eof(_)] = result.root.children.as_slice() else {
        panic!("expected a single literal");
    };
    assert_eq!(literal.token.text, "a@@b");
    assert_eq!(literal.value(), "a@b");
}

#[test]
fn invalid_tag_name() {
    let result = parse_html("<a$b></a$b>");
    assert_eq!(
        codes(&result),
        vec![DiagnosticCode::InvalidTagName, DiagnosticCode::InvalidTagName]
    );
    assert_eq!(result.diagnostics[0].severity, Severity::Error);
    let location = result.diagnostics[1].location.as_ref().unwrap();
    assert_eq!(location.text, "a$b");
    assert_eq!(location.start, Position { line: 0, character: 7 });
}

#[test]
fn mismatched_end_tag() {
    let result = parse_html("<div></span>");
    assert_eq!(codes(&result), vec![DiagnosticCode::MismatchedEndTag]);
    assert_eq!(result.diagnostics[0].args, vec!["div", "span"]);
    let Node::Tag(tag) = &result.root.children[0] else {
        panic!("expected a tag");
    };
    assert_eq!(tag.name(), "div");
    assert_eq!(tag.end.as_ref().map(|end| end.name.text), Some("span"));

    let result = parse_html("<DIV>x</div >");
    assert!(result.diagnostics.is_empty());
}

#[test]
fn diagnostic_positions() {
    let result = parse_html("<p>\n  </div>");
    let location = result.diagnostics[0].location.as_ref().unwrap();
    assert_eq!(location.start, Position { line: 1, character: 2 });
    assert_eq!(location.text, "</div>");
    assert_eq!(
        result.diagnostics[0].text(),
        "end tag '</div>' does not match start tag '<p>'"
    );
}

#[test]
fn quoted_text_in_code_block() {
    let code = "@{ var a = '<div'; var b = \"}\"; var c = `{`; var d = \"@@\"; }";
    let result = parse_html(code);
    assert!(result.diagnostics.is_empty());
    let [Node::CodeBlock(block), Node::Eof(_)] = result.root.children.as_slice() else {
        panic!("expected a code block");
    };
    assert!(block.close_brace.is_some());
    let [CodeChild::Code(token)] = block.children.as_slice() else {
        panic!("expected plain code");
    };
    assert_eq!(
        token.text,
        " var a = '<div'; var b = \"}\"; var c = `{`; var d = \"@@\"; "
    );
}

#[test]
fn line_comment_in_code_block_ends_at_any_line_break() {
    for code in [
        "@{ // note\rx(); }<p>after</p>",
        "@{ // it's\u{2028}x(); }<p>after</p>",
    ] {
        let result = parse_html(code);
        assert!(result.diagnostics.is_empty(), "{code:?}");
        let [Node::CodeBlock(block), Node::Tag(tag), Node::Eof(_)] =
            result.root.children.as_slice()
        else {
            panic!("expected a code block and a tag for {code:?}");
        };
        assert!(block.close_brace.is_some());
        assert_eq!(tag.name(), "p");
    }
}

#[test]
fn markup_inside_code_block() {
    let result = parse_html("@{ for(let i=0;i<2;i++) { <li>@i</li> } }");
    assert!(result.diagnostics.is_empty());
    let Node::CodeBlock(block) = &result.root.children[0] else {
        panic!("expected a code block");
    };
    match block.children.as_slice() {
        [CodeChild::Code(head), CodeChild::Tag(tag), CodeChild::Code(tail)] => {
            assert_eq!(head.text, " for(let i=0;i<2;i++) { ");
            assert_eq!(tag.name(), "li");
            assert!(matches!(
                tag.children.as_slice(),
                [Node::CodeExpression(expr)] if expr.expr() == "i"
            ));
            assert_eq!(tail.text, " } ");
        }
        children => panic!("unexpected children: {children:?}"),
    }
}

#[test]
fn unterminated_code_block() {
    let result = parse_html("@{ if (x) { <b>y</b>");
    assert_eq!(codes(&result), vec![DiagnosticCode::UnexpectedEndOfInput]);

    let result = parse_html("@{ let s = 'open; }");
    assert_eq!(codes(&result), vec![DiagnosticCode::MalformedCodeBlock]);
}

#[test]
fn attributes() {
    let result = parse_html("<a href=\"/u/@model.id\" disabled data-x=1>");
    let Node::Tag(tag) = &result.root.children[0] else {
        panic!("expected a tag");
    };
    let [href, disabled, data] = tag.start.attributes.as_slice() else {
        panic!("expected three attributes");
    };
    let value = href.value.as_ref().unwrap();
    assert_eq!(value.quote(), Some('"'));
    match value.parts.as_slice() {
        [Node::Literal(literal), Node::CodeExpression(expr)] => {
            assert_eq!(literal.value(), "/u/");
            assert_eq!(expr.expr(), "model.id");
        }
        parts => panic!("unexpected parts: {parts:?}"),
    }
    assert!(disabled.is_boolean());
    assert_eq!(
        disabled.leading_trivia().map(|trivia| trivia.text),
        Some(" ")
    );
    assert_eq!(data.value.as_ref().unwrap().source_text(), "1");
    // no end tag before end of input
    assert_eq!(codes(&result), vec![DiagnosticCode::UnexpectedEndOfInput]);
}

#[test]
fn attribute_recovery() {
    let result = parse_html("<a href\"x\">");
    assert_eq!(codes(&result)[0], DiagnosticCode::MissingEquals);

    let result = parse_html("<a b==c></a>");
    assert_eq!(codes(&result), vec![DiagnosticCode::InvalidAttributeValue]);

    let result = parse_html("<a b=></a>");
    assert_eq!(codes(&result), vec![DiagnosticCode::EmptyAttributeValue]);
    assert_eq!(result.diagnostics[0].severity, Severity::Info);
    assert!(!result.has_errors());

    let result = parse_html("<a \"x\" y></a>");
    assert_eq!(codes(&result), vec![DiagnosticCode::InvalidName]);

    let result = parse_html("<a title=\"open></a>");
    assert_eq!(
        codes(&result),
        vec![
            DiagnosticCode::UnterminatedAttributeValue,
            DiagnosticCode::UnterminatedTag
        ]
    );
}

#[test]
fn void_elements_depend_on_language() {
    let result = parse_html("<br><img src=x>text");
    assert!(result.diagnostics.is_empty());
    match result.root.children.as_slice() {
        [Node::Tag(br), Node::Tag(img), Node::Literal(text), Node::Eof(_)] => {
            assert_eq!(br.kind, TagKind::Void);
            assert_eq!(img.kind, TagKind::Void);
            assert_eq!(text.value(), "text");
        }
        children => panic!("unexpected nodes: {children:?}"),
    }

    let result = parse("<br/><br></br>", Language::Xml, &ParseOptions::default());
    assert!(result.diagnostics.is_empty());
    match result.root.children.as_slice() {
        [Node::Tag(first), Node::Tag(second), Node::Eof(_)] => {
            assert!(first.is_self_closing());
            assert_eq!(second.kind, TagKind::Element);
            assert!(second.end.is_some());
        }
        children => panic!("unexpected nodes: {children:?}"),
    }
}

#[test]
fn raw_text_elements() {
    let result = parse_html("<style>a < b { color: @red }</STYLE>");
    assert!(result.diagnostics.is_empty());
    let Node::Tag(tag) = &result.root.children[0] else {
        panic!("expected a tag");
    };
    assert_eq!(tag.kind, TagKind::RawText);
    assert!(matches!(
        tag.children.as_slice(),
        [Node::Literal(Literal { kind: LiteralKind::RawText, token })]
            if token.text == "a < b { color: @red }"
    ));

    let result = parse_html("<script>let a;");
    assert_eq!(codes(&result), vec![DiagnosticCode::MissingRawTextEndTag]);
}

#[test]
fn comments() {
    let result = parse_html("<!-- x");
    assert!(result.diagnostics.is_empty());
    let strict = ParseOptions {
        strict_comments: true,
        ..Default::default()
    };
    let result = parse("<!-- x", Language::Html, &strict);
    assert_eq!(codes(&result), vec![DiagnosticCode::UnterminatedComment]);

    let result = parse_html("// note\r\n/* block */text/* kept */");
    match result.root.children.as_slice() {
        [
            Node::Comment(line),
            Node::Comment(block),
            Node::Literal(text),
            Node::Eof(_),
        ] => {
            assert_eq!(line.kind, CommentKind::Line);
            assert_eq!(line.token.text, "// note\r\n");
            assert_eq!(block.kind, CommentKind::Block);
            assert_eq!(block.token.text, "/* block */");
            // comments only start at node boundaries
            assert_eq!(text.value(), "text/* kept */");
        }
        children => panic!("unexpected nodes: {children:?}"),
    }

    let no_line_comments = ParseOptions {
        line_comments: false,
        ..Default::default()
    };
    let result = parse("// note", Language::Html, &no_line_comments);
    assert!(matches!(result.root.children[0], Node::Literal(_)));

    let code = "/* not a comment in text";
    let result = parse_html(code);
    assert!(result.diagnostics.is_empty());
    assert!(matches!(
        result.root.children.as_slice(),
        [Node::Comment(Comment { kind: CommentKind::Block, .. }), Node::Eof(_)]
    ));
    let result = parse(code, Language::Html, &no_line_comments);
    match result.root.children.as_slice() {
        [Node::Literal(literal), Node::Eof(_)] => assert_eq!(literal.value(), code),
        children => panic!("unexpected nodes: {children:?}"),
    }

    let result = parse_html("<!-->");
    assert_eq!(codes(&result), vec![DiagnosticCode::MalformedComment]);
    assert_eq!(result.diagnostics[0].severity, Severity::Warning);
}

#[test]
fn cdata_and_declarations() {
    let result = parse(
        "<?xml version=\"1.0\"?><![cdata[<x>]]>",
        Language::Xml,
        &ParseOptions::default(),
    );
    assert!(result.diagnostics.is_empty());
    match result.root.children.as_slice() {
        [Node::Declaration(declaration), Node::CData(cdata), Node::Eof(_)] => {
            assert_eq!(declaration.token.text, "<?xml version=\"1.0\"?>");
            assert_eq!(cdata.content.text, "<x>");
            assert!(cdata.end.is_some());
        }
        children => panic!("unexpected nodes: {children:?}"),
    }

    let result = parse_html("<![CDATA[x");
    assert_eq!(codes(&result), vec![DiagnosticCode::UnterminatedCData]);
}

#[test]
fn stray_end_tag() {
    let result = parse_html("a</b>c");
    assert_eq!(codes(&result), vec![DiagnosticCode::UnexpectedEndTag]);
    assert!(matches!(
        result.root.children.as_slice(),
        [Node::Literal(_), Node::EndTag(_), Node::Literal(_), Node::Eof(_)]
    ));
}

#[test]
fn expressions() {
    let result = parse_html("@(a + b)");
    let Node::CodeExpression(expr) = &result.root.children[0] else {
        panic!("expected an expression");
    };
    assert!(expr.is_explicit());
    assert_eq!(expr.expr(), "a + b");

    let result = parse_html("@items[0].name()!");
    let Node::CodeExpression(expr) = &result.root.children[0] else {
        panic!("expected an expression");
    };
    assert_eq!(expr.expr(), "items[0].name()");

    let options = ParseOptions {
        inline_invocations: false,
        ..Default::default()
    };
    let result = parse("@items[0]", Language::Html, &options);
    match result.root.children.as_slice() {
        [Node::CodeExpression(expr), Node::Literal(rest), Node::Eof(_)] => {
            assert_eq!(expr.expr(), "items");
            assert_eq!(rest.value(), "[0]");
        }
        children => panic!("unexpected nodes: {children:?}"),
    }

    let result = parse_html("@(a");
    assert_eq!(codes(&result), vec![DiagnosticCode::UnterminatedExpression]);
    let result = parse_html("@ x");
    assert_eq!(codes(&result), vec![DiagnosticCode::ExpectedExpression]);
}

#[test]
fn whitespace_after_transition() {
    let options = ParseOptions {
        warn_missing_whitespace_after_transition: true,
        ..Default::default()
    };
    let result = parse("@{x = 1;}", Language::Html, &options);
    assert_eq!(
        codes(&result),
        vec![DiagnosticCode::MissingWhitespaceAfterTransition]
    );
    assert!(!result.has_errors());
    assert!(parse("@{ x = 1; }", Language::Html, &options).diagnostics.is_empty());
}

#[test]
fn language_keys() {
    assert_eq!("HTML".parse::<Language>(), Ok(Language::Html));
    assert_eq!("svg".parse::<Language>(), Ok(Language::Xml));
    let error = "razor".parse::<Language>().unwrap_err();
    assert_eq!(error.to_string(), "unsupported template language 'razor'");
    assert!(compile_with_language_key("x", None, "jsx", &Default::default()).is_err());
}
