use insta::{Settings, assert_snapshot, glob};
use markup_gen::{
    Language, ast::SourceText, compile, config::CompileOptions, detect_language, parse,
    render_diagnostics,
};
use std::{fs, path::Path};

#[test]
fn gen_snapshot() {
    glob!("gen/**/*.{html,xml}", |path| {
        let input = fs::read_to_string(path).unwrap();
        let language = detect_language(path).unwrap();

        let output = run_gen_test(path, &input, &Default::default(), language);
        build_settings(path).bind(|| {
            let name = path.file_stem().unwrap().to_str().unwrap();
            assert_snapshot!(name, output);
        });
    });
}

fn run_gen_test(path: &Path, input: &str, options: &CompileOptions, language: Language) -> String {
    let file_name = path.file_name().unwrap().to_str().unwrap();

    let tree = parse(input, language, &options.parse).root;
    similar_asserts::assert_eq!(
        tree.source_text(),
        input,
        "'{}' doesn't round-trip through the syntax tree",
        path.display()
    );

    let compilation = compile(input, Some(file_name), language, options);
    let mut output = compilation.code;
    if !compilation.diagnostics.is_empty() {
        output.push_str("--- diagnostics ---\n");
        output.push_str(&render_diagnostics(file_name, &compilation.diagnostics));
    }
    output
}

fn build_settings(path: &Path) -> Settings {
    let mut settings = Settings::clone_current();
    settings.set_snapshot_path(path.parent().unwrap());
    settings.remove_snapshot_suffix();
    settings.set_prepend_module_to_snapshot(false);
    settings.remove_input_file();
    settings.set_omit_expression(true);
    settings.remove_info();
    settings
}
