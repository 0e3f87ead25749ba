use anyhow::Context;
use markup_gen::{compile, config::CompileOptions, detect_language, render_diagnostics};
use std::{env, fs, io};

fn main() -> anyhow::Result<()> {
    let file_path = env::args().nth(1).context("usage: compile <template>")?;
    let language = detect_language(&file_path)
        .with_context(|| format!("unknown template language for '{file_path}'"))?;
    let code = fs::read_to_string(&file_path)?;
    let options = match fs::read_to_string("markup_gen.toml") {
        Ok(s) => toml::from_str(&s)?,
        Err(error) if error.kind() == io::ErrorKind::NotFound => CompileOptions::default(),
        Err(error) => return Err(error.into()),
    };

    let compilation = compile(&code, Some(&file_path), language, &options);
    if !compilation.diagnostics.is_empty() {
        eprintln!("{}", render_diagnostics(&file_path, &compilation.diagnostics));
    }
    if compilation.has_errors() {
        anyhow::bail!("'{file_path}' has errors");
    }
    print!("{}", compilation.code);
    Ok(())
}
