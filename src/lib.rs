use compiler::Compiler;
use parser::Parser;
use safer_ffi::prelude::*;
use std::io::BufWriter;
use tokenizer::Tokenizer;

/// Compiles `input`. Any error yields an empty string.
#[ffi_export]
pub fn compile_from_string(input: safer_ffi::char_p::char_p_ref<'_>) -> safer_ffi::String {
    compile(input.to_str()).unwrap_or_default().into()
}

#[ffi_export]
pub fn free_string(s: safer_ffi::String) {
    drop(s)
}

fn compile(input: &str) -> Option<String> {
    let mut writer = BufWriter::new(Vec::new());
    let parser = Parser::new(Tokenizer::from(input));
    Compiler::new(parser, &mut writer, None).compile().ok()?;

    String::from_utf8(writer.into_inner().ok()?).ok()
}

/// Writes the C# bindings with `cargo test --features headers generate_headers`.
#[cfg(feature = "headers")]
#[test]
fn generate_headers() -> std::io::Result<()> {
    safer_ffi::headers::builder()
        .with_language(safer_ffi::headers::Language::CSharp)
        .to_file("StationpyStubs.cs")?
        .generate()
}
