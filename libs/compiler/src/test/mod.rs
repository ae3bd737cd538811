macro_rules! output {
    ($input:expr) => {
        String::from_utf8($input.into_inner()?)?
    };
}

/// Source literals are dedented with `indoc!`. `result` takes any string expression as-is.
#[macro_export]
macro_rules! compile {
    (debug $source:literal) => {{
        let mut writer = std::io::BufWriter::new(Vec::new());
        let compiler = crate::Compiler::new(
            parser::Parser::new(tokenizer::Tokenizer::from(indoc::indoc!($source))),
            &mut writer,
            Some(crate::CompilerConfig { debug: true }),
        );
        compiler.compile()?;
        output!(writer)
    }};

    (result $source:expr) => {{
        let mut writer = std::io::BufWriter::new(Vec::new());
        let compiler = crate::Compiler::new(
            parser::Parser::new(tokenizer::Tokenizer::from(String::from($source))),
            &mut writer,
            None,
        );
        compiler.compile()
    }};

    ($source:literal) => {{
        let mut writer = std::io::BufWriter::new(Vec::new());
        let compiler = crate::Compiler::new(
            parser::Parser::new(tokenizer::Tokenizer::from(indoc::indoc!($source))),
            &mut writer,
            None,
        );
        compiler.compile()?;
        output!(writer)
    }};
}

mod builtins;
mod device_access;
