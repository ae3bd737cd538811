use crate::machine::Machine;
use compiler::{Compiler, CompilerConfig};
use parser::Parser;
use tokenizer::Tokenizer;

/// Compiles `source` and returns the listing, one instruction per line.
pub fn compile(source: &str, debug: bool) -> anyhow::Result<String> {
    let mut writer = std::io::BufWriter::new(Vec::new());
    let compiler = Compiler::new(
        Parser::new(Tokenizer::from(source)),
        &mut writer,
        Some(CompilerConfig { debug }),
    );
    compiler.compile()?;

    Ok(String::from_utf8(writer.into_inner()?)?)
}

/// Compiles `source` and loads it into a fresh machine.
pub fn load(source: &str) -> anyhow::Result<Machine> {
    Machine::new(&compile(source, false)?)
}

/// Compiles and runs `source` until it halts, yields or runs out of budget.
pub fn run(source: &str) -> anyhow::Result<Machine> {
    let mut machine = load(source)?;
    machine.execute()?;
    Ok(machine)
}
