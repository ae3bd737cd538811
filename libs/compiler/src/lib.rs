#[cfg(test)]
mod test;

mod control_flow;
mod device;
mod expression;
pub mod instruction;
pub mod labels;
pub mod lookahead;
mod session;
pub mod symbols;
pub mod variable_manager;

pub use instruction::Program;
pub use session::{CompilationSession, Value};

use parser::Parser as ASTParser;
use quick_error::quick_error;
use std::io::{BufWriter, Write};
use tracing::debug;

quick_error! {
    #[derive(Debug)]
    pub enum Error {
        Syntax(error: parser::Error) {
            from()
            display("SyntaxError: {}", error)
        }
        UnboundLocal(name: String) {
            display("UnboundLocalError: local variable '{}' referenced before assignment", name)
        }
        Attribute(object: String, attribute: String) {
            display("AttributeError: '{}' object has no attribute '{}'", object, attribute)
        }
        Name(name: String) {
            display("NameError: name '{}' is not defined", name)
        }
        CannotSet(attribute: String) {
            display("AttributeError: can't set attribute '{}'", attribute)
        }
        MissingArguments(function: String, missing: usize) {
            display("TypeError: {}() missing {} required positional argument", function, missing)
        }
        TooManyArguments(function: String, required: usize, given: usize) {
            display("TypeError: {}() takes {} positional arguments but {} were given", function, required, given)
        }
        Type(reason: String) {
            display("TypeError: {}", reason)
        }
        InvalidDevice(device: String, reason: String) {
            display("`{}` is not a valid device: {}", device, reason)
        }
        Code(reason: String) {
            display("CodeError: {}", reason)
            from(error: variable_manager::Error) -> (error.to_string())
            from(error: labels::Error) -> (error.to_string())
        }
        Io(error: std::io::Error) {
            from()
            display("IO Error: {}", error)
        }
    }
}

#[derive(Default)]
#[repr(C)]
pub struct CompilerConfig {
    /// Append each instruction's description as a `#` comment
    pub debug: bool,
}

pub struct Compiler<'a, W: std::io::Write> {
    parser: ASTParser,
    output: &'a mut BufWriter<W>,
    config: CompilerConfig,
}

impl<'a, W: std::io::Write> Compiler<'a, W> {
    pub fn new(
        parser: ASTParser,
        writer: &'a mut BufWriter<W>,
        config: Option<CompilerConfig>,
    ) -> Self {
        Self {
            parser,
            output: writer,
            config: config.unwrap_or_default(),
        }
    }

    /// Parses the whole input, lowers it and writes the program, one
    /// instruction per line.
    pub fn compile(mut self) -> Result<(), Error> {
        let root = self.parser.parse_all()?;
        let program = CompilationSession::new().compile(&root)?;

        debug!("writing {} instructions", program.len());
        program.write(self.output, self.config.debug)?;
        self.output.flush()?;

        Ok(())
    }
}
