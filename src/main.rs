use clap::Parser;
use compiler::{Compiler, CompilerConfig};
use parser::Parser as ASTParser;
use std::{
    fs::File,
    io::{BufWriter, Read, Write},
    path::PathBuf,
};
use thiserror::Error;
use tokenizer::Tokenizer;
use tracing::debug;

#[derive(Error, Debug)]
enum Error {
    #[error(transparent)]
    Tokenizer(#[from] tokenizer::Error),

    #[error(transparent)]
    Compile(#[from] compiler::Error),

    #[error(transparent)]
    IO(#[from] std::io::Error),
}

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// What file should be compiled. If not set, input will be read from stdin.
    #[arg(short, long)]
    input_file: Option<PathBuf>,
    /// The output file for the compiled program. If not set, output will go to stdout.
    #[arg(short, long)]
    output_file: Option<PathBuf>,
    /// Annotate every instruction with a `#` comment describing it
    #[arg(short, long)]
    debug: bool,
}

fn run_logic(args: Args) -> Result<(), Error> {
    let tokenizer = match args.input_file {
        Some(input_path) => {
            debug!("reading {}", input_path.display());
            Tokenizer::from_path(input_path)?
        }
        None => {
            let mut buf = String::new();
            if std::io::stdin().lock().read_to_string(&mut buf)? == 0 {
                return Ok(());
            }
            Tokenizer::from(buf)
        }
    };

    let mut writer: BufWriter<Box<dyn Write>> = match args.output_file {
        Some(output_file) => BufWriter::new(Box::new(File::create(output_file)?)),
        None => BufWriter::new(Box::new(std::io::stdout())),
    };

    let config = CompilerConfig { debug: args.debug };
    Compiler::new(ASTParser::new(tokenizer), &mut writer, Some(config)).compile()?;
    writer.flush()?;

    Ok(())
}

fn main() -> anyhow::Result<()> {
    use tracing_subscriber::{EnvFilter, fmt};

    // RUST_LOG wins, warnings otherwise
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("warn"))?;
    fmt()
        .compact()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    run_logic(Args::parse())?;

    Ok(())
}
