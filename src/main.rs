mod ast;
mod config;
mod env;
mod error;
mod interpreter;
mod lexer;
mod parser;
mod token;
mod value;

use clap::Parser;
use error::{Diagnostic, InterpreterError};
use parser::parse;
use std::path::PathBuf;
use std::process::ExitCode;

/// Runs a script written in the language.
#[derive(Parser, Debug)]
#[command(name = "miniflow")]
#[command(version = config::VERSION)]
#[command(about = "Runs a script written in the language")]
struct CliArgs {
    /// Source file to execute.
    script: PathBuf,
}

fn main() -> ExitCode {
    let args = CliArgs::parse();
    match run(&args.script) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}", render(&err));
            ExitCode::FAILURE
        }
    }
}

fn run(script: &PathBuf) -> Result<(), InterpreterError> {
    let source = std::fs::read_to_string(script)?;
    let (program, lexical_errors, syntactic_error) = parse(&source);

    for err in &lexical_errors {
        eprintln!("{}", err.render());
    }
    if let Some(err) = syntactic_error {
        return Err(err.into());
    }
    if let Some(err) = lexical_errors.into_iter().find(|e| e.terminating()) {
        return Err(err.into());
    }

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    interpreter::run(&program, &mut out)?;
    Ok(())
}

fn render(err: &InterpreterError) -> String {
    match err {
        InterpreterError::Io(e) => format!("could not open source file: {e}"),
        InterpreterError::Lexical(e) => e.render(),
        InterpreterError::Syntactic(e) => e.render(),
        InterpreterError::Semantic(e) => e.render(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_an_io_error() {
        let err = run(&PathBuf::from("/nonexistent/path/to/script.lang")).unwrap_err();
        assert!(matches!(err, InterpreterError::Io(_)));
    }
}
