//! Maple interpreter command-line.
//!
//! When called without argument it drops into an interactive
//! read-evaluate-print loop.
//!
//! When called with arguments, it interprets the corresponding files in a
//! single interpreter session (so code and data sharing is possible).

use std::env;
use std::fs;
use std::io;
use std::io::prelude::*;

use anyhow::Context;

use maple::interpreter::Interpreter;
use maple::object::Value;

fn main() -> Result<(), anyhow::Error> {
    env_logger::init();

    let args = env::args().skip(1).collect::<Vec<_>>();
    if !args.is_empty() {
        run_all_files(args)?;
    } else {
        run_prompt()?;
    }
    Ok(())
}

fn run_all_files(paths: Vec<String>) -> Result<(), anyhow::Error> {
    let mut interp_stdout = io::stdout();
    let mut interp = Interpreter::new(&mut interp_stdout);

    for p in &paths {
        let src = fs::read_to_string(p).with_context(|| format!("failed to read {}", p))?;
        match interp.eval(&src) {
            Ok(Value::Error(message)) => eprintln!("ERROR: {}", message),
            Ok(_) => (),
            Err(errors) => {
                for error in errors.errors() {
                    eprintln!("{}", error);
                }
            }
        }
    }

    Ok(())
}

fn run_prompt() -> Result<(), io::Error> {
    let stdin = io::stdin();
    let mut repl_stdout = io::stdout();
    let mut interp_stdout = io::stdout();

    let mut interp = Interpreter::new(&mut interp_stdout);

    let mut input = String::new();
    loop {
        repl_stdout.write_all(b">> ")?;
        repl_stdout.flush()?;

        input.clear();
        let nbytes = stdin.read_line(&mut input)?;
        if nbytes == 0 {
            break;
        }

        match interp.eval(&input) {
            // Echo a top-level string with quotes so it reads as a value,
            // not as output.
            Ok(Value::Str(s)) => writeln!(repl_stdout, "\"{}\"", s)?,
            Ok(value) => writeln!(repl_stdout, "{}", value)?,
            Err(errors) => {
                for error in errors.errors() {
                    writeln!(repl_stdout, "! {}", error)?;
                }
            }
        }
    }

    Ok(())
}
