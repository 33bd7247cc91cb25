// ABOUTME: Minimal CLI shell: run a script file, or a plain REPL with multiline continuation

use std::path::PathBuf;
use std::process::ExitCode;

use asterisk::builtins::register_builtins;
use asterisk::eval::Evaluator;
use asterisk::module_loader::ModuleLoader;
use asterisk::parser::parse;
use asterisk::value::Value;
use clap::Parser;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

/// Asterisk: a small dynamically-typed scripting language.
#[derive(Parser, Debug)]
#[command(name = "asterisk", version)]
struct CliArgs {
    /// Script file to execute. If omitted, starts an interactive REPL.
    #[arg(value_name = "FILE")]
    script: Option<PathBuf>,
}

fn main() -> ExitCode {
    let args = CliArgs::parse();

    match args.script {
        Some(path) => match asterisk::run_file(&path) {
            Ok(_) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("{e}");
                ExitCode::FAILURE
            }
        },
        None => repl(),
    }
}

/// A thin line-reading loop. Lines are accumulated until they parse as a
/// complete program (using the incomplete-input oracle to distinguish "keep
/// reading" from "this is a hard error"), then evaluated. A single
/// `Evaluator` instance lives for the whole session, so later input sees
/// bindings made by earlier input.
fn repl() -> ExitCode {
    let mut rl = match DefaultEditor::new() {
        Ok(rl) => rl,
        Err(e) => {
            eprintln!("failed to initialize line editor: {e}");
            return ExitCode::FAILURE;
        }
    };

    let builtins = register_builtins();
    let loader = ModuleLoader::new(builtins.clone());
    let mut evaluator = Evaluator::with_module_loader(builtins, PathBuf::from("."), loader);

    let mut buffer = String::new();
    loop {
        let prompt = if buffer.is_empty() { "> " } else { "... " };
        match rl.readline(prompt) {
            Ok(line) => {
                let _ = rl.add_history_entry(line.as_str());
                if !buffer.is_empty() {
                    buffer.push('\n');
                }
                buffer.push_str(&line);

                if asterisk::is_incomplete(&buffer) {
                    continue;
                }

                match parse(&buffer).and_then(|tree| evaluator.run_with_dir(&tree, None)) {
                    Ok(Some(value)) => print_result(&value),
                    Ok(None) => {}
                    Err(e) => eprintln!("{e}"),
                }
                buffer.clear();
            }
            Err(ReadlineError::Interrupted) => {
                buffer.clear();
                continue;
            }
            Err(ReadlineError::Eof) => return ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("{e}");
                return ExitCode::FAILURE;
            }
        }
    }
}

fn print_result(value: &Value) {
    println!("{value}");
}
