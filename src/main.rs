// larch - A small Clojure-ish runtime centred on protocols, records and atoms
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! The `larch` command line.
//!
//! - `larch --version` prints the version.
//! - `larch FILE...` evaluates `.lch` / `.clj` files in order.
//! - `larch` with no arguments starts a REPL.
//!
//! Set `RUST_LOG=larch=debug` (or `trace`) to see definitions and protocol
//! dispatch as they happen. `LARCH_MAX_EVAL_DEPTH` overrides the recursion
//! limit.

use std::env;
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::process;
use std::sync::Once;

use larch_core::{Env, eval, register_builtins, set_max_eval_depth};
use larch_parser::Parser;
use tracing::debug;

static TRACING_INIT: Once = Once::new();

/// Install a `tracing` subscriber, but only when `RUST_LOG` is set.
fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{EnvFilter, fmt, prelude::*};

        if env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .init();
        }
    });
}

fn main() {
    init_tracing();

    let args: Vec<String> = env::args().collect();

    if args.len() == 2 && (args[1] == "--version" || args[1] == "-v") {
        println!("Larch v{}", env!("CARGO_PKG_VERSION"));
        return;
    }

    if let Ok(depth) = env::var("LARCH_MAX_EVAL_DEPTH") {
        match depth.parse::<usize>() {
            Ok(depth) if depth > 0 => {
                set_max_eval_depth(depth);
            }
            _ => eprintln!("Ignoring invalid LARCH_MAX_EVAL_DEPTH '{}'", depth),
        }
    }

    let env = Env::new();
    register_builtins(&env);

    if args.len() > 1 {
        run_files(&args[1..], &env);
    } else {
        run_repl(&env);
    }
}

/// Evaluate a sequence of source files
fn run_files(files: &[String], env: &Env) {
    for file_path in files {
        let result = eval_file(file_path, env);
        report_diagnostics(env);
        if let Err(e) = result {
            eprintln!("{}", e);
            process::exit(1);
        }
    }
}

/// Evaluate a single source file
fn eval_file(file_path: &str, env: &Env) -> Result<(), String> {
    let path = Path::new(file_path);

    match path.extension().and_then(|e| e.to_str()) {
        Some("lch") | Some("clj") => {}
        Some(ext) => {
            return Err(format!(
                "Error: unsupported file extension '.{}' for '{}'",
                ext, file_path
            ));
        }
        None => {
            return Err(format!(
                "Error: file '{}' has no extension (expected .lch or .clj)",
                file_path
            ));
        }
    }

    debug!(target: "larch", file = %file_path, "evaluating file");
    let source =
        fs::read_to_string(path).map_err(|e| format!("Error reading '{}': {}", file_path, e))?;

    let mut parser =
        Parser::new(&source).map_err(|e| format!("Parse error in '{}': {}", file_path, e))?;

    loop {
        match parser.parse() {
            Ok(Some(expr)) => {
                eval(&expr, env).map_err(|e| format!("Error in '{}': {}", file_path, e))?;
            }
            Ok(None) => break,
            Err(e) => return Err(format!("Parse error in '{}': {}", file_path, e)),
        }
    }

    Ok(())
}

/// Print and clear the warnings and errors collected so far.
fn report_diagnostics(env: &Env) {
    for diagnostic in env.registry().diagnostics().take() {
        eprintln!("{}", diagnostic);
    }
}

/// Run the interactive REPL
fn run_repl(env: &Env) {
    println!("Larch v{}", env!("CARGO_PKG_VERSION"));

    loop {
        print!("larch=> ");
        if io::stdout().flush().is_err() {
            break;
        }

        let mut input = String::new();
        match io::stdin().read_line(&mut input) {
            Ok(0) => {
                println!();
                break;
            }
            Ok(_) => {
                let input = input.trim();
                if input.is_empty() {
                    continue;
                }

                match Parser::new(input) {
                    Ok(mut parser) => loop {
                        match parser.parse() {
                            Ok(Some(expr)) => match eval(&expr, env) {
                                Ok(result) => {
                                    report_diagnostics(env);
                                    println!("{}", result);
                                }
                                Err(e) => {
                                    report_diagnostics(env);
                                    eprintln!("Error: {}", e);
                                    break;
                                }
                            },
                            Ok(None) => break,
                            Err(e) => {
                                eprintln!("Parse error: {}", e);
                                break;
                            }
                        }
                    },
                    Err(e) => eprintln!("Parse error: {}", e),
                }
            }
            Err(e) => {
                eprintln!("Read error: {}", e);
                break;
            }
        }
    }
}
