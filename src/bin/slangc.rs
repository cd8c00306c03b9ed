//! Production CLI for the front-end: a single positional source path, an
//! optional `--emit` flag controlling what (if anything) is printed besides
//! diagnostics, and `RUST_LOG`-driven logging via `env_logger`. The
//! "hardcoded path" drivers (`slang-tokens`, `slang-ast`) are research/demo
//! tooling grounded in `original_source/cc.c`/`lc.c`; this binary is the
//! actual production entry point spec.md §6 describes.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};

use slangc::sema::Analyzer;
use slangc::{lex, parse, Arena, DiagnosticSink, DEFAULT_ARENA_CAPACITY};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Emit {
    /// Report diagnostics only (default).
    None,
    /// Print one line per lexical token.
    Tokens,
    /// Print the parsed AST, depth-indented.
    Ast,
}

/// Front-end (lex, parse, analyze) for a small statically-typed systems
/// language.
#[derive(Debug, Parser)]
#[command(name = "slangc", version, about)]
struct Cli {
    /// Path to the source file to compile.
    source: PathBuf,

    /// What to print in addition to diagnostics.
    #[arg(long, value_enum, default_value_t = Emit::None)]
    emit: Emit,
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let source = match read_source(&cli.source) {
        Ok(source) => source,
        Err(err) => {
            eprintln!("error: {err:#}");
            return ExitCode::FAILURE;
        }
    };

    let arena = Arena::with_capacity(DEFAULT_ARENA_CAPACITY);
    let mut diagnostics = DiagnosticSink::new();

    let tokens = lex(&source, &arena, &mut diagnostics);
    log::debug!("lexed {} tokens from {}", tokens.len(), cli.source.display());
    if cli.emit == Emit::Tokens {
        for token in &tokens {
            println!(
                "{:?} {:?} {}:{}",
                token.kind,
                token.text(),
                token.position.row,
                token.position.column
            );
        }
    }

    let program = parse::parse_program(&tokens, &arena, &mut diagnostics);
    log::debug!("parsed {} top-level items", program.len());
    if cli.emit == Emit::Ast {
        for node in program {
            println!("{node:#?}");
        }
    }

    let mut analyzer = Analyzer::new(&arena);
    analyzer.analyze(program, &mut diagnostics);

    for diagnostic in diagnostics.diagnostics() {
        eprintln!("{diagnostic}");
    }

    if diagnostics.had_errors() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn read_source(path: &PathBuf) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("could not read {}", path.display()))
}
