//! `slangc` — front-end (lexer, parser, semantic analyzer) for a small,
//! statically-typed systems language.
//!
//! The pipeline is strictly sequential and single-threaded:
//!
//! ```text
//! source text -> Lexer -> [Token] -> Parser -> [ast::Node] -> Analyzer -> checked program
//! ```
//!
//! Every pass accumulates diagnostics into a shared [`error::DiagnosticSink`]
//! instead of aborting on the first problem; [`compile`] is the single entry
//! point that runs all three passes and reports whether any diagnostics were
//! produced.
//!
//! Persistent state (tokens, AST nodes, resolved types) lives in one
//! [`arena::Arena`] for the whole compilation and is freed in bulk when it is
//! dropped; nothing here is individually reclaimed.

#[cfg(not(feature = "internals"))]
mod arena;
#[cfg(feature = "internals")]
pub mod arena;
pub mod ast;
pub mod error;
mod position;
mod scope;
pub mod sema;
pub mod token;
#[cfg(not(feature = "internals"))]
mod trie;
#[cfg(feature = "internals")]
pub mod trie;
pub mod types;

pub mod parse;

pub use arena::Arena;
pub use error::{Diagnostic, DiagnosticSink};
pub use position::Position;

/// Default arena capacity for a single compilation unit: generous enough
/// that ordinary source files never hit the "out of memory" path, matching
/// the reference implementation's fixed-size startup allocation.
pub const DEFAULT_ARENA_CAPACITY: usize = 16 * 1024 * 1024;

/// Runs the full pipeline over `source`, returning the diagnostics produced
/// by any pass. An empty result means the source compiled cleanly.
///
/// The arena backing the lexer's tokens and the parser's/analyzer's
/// allocations is created internally and dropped when this function
/// returns; callers that need to keep inspecting the AST or resolved types
/// afterward should use [`lex`], [`parse::parse_program`] and
/// [`sema::Analyzer`] directly against an arena they own.
pub fn compile(source: &str) -> Vec<Diagnostic> {
    let arena = Arena::with_capacity(DEFAULT_ARENA_CAPACITY);
    let mut diagnostics = DiagnosticSink::new();
    let tokens = lex(source, &arena, &mut diagnostics);
    log::debug!("lexed {} tokens", tokens.len());
    let program = parse::parse_program(&tokens, &arena, &mut diagnostics);
    log::debug!("parsed {} top-level items", program.len());
    let mut analyzer = sema::Analyzer::new(&arena);
    analyzer.analyze(program, &mut diagnostics);
    diagnostics.into_diagnostics()
}

/// Tokenizes `source` into the arena, reporting lexical diagnostics
/// (`unclosed string literal`, `unclosed character literal`) as they're
/// found. Exposed directly for tooling (the `slang-tokens` driver, tests)
/// that only needs the lexer.
pub fn lex<'src, 'arena>(
    source: &'src str,
    arena: &'arena Arena,
    diagnostics: &mut DiagnosticSink,
) -> Vec<token::Token<'src>> {
    token::Lexer::new(source, arena).lex(diagnostics)
}
