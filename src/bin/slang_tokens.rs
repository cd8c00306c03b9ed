//! Tokenizer-only driver, mirroring `cc.c`: lex a hardcoded demo source file
//! and print one line per token. A thin wrapper, intentionally out of scope
//! for the front-end proper (spec.md §1) — the production entry point is
//! the `slangc` binary.

const DEMO_SOURCE_PATH: &str = "demos/hello_world.l";

fn main() {
    env_logger::init();

    let source = std::fs::read_to_string(DEMO_SOURCE_PATH).unwrap_or_else(|err| {
        eprintln!("failed to read {DEMO_SOURCE_PATH}: {err}");
        std::process::exit(1);
    });

    let arena = slangc::Arena::with_capacity(slangc::DEFAULT_ARENA_CAPACITY);
    let mut diagnostics = slangc::DiagnosticSink::new();
    let tokens = slangc::lex(&source, &arena, &mut diagnostics);

    for token in &tokens {
        println!(
            "{:?} {:?} {}:{}",
            token.kind,
            token.text(),
            token.position.row,
            token.position.column
        );
    }

    for diagnostic in diagnostics.diagnostics() {
        eprintln!("{diagnostic}");
    }

    if diagnostics.had_errors() {
        std::process::exit(1);
    }
}
