//! Lexer scenarios and invariants from spec.md §8.

use slangc::token::TokenKind;
use slangc::{Arena, DiagnosticSink};

fn lex_kinds(source: &str) -> Vec<TokenKind> {
    let arena = Arena::with_capacity(4096);
    let mut diagnostics = DiagnosticSink::new();
    slangc::lex(source, &arena, &mut diagnostics)
        .iter()
        .map(|t| t.kind)
        .collect()
}

/// S1 — `a + 3.14 // tail\n"hi"` tokenizes to (Identifier, Plus, Float,
/// String), with `a`/`+`/`3.14` on row 1 and `"hi"` on row 2.
#[test]
fn s1_lexer_basic_stream_and_positions() {
    let source = "a + 3.14 // tail\n\"hi\"";
    let arena = Arena::with_capacity(4096);
    let mut diagnostics = DiagnosticSink::new();
    let tokens = slangc::lex(source, &arena, &mut diagnostics);

    let kinds: Vec<TokenKind> = tokens.iter().map(|t| t.kind).collect();
    assert_eq!(
        kinds,
        vec![
            TokenKind::Identifier,
            TokenKind::Plus,
            TokenKind::Float,
            TokenKind::String,
            TokenKind::End,
        ]
    );

    assert_eq!(tokens[0].position.row, 1);
    assert_eq!(tokens[1].position.row, 1);
    assert_eq!(tokens[2].position.row, 1);
    assert_eq!(tokens[3].position.row, 2);
    assert!(!diagnostics.had_errors());
}

/// Invariant 1 — lexing the same source twice yields identical token
/// sequences, positions included.
#[test]
fn lexing_is_deterministic() {
    let source = "struct s { a: u8; } main() -> i32 { return 1 + 2 * (3 - x); }";
    let arena1 = Arena::with_capacity(8192);
    let arena2 = Arena::with_capacity(8192);
    let mut d1 = DiagnosticSink::new();
    let mut d2 = DiagnosticSink::new();
    let tokens1 = slangc::lex(source, &arena1, &mut d1);
    let tokens2 = slangc::lex(source, &arena2, &mut d2);
    assert_eq!(tokens1.len(), tokens2.len());
    for (a, b) in tokens1.iter().zip(tokens2.iter()) {
        assert_eq!(a.kind, b.kind);
        assert_eq!(a.lexeme, b.lexeme);
        assert_eq!(a.position, b.position);
    }
}

#[test]
fn maximal_munch_prefers_the_longest_operator() {
    assert_eq!(
        lex_kinds(">>=  >>  >=  >"),
        vec![
            TokenKind::ShrEq,
            TokenKind::Shr,
            TokenKind::Ge,
            TokenKind::Gt,
            TokenKind::End
        ]
    );
}

#[test]
fn keywords_are_classified_via_the_reserved_word_table() {
    assert_eq!(
        lex_kinds("struct union enum loop goto"),
        vec![
            TokenKind::Struct,
            TokenKind::Union,
            TokenKind::Enum,
            TokenKind::Loop,
            TokenKind::Goto,
            TokenKind::End,
        ]
    );
}

#[test]
fn an_identifier_that_shares_a_keyword_prefix_stays_an_identifier() {
    assert_eq!(lex_kinds("structure"), vec![TokenKind::Identifier, TokenKind::End]);
}

#[test]
fn unclosed_string_literal_is_reported_at_the_opening_quote() {
    let arena = Arena::with_capacity(4096);
    let mut diagnostics = DiagnosticSink::new();
    let tokens = slangc::lex("\"abc\n", &arena, &mut diagnostics);
    assert_eq!(tokens[0].kind, TokenKind::Error);
    assert!(diagnostics.had_errors());
    assert_eq!(diagnostics.diagnostics()[0].message, "unclosed string literal");
    assert_eq!(diagnostics.diagnostics()[0].position.column, 0);
}

#[test]
fn unclosed_character_literal_is_reported() {
    let arena = Arena::with_capacity(4096);
    let mut diagnostics = DiagnosticSink::new();
    slangc::lex("'a", &arena, &mut diagnostics);
    assert!(diagnostics.had_errors());
    assert_eq!(diagnostics.diagnostics()[0].message, "unclosed character literal");
}

#[test]
fn escaped_char_literal_decodes_to_the_escape_byte() {
    let arena = Arena::with_capacity(4096);
    let mut diagnostics = DiagnosticSink::new();
    let tokens = slangc::lex("'\\n'", &arena, &mut diagnostics);
    assert_eq!(tokens[0].kind, TokenKind::Char);
    assert_eq!(slangc::token::decode_char_literal(tokens[0].lexeme), b'\n');
    assert!(!diagnostics.had_errors());
}

#[test]
fn line_comments_run_to_but_not_past_the_newline() {
    assert_eq!(
        lex_kinds("1 // comment with + and *\n2"),
        vec![TokenKind::Integer, TokenKind::Integer, TokenKind::End]
    );
}

#[test]
fn float_requires_a_digit_immediately_after_the_dot() {
    // `1..2` is two dots forming a range operator, not `1.` followed by `.2`.
    assert_eq!(
        lex_kinds("1..2"),
        vec![TokenKind::Integer, TokenKind::DotDot, TokenKind::Integer, TokenKind::End]
    );
}
