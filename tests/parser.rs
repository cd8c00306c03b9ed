//! Parser scenarios from spec.md §8: precedence, cast-vs-group
//! disambiguation, struct/function declarations, `for`-capture arity, and
//! panic-mode recovery.

use slangc::ast::{BinaryOp, NodeKind};
use slangc::{Arena, DiagnosticSink};

fn parse<'a>(
    arena: &'a Arena,
    source: &'static str,
    diagnostics: &mut DiagnosticSink,
) -> &'a [slangc::ast::Node<'a, 'static>] {
    let tokens = slangc::lex(source, arena, diagnostics);
    slangc::parse::parse_program(&tokens, arena, diagnostics)
}

#[test]
fn s2_additive_is_left_multiplicative_binds_tighter() {
    let arena = Arena::with_capacity(8192);
    let mut diagnostics = DiagnosticSink::new();
    let program = parse(&arena, "1 + 2 * 3;", &mut diagnostics);
    assert!(!diagnostics.had_errors());
    assert_eq!(program.len(), 1);
    let NodeKind::Binary { op: BinaryOp::Add, left, right } = program[0].kind else {
        panic!("expected top-level Add, got {:?}", program[0].kind);
    };
    assert!(matches!(left.kind, NodeKind::Integer(1)));
    let NodeKind::Binary { op: BinaryOp::Mul, left: ml, right: mr } = right.kind else {
        panic!("expected nested Mul, got {:?}", right.kind);
    };
    assert!(matches!(ml.kind, NodeKind::Integer(2)));
    assert!(matches!(mr.kind, NodeKind::Integer(3)));
}

#[test]
fn s2_parens_override_precedence() {
    let arena = Arena::with_capacity(8192);
    let mut diagnostics = DiagnosticSink::new();
    let program = parse(&arena, "(1 + 2) * 3;", &mut diagnostics);
    assert!(!diagnostics.had_errors());
    let NodeKind::Binary { op: BinaryOp::Mul, left, right } = program[0].kind else {
        panic!("expected top-level Mul, got {:?}", program[0].kind);
    };
    assert!(matches!(
        left.kind,
        NodeKind::Binary { op: BinaryOp::Add, .. }
    ));
    assert!(matches!(right.kind, NodeKind::Integer(3)));
}

#[test]
fn s3_parenthesized_ident_followed_by_expr_is_a_cast() {
    let arena = Arena::with_capacity(8192);
    let mut diagnostics = DiagnosticSink::new();
    let program = parse(&arena, "(x) y;", &mut diagnostics);
    assert!(!diagnostics.had_errors());
    let NodeKind::Cast { target_type, value } = program[0].kind else {
        panic!("expected Cast, got {:?}", program[0].kind);
    };
    assert!(matches!(target_type.kind, NodeKind::Identifier("x")));
    assert!(matches!(value.kind, NodeKind::Identifier("y")));
}

#[test]
fn s3_parenthesized_ident_alone_is_just_an_identifier() {
    let arena = Arena::with_capacity(8192);
    let mut diagnostics = DiagnosticSink::new();
    let program = parse(&arena, "(x);", &mut diagnostics);
    assert!(!diagnostics.had_errors());
    assert!(matches!(program[0].kind, NodeKind::Identifier("x")));
}

#[test]
fn struct_declaration_parses_members_in_order() {
    let arena = Arena::with_capacity(8192);
    let mut diagnostics = DiagnosticSink::new();
    let program = parse(&arena, "struct s { a: u8; b: u32; c: u8 }", &mut diagnostics);
    assert!(!diagnostics.had_errors());
    let NodeKind::Struct { name, members } = program[0].kind else {
        panic!("expected Struct, got {:?}", program[0].kind);
    };
    assert_eq!(name, "s");
    let names: Vec<&str> = members.iter().map(|m| m.name).collect();
    assert_eq!(names, vec!["a", "b", "c"]);
}

#[test]
fn function_declaration_parses_params_return_type_and_body() {
    let arena = Arena::with_capacity(8192);
    let mut diagnostics = DiagnosticSink::new();
    let program = parse(&arena, "add(a: i32, b: i32) -> i32 { return a + b; }", &mut diagnostics);
    assert!(!diagnostics.had_errors());
    let NodeKind::Function { name, params, body, .. } = program[0].kind else {
        panic!("expected Function, got {:?}", program[0].kind);
    };
    assert_eq!(name, "add");
    assert_eq!(params.len(), 2);
    let NodeKind::Compound { statements } = body.kind else {
        panic!("expected compound body");
    };
    assert_eq!(statements.len(), 1);
    assert!(matches!(statements[0].kind, NodeKind::Return { value: Some(_) }));
}

#[test]
fn for_loop_requires_matching_capture_and_slice_counts() {
    let arena = Arena::with_capacity(8192);
    let mut diagnostics = DiagnosticSink::new();
    parse(&arena, "f() -> void { loop (xs, ys) |x| { } }", &mut diagnostics);
    assert!(diagnostics.had_errors());
    assert!(diagnostics
        .diagnostics()
        .iter()
        .any(|d| d.message == "invalid number of captures"));
}

#[test]
fn for_loop_with_matching_captures_binds_one_per_slice() {
    let arena = Arena::with_capacity(8192);
    let mut diagnostics = DiagnosticSink::new();
    let program = parse(&arena, "f() -> void { loop (xs, ys) |x, y| { } }", &mut diagnostics);
    assert!(!diagnostics.had_errors());
    let NodeKind::Function { body, .. } = program[0].kind else {
        panic!("expected Function");
    };
    let NodeKind::Compound { statements } = body.kind else {
        panic!("expected compound body");
    };
    let NodeKind::For { slices, captures, .. } = statements[0].kind else {
        panic!("expected For, got {:?}", statements[0].kind);
    };
    assert_eq!(slices.len(), 2);
    assert_eq!(captures, &["x", "y"]);
}

#[test]
fn unterminated_block_is_reported_and_does_not_hang() {
    let arena = Arena::with_capacity(8192);
    let mut diagnostics = DiagnosticSink::new();
    parse(&arena, "f() -> void {", &mut diagnostics);
    assert!(diagnostics.had_errors());
    assert!(diagnostics
        .diagnostics()
        .iter()
        .any(|d| d.message == "Unterminated block"));
}

#[test]
fn panic_mode_recovery_continues_past_the_next_statement_starter() {
    let arena = Arena::with_capacity(8192);
    let mut diagnostics = DiagnosticSink::new();
    // A malformed struct member followed by a well-formed top-level struct:
    // the parser should resynchronize at `struct` and still parse the second
    // declaration instead of losing the rest of the file.
    let program = parse(&arena, "struct a { @@ } struct b { x: u8; }", &mut diagnostics);
    assert!(diagnostics.had_errors());
    assert!(program.iter().any(|n| matches!(n.kind, NodeKind::Struct { name: "b", .. })));
}

#[test]
fn call_with_no_arguments_parses() {
    let arena = Arena::with_capacity(8192);
    let mut diagnostics = DiagnosticSink::new();
    let program = parse(&arena, "f();", &mut diagnostics);
    assert!(!diagnostics.had_errors());
    assert!(matches!(program[0].kind, NodeKind::Call { name: "f", args } if args.is_empty()));
}

#[test]
fn call_with_arguments_requires_commas_between_them() {
    let arena = Arena::with_capacity(8192);
    let mut diagnostics = DiagnosticSink::new();
    let program = parse(&arena, "f(1, 2, 3);", &mut diagnostics);
    assert!(!diagnostics.had_errors());
    let NodeKind::Call { args, .. } = program[0].kind else {
        panic!("expected Call");
    };
    assert_eq!(args.len(), 3);
}

#[test]
fn integer_range_literal_parses_start_and_end() {
    let arena = Arena::with_capacity(8192);
    let mut diagnostics = DiagnosticSink::new();
    let program = parse(&arena, "0..10;", &mut diagnostics);
    assert!(!diagnostics.had_errors());
    let NodeKind::Range { start, end } = program[0].kind else {
        panic!("expected Range, got {:?}", program[0].kind);
    };
    assert!(matches!(start.kind, NodeKind::Integer(0)));
    assert!(matches!(end.kind, NodeKind::Integer(10)));
}
