//! Semantic analyzer scenarios and invariants from spec.md §8: struct
//! layout, cycle detection, and scope checking.

use slangc::sema::Analyzer;
use slangc::types::Type;
use slangc::{Arena, DiagnosticSink};

fn analyze<'a>(arena: &'a Arena, source: &'static str, diagnostics: &mut DiagnosticSink) -> Analyzer<'a> {
    let tokens = slangc::lex(source, arena, diagnostics);
    let program = slangc::parse::parse_program(&tokens, arena, diagnostics);
    let mut analyzer = Analyzer::new(arena);
    analyzer.analyze(program, diagnostics);
    analyzer
}

/// S4 — `struct S { a: u8; b: u32; c: u8 }` yields offsets (0, 4, 8),
/// alignment 4, size 12.
#[test]
fn s4_struct_layout_pads_members_to_their_alignment() {
    let arena = Arena::with_capacity(1 << 16);
    let mut diagnostics = DiagnosticSink::new();
    let analyzer = analyze(&arena, "struct s { a: u8; b: u32; c: u8 }", &mut diagnostics);
    assert!(!diagnostics.had_errors());

    let ty = analyzer.types().get("s").expect("struct s registered");
    let Type::Struct(aggregate) = ty else {
        panic!("expected Type::Struct, got {ty:?}");
    };
    let offsets: Vec<usize> = aggregate.members.iter().map(|m| m.offset).collect();
    assert_eq!(offsets, vec![0, 4, 8]);
    assert_eq!(aggregate.alignment, 4);
    assert_eq!(aggregate.size, 12);
}

/// Invariant 3 — every member's offset is at or past its predecessor's end,
/// aligned to its own alignment; the aggregate's size is a multiple of its
/// own alignment.
#[test]
fn invariant_3_struct_layout_never_overlaps_and_respects_alignment() {
    let arena = Arena::with_capacity(1 << 16);
    let mut diagnostics = DiagnosticSink::new();
    let analyzer = analyze(
        &arena,
        "struct s { a: u8; b: u64; c: u16; d: u8 }",
        &mut diagnostics,
    );
    assert!(!diagnostics.had_errors());
    let Type::Struct(aggregate) = analyzer.types().get("s").unwrap() else {
        panic!("expected struct");
    };
    let mut previous_end: Option<usize> = None;
    for member in &aggregate.members {
        if let Some(end) = previous_end {
            assert!(member.offset >= end);
        }
        assert_eq!(member.offset % member.ty.alignment(), 0);
        previous_end = Some(member.offset + member.ty.size());
    }
    assert_eq!(aggregate.size % aggregate.alignment, 0);
}

/// Invariant 4 — every union member sits at offset 0; size/alignment are
/// the max over members.
#[test]
fn invariant_4_union_members_all_share_offset_zero() {
    let arena = Arena::with_capacity(1 << 16);
    let mut diagnostics = DiagnosticSink::new();
    let analyzer = analyze(&arena, "union u { a: u8; b: u32; c: u16 }", &mut diagnostics);
    assert!(!diagnostics.had_errors());
    let Type::Union(aggregate) = analyzer.types().get("u").unwrap() else {
        panic!("expected union");
    };
    assert!(aggregate.members.iter().all(|m| m.offset == 0));
    assert_eq!(aggregate.size, 4);
    assert_eq!(aggregate.alignment, 4);
}

/// S5 — mutually embedding structs are an illegal cycle.
#[test]
fn s5_mutually_embedding_structs_report_a_cycle() {
    let arena = Arena::with_capacity(1 << 16);
    let mut diagnostics = DiagnosticSink::new();
    analyze(&arena, "struct a { b: b } struct b { a: a }", &mut diagnostics);
    assert!(diagnostics.had_errors());
    assert!(diagnostics
        .diagnostics()
        .iter()
        .any(|d| d.message == "cycling struct definition"));
}

#[test]
fn a_struct_member_of_type_void_is_rejected() {
    let arena = Arena::with_capacity(1 << 16);
    let mut diagnostics = DiagnosticSink::new();
    analyze(&arena, "struct s { a: void }", &mut diagnostics);
    assert!(diagnostics.had_errors());
    assert!(diagnostics
        .diagnostics()
        .iter()
        .any(|d| d.message == "a struct member can't be of type `void`"));
}

/// S6 (first half) — redeclaring a local in the same scope is an error at
/// the second declaration.
#[test]
fn s6_redeclared_local_variable_is_reported() {
    let arena = Arena::with_capacity(1 << 16);
    let mut diagnostics = DiagnosticSink::new();
    analyze(
        &arena,
        "f() -> void { static x: i32 = 1; static x: i32 = 2; }",
        &mut diagnostics,
    );
    assert!(diagnostics
        .diagnostics()
        .iter()
        .any(|d| d.message == "redeclaration of variable"));
}

/// S6 (second half) — an undeclared identifier used as a condition is
/// `unknown identifier`.
#[test]
fn s6_undeclared_identifier_in_a_while_condition_is_reported() {
    let arena = Arena::with_capacity(1 << 16);
    let mut diagnostics = DiagnosticSink::new();
    analyze(&arena, "g() -> void { while x { } }", &mut diagnostics);
    assert!(diagnostics
        .diagnostics()
        .iter()
        .any(|d| d.message == "unknown identifier"));
}

#[test]
fn break_outside_a_loop_is_reported() {
    let arena = Arena::with_capacity(1 << 16);
    let mut diagnostics = DiagnosticSink::new();
    analyze(&arena, "f() -> void { break; }", &mut diagnostics);
    assert!(diagnostics
        .diagnostics()
        .iter()
        .any(|d| d.message == "`break` isn't in a loop"));
}

#[test]
fn break_inside_a_for_loop_is_accepted() {
    let arena = Arena::with_capacity(1 << 16);
    let mut diagnostics = DiagnosticSink::new();
    analyze(
        &arena,
        "f() -> void { loop (0..10) |i| { break; } }",
        &mut diagnostics,
    );
    assert!(!diagnostics.had_errors());
}

#[test]
fn return_type_mismatch_is_reported() {
    let arena = Arena::with_capacity(1 << 16);
    let mut diagnostics = DiagnosticSink::new();
    analyze(&arena, "f() -> i32 { return; }", &mut diagnostics);
    assert!(diagnostics
        .diagnostics()
        .iter()
        .any(|d| d.message == "return type doesn't match function's one"));
}

#[test]
fn calling_an_unknown_function_is_reported() {
    let arena = Arena::with_capacity(1 << 16);
    let mut diagnostics = DiagnosticSink::new();
    analyze(&arena, "f() -> void { g(); }", &mut diagnostics);
    assert!(diagnostics
        .diagnostics()
        .iter()
        .any(|d| d.message == "unknown function"));
}

#[test]
fn redefining_a_function_is_reported() {
    let arena = Arena::with_capacity(1 << 16);
    let mut diagnostics = DiagnosticSink::new();
    analyze(
        &arena,
        "f() -> void { } f() -> void { }",
        &mut diagnostics,
    );
    assert!(diagnostics
        .diagnostics()
        .iter()
        .any(|d| d.message == "function already defined"));
}

#[test]
fn accessing_an_unknown_struct_member_is_reported() {
    let arena = Arena::with_capacity(1 << 16);
    let mut diagnostics = DiagnosticSink::new();
    analyze(
        &arena,
        "struct s { a: u8 } f() -> void { static v: s; v.missing; }",
        &mut diagnostics,
    );
    assert!(diagnostics
        .diagnostics()
        .iter()
        .any(|d| d.message == "struct doesn't have that member"));
}

#[test]
fn indexing_a_non_pointer_non_slice_is_reported() {
    let arena = Arena::with_capacity(1 << 16);
    let mut diagnostics = DiagnosticSink::new();
    analyze(&arena, "f() -> void { static v: i32 = 1; v[0]; }", &mut diagnostics);
    assert!(diagnostics
        .diagnostics()
        .iter()
        .any(|d| d.message == "only pointers and slices can be indexed"));
}

#[test]
fn mismatched_initializer_type_is_reported() {
    let arena = Arena::with_capacity(1 << 16);
    let mut diagnostics = DiagnosticSink::new();
    analyze(&arena, "f() -> void { static x: i32 = 1.5; }", &mut diagnostics);
    assert!(diagnostics.diagnostics().iter().any(|d| d.message == "type mismatch"));
}

#[test]
fn well_formed_program_with_struct_access_and_slice_parameters_type_checks_cleanly() {
    let arena = Arena::with_capacity(1 << 16);
    let mut diagnostics = DiagnosticSink::new();
    analyze(
        &arena,
        "struct point { x: i32; y: i32; } \
         get_x(p: point) -> i32 { return p.x; } \
         total(xs: [] i32) -> i32 { static acc: i32 = 0; loop (xs) |x| { acc += x; } return acc; }",
        &mut diagnostics,
    );
    assert!(!diagnostics.had_errors(), "{:?}", diagnostics.diagnostics());
}

/// Invariant 6 — a struct that embeds an earlier struct by value finalizes
/// after its dependency (the topological order is respected) and its size
/// reflects the fully laid-out dependency.
#[test]
fn invariant_6_dependent_aggregate_finalizes_after_its_dependency() {
    let arena = Arena::with_capacity(1 << 16);
    let mut diagnostics = DiagnosticSink::new();
    let analyzer = analyze(
        &arena,
        "struct inner { a: u32; b: u8 } struct outer { first: inner; second: u8 }",
        &mut diagnostics,
    );
    assert!(!diagnostics.had_errors());
    let Type::Struct(inner) = analyzer.types().get("inner").unwrap() else {
        panic!("expected struct inner");
    };
    assert_eq!(inner.size, 8);
    let Type::Struct(outer) = analyzer.types().get("outer").unwrap() else {
        panic!("expected struct outer");
    };
    assert_eq!(outer.members[0].offset, 0);
    assert_eq!(outer.members[1].offset, inner.size);
}
