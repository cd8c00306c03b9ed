//! Semantic analysis: type-graph ordering, C-style layout, prototypes, and
//! per-function body checking with expression typing.
//!
//! Built directly from `spec.md` §4.5's fully-specified rules rather than
//! ported from `original_source/sema.c`'s `register_struct`/`register_union`/
//! `register_type` — those are incomplete stubs in the reference (no real
//! offset math), so there is nothing there worth imitating beyond the shape
//! of the registration tables themselves.

use ahash::{AHashMap, AHashSet};

use crate::arena::Arena;
use crate::ast::{Node, NodeKind};
use crate::error::{messages, DiagnosticSink};
use crate::position::Position;
use crate::scope::ScopeStack;
use crate::types::{Aggregate, EnumType, Prototype, Type, TypeMember, WORD_SIZE};

/// Registry of every type and function prototype a compilation unit
/// declares, plus the primitive types every analysis starts with.
pub struct Analyzer<'a> {
    arena: &'a Arena,
    types: AHashMap<&'a str, &'a Type<'a>>,
    prototypes: AHashMap<&'a str, Prototype<'a>>,
}

struct AggregateDecl<'a, 'src> {
    name: &'src str,
    is_union: bool,
    members: &'a [crate::ast::Member<'a, 'src>],
    position: Position,
}

impl<'a> Analyzer<'a> {
    pub fn new(arena: &'a Arena) -> Self {
        let mut analyzer = Self {
            arena,
            types: AHashMap::new(),
            prototypes: AHashMap::new(),
        };
        analyzer.register_primitives();
        analyzer
    }

    fn register_primitives(&mut self) {
        self.register_named(Type::Void, "void");
        self.register_named(Type::Bool, "bool");
        for bits in [8u8, 16, 32, 64] {
            self.register_named(Type::Integer(bits), &format!("i{bits}"));
            self.register_named(Type::UInteger(bits), &format!("u{bits}"));
        }
        self.register_named(Type::Float(32), "f32");
        self.register_named(Type::Float(64), "f64");
    }

    fn register_named(&mut self, ty: Type<'a>, name: &str) {
        let interned = self.arena.alloc_str(name);
        let ty_ref = self.arena.alloc(ty);
        self.types.insert(interned, ty_ref);
    }

    pub fn types(&self) -> &AHashMap<&'a str, &'a Type<'a>> {
        &self.types
    }

    pub fn prototypes(&self) -> &AHashMap<&'a str, Prototype<'a>> {
        &self.prototypes
    }

    /// Runs every analysis pass over a parsed program, in the order
    /// `spec.md` §5 prescribes: order types, lay them out, register
    /// prototypes, then check bodies.
    pub fn analyze<'src>(&mut self, program: &'a [Node<'a, 'src>], diagnostics: &mut DiagnosticSink) {
        let mut declared: AHashSet<&str> = AHashSet::new();
        let mut aggregates = Vec::new();
        let mut enums = Vec::new();
        let mut functions = Vec::new();

        for node in program {
            match &node.kind {
                NodeKind::Struct { name, members } => {
                    push_aggregate_decl(&mut declared, &mut aggregates, name, false, members, node.position, diagnostics);
                }
                NodeKind::Union { name, members } => {
                    push_aggregate_decl(&mut declared, &mut aggregates, name, true, members, node.position, diagnostics);
                }
                NodeKind::Enum { name, variants } => {
                    if !declared.insert(name) {
                        diagnostics.report(node.position, messages::TYPE_ALREADY_DEFINED);
                        continue;
                    }
                    enums.push((*name, *variants, node.position));
                }
                NodeKind::Function { .. } => functions.push(node),
                _ => {}
            }
        }

        let order = self.topological_order(&aggregates, diagnostics);
        for &index in &order {
            self.layout_aggregate(&aggregates[index], diagnostics);
        }
        for (name, variants, _position) in enums {
            self.register_enum(name, variants);
        }

        for node in &functions {
            self.register_prototype(node, diagnostics);
        }
        for node in &functions {
            self.check_function_body(node, diagnostics);
        }
    }

    /// Kahn's algorithm over the "member type refers to another aggregate by
    /// bare name" dependency graph. Returns the indices of `aggregates` that
    /// could be fully ordered; any left out are involved in a cycle, already
    /// reported.
    fn topological_order(&self, aggregates: &[AggregateDecl<'a, '_>], diagnostics: &mut DiagnosticSink) -> Vec<usize> {
        let index_of: AHashMap<&str, usize> = aggregates
            .iter()
            .enumerate()
            .map(|(i, decl)| (decl.name, i))
            .collect();

        let mut indegree = vec![0usize; aggregates.len()];
        let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); aggregates.len()];
        for (i, decl) in aggregates.iter().enumerate() {
            for member in decl.members {
                if let NodeKind::Identifier(type_name) = member.type_node.kind {
                    if let Some(&j) = index_of.get(type_name) {
                        if j != i {
                            dependents[j].push(i);
                            indegree[i] += 1;
                        }
                    }
                }
            }
        }

        let mut queue: Vec<usize> = (0..aggregates.len()).filter(|&i| indegree[i] == 0).collect();
        let mut order = Vec::with_capacity(aggregates.len());
        while let Some(i) = queue.pop() {
            order.push(i);
            for &dependent in &dependents[i] {
                indegree[dependent] -= 1;
                if indegree[dependent] == 0 {
                    queue.push(dependent);
                }
            }
        }

        if order.len() < aggregates.len() {
            let position = aggregates
                .iter()
                .enumerate()
                .find(|(i, _)| !order.contains(i))
                .map(|(_, decl)| decl.position)
                .unwrap_or(Position::NONE);
            diagnostics.report(position, messages::CYCLING_STRUCT_DEFINITION);
        }
        order
    }

    fn layout_aggregate(&mut self, decl: &AggregateDecl<'a, '_>, diagnostics: &mut DiagnosticSink) {
        let mut members = Vec::with_capacity(decl.members.len());
        let mut offset = 0usize;
        let mut alignment = 1usize;
        let mut max_member_size = 0usize;

        for member in decl.members {
            let Some(ty) = self.resolve_type_node(member.type_node, diagnostics) else {
                continue;
            };
            let size = ty.size();
            let member_align = ty.alignment().max(1);
            if size == 0 {
                diagnostics.report(member.position, messages::STRUCT_MEMBER_VOID);
                continue;
            }
            alignment = alignment.max(member_align);
            max_member_size = max_member_size.max(size);
            let member_offset = if decl.is_union {
                0
            } else {
                let padded = round_up(offset, member_align);
                offset = padded + size;
                padded
            };
            members.push(TypeMember {
                name: self.arena.alloc_str(member.name),
                ty,
                offset: member_offset,
            });
        }

        let size = if decl.is_union {
            round_up(max_member_size, alignment)
        } else {
            round_up(offset, alignment.max(1))
        };

        let aggregate = self.arena.alloc(Aggregate {
            name: self.arena.alloc_str(decl.name),
            members,
            size,
            alignment,
        });
        let ty = if decl.is_union {
            Type::Union(aggregate)
        } else {
            Type::Struct(aggregate)
        };
        let ty_ref = self.arena.alloc(ty);
        self.types.insert(self.arena.alloc_str(decl.name), ty_ref);
    }

    fn register_enum(&mut self, name: &str, variants: &[&str]) {
        let interned_variants = variants.iter().map(|v| self.arena.alloc_str(v)).collect();
        let enum_type = self.arena.alloc(EnumType {
            name: self.arena.alloc_str(name),
            variants: interned_variants,
        });
        let ty_ref = self.arena.alloc(Type::Enum(enum_type));
        self.types.insert(self.arena.alloc_str(name), ty_ref);
    }

    fn register_prototype(&mut self, node: &Node<'a, '_>, diagnostics: &mut DiagnosticSink) {
        let NodeKind::Function { name, params, return_type, .. } = node.kind else {
            return;
        };
        if self.prototypes.contains_key(name) {
            diagnostics.report(node.position, messages::FUNCTION_ALREADY_DEFINED);
            return;
        }
        let Some(return_ty) = self.resolve_type_node(return_type, diagnostics) else {
            return;
        };
        let mut parameters = Vec::with_capacity(params.len());
        for param in params {
            let Some(ty) = self.resolve_type_node(param.type_node, diagnostics) else {
                return;
            };
            parameters.push(ty);
        }
        let interned_name = self.arena.alloc_str(name);
        self.prototypes.insert(
            interned_name,
            Prototype {
                name: interned_name,
                return_type: return_ty,
                parameters,
            },
        );
    }

    fn check_function_body(&self, node: &Node<'a, '_>, diagnostics: &mut DiagnosticSink) {
        let NodeKind::Function { params, return_type, body, .. } = node.kind else {
            return;
        };
        let Some(return_ty) = self.resolve_type_node(return_type, diagnostics) else {
            return;
        };
        let mut scope = ScopeStack::new();
        scope.push();
        for param in params {
            if let Some(ty) = self.resolve_type_node(param.type_node, diagnostics) {
                scope.bind(self.arena.alloc_str(param.name), ty);
            }
        }
        let statements = match body.kind {
            NodeKind::Compound { statements } => statements,
            _ => &[],
        };
        self.check_block(statements, &mut scope, false, return_ty, diagnostics);
    }

    fn check_block(
        &self,
        statements: &[Node<'a, '_>],
        scope: &mut ScopeStack<'a>,
        in_loop: bool,
        return_type: &'a Type<'a>,
        diagnostics: &mut DiagnosticSink,
    ) {
        for statement in statements {
            self.check_statement(statement, scope, in_loop, return_type, diagnostics);
        }
    }

    fn check_statement(
        &self,
        node: &Node<'a, '_>,
        scope: &mut ScopeStack<'a>,
        in_loop: bool,
        return_type: &'a Type<'a>,
        diagnostics: &mut DiagnosticSink,
    ) {
        match &node.kind {
            NodeKind::Return { value } => match value {
                Some(expr) => {
                    if let Some(ty) = self.type_of(expr, scope, diagnostics) {
                        if !ty.type_eq(return_type) {
                            diagnostics.report(node.position, messages::RETURN_TYPE_MISMATCH);
                        }
                    }
                }
                None => {
                    if !matches!(return_type, Type::Void) {
                        diagnostics.report(node.position, messages::RETURN_TYPE_MISMATCH);
                    }
                }
            },
            NodeKind::Break => {
                if !in_loop {
                    diagnostics.report(node.position, messages::BREAK_NOT_IN_LOOP);
                }
            }
            NodeKind::While { condition, body } => {
                self.check_condition_is_bool(condition, scope, diagnostics);
                scope.push();
                self.check_block(statements_of(body), scope, true, return_type, diagnostics);
                scope.pop();
            }
            NodeKind::If { condition, body } => {
                self.check_condition_is_bool(condition, scope, diagnostics);
                scope.push();
                self.check_block(statements_of(body), scope, in_loop, return_type, diagnostics);
                scope.pop();
            }
            NodeKind::For { slices, captures, body } => {
                scope.push();
                for (slice, capture) in slices.iter().zip(captures.iter()) {
                    if let Some(ty) = self.type_of(slice, scope, diagnostics) {
                        scope.bind(self.arena.alloc_str(capture), ty);
                    }
                }
                self.check_block(statements_of(body), scope, true, return_type, diagnostics);
                scope.pop();
            }
            NodeKind::VarDecl { name, type_node, value } => {
                if scope.is_declared_in_current_scope(name) {
                    diagnostics.report(node.position, messages::REDECLARATION_OF_VARIABLE);
                    return;
                }
                let Some(declared_ty) = self.resolve_type_node(type_node, diagnostics) else {
                    return;
                };
                if let Some(value_expr) = value {
                    if let Some(value_ty) = self.type_of(value_expr, scope, diagnostics) {
                        if !value_ty.type_eq(declared_ty) {
                            diagnostics.report(node.position, messages::TYPE_MISMATCH);
                        }
                    }
                }
                scope.bind(self.arena.alloc_str(name), declared_ty);
            }
            NodeKind::Compound { statements } => {
                scope.push();
                self.check_block(statements, scope, in_loop, return_type, diagnostics);
                scope.pop();
            }
            NodeKind::Goto { .. } | NodeKind::Label { .. } | NodeKind::Import { .. } => {}
            _ => {
                self.type_of(node, scope, diagnostics);
            }
        }
    }

    fn check_condition_is_bool(&self, condition: &Node<'a, '_>, scope: &mut ScopeStack<'a>, diagnostics: &mut DiagnosticSink) {
        if let Some(ty) = self.type_of(condition, scope, diagnostics) {
            if !matches!(ty, Type::Bool) {
                diagnostics.report(condition.position, messages::EXPECTED_BOOLEAN_VALUE);
            }
        }
    }

    /// Resolves a type-expression node (`Identifier` or `PtrType`) to a
    /// registered type, interning and registering it on first use.
    fn resolve_type_node(&self, node: &Node<'a, '_>, diagnostics: &mut DiagnosticSink) -> Option<&'a Type<'a>> {
        match &node.kind {
            NodeKind::Identifier(name) => match self.types.get(name) {
                Some(ty) => Some(*ty),
                None => {
                    diagnostics.report(node.position, messages::UNKNOWN_TYPE);
                    None
                }
            },
            NodeKind::PtrType {
                child,
                is_slice,
                is_const,
                is_volatile,
            } => {
                let child_ty = self.resolve_type_node(child, diagnostics)?;
                let ty = if *is_slice {
                    Type::Slice {
                        child: child_ty,
                        len: None,
                        is_const: *is_const,
                        is_volatile: *is_volatile,
                    }
                } else {
                    Type::Ptr {
                        child: child_ty,
                        is_const: *is_const,
                        is_volatile: *is_volatile,
                    }
                };
                Some(self.arena.alloc(ty))
            }
            _ => None,
        }
    }

    /// Computes the type of an expression node, per `spec.md` §4.5.4's
    /// typing table. `Ternary`/`StructInit`/`Switch` never appear here: the
    /// parser refuses to construct them (see `SPEC_FULL.md` §4.5).
    fn type_of(&self, node: &Node<'a, '_>, scope: &mut ScopeStack<'a>, diagnostics: &mut DiagnosticSink) -> Option<&'a Type<'a>> {
        match &node.kind {
            NodeKind::Integer(_) => self.types.get("i32").copied(),
            NodeKind::Float(_) => self.types.get("f64").copied(),
            NodeKind::Char(_) => self.types.get("u8").copied(),
            NodeKind::String(bytes) => {
                let child = self.types.get("u8").copied()?;
                Some(self.arena.alloc(Type::Slice {
                    child,
                    len: Some(bytes.len()),
                    is_const: true,
                    is_volatile: false,
                }))
            }
            NodeKind::Range { start, end } => {
                let (NodeKind::Integer(start), NodeKind::Integer(end)) = (start.kind, end.kind) else {
                    return None;
                };
                // `usize` has no surface type name in this language; ranges
                // are characterized by the host word's unsigned width.
                let child = self.arena.alloc(Type::UInteger((WORD_SIZE * 8) as u8));
                Some(self.arena.alloc(Type::Slice {
                    child,
                    len: Some(end.saturating_sub(start) as usize),
                    is_const: true,
                    is_volatile: false,
                }))
            }
            NodeKind::Identifier(name) => match scope.resolve(name) {
                Some(ty) => Some(ty),
                None => {
                    diagnostics.report(node.position, messages::UNKNOWN_IDENTIFIER);
                    None
                }
            },
            NodeKind::Cast { target_type, value } => {
                self.type_of(value, scope, diagnostics);
                self.resolve_type_node(target_type, diagnostics)
            }
            NodeKind::Unary { operand, .. } | NodeKind::Postfix { operand, .. } => self.type_of(operand, scope, diagnostics),
            NodeKind::Binary { op, left, right } => {
                let lt = self.type_of(left, scope, diagnostics)?;
                let rt = self.type_of(right, scope, diagnostics)?;
                if !lt.type_eq(rt) {
                    diagnostics.report(node.position, messages::TYPE_MISMATCH);
                }
                if op.is_comparison_or_logical() {
                    self.types.get("bool").copied()
                } else if op.is_assignment() {
                    self.types.get("void").copied()
                } else {
                    Some(lt)
                }
            }
            NodeKind::Subscript { base, index } => {
                let bt = self.type_of(base, scope, diagnostics)?;
                self.type_of(index, scope, diagnostics);
                match bt {
                    Type::Ptr { child, .. } | Type::Slice { child, .. } => Some(*child),
                    _ => {
                        diagnostics.report(node.position, messages::ONLY_PTR_SLICE_INDEXABLE);
                        None
                    }
                }
            }
            NodeKind::Access { base, member } => {
                let bt = self.type_of(base, scope, diagnostics)?;
                let NodeKind::Identifier(member_name) = member.kind else {
                    return None;
                };
                let aggregate = match bt {
                    Type::Struct(agg) | Type::Union(agg) => Some(agg),
                    _ => None,
                };
                match aggregate.and_then(|agg| agg.members.iter().find(|m| m.name == member_name)) {
                    Some(member) => Some(member.ty),
                    None => {
                        diagnostics.report(node.position, messages::STRUCT_HAS_NO_MEMBER);
                        None
                    }
                }
            }
            NodeKind::Call { name, args } => {
                for arg in *args {
                    self.type_of(arg, scope, diagnostics);
                }
                match self.prototypes.get(name) {
                    Some(prototype) => Some(prototype.return_type),
                    None => {
                        diagnostics.report(node.position, messages::UNKNOWN_FUNCTION);
                        None
                    }
                }
            }
            _ => None,
        }
    }
}

fn statements_of<'a, 'src>(node: &'a Node<'a, 'src>) -> &'a [Node<'a, 'src>] {
    match node.kind {
        NodeKind::Compound { statements } => statements,
        _ => &[],
    }
}

fn round_up(value: usize, alignment: usize) -> usize {
    if alignment <= 1 {
        return value;
    }
    (value + alignment - 1) & !(alignment - 1)
}

#[allow(clippy::too_many_arguments)]
fn push_aggregate_decl<'a, 'src>(
    declared: &mut AHashSet<&'src str>,
    aggregates: &mut Vec<AggregateDecl<'a, 'src>>,
    name: &'src str,
    is_union: bool,
    members: &'a [crate::ast::Member<'a, 'src>],
    position: Position,
    diagnostics: &mut DiagnosticSink,
) {
    if !declared.insert(name) {
        diagnostics.report(position, messages::TYPE_ALREADY_DEFINED);
        return;
    }
    aggregates.push(AggregateDecl {
        name,
        is_union,
        members,
        position,
    });
}
