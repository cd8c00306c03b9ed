//! Parser-dump driver, mirroring `lc.c`'s `print_ast`: lex and parse a
//! hardcoded demo source file, then print the resulting AST with
//! depth-indented lines, one arm per `Node` variant. A thin wrapper,
//! intentionally out of scope for the front-end proper (spec.md §1).

use slangc::ast::{BinaryOp, Member, Node, NodeKind, UnaryOp};

const DEMO_SOURCE_PATH: &str = "demos/hello_world.l";

fn binary_op_str(op: BinaryOp) -> &'static str {
    match op {
        BinaryOp::Add => "+",
        BinaryOp::Sub => "-",
        BinaryOp::Div => "/",
        BinaryOp::Mul => "*",
        BinaryOp::Mod => "%",
        BinaryOp::BOr => "|",
        BinaryOp::BAnd => "&",
        BinaryOp::BXor => "^",
        BinaryOp::Eq => "==",
        BinaryOp::Neq => "!=",
        BinaryOp::Gt => ">",
        BinaryOp::Lt => "<",
        BinaryOp::Ge => ">=",
        BinaryOp::Le => "<=",
        BinaryOp::And => "&&",
        BinaryOp::Or => "||",
        BinaryOp::Assign => "=",
        BinaryOp::AddEq => "+=",
        BinaryOp::SubEq => "-=",
        BinaryOp::MulEq => "*=",
        BinaryOp::DivEq => "/=",
        BinaryOp::ModEq => "%=",
        BinaryOp::BOrEq => "|=",
        BinaryOp::BAndEq => "&=",
        BinaryOp::BXorEq => "^=",
        BinaryOp::ShlEq => "<<=",
        BinaryOp::ShrEq => ">>=",
    }
}

fn unary_op_str(op: UnaryOp) -> &'static str {
    match op {
        UnaryOp::Incr => "++",
        UnaryOp::Decr => "--",
        UnaryOp::Neg => "-",
        UnaryOp::Deref => "*",
        UnaryOp::Ref => "&",
        UnaryOp::Not => "!",
    }
}

fn print_indent(depth: usize) {
    for _ in 0..depth {
        print!("  ");
    }
}

fn print_members(members: &[Member], depth: usize) {
    for member in members {
        print_indent(depth);
        println!("{}:", member.name);
        print_ast(member.type_node, depth + 1);
    }
}

fn print_ast(node: &Node, depth: usize) {
    print_indent(depth);
    match &node.kind {
        NodeKind::Integer(v) => println!("Integer: {v}"),
        NodeKind::Float(v) => println!("Float: {v}"),
        NodeKind::Char(v) => println!("Char: '{}'", *v as char),
        NodeKind::String(bytes) => println!("String: \"{}\"", String::from_utf8_lossy(bytes)),
        NodeKind::Identifier(name) => println!("Identifier: {name}"),
        NodeKind::Unary { op, operand } => {
            println!("UnaryOp ({})", unary_op_str(*op));
            print_ast(operand, depth + 1);
        }
        NodeKind::Postfix { op, operand } => {
            println!("Postfix ({})", unary_op_str(*op));
            print_ast(operand, depth + 1);
        }
        NodeKind::Binary { op, left, right } => {
            println!("BinaryOp ({})", binary_op_str(*op));
            print_ast(left, depth + 1);
            print_ast(right, depth + 1);
        }
        NodeKind::Ternary {
            condition,
            then_branch,
            else_branch,
        } => {
            println!("Ternary (? :)");
            print_indent(depth + 1);
            println!("Condition:");
            print_ast(condition, depth + 2);
            print_indent(depth + 1);
            println!("Then:");
            print_ast(then_branch, depth + 2);
            print_indent(depth + 1);
            println!("Else:");
            print_ast(else_branch, depth + 2);
        }
        NodeKind::Cast { target_type, value } => {
            println!("Cast:");
            print_ast(target_type, depth + 1);
            print_ast(value, depth + 1);
        }
        NodeKind::Subscript { base, index } => {
            println!("Array subscript");
            print_ast(base, depth + 1);
            print_ast(index, depth + 1);
        }
        NodeKind::Access { base, member } => {
            println!("Access:");
            print_ast(base, depth + 1);
            print_ast(member, depth + 1);
        }
        NodeKind::Call { name, args } => {
            println!("Call: {name}");
            for arg in *args {
                print_ast(arg, depth + 1);
            }
        }
        NodeKind::Range { start, end } => {
            println!("Range:");
            print_ast(start, depth + 1);
            print_ast(end, depth + 1);
        }
        NodeKind::PtrType {
            child,
            is_slice,
            is_const,
            is_volatile,
        } => {
            println!("{}Type (const={is_const} volatile={is_volatile})", if *is_slice { "Slice" } else { "Ptr" });
            print_ast(child, depth + 1);
        }
        NodeKind::VarDecl { name, type_node, value } => {
            println!("VarDecl: {name}");
            print_ast(type_node, depth + 1);
            if let Some(value) = value {
                print_ast(value, depth + 1);
            }
        }
        NodeKind::Function {
            name,
            params,
            return_type,
            body,
        } => {
            println!("Function: {name}");
            print_members(params, depth + 1);
            print_ast(return_type, depth + 1);
            print_ast(body, depth + 1);
        }
        NodeKind::Struct { name, members } => {
            println!("Struct: {name}");
            print_members(members, depth + 1);
        }
        NodeKind::Union { name, members } => {
            println!("Union: {name}");
            print_members(members, depth + 1);
        }
        NodeKind::Enum { name, variants } => {
            println!("Enum: {name}");
            for variant in *variants {
                print_indent(depth + 1);
                println!("{variant}");
            }
        }
        NodeKind::StructInit { members } => {
            println!("Struct init:");
            for member in *members {
                print_ast(member, depth + 1);
            }
        }
        NodeKind::If { condition, body } => {
            println!("If:");
            print_ast(condition, depth + 1);
            print_ast(body, depth + 1);
        }
        NodeKind::While { condition, body } => {
            println!("While:");
            print_ast(condition, depth + 1);
            print_ast(body, depth + 1);
        }
        NodeKind::For { slices, captures, body } => {
            println!("For:");
            for slice in *slices {
                print_ast(slice, depth + 1);
            }
            print_indent(depth + 1);
            println!("captures: {}", captures.join(", "));
            print_ast(body, depth + 1);
        }
        NodeKind::Return { value } => {
            println!("Return:");
            if let Some(value) = value {
                print_ast(value, depth + 1);
            }
        }
        NodeKind::Break => println!("Break"),
        NodeKind::Goto { label } => println!("Goto: {label}"),
        NodeKind::Label { name } => println!("Label: {name}"),
        NodeKind::Import { path } => {
            println!("Import:");
            print_ast(path, depth + 1);
        }
        NodeKind::Compound { statements } => {
            println!("Block");
            for statement in *statements {
                print_ast(statement, depth + 1);
            }
        }
    }
}

fn main() {
    env_logger::init();

    let source = std::fs::read_to_string(DEMO_SOURCE_PATH).unwrap_or_else(|err| {
        eprintln!("failed to read {DEMO_SOURCE_PATH}: {err}");
        std::process::exit(1);
    });

    let arena = slangc::Arena::with_capacity(slangc::DEFAULT_ARENA_CAPACITY);
    let mut diagnostics = slangc::DiagnosticSink::new();
    let tokens = slangc::lex(&source, &arena, &mut diagnostics);
    let program = slangc::parse::parse_program(&tokens, &arena, &mut diagnostics);

    for node in program {
        print_ast(node, 0);
    }

    for diagnostic in diagnostics.diagnostics() {
        eprintln!("{diagnostic}");
    }

    if diagnostics.had_errors() {
        std::process::exit(1);
    }
}
