//! Diagnostics accumulated by the lexer, parser and analyzer.
//!
//! Every pass appends to a shared [`DiagnosticSink`] instead of aborting on
//! the first problem found, matching the propagation policy described for
//! this front-end: accumulate, never retry, flip a global error flag, exit
//! nonzero at the end if that flag is set.

use std::fmt;

use crate::position::Position;

/// A single diagnostic message tied to a source position.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct Diagnostic {
    pub position: Position,
    pub message: String,
}

impl Diagnostic {
    pub fn new(position: Position, message: impl Into<String>) -> Self {
        Self {
            position,
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "error:{}:{}: {}",
            self.position.row, self.position.column, self.message
        )
    }
}

impl std::error::Error for Diagnostic {}

/// Accumulates diagnostics across the whole compilation and tracks whether
/// any were reported, standing in for the reference implementation's
/// process-global `has_errors` flag as an explicit, passed-around value.
#[derive(Debug, Default)]
pub struct DiagnosticSink {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn report(&mut self, position: Position, message: impl Into<String>) {
        let diagnostic = Diagnostic::new(position, message);
        log::debug!("diagnostic: {diagnostic}");
        self.diagnostics.push(diagnostic);
    }

    pub fn had_errors(&self) -> bool {
        !self.diagnostics.is_empty()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}

/// Literal diagnostic messages, collected so the rest of the crate never
/// hand-writes a message string twice with a subtly different wording.
pub mod messages {
    pub const UNCLOSED_STRING_LITERAL: &str = "unclosed string literal";
    pub const UNCLOSED_CHARACTER_LITERAL: &str = "unclosed character literal";

    pub const UNCLOSED_PARENTHESIS: &str = "unclosed parenthesis";
    pub const EXPECTED_CLOSE_PAREN: &str = "expected `)`";
    pub const EXPECTED_CLOSE_BRACKET: &str = "expected `]`";
    pub const EXPECTED_SEMICOLON: &str = "expected `;`";
    pub const EXPECTED_PIPE: &str = "expected `|`";
    pub const EXPECTED_EXPRESSION: &str = "expected expression";
    pub const EXPECTED_IDENT_AFTER_ACCESS: &str = "expected identifier after member access";
    pub const INVALID_ESCAPE_CODE: &str = "invalid escape code";
    pub const CAPTURES_MUST_BE_IDENTIFIERS: &str = "captures must be identifiers";
    pub const INVALID_NUMBER_OF_CAPTURES: &str = "invalid number of captures";
    pub const UNTERMINATED_BLOCK: &str = "Unterminated block";
    pub const EXPECTED_BLOCK_OPEN: &str = "expected `{` for beginning of a block";
    pub const EXPECTED_LABEL_AFTER_GOTO: &str = "expected label identifier after `goto`";
    pub const EXPECTED_MODULE_PATH: &str = "expected module path after `import`";
    pub const EXPECTED_INTEGER: &str = "expected integer";
    pub const NOT_YET_SUPPORTED: &str = "not yet supported";

    pub const TYPE_ALREADY_DEFINED: &str = "type already defined";
    pub const CYCLING_STRUCT_DEFINITION: &str = "cycling struct definition";
    pub const UNKNOWN_TYPE: &str = "unknown type";
    pub const STRUCT_MEMBER_VOID: &str = "a struct member can't be of type `void`";
    pub const FUNCTION_ALREADY_DEFINED: &str = "function already defined";
    pub const UNKNOWN_FUNCTION: &str = "unknown function";
    pub const UNKNOWN_IDENTIFIER: &str = "unknown identifier";
    pub const REDECLARATION_OF_VARIABLE: &str = "redeclaration of variable";
    pub const TYPE_MISMATCH: &str = "type mismatch";
    pub const RETURN_TYPE_MISMATCH: &str = "return type doesn't match function's one";
    pub const BREAK_NOT_IN_LOOP: &str = "`break` isn't in a loop";
    pub const EXPECTED_BOOLEAN_VALUE: &str = "expected boolean value";
    pub const STRUCT_HAS_NO_MEMBER: &str = "struct doesn't have that member";
    pub const ONLY_PTR_SLICE_INDEXABLE: &str = "only pointers and slices can be indexed";
    pub const EXPECTED_TYPE: &str = "expected type";
}
