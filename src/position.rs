//! Source positions.

use std::fmt;

/// A location in a source file: a 1-based row and a 0-based column.
///
/// Rows increment on every `\n`; columns reset to `0` at the start of a
/// line and advance once per byte consumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Position {
    pub row: usize,
    pub column: usize,
}

impl Position {
    /// Sentinel for "no position available".
    pub const NONE: Position = Position { row: 0, column: 0 };

    /// The position of the first byte of a fresh source buffer.
    pub const START: Position = Position { row: 1, column: 0 };

    pub fn new(row: usize, column: usize) -> Self {
        Self { row, column }
    }

    pub fn is_none(&self) -> bool {
        *self == Self::NONE
    }

    /// Advance by one byte that is not a newline.
    pub fn advance(&mut self) {
        self.column += 1;
    }

    /// Advance past a newline byte.
    pub fn newline(&mut self) {
        self.row += 1;
        self.column = 0;
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.row, self.column)
    }
}
