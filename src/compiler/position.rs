//! Source positions for diagnostics and tooling.

use std::fmt;

/// A location in template source: 1-based line, 0-based byte column.
///
/// Resolved from a byte offset by counting newline bytes from the start of
/// the source. This is O(source length) per call, which is fine because it
/// runs once per AST node at construction, never in a scanning loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    /// Resolves a byte offset into `source` to a (line, column) pair.
    ///
    /// Offsets past the end of the source resolve to the end-of-input
    /// position, so errors reported "at end of file" stay in bounds.
    pub fn of(source: &str, offset: usize) -> Self {
        let offset = offset.min(source.len());
        let mut line = 1;
        let mut column = 0;
        for &b in &source.as_bytes()[..offset] {
            if b == b'\n' {
                line += 1;
                column = 0;
            } else {
                column += 1;
            }
        }
        Self { line, column }
    }
}

impl Default for Position {
    fn default() -> Self {
        Self { line: 1, column: 0 }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}:{}]", self.line, self.column)
    }
}
