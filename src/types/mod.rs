use serde::{Deserialize, Serialize};

/// A point in the analyzed source text, as tree-sitter reports it:
/// zero-based line (row) and zero-based column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceLocation {
    pub line: u32,
    pub column: u16,
}

/// A contiguous region of source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub start: SourceLocation,
    pub end: SourceLocation,
}

impl SourceLocation {
    pub fn new(line: u32, column: u16) -> Self {
        Self { line, column }
    }
}

impl Span {
    pub fn new(start: SourceLocation, end: SourceLocation) -> Self {
        Self { start, end }
    }
}
