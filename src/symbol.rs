//! Extraction output: candidate identifiers and the tables that own them.

use std::sync::OnceLock;

use crate::error::{ResolveError, Result};
use crate::parsing::extractor;
use crate::parsing::source::{Comment, ParsedSource};
use crate::scope::Value;
use crate::types::SourceLocation;

/// The lazily-computed documentation attached to a declaration.
///
/// `Pending` means not looked up yet. The cache only ever transitions
/// `Pending -> Found` or `Pending -> Absent`, never back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocState {
    Pending,
    Found(String),
    Absent,
}

/// One candidate identifier: the declaration's path as seen from each
/// enclosing scope level (outermost first), where it was declared, and a
/// write-once cache for the documentation lookup.
#[derive(Debug)]
pub struct Identifier {
    levels: Vec<String>,
    location: SourceLocation,
    doc: OnceLock<DocState>,
}

impl Identifier {
    pub(crate) fn new(levels: Vec<String>, location: SourceLocation) -> Self {
        Self {
            levels,
            location,
            doc: OnceLock::new(),
        }
    }

    /// Scope levels, outermost first. Each level is itself a dotted or
    /// bracketed path string.
    pub fn levels(&self) -> &[String] {
        &self.levels
    }

    pub fn location(&self) -> SourceLocation {
        self.location
    }

    /// Current cache state; `Pending` until the first lookup completes.
    pub fn doc_state(&self) -> DocState {
        self.doc.get().cloned().unwrap_or(DocState::Pending)
    }

    /// Run the lookup once and cache its terminal state.
    pub(crate) fn doc_or_init(&self, lookup: impl FnOnce() -> DocState) -> &DocState {
        self.doc.get_or_init(lookup)
    }
}

/// The ordered identifiers extracted from one closure's source, together
/// with that parse's comment list. Read-only once built.
#[derive(Debug)]
pub struct SymbolTable {
    identifiers: Vec<Identifier>,
    source: ParsedSource,
}

impl SymbolTable {
    /// Parse a callable value's source text into a symbol table.
    pub fn parse(closure: &Value, parse_depth: i32) -> Result<Self> {
        let text = closure.function_source().ok_or(ResolveError::NotAFunction)?;
        Self::from_source(text, parse_depth)
    }

    /// Parse raw closure source text into a symbol table.
    pub fn from_source(text: &str, parse_depth: i32) -> Result<Self> {
        let (identifiers, source) = extractor::extract(text, parse_depth)?;
        Ok(Self {
            identifiers,
            source,
        })
    }

    pub fn identifiers(&self) -> &[Identifier] {
        &self.identifiers
    }

    pub fn comments(&self) -> &[Comment] {
        &self.source.comments
    }
}
