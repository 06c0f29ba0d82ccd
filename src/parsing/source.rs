//! Syntax tree acquisition.
//!
//! The analyzed texts are JavaScript closures; tree-sitter with the
//! JavaScript grammar is the tree producer. A closure's source is wrapped
//! as a variable initializer (`var __mandox_closure__=<source>`) so bare
//! function expressions parse the same way as declarations; the synthetic
//! wrapper name is filtered out of extraction results.

use serde::Serialize;
use tree_sitter::{Language, Node, Parser, Tree};

use crate::error::ResolveError;
use crate::types::{SourceLocation, Span};

/// Name of the synthetic variable the wrapper introduces. Never reported.
pub(crate) const SYNTHETIC_NAME: &str = "__mandox_closure__";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CommentKind {
    Line,
    Block,
}

/// One comment, delimiters stripped, in source order.
#[derive(Debug, Clone, Serialize)]
pub struct Comment {
    pub kind: CommentKind,
    pub text: String,
    pub span: Span,
}

impl Comment {
    pub fn is_line(&self) -> bool {
        self.kind == CommentKind::Line
    }
}

/// What survives of a parse once extraction is done: the comment list,
/// ordered by source position. Owned by the symbol table that triggered
/// the parse.
#[derive(Debug, Clone, Serialize)]
pub struct ParsedSource {
    pub comments: Vec<Comment>,
}

/// Parse a closure's source text. Returns the tree together with the
/// wrapped code (positions in both are relative to the wrapped text).
pub(crate) fn parse_source(source: &str) -> Result<(Tree, String), ResolveError> {
    let mut parser = Parser::new();
    let language: Language = tree_sitter_javascript::LANGUAGE.into();
    parser
        .set_language(&language)
        .map_err(|_| ResolveError::NotAFunction)?;

    let code = format!("var {SYNTHETIC_NAME}={source}");
    let tree = parser
        .parse(&code, None)
        .ok_or(ResolveError::NotAFunction)?;

    if tree.root_node().has_error() {
        // tree-sitter recovers around ERROR nodes; partial results are
        // accepted downstream.
        tracing::debug!("[source] parse produced error nodes, continuing");
    }
    Ok((tree, code))
}

/// Collect every comment node in a pre-order walk (source order).
pub(crate) fn collect_comments(root: Node, code: &str) -> Vec<Comment> {
    let mut comments = Vec::new();
    walk_comments(root, code, &mut comments);
    comments
}

fn walk_comments(node: Node, code: &str, out: &mut Vec<Comment>) {
    if node.kind() == "comment" {
        let raw = &code[node.byte_range()];
        let (kind, text) = if let Some(rest) = raw.strip_prefix("//") {
            (CommentKind::Line, rest.to_string())
        } else {
            let inner = raw
                .strip_prefix("/*")
                .and_then(|r| r.strip_suffix("*/"))
                .unwrap_or(raw);
            (CommentKind::Block, inner.to_string())
        };
        out.push(Comment {
            kind,
            text,
            span: span_of(node),
        });
        return;
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        walk_comments(child, code, out);
    }
}

fn span_of(node: Node) -> Span {
    let start = node.start_position();
    let end = node.end_position();
    Span::new(
        SourceLocation::new(start.row as u32, start.column as u16),
        SourceLocation::new(end.row as u32, end.column as u16),
    )
}
