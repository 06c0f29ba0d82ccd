//! Symbol extraction: walk a closure's syntax tree and produce every
//! candidate identifier path it could declare, in depth-first source order.
//!
//! Paths accumulate through the node kinds that can take part in a
//! declaration (assignments, properties, declarators, named functions).
//! A function literal opens a new scope: the accumulated path gains a `|`
//! separator, and the pieces between separators become the scope levels the
//! matcher later walks outermost-first.

use tree_sitter::Node;

use crate::error::Result;
use crate::parsing::source::{self, ParsedSource, SYNTHETIC_NAME};
use crate::symbol::Identifier;
use crate::types::SourceLocation;

/// Separator marking a scope boundary inside an accumulated path.
pub(crate) const SCOPE_SEPARATOR: char = '|';

/// Hard ceiling on tree recursion, independent of the configurable parse
/// depth. Hitting it prunes the subtree instead of exhausting the stack.
const MAX_RECURSION_DEPTH: usize = 256;

/// Extract all candidate identifiers from a closure's source text.
///
/// `parse_depth` caps how many nested function-literal scopes are entered;
/// `-1` means unlimited. Identical input yields an identical ordered list.
pub fn extract(text: &str, parse_depth: i32) -> Result<(Vec<Identifier>, ParsedSource)> {
    let (tree, code) = source::parse_source(text)?;
    let root = tree.root_node();
    let comments = source::collect_comments(root, &code);

    let mut raw = Vec::new();
    collect_symbols(root, &code, None, parse_depth, 0, &mut raw);

    let identifiers = raw
        .into_iter()
        .map(|symbol| {
            Identifier::new(
                symbol
                    .path
                    .split(SCOPE_SEPARATOR)
                    .map(str::to_string)
                    .collect(),
                symbol.location,
            )
        })
        .collect();
    Ok((identifiers, ParsedSource { comments }))
}

struct RawSymbol {
    path: String,
    location: SourceLocation,
}

/// Node kinds that can contribute an identifier of their own.
fn declares_identifier(kind: &str) -> bool {
    matches!(
        kind,
        "assignment_expression"
            | "function_declaration"
            | "generator_function_declaration"
            | "function_expression"
            | "generator_function"
            | "identifier"
            | "pair"
            | "shorthand_property_identifier"
            | "variable_declarator"
    )
}

/// Node kinds that open a new lexical scope for their body.
fn opens_scope(kind: &str) -> bool {
    matches!(
        kind,
        "function_declaration"
            | "generator_function_declaration"
            | "function_expression"
            | "generator_function"
            | "arrow_function"
    )
}

/// Whether a child node binds its own name beside the current identifier
/// (an assignment, a declarator, or a function carrying a name).
fn declares_own_identifier(node: Node) -> bool {
    match node.kind() {
        "assignment_expression" | "variable_declarator" => true,
        "function_declaration"
        | "generator_function_declaration"
        | "function_expression"
        | "generator_function" => node.child_by_field_name("name").is_some(),
        _ => false,
    }
}

fn collect_symbols(
    node: Node,
    code: &str,
    path: Option<&str>,
    depth: i32,
    recursion: usize,
    out: &mut Vec<RawSymbol>,
) {
    if recursion >= MAX_RECURSION_DEPTH {
        tracing::warn!(
            "[extractor] recursion ceiling reached at `{}`, pruning subtree",
            node.kind()
        );
        return;
    }

    let declares = declares_identifier(node.kind());
    let mut outer: Option<String> = None;
    let mut current: Option<String> = path.map(str::to_string);
    if declares {
        if let Some(id) = build_identifier(node, code, path) {
            if id != SYNTHETIC_NAME {
                out.push(RawSymbol {
                    path: id.clone(),
                    location: location_of(node),
                });
                outer = path.map(str::to_string);
                current = Some(id);
            }
        }
    }

    let mut depth = depth;
    if current.is_some() && opens_scope(node.kind()) {
        current = current.map(|mut p| {
            p.push(SCOPE_SEPARATOR);
            p
        });
        depth -= 1;
    }
    if depth == 0 {
        return;
    }

    for child in sub_programs(node) {
        // A child that declares its own identifier (a named function or an
        // assignment) binds beside the current one, not under it: it is
        // visited with the path that was in effect before this node's
        // identifier was appended.
        let child_path = if declares && declares_own_identifier(child) {
            outer.as_deref()
        } else {
            current.as_deref()
        };
        collect_symbols(child, code, child_path, depth, recursion + 1, out);
    }
}

/// Build the dotted identifier a node contributes, given the accumulated
/// path prefix. Returns `None` for anonymous or non-contributing nodes.
fn build_identifier(node: Node, code: &str, prefix: Option<&str>) -> Option<String> {
    match node.kind() {
        "assignment_expression" => node
            .child_by_field_name("left")
            .and_then(|left| build_identifier(left, code, prefix)),
        "pair" => {
            let dotted = format!("{}.", prefix.unwrap_or(""));
            node.child_by_field_name("key")
                .and_then(|key| build_identifier(key, code, Some(&dotted)))
        }
        "member_expression" => {
            let prop = node
                .child_by_field_name("property")
                .and_then(|p| build_identifier(p, code, None))?;
            let chain = node
                .child_by_field_name("object")
                .and_then(|o| build_identifier(o, code, prefix));
            Some(match chain {
                Some(chain) => format!("{chain}.{prop}"),
                None => prop,
            })
        }
        "subscript_expression" => {
            let prop = node
                .child_by_field_name("index")
                .and_then(|i| build_identifier(i, code, None))?;
            let chain = node
                .child_by_field_name("object")
                .and_then(|o| build_identifier(o, code, prefix));
            Some(match chain {
                Some(chain) => format!("{chain}.{prop}"),
                None => prop,
            })
        }
        "variable_declarator" => node
            .child_by_field_name("name")
            .and_then(|name| build_identifier(name, code, prefix)),
        "function_declaration"
        | "generator_function_declaration"
        | "function_expression"
        | "generator_function" => node
            .child_by_field_name("name")
            .and_then(|name| build_identifier(name, code, prefix)),
        "computed_property_name" => node
            .named_child(0)
            .and_then(|inner| build_identifier(inner, code, prefix)),
        "string" => {
            let text = code[node.byte_range()]
                .trim_matches(|c| c == '"' || c == '\'')
                .to_string();
            if text.is_empty() {
                None
            } else {
                Some(format!("{}{text}", prefix.unwrap_or("")))
            }
        }
        "number" => Some(format!(
            "{}{}",
            prefix.unwrap_or(""),
            &code[node.byte_range()]
        )),
        "identifier" | "property_identifier" => Some(format!(
            "{}{}",
            prefix.unwrap_or(""),
            &code[node.byte_range()]
        )),
        // `{ a }` binds the property exactly like `{ a: a }` would.
        "shorthand_property_identifier" => Some(format!(
            "{}.{}",
            prefix.unwrap_or(""),
            &code[node.byte_range()]
        )),
        "this" => Some(format!("{}this", prefix.unwrap_or(""))),
        other => {
            tracing::debug!(
                "[extractor] cannot resolve expression of type `{other}` (prefix: {prefix:?})"
            );
            None
        }
    }
}

/// The sub-programs a node's traversal descends into.
fn sub_programs(node: Node) -> Vec<Node> {
    match node.kind() {
        "assignment_expression" => single(node.child_by_field_name("right")),
        "pair" => single(node.child_by_field_name("value")),
        "variable_declarator" => single(node.child_by_field_name("value")),
        "expression_statement" | "parenthesized_expression" => single(node.named_child(0)),
        "statement_block"
        | "program"
        | "object"
        | "variable_declaration"
        | "lexical_declaration"
        | "sequence_expression" => {
            let mut cursor = node.walk();
            node.named_children(&mut cursor)
                .filter(|child| child.kind() != "comment")
                .collect()
        }
        "function_declaration"
        | "generator_function_declaration"
        | "function_expression"
        | "generator_function"
        | "arrow_function" => {
            let mut units = single(node.child_by_field_name("body"));
            if let Some(params) = node.child_by_field_name("parameters") {
                let mut cursor = params.walk();
                units.extend(
                    params
                        .named_children(&mut cursor)
                        .filter(|child| child.kind() != "comment"),
                );
            } else if let Some(param) = node.child_by_field_name("parameter") {
                units.push(param);
            }
            units
        }
        // A constructor call tells us nothing about where its result binds.
        "new_expression" => Vec::new(),
        _ => Vec::new(),
    }
}

/// A single-field sub-program; a bare identifier reference is not descended
/// into (it declares nothing on its own).
fn single(node: Option<Node>) -> Vec<Node> {
    match node {
        Some(n) if n.kind() != "identifier" => vec![n],
        _ => Vec::new(),
    }
}

fn location_of(node: Node) -> SourceLocation {
    let start = node.start_position();
    SourceLocation::new(start.row as u32, start.column as u16)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths(text: &str) -> Vec<Vec<String>> {
        let (identifiers, _) = extract(text, -1).expect("extract");
        identifiers
            .iter()
            .map(|id| id.levels().to_vec())
            .collect()
    }

    #[test]
    fn test_variable_declaration() {
        let found = paths("function(){ var x = 1; }");
        assert!(
            found.contains(&vec!["x".to_string()]),
            "missing plain declarator: {found:?}"
        );
    }

    #[test]
    fn test_object_property_path() {
        let found = paths("function(){ var a = { b: function(){} }; }");
        assert!(
            found.contains(&vec!["a.b".to_string()]),
            "missing dotted property path: {found:?}"
        );
    }

    #[test]
    fn test_shorthand_property() {
        let found = paths("function(){ var a = { b }; }");
        assert!(
            found.contains(&vec!["a.b".to_string()]),
            "shorthand property should bind like a keyed one: {found:?}"
        );
    }

    #[test]
    fn test_member_assignment() {
        let found = paths("function(){ a.b.c = function(){}; }");
        assert!(
            found.contains(&vec!["a.b.c".to_string()]),
            "missing member chain: {found:?}"
        );
    }

    #[test]
    fn test_scope_boundary_splits_levels() {
        let found = paths("function(){ var f = function inner(){ var hidden = 1; }; }");
        assert!(
            found.contains(&vec!["inner".to_string(), "hidden".to_string()]),
            "nested declaration must sit behind a scope boundary: {found:?}"
        );
        assert!(
            !found.contains(&vec!["f.hidden".to_string()]),
            "nested variable must not leak into the outer prefix: {found:?}"
        );
    }

    #[test]
    fn test_parameters_are_candidates() {
        let found = paths("function(){ var g = function h(a, b){}; }");
        assert!(
            found.contains(&vec!["h".to_string(), "a".to_string()]),
            "parameters belong to the function scope: {found:?}"
        );
    }

    #[test]
    fn test_this_member_assignment() {
        let found = paths("function(){ this.tool = function(){}; }");
        assert!(
            found.contains(&vec!["this.tool".to_string()]),
            "missing this-bound member: {found:?}"
        );
    }

    #[test]
    fn test_synthetic_wrapper_is_filtered() {
        for levels in paths("function(){ var x = 1; }") {
            assert!(
                !levels.iter().any(|l| l.contains("__mandox_closure__")),
                "synthetic wrapper leaked: {levels:?}"
            );
        }
    }

    #[test]
    fn test_extraction_is_deterministic() {
        let text = "function(){ var a = { b: function(){ var c = 2; } }; d.e = a; }";
        assert_eq!(paths(text), paths(text));
    }

    #[test]
    fn test_depth_cap_stops_descent() {
        let text = "function outer(){ var f = function inner(){ var hidden = 1; }; }";
        let (identifiers, _) = extract(text, 1).expect("extract");
        let found: Vec<_> = identifiers.iter().map(|id| id.levels().to_vec()).collect();
        assert!(
            found.contains(&vec!["outer".to_string()]),
            "outer name still extracted: {found:?}"
        );
        assert!(
            !found
                .iter()
                .any(|levels| levels.contains(&"hidden".to_string())),
            "depth cap must stop before nested bodies: {found:?}"
        );
    }
}
