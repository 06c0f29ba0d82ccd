//! Scope-consistent matching of candidate identifiers against a target
//! value.
//!
//! The free-variable rule is a best-effort disambiguation, not a proof: an
//! unresolved level is tentatively read as a variable captured from an
//! enclosing scope, and the walk survives only while later resolutions keep
//! agreeing with the current receiver. Crafted property names can defeat
//! it; that limitation is accepted.

use crate::codec;
use crate::scope::{ResolutionScope, Value};
use crate::symbol::{Identifier, SymbolTable};

/// Find the first candidate whose resolved value is identical to the
/// target. "First" follows extraction order. Returns the candidate's index
/// in the table.
pub(crate) fn search_symbols(
    target: &Value,
    table: &SymbolTable,
    scope: &dyn ResolutionScope,
    frame: Option<&str>,
) -> Option<usize> {
    let this_value = scope.resolve("this");
    for (index, identifier) in table.identifiers().iter().enumerate() {
        let mut expects_free_var = false;
        for depth in 0..identifier.levels().len() {
            let level = &identifier.levels()[depth];
            if expects_free_var && level.starts_with("this.") {
                // A this-bound member while still awaiting a free-variable
                // confirmation cannot be the true lexical binding.
                break;
            }
            let Some(qualified) = qualify(identifier, depth, frame) else {
                continue;
            };

            if expects_free_var && in_scope_chain(&qualified, this_value.as_ref(), scope) {
                expects_free_var = false;
            }

            match scope.resolve(&qualified) {
                None => expects_free_var = true,
                Some(resolved) => {
                    if expects_free_var
                        && !this_value.as_ref().is_some_and(|t| t.same(&resolved))
                    {
                        break;
                    }
                    if resolved.same(target) {
                        tracing::debug!(
                            "[matcher] matched `{qualified}` at depth {depth}"
                        );
                        return Some(index);
                    }
                }
            }
        }
    }
    None
}

/// The fully-qualified path for one scope level. A `this.<member>` level is
/// prefixed by the previous depth's qualified path, or at depth 0 by the
/// receiver taken from the originating frame (its path minus the final
/// segment).
fn qualify(identifier: &Identifier, depth: usize, frame: Option<&str>) -> Option<String> {
    let level = &identifier.levels()[depth];
    match level.strip_prefix("this.") {
        None => Some(level.clone()),
        Some(member) => {
            if depth > 0 {
                let parent = qualify(identifier, depth - 1, frame)?;
                Some(format!("{parent}[\"{member}\"]"))
            } else if let Some(frame) = frame {
                let call = codec::decode_segments(frame).ok()?;
                let receiver = &call[..call.len().saturating_sub(1)];
                Some(format!("{}[\"{member}\"]", codec::serialize_path(receiver)))
            } else {
                None
            }
        }
    }
}

/// Whether the qualified path's root segment resolves back to the current
/// receiver (both-unresolved counts as agreement).
fn in_scope_chain(
    qualified: &str,
    this_value: Option<&Value>,
    scope: &dyn ResolutionScope,
) -> bool {
    let root = qualified.split('.').next().unwrap_or(qualified);
    match (this_value, scope.resolve(root)) {
        (None, None) => true,
        (Some(this_value), Some(resolved)) => this_value.same(&resolved),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scope::TableScope;

    fn table_for(source: &str) -> SymbolTable {
        SymbolTable::from_source(source, -1).expect("parse")
    }

    #[test]
    fn test_first_match_wins_in_extraction_order() {
        let f = Value::function("function(){}");
        let scope = TableScope::new()
            .with_binding("x", f.clone())
            .with_binding("y", f.clone());
        let table = table_for("function(){ var x = fn(); var y = x; }");
        let index = search_symbols(&f, &table, &scope, None).expect("match");
        assert_eq!(
            table.identifiers()[index].levels(),
            ["x"],
            "x is declared before y"
        );
    }

    #[test]
    fn test_identity_not_equality() {
        let wanted = Value::function("function(){}");
        let twin = Value::function("function(){}");
        let scope = TableScope::new().with_binding("x", twin);
        let table = table_for("function(){ var x = fn(); }");
        assert!(
            search_symbols(&wanted, &table, &scope, None).is_none(),
            "a structurally equal but distinct value must not match"
        );
    }

    #[test]
    fn test_nested_level_resolves_behind_scope_boundary() {
        // The scope a registration from inside `named` would supply: the
        // function's own name and its locals are all visible.
        let f = Value::function("function(){}");
        let named = Value::function_named("named", "function named(){}");
        let scope = TableScope::new()
            .with_binding("outer", named.clone())
            .with_binding("named", named)
            .with_binding("inner", f.clone());
        let table = table_for("function(){ var outer = function named(){ var inner = fn(); }; }");
        let index = search_symbols(&f, &table, &scope, None).expect("match");
        assert_eq!(
            table.identifiers()[index].levels(),
            ["named", "inner"],
            "the inner level is reached through the named scope"
        );
    }

    #[test]
    fn test_this_member_uses_frame_receiver_at_depth_zero() {
        let f = Value::function("function(){}");
        let receiver = Value::object([("tool".to_string(), f.clone())]);
        let scope = TableScope::new().with_binding("widget", receiver);
        let table = table_for("function(){ this.tool = fn(); }");

        // Frame for `widget.install`: the receiver path is `widget`.
        let frame = format!(
            "{}[\"{}\"]",
            codec::encode("widget"),
            codec::encode("install")
        );
        assert!(
            search_symbols(&f, &table, &scope, Some(&frame)).is_some(),
            "depth-0 this member should qualify against the frame receiver"
        );
        assert!(
            search_symbols(&f, &table, &scope, None).is_none(),
            "without a frame the receiver is unknowable"
        );
    }

    #[test]
    fn test_free_var_divergence_abandons_candidate() {
        // `s` is unresolvable (a closed-over helper), and the next level
        // resolves to something that is not the current receiver. Even
        // though `leak` resolves to the target itself, the walk is
        // abandoned: that pattern cannot be the value's true binding.
        let f = Value::function("function(){}");
        let scope = TableScope::new().with_binding("leak", f.clone());
        let table = table_for("function(){ var secret = function s(){ var leak = fn(); }; }");
        assert!(
            search_symbols(&f, &table, &scope, None).is_none(),
            "divergent resolution after a free-variable guess must abandon"
        );
    }
}
