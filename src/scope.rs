//! Runtime values and the environment-lookup capability.
//!
//! The engine never inspects a host's scope chain directly; it asks an
//! injected [`ResolutionScope`] to evaluate identifier paths in the calling
//! lexical scope. `None` is the unresolved sentinel — lookup failures must
//! be converted to it, never propagated as panics.
//!
//! [`Value`] is the one identity-bearing currency the engine trades in:
//! clones of a value are identical, structurally-equal rebuilds are not.
//! Matching is strict identity only.

use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A live runtime value, cheap to clone. Identity is the identity of the
/// inner allocation: `a.same(&b)` holds exactly when `b` is a clone of `a`.
#[derive(Debug, Clone)]
pub struct Value {
    repr: Arc<ValueRepr>,
}

#[derive(Debug)]
enum ValueRepr {
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    Text(Box<str>),
    Object(HashMap<String, Value>),
    Function {
        name: Option<Box<str>>,
        source: Box<str>,
    },
}

/// The broad classification used for the too-primitive gate and for error
/// messages. Display names follow the host language's `typeof` vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    Undefined,
    Null,
    Boolean,
    Number,
    String,
    Object,
    Function,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::Undefined => "undefined",
            ValueKind::Null => "null",
            ValueKind::Boolean => "boolean",
            ValueKind::Number => "number",
            ValueKind::String => "string",
            ValueKind::Object => "object",
            ValueKind::Function => "function",
        };
        write!(f, "{name}")
    }
}

impl Value {
    fn new(repr: ValueRepr) -> Self {
        Self {
            repr: Arc::new(repr),
        }
    }

    pub fn undefined() -> Self {
        Self::new(ValueRepr::Undefined)
    }

    pub fn null() -> Self {
        Self::new(ValueRepr::Null)
    }

    pub fn bool(value: bool) -> Self {
        Self::new(ValueRepr::Bool(value))
    }

    pub fn number(value: f64) -> Self {
        Self::new(ValueRepr::Number(value))
    }

    pub fn text(value: impl Into<String>) -> Self {
        Self::new(ValueRepr::Text(value.into().into_boxed_str()))
    }

    /// An object with the given properties. Property values are handles, so
    /// looking the same property up twice yields identical values.
    pub fn object(properties: impl IntoIterator<Item = (String, Value)>) -> Self {
        Self::new(ValueRepr::Object(properties.into_iter().collect()))
    }

    /// A callable carrying its own source text.
    pub fn function(source: impl Into<String>) -> Self {
        Self::new(ValueRepr::Function {
            name: None,
            source: source.into().into_boxed_str(),
        })
    }

    /// A named callable carrying its own source text.
    pub fn function_named(name: impl Into<String>, source: impl Into<String>) -> Self {
        Self::new(ValueRepr::Function {
            name: Some(name.into().into_boxed_str()),
            source: source.into().into_boxed_str(),
        })
    }

    /// Strict identity: same underlying allocation, not mere equality.
    pub fn same(&self, other: &Value) -> bool {
        Arc::ptr_eq(&self.repr, &other.repr)
    }

    pub fn kind(&self) -> ValueKind {
        match &*self.repr {
            ValueRepr::Undefined => ValueKind::Undefined,
            ValueRepr::Null => ValueKind::Null,
            ValueRepr::Bool(_) => ValueKind::Boolean,
            ValueRepr::Number(_) => ValueKind::Number,
            ValueRepr::Text(_) => ValueKind::String,
            ValueRepr::Object(_) => ValueKind::Object,
            ValueRepr::Function { .. } => ValueKind::Function,
        }
    }

    pub fn is_function(&self) -> bool {
        matches!(&*self.repr, ValueRepr::Function { .. })
    }

    /// The source text of a callable, if this value is one.
    pub fn function_source(&self) -> Option<&str> {
        match &*self.repr {
            ValueRepr::Function { source, .. } => Some(source),
            _ => None,
        }
    }

    /// The declared name of a callable, if it has one.
    pub fn function_name(&self) -> Option<&str> {
        match &*self.repr {
            ValueRepr::Function { name, .. } => name.as_deref(),
            _ => None,
        }
    }

    /// Property access on object values.
    pub fn get(&self, key: &str) -> Option<Value> {
        match &*self.repr {
            ValueRepr::Object(properties) => properties.get(key).cloned(),
            _ => None,
        }
    }
}

/// The environment-lookup capability: evaluate an identifier path string
/// (`a.b`, `x["y (z)"]`) in the calling lexical scope, including scope-chain
/// lookup for free variables. `None` is the unresolved sentinel.
pub trait ResolutionScope: Send + Sync {
    fn resolve(&self, path: &str) -> Option<Value>;
}

impl<F> ResolutionScope for F
where
    F: Fn(&str) -> Option<Value> + Send + Sync,
{
    fn resolve(&self, path: &str) -> Option<Value> {
        self(path)
    }
}

/// A [`ResolutionScope`] backed by an explicit bindings table, for hosts
/// without live scope introspection. Evaluates member paths the way the
/// host language would: `.name` steps and `["quoted"]` / `[index]` steps,
/// starting from a root binding. A path that fails to parse or to walk is
/// unresolved, never an error.
#[derive(Default)]
pub struct TableScope {
    bindings: HashMap<String, Value>,
}

impl TableScope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(&mut self, name: impl Into<String>, value: Value) {
        self.bindings.insert(name.into(), value);
    }

    pub fn with_binding(mut self, name: impl Into<String>, value: Value) -> Self {
        self.bind(name, value);
        self
    }
}

impl ResolutionScope for TableScope {
    fn resolve(&self, path: &str) -> Option<Value> {
        let segments = parse_member_path(path)?;
        let (root, rest) = segments.split_first()?;
        let mut current = self.bindings.get(root)?.clone();
        for segment in rest {
            current = current.get(segment)?;
        }
        Some(current)
    }
}

/// Split a member-access expression into its property segments:
/// `a.b["y (z)"][0]` --> `["a", "b", "y (z)", "0"]`.
///
/// Bare segments follow host identifier rules (letters, digits, `_`, `$`);
/// anything else must come bracketed and quoted. Returns `None` on any
/// syntax the host could not evaluate either.
fn parse_member_path(path: &str) -> Option<Vec<String>> {
    let chars: Vec<char> = path.chars().collect();
    let mut segments = Vec::new();
    let mut pos = 0;
    while pos < chars.len() {
        match chars[pos] {
            '.' => {
                // A leading or doubled dot is a syntax error.
                if segments.is_empty() || chars.get(pos + 1).is_none_or(|c| !is_ident_char(*c)) {
                    return None;
                }
                pos += 1;
            }
            '[' => {
                if segments.is_empty() {
                    return None;
                }
                pos += 1;
                let quote = match chars.get(pos).copied() {
                    Some(q @ ('"' | '\'')) => {
                        pos += 1;
                        Some(q)
                    }
                    Some(c) if c.is_ascii_digit() => None,
                    _ => return None,
                };
                let mut segment = String::new();
                loop {
                    let chr = *chars.get(pos)?;
                    match quote {
                        Some(q) if chr == q => {
                            pos += 1;
                            break;
                        }
                        None if chr == ']' => break,
                        None if !chr.is_ascii_digit() => return None,
                        _ => {
                            segment.push(chr);
                            pos += 1;
                        }
                    }
                }
                if chars.get(pos) != Some(&']') {
                    return None;
                }
                pos += 1;
                segments.push(segment);
            }
            c if is_ident_char(c) => {
                let mut segment = String::new();
                while pos < chars.len() && is_ident_char(chars[pos]) {
                    segment.push(chars[pos]);
                    pos += 1;
                }
                segments.push(segment);
            }
            _ => return None,
        }
    }
    if segments.is_empty() {
        None
    } else {
        Some(segments)
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_is_allocation_not_structure() {
        let a = Value::text("same content");
        let b = Value::text("same content");
        assert!(a.same(&a.clone()), "clone must be identical");
        assert!(!a.same(&b), "structural twin must not be identical");
    }

    #[test]
    fn test_object_property_identity_is_stable() {
        let f = Value::function("function(){}");
        let obj = Value::object([("b".to_string(), f.clone())]);
        let first = obj.get("b").unwrap();
        let second = obj.get("b").unwrap();
        assert!(first.same(&second));
        assert!(first.same(&f));
    }

    #[test]
    fn test_table_scope_member_paths() {
        let f = Value::function("function(){}");
        let x = Value::object([("y (z)".to_string(), f.clone())]);
        let scope = TableScope::new().with_binding("x", x);

        let via_bracket = scope.resolve(r#"x["y (z)"]"#).unwrap();
        assert!(via_bracket.same(&f));
        assert!(scope.resolve("x.missing").is_none());
        assert!(
            scope.resolve("x.y (z)").is_none(),
            "unbracketed odd property name is a syntax error, so unresolved"
        );
    }

    #[test]
    fn test_table_scope_dotted_chain() {
        let leaf = Value::number(1.0);
        let inner = Value::object([("c".to_string(), leaf.clone())]);
        let outer = Value::object([("b".to_string(), inner)]);
        let scope = TableScope::new().with_binding("a", outer);
        assert!(scope.resolve("a.b.c").unwrap().same(&leaf));
        assert!(scope.resolve(".a").is_none());
        assert!(scope.resolve("a..b").is_none());
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(Value::bool(true).kind().to_string(), "boolean");
        assert_eq!(Value::number(42.0).kind().to_string(), "number");
        assert_eq!(Value::undefined().kind().to_string(), "undefined");
    }
}
