//! Call-stack capture and frame-name decoding.
//!
//! The capture capability is injected: hosts return the current stack as
//! V8-style description lines. A printed function name may itself contain
//! dots and parentheses (a function assigned to a computed property whose
//! key contains them), so decoding never splits naively — each fragment is
//! encoded through the codec before being re-joined into bracket notation.

use regex::Regex;
use std::sync::LazyLock;

use crate::codec;

/// Matches ` at Object.x.y (z) (script.js)` as generated by `x['y (z)'] = f`.
static FRAME_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r" at (?:(?:Object|Function)\.)?(.*) (?:.*?)$").unwrap());

/// The resolver's own entry frame; everything before and including it is
/// discarded from a capture.
static SENTINEL_CALL_FRAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r" at mandox \(").unwrap());

/// Alias suffix printed when a function is invoked through a
/// differently-named reference.
static AS_EXPRESSION: LazyLock<Regex> = LazyLock::new(|| Regex::new(r" \[as .*?$").unwrap());

/// The call-stack capture capability: the current stack as an ordered list
/// of human-readable frame description lines, innermost first.
pub trait StackTraceProvider: Send + Sync {
    fn capture(&self) -> Vec<String>;
}

impl<F> StackTraceProvider for F
where
    F: Fn() -> Vec<String> + Send + Sync,
{
    fn capture(&self) -> Vec<String> {
        self()
    }
}

/// Decode the frames that belong to the caller: everything after the first
/// sentinel line, skipping lines with no recognizable call-frame shape.
pub(crate) fn frames_after_sentinel(lines: &[String]) -> Vec<String> {
    let Some(sentinel) = lines
        .iter()
        .position(|line| SENTINEL_CALL_FRAME.is_match(line))
    else {
        return Vec::new();
    };
    lines[sentinel + 1..]
        .iter()
        .filter_map(|line| parse_call_frame(line))
        .collect()
}

/// Decode one stack line into an encoded identifier path, or `None` for
/// anonymous/native frames.
pub(crate) fn parse_call_frame(line: &str) -> Option<String> {
    FRAME_NAME
        .captures(line)
        .and_then(|captures| captures.get(1))
        .map(|name| sanitize_frame_name(name.as_str()))
}

// Cannot sanitize a['.b (c).d'], which prints as `a.b (c).d` — property
// names that begin with a dot are indistinguishable from member access.
fn sanitize_frame_name(name: &str) -> String {
    let name = AS_EXPRESSION.replace(name, "");
    let chars: Vec<char> = name.chars().collect();
    let mut parts: Vec<String> = Vec::new();
    let mut pos = 0;
    while pos < chars.len() {
        let token = parse_property(&chars, pos);
        pos += token.chars().count() + 1;
        let encoded = codec::encode(&token);
        if parts.is_empty() {
            parts.push(encoded);
        } else {
            parts.push(format!("[\"{encoded}\"]"));
        }
    }
    if parts.is_empty() {
        codec::encode(&name)
    } else {
        parts.concat()
    }
}

/// One fragment of a printed frame name: runs to the next `.` separator.
fn parse_property(chars: &[char], mut pos: usize) -> String {
    let mut token = String::new();
    token.push(chars[pos]);
    pos += 1;
    while pos < chars.len() {
        let chr = chars[pos];
        pos += 1;
        if chr == '.' {
            break;
        }
        token.push(chr);
    }
    token
}
