//! Reversible token encoding and bracket-path (de)serialization.
//!
//! Identifier path segments can contain characters that are illegal in
//! dot/bracket notation (spaces, dots, quotes, parentheses). Encoding each
//! segment to base64 before embedding it makes the serialized path
//! unambiguous to re-tokenize regardless of the original content.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CodecError {
    #[error("invalid base64 token: {0}")]
    Alphabet(#[from] base64::DecodeError),

    #[error("decoded token is not UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Encode an arbitrary segment into the bracket-safe alphabet.
pub fn encode(token: &str) -> String {
    STANDARD.encode(token.as_bytes())
}

/// Invert [`encode`]. `decode(encode(x)) == x` for all strings `x`.
pub fn decode(token: &str) -> Result<String, CodecError> {
    Ok(String::from_utf8(STANDARD.decode(token.as_bytes())?)?)
}

/// `a[1][2].b.c` --> `["a", "1", "2", "b.c"]`
///
/// Brackets flush the current token. A quote is dropped only when it sits
/// right after `[` or right before `]`. A `.` immediately preceded by `]`
/// is absorbed; any other `.` stays inside the current token, so `.b.c`
/// after a bracket continues as the single trailing segment `b.c`.
pub fn tokenize_path(path: &str) -> Vec<String> {
    let chars: Vec<char> = path.chars().collect();
    let mut token = String::new();
    let mut chain = Vec::new();
    for pos in 0..chars.len() {
        let chr = chars[pos];
        if chr == '[' || chr == ']' {
            if !token.is_empty() {
                chain.push(std::mem::take(&mut token));
            }
        } else {
            let bracket_quote = (chr == '"' || chr == '\'')
                && (pos.checked_sub(1).map(|p| chars[p]) == Some('[')
                    || chars.get(pos + 1) == Some(&']'));
            let absorbed_dot = chr == '.' && pos.checked_sub(1).map(|p| chars[p]) == Some(']');
            if !bracket_quote && !absorbed_dot {
                token.push(chr);
            }
        }
    }
    if !token.is_empty() {
        chain.push(token);
    }
    chain
}

/// `["a", "1", "c.d"]` --> `a["1"]["c.d"]`
pub fn serialize_path<S: AsRef<str>>(segments: &[S]) -> String {
    let mut out = String::new();
    for (i, segment) in segments.iter().enumerate() {
        if i == 0 {
            out.push_str(segment.as_ref());
        } else {
            out.push_str("[\"");
            out.push_str(segment.as_ref());
            out.push_str("\"]");
        }
    }
    out
}

/// Tokenize an encoded frame path and decode each segment.
pub fn decode_segments(frame: &str) -> Result<Vec<String>, CodecError> {
    tokenize_path(frame)
        .iter()
        .map(|segment| decode(segment))
        .collect()
}

/// Turn an encoded frame path back into plain bracket notation, ready for
/// evaluation by an environment lookup.
pub fn decode_path(frame: &str) -> Result<String, CodecError> {
    Ok(serialize_path(&decode_segments(frame)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_decode_round_trip() {
        for s in [
            "",
            "plain",
            "y (z)",
            "a.b.c",
            "we['ird\"]",
            "bracket ] dot . quote '",
        ] {
            assert_eq!(
                decode(&encode(s)).unwrap(),
                s,
                "round trip failed for {s:?}"
            );
        }
    }

    #[test]
    fn test_tokenize_mixed_brackets_and_dots() {
        assert_eq!(tokenize_path("a[1][2].b.c"), vec!["a", "1", "2", "b.c"]);
    }

    #[test]
    fn test_tokenize_strips_bracket_adjacent_quotes() {
        assert_eq!(tokenize_path(r#"a["b.c"]"#), vec!["a", "b.c"]);
        assert_eq!(tokenize_path("a['y (z)']"), vec!["a", "y (z)"]);
    }

    #[test]
    fn test_tokenize_plain_dotted_name_is_one_segment() {
        assert_eq!(tokenize_path("a.b"), vec!["a.b"]);
    }

    #[test]
    fn test_serialize_tokenize_round_trip() {
        let segments = vec!["a", "1", "c.d", "y (z)"];
        let serialized = serialize_path(&segments);
        assert_eq!(serialized, r#"a["1"]["c.d"]["y (z)"]"#);
        assert_eq!(tokenize_path(&serialized), segments);
    }

    #[test]
    fn test_decode_path() {
        let frame = format!("{}[\"{}\"]", encode("x"), encode("y (z)"));
        assert_eq!(decode_path(&frame).unwrap(), r#"x["y (z)"]"#);
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(decode("!!not base64!!").is_err());
    }
}
