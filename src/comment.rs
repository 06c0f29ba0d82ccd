//! Locating and formatting the documentation comment for a declaration.
//!
//! The comment list is ordered by source position, so the entry ending on
//! the line above a declaration is found by binary search. Contiguous line
//! comments merge upward into one block; block comments attach as-is.

use crate::parsing::source::Comment;
use crate::symbol::{DocState, Identifier};

const SIGNET: &str = "mandox";

/// Look up (and cache) the documentation for a matched identifier, banner
/// formatting included. `None` when no comment precedes the declaration.
pub fn documentation(
    identifier: &Identifier,
    comments: &[Comment],
    namespace: Option<&str>,
) -> Option<String> {
    let state = identifier.doc_or_init(|| {
        match find_comment(identifier.location().line, comments) {
            Some(text) => DocState::Found(text),
            None => DocState::Absent,
        }
    });
    match state {
        DocState::Found(text) => Some(format_banner(text, namespace)),
        _ => None,
    }
}

/// Binary-search for the comment ending on the line directly above the
/// declaration. The search ends when the midpoint stops moving.
fn find_comment(declaration_line: u32, comments: &[Comment]) -> Option<String> {
    if comments.is_empty() || declaration_line == 0 {
        return None;
    }
    let target = declaration_line as i64 - 1;
    let mut min = 0i64;
    let mut max = comments.len() as i64;
    let mut old_mid = None;
    loop {
        let mid = min + (max - min) / 2;
        if old_mid == Some(mid) {
            return None;
        }
        let diff = target - comments[mid as usize].span.end.line as i64;
        if diff == 0 {
            return Some(collect_comment(comments, mid as usize));
        }
        if diff < 1 {
            max = mid;
        } else {
            min = mid;
        }
        old_mid = Some(mid);
    }
}

/// Merge a run of contiguous line comments upward into one block, in source
/// order. Block comments and comments at position 0 are used as-is.
fn collect_comment(comments: &[Comment], index: usize) -> String {
    let comment = &comments[index];
    if !comment.is_line() || index == 0 {
        return comment.text.clone();
    }
    let mut block = String::new();
    let mut index = index;
    let mut current = comment;
    loop {
        block = format!("{}\n{}", current.text, block);
        let block_start = current.span.end.line;
        if index == 0 {
            break;
        }
        index -= 1;
        current = &comments[index];
        if !(current.is_line() && current.span.end.line + 1 == block_start) {
            break;
        }
    }
    block
}

fn format_banner(text: &str, namespace: Option<&str>) -> String {
    let raw_lines: Vec<&str> = text.trim_end_matches(['\r', '\n']).lines().collect();
    let total = raw_lines.len();
    let mut longest = 0;
    let mut body = Vec::new();
    for (i, line) in raw_lines.iter().enumerate() {
        // A lone `*` at either end is block-comment furniture.
        if *line == "*" && (i == 0 || i + 1 == total) {
            continue;
        }
        let entry = format!("  {}", strip_leading_asterisk(line));
        longest = longest.max(entry.chars().count());
        body.push(entry);
    }

    let mut title = SIGNET.to_string();
    if let Some(namespace) = namespace {
        title.push_str(": ");
        title.push_str(namespace);
    }
    let dash_len = 3.max((longest as i64 - title.chars().count() as i64) / 2) as usize;
    let dashes = "-".repeat(dash_len);

    let mut lines = vec![format!("{dashes} {title} {dashes}"), String::new()];
    lines.extend(body);
    lines.push(String::new());
    lines.push(format!("{dashes} /{title} {dashes}"));
    lines.join("\n")
}

fn strip_leading_asterisk(line: &str) -> &str {
    match line.strip_prefix('*') {
        Some(rest) => rest.strip_prefix(|c: char| c.is_whitespace()).unwrap_or(rest),
        None => line,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::source::CommentKind;
    use crate::types::{SourceLocation, Span};

    fn line_comment(text: &str, line: u32) -> Comment {
        Comment {
            kind: CommentKind::Line,
            text: text.to_string(),
            span: Span::new(SourceLocation::new(line, 0), SourceLocation::new(line, 10)),
        }
    }

    fn block_comment(text: &str, start: u32, end: u32) -> Comment {
        Comment {
            kind: CommentKind::Block,
            text: text.to_string(),
            span: Span::new(SourceLocation::new(start, 0), SourceLocation::new(end, 2)),
        }
    }

    #[test]
    fn test_three_contiguous_line_comments_merge_in_order() {
        let comments = vec![
            line_comment(" one", 1),
            line_comment(" two", 2),
            line_comment(" three", 3),
        ];
        let found = find_comment(4, &comments).expect("comment");
        assert_eq!(found, " one\n two\n three\n");
    }

    #[test]
    fn test_gap_breaks_the_merge() {
        let comments = vec![line_comment(" far", 1), line_comment(" near", 3)];
        let found = find_comment(4, &comments).expect("comment");
        assert_eq!(found, " near\n", "line 1 is not contiguous with line 3");
    }

    #[test]
    fn test_block_comment_attaches_without_merging() {
        let comments = vec![line_comment(" stray", 1), block_comment(" doc ", 2, 3)];
        let found = find_comment(4, &comments).expect("comment");
        assert_eq!(found, " doc ");
    }

    #[test]
    fn test_comment_with_gap_before_declaration_is_not_attached() {
        let comments = vec![block_comment(" doc ", 1, 2)];
        assert!(
            find_comment(5, &comments).is_none(),
            "a blank line between comment and declaration must detach it"
        );
    }

    #[test]
    fn test_banner_contains_title_and_namespace() {
        let banner = format_banner("a very long documentation line here\n", Some("demo"));
        assert!(banner.contains("mandox: demo"), "banner: {banner}");
        assert!(banner.contains("/mandox: demo"), "banner: {banner}");
        assert!(banner.starts_with('-'), "banner: {banner}");
    }

    #[test]
    fn test_banner_dash_floor() {
        let banner = format_banner("x\n", None);
        assert!(
            banner.starts_with("--- mandox ---"),
            "short lines still get the minimum dash run: {banner}"
        );
    }

    #[test]
    fn test_block_furniture_stripped() {
        let banner = format_banner("*\n * Adds two numbers.\n ", None);
        assert!(
            !banner.contains("\n  *\n"),
            "lone asterisk line must be dropped: {banner}"
        );
        assert!(banner.contains("Adds two numbers."), "banner: {banner}");
    }
}
