//! Single-table detection for simple reads

use regex::Regex;
use std::sync::LazyLock;

static COMMENT_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"--[^\n]*|/\*[\s\S]*?\*/").expect("valid regex"));

static WHITESPACE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

static SELECT_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^select\b").expect("valid regex"));

// Aggregates don't map 1:1 onto table rows
static AGGREGATE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:count|sum|avg|min|max)\s*\(|\bgroup\s+by\b").expect("valid regex")
});

static FROM_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bfrom\s+").expect("valid regex"));

/// Extract the table a simple `SELECT ... FROM <table>` reads from.
///
/// Returns `None` for anything that is not a plain single-table read:
/// non-SELECT statements, aggregate queries, or a FROM clause that does not
/// start with an identifier (e.g. a subquery). For a schema-qualified
/// reference the bare table name is returned.
pub fn extract_table_name(sql: &str) -> Option<String> {
    let without_comments = COMMENT_REGEX.replace_all(sql, " ");
    let normalized = WHITESPACE_REGEX.replace_all(&without_comments, " ");
    let normalized = normalized.trim();

    if !SELECT_REGEX.is_match(normalized) || AGGREGATE_REGEX.is_match(normalized) {
        return None;
    }

    let from = FROM_REGEX.find(normalized)?;
    let parts = parse_identifier_chain(&normalized[from.end()..]);
    parts.into_iter().last()
}

/// Parse `a.b` / `"a"."b"` / `` `a`.`b` `` / `[a].[b]` into its parts.
fn parse_identifier_chain(input: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut rest = input;

    loop {
        let (part, remaining) = match rest.chars().next() {
            Some(open @ ('`' | '"' | '[')) => {
                let close = if open == '[' { ']' } else { open };
                let body = &rest[1..];
                match body.find(close) {
                    Some(end) => (body[..end].to_string(), &body[end + 1..]),
                    None => break,
                }
            }
            Some(c) if c.is_alphanumeric() || c == '_' => {
                let end = rest
                    .find(|ch: char| !(ch.is_alphanumeric() || ch == '_' || ch == '$'))
                    .unwrap_or(rest.len());
                (rest[..end].to_string(), &rest[end..])
            }
            _ => break,
        };

        if part.is_empty() {
            break;
        }
        parts.push(part);

        match remaining.strip_prefix('.') {
            Some(after_dot) => rest = after_dot,
            None => break,
        }
    }

    parts
}
