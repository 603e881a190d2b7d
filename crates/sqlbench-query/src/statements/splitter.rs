//! Lexical statement splitter

/// Lexical state of the scanner. Exactly one is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LexState {
    Normal,
    /// Inside a literal opened by the given quote character
    Quoted(char),
    LineComment,
    BlockComment,
}

/// Split a script into trimmed, non-empty statements.
///
/// Only semicolons in the normal state end a statement. Quotes (`'`, `"` and
/// `` ` ``) escape themselves by doubling. Unterminated literals or comments
/// simply run to the end of the input.
pub fn split_queries(sql: &str) -> Vec<String> {
    let mut statements = Vec::new();
    let mut current = String::new();
    let mut state = LexState::Normal;
    let mut chars = sql.chars().peekable();

    while let Some(c) = chars.next() {
        let next = chars.peek().copied();
        match state {
            LexState::Normal => match c {
                ';' => {
                    flush(&mut current, &mut statements);
                    continue;
                }
                '\'' | '"' | '`' => state = LexState::Quoted(c),
                '-' if next == Some('-') => {
                    state = LexState::LineComment;
                    current.push(c);
                    current.push('-');
                    chars.next();
                    continue;
                }
                '/' if next == Some('*') => {
                    state = LexState::BlockComment;
                    current.push(c);
                    current.push('*');
                    chars.next();
                    continue;
                }
                _ => {}
            },
            LexState::Quoted(quote) => {
                if c == quote {
                    if next == Some(quote) {
                        // doubled quote stays inside the literal
                        current.push(c);
                        current.push(quote);
                        chars.next();
                        continue;
                    }
                    state = LexState::Normal;
                }
            }
            LexState::LineComment => {
                if c == '\n' {
                    state = LexState::Normal;
                }
            }
            LexState::BlockComment => {
                if c == '*' && next == Some('/') {
                    current.push(c);
                    current.push('/');
                    chars.next();
                    state = LexState::Normal;
                    continue;
                }
            }
        }
        current.push(c);
    }

    flush(&mut current, &mut statements);
    tracing::trace!(statement_count = statements.len(), "split script");
    statements
}

fn flush(current: &mut String, statements: &mut Vec<String>) {
    let trimmed = current.trim();
    if !trimmed.is_empty() {
        statements.push(trimmed.to_string());
    }
    current.clear();
}

/// Trim a statement and drop any trailing semicolons before execution
pub fn sanitize_statement(sql: &str) -> String {
    sql.trim().trim_end_matches(';').trim_end().to_string()
}

/// Check if a query is a SELECT statement
pub fn is_select_query(sql: &str) -> bool {
    sql.trim_start()
        .get(..6)
        .is_some_and(|head| head.eq_ignore_ascii_case("select"))
}
