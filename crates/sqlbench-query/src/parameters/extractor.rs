//! Placeholder scanning

use std::collections::HashSet;

/// One `:name` placeholder found in a query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamOccurrence {
    /// Byte offset of the leading colon
    pub start: usize,
    /// Byte offset just past the name
    pub end: usize,
    pub name: String,
}

fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// Find every placeholder occurrence in order.
///
/// A run of two or more colons is a cast operator and is skipped as a whole,
/// so `x::int` and `x:::int` yield nothing.
pub fn param_occurrences(sql: &str) -> Vec<ParamOccurrence> {
    let bytes = sql.as_bytes();
    let mut occurrences = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b':' {
            i += 1;
            continue;
        }

        let run_start = i;
        while i < bytes.len() && bytes[i] == b':' {
            i += 1;
        }
        if i - run_start > 1 {
            continue;
        }

        let name_start = i;
        while i < bytes.len() && is_word_byte(bytes[i]) {
            i += 1;
        }
        if i > name_start {
            occurrences.push(ParamOccurrence {
                start: run_start,
                end: i,
                name: sql[name_start..i].to_string(),
            });
        }
    }

    occurrences
}

/// Distinct parameter names in order of first appearance
pub fn extract_query_params(sql: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    param_occurrences(sql)
        .into_iter()
        .filter(|occ| seen.insert(occ.name.clone()))
        .map(|occ| occ.name)
        .collect()
}
