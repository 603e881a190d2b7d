//! Textual substitution of parameter values

use std::collections::HashMap;

use super::param_occurrences;

/// Parameter name to the literal text substituted for it
pub type ParamValues = HashMap<String, String>;

/// Replace every `:name` whose name has a value.
///
/// Placeholders without a value and `::` casts are left as they are. Values
/// are inserted verbatim; quoting string values is up to the caller.
pub fn interpolate_query_params(sql: &str, values: &ParamValues) -> String {
    let mut result = String::with_capacity(sql.len());
    let mut last_end = 0;

    for occ in param_occurrences(sql) {
        if let Some(value) = values.get(&occ.name) {
            result.push_str(&sql[last_end..occ.start]);
            result.push_str(value);
            last_end = occ.end;
        }
    }

    result.push_str(&sql[last_end..]);
    result
}

/// Parameters used by the query that have no value yet
pub fn missing_query_params(sql: &str, values: &ParamValues) -> Vec<String> {
    super::extract_query_params(sql)
        .into_iter()
        .filter(|name| !values.contains_key(name))
        .collect()
}
