//! Tests for parameter extraction and interpolation

use super::*;
use pretty_assertions::assert_eq;

fn values(pairs: &[(&str, &str)]) -> ParamValues {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[test]
fn test_extract_named_parameters() {
    let params = extract_query_params("SELECT * FROM users WHERE id = :id AND name = :name");
    assert_eq!(params, vec!["id", "name"]);
}

#[test]
fn test_duplicate_parameters_collapse() {
    let params = extract_query_params("SELECT * FROM t WHERE id = :id OR parent_id = :id");
    assert_eq!(params, vec!["id"]);
}

#[test]
fn test_cast_is_not_a_parameter() {
    assert!(extract_query_params("SELECT created_at::date FROM t").is_empty());
    assert!(extract_query_params("SELECT x:::text FROM t").is_empty());
    assert_eq!(
        extract_query_params("SELECT :value::int, '{}'::jsonb"),
        vec!["value"]
    );
}

#[test]
fn test_lone_colon_is_ignored() {
    assert!(extract_query_params("SELECT 1 : 2").is_empty());
    assert!(extract_query_params("SELECT ':'").is_empty());
}

#[test]
fn test_parameter_name_stops_at_non_word() {
    assert_eq!(extract_query_params("WHERE a=:a1,b=:b_2)"), vec!["a1", "b_2"]);
}

#[test]
fn test_occurrence_offsets() {
    let sql = "id = :id";
    let occ = param_occurrences(sql);
    assert_eq!(occ.len(), 1);
    assert_eq!(&sql[occ[0].start..occ[0].end], ":id");
}

#[test]
fn test_interpolate_replaces_all_occurrences() {
    let sql = "SELECT * FROM t WHERE id = :id OR parent_id = :id";
    let result = interpolate_query_params(sql, &values(&[("id", "5")]));
    assert_eq!(result, "SELECT * FROM t WHERE id = 5 OR parent_id = 5");
}

#[test]
fn test_interpolate_leaves_unknown_names() {
    let sql = "SELECT * FROM t WHERE id = :id AND name = :name";
    let result = interpolate_query_params(sql, &values(&[("id", "7")]));
    assert_eq!(result, "SELECT * FROM t WHERE id = 7 AND name = :name");
}

#[test]
fn test_interpolate_respects_word_boundaries() {
    let sql = "WHERE a = :id AND b = :identifier";
    let result = interpolate_query_params(sql, &values(&[("id", "1")]));
    assert_eq!(result, "WHERE a = 1 AND b = :identifier");
}

#[test]
fn test_interpolate_leaves_casts_untouched() {
    let sql = "SELECT :day::date, created::date";
    let result = interpolate_query_params(sql, &values(&[("day", "'2024-01-01'"), ("date", "X")]));
    assert_eq!(result, "SELECT '2024-01-01'::date, created::date");
}

#[test]
fn test_missing_query_params() {
    let sql = "WHERE a = :a AND b = :b AND c = :a";
    assert_eq!(missing_query_params(sql, &values(&[("a", "1")])), vec!["b"]);
    assert!(missing_query_params(sql, &values(&[("a", "1"), ("b", "2")])).is_empty());
}
