//! SQL generated on behalf of table tabs

use serde_json::Value as JsonValue;
use sqlbench_core::Driver;

use crate::tab::Tab;

/// Browse query for a table tab: `SELECT * FROM <table> [WHERE] [ORDER BY] [LIMIT]`.
///
/// Returns `None` when the tab is not bound to a table.
pub fn build_table_query(tab: &Tab, driver: &Driver) -> Option<String> {
    let table = tab.active_table.as_deref()?;
    let mut sql = format!(
        "SELECT * FROM {}",
        driver.quote_table_ref(table, tab.schema.as_deref())
    );

    if let Some(filter) = non_blank(tab.filter_clause.as_deref()) {
        sql.push_str(&format!(" WHERE {}", filter));
    }
    if let Some(sort) = non_blank(tab.sort_clause.as_deref()) {
        sql.push_str(&format!(" ORDER BY {}", sort));
    }
    if let Some(limit) = tab.limit_clause {
        sql.push_str(&format!(" LIMIT {}", limit));
    }

    Some(sql)
}

fn non_blank(fragment: Option<&str>) -> Option<&str> {
    fragment.map(str::trim).filter(|f| !f.is_empty())
}

/// `UPDATE ... SET <column> = DEFAULT WHERE <pk> = <value>`
///
/// Resetting a cell to its default cannot be expressed as a value, so this
/// goes through plain statement execution instead of a row update.
pub fn build_reset_to_default(
    driver: &Driver,
    table: &str,
    schema: Option<&str>,
    column: &str,
    pk_column: &str,
    pk_value: &JsonValue,
) -> String {
    format!(
        "UPDATE {} SET {} = DEFAULT WHERE {} = {}",
        driver.quote_table_ref(table, schema),
        driver.quote_identifier(column),
        driver.quote_identifier(pk_column),
        sql_literal(pk_value)
    )
}

/// Render a JSON value as a SQL literal
pub fn sql_literal(value: &JsonValue) -> String {
    match value {
        JsonValue::Null => "NULL".to_string(),
        JsonValue::Bool(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
        JsonValue::Number(n) => n.to_string(),
        JsonValue::String(s) => format!("'{}'", s.replace('\'', "''")),
        other => format!("'{}'", other.to_string().replace('\'', "''")),
    }
}
