//! Table metadata returned by schema introspection

use serde::{Deserialize, Serialize};

/// Column information
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableColumn {
    pub name: String,
    pub data_type: String,
    pub is_pk: bool,
    pub is_nullable: bool,
    pub is_auto_increment: bool,
    /// Default value expression, if the column has one
    #[serde(default)]
    pub default_value: Option<String>,
}

impl TableColumn {
    /// Create a nullable, non-key column with no default
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            is_pk: false,
            is_nullable: true,
            is_auto_increment: false,
            default_value: None,
        }
    }

    pub fn primary_key(mut self) -> Self {
        self.is_pk = true;
        self.is_nullable = false;
        self
    }

    pub fn auto_increment(mut self) -> Self {
        self.is_auto_increment = true;
        self
    }

    pub fn not_null(mut self) -> Self {
        self.is_nullable = false;
        self
    }

    pub fn with_default(mut self, expr: impl Into<String>) -> Self {
        self.default_value = Some(expr.into());
        self
    }

    pub fn has_default(&self) -> bool {
        self.default_value.is_some()
    }

    /// Whether an insert must supply a value for this column
    pub fn is_required(&self) -> bool {
        !self.is_nullable && !self.has_default() && !self.is_auto_increment
    }
}

/// Foreign key information
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKey {
    pub name: String,
    pub column_name: String,
    pub ref_table: String,
    pub ref_column: String,
    pub on_delete: Option<String>,
    pub on_update: Option<String>,
}

/// Index information, one entry per indexed column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexInfo {
    pub name: String,
    pub column_name: String,
    pub is_unique: bool,
    pub is_primary: bool,
    pub seq_in_index: i32,
}

/// A table with its columns and foreign keys, as stored in the schema cache
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    pub name: String,
    /// Schema (namespace) the table lives in, when the backend reports one
    #[serde(default)]
    pub schema: Option<String>,
    pub columns: Vec<TableColumn>,
    pub foreign_keys: Vec<ForeignKey>,
}

impl TableSchema {
    pub fn new(name: impl Into<String>, columns: Vec<TableColumn>) -> Self {
        Self {
            name: name.into(),
            schema: None,
            columns,
            foreign_keys: Vec::new(),
        }
    }

    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    pub fn with_foreign_keys(mut self, foreign_keys: Vec<ForeignKey>) -> Self {
        self.foreign_keys = foreign_keys;
        self
    }

    pub fn column(&self, name: &str) -> Option<&TableColumn> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Names of the primary key columns in declaration order
    pub fn primary_key_columns(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|c| c.is_pk)
            .map(|c| c.name.as_str())
            .collect()
    }
}

/// Find `table` in a snapshot.
///
/// With a schema only the table in that schema matches. Without one the name
/// must be unique across the snapshot. `None` means the snapshot cannot
/// answer unambiguously and the caller should ask the backend.
pub fn find_table<'a>(
    tables: &'a [TableSchema],
    table: &str,
    schema: Option<&str>,
) -> Option<&'a TableSchema> {
    match schema.filter(|s| !s.is_empty()) {
        Some(schema) => tables
            .iter()
            .find(|t| t.name == table && t.schema.as_deref() == Some(schema)),
        None => {
            let mut named = tables.iter().filter(|t| t.name == table);
            let first = named.next()?;
            named.next().is_none().then_some(first)
        }
    }
}
