//! Dialect-aware identifier quoting
//!
//! MySQL and MariaDB quote identifiers with backticks; PostgreSQL, SQLite and
//! any driver we do not recognise use the SQL-standard double quote.

use std::fmt;

/// Database driver a connection talks to
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Driver {
    Mysql,
    Mariadb,
    Postgres,
    Sqlite,
    /// Any driver name not listed above
    Other(String),
}

impl Driver {
    /// Parse a driver name as reported by the connection settings
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "mysql" => Driver::Mysql,
            "mariadb" => Driver::Mariadb,
            "postgres" | "postgresql" => Driver::Postgres,
            "sqlite" | "sqlite3" => Driver::Sqlite,
            other => Driver::Other(other.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Driver::Mysql => "mysql",
            Driver::Mariadb => "mariadb",
            Driver::Postgres => "postgres",
            Driver::Sqlite => "sqlite",
            Driver::Other(name) => name,
        }
    }

    /// Character used to quote identifiers for this driver
    pub fn identifier_quote(&self) -> char {
        match self {
            Driver::Mysql | Driver::Mariadb => '`',
            _ => '"',
        }
    }

    /// Quote a single identifier, doubling any embedded quote character
    pub fn quote_identifier(&self, identifier: &str) -> String {
        let q = self.identifier_quote();
        let mut escaped = String::with_capacity(identifier.len() + 2);
        escaped.push(q);
        for c in identifier.chars() {
            if c == q {
                escaped.push(q);
            }
            escaped.push(c);
        }
        escaped.push(q);
        escaped
    }

    /// Quote a possibly schema-qualified table reference.
    ///
    /// An empty schema is treated the same as no schema.
    pub fn quote_table_ref(&self, table: &str, schema: Option<&str>) -> String {
        match schema.filter(|s| !s.is_empty()) {
            Some(schema) => format!(
                "{}.{}",
                self.quote_identifier(schema),
                self.quote_identifier(table)
            ),
            None => self.quote_identifier(table),
        }
    }
}

impl fmt::Display for Driver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Quote an identifier for the named driver
pub fn quote_identifier(identifier: &str, driver: &str) -> String {
    Driver::from_name(driver).quote_identifier(identifier)
}

/// Quote a table reference for the named driver
pub fn quote_table_ref(table: &str, driver: &str, schema: Option<&str>) -> String {
    Driver::from_name(driver).quote_table_ref(table, schema)
}
