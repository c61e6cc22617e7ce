//! SQL text for every statement the store issues.
//!
//! Statements are rendered once per (table, dialect) pair and reused.
//! The table name is validated and quoted; values are always bound as
//! parameters.

use crate::dialect::Dialect;
use crate::{Result, SqlKvError};

/// Maximum identifier length (PostgreSQL limit is 63 bytes).
const MAX_IDENTIFIER_LEN: usize = 63;

const INDEX_SUFFIX: &str = "_name_idx";

/// Longest table name whose derived index name still fits `MAX_IDENTIFIER_LEN`.
pub const MAX_TABLE_LEN: usize = MAX_IDENTIFIER_LEN - INDEX_SUFFIX.len();

/// Quotes a SQL identifier.
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name)
}

/// Validates a table name.
///
/// Only plain identifiers are accepted. SQLite and PostgreSQL disagree on
/// where a schema prefix goes in `CREATE INDEX`, so `schema.table` is
/// rejected rather than rendered wrong on one of them. Names are always
/// quoted, so SQL keywords such as `user` or `order` are fine.
pub fn validate_identifier(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(SqlKvError::Validation("Identifier cannot be empty".to_string()));
    }

    if name.contains('.') {
        return Err(SqlKvError::Validation(format!(
            "Identifier '{}' must not be schema-qualified",
            name
        )));
    }

    if name.len() > MAX_TABLE_LEN {
        return Err(SqlKvError::Validation(format!(
            "Identifier '{}' exceeds maximum length of {}",
            name, MAX_TABLE_LEN
        )));
    }

    let first_char = name.chars().next().ok_or_else(|| {
        SqlKvError::Validation(format!("Identifier '{}' is empty or invalid", name))
    })?;
    if !first_char.is_ascii_alphabetic() && first_char != '_' {
        return Err(SqlKvError::Validation(format!(
            "Identifier '{}' must start with a letter or underscore",
            name
        )));
    }

    for ch in name.chars() {
        if !ch.is_ascii_alphanumeric() && ch != '_' {
            return Err(SqlKvError::Validation(format!(
                "Identifier '{}' contains invalid character '{}'",
                name, ch
            )));
        }
    }

    // SQLite refuses to create objects with this prefix
    if name.to_lowercase().starts_with("sqlite_") {
        return Err(SqlKvError::Validation(format!(
            "Identifier '{}' uses a prefix reserved by SQLite",
            name
        )));
    }

    Ok(())
}

/// Name of the secondary index on the `name` column.
pub fn index_name(table: &str) -> String {
    format!("{}{}", table, INDEX_SUFFIX)
}

/// Pre-rendered statements for one table and dialect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statements {
    pub create_table: String,
    pub create_index: String,
    pub select_by_name: String,
    pub select_all: String,
    pub insert: String,
    pub update: String,
    pub delete: String,
    pub clear: String,
}

impl Statements {
    /// Renders all statements. The table name must already be validated.
    pub fn new(table: &str, dialect: Dialect) -> Self {
        let quoted = quote_identifier(table);
        let p1 = dialect.placeholder(1);
        let p2 = dialect.placeholder(2);

        Self {
            create_table: format!(
                "CREATE TABLE IF NOT EXISTS {} (name TEXT NOT NULL PRIMARY KEY, value TEXT)",
                quoted
            ),
            create_index: format!(
                "CREATE INDEX IF NOT EXISTS {} ON {} (name)",
                quote_identifier(&index_name(table)),
                quoted
            ),
            select_by_name: format!("SELECT name, value FROM {} WHERE name = {}", quoted, p1),
            select_all: format!("SELECT name, value FROM {}", quoted),
            insert: format!("INSERT INTO {} (value, name) VALUES ({}, {})", quoted, p1, p2),
            update: format!("UPDATE {} SET value = {} WHERE name = {}", quoted, p1, p2),
            delete: format!("DELETE FROM {} WHERE name = {}", quoted, p1),
            clear: format!("DELETE FROM {}", quoted),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_identifier() {
        assert_eq!(quote_identifier("kvstore"), "\"kvstore\"");
    }

    #[test]
    fn test_validate_identifier_accepts() {
        assert!(validate_identifier("kvstore").is_ok());
        assert!(validate_identifier("_app_settings2").is_ok());
        assert!(validate_identifier(&"k".repeat(MAX_TABLE_LEN)).is_ok());
    }

    #[test]
    fn test_validate_identifier_accepts_keywords() {
        for name in ["user", "order", "values", "set", "TABLE", "pg_settings"] {
            assert!(validate_identifier(name).is_ok(), "{} should be accepted", name);
        }
    }

    #[test]
    fn test_validate_identifier_rejects() {
        assert!(validate_identifier("").is_err());
        assert!(validate_identifier("1table").is_err());
        assert!(validate_identifier("kv store").is_err());
        assert!(validate_identifier("kv;DROP TABLE users").is_err());
        assert!(validate_identifier("sqlite_master").is_err());
        assert!(validate_identifier(&"k".repeat(MAX_TABLE_LEN + 1)).is_err());
    }

    #[test]
    fn test_validate_identifier_rejects_schema_qualified() {
        let err = validate_identifier("main.settings").unwrap_err();
        assert!(matches!(err, SqlKvError::Validation(msg) if msg.contains("schema-qualified")));
        assert!(validate_identifier("public.").is_err());
    }

    #[test]
    fn test_validate_identifier_rejects_lookalikes() {
        // Fullwidth letters must not pass as their ASCII counterparts
        assert!(validate_identifier("ｋｖｓｔｏｒｅ").is_err());
    }

    #[test]
    fn test_validate_identifier_error_kind() {
        let err = validate_identifier("bad-name").unwrap_err();
        assert!(matches!(err, SqlKvError::Validation(msg) if msg.contains('-')));
    }

    #[test]
    fn test_index_name() {
        assert_eq!(index_name("kvstore"), "kvstore_name_idx");
    }

    #[test]
    fn test_index_name_fits_postgres_limit() {
        let table = "t".repeat(MAX_TABLE_LEN);
        assert!(validate_identifier(&table).is_ok());
        assert_eq!(index_name(&table).len(), MAX_IDENTIFIER_LEN);
    }

    #[test]
    fn test_statements_generic() {
        let sql = Statements::new("kvstore", Dialect::Generic);
        assert_eq!(
            sql.create_table,
            "CREATE TABLE IF NOT EXISTS \"kvstore\" (name TEXT NOT NULL PRIMARY KEY, value TEXT)"
        );
        assert_eq!(
            sql.create_index,
            "CREATE INDEX IF NOT EXISTS \"kvstore_name_idx\" ON \"kvstore\" (name)"
        );
        assert_eq!(sql.select_by_name, "SELECT name, value FROM \"kvstore\" WHERE name = ?");
        assert_eq!(sql.select_all, "SELECT name, value FROM \"kvstore\"");
        assert_eq!(sql.insert, "INSERT INTO \"kvstore\" (value, name) VALUES (?, ?)");
        assert_eq!(sql.update, "UPDATE \"kvstore\" SET value = ? WHERE name = ?");
        assert_eq!(sql.delete, "DELETE FROM \"kvstore\" WHERE name = ?");
        assert_eq!(sql.clear, "DELETE FROM \"kvstore\"");
    }

    #[test]
    fn test_statements_numbered() {
        let sql = Statements::new("kvstore", Dialect::Numbered);
        assert_eq!(sql.select_by_name, "SELECT name, value FROM \"kvstore\" WHERE name = $1");
        assert_eq!(sql.insert, "INSERT INTO \"kvstore\" (value, name) VALUES ($1, $2)");
        assert_eq!(sql.update, "UPDATE \"kvstore\" SET value = $1 WHERE name = $2");
        assert_eq!(sql.delete, "DELETE FROM \"kvstore\" WHERE name = $1");
    }

    #[test]
    fn test_statements_dialect_only_changes_placeholders() {
        let generic = Statements::new("kvstore", Dialect::Generic);
        let numbered = Statements::new("kvstore", Dialect::Numbered);
        assert_eq!(generic.create_table, numbered.create_table);
        assert_eq!(generic.create_index, numbered.create_index);
        assert_eq!(generic.select_all, numbered.select_all);
        assert_eq!(generic.clear, numbered.clear);
        assert_ne!(generic.insert, numbered.insert);
    }
}
