//! The key-value store.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use sqlx::any::AnyRow;
use sqlx::AnyPool;
use sqlx::Row as SqlxRow;
use tracing::{debug, info, instrument, warn};

use crate::codec::KvValue;
use crate::dialect::Dialect;
use crate::query::{validate_identifier, Statements};
use crate::Result;

/// One (name, value) row of the backing table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KvEntry {
    pub name: String,
    /// NULL in storage is read as an empty string
    pub value: String,
}

impl KvEntry {
    fn from_row(row: &AnyRow) -> Result<Self> {
        let name: String = row.try_get("name")?;
        let value: Option<String> = row.try_get("value")?;
        Ok(Self {
            name,
            value: value.unwrap_or_default(),
        })
    }
}

/// Typed key-value access over a single two-column table.
///
/// The store borrows a caller-owned pool and never closes it. Every call
/// goes straight to the database; there is no caching and no transaction
/// around the read-then-write in [`KvStore::set_string`], so two concurrent
/// writers of a brand-new key can race on the primary key (one of them gets
/// a `Conflict` error).
///
/// ```rust,ignore
/// use sqlkv::KvStore;
///
/// let store = KvStore::new(&pool, "kvstore").await?;
/// store.set_int("age", 25).await?;
/// assert_eq!(store.int("age").await?, 25);
/// ```
#[derive(Debug)]
pub struct KvStore<'a> {
    pool: &'a AnyPool,
    table: String,
    dialect: Dialect,
    sql: Statements,
    table_ensured: bool,
}

impl<'a> KvStore<'a> {
    /// Opens a store on `table` using `?` placeholders, creating the table
    /// if needed.
    ///
    /// # Errors
    ///
    /// Returns error if the table name is invalid or the DDL fails.
    pub async fn new(pool: &'a AnyPool, table: &str) -> Result<Self> {
        Self::with_dialect(pool, table, Dialect::default()).await
    }

    /// Opens a store with an explicit placeholder dialect.
    pub async fn with_dialect(pool: &'a AnyPool, table: &str, dialect: Dialect) -> Result<Self> {
        validate_identifier(table)?;

        let mut store = Self {
            pool,
            table: table.to_string(),
            dialect,
            sql: Statements::new(table, dialect),
            table_ensured: false,
        };
        store.ensure_table().await?;
        Ok(store)
    }

    /// Table backing this store.
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Placeholder dialect used for every statement this store issues.
    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Switches placeholder syntax for all subsequent statements.
    pub fn set_dialect(&mut self, dialect: Dialect) {
        if dialect != self.dialect {
            debug!(table = %self.table, from = %self.dialect, to = %dialect, "Switching dialect");
            self.dialect = dialect;
            self.sql = Statements::new(&self.table, dialect);
        }
    }

    /// Creates the table and its name index once per store instance.
    #[instrument(skip(self), fields(table = %self.table))]
    async fn ensure_table(&mut self) -> Result<()> {
        if self.table_ensured {
            return Ok(());
        }

        sqlx::query(&self.sql.create_table).execute(self.pool).await?;
        sqlx::query(&self.sql.create_index).execute(self.pool).await?;

        self.table_ensured = true;
        info!("Table ready");
        Ok(())
    }

    /// Looks up a row. `Ok(None)` means the key is absent.
    async fn row_by_key(&self, name: &str) -> Result<Option<KvEntry>> {
        let row = sqlx::query(&self.sql.select_by_name)
            .bind(name)
            .fetch_optional(self.pool)
            .await?;

        row.as_ref().map(KvEntry::from_row).transpose()
    }

    /// Reads `name` as `T`, returning `T`'s zero value when absent.
    ///
    /// # Errors
    ///
    /// Database failures, or `Parse` when the stored text is not a valid `T`.
    #[instrument(skip(self), fields(table = %self.table, kind = T::TYPE_NAME))]
    pub async fn get<T: KvValue>(&self, name: &str) -> Result<T> {
        let raw = self.raw(name).await?;
        T::decode(name, &raw).inspect_err(|e| warn!(error = %e, "Stored value did not decode"))
    }

    /// Stores `value` under `name` in its canonical text form.
    #[instrument(skip(self, value), fields(table = %self.table, kind = T::TYPE_NAME))]
    pub async fn set<T: KvValue>(&self, name: &str, value: &T) -> Result<()> {
        self.write(name, &value.encode()).await
    }

    async fn raw(&self, name: &str) -> Result<String> {
        let value = self
            .row_by_key(name)
            .await?
            .map(|entry| entry.value)
            .unwrap_or_default();
        Ok(value)
    }

    async fn write(&self, name: &str, value: &str) -> Result<()> {
        let sql = match self.row_by_key(name).await? {
            None => &self.sql.insert,
            Some(_) => &self.sql.update,
        };

        sqlx::query(sql)
            .bind(value)
            .bind(name)
            .execute(self.pool)
            .await?;

        debug!(key = name, "Value written");
        Ok(())
    }

    /// Stored string, or `""` when absent.
    pub async fn string(&self, name: &str) -> Result<String> {
        self.get(name).await
    }

    /// Inserts or updates `name`.
    pub async fn set_string(&self, name: &str, value: &str) -> Result<()> {
        self.write(name, value).await
    }

    /// Stored integer, or `0` when absent.
    pub async fn int(&self, name: &str) -> Result<i64> {
        self.get(name).await
    }

    /// Stores `value` as base-10 text.
    pub async fn set_int(&self, name: &str, value: i64) -> Result<()> {
        self.set(name, &value).await
    }

    /// Stored float, or `0.0` when absent.
    pub async fn float(&self, name: &str) -> Result<f32> {
        self.get(name).await
    }

    /// Stores `value` as the shortest decimal that reads back to the same `f32`.
    pub async fn set_float(&self, name: &str, value: f32) -> Result<()> {
        self.set(name, &value).await
    }

    /// True only for stored `"1"` or `"true"` (any case).
    pub async fn bool(&self, name: &str) -> Result<bool> {
        self.get(name).await
    }

    /// Stores `"1"` for true and `"0"` for false.
    pub async fn set_bool(&self, name: &str, value: bool) -> Result<()> {
        self.set(name, &value).await
    }

    /// Stored timestamp, or [`crate::zero_timestamp`] when absent.
    pub async fn time(&self, name: &str) -> Result<DateTime<FixedOffset>> {
        self.get(name).await
    }

    /// Stores `value` as RFC 3339, keeping nanoseconds and the offset.
    pub async fn set_time(&self, name: &str, value: DateTime<FixedOffset>) -> Result<()> {
        self.set(name, &value).await
    }

    /// Removes `name`. Deleting an absent key is not an error.
    #[instrument(skip(self), fields(table = %self.table))]
    pub async fn delete(&self, name: &str) -> Result<()> {
        let result = sqlx::query(&self.sql.delete)
            .bind(name)
            .execute(self.pool)
            .await?;
        debug!(rows_affected = result.rows_affected(), "Delete complete");
        Ok(())
    }

    /// True if a row exists for `name`, even with an empty value.
    #[instrument(skip(self), fields(table = %self.table))]
    pub async fn has_key(&self, name: &str) -> Result<bool> {
        Ok(self.row_by_key(name).await?.is_some())
    }

    /// Every row in the table, in no particular order.
    #[instrument(skip(self), fields(table = %self.table))]
    pub async fn all(&self) -> Result<Vec<KvEntry>> {
        let rows = sqlx::query(&self.sql.select_all)
            .fetch_all(self.pool)
            .await?;

        let entries = rows
            .iter()
            .map(KvEntry::from_row)
            .collect::<Result<Vec<_>>>()?;
        debug!(count = entries.len(), "Enumerated entries");
        Ok(entries)
    }

    /// Deletes every row, keeping the table.
    #[instrument(skip(self), fields(table = %self.table))]
    pub async fn clear(&self) -> Result<()> {
        let result = sqlx::query(&self.sql.clear).execute(self.pool).await?;
        info!(rows_affected = result.rows_affected(), "Table cleared");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_serializes_as_object() {
        let entry = KvEntry {
            name: "username".to_string(),
            value: "John".to_string(),
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json, serde_json::json!({"name": "username", "value": "John"}));
    }

    #[test]
    fn test_entry_deserializes() {
        let entry: KvEntry = serde_json::from_str(r#"{"name":"age","value":"25"}"#).unwrap();
        assert_eq!(entry.name, "age");
        assert_eq!(entry.value, "25");
    }
}
