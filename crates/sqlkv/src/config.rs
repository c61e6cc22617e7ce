//! Store configuration.
//!
//! Used by callers that let sqlkv open the pool for them (the CLI does).
//! `KvStore` itself only needs a table name and a borrowed pool.

use std::str::FromStr;

use crate::dialect::Dialect;
use crate::{Result, SqlKvError};

/// Default table name.
pub const DEFAULT_TABLE: &str = "kvstore";

/// Connection and table settings.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Database connection string (e.g. "sqlite://settings.db", "postgres://localhost/app")
    pub database_url: String,
    /// Backing table name
    pub table: String,
    /// Placeholder dialect; inferred from `database_url` when `None`
    pub dialect: Option<Dialect>,
    /// Maximum number of pooled connections
    pub max_connections: u32,
    /// Pool acquire timeout in seconds
    pub connect_timeout: u64,
}

impl StoreConfig {
    /// Create with explicit values.
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            table: DEFAULT_TABLE.to_string(),
            dialect: None,
            max_connections: 5,
            connect_timeout: 30,
        }
    }

    /// Create from environment variables.
    ///
    /// Reads SQLKV_DATABASE_URL (falling back to DATABASE_URL) and optionally
    /// SQLKV_TABLE, SQLKV_DIALECT and SQLKV_MAX_CONNECTIONS.
    pub fn from_env() -> Result<Self> {
        Self::from_vars(env_var)
    }

    /// Like [`StoreConfig::from_env`], reading variables through `lookup`.
    pub fn from_vars<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("SQLKV_DATABASE_URL")
            .or_else(|| lookup("DATABASE_URL"))
            .ok_or_else(|| {
                SqlKvError::Config(
                    "SQLKV_DATABASE_URL or DATABASE_URL environment variable not set".to_string(),
                )
            })?;

        Self::new(database_url).with_vars(lookup)
    }

    /// Applies SQLKV_TABLE, SQLKV_DIALECT and SQLKV_MAX_CONNECTIONS on top of
    /// an existing config. Used when the URL came from somewhere else.
    pub fn with_vars<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(table) = lookup("SQLKV_TABLE") {
            self.table = table;
        }

        if let Some(dialect) = lookup("SQLKV_DIALECT") {
            self.dialect = Some(Dialect::from_str(&dialect)?);
        }

        if let Some(max) = lookup("SQLKV_MAX_CONNECTIONS") {
            self.max_connections = max.parse().map_err(|_| {
                SqlKvError::Config(format!("SQLKV_MAX_CONNECTIONS is not a number: '{}'", max))
            })?;
        }

        Ok(self)
    }

    /// Set the table name.
    pub fn table(mut self, table: impl Into<String>) -> Self {
        self.table = table.into();
        self
    }

    /// Set the dialect explicitly.
    pub fn dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = Some(dialect);
        self
    }

    /// Set the maximum pool size.
    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    /// Set the pool acquire timeout in seconds.
    pub fn connect_timeout(mut self, secs: u64) -> Self {
        self.connect_timeout = secs;
        self
    }

    /// Explicit dialect if set, otherwise the one implied by the URL scheme.
    pub fn resolved_dialect(&self) -> Dialect {
        self.dialect
            .unwrap_or_else(|| Dialect::from_url(&self.database_url))
    }

    /// True for SQLite in-memory URLs, whose data lives only as long as a
    /// single connection.
    pub fn is_in_memory(&self) -> bool {
        let url = self.database_url.as_str();
        url.starts_with("sqlite:") && (url.contains(":memory:") || url.contains("mode=memory"))
    }
}

/// Reads a process environment variable, treating unset and non-UTF-8 alike.
pub fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok()
}
