//! Typed key-value settings stored in a single SQL table.
//!
//! `sqlkv` turns one `(name TEXT PRIMARY KEY, value TEXT)` table into a small
//! settings store with typed accessors for strings, integers, floats,
//! booleans and timestamps. Every value is kept as text; the typed accessors
//! are a codec on top of that.
//!
//! # Architecture
//!
//! ```text
//!   KvStore (store.rs)  typed get/set, has_key, delete, all, clear
//!        |
//!   KvValue (codec.rs)  text <-> i64 / f32 / bool / DateTime
//!        |
//!   Statements (query.rs) + Dialect (dialect.rs)
//!        |
//!   SQLx AnyPool (SQLite, PostgreSQL), owned by the caller
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use sqlkv::{connect, KvStore, StoreConfig};
//!
//! # async fn example() -> sqlkv::Result<()> {
//! let config = StoreConfig::new("sqlite://settings.db?mode=rwc");
//! let pool = connect(&config).await?;
//!
//! let store = KvStore::with_dialect(&pool, "kvstore", config.resolved_dialect()).await?;
//! store.set_string("username", "John").await?;
//! store.set_bool("enabled", true).await?;
//!
//! assert_eq!(store.string("username").await?, "John");
//! assert!(store.bool("enabled").await?);
//! assert_eq!(store.int("missing").await?, 0);
//!
//! pool.close().await;
//! # Ok(())
//! # }
//! ```
//!
//! # Dialects
//!
//! The store issues the same statements on every backend; only parameter
//! markers differ. SQLite uses `?` ([`Dialect::Generic`], the default) and
//! PostgreSQL needs `$1, $2` ([`Dialect::Numbered`]).
//!
//! # Errors
//!
//! A missing key is never an error: getters return the type's zero value.
//! Anything else (closed pool, bad SQL, a stored value that doesn't parse as
//! the requested type) comes back as [`SqlKvError`].

/// Typed value encoding and decoding.
pub mod codec;

/// Environment and builder configuration.
pub mod config;

/// Convenience pool opener.
pub mod connection;

/// Placeholder dialects.
pub mod dialect;

/// Identifier validation and statement rendering.
pub mod query;

/// The key-value store.
pub mod store;

pub use codec::{format_timestamp, is_zero_timestamp, zero_timestamp, KvValue};
pub use config::{StoreConfig, DEFAULT_TABLE};
pub use connection::connect;
pub use dialect::Dialect;
pub use query::Statements;
pub use store::{KvEntry, KvStore};

pub use sqlkv_common::{Result, SqlKvError};
