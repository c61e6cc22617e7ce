//! SQL parameter placeholder conventions.

use std::fmt;
use std::str::FromStr;

use crate::{Result, SqlKvError};

/// Placeholder syntax used when building parameterized statements.
///
/// SQLite and MySQL drivers take positional `?` markers; PostgreSQL takes
/// numbered `$1, $2, ...` markers. Only the rendering of parameters differs,
/// statement shapes are identical.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Dialect {
    /// `?` for every parameter
    #[default]
    Generic,
    /// `$1`, `$2`, ... (PostgreSQL)
    Numbered,
}

impl Dialect {
    /// Returns the placeholder token for a 1-based parameter position.
    pub fn placeholder(&self, index: usize) -> String {
        match self {
            Dialect::Generic => "?".to_string(),
            Dialect::Numbered => format!("${}", index),
        }
    }

    /// Infers the dialect from a connection URL scheme.
    ///
    /// Anything that is not PostgreSQL falls back to `Generic`.
    pub fn from_url(url: &str) -> Self {
        let scheme = url.split(':').next().unwrap_or_default().to_ascii_lowercase();
        match scheme.as_str() {
            "postgres" | "postgresql" => Dialect::Numbered,
            _ => Dialect::Generic,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Dialect::Generic => "generic",
            Dialect::Numbered => "numbered",
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Dialect {
    type Err = SqlKvError;

    /// Accepts either a dialect name or a driver name.
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "generic" | "sqlite" | "sqlite3" | "mysql" => Ok(Dialect::Generic),
            "numbered" | "postgres" | "postgresql" | "pgx" => Ok(Dialect::Numbered),
            other => Err(SqlKvError::Config(format!(
                "Unknown dialect or driver name '{}'",
                other
            ))),
        }
    }
}
