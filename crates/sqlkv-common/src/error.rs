//! Error types for sqlkv

use sqlx::error::ErrorKind;
use thiserror::Error;

/// Result type alias for sqlkv operations
pub type Result<T> = std::result::Result<T, SqlKvError>;

/// Unified error type for all sqlkv operations
///
/// A key that is simply absent is never an error: getters map it to the
/// type's zero value. Everything that does surface here means the call
/// could not be completed.
#[derive(Error, Debug, Clone)]
pub enum SqlKvError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Query error: {0}")]
    Query(String),

    /// Stored text could not be decoded as the requested type
    #[error("Parse error: cannot read key '{key}' as {expected}: {reason}")]
    Parse {
        key: String,
        expected: &'static str,
        reason: String,
    },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),

    /// Unique or primary key violation, e.g. two writers inserting the same key
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Connection or pool timeout - retryable
    #[error("Timeout: {0}")]
    Timeout(String),

    /// Transient error that may succeed on retry
    #[error("Transient error: {0}")]
    Transient(String),
}

impl SqlKvError {
    /// Builds a `Parse` error for a stored value.
    pub fn parse(key: &str, expected: &'static str, reason: impl ToString) -> Self {
        SqlKvError::Parse {
            key: key.to_string(),
            expected,
            reason: reason.to_string(),
        }
    }

    /// Returns true if this error is potentially retryable
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            SqlKvError::Timeout(_) | SqlKvError::Transient(_)
        )
    }

    /// Returns true if this is a constraint violation error
    pub fn is_constraint_violation(&self) -> bool {
        matches!(self, SqlKvError::Conflict(_))
    }
}

impl From<sqlx::Error> for SqlKvError {
    fn from(err: sqlx::Error) -> Self {
        use sqlx::Error;
        match &err {
            Error::Configuration(_) => SqlKvError::Connection(err.to_string()),
            Error::Database(db_err) => {
                // Driver-independent classification first (works for SQLite too)
                match db_err.kind() {
                    ErrorKind::UniqueViolation => return SqlKvError::Conflict(err.to_string()),
                    ErrorKind::NotNullViolation | ErrorKind::CheckViolation => {
                        return SqlKvError::Validation(err.to_string())
                    }
                    _ => {}
                }

                // PostgreSQL SQLSTATE codes
                // See: https://www.postgresql.org/docs/current/errcodes-appendix.html
                if let Some(code) = db_err.code() {
                    let code_str: &str = &code;
                    match code_str {
                        "23505" | "23P01" => return SqlKvError::Conflict(err.to_string()),
                        "40P01" | "40001" => return SqlKvError::Transient(err.to_string()),
                        code if code.starts_with("40") => {
                            return SqlKvError::Transient(err.to_string())
                        }
                        code if code.starts_with("08") => {
                            return SqlKvError::Connection(err.to_string())
                        }
                        "57P01" | "57P02" | "57P03" => {
                            return SqlKvError::Transient(err.to_string())
                        }
                        _ => {}
                    }
                }
                SqlKvError::Database(err.to_string())
            }
            Error::Io(_) => SqlKvError::Connection(err.to_string()),
            Error::Tls(_) => SqlKvError::Connection(err.to_string()),
            Error::Protocol(_) => SqlKvError::Connection(err.to_string()),
            Error::RowNotFound => SqlKvError::Query("Row not found".to_string()),
            Error::ColumnIndexOutOfBounds { .. } => SqlKvError::Query(err.to_string()),
            Error::ColumnNotFound(_) => SqlKvError::Query(err.to_string()),
            Error::ColumnDecode { .. } => SqlKvError::Database(err.to_string()),
            Error::Decode(_) => SqlKvError::Database(err.to_string()),
            Error::PoolTimedOut => SqlKvError::Timeout("Connection pool timed out".to_string()),
            Error::PoolClosed => SqlKvError::Connection("Connection pool closed".to_string()),
            Error::WorkerCrashed => SqlKvError::Internal("Worker thread crashed".to_string()),
            _ => SqlKvError::Database(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_database() {
        let err = SqlKvError::Database("no such table: kvstore".to_string());
        assert_eq!(err.to_string(), "Database error: no such table: kvstore");
    }

    #[test]
    fn test_error_display_parse() {
        let err = SqlKvError::parse("age", "integer", "invalid digit found in string");
        assert_eq!(
            err.to_string(),
            "Parse error: cannot read key 'age' as integer: invalid digit found in string"
        );
    }

    #[test]
    fn test_error_display_validation() {
        let err = SqlKvError::Validation("Identifier cannot be empty".to_string());
        assert_eq!(err.to_string(), "Validation error: Identifier cannot be empty");
    }

    #[test]
    fn test_error_display_config() {
        let err = SqlKvError::Config("DATABASE_URL not set".to_string());
        assert_eq!(err.to_string(), "Configuration error: DATABASE_URL not set");
    }

    #[test]
    fn test_from_pool_closed() {
        let err: SqlKvError = sqlx::Error::PoolClosed.into();
        assert!(matches!(err, SqlKvError::Connection(_)));
    }

    #[test]
    fn test_from_pool_timed_out() {
        let err: SqlKvError = sqlx::Error::PoolTimedOut.into();
        assert!(matches!(err, SqlKvError::Timeout(_)));
        assert!(err.is_retryable());
    }

    #[test]
    fn test_from_row_not_found() {
        let err: SqlKvError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, SqlKvError::Query(_)));
    }

    #[test]
    fn test_from_column_not_found() {
        let err: SqlKvError = sqlx::Error::ColumnNotFound("value".to_string()).into();
        assert!(matches!(err, SqlKvError::Query(msg) if msg.contains("value")));
    }

    #[test]
    fn test_is_retryable() {
        assert!(SqlKvError::Timeout("test".to_string()).is_retryable());
        assert!(SqlKvError::Transient("test".to_string()).is_retryable());
        assert!(!SqlKvError::Conflict("test".to_string()).is_retryable());
        assert!(!SqlKvError::parse("k", "float", "bad").is_retryable());
    }

    #[test]
    fn test_is_constraint_violation() {
        assert!(SqlKvError::Conflict("test".to_string()).is_constraint_violation());
        assert!(!SqlKvError::Timeout("test".to_string()).is_constraint_violation());
        assert!(!SqlKvError::Database("test".to_string()).is_constraint_violation());
    }
}
