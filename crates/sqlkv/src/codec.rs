//! Conversions between typed values and their stored text form.
//!
//! Every value lives in a single TEXT column, so each supported type is a
//! pair of pure functions: `encode` to the canonical string and `decode` back.
//! An empty string always decodes to the type's zero value.

use chrono::{DateTime, FixedOffset, NaiveDate, Offset, SecondsFormat, Utc};

use crate::{Result, SqlKvError};

/// A scalar that can be stored in the value column.
pub trait KvValue: Sized {
    /// Human-readable type name used in parse errors.
    const TYPE_NAME: &'static str;

    /// Renders the value in its canonical stored form.
    fn encode(&self) -> String;

    /// Reads a stored string. `key` is only used for error context.
    fn decode(key: &str, raw: &str) -> Result<Self>;
}

impl KvValue for String {
    const TYPE_NAME: &'static str = "string";

    fn encode(&self) -> String {
        self.clone()
    }

    fn decode(_key: &str, raw: &str) -> Result<Self> {
        Ok(raw.to_string())
    }
}

impl KvValue for i64 {
    const TYPE_NAME: &'static str = "integer";

    fn encode(&self) -> String {
        self.to_string()
    }

    fn decode(key: &str, raw: &str) -> Result<Self> {
        if raw.is_empty() {
            return Ok(0);
        }
        raw.parse::<i64>()
            .map_err(|e| SqlKvError::parse(key, Self::TYPE_NAME, e))
    }
}

impl KvValue for f32 {
    const TYPE_NAME: &'static str = "float";

    /// `Display` for floats is the shortest string that parses back to the
    /// same value.
    fn encode(&self) -> String {
        self.to_string()
    }

    fn decode(key: &str, raw: &str) -> Result<Self> {
        if raw.is_empty() {
            return Ok(0.0);
        }
        raw.parse::<f32>()
            .map_err(|e| SqlKvError::parse(key, Self::TYPE_NAME, e))
    }
}

impl KvValue for bool {
    const TYPE_NAME: &'static str = "boolean";

    fn encode(&self) -> String {
        let flag = if *self { "1" } else { "0" };
        flag.to_string()
    }

    /// Lenient: anything other than "1" or "true" (any case) is false.
    fn decode(_key: &str, raw: &str) -> Result<Self> {
        Ok(raw == "1" || raw.eq_ignore_ascii_case("true"))
    }
}

impl KvValue for DateTime<FixedOffset> {
    const TYPE_NAME: &'static str = "timestamp";

    fn encode(&self) -> String {
        format_timestamp(self)
    }

    fn decode(key: &str, raw: &str) -> Result<Self> {
        if raw.is_empty() {
            return Ok(zero_timestamp());
        }
        DateTime::parse_from_rfc3339(raw)
            .map_err(|e| SqlKvError::parse(key, Self::TYPE_NAME, e))
    }
}

/// Formats a timestamp as RFC 3339 with as many fractional digits as needed
/// (up to nanoseconds) and `Z` for UTC.
pub fn format_timestamp(value: &DateTime<FixedOffset>) -> String {
    value.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// The timestamp returned for absent keys: `0001-01-01T00:00:00Z`.
pub fn zero_timestamp() -> DateTime<FixedOffset> {
    let naive = NaiveDate::from_ymd_opt(1, 1, 1)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .unwrap_or_default();
    DateTime::from_naive_utc_and_offset(naive, Utc.fix())
}

/// Returns true for the zero timestamp.
pub fn is_zero_timestamp(value: &DateTime<FixedOffset>) -> bool {
    *value == zero_timestamp()
}
