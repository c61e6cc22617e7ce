//! Typed get/set and the walkthrough behind the CLI subcommands.

use anyhow::{bail, Context, Result};
use chrono::{DateTime, FixedOffset, Local};
use clap::ValueEnum;

use sqlkv::{format_timestamp, KvStore, KvValue};

/// Type used to read or write a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ValueType {
    String,
    Int,
    Float,
    Bool,
    Time,
}

/// Reads `key` as `value_type` and renders it for display.
pub async fn get(store: &KvStore<'_>, key: &str, value_type: ValueType) -> Result<String> {
    let rendered = match value_type {
        ValueType::String => store.string(key).await?,
        ValueType::Int => store.int(key).await?.to_string(),
        ValueType::Float => store.float(key).await?.to_string(),
        ValueType::Bool => store.bool(key).await?.to_string(),
        ValueType::Time => format_timestamp(&store.time(key).await?),
    };
    Ok(rendered)
}

/// Parses `input` as `value_type` and stores it in canonical form.
///
/// Input is validated before anything is written.
pub async fn set(store: &KvStore<'_>, key: &str, input: &str, value_type: ValueType) -> Result<()> {
    let encoded = canonical(input, value_type)?;
    store.set_string(key, &encoded).await?;
    Ok(())
}

/// Canonical stored form of a command-line value.
pub fn canonical(input: &str, value_type: ValueType) -> Result<String> {
    let encoded = match value_type {
        ValueType::String => input.to_string(),
        ValueType::Int => parse_strict::<i64>(input)?.encode(),
        ValueType::Float => parse_strict::<f32>(input)?.encode(),
        ValueType::Bool => parse_bool(input)?.encode(),
        ValueType::Time => parse_time(input)?.encode(),
    };
    Ok(encoded)
}

fn parse_strict<T: KvValue>(input: &str) -> Result<T> {
    if input.trim().is_empty() {
        bail!("Expected a {} value, got an empty string", T::TYPE_NAME);
    }
    Ok(T::decode("<argument>", input.trim())?)
}

// Stored booleans are read leniently; on the way in only clear spellings pass.
fn parse_bool(input: &str) -> Result<bool> {
    match input.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => bail!("Expected a boolean (true/false/1/0), got '{}'", other),
    }
}

fn parse_time(input: &str) -> Result<DateTime<FixedOffset>> {
    if input.trim().eq_ignore_ascii_case("now") {
        return Ok(Local::now().fixed_offset());
    }
    DateTime::parse_from_rfc3339(input.trim())
        .with_context(|| format!("Expected an RFC 3339 timestamp or 'now', got '{}'", input))
}

/// Exercises every accessor once and returns one output line per step.
#[allow(clippy::approx_constant)]
pub async fn demo(store: &KvStore<'_>) -> Result<Vec<String>> {
    let mut lines = Vec::new();

    store.set_string("username", "John").await?;
    lines.push(format!("username = {}", store.string("username").await?));

    store.set_int("age", 25).await?;
    lines.push(format!("age = {}", store.int("age").await?));

    store.set_float("pi", 3.14).await?;
    lines.push(format!("pi = {}", store.float("pi").await?));

    store.set_time("today", Local::now().fixed_offset()).await?;
    lines.push(format!("today = {}", format_timestamp(&store.time("today").await?)));

    store.set_bool("enabled", true).await?;
    lines.push(format!("enabled = {}", store.bool("enabled").await?));

    lines.push(format!("has username = {}", store.has_key("username").await?));

    store.delete("username").await?;
    lines.push(format!("username after delete = {:?}", store.string("username").await?));
    lines.push(format!("has username = {}", store.has_key("username").await?));

    Ok(lines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::any::AnyPoolOptions;

    #[test]
    fn test_canonical_int() {
        assert_eq!(canonical("25", ValueType::Int).unwrap(), "25");
        assert_eq!(canonical(" -3 ", ValueType::Int).unwrap(), "-3");
        assert!(canonical("abc", ValueType::Int).is_err());
        assert!(canonical("", ValueType::Int).is_err());
    }

    #[test]
    fn test_canonical_float() {
        assert_eq!(canonical("0.75", ValueType::Float).unwrap(), "0.75");
        assert_eq!(canonical("2", ValueType::Float).unwrap(), "2");
        assert!(canonical("two", ValueType::Float).is_err());
    }

    #[test]
    fn test_canonical_bool() {
        assert_eq!(canonical("true", ValueType::Bool).unwrap(), "1");
        assert_eq!(canonical("YES", ValueType::Bool).unwrap(), "1");
        assert_eq!(canonical("off", ValueType::Bool).unwrap(), "0");
        assert!(canonical("maybe", ValueType::Bool).is_err());
    }

    #[test]
    fn test_canonical_time() {
        assert_eq!(
            canonical("2024-01-02T15:04:05.5+02:00", ValueType::Time).unwrap(),
            "2024-01-02T15:04:05.500+02:00"
        );
        assert!(canonical("now", ValueType::Time).is_ok());
        assert!(canonical("yesterday", ValueType::Time).is_err());
    }

    #[test]
    fn test_canonical_string_untouched() {
        assert_eq!(canonical("  padded ", ValueType::String).unwrap(), "  padded ");
        assert_eq!(canonical("", ValueType::String).unwrap(), "");
    }

    #[tokio::test]
    async fn test_set_then_get_typed() {
        sqlx::any::install_default_drivers();
        let pool = AnyPoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        let store = KvStore::new(&pool, "kvstore").await.unwrap();

        set(&store, "age", "25", ValueType::Int).await.unwrap();
        assert_eq!(get(&store, "age", ValueType::Int).await.unwrap(), "25");

        assert!(set(&store, "age", "old", ValueType::Int).await.is_err());
        assert_eq!(get(&store, "age", ValueType::String).await.unwrap(), "25");

        set(&store, "enabled", "on", ValueType::Bool).await.unwrap();
        assert_eq!(get(&store, "enabled", ValueType::Bool).await.unwrap(), "true");

        assert_eq!(
            get(&store, "missing", ValueType::Time).await.unwrap(),
            "0001-01-01T00:00:00Z"
        );
    }

    #[tokio::test]
    async fn test_demo_walkthrough() {
        sqlx::any::install_default_drivers();
        let pool = AnyPoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        let store = KvStore::new(&pool, "kvstore").await.unwrap();

        let lines = demo(&store).await.unwrap();
        assert_eq!(lines[0], "username = John");
        assert_eq!(lines[1], "age = 25");
        assert_eq!(lines[2], "pi = 3.14");
        assert_eq!(lines[4], "enabled = true");
        assert_eq!(lines[5], "has username = true");
        assert_eq!(lines[6], "username after delete = \"\"");
        assert_eq!(lines[7], "has username = false");
    }
}
