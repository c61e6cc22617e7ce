//! sqlkv CLI - read and write typed settings in a SQL table
//!
//! Usage:
//!   sqlkv --database-url sqlite://settings.db?mode=rwc set username John
//!   sqlkv get age --type int
//!   sqlkv set enabled true --type bool
//!   sqlkv set today now --type time
//!   sqlkv has username
//!   sqlkv del username
//!   sqlkv list --json
//!   sqlkv clear
//!   sqlkv demo
//!
//! The database URL can also come from SQLKV_DATABASE_URL or DATABASE_URL.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::debug;

use sqlkv::config::env_var;
use sqlkv::{connect, Dialect, KvStore, StoreConfig};

mod commands;

use commands::ValueType;

#[derive(Parser)]
#[command(name = "sqlkv")]
#[command(about = "Typed key-value settings in a SQL table", long_about = None)]
#[command(version)]
struct Cli {
    /// Database URL (sqlite://..., postgres://...) [env: SQLKV_DATABASE_URL, DATABASE_URL]
    #[arg(long)]
    database_url: Option<String>,

    /// Backing table name [env: SQLKV_TABLE, default: kvstore]
    #[arg(short, long)]
    table: Option<String>,

    /// Placeholder dialect or driver name (generic, numbered, sqlite, postgres) [env: SQLKV_DIALECT]
    #[arg(long)]
    dialect: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the value stored under a key
    Get {
        key: String,
        #[arg(long = "type", value_enum, default_value_t = ValueType::String)]
        value_type: ValueType,
    },
    /// Store a value under a key
    Set {
        key: String,
        value: String,
        #[arg(long = "type", value_enum, default_value_t = ValueType::String)]
        value_type: ValueType,
    },
    /// Delete a key (no error if it is absent)
    Del { key: String },
    /// Print whether a key exists
    Has { key: String },
    /// List every entry
    List {
        /// Print entries as a JSON array
        #[arg(long)]
        json: bool,
    },
    /// Delete every entry, keeping the table
    Clear,
    /// Run the walkthrough: string, int, float, time, bool, has, delete
    Demo,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level)?;

    let config = build_config(&cli, env_var)?;
    debug!(table = %config.table, dialect = %config.resolved_dialect(), "Resolved configuration");

    let pool = connect(&config)
        .await
        .with_context(|| format!("Failed to open database '{}'", config.database_url))?;

    let result = run(&cli.command, &pool, &config).await;
    pool.close().await;
    result
}

/// Environment settings first, command-line flags on top.
fn build_config<F>(cli: &Cli, lookup: F) -> Result<StoreConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match &cli.database_url {
        Some(url) => StoreConfig::new(url.clone()).with_vars(lookup)?,
        None => StoreConfig::from_vars(lookup).context("No database URL given")?,
    };

    if let Some(table) = &cli.table {
        config = config.table(table.clone());
    }

    if let Some(name) = &cli.dialect {
        let dialect: Dialect = name.parse()?;
        config = config.dialect(dialect);
    }

    Ok(config)
}

async fn run(command: &Commands, pool: &sqlx::AnyPool, config: &StoreConfig) -> Result<()> {
    let store = KvStore::with_dialect(pool, &config.table, config.resolved_dialect())
        .await
        .with_context(|| format!("Failed to prepare table '{}'", config.table))?;

    match command {
        Commands::Get { key, value_type } => {
            println!("{}", commands::get(&store, key, *value_type).await?);
        }
        Commands::Set { key, value, value_type } => {
            commands::set(&store, key, value, *value_type).await?;
        }
        Commands::Del { key } => {
            store.delete(key).await?;
        }
        Commands::Has { key } => {
            println!("{}", store.has_key(key).await?);
        }
        Commands::List { json } => {
            let entries = store.all().await?;
            if *json {
                println!("{}", serde_json::to_string_pretty(&entries)?);
            } else {
                for entry in entries {
                    println!("{}\t{}", entry.name, entry.value);
                }
            }
        }
        Commands::Clear => {
            store.clear().await?;
        }
        Commands::Demo => {
            for line in commands::demo(&store).await? {
                println!("{}", line);
            }
        }
    }

    Ok(())
}

/// Initialize logging based on log level
fn init_logging(level: &str) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init()
        .ok(); // Ignore error if already initialized

    Ok(())
}
