//! Pool opening helper.
//!
//! Callers that already hold a pool never need this module. It exists for
//! front ends that only have a URL.

use std::time::Duration;

use sqlx::any::AnyPoolOptions;
use sqlx::AnyPool;
use tracing::{info, instrument};

use crate::config::StoreConfig;
use crate::{Result, SqlKvError};

/// Opens an `AnyPool` for the configured URL.
///
/// In-memory SQLite databases are pinned to one connection that never idles
/// out, otherwise each new connection would see an empty database.
///
/// # Errors
///
/// Returns error if the URL is empty or the driver cannot connect.
#[instrument(skip(config), fields(max_connections = config.max_connections))]
pub async fn connect(config: &StoreConfig) -> Result<AnyPool> {
    if config.database_url.is_empty() {
        return Err(SqlKvError::Connection(
            "Connection URI cannot be empty".to_string(),
        ));
    }

    sqlx::any::install_default_drivers();

    let mut options = AnyPoolOptions::new()
        .acquire_timeout(Duration::from_secs(config.connect_timeout));

    options = if config.is_in_memory() {
        options
            .min_connections(1)
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        options.max_connections(config.max_connections)
    };

    info!(dialect = %config.resolved_dialect(), "Opening connection pool");
    let pool = options.connect(&config.database_url).await?;
    info!("Connection pool ready");

    Ok(pool)
}
