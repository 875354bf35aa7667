use sqlx::mysql::{MySqlConnectOptions, MySqlPool, MySqlPoolOptions};
use std::str::FromStr;
use thiserror::Error;
use tracing::info;

use crate::config::{ConfigError, DatabaseConfig};

/// Errors from the database layer
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// No connection could be acquired (unreachable server, bad credentials,
    /// pool timeout).
    #[error("Connection error: {0}")]
    Connection(#[source] sqlx::Error),

    /// A statement failed after a connection was acquired.
    #[error("{0}")]
    Query(#[source] sqlx::Error),
}

/// Builds the connection pool shared by every request.
pub struct DatabaseManager;

impl DatabaseManager {
    /// Create a pool that opens connections on first use, so the service
    /// starts even when the database is down and reports 500s instead.
    pub fn connect_lazy(config: &DatabaseConfig) -> Result<MySqlPool, DatabaseError> {
        let options = Self::connect_options(config)?;
        let pool = MySqlPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout())
            .connect_lazy_with(options);

        info!(
            "Created database pool for {}@{}:{}/{} (max {} connections)",
            config.user, config.host, config.port, config.name, config.max_connections
        );
        Ok(pool)
    }

    fn connect_options(config: &DatabaseConfig) -> Result<MySqlConnectOptions, DatabaseError> {
        let url = config.connection_url()?;
        MySqlConnectOptions::from_str(&url).map_err(DatabaseError::Connection)
    }
}
