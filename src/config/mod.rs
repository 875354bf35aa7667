use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;
use thiserror::Error;

/// Errors raised while reading configuration at startup
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing configuration: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {var}: {value}")]
    Invalid { var: &'static str, value: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub database: DatabaseConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub name: String,
    pub user: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub max_connections: u32,
    pub connection_timeout: u64,
    pub enable_query_logging: bool,
    pub slow_query_threshold_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

pub const DEFAULT_DB_PORT: u16 = 3306;
pub const DEFAULT_API_PORT: u16 = 8000;

struct Preset {
    max_connections: u32,
    connection_timeout: u64,
    enable_query_logging: bool,
    slow_query_threshold_ms: u64,
}

impl Environment {
    fn parse(value: Option<&str>) -> Self {
        match value {
            Some("production") | Some("prod") => Environment::Production,
            Some("staging") | Some("stage") => Environment::Staging,
            _ => Environment::Development,
        }
    }

    fn preset(self) -> Preset {
        match self {
            Environment::Development => Preset {
                max_connections: 5,
                connection_timeout: 5,
                enable_query_logging: true,
                slow_query_threshold_ms: 100,
            },
            Environment::Staging => Preset {
                max_connections: 10,
                connection_timeout: 5,
                enable_query_logging: true,
                slow_query_threshold_ms: 500,
            },
            Environment::Production => Preset {
                max_connections: 20,
                connection_timeout: 3,
                enable_query_logging: false,
                slow_query_threshold_ms: 1000,
            },
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = Environment::parse(lookup("APP_ENV").as_deref());
        let preset = environment.preset();

        let mut database = DatabaseConfig {
            host: required(&lookup, "DB_HOST")?,
            port: match lookup("DB_PORT") {
                Some(v) => v
                    .trim()
                    .parse()
                    .map_err(|_| ConfigError::Invalid { var: "DB_PORT", value: v })?,
                None => DEFAULT_DB_PORT,
            },
            name: required(&lookup, "DB_NAME")?,
            user: required(&lookup, "DB_USER")?,
            password: lookup("DB_PASSWORD").unwrap_or_default(),
            max_connections: preset.max_connections,
            connection_timeout: preset.connection_timeout,
            enable_query_logging: preset.enable_query_logging,
            slow_query_threshold_ms: preset.slow_query_threshold_ms,
        };

        if let Some(v) = lookup("DATABASE_MAX_CONNECTIONS") {
            database.max_connections = v.parse().unwrap_or(database.max_connections);
        }
        if let Some(v) = lookup("DATABASE_CONNECTION_TIMEOUT") {
            database.connection_timeout = v.parse().unwrap_or(database.connection_timeout);
        }
        if let Some(v) = lookup("DATABASE_ENABLE_QUERY_LOGGING") {
            database.enable_query_logging = v.parse().unwrap_or(database.enable_query_logging);
        }
        if let Some(v) = lookup("DATABASE_SLOW_QUERY_THRESHOLD_MS") {
            database.slow_query_threshold_ms = v.parse().unwrap_or(database.slow_query_threshold_ms);
        }

        let server = ServerConfig {
            host: lookup("API_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: lookup("API_PORT")
                .or_else(|| lookup("PORT"))
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_API_PORT),
        };

        Ok(Self { environment, database, server })
    }
}

impl DatabaseConfig {
    /// MySQL connection URL with escaped credentials.
    pub fn connection_url(&self) -> Result<String, ConfigError> {
        let mut url = url::Url::parse(&format!("mysql://{}:{}", self.host, self.port)).map_err(|_| {
            ConfigError::Invalid { var: "DB_HOST", value: self.host.clone() }
        })?;

        url.set_username(&self.user)
            .map_err(|_| ConfigError::Invalid { var: "DB_USER", value: self.user.clone() })?;
        if !self.password.is_empty() {
            url.set_password(Some(&self.password))
                .map_err(|_| ConfigError::Invalid { var: "DB_PASSWORD", value: "<redacted>".to_string() })?;
        }
        url.set_path(&format!("/{}", self.name));
        Ok(url.into())
    }

    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.connection_timeout)
    }

    pub fn slow_query_threshold(&self) -> Duration {
        Duration::from_millis(self.slow_query_threshold_ms)
    }
}

fn required<F>(lookup: &F, key: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ConfigError::Missing(key)),
    }
}
