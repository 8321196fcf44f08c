/// Configuration management for the API server
///
/// This module loads configuration from environment variables and provides
/// a type-safe configuration struct.
///
/// # Environment Variables
///
/// - `DATABASE_URL`: PostgreSQL connection string (required)
/// - `DATABASE_MAX_CONNECTIONS`: Pool size (default: 10)
/// - `API_HOST`: Host to bind to (default: 0.0.0.0)
/// - `API_PORT`: Port to bind to (default: 8080)
/// - `REINDEX_OFFSET`: Parking offset for reorders (default: 100000, minimum 10000)
/// - `RESERVED_PATHS`: Comma-separated paths users may not create (default: /settings)
/// - `RUST_LOG`: Log level (default: debug for kanbanfs crates)
///
/// # Example
///
/// ```no_run
/// use kanbanfs_api::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```

use kanbanfs_shared::ordering::{DEFAULT_REINDEX_OFFSET, MIN_REINDEX_OFFSET};
use kanbanfs_shared::paths::path::normalize;
use kanbanfs_shared::paths::{ReservedPaths, DEFAULT_RESERVED_PATHS};
use serde::{Deserialize, Serialize};
use std::env;

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} environment variable is required")]
    Missing(&'static str),

    #[error("{name} has an invalid value '{value}'")]
    Invalid { name: &'static str, value: String },

    #[error("REINDEX_OFFSET must be at least {min}, got {got}")]
    OffsetTooSmall { min: i32, got: i32 },
}

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// API server configuration
    pub api: ApiConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Order maintenance configuration
    pub ordering: OrderingConfig,

    /// Paths users may never create
    pub reserved_paths: Vec<String>,
}

/// API server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in pool
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderingConfig {
    /// Added to indices while a reorder batch is in flight; must exceed the
    /// largest container size
    pub reindex_offset: i32,
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `DATABASE_URL` is missing
    /// - A numeric variable does not parse
    /// - `REINDEX_OFFSET` is below the minimum
    /// - A reserved path is malformed
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (for development)
        dotenvy::dotenv().ok();

        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds configuration from any variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_host = lookup("API_HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let api_port = parse_or("API_PORT", lookup("API_PORT"), 8080u16)?;

        let database_url = lookup("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;
        let max_connections = parse_or(
            "DATABASE_MAX_CONNECTIONS",
            lookup("DATABASE_MAX_CONNECTIONS"),
            10u32,
        )?;

        let reindex_offset = parse_or("REINDEX_OFFSET", lookup("REINDEX_OFFSET"), DEFAULT_REINDEX_OFFSET)?;
        if reindex_offset < MIN_REINDEX_OFFSET {
            return Err(ConfigError::OffsetTooSmall {
                min: MIN_REINDEX_OFFSET,
                got: reindex_offset,
            });
        }

        let reserved_paths = match lookup("RESERVED_PATHS") {
            Some(raw) => parse_reserved_paths(&raw)?,
            None => DEFAULT_RESERVED_PATHS.iter().map(|p| p.to_string()).collect(),
        };

        Ok(Self {
            api: ApiConfig {
                host: api_host,
                port: api_port,
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections,
            },
            ordering: OrderingConfig { reindex_offset },
            reserved_paths,
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }

    pub fn reserved(&self) -> ReservedPaths {
        ReservedPaths::new(self.reserved_paths.iter())
    }
}

fn parse_or<T: std::str::FromStr>(
    name: &'static str,
    raw: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match raw {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::Invalid { name, value }),
    }
}

/// Splits a comma-separated list into normalized paths; blank entries are skipped
fn parse_reserved_paths(raw: &str) -> Result<Vec<String>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            normalize(entry).map_err(|_| ConfigError::Invalid {
                name: "RESERVED_PATHS",
                value: entry.to_string(),
            })
        })
        .collect()
}
