//! API configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `PEOPLE_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//!
//! ## Optional
//! - `PEOPLE_HOST` - Bind address (default: 127.0.0.1)
//! - `PEOPLE_PORT` - Listen port (default: 5000)
//! - `PEOPLE_DB_MAX_CONNECTIONS` - Pool size ceiling (default: 10)
//! - `PEOPLE_DB_MIN_CONNECTIONS` - Idle connections kept open (default: 2)
//! - `PEOPLE_DB_ACQUIRE_TIMEOUT_SECS` - Wait for a pooled connection (default: 10)
//! - `PEOPLE_MAX_PAGE_SIZE` - Largest search page accepted (default: 100)
//! - `PEOPLE_STATIC_DIR` - Built single-page app to serve at `/`
//! - `PEOPLE_CORS_ORIGINS` - Comma-separated origins allowed to call the API
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment tag
//! - `SENTRY_SAMPLE_RATE` - Error event sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Transaction sample rate (default: 0.0)

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Connection pool settings
    pub database: DatabaseConfig,
    /// Largest `pageSize` a search may request
    pub max_page_size: u32,
    /// Directory holding the built front-end, if it should be served
    pub static_dir: Option<PathBuf>,
    /// Origins allowed by CORS (empty disables the CORS layer)
    pub cors_origins: Vec<String>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment tag (e.g. "production")
    pub sentry_environment: Option<String>,
    /// Fraction of error events sent to Sentry
    pub sentry_sample_rate: f32,
    /// Fraction of transactions sent to Sentry
    pub sentry_traces_sample_rate: f32,
}

/// Connection pool configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatabaseConfig {
    /// Maximum open connections
    pub max_connections: u32,
    /// Connections kept open while idle
    pub min_connections: u32,
    /// How long a request waits for a free connection
    pub acquire_timeout: Duration,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            max_connections: 10,
            min_connections: 2,
            acquire_timeout: Duration::from_secs(10),
        }
    }
}

impl ApiConfig {
    /// Default bind port.
    pub const DEFAULT_PORT: u16 = 5000;
    /// Default ceiling for `pageSize`.
    pub const DEFAULT_MAX_PAGE_SIZE: u32 = 100;

    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env { lookup };

        let database_url = env.database_url("PEOPLE_DATABASE_URL")?;
        let host = env.parsed_or("PEOPLE_HOST", IpAddr::from([127, 0, 0, 1]))?;
        let port = env.parsed_or("PEOPLE_PORT", Self::DEFAULT_PORT)?;

        let defaults = DatabaseConfig::default();
        let database = DatabaseConfig {
            max_connections: env
                .parsed_or("PEOPLE_DB_MAX_CONNECTIONS", defaults.max_connections)?,
            min_connections: env
                .parsed_or("PEOPLE_DB_MIN_CONNECTIONS", defaults.min_connections)?,
            acquire_timeout: Duration::from_secs(env.parsed_or(
                "PEOPLE_DB_ACQUIRE_TIMEOUT_SECS",
                defaults.acquire_timeout.as_secs(),
            )?),
        };
        if database.min_connections > database.max_connections {
            return Err(ConfigError::InvalidEnvVar(
                "PEOPLE_DB_MIN_CONNECTIONS".to_string(),
                format!(
                    "must not exceed PEOPLE_DB_MAX_CONNECTIONS ({})",
                    database.max_connections
                ),
            ));
        }

        let max_page_size = env.parsed_or("PEOPLE_MAX_PAGE_SIZE", Self::DEFAULT_MAX_PAGE_SIZE)?;
        if max_page_size == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "PEOPLE_MAX_PAGE_SIZE".to_string(),
                "must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            database_url,
            host,
            port,
            database,
            max_page_size,
            static_dir: env.optional("PEOPLE_STATIC_DIR").map(PathBuf::from),
            cors_origins: env
                .optional("PEOPLE_CORS_ORIGINS")
                .map(|value| parse_origins(&value))
                .unwrap_or_default(),
            sentry_dsn: env.optional("SENTRY_DSN"),
            sentry_environment: env.optional("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: env.parsed_or("SENTRY_SAMPLE_RATE", 1.0)?,
            sentry_traces_sample_rate: env.parsed_or("SENTRY_TRACES_SAMPLE_RATE", 0.0)?,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Typed access to a variable source.
struct Env<F> {
    lookup: F,
}

impl<F> Env<F>
where
    F: Fn(&str) -> Option<String>,
{
    /// Get an optional variable, treating blank values as unset.
    fn optional(&self, key: &str) -> Option<String> {
        (self.lookup)(key).filter(|value| !value.trim().is_empty())
    }

    /// Get and parse a variable, falling back to `default` when unset.
    fn parsed_or<T>(&self, key: &str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.optional(key).map_or(Ok(default), |value| {
            value
                .trim()
                .parse::<T>()
                .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
        })
    }

    /// Get database URL with fallback to generic `DATABASE_URL`.
    fn database_url(&self, primary_key: &str) -> Result<SecretString, ConfigError> {
        self.optional(primary_key)
            .or_else(|| self.optional("DATABASE_URL"))
            .map(SecretString::from)
            .ok_or_else(|| ConfigError::MissingEnvVar(primary_key.to_string()))
    }
}

/// Split a comma-separated origin list, dropping blanks and trailing slashes.
fn parse_origins(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|origin| origin.trim().trim_end_matches('/'))
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}
