//! # API Configuration Module
//!
//! Loads server settings from environment variables, falling back to
//! defaults where a value is optional.
//!
//! ## Environment Variables
//!
//! - `API_HOST`: address to bind (default: "0.0.0.0")
//! - `API_PORT`: port to listen on (default: 3000)
//! - `DATABASE_URL`: PostgreSQL connection string; when unset the server
//!   keeps its data in memory
//! - `LOG_LEVEL`: logging level (default: "info")
//! - `API_CORS_ORIGINS`: comma-separated list of allowed CORS origins
//! - `API_REQUEST_TIMEOUT_SECONDS`: per-request timeout (default: 30)
//! - `SESSION_TTL_HOURS`: lifetime of a login session (default: 168)

use eyre::{Result, WrapErr};
use std::env;
use tracing::Level;

/// Configuration for the Ulendo API server
///
/// # Example
///
/// ```
/// use eyre::Result;
/// use ulendo_api::config::ApiConfig;
///
/// fn example() -> Result<()> {
///     let config = ApiConfig::from_env()?;
///     println!("Starting server on {}:{}", config.host, config.port);
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Host address for the API server (e.g., "127.0.0.1", "0.0.0.0")
    pub host: String,

    /// Port for the API server to listen on
    pub port: u16,

    /// PostgreSQL database connection string
    pub database_url: Option<String>,

    /// Log level for the application
    pub log_level: Level,

    /// CORS allowed origins (optional)
    pub cors_origins: Option<Vec<String>>,

    /// Request timeout in seconds
    pub request_timeout: u64,

    /// Session lifetime in hours
    pub session_ttl_hours: i64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            database_url: None,
            log_level: Level::INFO,
            cors_origins: None,
            request_timeout: 30,
            session_ttl_hours: 168,
        }
    }
}

impl ApiConfig {
    /// Creates a new ApiConfig from the process environment
    ///
    /// # Errors
    ///
    /// Returns an error if `API_PORT` or `SESSION_TTL_HOURS` is not a number.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        // Network settings
        let host = lookup("API_HOST").unwrap_or(defaults.host);
        let port = match lookup("API_PORT") {
            Some(port) => port.parse().wrap_err("Invalid API_PORT value")?,
            None => defaults.port,
        };

        // Database settings
        let database_url = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty());

        // Logging settings
        let log_level = parse_level(lookup("LOG_LEVEL").as_deref(), defaults.log_level);

        // CORS settings
        let cors_origins = lookup("API_CORS_ORIGINS").map(|origins| {
            origins
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        });

        // Performance settings
        let request_timeout = lookup("API_REQUEST_TIMEOUT_SECONDS")
            .and_then(|value| value.parse().ok())
            .unwrap_or(defaults.request_timeout);

        // Session settings
        let session_ttl_hours = match lookup("SESSION_TTL_HOURS") {
            Some(hours) => hours.parse().wrap_err("Invalid SESSION_TTL_HOURS value")?,
            None => defaults.session_ttl_hours,
        };

        Ok(Self {
            host,
            port,
            database_url,
            log_level,
            cors_origins,
            request_timeout,
            session_ttl_hours,
        })
    }

    /// Returns the server address as a string (e.g., "127.0.0.1:8080")
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Maps a level name to a tracing level, keeping `default` for unknown names.
pub fn parse_level(value: Option<&str>, default: Level) -> Level {
    match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
        Some("trace") => Level::TRACE,
        Some("debug") => Level::DEBUG,
        Some("info") => Level::INFO,
        Some("warn") => Level::WARN,
        Some("error") => Level::ERROR,
        _ => default,
    }
}
