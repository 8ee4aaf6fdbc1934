use std::env;
use std::path::PathBuf;

use eyre::Result;
use tracing::Level;

pub const DEFAULT_API_URL: &str = "http://localhost:3000";
pub const DEFAULT_SESSION_FILE: &str = ".ulendo-session.json";

/// Configuration for client front ends.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Base of the API, ending in `/api` without a trailing slash
    pub api_url: String,
    /// Where the signed-in session is kept between runs
    pub session_file: PathBuf,
    pub log_level: Level,
}

impl ClientConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_url = api_base_url(
            lookup("ULENDO_API_URL")
                .as_deref()
                .unwrap_or(DEFAULT_API_URL),
        );

        let session_file = lookup("ULENDO_SESSION_FILE")
            .filter(|path| !path.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_SESSION_FILE.to_string())
            .into();

        let log_level = match lookup("ULENDO_LOG_LEVEL")
            .map(|level| level.trim().to_ascii_lowercase())
            .as_deref()
        {
            Some("trace") => Level::TRACE,
            Some("debug") => Level::DEBUG,
            Some("info") => Level::INFO,
            Some("error") => Level::ERROR,
            _ => Level::WARN,
        };

        Ok(Self {
            api_url,
            session_file,
            log_level,
        })
    }
}

/// Normalizes a server address into the API base, e.g.
/// `http://host:3000/` becomes `http://host:3000/api`.
pub fn api_base_url(server: &str) -> String {
    let trimmed = server.trim().trim_end_matches('/');
    if trimmed.ends_with("/api") {
        trimmed.to_string()
    } else {
        format!("{}/api", trimmed)
    }
}
