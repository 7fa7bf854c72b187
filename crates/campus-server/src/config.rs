//! Server configuration from environment variables.

use std::env;

use campus_client::ClientConfig;
use campus_client::cache::{CacheConfig, DEFAULT_MAX_AGE_SECS, DEFAULT_STALE_GRACE_SECS};

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// CMS endpoints and tokens.
    pub cms: ClientConfig,
    /// Server port to listen on.
    pub port: u16,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
    /// CORS allowed origins (comma-separated or "*" for all).
    pub cors_allowed_origins: String,
    /// Seconds a cached listing stays fresh.
    pub revalidate_secs: u64,
    /// Seconds a stale listing is still served while it is refetched.
    pub stale_grace_secs: u64,
}

impl ServerConfig {
    /// Configuration with default server settings around the given CMS config.
    pub fn new(cms: ClientConfig) -> Self {
        Self {
            cms,
            port: 3000,
            log_level: "info".to_string(),
            cors_allowed_origins: "*".to_string(),
            revalidate_secs: DEFAULT_MAX_AGE_SECS,
            stale_grace_secs: DEFAULT_STALE_GRACE_SECS,
        }
    }

    /// Load configuration from environment variables.
    ///
    /// The CMS variables are documented on [`ClientConfig::from_env`].
    ///
    /// Optional:
    /// - `PORT`: Server port (default: 3000)
    /// - `LOG_LEVEL`: Logging level (default: "info")
    /// - `CORS_ALLOWED_ORIGINS`: Allowed CORS origins (default: "*")
    /// - `REVALIDATE_SECS`: Listing cache freshness (default: 60)
    /// - `STALE_GRACE_SECS`: Stale listing grace period (default: 300)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let cms = ClientConfig::from_lookup(&lookup)?;
        let defaults = Self::new(cms);

        let port = parse_var(&lookup, "PORT")?.unwrap_or(defaults.port);
        let revalidate_secs = parse_var(&lookup, "REVALIDATE_SECS")?.unwrap_or(defaults.revalidate_secs);
        let stale_grace_secs =
            parse_var(&lookup, "STALE_GRACE_SECS")?.unwrap_or(defaults.stale_grace_secs);

        let log_level = lookup("LOG_LEVEL").unwrap_or_else(|| defaults.log_level.clone());
        let cors_allowed_origins =
            lookup("CORS_ALLOWED_ORIGINS").unwrap_or_else(|| defaults.cors_allowed_origins.clone());

        Ok(Self {
            port,
            log_level,
            cors_allowed_origins,
            revalidate_secs,
            stale_grace_secs,
            ..defaults
        })
    }

    /// Get the socket address for the server.
    pub fn socket_addr(&self) -> std::net::SocketAddr {
        std::net::SocketAddr::from(([0, 0, 0, 0], self.port))
    }

    /// Listing cache timings.
    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig::new(self.revalidate_secs, self.stale_grace_secs)
    }
}

fn parse_var<F, T>(lookup: &F, name: &str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty()) {
        Some(value) => value
            .parse()
            .map(Some)
            .map_err(|e: T::Err| ConfigError::InvalidValue {
                name: name.to_string(),
                reason: e.to_string(),
            }),
        None => Ok(None),
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Invalid environment variable value.
    #[error("invalid value for environment variable {name}: {reason}")]
    InvalidValue { name: String, reason: String },

    /// CMS settings are missing or invalid.
    #[error(transparent)]
    Cms(#[from] campus_client::ConfigError),
}
