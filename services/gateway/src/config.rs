//! Configuration for the gateway service.

use std::time::Duration;

use warden_auth_core::{AuthConfig, SessionMode};

/// Gateway configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub port: u16,

    /// Session core configuration
    pub auth: AuthConfig,

    /// Per-request timeout
    pub request_timeout: Duration,

    /// Expose Prometheus metrics on /metrics
    pub metrics_enabled: bool,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_source(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_source<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &'static str| {
            lookup(key)
                .filter(|v| !v.is_empty())
                .ok_or(ConfigError::Missing(key))
        };

        let secret = required("JWT_KEY")?;
        let cookie_name = required("COOKIE_NAME")?;
        let username = required("USERNAME")?;
        let password = required("PASSWORD")?;

        let port = required("PORT")?
            .parse()
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        // Token lifetime in days
        let lifetime_days: u32 = required("EXPIRE_IN")?
            .parse()
            .map_err(|_| ConfigError::Invalid("EXPIRE_IN"))?;

        let session_mode: SessionMode = lookup("SESSION_MODE")
            .unwrap_or_else(|| "shared_secret".to_string())
            .parse()
            .map_err(|_| ConfigError::Invalid("SESSION_MODE"))?;

        // Verification cache (default 5 minutes, 100k entries)
        let cache_ttl_secs: u64 = lookup("CACHE_TTL_SECS")
            .unwrap_or_else(|| "300".to_string())
            .parse()
            .map_err(|_| ConfigError::Invalid("CACHE_TTL_SECS"))?;

        let cache_max_entries: u64 = lookup("CACHE_MAX_ENTRIES")
            .unwrap_or_else(|| "100000".to_string())
            .parse()
            .map_err(|_| ConfigError::Invalid("CACHE_MAX_ENTRIES"))?;

        // Request timeout (default 10 seconds)
        let request_timeout_secs: u64 = lookup("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|| "10".to_string())
            .parse()
            .map_err(|_| ConfigError::Invalid("REQUEST_TIMEOUT_SECS"))?;
        if request_timeout_secs == 0 {
            return Err(ConfigError::Invalid("REQUEST_TIMEOUT_SECS"));
        }

        let metrics_enabled: bool = lookup("METRICS_ENABLED")
            .unwrap_or_else(|| "false".to_string())
            .parse()
            .map_err(|_| ConfigError::Invalid("METRICS_ENABLED"))?;

        let auth = AuthConfig::new(secret, cookie_name, username, password)
            .with_lifetime_days(lifetime_days)
            .with_session_mode(session_mode)
            .with_cache_ttl(Duration::from_secs(cache_ttl_secs))
            .with_cache_max_entries(cache_max_entries);

        auth.validate()
            .map_err(|e| ConfigError::Auth(e.to_string()))?;

        Ok(Self {
            port,
            auth,
            request_timeout: Duration::from_secs(request_timeout_secs),
            metrics_enabled,
        })
    }
}

/// Configuration error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),

    #[error("Auth config error: {0}")]
    Auth(String),
}
