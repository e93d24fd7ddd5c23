//! Configuration types for the session core

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::AuthError;

/// Seconds in one day
const SECS_PER_DAY: u64 = 24 * 60 * 60;

/// How a session is bound to the configured credentials
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionMode {
    /// Trust rests on the signing secret alone
    #[default]
    SharedSecret,
    /// Tokens also carry a password hash, re-checked on every verification
    CredentialHash,
}

impl SessionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SharedSecret => "shared_secret",
            Self::CredentialHash => "credential_hash",
        }
    }
}

impl fmt::Display for SessionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SessionMode {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "shared_secret" | "secret" => Ok(Self::SharedSecret),
            "credential_hash" | "hash" => Ok(Self::CredentialHash),
            other => Err(AuthError::Configuration(format!(
                "unknown session mode: {other}"
            ))),
        }
    }
}

/// Session core configuration.
///
/// Built once at startup and never mutated afterwards.
#[derive(Clone)]
pub struct AuthConfig {
    /// HMAC secret for token signing
    pub secret: String,
    /// Name of the session cookie
    pub cookie_name: String,
    /// Static username
    pub username: String,
    /// Static password
    pub password: String,
    /// Token lifetime in days
    pub lifetime_days: u32,
    /// Credential binding variant
    pub session_mode: SessionMode,
    /// How long a verified token stays in the verification cache
    pub cache_ttl: Duration,
    /// Maximum number of cached verifications
    pub cache_max_entries: u64,
}

impl AuthConfig {
    /// Recommended minimum secret length in bytes (256 bits)
    pub const RECOMMENDED_SECRET_LENGTH: usize = 32;

    /// Longest accepted token lifetime (about a century)
    pub const MAX_LIFETIME_DAYS: u32 = 36_500;

    /// Create a new config with default lifetime and cache settings
    pub fn new(
        secret: impl Into<String>,
        cookie_name: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            secret: secret.into(),
            cookie_name: cookie_name.into(),
            username: username.into(),
            password: password.into(),
            lifetime_days: 7,
            session_mode: SessionMode::default(),
            cache_ttl: Duration::from_secs(5 * 60), // 5 minutes
            cache_max_entries: 100_000,
        }
    }

    /// Create a new config and validate it
    pub fn try_new(
        secret: impl Into<String>,
        cookie_name: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Self, AuthError> {
        let config = Self::new(secret, cookie_name, username, password);
        config.validate()?;
        Ok(config)
    }

    /// Set token lifetime in days
    #[must_use]
    pub fn with_lifetime_days(mut self, days: u32) -> Self {
        self.lifetime_days = days;
        self
    }

    /// Set the credential binding variant
    #[must_use]
    pub fn with_session_mode(mut self, mode: SessionMode) -> Self {
        self.session_mode = mode;
        self
    }

    /// Set verification cache TTL
    #[must_use]
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    /// Set verification cache capacity
    #[must_use]
    pub fn with_cache_max_entries(mut self, max: u64) -> Self {
        self.cache_max_entries = max;
        self
    }

    /// Token lifetime as a duration
    pub fn token_lifetime(&self) -> Duration {
        Duration::from_secs(u64::from(self.lifetime_days) * SECS_PER_DAY)
    }

    /// Check invariants the core relies on.
    ///
    /// The cache TTL must never exceed the token lifetime, otherwise an
    /// expired token could keep being served from cache.
    pub fn validate(&self) -> Result<(), AuthError> {
        if self.secret.is_empty() {
            return Err(AuthError::Configuration(
                "signing secret must not be empty".to_string(),
            ));
        }
        if self.cookie_name.is_empty() {
            return Err(AuthError::Configuration(
                "cookie name must not be empty".to_string(),
            ));
        }
        if self.username.is_empty() || self.password.is_empty() {
            return Err(AuthError::Configuration(
                "username and password must not be empty".to_string(),
            ));
        }
        if self.lifetime_days == 0 || self.lifetime_days > Self::MAX_LIFETIME_DAYS {
            return Err(AuthError::Configuration(format!(
                "token lifetime must be between 1 and {} days, got {}",
                Self::MAX_LIFETIME_DAYS,
                self.lifetime_days
            )));
        }
        if self.cache_ttl.is_zero() || self.cache_ttl > self.token_lifetime() {
            return Err(AuthError::Configuration(format!(
                "cache TTL must be between 1s and the token lifetime, got {:?}",
                self.cache_ttl
            )));
        }
        if self.cache_max_entries == 0 {
            return Err(AuthError::Configuration(
                "cache capacity must be positive".to_string(),
            ));
        }
        if self.secret.len() < Self::RECOMMENDED_SECRET_LENGTH {
            tracing::warn!(
                secret_length = self.secret.len(),
                recommended = Self::RECOMMENDED_SECRET_LENGTH,
                "Signing secret is shorter than recommended"
            );
        }
        Ok(())
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("secret", &"[redacted]")
            .field("cookie_name", &self.cookie_name)
            .field("username", &self.username)
            .field("password", &"[redacted]")
            .field("lifetime_days", &self.lifetime_days)
            .field("session_mode", &self.session_mode)
            .field("cache_ttl", &self.cache_ttl)
            .field("cache_max_entries", &self.cache_max_entries)
            .finish()
    }
}
