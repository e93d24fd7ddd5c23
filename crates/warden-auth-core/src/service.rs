//! Session service - ties together codec, policy, issuer and verifier

use std::sync::Arc;

use crate::{
    cache::{CacheConfig, VerificationCache},
    codec::ClaimsCodec,
    config::AuthConfig,
    issuer::{IssuedSession, SessionIssuer},
    policy::policy_for,
    verifier::{SessionVerifier, Verification},
    AuthError, SessionMode,
};

/// Session service
///
/// Provides a unified interface for:
/// - Session issuance (login)
/// - Session verification (forward-auth check)
#[derive(Clone)]
pub struct SessionService {
    config: Arc<AuthConfig>,
    issuer: SessionIssuer,
    verifier: SessionVerifier,
}

impl SessionService {
    /// Create a new session service.
    ///
    /// The verification cache is owned by the caller and injected here.
    ///
    /// # Errors
    /// Fails if the configuration is invalid or the secret cannot sign.
    pub fn new(config: AuthConfig, cache: VerificationCache) -> Result<Self, AuthError> {
        config.validate()?;

        let codec = Arc::new(ClaimsCodec::new(&config.secret)?);
        let policy = policy_for(&config);

        Ok(Self {
            issuer: SessionIssuer::new(&config, Arc::clone(&codec), Arc::clone(&policy)),
            verifier: SessionVerifier::new(codec, cache, policy),
            config: Arc::new(config),
        })
    }

    /// Create a service with a fresh cache sized from `config`
    pub fn from_config(config: AuthConfig) -> Result<Self, AuthError> {
        let cache = VerificationCache::new(cache_config(&config));
        Self::new(config, cache)
    }

    /// Exchange credentials for a signed session
    pub fn login(&self, username: &str, password: &str) -> Result<IssuedSession, AuthError> {
        self.issuer.issue(username, password)
    }

    /// Decide whether a session cookie value authenticates
    pub async fn verify(&self, token: Option<&str>) -> Verification {
        self.verifier.verify(token).await
    }

    pub fn cookie_name(&self) -> &str {
        &self.config.cookie_name
    }

    pub fn session_mode(&self) -> SessionMode {
        self.config.session_mode
    }
}

/// Cache settings derived from the core configuration
pub fn cache_config(config: &AuthConfig) -> CacheConfig {
    CacheConfig::default()
        .with_ttl(config.cache_ttl)
        .with_max_entries(config.cache_max_entries)
}

impl std::fmt::Debug for SessionService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionService")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
