//! Credential binding policies
//!
//! Both session variants share one issuer and one verifier; they differ
//! only in what gets bound into the claims at login and what is checked
//! against them afterwards.

use std::sync::Arc;

use moka::sync::Cache;

use crate::crypto::{hash_password, verify_password};
use crate::{AuthConfig, AuthError, Rejection, SessionClaims, SessionMode};

/// Binds sessions to the configured credentials
pub trait CredentialPolicy: Send + Sync + std::fmt::Debug {
    /// Variant this policy implements
    fn mode(&self) -> SessionMode;

    /// Add whatever the policy needs to freshly built claims
    fn bind(&self, claims: SessionClaims, password: &str) -> Result<SessionClaims, AuthError>;

    /// Check verified, unexpired claims against the live credentials
    fn check(&self, claims: &SessionClaims) -> Result<(), Rejection>;

    /// Whether `check` on these claims does slow, blocking work
    fn check_blocks(&self, _claims: &SessionClaims) -> bool {
        false
    }
}

/// Build the policy selected by `config.session_mode`
pub fn policy_for(config: &AuthConfig) -> Arc<dyn CredentialPolicy> {
    match config.session_mode {
        SessionMode::SharedSecret => Arc::new(SharedSecretPolicy),
        SessionMode::CredentialHash => Arc::new(CredentialHashPolicy::new(config.password.clone())),
    }
}

/// Signature and expiry are the whole story
#[derive(Debug, Clone, Copy, Default)]
pub struct SharedSecretPolicy;

impl CredentialPolicy for SharedSecretPolicy {
    fn mode(&self) -> SessionMode {
        SessionMode::SharedSecret
    }

    fn bind(&self, claims: SessionClaims, _password: &str) -> Result<SessionClaims, AuthError> {
        Ok(claims)
    }

    fn check(&self, _claims: &SessionClaims) -> Result<(), Rejection> {
        Ok(())
    }
}

/// Tokens carry an Argon2id hash of the password they were issued for.
///
/// Changing the configured password invalidates every outstanding token
/// without any server-side session table.
pub struct CredentialHashPolicy {
    live_password: String,
    /// Hashes already proven to match `live_password`
    confirmed: Cache<String, ()>,
}

impl CredentialHashPolicy {
    const CONFIRMED_CAPACITY: u64 = 1_024;

    pub fn new(live_password: impl Into<String>) -> Self {
        Self {
            live_password: live_password.into(),
            confirmed: Cache::new(Self::CONFIRMED_CAPACITY),
        }
    }
}

impl std::fmt::Debug for CredentialHashPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialHashPolicy")
            .field("confirmed", &self.confirmed.entry_count())
            .finish_non_exhaustive()
    }
}

impl CredentialPolicy for CredentialHashPolicy {
    fn mode(&self) -> SessionMode {
        SessionMode::CredentialHash
    }

    fn bind(&self, claims: SessionClaims, password: &str) -> Result<SessionClaims, AuthError> {
        Ok(claims.with_credential_hash(hash_password(password)?))
    }

    fn check_blocks(&self, claims: &SessionClaims) -> bool {
        claims
            .credential_hash
            .as_deref()
            .is_some_and(|hash| !self.confirmed.contains_key(hash))
    }

    fn check(&self, claims: &SessionClaims) -> Result<(), Rejection> {
        let hash = claims
            .credential_hash
            .as_deref()
            .ok_or(Rejection::CredentialChanged)?;

        // The live password is fixed for the life of the process, so a
        // hash that matched once keeps matching.
        if self.confirmed.contains_key(hash) {
            return Ok(());
        }

        if verify_password(&self.live_password, hash) {
            self.confirmed.insert(hash.to_string(), ());
            Ok(())
        } else {
            Err(Rejection::CredentialChanged)
        }
    }
}
