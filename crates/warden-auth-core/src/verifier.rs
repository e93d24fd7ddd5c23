//! Session verification: cookie in, allow/deny out

use std::sync::Arc;

use chrono::Utc;
use tracing::instrument;

use crate::policy::CredentialPolicy;
use crate::{ClaimsCodec, Rejection, SessionClaims, VerificationCache};

/// Outcome of one verification call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verification {
    /// Token is valid; carries the identity it was issued to
    Authenticated { subject: String },
    /// Token missing or unacceptable
    Unauthenticated(Rejection),
}

impl Verification {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated { .. })
    }

    /// Authenticated identity, if any
    pub fn subject(&self) -> Option<&str> {
        match self {
            Self::Authenticated { subject } => Some(subject),
            Self::Unauthenticated(_) => None,
        }
    }
}

/// Resolves session cookies to an allow/deny decision.
///
/// Verified claims are cached by raw token; expiry and the credential
/// policy are re-checked on every call, cache hit or not.
#[derive(Clone)]
pub struct SessionVerifier {
    codec: Arc<ClaimsCodec>,
    cache: VerificationCache,
    policy: Arc<dyn CredentialPolicy>,
}

impl SessionVerifier {
    /// Create a verifier around an externally owned cache
    pub fn new(
        codec: Arc<ClaimsCodec>,
        cache: VerificationCache,
        policy: Arc<dyn CredentialPolicy>,
    ) -> Self {
        Self {
            codec,
            cache,
            policy,
        }
    }

    /// The cache this verifier writes to
    pub fn cache(&self) -> &VerificationCache {
        &self.cache
    }

    /// Verify a cookie value against the wall clock
    pub async fn verify(&self, token: Option<&str>) -> Verification {
        self.verify_at(token, Utc::now().timestamp()).await
    }

    /// Verify a cookie value as of `now` (Unix seconds)
    #[instrument(skip(self, token), level = "debug")]
    pub async fn verify_at(&self, token: Option<&str>, now: i64) -> Verification {
        match self.authenticate(token, now).await {
            Ok(subject) => {
                metrics::counter!("warden_verify_total", "outcome" => "authenticated")
                    .increment(1);
                Verification::Authenticated { subject }
            }
            Err(rejection) => {
                tracing::debug!(reason = rejection.reason(), "Session rejected");
                metrics::counter!("warden_verify_total", "outcome" => rejection.reason())
                    .increment(1);
                Verification::Unauthenticated(rejection)
            }
        }
    }

    async fn authenticate(&self, token: Option<&str>, now: i64) -> Result<String, Rejection> {
        let token = token
            .filter(|t| !t.is_empty())
            .ok_or(Rejection::NoToken)?;

        let claims = self.resolve(token).await?;

        // An expired entry is left in the cache to lapse on its own
        if claims.is_expired_at(now) {
            return Err(Rejection::Expired);
        }

        self.check_policy(claims).await
    }

    /// Run the credential policy, off the async workers when it hashes
    async fn check_policy(&self, claims: SessionClaims) -> Result<String, Rejection> {
        if !self.policy.check_blocks(&claims) {
            self.policy.check(&claims)?;
            return Ok(claims.subject);
        }

        let policy = Arc::clone(&self.policy);
        tokio::task::spawn_blocking(move || policy.check(&claims).map(|()| claims.subject))
            .await
            .unwrap_or_else(|e| {
                tracing::error!(error = %e, "Credential check task failed");
                Err(Rejection::CredentialChanged)
            })
    }

    /// Claims from cache, or from the codec on a miss
    async fn resolve(&self, token: &str) -> Result<SessionClaims, Rejection> {
        if let Some(claims) = self.cache.get(token).await {
            return Ok(claims);
        }

        let claims = self.codec.verify(token).map_err(Rejection::InvalidToken)?;
        self.cache
            .put(token, claims.clone(), self.cache.ttl())
            .await;

        Ok(claims)
    }
}

impl std::fmt::Debug for SessionVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionVerifier")
            .field("cache", &self.cache)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}
