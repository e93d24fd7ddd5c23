//! Session claim set carried inside a token

use serde::{Deserialize, Serialize};

/// Claims carried by a session token.
///
/// Decoded once at the codec boundary; a token whose payload lacks a
/// field or has the wrong type never becomes a `SessionClaims`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Authenticated identity
    #[serde(rename = "user")]
    pub subject: String,
    /// Absolute expiry, Unix seconds
    pub expire: i64,
    /// Argon2id PHC string of the password at issuance (hash-carrying mode)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credential_hash: Option<String>,
}

impl SessionClaims {
    /// Create claims for `subject` expiring at `expire` (Unix seconds)
    pub fn new(subject: impl Into<String>, expire: i64) -> Self {
        Self {
            subject: subject.into(),
            expire,
            credential_hash: None,
        }
    }

    /// Attach a credential hash
    #[must_use]
    pub fn with_credential_hash(mut self, hash: impl Into<String>) -> Self {
        self.credential_hash = Some(hash.into());
        self
    }

    /// Whether the claims are expired at `now` (Unix seconds).
    ///
    /// `now == expire` counts as expired.
    pub fn is_expired_at(&self, now: i64) -> bool {
        self.expire <= now
    }
}
