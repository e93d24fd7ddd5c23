//! Session issuance: credentials in, signed token out

use std::sync::Arc;

use chrono::{DateTime, Duration as ChronoDuration, Utc};

use crate::crypto::constant_time_str_eq;
use crate::policy::CredentialPolicy;
use crate::{AuthConfig, AuthError, ClaimsCodec, SessionClaims};

/// A freshly issued session
#[derive(Debug, Clone)]
pub struct IssuedSession {
    /// Signed token, used verbatim as the cookie value
    pub token: String,
    /// Same instant as the token's `expire` claim
    pub expires_at: DateTime<Utc>,
}

/// Exchanges the static credential pair for signed session tokens
#[derive(Clone)]
pub struct SessionIssuer {
    codec: Arc<ClaimsCodec>,
    policy: Arc<dyn CredentialPolicy>,
    username: String,
    password: String,
    lifetime: ChronoDuration,
}

impl SessionIssuer {
    /// Create an issuer for the credentials in `config`
    pub fn new(
        config: &AuthConfig,
        codec: Arc<ClaimsCodec>,
        policy: Arc<dyn CredentialPolicy>,
    ) -> Self {
        Self {
            codec,
            policy,
            username: config.username.clone(),
            password: config.password.clone(),
            lifetime: ChronoDuration::days(i64::from(config.lifetime_days)),
        }
    }

    /// Check credentials and issue a token valid for the configured lifetime
    pub fn issue(&self, username: &str, password: &str) -> Result<IssuedSession, AuthError> {
        self.issue_at(username, password, Utc::now())
    }

    /// Same as [`issue`](Self::issue) with an explicit issue instant
    pub fn issue_at(
        &self,
        username: &str,
        password: &str,
        now: DateTime<Utc>,
    ) -> Result<IssuedSession, AuthError> {
        if !self.credentials_match(username, password) {
            tracing::debug!("Login rejected");
            return Err(AuthError::InvalidCredentials);
        }

        // Whole seconds, so the cookie expiry and the claim agree exactly
        let expire = now
            .checked_add_signed(self.lifetime)
            .ok_or_else(|| AuthError::Configuration("token lifetime out of range".to_string()))?
            .timestamp();
        let expires_at = DateTime::from_timestamp(expire, 0).ok_or_else(|| {
            AuthError::Configuration("token lifetime out of range".to_string())
        })?;

        let claims = self
            .policy
            .bind(SessionClaims::new(username, expire), password)?;
        let token = self.codec.sign(&claims)?;

        tracing::info!(user = %username, mode = %self.policy.mode(), "Session issued");

        Ok(IssuedSession { token, expires_at })
    }

    /// Both halves are always compared so timing does not reveal which failed
    fn credentials_match(&self, username: &str, password: &str) -> bool {
        let username_ok = constant_time_str_eq(username, &self.username);
        let password_ok = constant_time_str_eq(password, &self.password);
        username_ok & password_ok
    }
}

impl std::fmt::Debug for SessionIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionIssuer")
            .field("username", &self.username)
            .field("lifetime", &self.lifetime)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::policy_for;
    use crate::SessionMode;

    const SECRET: &str = "super-secret-key-for-testing-0123456789";

    fn issuer(mode: SessionMode) -> (SessionIssuer, Arc<ClaimsCodec>) {
        let config = AuthConfig::new(SECRET, "warden_session", "admin", "hunter2")
            .with_lifetime_days(3)
            .with_session_mode(mode);
        let codec = Arc::new(ClaimsCodec::new(SECRET).unwrap());
        let issuer = SessionIssuer::new(&config, Arc::clone(&codec), policy_for(&config));
        (issuer, codec)
    }

    #[test]
    fn test_issue_shared_secret() {
        let (issuer, codec) = issuer(SessionMode::SharedSecret);
        let now = Utc::now();
        let session = issuer.issue_at("admin", "hunter2", now).unwrap();

        let claims = codec.verify(&session.token).unwrap();
        assert_eq!(claims.subject, "admin");
        assert_eq!(claims.expire, (now + ChronoDuration::days(3)).timestamp());
        assert_eq!(claims.expire, session.expires_at.timestamp());
        assert_eq!(claims.credential_hash, None);
    }

    #[test]
    fn test_issue_credential_hash() {
        let (issuer, codec) = issuer(SessionMode::CredentialHash);
        let session = issuer.issue("admin", "hunter2").unwrap();

        let claims = codec.verify(&session.token).unwrap();
        let hash = claims.credential_hash.expect("hash-carrying token");
        assert!(crate::crypto::verify_password("hunter2", &hash));
    }

    #[test]
    fn test_wrong_username_and_wrong_password_look_the_same() {
        let (issuer, _) = issuer(SessionMode::SharedSecret);

        let wrong_user = issuer.issue("root", "hunter2").unwrap_err();
        let wrong_pass = issuer.issue("admin", "hunter3").unwrap_err();
        assert!(matches!(wrong_user, AuthError::InvalidCredentials));
        assert!(matches!(wrong_pass, AuthError::InvalidCredentials));
        assert_eq!(wrong_user.to_string(), wrong_pass.to_string());
    }

    #[test]
    fn test_oversized_lifetime_is_an_error_not_a_panic() {
        // Bypasses validation, which would refuse this config
        let config = AuthConfig::new(SECRET, "warden_session", "admin", "hunter2")
            .with_lifetime_days(100_000_000);
        let codec = Arc::new(ClaimsCodec::new(SECRET).unwrap());
        let issuer = SessionIssuer::new(&config, codec, policy_for(&config));

        let result = issuer.issue("admin", "hunter2");
        assert!(matches!(result, Err(AuthError::Configuration(_))));
    }

    #[test]
    fn test_max_lifetime_issues() {
        let config = AuthConfig::new(SECRET, "warden_session", "admin", "hunter2")
            .with_lifetime_days(AuthConfig::MAX_LIFETIME_DAYS);
        let codec = Arc::new(ClaimsCodec::new(SECRET).unwrap());
        let issuer = SessionIssuer::new(&config, codec, policy_for(&config));

        let session = issuer.issue("admin", "hunter2").unwrap();
        assert_eq!(session.expires_at.format("%Y").to_string().len(), 4);
    }

    #[test]
    fn test_empty_credentials_rejected() {
        let (issuer, _) = issuer(SessionMode::SharedSecret);
        assert!(issuer.issue("", "").is_err());
        assert!(issuer.issue("admin", "").is_err());
    }
}
