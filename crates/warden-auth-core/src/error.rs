//! Auth errors

use thiserror::Error;

/// Failures of the claims codec
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// Token is not a well-formed signed token, or its claims do not decode
    #[error("malformed token")]
    MalformedToken,

    /// Signature does not match the configured secret
    #[error("invalid signature")]
    InvalidSignature,

    /// Header names an algorithm other than the pinned one
    #[error("unsupported algorithm")]
    UnsupportedAlgorithm,

    /// Secret unavailable or the claims could not be signed
    #[error("signing failure: {0}")]
    SigningFailure(String),
}

/// Reason a verification call did not authenticate.
///
/// Only ever logged server-side; clients see a redirect to login.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// No session cookie on the request
    #[error("no token")]
    NoToken,

    /// Token failed codec verification
    #[error("invalid token: {0}")]
    InvalidToken(CodecError),

    /// Token's `expire` instant is not in the future
    #[error("token expired")]
    Expired,

    /// Embedded credential hash no longer matches the configured password
    #[error("credential changed")]
    CredentialChanged,
}

impl Rejection {
    /// Short label for logs and metrics
    pub fn reason(&self) -> &'static str {
        match self {
            Self::NoToken => "no_token",
            Self::InvalidToken(CodecError::MalformedToken) => "malformed_token",
            Self::InvalidToken(CodecError::InvalidSignature) => "invalid_signature",
            Self::InvalidToken(CodecError::UnsupportedAlgorithm) => "unsupported_algorithm",
            Self::InvalidToken(CodecError::SigningFailure(_)) => "invalid_token",
            Self::Expired => "expired",
            Self::CredentialChanged => "credential_changed",
        }
    }
}

/// Authentication errors
#[derive(Error, Debug)]
pub enum AuthError {
    /// Wrong username or password (never says which)
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Token could not be signed (secret missing or unusable)
    #[error("signing failure: {0}")]
    SigningFailure(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Internal error
    #[error("internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Get error code for logs
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::SigningFailure(_) => "SIGNING_FAILURE",
            Self::Configuration(_) => "CONFIGURATION_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<CodecError> for AuthError {
    fn from(err: CodecError) -> Self {
        match err {
            CodecError::SigningFailure(msg) => Self::SigningFailure(msg),
            other => Self::Internal(other.to_string()),
        }
    }
}
