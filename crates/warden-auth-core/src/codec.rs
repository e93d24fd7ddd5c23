//! Signed token encoding for session claims
//!
//! Tokens are compact HS256 JWTs. The algorithm is pinned: a token whose
//! header names anything else is rejected before its signature is looked
//! at.

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use crate::{CodecError, SessionClaims};

/// The single accepted signing algorithm
pub const ALGORITHM: Algorithm = Algorithm::HS256;

/// Signs and verifies session claims with the shared secret
#[derive(Clone)]
pub struct ClaimsCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl ClaimsCodec {
    /// Create a codec from the shared secret.
    ///
    /// # Errors
    /// Returns `SigningFailure` if the secret is empty.
    pub fn new(secret: impl AsRef<[u8]>) -> Result<Self, CodecError> {
        let secret = secret.as_ref();
        if secret.is_empty() {
            return Err(CodecError::SigningFailure(
                "signing secret is empty".to_string(),
            ));
        }

        // Expiry lives in our own `expire` claim and is checked by the
        // verifier, so none of the registered claims are required here.
        let mut validation = Validation::new(ALGORITHM);
        validation.required_spec_claims.clear();
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
        })
    }

    /// Sign claims into a token string
    pub fn sign(&self, claims: &SessionClaims) -> Result<String, CodecError> {
        encode(&Header::new(ALGORITHM), claims, &self.encoding_key).map_err(|e| {
            tracing::error!("Failed to sign token: {}", e);
            CodecError::SigningFailure(e.to_string())
        })
    }

    /// Verify a token string and decode its claims.
    ///
    /// Never returns claims for a token it cannot fully verify.
    pub fn verify(&self, token: &str) -> Result<SessionClaims, CodecError> {
        decode::<SessionClaims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!("Token verification failed: {}", e);
                match e.kind() {
                    ErrorKind::InvalidSignature => CodecError::InvalidSignature,
                    ErrorKind::InvalidAlgorithm | ErrorKind::MissingAlgorithm => {
                        CodecError::UnsupportedAlgorithm
                    }
                    _ => CodecError::MalformedToken,
                }
            })
    }
}

impl std::fmt::Debug for ClaimsCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClaimsCodec")
            .field("algorithm", &ALGORITHM)
            .finish_non_exhaustive()
    }
}
