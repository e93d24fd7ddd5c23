//! Warden Auth Core - session token lifecycle
//!
//! Issuance (credential check, signed claims, cookie value), verification
//! (cached-or-parsed claims, expiry and credential checks) and the
//! verification cache that keeps the forward-auth hot path cheap.

pub mod cache;
pub mod claims;
pub mod codec;
pub mod config;
pub mod crypto;
pub mod error;
pub mod issuer;
pub mod policy;
pub mod service;
pub mod verifier;

pub use cache::{CacheConfig, VerificationCache};
pub use claims::SessionClaims;
pub use codec::{ClaimsCodec, ALGORITHM};
pub use config::{AuthConfig, SessionMode};
pub use crypto::{constant_time_eq, constant_time_str_eq, hash_password, verify_password};
pub use error::{AuthError, CodecError, Rejection};
pub use issuer::{IssuedSession, SessionIssuer};
pub use policy::{policy_for, CredentialHashPolicy, CredentialPolicy, SharedSecretPolicy};
pub use service::{cache_config, SessionService};
pub use verifier::{SessionVerifier, Verification};
