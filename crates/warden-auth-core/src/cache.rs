//! Verification cache
//!
//! Maps a raw token string to the claims it verified to, so repeated
//! checks of the same cookie skip signature verification for a short
//! window. Entries are written only after a successful verification.
//!
//! # Usage
//!
//! ```ignore
//! use warden_auth_core::{CacheConfig, VerificationCache};
//!
//! let cache = VerificationCache::new(CacheConfig::default());
//! cache.put(token, claims, cache.ttl()).await;
//! let hit = cache.get(&token).await;
//! ```

use std::time::{Duration, Instant};

use moka::future::Cache;
use moka::Expiry;

use crate::SessionClaims;

/// Configuration for the verification cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Default TTL for entries.
    /// Default: 5 minutes
    pub ttl: Duration,

    /// Maximum number of cached tokens. Every entry costs 1.
    /// Default: 100,000
    pub max_entries: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(5 * 60),
            max_entries: 100_000,
        }
    }
}

impl CacheConfig {
    /// Set the default entry TTL.
    #[must_use]
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Set the maximum number of cached tokens.
    #[must_use]
    pub fn with_max_entries(mut self, max: u64) -> Self {
        self.max_entries = max;
        self
    }
}

#[derive(Debug, Clone)]
struct CachedClaims {
    claims: SessionClaims,
    ttl: Duration,
}

/// Per-entry expiry. An overwrite restarts the clock.
struct EntryTtl;

impl Expiry<String, CachedClaims> for EntryTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &CachedClaims,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &CachedClaims,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// Bounded, TTL-based store of verified claims keyed by raw token.
///
/// Cloning is cheap and clones share the same storage. Safe for
/// concurrent use from any number of tasks; eviction under pressure is
/// approximate and only ever causes a re-verify.
#[derive(Clone)]
pub struct VerificationCache {
    entries: Cache<String, CachedClaims>,
    config: CacheConfig,
}

impl std::fmt::Debug for VerificationCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VerificationCache")
            .field("config", &self.config)
            .field("entries", &self.entries.entry_count())
            .finish()
    }
}

impl VerificationCache {
    /// Create an empty cache.
    pub fn new(config: CacheConfig) -> Self {
        let entries = Cache::builder()
            .max_capacity(config.max_entries)
            .expire_after(EntryTtl)
            .build();

        Self { entries, config }
    }

    /// Default TTL for new entries.
    pub fn ttl(&self) -> Duration {
        self.config.ttl
    }

    /// Look up previously verified claims for `token`.
    pub async fn get(&self, token: &str) -> Option<SessionClaims> {
        match self.entries.get(token).await {
            Some(cached) => {
                tracing::trace!("verification cache hit");
                metrics::counter!("warden_cache_hits_total").increment(1);
                Some(cached.claims)
            }
            None => {
                metrics::counter!("warden_cache_misses_total").increment(1);
                None
            }
        }
    }

    /// Store verified claims for `token`, replacing any existing entry.
    pub async fn put(&self, token: impl Into<String>, claims: SessionClaims, ttl: Duration) {
        self.entries
            .insert(token.into(), CachedClaims { claims, ttl })
            .await;
    }

    /// Approximate number of live entries.
    pub fn entry_count(&self) -> u64 {
        self.entries.entry_count()
    }

    /// Apply pending maintenance so `entry_count` is current.
    pub async fn sync(&self) {
        self.entries.run_pending_tasks().await;
    }
}
