//! Identity provider key-set fetching and caching
//!
//! The cache holds a single [`KeySet`] replaced wholesale on refresh
//! (atomic reference swap, never mutated in place). A refresh failure
//! leaves the previous, possibly stale set in place rather than clearing
//! it. Concurrent refreshes are not mutually exclusive; a few redundant
//! fetches under load are acceptable, a partially-written cache is not.

use arc_swap::ArcSwapOption;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

use crate::AuthConfig;

/// JWKS document as published by the identity provider
#[derive(Debug, Clone, Deserialize)]
pub struct Jwks {
    pub keys: Vec<Jwk>,
}

/// Individual JWK (JSON Web Key)
#[derive(Debug, Clone, Deserialize)]
pub struct Jwk {
    pub kid: Option<String>,
    pub kty: String,
    pub alg: Option<String>,
    pub n: Option<String>,
    pub e: Option<String>,
}

impl Jwk {
    /// RSA modulus and exponent, present only for usable RSA keys
    pub fn rsa_components(&self) -> Option<(&str, &str)> {
        if self.kty != "RSA" {
            return None;
        }
        Some((self.n.as_deref()?, self.e.as_deref()?))
    }

    fn is_rsa(&self) -> bool {
        self.rsa_components().is_some()
    }
}

/// A fetched key set with its fetch timestamp
#[derive(Debug, Clone)]
pub struct KeySet {
    fetched_at: DateTime<Utc>,
    keys: Vec<Jwk>,
}

impl KeySet {
    /// Look up a key: exact `kid` match when one is requested, otherwise
    /// the first RSA key. Only RSA entries are usable; `None` means
    /// verification must fail, never "skip verification".
    pub fn lookup(&self, kid: Option<&str>) -> Option<&Jwk> {
        match kid {
            Some(kid) => self
                .keys
                .iter()
                .find(|k| k.kid.as_deref() == Some(kid) && k.is_rsa()),
            None => self.keys.iter().find(|k| k.is_rsa()),
        }
    }
}

/// Clock seam so tests can force expiry without wall-clock sleeps
type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// TTL-cached view of the provider's signing keys.
///
/// Process-wide shared state; read-mostly. The cached set is replaced as
/// a single atomic reference swap.
pub struct KeySetCache {
    jwks_url: String,
    ttl: ChronoDuration,
    http_client: reqwest::Client,
    cached: ArcSwapOption<KeySet>,
    now: Clock,
}

impl KeySetCache {
    /// Create a new cache with a tuned HTTP client.
    ///
    /// The client is configured for low-latency key fetching: pooled
    /// connections to the single JWKS host and aggressive timeouts to
    /// fail fast.
    pub fn new(config: &AuthConfig) -> Self {
        let http_client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(10))
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(2)
            .tcp_nodelay(true)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self::with_client(config, http_client)
    }

    /// Create a cache with a custom HTTP client
    pub fn with_client(config: &AuthConfig, http_client: reqwest::Client) -> Self {
        Self {
            jwks_url: config.jwks_url.clone(),
            ttl: ChronoDuration::from_std(config.key_cache_ttl)
                .unwrap_or_else(|_| ChronoDuration::hours(24)),
            http_client,
            cached: ArcSwapOption::empty(),
            now: Arc::new(Utc::now),
        }
    }

    /// Replace the clock used for TTL checks (test seam)
    pub fn with_now(mut self, now: impl Fn() -> DateTime<Utc> + Send + Sync + 'static) -> Self {
        self.now = Arc::new(now);
        self
    }

    /// Seed the cache with a known key set (warmup or tests)
    pub fn prime(&self, keys: Vec<Jwk>) {
        let set = KeySet {
            fetched_at: (self.now)(),
            keys,
        };
        self.cached.store(Some(Arc::new(set)));
    }

    /// Resolve a signing key for the given `kid`.
    ///
    /// Refreshes when the cache is empty or older than the TTL; on fetch
    /// failure falls through to whatever is currently cached.
    pub async fn key_for(&self, kid: Option<&str>) -> Option<Jwk> {
        let set = self.current_or_refresh().await?;
        set.lookup(kid).cloned()
    }

    async fn current_or_refresh(&self) -> Option<Arc<KeySet>> {
        let now = (self.now)();
        if let Some(current) = self.cached.load_full() {
            if now - current.fetched_at <= self.ttl {
                return Some(current);
            }
        }

        match self.fetch_jwks().await {
            Ok(jwks) => {
                let set = Arc::new(KeySet {
                    fetched_at: now,
                    keys: jwks.keys,
                });
                self.cached.store(Some(Arc::clone(&set)));
                Some(set)
            }
            Err(e) => {
                // Serve stale rather than clearing the cache
                tracing::error!("Key set refresh failed, serving cached set: {}", e);
                self.cached.load_full()
            }
        }
    }

    async fn fetch_jwks(&self) -> Result<Jwks, reqwest::Error> {
        tracing::debug!("Fetching key set from {}", self.jwks_url);
        let response = self
            .http_client
            .get(&self.jwks_url)
            .send()
            .await?
            .error_for_status()?;

        response.json::<Jwks>().await
    }
}

impl std::fmt::Debug for KeySetCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeySetCache")
            .field("jwks_url", &self.jwks_url)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}
