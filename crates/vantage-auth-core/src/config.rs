//! Configuration types for the identity bridge

use std::time::Duration;
use thiserror::Error;

/// Cookie the inbound token falls back to when no Authorization header
/// is present.
pub const DEFAULT_COOKIE_NAME: &str = "outseta_access_token";

/// Default issuer claim on minted session tokens.
pub const DEFAULT_SESSION_ISSUER: &str = "vantage-auth";

/// Default audience claim on minted session tokens.
pub const DEFAULT_SESSION_AUDIENCE: &str = "authenticated";

/// Identity bridge configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Identity provider JWKS endpoint
    pub jwks_url: String,
    /// Issuer allow-list: the canonical issuer URL and its known aliases
    pub accepted_issuers: Vec<String>,
    /// Cookie name checked when no Authorization header is present
    pub cookie_name: String,
    /// How long a fetched key set is served before a refresh attempt
    pub key_cache_ttl: Duration,
    /// Symmetric secret for session signing; minting fails without one
    pub session_secret: Option<String>,
    /// Issuer claim on minted session tokens
    pub session_issuer: String,
    /// Audience claim on minted session tokens
    pub session_audience: String,
    /// Minted session lifetime
    pub session_ttl: Duration,
}

impl AuthConfig {
    /// Create a new config for a provider issuer.
    ///
    /// The allow-list starts as the canonical issuer plus its
    /// trailing-slash alias.
    pub fn new(jwks_url: impl Into<String>, issuer: impl Into<String>) -> Self {
        Self {
            jwks_url: jwks_url.into(),
            accepted_issuers: issuer_aliases(&issuer.into()),
            cookie_name: DEFAULT_COOKIE_NAME.to_string(),
            key_cache_ttl: Duration::from_secs(24 * 60 * 60), // 24 hours
            session_secret: None,
            session_issuer: DEFAULT_SESSION_ISSUER.to_string(),
            session_audience: DEFAULT_SESSION_AUDIENCE.to_string(),
            session_ttl: Duration::from_secs(4 * 60 * 60), // 4 hours
        }
    }

    /// Load configuration from environment variables.
    ///
    /// `VANTAGE_JWKS_URL` and `VANTAGE_ISSUER` are required; everything
    /// else has a fixed fallback default.
    pub fn from_env() -> Result<Self, ConfigError> {
        let jwks_url =
            std::env::var("VANTAGE_JWKS_URL").map_err(|_| ConfigError::Missing("VANTAGE_JWKS_URL"))?;
        let issuer =
            std::env::var("VANTAGE_ISSUER").map_err(|_| ConfigError::Missing("VANTAGE_ISSUER"))?;

        let mut config = Self::new(jwks_url, issuer);

        if let Ok(aliases) = std::env::var("VANTAGE_ISSUER_ALIASES") {
            for alias in aliases.split(',').map(str::trim).filter(|s| !s.is_empty()) {
                config.accepted_issuers.push(alias.to_string());
            }
        }

        if let Ok(secret) = std::env::var("SESSION_SIGNING_SECRET") {
            if !secret.is_empty() {
                config.session_secret = Some(secret);
            }
        }
        if let Ok(issuer) = std::env::var("SESSION_ISSUER") {
            config.session_issuer = issuer;
        }
        if let Ok(audience) = std::env::var("SESSION_AUDIENCE") {
            config.session_audience = audience;
        }
        if let Ok(ttl) = std::env::var("SESSION_TTL_SECS") {
            let secs: u64 = ttl.parse().map_err(|_| ConfigError::Invalid("SESSION_TTL_SECS"))?;
            config.session_ttl = Duration::from_secs(secs);
        }

        Ok(config)
    }

    /// Replace the issuer allow-list.
    ///
    /// An empty override is ignored: the allow-list discipline requires
    /// at least one acceptable issuer, never "accept anything".
    pub fn with_issuers(mut self, issuers: Vec<String>) -> Self {
        if !issuers.is_empty() {
            self.accepted_issuers = issuers;
        }
        self
    }

    /// Set the session signing secret
    pub fn with_session_secret(mut self, secret: impl Into<String>) -> Self {
        self.session_secret = Some(secret.into());
        self
    }

    /// Set the minted session lifetime
    pub fn with_session_ttl(mut self, ttl: Duration) -> Self {
        self.session_ttl = ttl;
        self
    }

    /// Set the key cache TTL
    pub fn with_key_cache_ttl(mut self, ttl: Duration) -> Self {
        self.key_cache_ttl = ttl;
        self
    }
}

/// Both slash forms of an issuer URL are accepted; providers are not
/// consistent about the trailing slash between JWKS and token claims.
fn issuer_aliases(issuer: &str) -> Vec<String> {
    let trimmed = issuer.trim_end_matches('/');
    vec![trimmed.to_string(), format!("{trimmed}/")]
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Required environment variable is missing
    #[error("missing required environment variable: {0}")]
    Missing(&'static str),

    /// Environment variable has an invalid value
    #[error("invalid value for environment variable: {0}")]
    Invalid(&'static str),
}
