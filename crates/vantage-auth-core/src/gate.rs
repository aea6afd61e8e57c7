//! The auth gate: one pass from inbound request to verified identity
//!
//! Orchestrates codec, key cache, signature verification, claim
//! validation, and identity extraction. No step is retried; every
//! failure maps to a 401 with its specific reason retained for logging.

use chrono::Utc;
use vantage_types::AuthContext;

use crate::claims::{extract_identity, validate_claims};
use crate::config::AuthConfig;
use crate::jwks::KeySetCache;
use crate::session::{MintedSession, SessionMinter};
use crate::token::ParsedToken;
use crate::verify::verify_signature;
use crate::AuthError;

/// Request-facing entry point of the identity bridge.
///
/// Stateless per request; the key-set cache is the only shared state.
pub struct AuthGate {
    config: AuthConfig,
    key_cache: KeySetCache,
    minter: SessionMinter,
}

impl AuthGate {
    /// Create a gate from config
    pub fn new(config: AuthConfig) -> Self {
        let key_cache = KeySetCache::new(&config);
        Self::with_key_cache(config, key_cache)
    }

    /// Create a gate with a pre-built key cache (custom client or warmed)
    pub fn with_key_cache(config: AuthConfig, key_cache: KeySetCache) -> Self {
        let minter = SessionMinter::new(&config);
        Self {
            config,
            key_cache,
            minter,
        }
    }

    /// The key cache, for warmup or invalidation by the host service
    pub fn key_cache(&self) -> &KeySetCache {
        &self.key_cache
    }

    /// Authenticate a request given its Authorization header and Cookie
    /// header values.
    pub async fn authenticate(
        &self,
        authorization: Option<&str>,
        cookie_header: Option<&str>,
    ) -> Result<AuthContext, AuthError> {
        let token = self
            .extract_token(authorization, cookie_header)
            .ok_or(AuthError::MissingToken)?;

        let result = self.authenticate_token(token).await;
        if let Err(e) = &result {
            tracing::debug!(code = e.error_code(), "Authentication failed");
        }
        result
    }

    /// Authenticate a bare token through the full pipeline.
    pub async fn authenticate_token(&self, token: &str) -> Result<AuthContext, AuthError> {
        let parsed = ParsedToken::parse(token)?;

        let key = self
            .key_cache
            .key_for(parsed.header.kid.as_deref())
            .await
            .ok_or(AuthError::NoMatchingKey)?;

        if !verify_signature(&parsed, &key)? {
            return Err(AuthError::InvalidSignature);
        }

        validate_claims(
            &parsed.payload,
            Utc::now().timestamp(),
            &self.config.accepted_issuers,
        )?;

        extract_identity(&parsed.payload)
    }

    /// Authenticate and mint the internally-scoped session token in one
    /// call, the complete bridge operation.
    pub async fn authenticate_and_mint(
        &self,
        authorization: Option<&str>,
        cookie_header: Option<&str>,
    ) -> Result<(AuthContext, MintedSession), AuthError> {
        let context = self.authenticate(authorization, cookie_header).await?;
        let session = self.minter.mint(&context)?;
        Ok((context, session))
    }

    /// Pull the inbound token out of a request: Authorization header
    /// first (`Bearer `-prefixed or raw), then the named cookie.
    pub fn extract_token<'a>(
        &self,
        authorization: Option<&'a str>,
        cookie_header: Option<&'a str>,
    ) -> Option<&'a str> {
        if let Some(value) = authorization {
            let token = value
                .strip_prefix("Bearer ")
                .unwrap_or(value)
                .trim();
            if !token.is_empty() {
                return Some(token);
            }
        }

        cookie_header.and_then(|header| cookie_value(header, &self.config.cookie_name))
    }
}

/// Extract a named cookie's value from a Cookie header.
fn cookie_value<'a>(header: &'a str, name: &str) -> Option<&'a str> {
    header.split(';').find_map(|pair| {
        let (k, v) = pair.split_once('=')?;
        if k.trim() == name {
            let v = v.trim();
            (!v.is_empty()).then_some(v)
        } else {
            None
        }
    })
}

impl std::fmt::Debug for AuthGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthGate")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
