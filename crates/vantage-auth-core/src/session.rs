//! Session token minting
//!
//! Issues the second, internally-scoped token from a verified external
//! identity: compact HS256 with the external subject id carried both as
//! `sub` and as the `outseta_sub` custom claim, for use against the
//! backing store's own access layer.

use chrono::{DateTime, TimeZone, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use vantage_types::AuthContext;

use crate::{AuthConfig, AuthError};

/// Role claim on every minted session token
pub const SESSION_ROLE: &str = "authenticated";

/// Claims carried by a minted session token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// External subject id
    pub sub: String,
    /// Fixed role for the backing store's access layer
    pub role: String,
    /// External subject id as a custom claim
    pub outseta_sub: String,
    /// Email, when the provider supplied one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Configured issuer
    pub iss: String,
    /// Configured audience
    pub aud: String,
    /// Issued-at (epoch seconds)
    pub iat: i64,
    /// Expiry (epoch seconds)
    pub exp: i64,
}

/// A freshly minted session token
#[derive(Debug, Clone, Serialize)]
pub struct MintedSession {
    /// Compact HS256 token
    pub token: String,
    /// Seconds until expiry
    pub expires_in: u64,
    /// Absolute expiry time
    pub expires_at: DateTime<Utc>,
}

/// Mints internally-scoped session tokens
#[derive(Clone)]
pub struct SessionMinter {
    secret: Option<String>,
    issuer: String,
    audience: String,
    ttl: Duration,
}

impl SessionMinter {
    /// Create a minter from config
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            secret: config.session_secret.clone(),
            issuer: config.session_issuer.clone(),
            audience: config.session_audience.clone(),
            ttl: config.session_ttl,
        }
    }

    /// Mint a session token for a verified identity.
    ///
    /// Fails with [`AuthError::MissingSigningSecret`] when no secret is
    /// configured; an unsigned or weakly-keyed token is never minted.
    pub fn mint(&self, context: &AuthContext) -> Result<MintedSession, AuthError> {
        self.mint_at(context, Utc::now())
    }

    /// Mint with an explicit issue time (test seam)
    pub fn mint_at(
        &self,
        context: &AuthContext,
        now: DateTime<Utc>,
    ) -> Result<MintedSession, AuthError> {
        let secret = self
            .secret
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or(AuthError::MissingSigningSecret)?;

        let iat = now.timestamp();
        let exp = iat + self.ttl.as_secs() as i64;

        let claims = SessionClaims {
            sub: context.subject_id.clone(),
            role: SESSION_ROLE.to_string(),
            outseta_sub: context.subject_id.clone(),
            email: context.email.clone(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            iat,
            exp,
        };

        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .map_err(|e| {
            tracing::error!("Failed to sign session token: {}", e);
            AuthError::Internal("failed to sign session token".to_string())
        })?;

        Ok(MintedSession {
            token,
            expires_in: self.ttl.as_secs(),
            expires_at: Utc
                .timestamp_opt(exp, 0)
                .single()
                .unwrap_or_else(|| now + self.ttl),
        })
    }
}

impl std::fmt::Debug for SessionMinter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionMinter")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{DecodingKey, Validation, decode};

    const SECRET: &str = "test-session-secret-at-least-32-bytes";

    fn minter() -> SessionMinter {
        let config = AuthConfig::new("https://idp.example.com/jwks", "https://idp.example.com")
            .with_session_secret(SECRET);
        SessionMinter::new(&config)
    }

    fn decode_session(token: &str) -> SessionClaims {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[crate::config::DEFAULT_SESSION_ISSUER]);
        validation.set_audience(&[crate::config::DEFAULT_SESSION_AUDIENCE]);

        decode::<SessionClaims>(token, &DecodingKey::from_secret(SECRET.as_bytes()), &validation)
            .expect("minted token must verify")
            .claims
    }

    /// Decode a token minted at a fixed past instant; skips wall-clock
    /// expiry validation so backdated tokens can be inspected.
    fn decode_session_fixed_time(token: &str) -> SessionClaims {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[crate::config::DEFAULT_SESSION_ISSUER]);
        validation.set_audience(&[crate::config::DEFAULT_SESSION_AUDIENCE]);
        validation.validate_exp = false;

        decode::<SessionClaims>(token, &DecodingKey::from_secret(SECRET.as_bytes()), &validation)
            .expect("minted token must verify")
            .claims
    }

    #[test]
    fn test_mint_roundtrip() {
        let context = AuthContext::new("sub-123", Some("user@example.com".to_string()));
        let minted = minter().mint(&context).unwrap();

        let claims = decode_session(&minted.token);
        assert_eq!(claims.sub, "sub-123");
        assert_eq!(claims.outseta_sub, "sub-123");
        assert_eq!(claims.role, SESSION_ROLE);
        assert_eq!(claims.email.as_deref(), Some("user@example.com"));
        assert_eq!(claims.exp, claims.iat + 4 * 3600);
        assert_eq!(minted.expires_in, 4 * 3600);
    }

    #[test]
    fn test_exp_is_exactly_ttl_after_iat() {
        let config = AuthConfig::new("https://idp.example.com/jwks", "https://idp.example.com")
            .with_session_secret(SECRET)
            .with_session_ttl(Duration::from_secs(900));
        let minter = SessionMinter::new(&config);

        let now = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let minted = minter
            .mint_at(&AuthContext::new("sub-1", None), now)
            .unwrap();

        let claims = decode_session_fixed_time(&minted.token);
        assert_eq!(claims.iat, 1_700_000_000);
        assert_eq!(claims.exp, 1_700_000_900);
        assert_eq!(minted.expires_at.timestamp(), 1_700_000_900);
    }

    #[test]
    fn test_email_omitted_when_absent() {
        let minted = minter().mint(&AuthContext::new("sub-1", None)).unwrap();
        let claims = decode_session(&minted.token);
        assert!(claims.email.is_none());

        // The claim is dropped from the payload entirely, not null
        let payload = crate::ParsedToken::parse(&minted.token).unwrap().payload;
        assert!(payload.get("email").is_none());
    }

    #[test]
    fn test_missing_secret_is_fatal() {
        let config = AuthConfig::new("https://idp.example.com/jwks", "https://idp.example.com");
        let minter = SessionMinter::new(&config);

        let result = minter.mint(&AuthContext::new("sub-1", None));
        assert!(matches!(result, Err(AuthError::MissingSigningSecret)));

        let config = config.with_session_secret("");
        let minter = SessionMinter::new(&config);
        assert!(matches!(
            minter.mint(&AuthContext::new("sub-1", None)),
            Err(AuthError::MissingSigningSecret)
        ));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let minted = minter().mint(&AuthContext::new("sub-1", None)).unwrap();

        let result = decode::<SessionClaims>(
            &minted.token,
            &DecodingKey::from_secret(b"a-completely-different-secret-key"),
            &Validation::new(Algorithm::HS256),
        );
        assert!(result.is_err());
    }
}
