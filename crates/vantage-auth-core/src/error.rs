//! Auth errors
//!
//! Every token-validation failure maps to HTTP 401 while keeping its
//! specific reason for logging; configuration and store failures are the
//! only 5xx-class errors this subsystem produces.

use thiserror::Error;

/// Identity bridge errors
#[derive(Error, Debug)]
pub enum AuthError {
    /// No token in the Authorization header or fallback cookie
    #[error("no token provided")]
    MissingToken,

    /// Token is not a well-formed three-segment compact token
    #[error("malformed token")]
    MalformedToken,

    /// No signing key matches the token (key set exhausted or fetch failed)
    #[error("no matching signing key")]
    NoMatchingKey,

    /// Signature did not verify against the resolved key
    #[error("invalid signature")]
    InvalidSignature,

    /// Token has expired
    #[error("token expired")]
    TokenExpired,

    /// Token is not yet valid
    #[error("token not yet valid")]
    TokenNotYetValid,

    /// Issuer is not in the allow-list
    #[error("issuer mismatch")]
    IssuerMismatch,

    /// Verified payload carries no usable subject identifier
    #[error("missing subject identifier")]
    MissingIdentifier,

    /// No session signing secret configured; minting must not fall back
    /// to an unsigned or weakly-keyed token
    #[error("session signing secret not configured")]
    MissingSigningSecret,

    /// Database error
    #[error("database error: {0}")]
    Database(String),

    /// Store state contradicts its own uniqueness guarantees
    #[error("store inconsistent: {0}")]
    StoreInconsistent(&'static str),

    /// Internal error
    #[error("internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Self::MissingToken
            | Self::MalformedToken
            | Self::NoMatchingKey
            | Self::InvalidSignature
            | Self::TokenExpired
            | Self::TokenNotYetValid
            | Self::IssuerMismatch
            | Self::MissingIdentifier => 401,
            Self::MissingSigningSecret
            | Self::Database(_)
            | Self::StoreInconsistent(_)
            | Self::Internal(_) => 500,
        }
    }

    /// Get error code for API responses and logs
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::MissingToken => "MISSING_TOKEN",
            Self::MalformedToken => "MALFORMED_TOKEN",
            Self::NoMatchingKey => "NO_MATCHING_KEY",
            Self::InvalidSignature => "INVALID_SIGNATURE",
            Self::TokenExpired => "TOKEN_EXPIRED",
            Self::TokenNotYetValid => "TOKEN_NOT_YET_VALID",
            Self::IssuerMismatch => "ISSUER_MISMATCH",
            Self::MissingIdentifier => "MISSING_IDENTIFIER",
            Self::MissingSigningSecret => "MISSING_SIGNING_SECRET",
            Self::Database(_) => "DATABASE_ERROR",
            Self::StoreInconsistent(_) => "STORE_INCONSISTENT",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<vantage_db::DbError> for AuthError {
    fn from(err: vantage_db::DbError) -> Self {
        tracing::error!("Database error: {}", err);
        Self::Database(err.to_string())
    }
}
