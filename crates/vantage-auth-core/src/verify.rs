//! Signature verification
//!
//! RS256 (RSASSA-PKCS1-v1_5 with SHA-256) only. The token's declared
//! algorithm is deliberately ignored: verification is always attempted
//! against the RSA key as RS256, so a caller-declared symmetric
//! algorithm or "none" can never bypass the check.

use jsonwebtoken::{Algorithm, DecodingKey};

use crate::jwks::Jwk;
use crate::token::ParsedToken;
use crate::AuthError;

/// Verify a parsed token's signature against a provider key.
///
/// Returns whether the signature matches; pass/fail semantics for
/// expired or otherwise invalid claims are decided elsewhere. Errs only
/// when the key itself cannot be used (non-RSA or unbuildable).
pub fn verify_signature(token: &ParsedToken, key: &Jwk) -> Result<bool, AuthError> {
    let (n, e) = key.rsa_components().ok_or(AuthError::NoMatchingKey)?;

    let decoding_key = DecodingKey::from_rsa_components(n, e).map_err(|err| {
        tracing::error!("Failed to build decoding key: {}", err);
        AuthError::Internal("failed to build decoding key".to_string())
    })?;

    match jsonwebtoken::crypto::verify(
        token.signature_b64(),
        token.signing_input(),
        &decoding_key,
        Algorithm::RS256,
    ) {
        Ok(valid) => Ok(valid),
        Err(err) => {
            // Undecodable signature material is just a failed verification
            tracing::debug!("Signature verification errored: {}", err);
            Ok(false)
        }
    }
}
