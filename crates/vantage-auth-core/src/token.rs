//! Compact-token codec
//!
//! Splits a three-segment signed token into header, payload, and
//! signature. Pure string/byte work; no I/O and no verification. The
//! signing input is the first two segments rejoined with `.`; that
//! exact byte string is what gets signature-checked, never the decoded
//! payload.

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use serde::Deserialize;
use serde_json::Value;

use crate::AuthError;

/// Decoded token header
#[derive(Debug, Clone, Deserialize)]
pub struct TokenHeader {
    /// Declared signing algorithm (informational only; verification is
    /// always attempted as RS256)
    pub alg: String,
    /// Key ID for key-set lookup
    pub kid: Option<String>,
    /// Token type
    pub typ: Option<String>,
}

/// A parsed (not yet verified) compact token.
///
/// Built once per verification attempt; immutable after parsing.
#[derive(Debug, Clone)]
pub struct ParsedToken {
    /// Decoded header
    pub header: TokenHeader,
    /// Decoded payload claims
    pub payload: Value,
    /// Decoded signature bytes
    pub signature: Vec<u8>,
    signature_b64: String,
    signing_input: Vec<u8>,
}

impl ParsedToken {
    /// Parse a compact token string.
    ///
    /// Fails with [`AuthError::MalformedToken`] unless exactly three
    /// segments exist, the first two decode as base64url JSON (the
    /// payload must be a JSON object), and the third decodes as
    /// base64url bytes.
    pub fn parse(token: &str) -> Result<Self, AuthError> {
        let mut segments = token.split('.');
        let (Some(header_b64), Some(payload_b64), Some(signature_b64), None) = (
            segments.next(),
            segments.next(),
            segments.next(),
            segments.next(),
        ) else {
            return Err(AuthError::MalformedToken);
        };

        let header_json = decode_segment(header_b64)?;
        let header: TokenHeader =
            serde_json::from_slice(&header_json).map_err(|e| {
                tracing::debug!("Failed to decode token header: {}", e);
                AuthError::MalformedToken
            })?;

        let payload_json = decode_segment(payload_b64)?;
        let payload: Value = serde_json::from_slice(&payload_json).map_err(|e| {
            tracing::debug!("Failed to decode token payload: {}", e);
            AuthError::MalformedToken
        })?;
        if !payload.is_object() {
            return Err(AuthError::MalformedToken);
        }

        let signature = decode_segment(signature_b64)?;

        Ok(Self {
            header,
            payload,
            signature,
            signature_b64: signature_b64.to_string(),
            signing_input: format!("{header_b64}.{payload_b64}").into_bytes(),
        })
    }

    /// The exact bytes the signature covers
    pub fn signing_input(&self) -> &[u8] {
        &self.signing_input
    }

    /// The raw base64url signature segment
    pub fn signature_b64(&self) -> &str {
        &self.signature_b64
    }

    /// A string claim from the payload
    pub fn claim_str(&self, name: &str) -> Option<&str> {
        self.payload.get(name).and_then(Value::as_str)
    }

    /// An integer claim from the payload
    pub fn claim_i64(&self, name: &str) -> Option<i64> {
        self.payload.get(name).and_then(Value::as_i64)
    }
}

fn decode_segment(segment: &str) -> Result<Vec<u8>, AuthError> {
    URL_SAFE_NO_PAD.decode(segment).map_err(|e| {
        tracing::debug!("Failed to decode token segment: {}", e);
        AuthError::MalformedToken
    })
}
