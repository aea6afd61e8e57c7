//! Claim validation and identity extraction
//!
//! Operates on a payload whose signature has already been verified.
//! Missing `exp`/`nbf`/`iss` claims are unset constraints, not failures;
//! this permissiveness is deliberate and must not be tightened.

use serde_json::Value;
use vantage_types::AuthContext;

use crate::AuthError;

/// Clock-skew tolerance for `exp`/`nbf`, in seconds
pub const CLOCK_SKEW_SECS: i64 = 60;

/// Subject claim precedence, highest first.
///
/// `sub` is the standard subject; `nameid` is the provider's user-level
/// alternate. The account-level claim (`outseta:accountUid`) is shared
/// across users and is never used as a subject.
const SUBJECT_CLAIMS: [&str; 2] = ["sub", "nameid"];

/// Validate time and issuer constraints against `now` (epoch seconds).
///
/// Checks are independent; the first failing check short-circuits with
/// its specific reason.
pub fn validate_claims(
    payload: &Value,
    now: i64,
    accepted_issuers: &[String],
) -> Result<(), AuthError> {
    if let Some(exp) = payload.get("exp").and_then(Value::as_i64) {
        if exp < now - CLOCK_SKEW_SECS {
            return Err(AuthError::TokenExpired);
        }
    }

    if let Some(nbf) = payload.get("nbf").and_then(Value::as_i64) {
        if nbf > now + CLOCK_SKEW_SECS {
            return Err(AuthError::TokenNotYetValid);
        }
    }

    if let Some(iss) = payload.get("iss").and_then(Value::as_str) {
        if !accepted_issuers.iter().any(|accepted| accepted == iss) {
            tracing::debug!("Rejected issuer: {}", iss);
            return Err(AuthError::IssuerMismatch);
        }
    }

    Ok(())
}

/// Map a verified claim set onto a stable subject id and optional email.
///
/// A subject that resolves to an empty or whitespace-only string is
/// treated as absent.
pub fn extract_identity(payload: &Value) -> Result<AuthContext, AuthError> {
    let subject_id = SUBJECT_CLAIMS
        .iter()
        .filter_map(|claim| payload.get(*claim).and_then(Value::as_str))
        .map(str::trim)
        .find(|s| !s.is_empty())
        .ok_or(AuthError::MissingIdentifier)?;

    let email = payload
        .get("email")
        .and_then(Value::as_str)
        .map(str::to_string);

    Ok(AuthContext::new(subject_id, email))
}
