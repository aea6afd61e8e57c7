//! Authenticated identity context

use serde::{Deserialize, Serialize};

/// Identity established by the auth gate after full token verification.
///
/// Only constructed from a payload whose signature and claims have been
/// validated. `subject_id` is guaranteed non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthContext {
    /// Stable subject identifier from the identity provider
    pub subject_id: String,
    /// Email, if the provider included one
    pub email: Option<String>,
}

impl AuthContext {
    /// Create a new auth context
    pub fn new(subject_id: impl Into<String>, email: Option<String>) -> Self {
        Self {
            subject_id: subject_id.into(),
            email,
        }
    }
}
