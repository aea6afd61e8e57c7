//! Fact identity types
//!
//! Facts carry two identifier schemes: a typed slot key (one row per
//! business per slot) and a legacy free-form key. A row may carry both
//! when a legacy row has been promoted into a slot.

use serde::{Deserialize, Serialize};

/// How a fact row is addressed within a business.
///
/// `Slot` is the typed scheme; `Free` is the legacy free-form scheme.
/// Resolution order for writes is slot first, then free key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FactKey {
    /// Predefined, enumerable slot identifier
    Slot(String),
    /// Free-form/legacy identifier
    Free(String),
}

impl FactKey {
    /// Create a slot key
    pub fn slot(key: impl Into<String>) -> Self {
        Self::Slot(key.into())
    }

    /// Create a free key
    pub fn free(key: impl Into<String>) -> Self {
        Self::Free(key.into())
    }

    /// The underlying key string
    pub fn as_str(&self) -> &str {
        match self {
            Self::Slot(k) | Self::Free(k) => k,
        }
    }
}

impl std::fmt::Display for FactKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Slot(k) => write!(f, "slot:{k}"),
            Self::Free(k) => write!(f, "free:{k}"),
        }
    }
}
