//! Database row models
//!
//! These types map directly to database rows using SQLx's FromRow derive.

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// User row from the database
///
/// One row per external identity; `external_subject_id` is unique.
#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub external_subject_id: String,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Business row from the database
#[derive(Debug, Clone, FromRow)]
pub struct BusinessRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fact row from the database
///
/// `free_key` is always present (legacy/custom identifier); `slot_key`
/// identifies a predefined fact type when set. A row carrying both is a
/// legacy row that was promoted into a slot.
#[derive(Debug, Clone, FromRow)]
pub struct FactRow {
    pub id: Uuid,
    pub business_id: Uuid,
    pub slot_key: Option<String>,
    pub free_key: String,
    pub value: String,
    pub source_workflow: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl UserRow {
    /// Convert to domain UserId
    pub fn user_id(&self) -> vantage_types::UserId {
        vantage_types::UserId(self.id)
    }
}

impl BusinessRow {
    /// Convert to domain BusinessId
    pub fn business_id(&self) -> vantage_types::BusinessId {
        vantage_types::BusinessId(self.id)
    }

    /// Parsed lifecycle status
    pub fn status(&self) -> Option<vantage_types::BusinessStatus> {
        self.status.parse().ok()
    }
}

impl FactRow {
    /// Convert to domain FactId
    pub fn fact_id(&self) -> vantage_types::FactId {
        vantage_types::FactId(self.id)
    }
}
